use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use super::owner_summary_projection;
use crate::db;

/// Channel page: the user matched by username with subscription counters
/// computed from both sides of the subscriptions relation.
pub fn channel_profile_pipeline(username: &str, caller_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "username": username.to_lowercase() } },
        doc! {
            "$lookup": {
                "from": db::SUBSCRIPTIONS,
                "localField": "_id",
                "foreignField": "channel",
                "as": "subscribers",
            }
        },
        doc! {
            "$lookup": {
                "from": db::SUBSCRIPTIONS,
                "localField": "_id",
                "foreignField": "subscriber",
                "as": "subscribed_to",
            }
        },
        doc! {
            "$addFields": {
                "subscribersCount": { "$size": "$subscribers" },
                "channelsSubscribedToCount": { "$size": "$subscribed_to" },
                "isSubscribed": {
                    "$cond": {
                        "if": { "$in": [caller_id, "$subscribers.subscriber"] },
                        "then": true,
                        "else": false,
                    }
                },
            }
        },
        doc! {
            "$project": {
                "full_name": 1,
                "username": 1,
                "subscribersCount": 1,
                "channelsSubscribedToCount": 1,
                "isSubscribed": 1,
                "avatar": 1,
                "email": 1,
                "cover_image": 1,
            }
        },
    ]
}

/// The caller's watch history joined into full video rows, each carrying
/// its owner summary.
pub fn watch_history_pipeline(caller_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "_id": caller_id } },
        doc! {
            "$lookup": {
                "from": db::VIDEOS,
                "localField": "watch_history",
                "foreignField": "_id",
                "as": "watch_history",
                "pipeline": [
                    {
                        "$lookup": {
                            "from": db::USERS,
                            "localField": "owner",
                            "foreignField": "_id",
                            "as": "owner",
                            "pipeline": [ owner_summary_projection() ],
                        }
                    },
                    { "$addFields": { "owner": { "$first": "$owner" } } },
                ],
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_profile_lowercases_username() {
        let pipeline = channel_profile_pipeline("Alice", ObjectId::new());
        let matched = pipeline[0].get_document("$match").unwrap();
        assert_eq!(matched.get_str("username").unwrap(), "alice");
    }

    #[test]
    fn channel_profile_joins_both_subscription_sides() {
        let pipeline = channel_profile_pipeline("alice", ObjectId::new());
        let as_channel = pipeline[1].get_document("$lookup").unwrap();
        assert_eq!(as_channel.get_str("foreignField").unwrap(), "channel");
        let as_subscriber = pipeline[2].get_document("$lookup").unwrap();
        assert_eq!(as_subscriber.get_str("foreignField").unwrap(), "subscriber");
    }

    #[test]
    fn channel_profile_projects_no_credentials() {
        let pipeline = channel_profile_pipeline("alice", ObjectId::new());
        let projection = pipeline.last().unwrap().get_document("$project").unwrap();
        assert!(!projection.contains_key("password"));
        assert!(!projection.contains_key("refresh_token"));
        assert!(projection.contains_key("subscribersCount"));
    }

    #[test]
    fn watch_history_nests_owner_join() {
        let pipeline = watch_history_pipeline(ObjectId::new());
        let lookup = pipeline[1].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "videos");
        assert_eq!(lookup.get_str("localField").unwrap(), "watch_history");
        let nested = lookup.get_array("pipeline").unwrap();
        let nested_lookup = nested[0]
            .as_document()
            .unwrap()
            .get_document("$lookup")
            .unwrap();
        assert_eq!(nested_lookup.get_str("from").unwrap(), "users");
    }
}
