use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use super::owner_summary_projection;
use crate::db;

/// Subscribers of a channel, each row joined with the subscriber's user
/// summary.
pub fn subscribers_pipeline(channel_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "channel": channel_id } },
        doc! {
            "$lookup": {
                "from": db::USERS,
                "localField": "subscriber",
                "foreignField": "_id",
                "as": "subscriber",
                "pipeline": [ owner_summary_projection() ],
            }
        },
        doc! { "$unwind": "$subscriber" },
        doc! { "$project": { "subscriber": 1 } },
    ]
}

/// Channels a user subscribes to, each row joined with the channel's user
/// summary.
pub fn channels_pipeline(subscriber_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "subscriber": subscriber_id } },
        doc! {
            "$lookup": {
                "from": db::USERS,
                "localField": "channel",
                "foreignField": "_id",
                "as": "channel",
                "pipeline": [ owner_summary_projection() ],
            }
        },
        doc! { "$unwind": "$channel" },
        doc! { "$project": { "channel": 1 } },
    ]
}
