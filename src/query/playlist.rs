use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use super::owner_summary_projection;
use crate::db;

/// Playlist joined with its owner summary and member-video summaries.
pub fn detail_pipeline(playlist_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "_id": playlist_id } },
        doc! {
            "$lookup": {
                "from": db::USERS,
                "localField": "owner",
                "foreignField": "_id",
                "as": "owner",
                "pipeline": [ owner_summary_projection() ],
            }
        },
        doc! {
            "$lookup": {
                "from": db::VIDEOS,
                "localField": "videos",
                "foreignField": "_id",
                "as": "videos",
                "pipeline": [
                    {
                        "$project": {
                            "title": 1,
                            "description": 1,
                            "thumbnail": 1,
                            "duration": 1,
                            "views": 1,
                            "is_published": 1,
                        }
                    },
                ],
            }
        },
        doc! {
            "$project": {
                "name": 1,
                "description": 1,
                "owner": { "$first": "$owner" },
                "videos": 1,
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_joins_owner_and_member_videos() {
        let playlist_id = ObjectId::new();
        let pipeline = detail_pipeline(playlist_id);
        assert_eq!(
            pipeline[0]
                .get_document("$match")
                .unwrap()
                .get_object_id("_id")
                .unwrap(),
            playlist_id
        );
        assert_eq!(
            pipeline[1]
                .get_document("$lookup")
                .unwrap()
                .get_str("from")
                .unwrap(),
            "users"
        );
        assert_eq!(
            pipeline[2]
                .get_document("$lookup")
                .unwrap()
                .get_str("from")
                .unwrap(),
            "videos"
        );
    }

    #[test]
    fn detail_collapses_owner_array() {
        let pipeline = detail_pipeline(ObjectId::new());
        let projection = pipeline[3].get_document("$project").unwrap();
        let owner = projection.get_document("owner").unwrap();
        assert_eq!(owner.get_str("$first").unwrap(), "$owner");
    }
}
