use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document, Regex};

use super::{escape_regex, facet_stage, owner_summary_projection, Page};
use crate::db;
use crate::models::LikeTargetKind;

const SORTABLE_FIELDS: &[&str] = &["created_at", "title", "description", "duration", "views"];

/// Search + owner filter + owner join + sort + pagination facet.
///
/// `search_text` matches title or description case-insensitively as a
/// literal substring; an empty string matches everything.
pub fn listing_pipeline(
    search_text: &str,
    owner: Option<ObjectId>,
    sort_by: &str,
    sort_direction: i32,
    page: Page,
) -> Vec<Document> {
    let pattern = Regex {
        pattern: escape_regex(search_text),
        options: "i".to_string(),
    };
    let mut criteria = vec![doc! {
        "$or": [
            { "title": pattern.clone() },
            { "description": pattern },
        ]
    }];
    if let Some(owner) = owner {
        criteria.push(doc! { "owner": owner });
    }

    let sort_field = if SORTABLE_FIELDS.contains(&sort_by) {
        sort_by
    } else {
        "created_at"
    };
    let direction = if sort_direction < 0 { -1 } else { 1 };

    vec![
        doc! { "$match": { "$and": criteria } },
        doc! {
            "$lookup": {
                "from": db::USERS,
                "localField": "owner",
                "foreignField": "_id",
                "as": "owner",
                "pipeline": [ owner_summary_projection() ],
            }
        },
        doc! { "$addFields": { "owner": { "$first": "$owner" } } },
        doc! { "$sort": { sort_field: direction } },
        facet_stage(page),
    ]
}

/// Single video joined with uploader summary, like facts for the caller and
/// subscription facts for the uploader's channel.
pub fn detail_pipeline(video_id: ObjectId, caller_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "_id": video_id } },
        doc! {
            "$lookup": {
                "from": db::USERS,
                "localField": "owner",
                "foreignField": "_id",
                "as": "uploadedBy",
                "pipeline": [ owner_summary_projection() ],
            }
        },
        doc! { "$unwind": "$uploadedBy" },
        doc! {
            "$lookup": {
                "from": db::LIKES,
                "let": { "videoId": "$_id" },
                "pipeline": [
                    { "$match": { "$expr": { "$and": [
                        { "$eq": ["$target_id", "$$videoId"] },
                        { "$eq": ["$target_kind", LikeTargetKind::Video.as_str()] },
                    ] } } },
                ],
                "as": "likes",
            }
        },
        doc! {
            "$lookup": {
                "from": db::SUBSCRIPTIONS,
                "localField": "owner",
                "foreignField": "channel",
                "as": "subscribers",
            }
        },
        doc! {
            "$addFields": {
                "totalSubscribers": { "$size": "$subscribers" },
                "isSubscribed": {
                    "$cond": {
                        "if": { "$in": [caller_id, "$subscribers.subscriber"] },
                        "then": true,
                        "else": false,
                    }
                },
                "TotalLikes": { "$size": "$likes" },
                "isLiked": {
                    "$cond": {
                        "if": { "$in": [caller_id, "$likes.like_by"] },
                        "then": true,
                        "else": false,
                    }
                },
            }
        },
        doc! {
            "$project": {
                "title": 1,
                "description": 1,
                "views": 1,
                "thumbnail": 1,
                "video_file": 1,
                "uploadedBy": 1,
                "TotalLikes": 1,
                "isLiked": 1,
                "totalSubscribers": 1,
                "isSubscribed": 1,
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_matches_title_or_description() {
        let pipeline = listing_pipeline("rust", None, "created_at", 1, Page::new(None, None));
        let and = pipeline[0]
            .get_document("$match")
            .unwrap()
            .get_array("$and")
            .unwrap();
        assert_eq!(and.len(), 1, "no owner filter requested");
        let or = and[0].as_document().unwrap().get_array("$or").unwrap();
        assert_eq!(or.len(), 2);
    }

    #[test]
    fn listing_intersects_owner_filter() {
        let owner = ObjectId::new();
        let pipeline = listing_pipeline("", Some(owner), "created_at", 1, Page::new(None, None));
        let and = pipeline[0]
            .get_document("$match")
            .unwrap()
            .get_array("$and")
            .unwrap();
        assert_eq!(and.len(), 2);
        assert_eq!(
            and[1].as_document().unwrap().get_object_id("owner").unwrap(),
            owner
        );
    }

    #[test]
    fn listing_escapes_search_regex() {
        let pipeline = listing_pipeline("a.b", None, "created_at", 1, Page::new(None, None));
        let and = pipeline[0]
            .get_document("$match")
            .unwrap()
            .get_array("$and")
            .unwrap();
        let or = and[0].as_document().unwrap().get_array("$or").unwrap();
        let title = or[0].as_document().unwrap();
        match title.get("title").unwrap() {
            mongodb::bson::Bson::RegularExpression(regex) => {
                assert_eq!(regex.pattern, "a\\.b");
                assert_eq!(regex.options, "i");
            }
            other => panic!("expected regex, got {:?}", other),
        }
    }

    #[test]
    fn listing_whitelists_sort_field_and_normalizes_direction() {
        let pipeline = listing_pipeline("", None, "$where", -5, Page::new(None, None));
        let sort = pipeline[3].get_document("$sort").unwrap();
        assert_eq!(sort.get_i32("created_at").unwrap(), -1);

        let pipeline = listing_pipeline("", None, "views", 1, Page::new(None, None));
        let sort = pipeline[3].get_document("$sort").unwrap();
        assert_eq!(sort.get_i32("views").unwrap(), 1);
    }

    #[test]
    fn listing_ends_with_pagination_facet() {
        let pipeline = listing_pipeline("", None, "created_at", 1, Page::new(Some(2), Some(5)));
        let facet = pipeline.last().unwrap().get_document("$facet").unwrap();
        assert!(facet.contains_key("total"));
        assert!(facet.contains_key("docs"));
    }

    #[test]
    fn detail_filters_likes_to_video_kind() {
        let pipeline = detail_pipeline(ObjectId::new(), ObjectId::new());
        let likes_lookup = pipeline[3].get_document("$lookup").unwrap();
        assert_eq!(likes_lookup.get_str("from").unwrap(), "likes");
        let stages = likes_lookup.get_array("pipeline").unwrap();
        let expr = stages[0]
            .as_document()
            .unwrap()
            .get_document("$match")
            .unwrap()
            .get_document("$expr")
            .unwrap();
        let and = expr.get_array("$and").unwrap();
        assert_eq!(and.len(), 2);
    }

    #[test]
    fn detail_computes_caller_membership_fields() {
        let caller = ObjectId::new();
        let pipeline = detail_pipeline(ObjectId::new(), caller);
        let fields = pipeline[5].get_document("$addFields").unwrap();
        for key in ["TotalLikes", "isLiked", "totalSubscribers", "isSubscribed"] {
            assert!(fields.contains_key(key), "missing computed field {}", key);
        }
        let is_liked = fields
            .get_document("isLiked")
            .unwrap()
            .get_document("$cond")
            .unwrap();
        let operands = is_liked.get_document("if").unwrap().get_array("$in").unwrap();
        assert_eq!(operands[0].as_object_id().unwrap(), caller);
    }
}
