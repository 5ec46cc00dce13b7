use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The kind half of a like's tagged target. The (kind, id) pair makes the
/// "exactly one target" invariant structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LikeTargetKind {
    Video,
    Comment,
    Tweet,
}

impl LikeTargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeTargetKind::Video => "video",
            LikeTargetKind::Comment => "comment",
            LikeTargetKind::Tweet => "tweet",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub like_by: ObjectId,
    pub target_kind: LikeTargetKind,
    pub target_id: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(like_by: ObjectId, target_kind: LikeTargetKind, target_id: ObjectId) -> Self {
        Like {
            id: ObjectId::new(),
            like_by,
            target_kind,
            target_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub id: String,
    pub like_by: String,
    pub target_kind: LikeTargetKind,
    pub target_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl From<Like> for LikeResponse {
    fn from(like: Like) -> Self {
        LikeResponse {
            id: like.id.to_hex(),
            like_by: like.like_by.to_hex(),
            target_kind: like.target_kind,
            target_id: like.target_id.to_hex(),
            created_at: like.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_kind_round_trips_lowercase() {
        assert_eq!(
            serde_json::to_value(LikeTargetKind::Video).unwrap(),
            serde_json::json!("video")
        );
        let kind: LikeTargetKind = serde_json::from_value(serde_json::json!("tweet")).unwrap();
        assert_eq!(kind, LikeTargetKind::Tweet);
    }

    #[test]
    fn stored_like_carries_tagged_target() {
        let like = Like::new(ObjectId::new(), LikeTargetKind::Comment, ObjectId::new());
        let doc = mongodb::bson::to_document(&like).unwrap();
        assert_eq!(doc.get_str("target_kind").unwrap(), "comment");
        assert!(doc.get_object_id("target_id").is_ok());
        assert!(doc.get_object_id("like_by").is_ok());
    }
}
