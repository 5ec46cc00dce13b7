use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub video: ObjectId,
    pub owner: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(content: String, video: ObjectId, owner: ObjectId) -> Self {
        let now = Utc::now();
        Comment {
            id: ObjectId::new(),
            content,
            video,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    pub video: String,
    pub owner: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id.to_hex(),
            content: comment.content,
            video: comment.video.to_hex(),
            owner: comment.owner.to_hex(),
            created_at: comment.created_at,
        }
    }
}

/// Page row coming back from the comment-listing facet.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentItem {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub content: String,
    #[serde(serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub video: ObjectId,
    #[serde(serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub owner: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Comment page; this endpoint's historical labels are `total_comments` and
/// `Comments`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentPage {
    pub total_comments: u64,
    #[serde(rename = "Comments")]
    pub comments: Vec<CommentItem>,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_page_uses_historical_labels() {
        let page = CommentPage {
            total_comments: 2,
            comments: Vec::new(),
            page: 1,
            limit: 10,
            total_pages: 1,
        };
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["total_comments"], 2);
        assert!(value["Comments"].as_array().unwrap().is_empty());
        assert_eq!(value["totalPages"], 1);
    }
}
