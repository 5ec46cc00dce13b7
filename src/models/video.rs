use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OwnerSummary;

/// Stored video document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(
        title: String,
        description: String,
        video_file: String,
        thumbnail: String,
        duration: f64,
        owner: ObjectId,
    ) -> Self {
        let now = Utc::now();
        Video {
            id: ObjectId::new(),
            title,
            description,
            video_file,
            thumbnail,
            duration,
            views: 0,
            is_published: true,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishVideoRequest {
    pub title: String,
    pub description: String,
    /// Local path of the staged video upload.
    pub video_file: String,
    /// Local path of the staged thumbnail upload.
    pub thumbnail: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Local path of a staged replacement thumbnail.
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VideoListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub limit: Option<u64>,
    /// Case-insensitive substring matched against title or description.
    pub query: Option<String>,
    #[schema(example = "created_at")]
    pub sort_by: Option<String>,
    /// 1 ascending, -1 descending.
    pub sort_type: Option<i32>,
    /// Restrict to one owner.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        VideoResponse {
            id: video.id.to_hex(),
            title: video.title,
            description: video.description,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            owner: video.owner.to_hex(),
            created_at: video.created_at,
        }
    }
}

/// Listing row: a video joined with its owner summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoListItem {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner: OwnerSummary,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Video listing page; labels match the listing pipeline's contract.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoPage {
    #[serde(rename = "totalVideos")]
    pub total_videos: u64,
    pub videos: Vec<VideoListItem>,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

/// Single-video view with uploader, like and subscription facts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoDetail {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub views: i64,
    pub thumbnail: String,
    pub video_file: String,
    #[serde(rename = "uploadedBy")]
    pub uploaded_by: OwnerSummary,
    #[serde(rename = "TotalLikes")]
    pub total_likes: i64,
    #[serde(rename = "isLiked")]
    pub is_liked: bool,
    #[serde(rename = "totalSubscribers")]
    pub total_subscribers: i64,
    #[serde(rename = "isSubscribed")]
    pub is_subscribed: bool,
}

/// Member-video projection used by playlist detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoSummary {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn new_video_starts_unwatched_and_published() {
        let owner = ObjectId::new();
        let video = Video::new(
            "t".to_string(),
            "d".to_string(),
            "url".to_string(),
            "thumb".to_string(),
            12.5,
            owner,
        );
        assert_eq!(video.views, 0);
        assert!(video.is_published);
        assert_eq!(video.owner, owner);
    }

    #[test]
    fn video_page_uses_custom_labels() {
        let page = VideoPage {
            total_videos: 25,
            videos: Vec::new(),
            page: 3,
            limit: 10,
            total_pages: 3,
        };
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["totalVideos"], 25);
        assert_eq!(value["totalPages"], 3);
        assert!(value["videos"].as_array().unwrap().is_empty());
    }

    #[test]
    fn video_detail_deserializes_pipeline_labels() {
        let owner = ObjectId::new();
        let id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "title": "t",
            "description": "d",
            "views": 7_i64,
            "thumbnail": "thumb",
            "video_file": "file",
            "uploadedBy": {
                "_id": owner,
                "full_name": "Alice",
                "username": "alice",
                "avatar": "a.png",
            },
            "TotalLikes": 3_i64,
            "isLiked": true,
            "totalSubscribers": 2_i64,
            "isSubscribed": false,
        };
        let detail: VideoDetail = mongodb::bson::from_document(document).unwrap();
        assert_eq!(detail.total_likes, 3);
        assert!(detail.is_liked);
        assert_eq!(detail.uploaded_by.username, "alice");

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["TotalLikes"], 3);
        assert_eq!(value["isLiked"], true);
        assert_eq!(value["_id"], id.to_hex());
    }
}
