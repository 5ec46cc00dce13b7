use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{OwnerSummary, VideoSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub owner: ObjectId,
    #[serde(default)]
    pub videos: Vec<ObjectId>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn new(name: String, description: String, owner: ObjectId) -> Self {
        let now = Utc::now();
        Playlist {
            id: ObjectId::new(),
            name,
            description,
            owner,
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub videos: Vec<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl From<Playlist> for PlaylistResponse {
    fn from(playlist: Playlist) -> Self {
        PlaylistResponse {
            id: playlist.id.to_hex(),
            name: playlist.name,
            description: playlist.description,
            owner: playlist.owner.to_hex(),
            videos: playlist.videos.iter().map(|id| id.to_hex()).collect(),
            created_at: playlist.created_at,
        }
    }
}

/// Playlist joined with its owner summary and member-video summaries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaylistDetail {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub owner: OwnerSummary,
    pub videos: Vec<VideoSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_playlist_is_empty() {
        let playlist = Playlist::new("watch later".to_string(), "desc".to_string(), ObjectId::new());
        assert!(playlist.videos.is_empty());
    }

    #[test]
    fn playlist_detail_deserializes_joined_document() {
        let document = mongodb::bson::doc! {
            "_id": ObjectId::new(),
            "name": "mix",
            "description": "d",
            "owner": {
                "_id": ObjectId::new(),
                "full_name": "Alice",
                "username": "alice",
                "avatar": "a.png",
            },
            "videos": [{
                "_id": ObjectId::new(),
                "title": "t",
                "description": "d",
                "thumbnail": "th",
                "duration": 3.5,
                "views": 0_i64,
                "is_published": true,
            }],
        };
        let detail: PlaylistDetail = mongodb::bson::from_document(document).unwrap();
        assert_eq!(detail.videos.len(), 1);
        assert_eq!(detail.owner.username, "alice");
    }
}
