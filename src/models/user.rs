use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored user document. Never serialized straight to a response; the public
/// projection is `UserResponse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub watch_history: Vec<ObjectId>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        full_name: String,
        password_hash: String,
        avatar: String,
        cover_image: String,
    ) -> Self {
        let now = Utc::now();
        User {
            id: ObjectId::new(),
            username,
            email,
            full_name,
            password: password_hash,
            avatar,
            cover_image,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub username: String,
    /// Local path of the staged avatar upload. Required.
    pub avatar: String,
    /// Local path of the staged cover image upload. Optional.
    pub cover_image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAvatarRequest {
    /// Local path of the staged avatar upload.
    pub avatar: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCoverImageRequest {
    /// Local path of the staged cover image upload.
    pub cover_image: String,
}

/// Public user projection: no password hash, no refresh token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: String,
    pub watch_history: Vec<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id.to_hex(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar,
            cover_image: user.cover_image,
            watch_history: user.watch_history.iter().map(|id| id.to_hex()).collect(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Channel page projection with subscription counters, produced by the
/// channel-profile pipeline.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelProfile {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub avatar: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(rename = "subscribersCount")]
    pub subscribers_count: i64,
    #[serde(rename = "channelsSubscribedToCount")]
    pub channels_subscribed_to_count: i64,
    #[serde(rename = "isSubscribed")]
    pub is_subscribed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_drops_credentials() {
        let user = User::new(
            "alice".to_string(),
            "a@x.com".to_string(),
            "Alice".to_string(),
            "$2b$12$hash".to_string(),
            "http://assets/a.png".to_string(),
            String::new(),
        );
        let resp = UserResponse::from(user.clone());
        let value = serde_json::to_value(&resp).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("refresh_token").is_none());
        assert_eq!(value["username"], "alice");
        assert_eq!(value["id"], user.id.to_hex());
    }

    #[test]
    fn stored_user_skips_absent_refresh_token() {
        let user = User::new(
            "bob".to_string(),
            "b@x.com".to_string(),
            "Bob".to_string(),
            "hash".to_string(),
            "avatar".to_string(),
            String::new(),
        );
        let doc = mongodb::bson::to_document(&user).unwrap();
        assert!(!doc.contains_key("refresh_token"));
        assert!(doc.get_object_id("_id").is_ok());
    }
}
