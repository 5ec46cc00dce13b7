pub mod comment;
pub mod like;
pub mod playlist;
pub mod subscription;
pub mod tweet;
pub mod user;
pub mod video;

use actix_web::web;
use mongodb::bson::oid::ObjectId;
use utoipa::OpenApi;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthResponse, ChannelEntry, ChannelList, ChannelProfile, CommentItem, CommentPage,
    CommentRequest, CommentResponse, CreatePlaylistRequest, LikeResponse, LikeTargetKind,
    LoginRequest, OwnerSummary, PlaylistDetail, PlaylistResponse, PublishVideoRequest,
    RefreshTokenRequest, RegisterRequest, SubscriberEntry, SubscriberList, SubscriptionStatus,
    TokenPairResponse, TweetRequest, TweetResponse, UpdateAccountRequest, UpdateAvatarRequest,
    UpdateCoverImageRequest, UpdatePlaylistRequest, UpdateVideoRequest, UserResponse,
    ChangePasswordRequest, VideoDetail, VideoListItem, VideoListQuery, VideoPage, VideoResponse,
    VideoSummary,
};

/// Parses a path/query id, mapping malformed input to a 400.
pub(crate) fn parse_object_id(value: &str, what: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(value)
        .map_err(|_| ApiError::bad_request(format!("provide a valid {}", what)))
}

/// The full route table under `/api/v1`, shared by the server and the
/// integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/user")
                    .route("/register", web::post().to(user::register))
                    .route("/login", web::post().to(user::login))
                    .route("/refresh-token", web::post().to(user::refresh_token))
                    .route("/logout", web::post().to(user::logout))
                    .route("/change-password", web::post().to(user::change_password))
                    .route("", web::get().to(user::current_user))
                    .route("/update-details", web::patch().to(user::update_account))
                    .route("/change-avatar", web::patch().to(user::update_avatar))
                    .route(
                        "/change-cover-image",
                        web::patch().to(user::update_cover_image),
                    )
                    .route("/channel/{username}", web::get().to(user::channel_profile))
                    .route("/watch-history", web::get().to(user::watch_history)),
            )
            .service(
                web::scope("/videos")
                    .route("", web::get().to(video::list_videos))
                    .route("", web::post().to(video::publish_video))
                    .route("/{video_id}", web::get().to(video::get_video))
                    .route("/{video_id}", web::patch().to(video::update_video))
                    .route("/{video_id}", web::delete().to(video::delete_video))
                    .route(
                        "/{video_id}/toggle-publish",
                        web::patch().to(video::toggle_publish),
                    ),
            )
            .service(
                web::scope("/comment")
                    .route("/{video_id}", web::get().to(comment::get_video_comments))
                    .route("/{video_id}", web::post().to(comment::add_comment))
                    .route("/c/{comment_id}", web::patch().to(comment::update_comment))
                    .route("/c/{comment_id}", web::delete().to(comment::delete_comment)),
            )
            .service(
                web::scope("/like")
                    .route("/video/{video_id}", web::post().to(like::toggle_video_like))
                    .route(
                        "/comment/{comment_id}",
                        web::post().to(like::toggle_comment_like),
                    )
                    .route("/tweet/{tweet_id}", web::post().to(like::toggle_tweet_like))
                    .route("/videos", web::get().to(like::get_liked_videos)),
            )
            .service(
                web::scope("/playlist")
                    .route("", web::post().to(playlist::create_playlist))
                    .route("/user/{user_id}", web::get().to(playlist::get_user_playlists))
                    .route(
                        "/add/{video_id}/{playlist_id}",
                        web::patch().to(playlist::add_video),
                    )
                    .route(
                        "/remove/{video_id}/{playlist_id}",
                        web::patch().to(playlist::remove_video),
                    )
                    .route("/{playlist_id}", web::get().to(playlist::get_playlist))
                    .route("/{playlist_id}", web::patch().to(playlist::update_playlist))
                    .route("/{playlist_id}", web::delete().to(playlist::delete_playlist)),
            )
            .service(
                web::scope("/subscription")
                    .route(
                        "/channel/{channel_id}/subscribers",
                        web::get().to(subscription::get_channel_subscribers),
                    )
                    .route(
                        "/user/{subscriber_id}/channels",
                        web::get().to(subscription::get_subscribed_channels),
                    )
                    .route(
                        "/{channel_id}",
                        web::post().to(subscription::toggle_subscription),
                    ),
            )
            .service(
                web::scope("/tweets")
                    .route("", web::post().to(tweet::create_tweet))
                    .route("/user/{user_id}", web::get().to(tweet::get_user_tweets))
                    .route("/{tweet_id}", web::patch().to(tweet::update_tweet))
                    .route("/{tweet_id}", web::delete().to(tweet::delete_tweet)),
            ),
    );
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // User endpoints
        user::register,
        user::login,
        user::refresh_token,
        user::logout,
        user::change_password,
        user::current_user,
        user::update_account,
        user::update_avatar,
        user::update_cover_image,
        user::channel_profile,
        user::watch_history,
        // Video endpoints
        video::list_videos,
        video::publish_video,
        video::get_video,
        video::update_video,
        video::delete_video,
        video::toggle_publish,
        // Comment endpoints
        comment::get_video_comments,
        comment::add_comment,
        comment::update_comment,
        comment::delete_comment,
        // Like endpoints
        like::toggle_video_like,
        like::toggle_comment_like,
        like::toggle_tweet_like,
        like::get_liked_videos,
        // Playlist endpoints
        playlist::create_playlist,
        playlist::get_user_playlists,
        playlist::get_playlist,
        playlist::update_playlist,
        playlist::delete_playlist,
        playlist::add_video,
        playlist::remove_video,
        // Subscription endpoints
        subscription::toggle_subscription,
        subscription::get_channel_subscribers,
        subscription::get_subscribed_channels,
        // Tweet endpoints
        tweet::create_tweet,
        tweet::get_user_tweets,
        tweet::update_tweet,
        tweet::delete_tweet,
    ),
    components(schemas(
        // User schemas
        RegisterRequest,
        LoginRequest,
        RefreshTokenRequest,
        ChangePasswordRequest,
        UpdateAccountRequest,
        UpdateAvatarRequest,
        UpdateCoverImageRequest,
        UserResponse,
        AuthResponse,
        TokenPairResponse,
        ChannelProfile,
        OwnerSummary,
        // Video schemas
        PublishVideoRequest,
        UpdateVideoRequest,
        VideoResponse,
        VideoListItem,
        VideoPage,
        VideoDetail,
        VideoSummary,
        VideoListQuery,
        // Comment schemas
        CommentRequest,
        CommentResponse,
        CommentItem,
        CommentPage,
        comment::CommentListQuery,
        // Like schemas
        LikeTargetKind,
        LikeResponse,
        // Playlist schemas
        CreatePlaylistRequest,
        UpdatePlaylistRequest,
        PlaylistResponse,
        PlaylistDetail,
        // Subscription schemas
        SubscriptionStatus,
        SubscriberEntry,
        SubscriberList,
        ChannelEntry,
        ChannelList,
        // Tweet schemas
        TweetRequest,
        TweetResponse,
    )),
    tags(
        (name = "user", description = "Account, session and channel endpoints"),
        (name = "video", description = "Video publishing and listing endpoints"),
        (name = "comment", description = "Video comment endpoints"),
        (name = "like", description = "Like toggle endpoints"),
        (name = "playlist", description = "Playlist endpoints"),
        (name = "subscription", description = "Channel subscription endpoints"),
        (name = "tweet", description = "Tweet endpoints"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
