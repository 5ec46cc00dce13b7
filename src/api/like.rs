use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Database;

use crate::auth::AuthenticatedUser;
use crate::db::{COMMENTS, LIKES, TWEETS, VIDEOS};
use crate::error::{is_duplicate_key, ApiError, ApiResult};
use crate::models::{
    ApiResponse, Comment, Like, LikeResponse, LikeTargetKind, Tweet, Video,
};

/// Outcome of one toggle call.
enum ToggleOutcome {
    Added(Like),
    Removed(Like),
}

/// Deletes the (caller, target) like if present, inserts it otherwise. The
/// unique index on (like_by, target_kind, target_id) closes the window
/// between the two steps: losing a duplicate-key race means the "liked"
/// state already holds, and that record is returned.
async fn toggle(
    db: &Database,
    caller: mongodb::bson::oid::ObjectId,
    kind: LikeTargetKind,
    target_id: mongodb::bson::oid::ObjectId,
) -> ApiResult<ToggleOutcome> {
    let likes = db.collection::<Like>(LIKES);
    let filter = doc! {
        "like_by": caller,
        "target_kind": kind.as_str(),
        "target_id": target_id,
    };

    if let Some(removed) = likes.find_one_and_delete(filter.clone(), None).await? {
        return Ok(ToggleOutcome::Removed(removed));
    }

    let like = Like::new(caller, kind, target_id);
    match likes.insert_one(&like, None).await {
        Ok(_) => Ok(ToggleOutcome::Added(like)),
        Err(e) if is_duplicate_key(&e) => {
            let existing = likes
                .find_one(filter, None)
                .await?
                .ok_or_else(|| ApiError::Internal("like state changed concurrently".to_string()))?;
            Ok(ToggleOutcome::Added(existing))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/like/video/{video_id}",
    params(("video_id" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 404, description = "Video does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "like"
)]
pub async fn toggle_video_like(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;

    let video = db
        .collection::<Video>(VIDEOS)
        .find_one(doc! { "_id": video_id }, None)
        .await?;
    if video.is_none() {
        return Err(ApiError::not_found("Video does not exist"));
    }

    let response = match toggle(&db, user.user_id, LikeTargetKind::Video, video_id).await? {
        ToggleOutcome::Added(like) => {
            ApiResponse::ok(LikeResponse::from(like), "Video liked successfully")
        }
        ToggleOutcome::Removed(like) => {
            ApiResponse::ok(LikeResponse::from(like), "Video unliked successfully")
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/like/comment/{comment_id}",
    params(("comment_id" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 404, description = "Comment does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "like"
)]
pub async fn toggle_comment_like(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let comment_id = super::parse_object_id(&path.into_inner(), "comment id")?;

    let comment = db
        .collection::<Comment>(COMMENTS)
        .find_one(doc! { "_id": comment_id }, None)
        .await?;
    if comment.is_none() {
        return Err(ApiError::not_found("Comment does not exist"));
    }

    let response = match toggle(&db, user.user_id, LikeTargetKind::Comment, comment_id).await? {
        ToggleOutcome::Added(like) => {
            ApiResponse::ok(LikeResponse::from(like), "Comment liked successfully")
        }
        ToggleOutcome::Removed(like) => {
            ApiResponse::ok(LikeResponse::from(like), "Comment unliked successfully")
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/like/tweet/{tweet_id}",
    params(("tweet_id" = String, Path, description = "Tweet id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 404, description = "Tweet does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "like"
)]
pub async fn toggle_tweet_like(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let tweet_id = super::parse_object_id(&path.into_inner(), "tweet id")?;

    let tweet = db
        .collection::<Tweet>(TWEETS)
        .find_one(doc! { "_id": tweet_id }, None)
        .await?;
    if tweet.is_none() {
        return Err(ApiError::not_found("Tweet does not exist"));
    }

    let response = match toggle(&db, user.user_id, LikeTargetKind::Tweet, tweet_id).await? {
        ToggleOutcome::Added(like) => {
            ApiResponse::ok(LikeResponse::from(like), "Tweet liked successfully")
        }
        ToggleOutcome::Removed(like) => {
            ApiResponse::ok(LikeResponse::from(like), "Tweet unliked successfully")
        }
    };
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/like/videos",
    responses(
        (status = 200, description = "Likes the caller placed on videos", body = Vec<LikeResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "like"
)]
pub async fn get_liked_videos(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let likes: Vec<Like> = db
        .collection::<Like>(LIKES)
        .find(
            doc! {
                "like_by": user.user_id,
                "target_kind": LikeTargetKind::Video.as_str(),
            },
            None,
        )
        .await?
        .try_collect()
        .await?;

    let liked: Vec<LikeResponse> = likes.into_iter().map(LikeResponse::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(liked, "Videos found")))
}
