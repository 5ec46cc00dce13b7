use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::db::{COMMENTS, VIDEOS};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiResponse, Comment, CommentItem, CommentPage, CommentRequest, CommentResponse, Video,
};
use crate::query::{self, Page};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CommentListQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/comment/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video id"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Page of comments", body = CommentPage),
        (status = 404, description = "Video absent or has zero comments")
    ),
    security(("bearer_auth" = [])),
    tag = "comment"
)]
pub async fn get_video_comments(
    path: web::Path<String>,
    params: web::Query<CommentListQuery>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;
    let page = Page::new(params.page, params.limit);

    let video = db
        .collection::<Video>(VIDEOS)
        .find_one(doc! { "_id": video_id }, None)
        .await?;
    if video.is_none() {
        return Err(ApiError::not_found("Video does not exist"));
    }

    let pipeline = query::comment::listing_pipeline(video_id, page);
    let mut cursor = db
        .collection::<Comment>(COMMENTS)
        .aggregate(pipeline, None)
        .await?;
    let facet = cursor
        .try_next()
        .await?
        .ok_or_else(|| ApiError::Internal("pagination facet returned nothing".to_string()))?;
    let (total, comments): (u64, Vec<CommentItem>) = query::parse_facet(facet)?;

    // Zero comments is reported as an error, not an empty page.
    if total == 0 {
        return Err(ApiError::not_found("Video has zero comments"));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentPage {
            total_comments: total,
            comments,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total),
        },
        "All comments fetched",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/comment/{video_id}",
    params(("video_id" = String, Path, description = "Video id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment added", body = CommentResponse),
        (status = 404, description = "Video does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "comment"
)]
pub async fn add_comment(
    path: web::Path<String>,
    req: web::Json<CommentRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Please provide content"));
    }

    let video = db
        .collection::<Video>(VIDEOS)
        .find_one(doc! { "_id": video_id }, None)
        .await?;
    if video.is_none() {
        return Err(ApiError::not_found("Video does not exist"));
    }

    let comment = Comment::new(content.to_string(), video_id, user.user_id);
    db.collection::<Comment>(COMMENTS)
        .insert_one(&comment, None)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentResponse::from(comment),
        "Comment added successfully",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/comment/c/{comment_id}",
    params(("comment_id" = String, Path, description = "Comment id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 404, description = "Comment does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "comment"
)]
pub async fn update_comment(
    path: web::Path<String>,
    req: web::Json<CommentRequest>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let comment_id = super::parse_object_id(&path.into_inner(), "comment id")?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Please provide content"));
    }

    let updated = db
        .collection::<Comment>(COMMENTS)
        .find_one_and_update(
            doc! { "_id": comment_id },
            doc! { "$set": { "content": content, "updated_at": Utc::now().timestamp() } },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Comment does not exist"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentResponse::from(updated),
        "Comment updated successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comment/c/{comment_id}",
    params(("comment_id" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted", body = CommentResponse),
        (status = 404, description = "Comment does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "comment"
)]
pub async fn delete_comment(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let comment_id = super::parse_object_id(&path.into_inner(), "comment id")?;

    let deleted = db
        .collection::<Comment>(COMMENTS)
        .find_one_and_delete(doc! { "_id": comment_id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment does not exist"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        CommentResponse::from(deleted),
        "Comment deleted successfully",
    )))
}
