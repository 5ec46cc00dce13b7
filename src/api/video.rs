use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument, UpdateModifications};
use mongodb::Database;

use crate::auth::AuthenticatedUser;
use crate::db::VIDEOS;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiResponse, PublishVideoRequest, UpdateVideoRequest, Video, VideoDetail, VideoListItem,
    VideoListQuery, VideoPage, VideoResponse,
};
use crate::query::{self, Page};
use crate::storage::AssetStore;

#[utoipa::path(
    get,
    path = "/api/v1/videos",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("query" = Option<String>, Query, description = "Search in title or description"),
        ("sort_by" = Option<String>, Query, description = "Sort field (default: created_at)"),
        ("sort_type" = Option<i32>, Query, description = "1 ascending, -1 descending"),
        ("user_id" = Option<String>, Query, description = "Restrict to one owner")
    ),
    responses(
        (status = 200, description = "Page of videos", body = VideoPage),
        (status = 404, description = "No video found")
    ),
    security(("bearer_auth" = [])),
    tag = "video"
)]
pub async fn list_videos(
    _user: AuthenticatedUser,
    db: web::Data<Database>,
    params: web::Query<VideoListQuery>,
) -> ApiResult<HttpResponse> {
    let page = Page::new(params.page, params.limit);
    let owner = match params.user_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Some(super::parse_object_id(id, "user id")?),
        _ => None,
    };

    let pipeline = query::video::listing_pipeline(
        params.query.as_deref().unwrap_or(""),
        owner,
        params.sort_by.as_deref().unwrap_or("created_at"),
        params.sort_type.unwrap_or(1),
        page,
    );

    let mut cursor = db
        .collection::<Video>(VIDEOS)
        .aggregate(pipeline, None)
        .await?;
    let facet = cursor
        .try_next()
        .await?
        .ok_or_else(|| ApiError::Internal("pagination facet returned nothing".to_string()))?;
    let (total, videos): (u64, Vec<VideoListItem>) = query::parse_facet(facet)?;

    if videos.is_empty() {
        return Err(ApiError::not_found("No video found"));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        VideoPage {
            total_videos: total,
            videos,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total),
        },
        "Videos fetched successfully",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    request_body = PublishVideoRequest,
    responses(
        (status = 200, description = "Video published", body = VideoResponse),
        (status = 400, description = "Missing details or files"),
        (status = 502, description = "Upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "video"
)]
pub async fn publish_video(
    req: web::Json<PublishVideoRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<AssetStore>,
) -> ApiResult<HttpResponse> {
    let title = req.title.trim();
    let description = req.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::bad_request("Please enter the details"));
    }
    if req.video_file.trim().is_empty() {
        return Err(ApiError::bad_request("Video file is required"));
    }
    if req.thumbnail.trim().is_empty() {
        return Err(ApiError::bad_request("Thumbnail file is required"));
    }

    let video_file = storage
        .upload(req.video_file.trim())
        .await
        .map_err(|e| ApiError::UploadFailed(format!("Failed to upload video file: {}", e)))?;
    let thumbnail = storage
        .upload(req.thumbnail.trim())
        .await
        .map_err(|e| ApiError::UploadFailed(format!("Failed to upload thumbnail: {}", e)))?;

    let video = Video::new(
        title.to_string(),
        description.to_string(),
        video_file.url,
        thumbnail.url,
        video_file.duration.unwrap_or(0.0),
        user.user_id,
    );
    db.collection::<Video>(VIDEOS)
        .insert_one(&video, None)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        VideoResponse::from(video),
        "Video published",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{video_id}",
    params(("video_id" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video detail", body = VideoDetail),
        (status = 400, description = "Malformed video id"),
        (status = 404, description = "Video does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "video"
)]
pub async fn get_video(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;

    let pipeline = query::video::detail_pipeline(video_id, user.user_id);
    let mut cursor = db
        .collection::<Video>(VIDEOS)
        .aggregate(pipeline, None)
        .await?;
    let document = cursor
        .try_next()
        .await?
        .ok_or_else(|| ApiError::not_found("Video does not exist"))?;
    let detail: VideoDetail = mongodb::bson::from_document(document)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail, "Video fetched successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{video_id}",
    params(("video_id" = String, Path, description = "Video id")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 404, description = "Video does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "video"
)]
pub async fn update_video(
    path: web::Path<String>,
    req: web::Json<UpdateVideoRequest>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<AssetStore>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;

    let title = req.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let thumbnail_path = req
        .thumbnail
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if title.is_none() && description.is_none() && thumbnail_path.is_none() {
        return Err(ApiError::bad_request("Please enter the details"));
    }

    let mut changes = doc! { "updated_at": Utc::now().timestamp() };
    if let Some(title) = title {
        changes.insert("title", title);
    }
    if let Some(description) = description {
        changes.insert("description", description);
    }
    if let Some(path) = thumbnail_path {
        let uploaded = storage
            .upload(path)
            .await
            .map_err(|e| ApiError::UploadFailed(format!("Failed to upload thumbnail: {}", e)))?;
        changes.insert("thumbnail", uploaded.url);
    }

    let updated = db
        .collection::<Video>(VIDEOS)
        .find_one_and_update(
            doc! { "_id": video_id },
            doc! { "$set": changes },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Video does not exist"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        VideoResponse::from(updated),
        "Video updated successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{video_id}",
    params(("video_id" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video deleted", body = VideoResponse),
        (status = 404, description = "Video does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "video"
)]
pub async fn delete_video(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;

    let deleted = db
        .collection::<Video>(VIDEOS)
        .find_one_and_delete(doc! { "_id": video_id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Video does not exist"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        VideoResponse::from(deleted),
        "Video deleted successfully",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{video_id}/toggle-publish",
    params(("video_id" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Publish flag flipped", body = VideoResponse),
        (status = 404, description = "Video does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "video"
)]
pub async fn toggle_publish(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let video_id = super::parse_object_id(&path.into_inner(), "video id")?;

    // Pipeline update so the flip is atomic on the server.
    let update = UpdateModifications::Pipeline(vec![doc! {
        "$set": {
            "is_published": { "$not": "$is_published" },
            "updated_at": Utc::now().timestamp(),
        }
    }]);

    let updated = db
        .collection::<Video>(VIDEOS)
        .find_one_and_update(
            doc! { "_id": video_id },
            update,
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Video does not exist"))?;

    let message = if updated.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(VideoResponse::from(updated), message)))
}
