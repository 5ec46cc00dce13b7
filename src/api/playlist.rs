use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;

use crate::auth::AuthenticatedUser;
use crate::db::{PLAYLISTS, USERS, VIDEOS};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiResponse, CreatePlaylistRequest, Playlist, PlaylistDetail, PlaylistResponse,
    UpdatePlaylistRequest, User, Video,
};
use crate::query;

/// Loads a playlist and verifies the caller owns it.
async fn load_owned_playlist(
    db: &Database,
    playlist_id: mongodb::bson::oid::ObjectId,
    caller: mongodb::bson::oid::ObjectId,
) -> ApiResult<Playlist> {
    let playlist = db
        .collection::<Playlist>(PLAYLISTS)
        .find_one(doc! { "_id": playlist_id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist does not exist"))?;

    if playlist.owner != caller {
        return Err(ApiError::Forbidden(
            "You don't have permission to modify this playlist".to_string(),
        ));
    }

    Ok(playlist)
}

#[utoipa::path(
    post,
    path = "/api/v1/playlist",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist created", body = PlaylistResponse),
        (status = 400, description = "Missing name or description")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn create_playlist(
    req: web::Json<CreatePlaylistRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let name = req.name.trim();
    let description = req.description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(ApiError::bad_request("provide name and description"));
    }

    let playlist = Playlist::new(name.to_string(), description.to_string(), user.user_id);
    db.collection::<Playlist>(PLAYLISTS)
        .insert_one(&playlist, None)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PlaylistResponse::from(playlist),
        "Playlist created successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlist/user/{user_id}",
    params(("user_id" = String, Path, description = "Owner user id")),
    responses(
        (status = 200, description = "The user's playlists", body = Vec<PlaylistResponse>),
        (status = 404, description = "User does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn get_user_playlists(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let user_id = super::parse_object_id(&path.into_inner(), "user id")?;

    let owner = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": user_id }, None)
        .await?;
    if owner.is_none() {
        return Err(ApiError::not_found("User does not exist"));
    }

    let playlists: Vec<Playlist> = db
        .collection::<Playlist>(PLAYLISTS)
        .find(doc! { "owner": user_id }, None)
        .await?
        .try_collect()
        .await?;
    let playlists: Vec<PlaylistResponse> =
        playlists.into_iter().map(PlaylistResponse::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        playlists,
        "Playlists fetched successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlist/{playlist_id}",
    params(("playlist_id" = String, Path, description = "Playlist id")),
    responses(
        (status = 200, description = "Playlist with owner and videos", body = PlaylistDetail),
        (status = 404, description = "Playlist does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn get_playlist(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let playlist_id = super::parse_object_id(&path.into_inner(), "playlist id")?;

    let pipeline = query::playlist::detail_pipeline(playlist_id);
    let mut cursor = db
        .collection::<Playlist>(PLAYLISTS)
        .aggregate(pipeline, None)
        .await?;
    let document = cursor
        .try_next()
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist does not exist"))?;
    let detail: PlaylistDetail = mongodb::bson::from_document(document)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        detail,
        "Playlist fetched successfully",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlist/add/{video_id}/{playlist_id}",
    params(
        ("video_id" = String, Path, description = "Video id"),
        ("playlist_id" = String, Path, description = "Playlist id")
    ),
    responses(
        (status = 200, description = "Video added", body = PlaylistResponse),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 409, description = "Video already in the playlist")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn add_video(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let (video_id, playlist_id) = path.into_inner();
    let video_id = super::parse_object_id(&video_id, "video id")?;
    let playlist_id = super::parse_object_id(&playlist_id, "playlist id")?;

    let playlist = load_owned_playlist(&db, playlist_id, user.user_id).await?;

    let video = db
        .collection::<Video>(VIDEOS)
        .find_one(doc! { "_id": video_id }, None)
        .await?;
    if video.is_none() {
        return Err(ApiError::not_found("Video does not exist"));
    }

    if playlist.videos.contains(&video_id) {
        return Err(ApiError::Conflict(
            "This video is already in the playlist".to_string(),
        ));
    }

    let updated = db
        .collection::<Playlist>(PLAYLISTS)
        .find_one_and_update(
            doc! { "_id": playlist_id },
            doc! {
                "$addToSet": { "videos": video_id },
                "$set": { "updated_at": Utc::now().timestamp() },
            },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while adding the video".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PlaylistResponse::from(updated), "Video added")))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlist/remove/{video_id}/{playlist_id}",
    params(
        ("video_id" = String, Path, description = "Video id"),
        ("playlist_id" = String, Path, description = "Playlist id")
    ),
    responses(
        (status = 200, description = "Video removed", body = PlaylistResponse),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 409, description = "Video not in the playlist")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn remove_video(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let (video_id, playlist_id) = path.into_inner();
    let video_id = super::parse_object_id(&video_id, "video id")?;
    let playlist_id = super::parse_object_id(&playlist_id, "playlist id")?;

    let playlist = load_owned_playlist(&db, playlist_id, user.user_id).await?;

    let video = db
        .collection::<Video>(VIDEOS)
        .find_one(doc! { "_id": video_id }, None)
        .await?;
    if video.is_none() {
        return Err(ApiError::not_found("Video does not exist"));
    }

    if !playlist.videos.contains(&video_id) {
        return Err(ApiError::Conflict(
            "This video is not in the playlist".to_string(),
        ));
    }

    let updated = db
        .collection::<Playlist>(PLAYLISTS)
        .find_one_and_update(
            doc! { "_id": playlist_id },
            doc! {
                "$pull": { "videos": video_id },
                "$set": { "updated_at": Utc::now().timestamp() },
            },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while removing the video".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PlaylistResponse::from(updated),
        "Video removed",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/playlist/{playlist_id}",
    params(("playlist_id" = String, Path, description = "Playlist id")),
    responses(
        (status = 200, description = "Playlist removed", body = PlaylistResponse),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 404, description = "Playlist does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn delete_playlist(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let playlist_id = super::parse_object_id(&path.into_inner(), "playlist id")?;

    load_owned_playlist(&db, playlist_id, user.user_id).await?;

    let deleted = db
        .collection::<Playlist>(PLAYLISTS)
        .find_one_and_delete(doc! { "_id": playlist_id }, None)
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while deleting the playlist".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PlaylistResponse::from(deleted),
        "Playlist removed",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlist/{playlist_id}",
    params(("playlist_id" = String, Path, description = "Playlist id")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist updated", body = PlaylistResponse),
        (status = 403, description = "Caller does not own the playlist"),
        (status = 404, description = "Playlist does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "playlist"
)]
pub async fn update_playlist(
    path: web::Path<String>,
    req: web::Json<UpdatePlaylistRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let playlist_id = super::parse_object_id(&path.into_inner(), "playlist id")?;

    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if name.is_none() && description.is_none() {
        return Err(ApiError::bad_request("At least provide name or description"));
    }

    let playlist = load_owned_playlist(&db, playlist_id, user.user_id).await?;

    let updated = db
        .collection::<Playlist>(PLAYLISTS)
        .find_one_and_update(
            doc! { "_id": playlist_id },
            doc! { "$set": {
                "name": name.unwrap_or(&playlist.name),
                "description": description.unwrap_or(&playlist.description),
                "updated_at": Utc::now().timestamp(),
            } },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while updating the playlist".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        PlaylistResponse::from(updated),
        "Playlist updated",
    )))
}
