use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;
use serde::Deserialize;

use crate::auth::{
    create_token, hash_password, verify_password, AuthenticatedUser, Claims, RefreshClaims,
};
use crate::config::Config;
use crate::db::USERS;
use crate::error::{is_duplicate_key, ApiError, ApiResult};
use crate::models::{
    ApiResponse, AuthResponse, ChangePasswordRequest, ChannelProfile, LoginRequest,
    RefreshTokenRequest, RegisterRequest, TokenPairResponse, UpdateAccountRequest,
    UpdateAvatarRequest, UpdateCoverImageRequest, User, UserResponse, VideoListItem,
};
use crate::query;
use crate::storage::AssetStore;

const MIN_PASSWORD_LEN: usize = 6;

/// Issues an access/refresh pair and persists the refresh token on the user.
async fn generate_access_and_refresh_tokens(
    db: &Database,
    config: &Config,
    user: &User,
) -> ApiResult<(String, String)> {
    let access_claims = Claims::new(
        user.id,
        user.email.clone(),
        config.jwt.access_expiration_hours,
    );
    let access_token = create_token(&access_claims, &config.jwt.access_secret)
        .map_err(|e| ApiError::Internal(format!("failed to sign access token: {}", e)))?;

    let refresh_claims = RefreshClaims::new(user.id, config.jwt.refresh_expiration_days);
    let refresh_token = create_token(&refresh_claims, &config.jwt.refresh_secret)
        .map_err(|e| ApiError::Internal(format!("failed to sign refresh token: {}", e)))?;

    db.collection::<User>(USERS)
        .update_one(
            doc! { "_id": user.id },
            doc! { "$set": { "refresh_token": &refresh_token } },
            None,
        )
        .await?;

    Ok((access_token, refresh_token))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "user"
)]
pub async fn register(
    req: web::Json<RegisterRequest>,
    db: web::Data<Database>,
    storage: web::Data<AssetStore>,
) -> ApiResult<HttpResponse> {
    let full_name = req.full_name.trim();
    let email = req.email.trim();
    let username = req.username.trim().to_lowercase();

    if full_name.is_empty() || email.is_empty() || username.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }
    if !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    if req.password.trim().len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    if req.avatar.trim().is_empty() {
        return Err(ApiError::bad_request("Avatar file is required"));
    }

    let users = db.collection::<User>(USERS);
    let existing = users
        .find_one(
            doc! { "$or": [ { "username": &username }, { "email": email } ] },
            None,
        )
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "User with email or username already exists".to_string(),
        ));
    }

    let avatar = storage
        .upload(req.avatar.trim())
        .await
        .map_err(|e| ApiError::UploadFailed(format!("Failed to upload avatar: {}", e)))?;
    let cover_image = match req.cover_image.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => {
            let uploaded = storage.upload(path).await.map_err(|e| {
                ApiError::UploadFailed(format!("Failed to upload cover image: {}", e))
            })?;
            uploaded.url
        }
        _ => String::new(),
    };

    let password_hash = hash_password(req.password.trim())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;

    let user = User::new(
        username,
        email.to_string(),
        full_name.to_string(),
        password_hash,
        avatar.url,
        cover_image,
    );

    // The unique indexes close the find-then-create race.
    if let Err(e) = users.insert_one(&user, None).await {
        if is_duplicate_key(&e) {
            return Err(ApiError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }
        return Err(e.into());
    }

    Ok(HttpResponse::Created().json(ApiResponse::created(
        UserResponse::from(user),
        "User registered successfully",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User does not exist")
    ),
    tag = "user"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let identifier = req.identifier.trim();
    if identifier.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username or email is required"));
    }

    let filter = if identifier.contains('@') {
        doc! { "email": identifier }
    } else {
        doc! { "username": identifier.to_lowercase() }
    };

    let users = db.collection::<User>(USERS);
    let user = users
        .find_one(filter, None)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))?;

    let is_valid = verify_password(&req.password, &user.password)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {}", e)))?;
    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid user credentials".to_string()));
    }

    let (access_token, refresh_token) =
        generate_access_and_refresh_tokens(&db, &config, &user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
        },
        "User logged in successfully",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/logout",
    responses((status = 200, description = "Logged out")),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn logout(user: AuthenticatedUser, db: web::Data<Database>) -> ApiResult<HttpResponse> {
    db.collection::<User>(USERS)
        .update_one(
            doc! { "_id": user.user_id },
            doc! { "$unset": { "refresh_token": "" } },
            None,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        serde_json::json!({}),
        "User logged out successfully",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenPairResponse),
        (status = 401, description = "Refresh token invalid, expired or already used")
    ),
    tag = "user"
)]
pub async fn refresh_token(
    req: web::Json<RefreshTokenRequest>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let incoming = req.refresh_token.trim();
    if incoming.is_empty() {
        return Err(ApiError::Unauthorized("Refresh token is required".to_string()));
    }

    let claims: RefreshClaims = crate::auth::verify_token(incoming, &config.jwt.refresh_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;
    let user_id = super::parse_object_id(&claims.sub, "user id")
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let users = db.collection::<User>(USERS);
    let user = users
        .find_one(doc! { "_id": user_id }, None)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    if user.refresh_token.as_deref() != Some(incoming) {
        return Err(ApiError::Unauthorized(
            "Refresh token is expired or already used".to_string(),
        ));
    }

    let (access_token, refresh_token) =
        generate_access_and_refresh_tokens(&db, &config, &user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        TokenPairResponse {
            access_token,
            refresh_token,
        },
        "Access token refreshed",
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/user/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Invalid old password")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn change_password(
    req: web::Json<ChangePasswordRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    if req.new_password.trim().len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let users = db.collection::<User>(USERS);
    let stored = users
        .find_one(doc! { "_id": user.user_id }, None)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()))?;

    let is_valid = verify_password(&req.old_password, &stored.password)
        .map_err(|e| ApiError::Internal(format!("password verification failed: {}", e)))?;
    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid old password".to_string()));
    }

    let password_hash = hash_password(req.new_password.trim())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?;
    users
        .update_one(
            doc! { "_id": user.user_id },
            doc! { "$set": { "password": password_hash, "updated_at": Utc::now().timestamp() } },
            None,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses((status = 200, description = "Current user", body = UserResponse)),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn current_user(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let stored = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": user.user_id }, None)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        UserResponse::from(stored),
        "Current user fetched successfully",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/update-details",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 409, description = "Username or email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn update_account(
    req: web::Json<UpdateAccountRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let full_name = req.full_name.trim();
    let email = req.email.trim();
    let username = req.username.trim().to_lowercase();
    if full_name.is_empty() || email.is_empty() || username.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let updated = db
        .collection::<User>(USERS)
        .find_one_and_update(
            doc! { "_id": user.user_id },
            doc! { "$set": {
                "full_name": full_name,
                "email": email,
                "username": username,
                "updated_at": Utc::now().timestamp(),
            } },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        UserResponse::from(updated),
        "Account details updated",
    )))
}

/// Uploads a replacement asset, persists its url under `field`, then removes
/// the previous asset. Deletion happens last so a failed upload can never
/// lose the current asset.
async fn replace_user_asset(
    db: &Database,
    storage: &AssetStore,
    user_id: mongodb::bson::oid::ObjectId,
    field: &str,
    local_path: &str,
) -> ApiResult<User> {
    let users = db.collection::<User>(USERS);
    let current = users
        .find_one(doc! { "_id": user_id }, None)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()))?;

    let uploaded = storage
        .upload(local_path)
        .await
        .map_err(|e| ApiError::UploadFailed(format!("Failed to upload {}: {}", field, e)))?;

    let updated = users
        .find_one_and_update(
            doc! { "_id": user_id },
            doc! { "$set": { field: &uploaded.url, "updated_at": Utc::now().timestamp() } },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| ApiError::Internal(format!("failed to persist new {}", field)))?;

    let old_url = match field {
        "avatar" => current.avatar,
        _ => current.cover_image,
    };
    if !old_url.is_empty() {
        if let Err(e) = storage.delete(&old_url).await {
            log::warn!("failed to delete stale {} {}: {}", field, old_url, e);
        }
    }

    Ok(updated)
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/change-avatar",
    request_body = UpdateAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = UserResponse),
        (status = 502, description = "Upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn update_avatar(
    req: web::Json<UpdateAvatarRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<AssetStore>,
) -> ApiResult<HttpResponse> {
    let path = req.avatar.trim();
    if path.is_empty() {
        return Err(ApiError::bad_request("Avatar file is missing"));
    }

    let updated = replace_user_asset(&db, &storage, user.user_id, "avatar", path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        UserResponse::from(updated),
        "Avatar updated",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/user/change-cover-image",
    request_body = UpdateCoverImageRequest,
    responses(
        (status = 200, description = "Cover image updated", body = UserResponse),
        (status = 502, description = "Upload failed")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn update_cover_image(
    req: web::Json<UpdateCoverImageRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
    storage: web::Data<AssetStore>,
) -> ApiResult<HttpResponse> {
    let path = req.cover_image.trim();
    if path.is_empty() {
        return Err(ApiError::bad_request("Cover image file is missing"));
    }

    let updated = replace_user_asset(&db, &storage, user.user_id, "cover_image", path).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        UserResponse::from(updated),
        "Cover image updated",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/channel/{username}",
    params(("username" = String, Path, description = "Channel username")),
    responses(
        (status = 200, description = "Channel profile", body = ChannelProfile),
        (status = 404, description = "Channel does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn channel_profile(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let username = path.into_inner();
    if username.trim().is_empty() {
        return Err(ApiError::bad_request("username is missing"));
    }

    let pipeline = query::user::channel_profile_pipeline(username.trim(), user.user_id);
    let mut cursor = db
        .collection::<User>(USERS)
        .aggregate(pipeline, None)
        .await?;
    let channel = cursor
        .try_next()
        .await?
        .ok_or_else(|| ApiError::not_found("Channel does not exist"))?;
    let profile: ChannelProfile = mongodb::bson::from_document(channel)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        profile,
        "User channel fetched successfully",
    )))
}

#[derive(Debug, Deserialize)]
struct WatchHistoryDocument {
    watch_history: Vec<VideoListItem>,
}

#[utoipa::path(
    get,
    path = "/api/v1/user/watch-history",
    responses(
        (status = 200, description = "Watch history", body = Vec<VideoListItem>)
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn watch_history(
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let pipeline = query::user::watch_history_pipeline(user.user_id);
    let mut cursor = db
        .collection::<User>(USERS)
        .aggregate(pipeline, None)
        .await?;
    let document = cursor
        .try_next()
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()))?;
    let history: WatchHistoryDocument = mongodb::bson::from_document(document)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        history.watch_history,
        "Watch history fetched successfully",
    )))
}
