use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Database;

use crate::auth::AuthenticatedUser;
use crate::db::TWEETS;
use crate::error::{ApiError, ApiResult};
use crate::models::{ApiResponse, Tweet, TweetRequest, TweetResponse};

/// Loads a tweet and verifies the caller owns it.
async fn load_owned_tweet(
    db: &Database,
    tweet_id: mongodb::bson::oid::ObjectId,
    caller: mongodb::bson::oid::ObjectId,
) -> ApiResult<Tweet> {
    let tweet = db
        .collection::<Tweet>(TWEETS)
        .find_one(doc! { "_id": tweet_id }, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet does not exist"))?;

    if tweet.owner != caller {
        return Err(ApiError::Forbidden(
            "You don't have permission to modify this tweet".to_string(),
        ));
    }

    Ok(tweet)
}

#[utoipa::path(
    post,
    path = "/api/v1/tweets",
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet created", body = TweetResponse),
        (status = 400, description = "Missing content")
    ),
    security(("bearer_auth" = [])),
    tag = "tweet"
)]
pub async fn create_tweet(
    req: web::Json<TweetRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Please enter content"));
    }

    let tweet = Tweet::new(content.to_string(), user.user_id);
    db.collection::<Tweet>(TWEETS)
        .insert_one(&tweet, None)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        TweetResponse::from(tweet),
        "Tweet created successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets/user/{user_id}",
    params(("user_id" = String, Path, description = "Owner user id")),
    responses(
        (status = 200, description = "The user's tweets", body = Vec<TweetResponse>),
        (status = 403, description = "Caller is not the requested user")
    ),
    security(("bearer_auth" = [])),
    tag = "tweet"
)]
pub async fn get_user_tweets(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let user_id = super::parse_object_id(&path.into_inner(), "user id")?;
    if user_id != user.user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let tweets: Vec<Tweet> = db
        .collection::<Tweet>(TWEETS)
        .find(doc! { "owner": user_id }, None)
        .await?
        .try_collect()
        .await?;
    let tweets: Vec<TweetResponse> = tweets.into_iter().map(TweetResponse::from).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        tweets,
        "User tweets fetched successfully",
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tweets/{tweet_id}",
    params(("tweet_id" = String, Path, description = "Tweet id")),
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = TweetResponse),
        (status = 403, description = "Caller does not own the tweet"),
        (status = 404, description = "Tweet does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "tweet"
)]
pub async fn update_tweet(
    path: web::Path<String>,
    req: web::Json<TweetRequest>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let tweet_id = super::parse_object_id(&path.into_inner(), "tweet id")?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Please enter the content"));
    }

    load_owned_tweet(&db, tweet_id, user.user_id).await?;

    let updated = db
        .collection::<Tweet>(TWEETS)
        .find_one_and_update(
            doc! { "_id": tweet_id },
            doc! { "$set": { "content": content, "updated_at": Utc::now().timestamp() } },
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while updating the tweet".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        TweetResponse::from(updated),
        "Tweet updated successfully",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tweets/{tweet_id}",
    params(("tweet_id" = String, Path, description = "Tweet id")),
    responses(
        (status = 200, description = "Tweet deleted", body = TweetResponse),
        (status = 403, description = "Caller does not own the tweet"),
        (status = 404, description = "Tweet does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "tweet"
)]
pub async fn delete_tweet(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let tweet_id = super::parse_object_id(&path.into_inner(), "tweet id")?;

    load_owned_tweet(&db, tweet_id, user.user_id).await?;

    let deleted = db
        .collection::<Tweet>(TWEETS)
        .find_one_and_delete(doc! { "_id": tweet_id }, None)
        .await?
        .ok_or_else(|| {
            ApiError::Internal("Something went wrong while deleting the tweet".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        TweetResponse::from(deleted),
        "Tweet deleted successfully",
    )))
}
