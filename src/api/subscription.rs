use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Database;

use crate::auth::AuthenticatedUser;
use crate::db::{SUBSCRIPTIONS, USERS};
use crate::error::{is_duplicate_key, ApiError, ApiResult};
use crate::models::{
    ApiResponse, ChannelEntry, ChannelList, SubscriberEntry, SubscriberList, Subscription,
    SubscriptionStatus, User,
};
use crate::query;

#[utoipa::path(
    post,
    path = "/api/v1/subscription/{channel_id}",
    params(("channel_id" = String, Path, description = "Channel user id")),
    responses(
        (status = 200, description = "Subscription toggled", body = SubscriptionStatus),
        (status = 404, description = "Channel does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "subscription"
)]
pub async fn toggle_subscription(
    path: web::Path<String>,
    user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let channel_id = super::parse_object_id(&path.into_inner(), "channel id")?;

    let channel = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": channel_id }, None)
        .await?;
    if channel.is_none() {
        return Err(ApiError::not_found("Channel does not exist"));
    }

    let subscriptions = db.collection::<Subscription>(SUBSCRIPTIONS);
    let filter = doc! { "subscriber": user.user_id, "channel": channel_id };

    if subscriptions
        .find_one_and_delete(filter, None)
        .await?
        .is_some()
    {
        return Ok(HttpResponse::Ok().json(ApiResponse::ok(
            SubscriptionStatus {
                status: "unsubscribed".to_string(),
            },
            "Subscription removed",
        )));
    }

    // A duplicate-key loss here means a concurrent toggle already
    // subscribed; either way the subscribed state holds.
    let subscription = Subscription::new(user.user_id, channel_id);
    if let Err(e) = subscriptions.insert_one(&subscription, None).await {
        if !is_duplicate_key(&e) {
            return Err(e.into());
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        SubscriptionStatus {
            status: "subscribed".to_string(),
        },
        "Subscription added",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscription/channel/{channel_id}/subscribers",
    params(("channel_id" = String, Path, description = "Channel user id")),
    responses(
        (status = 200, description = "Joined subscriber summaries", body = SubscriberList),
        (status = 404, description = "Channel absent or has no subscribers")
    ),
    security(("bearer_auth" = [])),
    tag = "subscription"
)]
pub async fn get_channel_subscribers(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let channel_id = super::parse_object_id(&path.into_inner(), "channel id")?;

    let channel = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": channel_id }, None)
        .await?;
    if channel.is_none() {
        return Err(ApiError::not_found("Channel does not exist"));
    }

    let pipeline = query::subscription::subscribers_pipeline(channel_id);
    let documents: Vec<Document> = db
        .collection::<Subscription>(SUBSCRIPTIONS)
        .aggregate(pipeline, None)
        .await?
        .try_collect()
        .await?;

    if documents.is_empty() {
        return Err(ApiError::not_found("This channel has no subscribers"));
    }

    let subscriber: Vec<SubscriberEntry> = documents
        .into_iter()
        .map(mongodb::bson::from_document)
        .collect::<Result<_, _>>()?;
    let total_subscriber = subscriber.len() as u64;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        SubscriberList {
            subscriber,
            total_subscriber,
        },
        "Subscribers fetched successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscription/user/{subscriber_id}/channels",
    params(("subscriber_id" = String, Path, description = "Subscriber user id")),
    responses(
        (status = 200, description = "Joined channel summaries", body = ChannelList),
        (status = 404, description = "User absent or subscribes to nothing")
    ),
    security(("bearer_auth" = [])),
    tag = "subscription"
)]
pub async fn get_subscribed_channels(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    db: web::Data<Database>,
) -> ApiResult<HttpResponse> {
    let subscriber_id = super::parse_object_id(&path.into_inner(), "subscriber id")?;

    let subscriber = db
        .collection::<User>(USERS)
        .find_one(doc! { "_id": subscriber_id }, None)
        .await?;
    if subscriber.is_none() {
        return Err(ApiError::not_found("User does not exist"));
    }

    let pipeline = query::subscription::channels_pipeline(subscriber_id);
    let documents: Vec<Document> = db
        .collection::<Subscription>(SUBSCRIPTIONS)
        .aggregate(pipeline, None)
        .await?
        .try_collect()
        .await?;

    if documents.is_empty() {
        return Err(ApiError::not_found("This user has no subscriptions"));
    }

    let channel: Vec<ChannelEntry> = documents
        .into_iter()
        .map(mongodb::bson::from_document)
        .collect::<Result<_, _>>()?;
    let total_channel = channel.len() as u64;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(
        ChannelList {
            channel,
            total_channel,
        },
        "Subscribed channels fetched successfully",
    )))
}
