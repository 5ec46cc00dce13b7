use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OwnerSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub subscriber: ObjectId,
    pub channel: ObjectId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(subscriber: ObjectId, channel: ObjectId) -> Self {
        Subscription {
            id: ObjectId::new(),
            subscriber,
            channel,
            created_at: Utc::now(),
        }
    }
}

/// Toggle outcome reported to the caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionStatus {
    pub status: String,
}

/// One joined subscriber row: the subscription id plus the subscriber's
/// user summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriberEntry {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub subscriber: OwnerSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriberList {
    pub subscriber: Vec<SubscriberEntry>,
    #[serde(rename = "totalSubscriber")]
    pub total_subscriber: u64,
}

/// One joined channel row for a subscriber's channel listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelEntry {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    #[schema(value_type = String)]
    pub id: ObjectId,
    pub channel: OwnerSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelList {
    pub channel: Vec<ChannelEntry>,
    #[serde(rename = "totalChannel")]
    pub total_channel: u64,
}
