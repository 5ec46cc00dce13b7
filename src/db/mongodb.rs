use crate::config::Config;
use mongodb::bson::{doc, Document};
use mongodb::options::{Collation, CollationStrength, IndexOptions};
use mongodb::{Client, Database, IndexModel};

pub const USERS: &str = "users";
pub const VIDEOS: &str = "videos";
pub const COMMENTS: &str = "comments";
pub const LIKES: &str = "likes";
pub const TWEETS: &str = "tweets";
pub const PLAYLISTS: &str = "playlists";
pub const SUBSCRIPTIONS: &str = "subscriptions";

pub async fn create_mongodb_client(config: &Config) -> Result<Database, anyhow::Error> {
    let client = Client::with_uri_str(&config.mongodb.uri).await?;
    let db = client.database(&config.mongodb.database);
    Ok(db)
}

/// Unique indexes backing the store-level invariants: one like per
/// (user, target), one subscription per (subscriber, channel), and
/// case-insensitive unique usernames and emails.
pub async fn ensure_indexes(db: &Database) -> Result<(), anyhow::Error> {
    let case_insensitive = Collation::builder()
        .locale("en")
        .strength(CollationStrength::Secondary)
        .build();

    let users = db.collection::<Document>(USERS);
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .collation(case_insensitive.clone())
                        .build(),
                )
                .build(),
            None,
        )
        .await?;
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .collation(case_insensitive)
                        .build(),
                )
                .build(),
            None,
        )
        .await?;

    db.collection::<Document>(LIKES)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "like_by": 1, "target_kind": 1, "target_id": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            None,
        )
        .await?;

    db.collection::<Document>(SUBSCRIPTIONS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "subscriber": 1, "channel": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            None,
        )
        .await?;

    Ok(())
}
