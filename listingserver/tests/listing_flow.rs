//! End-to-end flow over both services against one shared database:
//! register, login, create, partially update, read back and delete,
//! including the denial of a foreign token.

use chrono::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

use listingserver::service::ListingService;
use listingserver::storage::SqliteStorage as ListingStorage;
use shared::model::{ListingPatch, NewListing, Patch};
use shared::{AppError, FixedKey, TokenCodec};
use ssoserver::service::AuthService;
use ssoserver::storage::SqliteStorage as SsoStorage;

const SECRET: &[u8] = b"test-secret";
const APP_ID: i64 = 1;

type Auth = AuthService<SsoStorage, SsoStorage, SsoStorage>;
type Listings = ListingService<ListingStorage, ListingStorage>;

async fn setup() -> (Auth, Listings) {
    // One connection, one in-memory database shared by both services.
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(SqliteConnectOptions::new().foreign_keys(true))
        .await
        .expect("failed to open in-memory database");

    let sso_storage = Arc::new(
        SsoStorage::from_pool(pool.clone())
            .await
            .expect("sso schema"),
    );
    let listing_storage = Arc::new(
        ListingStorage::from_pool(pool.clone())
            .await
            .expect("listings schema"),
    );

    sqlx::query("INSERT INTO apps (id, name, secret) VALUES (?, ?, ?)")
        .bind(APP_ID)
        .bind("shop")
        .bind(SECRET)
        .execute(&pool)
        .await
        .expect("insert app");

    let codec = TokenCodec::new(Arc::new(FixedKey::new(SECRET)));
    let auth = AuthService::new(
        sso_storage.clone(),
        sso_storage.clone(),
        sso_storage,
        codec.clone(),
        Duration::hours(1),
    );
    let listings = ListingService::new(listing_storage.clone(), listing_storage, codec);

    (auth, listings)
}

fn sample_new() -> NewListing {
    NewListing {
        title: "T1".into(),
        description: "D".into(),
        quantity: 5,
        category: "c".into(),
        closed: false,
        price: 100,
    }
}

#[tokio::test]
async fn test_full_listing_lifecycle() {
    let (auth, listings) = setup().await;

    let owner_id = auth.register("a@x.com", "pw1").await.expect("register");
    let token = auth.login("a@x.com", "pw1", APP_ID).await.expect("login");

    let listing_id = listings
        .create(sample_new(), &token)
        .await
        .expect("create");

    let created = listings.get(listing_id).await.expect("get");
    assert_eq!(created.creator, owner_id);
    assert_eq!(created.price, 100);

    // Partial update: only the price moves.
    let patch = ListingPatch {
        price: Patch::Set(150),
        ..ListingPatch::default()
    };
    listings
        .update(listing_id, patch, &token)
        .await
        .expect("update");

    let updated = listings.get(listing_id).await.expect("get");
    assert_eq!(updated.price, 150);
    assert_eq!(updated.title, "T1");
    assert_eq!(updated.description, "D");
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.category, "c");
    assert!(!updated.closed);

    listings.delete(listing_id, &token).await.expect("delete");
    assert_eq!(
        listings.get(listing_id).await,
        Err(AppError::ListingNotFound)
    );
}

#[tokio::test]
async fn test_foreign_token_cannot_mutate() {
    let (auth, listings) = setup().await;

    auth.register("a@x.com", "pw1").await.expect("register a");
    let owner_token = auth.login("a@x.com", "pw1", APP_ID).await.expect("login a");

    auth.register("b@x.com", "pw2").await.expect("register b");
    let other_token = auth.login("b@x.com", "pw2", APP_ID).await.expect("login b");

    let listing_id = listings
        .create(sample_new(), &owner_token)
        .await
        .expect("create");

    let patch = ListingPatch {
        price: Patch::Set(999),
        ..ListingPatch::default()
    };
    assert_eq!(
        listings.update(listing_id, patch, &other_token).await,
        Err(AppError::NotEnoughPermissions)
    );
    assert_eq!(
        listings.delete(listing_id, &other_token).await,
        Err(AppError::NotEnoughPermissions)
    );

    // Untouched by the denied calls.
    let listing = listings.get(listing_id).await.expect("get");
    assert_eq!(listing.price, 100);
}

#[tokio::test]
async fn test_token_of_unregistered_user_fails_creation() {
    let (_auth, listings) = setup().await;

    // Signed and in-date, but the subject was never registered, so the
    // creator foreign key cannot resolve.
    let codec = TokenCodec::new(Arc::new(FixedKey::new(SECRET)));
    let ghost = shared::model::User {
        id: 999,
        email: "ghost@x.com".into(),
        pass_hash: Vec::new(),
    };
    let app = shared::model::App {
        id: APP_ID,
        name: "shop".into(),
        secret_key: SECRET.to_vec(),
    };
    let token = codec
        .issue(&ghost, &app, Duration::hours(1))
        .expect("issue");

    assert_eq!(
        listings.create(sample_new(), &token).await,
        Err(AppError::UserNotFound)
    );
}
