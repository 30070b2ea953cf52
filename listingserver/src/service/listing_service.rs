//! Core listings logic: CRUD with creator-only mutation.
//!
//! Every mutating call follows the same sequence: decode the caller's
//! token, take the per-listing lock, fetch the current listing, compare
//! its creator against the token subject, and only then touch the store.
//! Authorization fully precedes the write; no partial mutation is
//! observable.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use shared::model::{Listing, ListingPatch, NewListing, Patch};
use shared::{AppError, TokenCodec};

#[async_trait]
pub trait ListingSaver: Send + Sync {
    /// Persists a new listing. Fails with `UserNotFound` when `creator`
    /// does not reference a real user.
    async fn save_listing(&self, new: &NewListing, creator: i64) -> Result<i64, AppError>;

    /// Per-field merge: an attribute at `Keep` leaves the stored value
    /// unchanged.
    async fn update_listing(&self, id: i64, patch: &ListingPatch) -> Result<(), AppError>;

    async fn delete_listing(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait ListingProvider: Send + Sync {
    async fn listing(&self, id: i64) -> Result<Listing, AppError>;
}

pub struct ListingService<S, P> {
    saver: Arc<S>,
    provider: Arc<P>,
    codec: TokenCodec,
    // Serializes check-then-act mutations of the same listing id.
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl<S, P> ListingService<S, P>
where
    S: ListingSaver,
    P: ListingProvider,
{
    pub fn new(saver: Arc<S>, provider: Arc<P>, codec: TokenCodec) -> Self {
        Self {
            saver,
            provider,
            codec,
            locks: DashMap::new(),
        }
    }

    /// Creates a listing owned by the token's subject.
    pub async fn create(&self, new: NewListing, token: &str) -> Result<i64, AppError> {
        validate_new_listing(&new)?;

        let claims = self.codec.decode(token)?;

        info!(creator = claims.uid, "started listing creation");

        let id = self.saver.save_listing(&new, claims.uid).await?;

        info!(listing_id = id, "creation succeeded");
        Ok(id)
    }

    /// Fetches a listing. No authorization: listings are public reads.
    pub async fn get(&self, id: i64) -> Result<Listing, AppError> {
        self.provider.listing(id).await
    }

    /// Applies a partial update, creator only.
    pub async fn update(&self, id: i64, patch: ListingPatch, token: &str) -> Result<(), AppError> {
        validate_patch(&patch)?;

        let claims = self.codec.decode(token)?;

        info!(listing_id = id, "started listing update");

        let guard = self.lock_listing(id).await;
        let result = self.authorize(id, claims.uid).await;
        let result = match result {
            Ok(()) => self.saver.update_listing(id, &patch).await,
            Err(e) => Err(e),
        };
        drop(guard);
        self.release_listing(id);

        if result.is_ok() {
            info!(listing_id = id, "update succeeded");
        }
        result
    }

    /// Deletes a listing, creator only.
    pub async fn delete(&self, id: i64, token: &str) -> Result<(), AppError> {
        let claims = self.codec.decode(token)?;

        info!(listing_id = id, "started listing deletion");

        let guard = self.lock_listing(id).await;
        let result = self.authorize(id, claims.uid).await;
        let result = match result {
            Ok(()) => self.saver.delete_listing(id).await,
            Err(e) => Err(e),
        };
        drop(guard);
        self.release_listing(id);

        if result.is_ok() {
            info!(listing_id = id, "deletion succeeded");
        }
        result
    }

    /// Fetch-and-compare step shared by update and delete. Must run under
    /// the listing's lock.
    async fn authorize(&self, id: i64, subject: i64) -> Result<(), AppError> {
        let listing = self.provider.listing(id).await?;

        if listing.creator != subject {
            info!(listing_id = id, subject, "wrong user");
            return Err(AppError::NotEnoughPermissions);
        }

        Ok(())
    }

    async fn lock_listing(&self, id: i64) -> OwnedMutexGuard<()> {
        let cell = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        cell.lock_owned().await
    }

    /// Drops the lock entry once nobody else is waiting on it, keeping
    /// the table bounded by concurrent mutations rather than by every id
    /// ever touched.
    fn release_listing(&self, id: i64) {
        self.locks
            .remove_if(&id, |_, cell| Arc::strong_count(cell) == 1);
    }
}

fn validate_new_listing(new: &NewListing) -> Result<(), AppError> {
    if new.title.is_empty() {
        return Err(AppError::InvalidInput("missing title".into()));
    }
    if new.description.is_empty() {
        return Err(AppError::InvalidInput("missing description".into()));
    }
    if new.category.is_empty() {
        return Err(AppError::InvalidInput("missing category".into()));
    }
    if new.quantity < 0 {
        return Err(AppError::InvalidInput("quantity cannot be negative".into()));
    }
    if new.price < 0 {
        return Err(AppError::InvalidInput("price cannot be negative".into()));
    }
    Ok(())
}

fn validate_patch(patch: &ListingPatch) -> Result<(), AppError> {
    if let Patch::Set(title) = &patch.title {
        if title.is_empty() {
            return Err(AppError::InvalidInput("title cannot be empty".into()));
        }
    }
    if let Patch::Set(quantity) = patch.quantity {
        if quantity < 0 {
            return Err(AppError::InvalidInput("quantity cannot be negative".into()));
        }
    }
    if let Patch::Set(price) = patch.price {
        if price < 0 {
            return Err(AppError::InvalidInput("price cannot be negative".into()));
        }
    }
    Ok(())
}
