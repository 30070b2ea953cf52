//! Listing domain models.

/// Sellable item. `creator` is set once at creation from the token
/// subject and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub quantity: i64,
    pub category: String,
    pub closed: bool,
    pub price: i64,
    pub creator: i64,
}

/// Field set of a listing to be created. The creator is not part of it;
/// it always comes from the caller's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub quantity: i64,
    pub category: String,
    pub closed: bool,
    pub price: i64,
}

/// One updatable attribute: either left alone or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Patch<T> {
    pub fn from_option(opt: Option<T>) -> Self {
        match opt {
            Some(value) => Patch::Set(value),
            None => Patch::Keep,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Keep => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }
}

/// Partial update of a listing. An attribute left at `Keep` must not
/// alter the persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub quantity: Patch<i64>,
    pub category: Patch<String>,
    pub closed: Patch<bool>,
    pub price: Patch<i64>,
}

impl ListingPatch {
    /// Applies the patch to a listing in place. Mirrors what the storage
    /// merge does, used by tests and in-memory doubles.
    pub fn apply_to(&self, listing: &mut Listing) {
        if let Patch::Set(title) = &self.title {
            listing.title = title.clone();
        }
        if let Patch::Set(description) = &self.description {
            listing.description = description.clone();
        }
        if let Patch::Set(quantity) = self.quantity {
            listing.quantity = quantity;
        }
        if let Patch::Set(category) = &self.category {
            listing.category = category.clone();
        }
        if let Patch::Set(closed) = self.closed {
            listing.closed = closed;
        }
        if let Patch::Set(price) = self.price {
            listing.price = price;
        }
    }
}
