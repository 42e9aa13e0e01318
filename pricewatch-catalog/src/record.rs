use chrono::{DateTime, Utc};
use pricewatch_shared::{normalize, text::try_parse_price, ListingPayload, Store};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Records are shared between the canonical list and every index
pub type SharedRecord = Arc<Record>;

/// Catalog-unique record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracks the next free record id.
///
/// Once `u64::MAX` has been observed there is no free id left and
/// `peek_next` returns `None` instead of wrapping.
#[derive(Debug)]
pub struct IdAllocator {
    next: Option<u64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: Some(0) }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure ids handed out later never collide with `id`
    pub fn observe(&mut self, id: RecordId) {
        if let Some(next) = self.next {
            if id.0 >= next {
                self.next = id.0.checked_add(1);
            }
        }
    }

    pub fn peek_next(&self) -> Option<RecordId> {
        self.next.map(RecordId)
    }
}

/// Fields supplied by the ingestion side before an id is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub title: String,
    pub price_original_text: String,
    pub price_sell_text: String,
    pub discount_text: String,
    pub image_ref: String,
    pub source_url: String,
    pub store: Store,
    pub rating: Option<String>,
    pub description: Option<String>,
}

impl RecordDraft {
    pub fn new(title: impl Into<String>, price_sell_text: impl Into<String>, store: Store) -> Self {
        Self {
            title: title.into(),
            price_original_text: String::new(),
            price_sell_text: price_sell_text.into(),
            discount_text: String::new(),
            image_ref: String::new(),
            source_url: String::new(),
            store,
            rating: None,
            description: None,
        }
    }

    pub fn with_original_price(mut self, text: impl Into<String>) -> Self {
        self.price_original_text = text.into();
        self
    }

    pub fn with_discount(mut self, text: impl Into<String>) -> Self {
        self.discount_text = text.into();
        self
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl TryFrom<ListingPayload> for RecordDraft {
    type Error = RecordError;

    fn try_from(payload: ListingPayload) -> Result<Self, Self::Error> {
        if !payload.is_complete() {
            return Err(RecordError::IncompleteListing(payload.url));
        }

        let store = payload.store();
        let rating = payload.rating_text();
        let description = payload.description_text();

        Ok(Self {
            title: payload.title,
            price_original_text: payload.price_original,
            price_sell_text: payload.price_sell,
            discount_text: payload.discount,
            image_ref: payload.image,
            source_url: payload.url,
            store,
            rating,
            description,
        })
    }
}

/// Canonical catalog entity.
///
/// Everything except `rating` and `description` is fixed at construction;
/// those two may each be set once afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    id: RecordId,
    title: String,
    normalized_title: String,
    price_original_text: String,
    price_display_text: String,
    price_value: f64,
    discount_text: String,
    image_ref: String,
    source_url: String,
    store: Store,
    rating: Option<String>,
    description: Option<String>,
    captured_at: DateTime<Utc>,
}

impl Record {
    /// Build a fresh record captured now
    pub fn new(id: RecordId, draft: RecordDraft) -> Self {
        Self::restore(id, draft, Utc::now())
    }

    /// Rebuild a record loaded from persistence, keeping its capture time
    pub fn restore(id: RecordId, draft: RecordDraft, captured_at: DateTime<Utc>) -> Self {
        let price_value = match try_parse_price(&draft.price_sell_text) {
            Some(value) => value,
            None => {
                tracing::warn!(
                    record_id = id.0,
                    price_text = %draft.price_sell_text,
                    "Unparsable price, indexing at 0.0"
                );
                0.0
            }
        };

        Self {
            id,
            normalized_title: normalize(&draft.title),
            title: draft.title,
            price_original_text: draft.price_original_text,
            price_display_text: draft.price_sell_text,
            price_value,
            discount_text: draft.discount_text,
            image_ref: draft.image_ref,
            source_url: draft.source_url,
            store: draft.store,
            rating: draft.rating,
            description: draft.description,
            captured_at,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn normalized_title(&self) -> &str {
        &self.normalized_title
    }

    pub fn price_original_text(&self) -> &str {
        &self.price_original_text
    }

    pub fn price_display_text(&self) -> &str {
        &self.price_display_text
    }

    pub fn price_value(&self) -> f64 {
        self.price_value
    }

    pub fn discount_text(&self) -> &str {
        &self.discount_text
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn store(&self) -> Store {
        self.store
    }

    pub fn rating(&self) -> Option<&str> {
        self.rating.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn set_rating(&mut self, rating: impl Into<String>) -> Result<(), RecordError> {
        if self.rating.is_some() {
            return Err(RecordError::FieldAlreadySet { id: self.id, field: "rating" });
        }
        self.rating = Some(rating.into());
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), RecordError> {
        if self.description.is_some() {
            return Err(RecordError::FieldAlreadySet { id: self.id, field: "description" });
        }
        self.description = Some(description.into());
        Ok(())
    }

    /// Back to a draft, e.g. for persistence
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            title: self.title.clone(),
            price_original_text: self.price_original_text.clone(),
            price_sell_text: self.price_display_text.clone(),
            discount_text: self.discount_text.clone(),
            image_ref: self.image_ref.clone(),
            source_url: self.source_url.clone(),
            store: self.store,
            rating: self.rating.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Record {id}: {field} is already set")]
    FieldAlreadySet { id: RecordId, field: &'static str },

    #[error("Listing is missing a title or sell price: {0}")]
    IncompleteListing(String),

    #[error("No record ids left to allocate")]
    IdsExhausted,
}
