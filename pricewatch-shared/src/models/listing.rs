use serde::{Deserialize, Serialize};
use crate::models::store::Store;

/// Listing as emitted by the scraping pipeline, one JSON object per product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price_original: String,
    #[serde(default)]
    pub price_sell: String,
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub url: String,
    /// Either `{"rating": "4.5 de 5", "rating_count": "..."}` or plain text
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ListingPayload {
    /// A listing needs at least a title and a sell price to be catalogued
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.price_sell.trim().is_empty()
    }

    pub fn store(&self) -> Store {
        Store::from_url(&self.url)
    }

    /// Rating text, if the scraper found one
    pub fn rating_text(&self) -> Option<String> {
        let text = match self.rating.as_ref()? {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(obj) => obj.get("rating")?.as_str()?.to_string(),
            _ => return None,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "N/A" {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Description, ignoring the `"None"` placeholder
    pub fn description_text(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && *d != "None")
            .map(str::to_string)
    }
}
