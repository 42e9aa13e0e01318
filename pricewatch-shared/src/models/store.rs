use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storefront a listing was scraped from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Store {
    MercadoLibre,
    Alkosto,
    Metrocuadrado,
}

impl Store {
    pub const ALL: [Store; 3] = [Store::MercadoLibre, Store::Alkosto, Store::Metrocuadrado];

    /// Infer the store from a listing URL; anything that is not a
    /// MercadoLibre link is attributed to Alkosto.
    pub fn from_url(url: &str) -> Self {
        if url.to_ascii_lowercase().contains("mercadolibre") {
            Store::MercadoLibre
        } else {
            Store::Alkosto
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Store::MercadoLibre => "MercadoLibre",
            Store::Alkosto => "Alkosto",
            Store::Metrocuadrado => "Metrocuadrado",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Store {
    type Err = StoreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Store::ALL
            .into_iter()
            .find(|store| store.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreParseError::Unknown(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreParseError {
    #[error("Unknown store label: {0}")]
    Unknown(String),
}
