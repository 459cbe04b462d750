use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type ProductId = i64;

/// Point-in-time read of a tracked product, as served by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// `None` or `0.0` until the backend has scraped a price.
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub target_price: f64,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub price_selector: Option<String>,
    #[serde(default)]
    pub notification_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_checked: Option<NaiveDateTime>,
}

impl Product {
    /// Product URL, skipping blank values.
    pub fn link(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Payload for registering a new product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub target_price: f64,
    pub price_selector: Option<String>,
    pub notification_email: Option<String>,
    pub current_price: f64,
    pub is_active: bool,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, url: impl Into<String>, target_price: f64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
            target_price,
            price_selector: None,
            notification_email: None,
            current_price: 0.0,
            is_active: true,
        }
    }

    /// Blank form fields go over the wire as null.
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        self.description = blank_to_none(self.description);
        self.price_selector = blank_to_none(self.price_selector);
        self.notification_email = blank_to_none(self.notification_email);
        self.current_price = 0.0;
        self.is_active = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub price: f64,
    pub recorded_at: NaiveDateTime,
}

/// Prices seen around a single check. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceObservation {
    pub old_price: Option<f64>,
    pub new_price: f64,
    pub target_price: f64,
}

impl PriceObservation {
    /// The target is taken from the post-check snapshot, which is authoritative.
    pub fn from_snapshots(before: &Product, after: &Product) -> Self {
        Self {
            old_price: before.current_price,
            new_price: after.current_price.unwrap_or(0.0),
            target_price: after.target_price,
        }
    }
}
