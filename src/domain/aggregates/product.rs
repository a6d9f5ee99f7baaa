//! Product Aggregate

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use crate::domain::value_objects::lenient;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    #[serde(with = "lenient::decimal")]
    pub price: Decimal,
    #[serde(with = "lenient::decimal")]
    pub discount_price: Decimal,
    #[serde(with = "lenient::quantity")]
    pub stock: u32,
    #[serde(with = "lenient::decimal")]
    pub weight: Decimal,
    pub dimensions: Dimensions,
    pub images: Vec<ProductImage>,
    pub color: String,
    pub size: String,
    pub material: String,
    pub tags: Vec<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Fields this model does not know about, kept so imported records survive untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    #[serde(deserialize_with = "lenient::text::deserialize")] pub length: String,
    #[serde(deserialize_with = "lenient::text::deserialize")] pub width: String,
    #[serde(deserialize_with = "lenient::text::deserialize")] pub height: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)] pub name: String,
    #[serde(default, alias = "dataURI")] pub data: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductStatus { #[default] Active, Pending, Other(String) }

impl ProductStatus {
    pub fn as_str(&self) -> &str {
        match self { Self::Active => "active", Self::Pending => "pending", Self::Other(s) => s }
    }
}

impl From<String> for ProductStatus {
    fn from(value: String) -> Self {
        match value.as_str() { "active" => Self::Active, "pending" => Self::Pending, _ => Self::Other(value) }
    }
}

impl From<&str> for ProductStatus {
    fn from(value: &str) -> Self { Self::from(value.to_string()) }
}

impl From<ProductStatus> for String {
    fn from(value: ProductStatus) -> Self { value.as_str().to_string() }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Stock badge shown next to a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel { Low, Medium, Normal }

/// The editable subset of a product. `None` leaves the field as it is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub status: Option<ProductStatus>,
}

impl Product {
    pub fn stock_level(&self) -> StockLevel {
        match self.stock { 0..=9 => StockLevel::Low, 10..=49 => StockLevel::Medium, _ => StockLevel::Normal }
    }

    /// Price times units on hand, saturating at `Decimal::MAX`.
    pub fn stock_value(&self) -> Decimal { self.price.saturating_mul(Decimal::from(self.stock)) }

    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(v) = patch.name { self.name = v; }
        if let Some(v) = patch.sku { self.sku = v; }
        if let Some(v) = patch.category { self.category = v; }
        if let Some(v) = patch.description { self.description = v; }
        if let Some(v) = patch.price { self.price = v; }
        if let Some(v) = patch.stock { self.stock = v; }
        if let Some(v) = patch.status { self.status = v; }
        self.touch();
    }

    /// Moves `updated_at` forward, strictly, even when the clock has not ticked.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at { now } else { self.updated_at + Duration::milliseconds(1) };
    }
}
