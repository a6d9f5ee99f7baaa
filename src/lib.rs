//! Catalog Editor
//!
//! Local product catalog editing backed by durable key-value storage.
//!
//! ## Features
//! - Product catalog management (add, edit, delete)
//! - Search and category filtering
//! - Catalog statistics (status tallies, stock value)
//! - Draft persistence for the add form
//! - Image intake with size, type and count limits
//! - JSON export and import

pub mod api;
pub mod config;
pub mod domain;
pub mod editor;
pub mod intake;
pub mod storage;
pub mod store;

pub use domain::aggregates::{Dimensions, Draft, Product, ProductImage, ProductPatch, ProductStatus, StockLevel};
pub use domain::events::CatalogEvent;
pub use editor::{Editor, RestoredDraft};
pub use store::{CatalogStats, DraftStore, ProductFilter, ProductStore};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid file format: {0}")]
    Format(String),
}

/// Rejections raised while binding form input or taking in images.
/// None of them mutate state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add at least one product image")]
    MissingImage,

    #[error("Maximum {max} images allowed")]
    ImageLimitReached { max: usize },

    #[error("File size must be less than 5MB ({name} is {size} bytes)")]
    ImageTooLarge { name: String, size: usize },

    #[error("Only image files are allowed ({name} is {media_type})")]
    NotAnImage { name: String, media_type: String },

    #[error("{field} must not be negative")]
    NegativeValue { field: &'static str },

    #[error("{field} is too large")]
    ValueTooLarge { field: &'static str },

    #[error("Invalid form: {0}")]
    InvalidForm(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { key: String, needed: usize, quota: usize },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().into_keys().collect();
        fields.sort_unstable();
        ValidationError::InvalidForm(format!("missing or blank: {}", fields.join(", ")))
    }
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CatalogError::Validation(errors.into())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
