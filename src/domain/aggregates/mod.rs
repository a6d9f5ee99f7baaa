//! Aggregates module
pub mod product;
pub mod draft;

pub use product::{Dimensions, Product, ProductImage, ProductPatch, ProductStatus, StockLevel};
pub use draft::Draft;
