//! Form binding and image intake.
//!
//! These types sit between whatever collects user input and the
//! [`ProductStore`](crate::store::ProductStore): they turn raw form text into
//! products and patches, and raw files into data-URI images.
pub mod form;
pub mod images;

pub use form::{EditForm, EditSession, ProductForm};
pub use images::{ImageBatch, IncomingImage, IntakeReport, MAX_IMAGES, MAX_IMAGE_BYTES};
