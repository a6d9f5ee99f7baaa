//! Catalog events

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogEvent {
    ProductAdded { product_id: String },
    ProductUpdated { product_id: String },
    ProductRemoved { product_id: String },
    ProductsImported { count: usize },
    DraftSaved,
    DraftCleared,
}

impl CatalogEvent {
    /// Short confirmation suitable for a transient notification.
    pub fn notice(&self) -> String {
        match self {
            Self::ProductAdded { .. } => "Product added successfully!".to_string(),
            Self::ProductUpdated { .. } => "Product updated successfully!".to_string(),
            Self::ProductRemoved { .. } => "Product deleted successfully".to_string(),
            Self::ProductsImported { count } => format!("Imported {} products successfully!", count),
            Self::DraftSaved => "Draft saved successfully!".to_string(),
            Self::DraftCleared => "Form cleared".to_string(),
        }
    }
}
