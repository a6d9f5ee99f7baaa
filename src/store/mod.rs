//! Product store
//!
//! [`ProductStore`] owns the authoritative, insertion-ordered list of products.
//! Every mutation rewrites the whole collection under the `products` storage key
//! before returning. When that write fails the mutation is undone in memory and
//! the storage error is returned, so memory and storage never disagree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use crate::domain::aggregates::{Product, ProductPatch, ProductStatus};
use crate::domain::events::CatalogEvent;
use crate::domain::value_objects::{generate_product_id, lenient};
use crate::storage::{KeyValueStorage, PRODUCTS_KEY};
use crate::{CatalogError, Result, StorageError, ValidationError};

pub mod drafts;

pub use drafts::DraftStore;

/// File name offered for exported catalogs.
pub const EXPORT_FILE_NAME: &str = "products_export.json";

/// Search criteria for [`ProductStore::list`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    #[serde(alias = "search")]
    pub text: String,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn new(text: impl Into<String>, category: Option<String>) -> Self {
        Self { text: text.into(), category }
    }

    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.text.to_lowercase();
        let text_match = needle.is_empty()
            || product.name.to_lowercase().contains(&needle)
            || product.sku.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle);
        let category_match = match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => product.category == category,
        };
        text_match && category_match
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub active_count: usize,
    pub pending_count: usize,
    #[serde(serialize_with = "lenient::decimal::serialize")]
    pub total_revenue: Decimal,
}

pub struct ProductStore {
    storage: Arc<dyn KeyValueStorage>,
    products: Vec<Product>,
    events: Vec<CatalogEvent>,
}

impl ProductStore {
    /// Reads the persisted collection. A missing, unreadable or malformed entry
    /// yields an empty store.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let products = match storage.get(PRODUCTS_KEY) {
            Ok(Some(text)) => serde_json::from_str::<Vec<Product>>(&text).unwrap_or_else(|e| {
                warn!(error = %e, "stored products are malformed, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read stored products, starting empty");
                Vec::new()
            }
        };
        info!(count = products.len(), "product store loaded");
        Self { storage, products, events: Vec::new() }
    }

    pub fn products(&self) -> &[Product] { &self.products }
    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    /// Appends a product. It must carry at least one image.
    pub fn add(&mut self, mut product: Product) -> Result<&Product> {
        if product.images.is_empty() {
            return Err(ValidationError::MissingImage.into());
        }
        while product.id.is_empty() || self.find(&product.id).is_some() {
            warn!(id = %product.id, "product id unusable, generating another");
            product.id = generate_product_id();
        }
        self.products.push(product);
        if let Err(e) = self.persist() {
            self.products.pop();
            return Err(e.into());
        }
        let added = &self.products[self.products.len() - 1];
        info!(id = %added.id, sku = %added.sku, "product added");
        self.events.push(CatalogEvent::ProductAdded { product_id: added.id.clone() });
        Ok(added)
    }

    pub fn update(&mut self, id: &str, patch: ProductPatch) -> Result<&Product> {
        let index = self.position(id).ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let previous = self.products[index].clone();
        self.products[index].apply(patch);
        if let Err(e) = self.persist() {
            self.products[index] = previous;
            return Err(e.into());
        }
        info!(id, "product updated");
        self.events.push(CatalogEvent::ProductUpdated { product_id: id.to_string() });
        Ok(&self.products[index])
    }

    /// Returns whether a product was removed. Removing an unknown id writes nothing.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.position(id) else { return Ok(false) };
        let removed = self.products.remove(index);
        if let Err(e) = self.persist() {
            self.products.insert(index, removed);
            return Err(e.into());
        }
        info!(id, "product removed");
        self.events.push(CatalogEvent::ProductRemoved { product_id: id.to_string() });
        Ok(true)
    }

    pub fn find(&self, id: &str) -> Option<&Product> { self.products.iter().find(|p| p.id == id) }

    pub fn list(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    pub fn stats(&self) -> CatalogStats {
        self.products.iter().fold(CatalogStats { total: self.products.len(), ..Default::default() }, |mut s, p| {
            match p.status {
                ProductStatus::Active => s.active_count += 1,
                ProductStatus::Pending => s.pending_count += 1,
                ProductStatus::Other(_) => {}
            }
            s.total_revenue = s.total_revenue.saturating_add(p.stock_value());
            s
        })
    }

    /// The whole collection as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.products).map_err(StorageError::from)?)
    }

    /// Appends every record of a JSON array as-is and returns how many were added.
    /// Ids are not checked against existing entries.
    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| CatalogError::Format(e.to_string()))?;
        if !value.is_array() {
            return Err(CatalogError::Format("expected a JSON array of products".to_string()));
        }
        let imported: Vec<Product> = serde_json::from_value(value).map_err(|e| CatalogError::Format(e.to_string()))?;
        let count = imported.len();
        let before = self.products.len();
        self.products.extend(imported);
        if let Err(e) = self.persist() {
            self.products.truncate(before);
            return Err(e.into());
        }
        info!(count, "products imported");
        self.events.push(CatalogEvent::ProductsImported { count });
        Ok(count)
    }

    pub fn take_events(&mut self) -> Vec<CatalogEvent> { std::mem::take(&mut self.events) }

    fn position(&self, id: &str) -> Option<usize> { self.products.iter().position(|p| p.id == id) }

    fn persist(&self) -> std::result::Result<(), StorageError> {
        let json = serde_json::to_string(&self.products)?;
        self.storage.set(PRODUCTS_KEY, &json).map_err(|e| {
            warn!(error = %e, "failed to persist products");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::ProductImage;
    use crate::storage::MemoryStorage;
    use chrono::Utc;

    fn product(name: &str, price: i64, stock: u32, status: &str) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(), name: name.into(), sku: format!("SKU-{}", name.len()),
            category: "general".into(), price: Decimal::new(price, 0), stock, status: status.into(),
            images: vec![ProductImage { name: "i.png".into(), data: "data:image/png;base64,AA==".into() }],
            created_at: now, updated_at: now, ..Default::default()
        }
    }

    fn store() -> (Arc<MemoryStorage>, ProductStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ProductStore::load(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_add_appends_with_unique_id() {
        let (_, mut store) = store();
        let first = store.add(product("Lamp", 10, 1, "active")).unwrap().id.clone();
        let mut dup = product("Desk", 10, 1, "active");
        dup.id = first.clone();
        let second = store.add(dup).unwrap().id.clone();
        assert_ne!(first, second);
        assert_eq!(store.list(&ProductFilter::default()).len(), 2);
        assert_eq!(store.take_events().len(), 2);
    }

    #[test]
    fn test_add_without_images_is_rejected() {
        let (storage, mut store) = store();
        let mut p = product("Lamp", 10, 1, "active");
        p.images.clear();
        let err = store.add(p).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ValidationError::MissingImage)));
        assert!(store.is_empty());
        assert_eq!(storage.get(PRODUCTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_update_patches_and_misses() {
        let (storage, mut store) = store();
        let original = store.add(product("Lamp", 10, 1, "active")).unwrap().clone();
        let updated = store.update(&original.id, ProductPatch { price: Some(Decimal::new(12, 0)), ..Default::default() }).unwrap().clone();
        assert_eq!(updated.price, Decimal::new(12, 0));
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.stock, original.stock);
        assert!(updated.updated_at > original.updated_at);

        let snapshot = storage.get(PRODUCTS_KEY).unwrap();
        let err = store.update("prod_nope", ProductPatch { name: Some("x".into()), ..Default::default() }).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(ref id) if id == "prod_nope"));
        assert_eq!(storage.get(PRODUCTS_KEY).unwrap(), snapshot);
        assert_eq!(store.products(), &[updated]);
    }

    #[test]
    fn test_remove() {
        let (_, mut store) = store();
        let id = store.add(product("Lamp", 10, 1, "active")).unwrap().id.clone();
        assert!(!store.remove("prod_nope").unwrap());
        assert!(store.remove(&id).unwrap());
        assert!(store.find(&id).is_none());
        assert!(!store.remove(&id).unwrap());
    }

    #[test]
    fn test_stats() {
        let (_, mut store) = store();
        store.add(product("A", 10, 2, "active")).unwrap();
        store.add(product("B", 5, 1, "pending")).unwrap();
        store.add(product("C", 3, 0, "archived")).unwrap();
        let stats = store.stats();
        assert_eq!(stats, CatalogStats { total: 3, active_count: 1, pending_count: 1, total_revenue: Decimal::new(25, 0) });
        assert_eq!(serde_json::to_value(&stats).unwrap()["totalRevenue"], 25.0);
    }

    #[test]
    fn test_stats_saturates_on_extreme_prices() {
        let (_, mut store) = store();
        let mut costly = product("Costly", 0, 2, "active");
        costly.price = "50000000000000000000000000000".parse().unwrap();
        store.add(costly).unwrap();
        store.add(product("Plain", 10, 1, "active")).unwrap();
        let stats = store.stats();
        assert_eq!(stats.total_revenue, Decimal::MAX);
        assert_eq!(stats.active_count, 2);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalRevenue\":79228162514264337593543950335"));
    }

    #[test]
    fn test_list_filters_in_order() {
        let (_, mut store) = store();
        store.add(product("Blue Shirt", 1, 1, "active")).unwrap();
        let mut mug = product("Mug", 1, 1, "active");
        mug.description = "Deep BLUE glaze".into();
        mug.category = "kitchen".into();
        store.add(mug).unwrap();
        store.add(product("Red Hat", 1, 1, "active")).unwrap();

        let names: Vec<&str> = store.list(&ProductFilter::new("blue", None)).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Blue Shirt", "Mug"]);
        let names: Vec<&str> = store.list(&ProductFilter::new("blue", Some("kitchen".into()))).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mug"]);
        assert_eq!(store.list(&ProductFilter::new("", Some(String::new()))).len(), 3);
    }

    #[test]
    fn test_reload_reproduces_collection() {
        let (storage, mut store) = store();
        store.add(product("Lamp", 10, 1, "active")).unwrap();
        store.add(product("Desk", 99, 3, "pending")).unwrap();
        let reloaded = ProductStore::load(storage);
        assert_eq!(reloaded.products(), store.products());
    }

    #[test]
    fn test_reload_keeps_full_precision() {
        let (storage, mut store) = store();
        let mut precise = product("Precise", 0, 1, "active");
        precise.price = "12345678901234567.89".parse().unwrap();
        precise.weight = "0.0000000000000000000000000001".parse().unwrap();
        store.add(precise).unwrap();

        let raw = storage.get(PRODUCTS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"price\":12345678901234567.89"));
        let reloaded = ProductStore::load(storage);
        assert_eq!(reloaded.products(), store.products());
        assert_eq!(reloaded.products()[0].price.to_string(), "12345678901234567.89");

        let (_, mut fresh) = self::store();
        fresh.import_json(&store.export_json().unwrap()).unwrap();
        assert_eq!(fresh.products(), store.products());
    }

    #[test]
    fn test_malformed_storage_loads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(PRODUCTS_KEY, "{not json").unwrap();
        assert!(ProductStore::load(storage.clone()).is_empty());
        storage.set(PRODUCTS_KEY, "{\"a\":1}").unwrap();
        assert!(ProductStore::load(storage).is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let (_, mut store) = store();
        let mut lamp = product("Lamp", 10, 1, "active");
        lamp.price = Decimal::new(1999, 2);
        lamp.tags = vec!["light".into()];
        store.add(lamp).unwrap();
        store.add(product("Desk", 99, 3, "pending")).unwrap();
        let exported = store.export_json().unwrap();
        assert!(exported.contains("\n  "));

        let (_, mut fresh) = self::store();
        assert_eq!(fresh.import_json(&exported).unwrap(), 2);
        assert_eq!(fresh.products(), store.products());
        assert_eq!(fresh.take_events(), vec![CatalogEvent::ProductsImported { count: 2 }]);
    }

    #[test]
    fn test_import_rejects_non_arrays() {
        let (_, mut store) = store();
        assert!(matches!(store.import_json("{\"id\":1}"), Err(CatalogError::Format(_))));
        assert!(matches!(store.import_json("nope"), Err(CatalogError::Format(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let storage = Arc::new(MemoryStorage::with_quota(2048));
        let mut store = ProductStore::load(storage.clone());
        let id = store.add(product("Lamp", 10, 1, "active")).unwrap().id.clone();
        let persisted = storage.get(PRODUCTS_KEY).unwrap();

        let mut huge = product("Huge", 1, 1, "active");
        huge.description = "x".repeat(4096);
        let err = store.add(huge).unwrap_err();
        assert!(matches!(err, CatalogError::Storage(StorageError::QuotaExceeded { .. })));
        assert_eq!(store.len(), 1);

        let err = store.update(&id, ProductPatch { description: Some("y".repeat(4096)), ..Default::default() }).unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
        assert_eq!(store.find(&id).unwrap().description, "");
        assert_eq!(storage.get(PRODUCTS_KEY).unwrap(), persisted);
    }
}
