//! Add and edit form binding

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::{Dimensions, Product, ProductImage, ProductPatch, ProductStatus};
use crate::domain::value_objects::{generate_product_id, parse_decimal, parse_quantity, parse_tags};
use crate::store::ProductStore;
use crate::{CatalogError, Result, ValidationError};

/// Raw add-form input. JSON names follow the form's element ids, which is also
/// how drafts are stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProductForm {
    #[serde(rename = "productName")]
    #[validate(custom = "not_blank")]
    pub name: String,
    #[serde(rename = "productSKU")]
    #[validate(custom = "not_blank")]
    pub sku: String,
    #[serde(rename = "productCategory")] pub category: String,
    #[serde(rename = "productBrand")] pub brand: String,
    #[serde(rename = "productDescription")] pub description: String,
    #[serde(rename = "productPrice")] pub price: String,
    #[serde(rename = "productDiscount")] pub discount_price: String,
    #[serde(rename = "productStock")] pub stock: String,
    #[serde(rename = "productWeight")] pub weight: String,
    #[serde(rename = "dimLength")] pub length: String,
    #[serde(rename = "dimWidth")] pub width: String,
    #[serde(rename = "dimHeight")] pub height: String,
    #[serde(rename = "productColor")] pub color: String,
    #[serde(rename = "productSize")] pub size: String,
    #[serde(rename = "productMaterial")] pub material: String,
    #[serde(rename = "productTags")] pub tags: String,
}

impl ProductForm {
    /// Builds a new active product. Numeric fields that are blank or unparseable become zero.
    pub fn into_product(self, images: Vec<ProductImage>) -> Result<Product> {
        self.validate()?;
        let now = Utc::now();
        Ok(Product {
            id: generate_product_id(),
            name: self.name.trim().to_string(),
            sku: self.sku.trim().to_string(),
            category: self.category.trim().to_string(),
            brand: self.brand.trim().to_string(),
            description: self.description.trim().to_string(),
            price: amount("price", &self.price)?,
            discount_price: amount("discountPrice", &self.discount_price)?,
            stock: quantity("stock", &self.stock)?,
            weight: amount("weight", &self.weight)?,
            dimensions: Dimensions { length: self.length, width: self.width, height: self.height },
            images,
            color: self.color.trim().to_string(),
            size: self.size.trim().to_string(),
            material: self.material.trim().to_string(),
            tags: parse_tags(&self.tags),
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
            extra: Default::default(),
        })
    }
}

/// Raw edit-form input covering the editable subset of a product.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EditForm {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub sku: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub status: String,
}

impl EditForm {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            sku: product.sku.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            price: product.price.normalize().to_string(),
            stock: product.stock.to_string(),
            status: product.status.to_string(),
        }
    }

    /// Every editable field is replaced; a blank status keeps `active`.
    pub fn into_patch(self) -> Result<ProductPatch> {
        self.validate()?;
        let status = match self.status.trim() { "" => ProductStatus::Active, s => ProductStatus::from(s) };
        Ok(ProductPatch {
            name: Some(self.name.trim().to_string()),
            sku: Some(self.sku.trim().to_string()),
            category: Some(self.category.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            price: Some(amount("price", &self.price)?),
            stock: Some(quantity("stock", &self.stock)?),
            status: Some(status),
        })
    }
}

/// Tracks which product the edit form is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    product_id: String,
}

impl EditSession {
    /// Opens a session on an existing product and returns the form prefilled from it.
    pub fn begin(store: &ProductStore, id: &str) -> Result<(Self, EditForm)> {
        let product = store.find(id).ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        Ok((Self { product_id: product.id.clone() }, EditForm::from_product(product)))
    }

    pub fn product_id(&self) -> &str { &self.product_id }

    pub fn commit(self, store: &mut ProductStore, form: EditForm) -> Result<Product> {
        let patch = form.into_patch()?;
        store.update(&self.product_id, patch).cloned()
    }
}

fn not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() { Err(validator::ValidationError::new("blank")) } else { Ok(()) }
}

fn amount(field: &'static str, raw: &str) -> std::result::Result<Decimal, ValidationError> {
    let value = parse_decimal(raw).unwrap_or_default();
    if value.is_sign_negative() && !value.is_zero() { return Err(ValidationError::NegativeValue { field }); }
    Ok(value)
}

fn quantity(field: &'static str, raw: &str) -> std::result::Result<u32, ValidationError> {
    match parse_quantity(raw) {
        Some(q) if q < 0 => Err(ValidationError::NegativeValue { field }),
        Some(q) => u32::try_from(q).map_err(|_| ValidationError::ValueTooLarge { field }),
        // Numeric but outside i64.
        None => match parse_decimal(raw) {
            Some(d) if d.is_sign_negative() => Err(ValidationError::NegativeValue { field }),
            Some(_) => Err(ValidationError::ValueTooLarge { field }),
            None => Ok(0),
        },
    }
}
