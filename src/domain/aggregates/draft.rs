//! Draft Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::ProductImage;
use crate::intake::ProductForm;

/// An unsubmitted add-form snapshot together with the images picked so far.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(flatten)]
    pub form: ProductForm,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Draft {
    pub fn new(form: ProductForm, images: Vec<ProductImage>) -> Self { Self { form, images } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_uses_form_field_names() {
        let draft = Draft::new(
            ProductForm { name: "Lamp".into(), price: "12".into(), ..Default::default() },
            vec![ProductImage { name: "l.png".into(), data: "data:image/png;base64,AA==".into() }],
        );
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["productName"], "Lamp");
        assert_eq!(json["productPrice"], "12");
        assert_eq!(json["images"][0]["name"], "l.png");
    }

    #[test]
    fn test_partial_draft_decodes() {
        let draft: Draft = serde_json::from_str(r#"{"productSKU":"L-1"}"#).unwrap();
        assert_eq!(draft.form.sku, "L-1");
        assert_eq!(draft.form.name, "");
        assert!(draft.images.is_empty());
    }
}
