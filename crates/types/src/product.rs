//! Product documents and the inputs that create or modify them.

use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;

/// A stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub title: String,
    pub description: String,
    /// Unique across all products.
    pub code: String,
    pub price: f64,
    /// Whether the product is available for sale.
    pub status: bool,
    pub stock: u32,
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub code: String,
    pub price: f64,
    #[serde(default = "default_status")]
    pub status: bool,
    pub stock: u32,
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

fn default_status() -> bool {
    true
}

impl NewProduct {
    /// Attach an id, producing the document that gets stored.
    pub fn into_product(self, id: DocumentId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            code: self.code,
            price: self.price,
            status: self.status,
            stock: self.stock,
            category: self.category,
            thumbnails: self.thumbnails,
        }
    }
}

/// Partial update for a product. `_id` and unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub price: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject values a valid product could never hold.
    pub fn check(&self) -> Result<(), String> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("code", &self.code),
            ("category", &self.category),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("Field '{field}' cannot be empty"));
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err("Field 'price' must be a non-negative number".into());
            }
        }
        Ok(())
    }

    /// Apply the patch in place. Text fields are trimmed like on creation.
    pub fn apply(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description.trim().to_string();
        }
        if let Some(code) = self.code {
            product.code = code.trim().to_string();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_string();
        }
        if let Some(thumbnails) = self.thumbnails {
            product.thumbnails = thumbnails;
        }
    }
}

/// Result of adding one product.
///
/// Serialises to the message string clients receive in `{"messages": [...]}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddOutcome {
    #[serde(rename = "Product added successfully.")]
    Added,
    #[serde(rename = "Product with that code already exist. Not added")]
    DuplicateCode,
    #[serde(rename = "Error adding product.")]
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        NewProduct {
            title: "Mate".into(),
            description: "Calabaza".into(),
            code: "MAT-1".into(),
            price: 12.5,
            status: true,
            stock: 4,
            category: "kitchen".into(),
            thumbnails: vec![],
        }
        .into_product(DocumentId::generate())
    }

    #[test]
    fn test_product_serializes_mongo_style_id() {
        let product = sample();
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["_id"], product.id.as_str());
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let res: Result<ProductPatch, _> = serde_json::from_str(r#"{"_id": "x"}"#);
        assert!(res.is_err());
        let res: Result<ProductPatch, _> = serde_json::from_str(r#"{"colour": "red"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_patch_apply() {
        let mut product = sample();
        let patch: ProductPatch = serde_json::from_str(r#"{"price": 20, "stock": 0}"#).unwrap();
        assert!(patch.check().is_ok());
        patch.apply(&mut product);
        assert_eq!(product.price, 20.0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.title, "Mate");
    }

    #[test]
    fn test_patch_check() {
        let patch = ProductPatch {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(patch.check().is_err());
        let patch = ProductPatch {
            title: Some("  ".into()),
            ..Default::default()
        };
        assert!(patch.check().is_err());
        assert!(ProductPatch::default().is_empty());
    }

    #[test]
    fn test_patch_trims_text_fields() {
        let mut product = sample();
        let patch = ProductPatch {
            code: Some(" A1 ".into()),
            title: Some("  Tea\t".into()),
            ..Default::default()
        };
        patch.apply(&mut product);
        assert_eq!(product.code, "A1");
        assert_eq!(product.title, "Tea");
    }

    #[test]
    fn test_add_outcome_messages() {
        let json = serde_json::to_string(&vec![AddOutcome::Added, AddOutcome::DuplicateCode]).unwrap();
        assert_eq!(
            json,
            r#"["Product added successfully.","Product with that code already exist. Not added"]"#
        );
        assert_eq!(
            serde_json::to_value(AddOutcome::Failed).unwrap(),
            "Error adding product."
        );
    }
}
