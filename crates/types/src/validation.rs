//! Validation of raw product payloads.
//!
//! `POST /api/products` accepts either one object or an array of objects.
//! The batch is all-or-nothing at the validation stage: one bad entry fails
//! the request before anything is written.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::product::NewProduct;

/// Why a product payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body must be a product object or an array of products")]
    NotAnObject,

    #[error("Request body contains no products")]
    Empty,

    #[error("Product {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Product {index}: field '{field}' {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: &'static str,
    },

    #[error("Product {index}: code '{code}' is repeated in the request")]
    DuplicateInBatch { index: usize, code: String },
}

/// Normalise a request body into a list of entries.
pub fn as_batch(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Validate every entry and convert it into a [`NewProduct`].
pub fn validate_products(entries: &[Value]) -> Result<Vec<NewProduct>, ValidationError> {
    if entries.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let obj = entry.as_object().ok_or(ValidationError::NotAnObject)?;
        let product = validate_one(index, obj)?;
        if !seen.insert(product.code.clone()) {
            return Err(ValidationError::DuplicateInBatch {
                index,
                code: product.code,
            });
        }
        products.push(product);
    }
    Ok(products)
}

fn validate_one(index: usize, obj: &Map<String, Value>) -> Result<NewProduct, ValidationError> {
    let text = |field: &'static str| -> Result<String, ValidationError> {
        match obj.get(field) {
            None | Some(Value::Null) => Err(ValidationError::MissingField { index, field }),
            Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::InvalidField {
                index,
                field,
                reason: "must not be empty",
            }),
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(_) => Err(ValidationError::InvalidField {
                index,
                field,
                reason: "must be a string",
            }),
        }
    };

    let title = text("title")?;
    let description = text("description")?;
    let code = text("code")?;
    let category = text("category")?;

    let price = match obj.get("price") {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingField {
                index,
                field: "price",
            });
        }
        Some(v) => v
            .as_f64()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or(ValidationError::InvalidField {
                index,
                field: "price",
                reason: "must be a non-negative number",
            })?,
    };

    let stock = match obj.get("stock") {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingField {
                index,
                field: "stock",
            });
        }
        Some(v) => v
            .as_u64()
            .and_then(|s| u32::try_from(s).ok())
            .ok_or(ValidationError::InvalidField {
                index,
                field: "stock",
                reason: "must be a non-negative integer",
            })?,
    };

    let status = match obj.get("status") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                index,
                field: "status",
                reason: "must be a boolean",
            });
        }
    };

    let thumbnails = match obj.get("thumbnails") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|t| t.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or(ValidationError::InvalidField {
                index,
                field: "thumbnails",
                reason: "must be an array of strings",
            })?,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                index,
                field: "thumbnails",
                reason: "must be an array of strings",
            });
        }
    };

    Ok(NewProduct {
        title,
        description,
        code,
        price,
        status,
        stock,
        category,
        thumbnails,
    })
}
