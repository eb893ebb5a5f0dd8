//! Product endpoints.
//!
//! # Endpoints
//!
//! - `GET /api/products` - Paginated list envelope
//! - `GET /api/products/{pid}` - One product
//! - `POST /api/products` - Add one product or an array of them
//! - `PUT /api/products/{pid}` - Partial update
//! - `DELETE /api/products/{pid}` - Remove (also pulled from carts)
//!
//! Every successful mutation re-broadcasts the product list.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use types::{
    AddOutcome, ErrorCode, Product, ProductListResponse, ProductParams, ProductPatch, ProductQuery,
    as_batch, validate_products,
};

use super::{parse_id, parse_json};
use crate::error::{AppError, AppResult};
use crate::state::ServerState;

/// Base path used in pagination links.
pub const PRODUCTS_PATH: &str = "/api/products";

/// `POST /api/products` response body.
#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub messages: Vec<AddOutcome>,
}

/// `PUT /api/products/{pid}` response body.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl UpdateResponse {
    fn failed(status: StatusCode, message: impl Into<String>) -> Response {
        let body = Self {
            status: status.as_u16(),
            message: message.into(),
            product: None,
        };
        (status, Json(body)).into_response()
    }
}

/// 201 if anything was added, 500 otherwise (duplicates included).
pub fn add_status(outcomes: &[AddOutcome]) -> StatusCode {
    if outcomes.contains(&AddOutcome::Added) {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// List products: `GET /api/products`
pub async fn list_products(
    State(state): State<ServerState>,
    Query(params): Query<ProductParams>,
) -> AppResult<Json<ProductListResponse<Product>>> {
    let query = ProductQuery::try_from(params)?;
    let page = state.products.list(query.clone()).await?;
    Ok(Json(ProductListResponse::from_page(page, &query, PRODUCTS_PATH)))
}

/// Get one product: `GET /api/products/{pid}`
pub async fn get_product(
    State(state): State<ServerState>,
    Path(pid): Path<String>,
) -> AppResult<Json<Product>> {
    let id = parse_id(&pid, ErrorCode::InvalidProductId)?;
    state
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::code(ErrorCode::ProductNotFound))
}

/// Add products: `POST /api/products`
///
/// Accepts one object or an array. Any invalid entry rejects the whole
/// batch before anything is written.
pub async fn add_products(State(state): State<ServerState>, body: Bytes) -> AppResult<Response> {
    let value: Value = parse_json(&body)?;
    let entries = as_batch(value);
    let products = validate_products(&entries)?;

    let outcomes = state.products.add_many(products).await?;
    let status = add_status(&outcomes);
    Ok((status, Json(AddResponse { messages: outcomes })).into_response())
}

/// Update a product: `PUT /api/products/{pid}`
pub async fn update_product(
    State(state): State<ServerState>,
    Path(pid): Path<String>,
    body: Bytes,
) -> AppResult<Response> {
    let id = parse_id(&pid, ErrorCode::InvalidProductId)?;

    let patch: ProductPatch = match serde_json::from_slice(&body) {
        Ok(patch) => patch,
        Err(e) => {
            debug!(error = %e, "rejected product patch");
            return Ok(UpdateResponse::failed(
                StatusCode::BAD_REQUEST,
                format!("{}: {e}", ErrorCode::InvalidProductData.message()),
            ));
        }
    };
    if patch.is_empty() {
        return Ok(UpdateResponse::failed(StatusCode::BAD_REQUEST, "No fields to update"));
    }
    if let Err(reason) = patch.check() {
        let message = format!("{}: {reason}", ErrorCode::InvalidProductData.message());
        return Ok(UpdateResponse::failed(StatusCode::BAD_REQUEST, message));
    }

    let updated = match state.products.update(id, patch).await {
        Err(AppError::Coded {
            code: ErrorCode::DuplicateProductCode,
            message,
        }) => return Ok(UpdateResponse::failed(StatusCode::BAD_REQUEST, message)),
        other => other?,
    };

    match updated {
        Some(product) => {
            let body = UpdateResponse {
                status: StatusCode::OK.as_u16(),
                message: "Product updated successfully".into(),
                product: Some(product),
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        None => Ok(UpdateResponse::failed(
            StatusCode::NOT_FOUND,
            ErrorCode::ProductNotFound.message(),
        )),
    }
}

/// Delete a product: `DELETE /api/products/{pid}`
pub async fn delete_product(
    State(state): State<ServerState>,
    Path(pid): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&pid, ErrorCode::InvalidProductId)?;
    if state.products.delete(id).await? {
        Ok(Json(serde_json::json!({ "message": "Product removed correctly" })))
    } else {
        Err(AppError::code(ErrorCode::ProductNotFound))
    }
}
