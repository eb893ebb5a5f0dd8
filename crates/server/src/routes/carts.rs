//! Cart endpoints.
//!
//! # Endpoints
//!
//! - `POST /api/carts` - Create an empty cart
//! - `GET /api/carts/{cid}` - Cart with products populated
//! - `POST /api/carts/{cid}/product/{pid}` - Add one (or `{"quantity": n}`)
//! - `DELETE /api/carts/{cid}/products/{pid}` - Remove a line
//! - `PUT /api/carts/{cid}` - Replace every line
//! - `PUT /api/carts/{cid}/products/{pid}` - Set a line's quantity
//! - `DELETE /api/carts/{cid}` - Empty the cart
//! - `POST /api/carts/{cid}/purchase` - Check out (session required)

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;
use types::{Cart, CartLine, ErrorCode, PopulatedCart, PurchaseReport, Role};

use super::{parse_id, parse_json};
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::state::ServerState;

/// Body of add and set-quantity requests.
#[derive(Debug, Deserialize)]
pub struct QuantityBody {
    pub quantity: i64,
}

/// One line in a replace request.
#[derive(Debug, Deserialize)]
pub struct LineBody {
    pub product: String,
    pub quantity: i64,
}

/// Replace body: a bare array or `{"products": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReplaceBody {
    Lines(Vec<LineBody>),
    Wrapped { products: Vec<LineBody> },
}

impl ReplaceBody {
    fn into_lines(self) -> Vec<LineBody> {
        match self {
            ReplaceBody::Lines(lines) | ReplaceBody::Wrapped { products: lines } => lines,
        }
    }
}

fn positive_quantity(quantity: i64) -> AppResult<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| AppError::code(ErrorCode::InvalidQuantity))
}

/// Quantity for an add: 1 when the body is empty.
fn add_quantity(body: &Bytes) -> AppResult<u32> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(1);
    }
    let QuantityBody { quantity } = parse_json(body)?;
    positive_quantity(quantity)
}

/// Create a cart: `POST /api/carts`
pub async fn create_cart(State(state): State<ServerState>) -> AppResult<(StatusCode, Json<Cart>)> {
    let cart = state.carts.create().await?;
    info!(cart_id = %cart.id, "cart created");
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Get a cart: `GET /api/carts/{cid}`
pub async fn get_cart(
    State(state): State<ServerState>,
    Path(cid): Path<String>,
) -> AppResult<Json<PopulatedCart>> {
    let id = parse_id(&cid, ErrorCode::InvalidCartId)?;
    state
        .carts
        .get_populated(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::code(ErrorCode::CartNotFound))
}

/// Add a product: `POST /api/carts/{cid}/product/{pid}`
pub async fn add_product(
    State(state): State<ServerState>,
    Path((cid, pid)): Path<(String, String)>,
    body: Bytes,
) -> AppResult<Json<PopulatedCart>> {
    let cart = parse_id(&cid, ErrorCode::InvalidCartId)?;
    let product = parse_id(&pid, ErrorCode::InvalidProductId)?;
    let quantity = add_quantity(&body)?;
    Ok(Json(state.carts.add(cart, product, quantity).await?))
}

/// Remove a line: `DELETE /api/carts/{cid}/products/{pid}`
pub async fn remove_product(
    State(state): State<ServerState>,
    Path((cid, pid)): Path<(String, String)>,
) -> AppResult<Json<PopulatedCart>> {
    let cart = parse_id(&cid, ErrorCode::InvalidCartId)?;
    let product = parse_id(&pid, ErrorCode::InvalidProductId)?;
    Ok(Json(state.carts.remove(cart, product).await?))
}

/// Replace all lines: `PUT /api/carts/{cid}`
pub async fn replace_products(
    State(state): State<ServerState>,
    Path(cid): Path<String>,
    body: Bytes,
) -> AppResult<Json<PopulatedCart>> {
    let cart = parse_id(&cid, ErrorCode::InvalidCartId)?;
    let request: ReplaceBody = parse_json(&body)?;

    let lines = request
        .into_lines()
        .into_iter()
        .map(|line| {
            Ok(CartLine {
                product: parse_id(&line.product, ErrorCode::InvalidProductId)?,
                quantity: positive_quantity(line.quantity)?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(state.carts.replace(cart, lines).await?))
}

/// Set a line's quantity: `PUT /api/carts/{cid}/products/{pid}`
pub async fn set_quantity(
    State(state): State<ServerState>,
    Path((cid, pid)): Path<(String, String)>,
    body: Bytes,
) -> AppResult<Json<PopulatedCart>> {
    let cart = parse_id(&cid, ErrorCode::InvalidCartId)?;
    let product = parse_id(&pid, ErrorCode::InvalidProductId)?;
    let QuantityBody { quantity } =
        parse_json(&body).map_err(|_| AppError::code(ErrorCode::InvalidQuantity))?;
    let quantity = positive_quantity(quantity)?;
    Ok(Json(state.carts.set_quantity(cart, product, quantity).await?))
}

/// Empty a cart: `DELETE /api/carts/{cid}`
pub async fn clear_cart(
    State(state): State<ServerState>,
    Path(cid): Path<String>,
) -> AppResult<Json<PopulatedCart>> {
    let cart = parse_id(&cid, ErrorCode::InvalidCartId)?;
    Ok(Json(state.carts.clear(cart).await?))
}

/// Check out: `POST /api/carts/{cid}/purchase`
///
/// Only the cart's owner (or an admin) may purchase it.
pub async fn purchase(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    Path(cid): Path<String>,
) -> AppResult<Json<PurchaseReport>> {
    let cart = parse_id(&cid, ErrorCode::InvalidCartId)?;
    if user.cart != cart && user.role != Role::Admin {
        return Err(AppError::code(ErrorCode::Forbidden));
    }
    Ok(Json(state.carts.purchase(cart, user.email).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quantity_defaults_to_one() {
        assert_eq!(add_quantity(&Bytes::new()).unwrap(), 1);
        assert_eq!(add_quantity(&Bytes::from_static(b"  \n")).unwrap(), 1);
        assert_eq!(add_quantity(&Bytes::from_static(br#"{"quantity": 4}"#)).unwrap(), 4);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(positive_quantity(0).is_err());
        assert!(positive_quantity(-3).is_err());
        assert!(positive_quantity(i64::MAX).is_err());
        assert_eq!(positive_quantity(2).unwrap(), 2);
    }

    #[test]
    fn test_replace_body_shapes() {
        let bare: ReplaceBody =
            serde_json::from_str(r#"[{"product": "a", "quantity": 1}]"#).unwrap();
        assert_eq!(bare.into_lines().len(), 1);

        let wrapped: ReplaceBody =
            serde_json::from_str(r#"{"products": [{"product": "a", "quantity": 1}, {"product": "b", "quantity": 2}]}"#)
                .unwrap();
        assert_eq!(wrapped.into_lines().len(), 2);
    }
}
