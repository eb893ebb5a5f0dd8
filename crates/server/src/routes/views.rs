//! Server-rendered pages.
//!
//! # Endpoints
//!
//! - `GET /` - Every product
//! - `GET /products` - Paginated catalogue, same query params as the API
//! - `GET /carts/{cid}` - One cart with totals
//! - `GET /realtimeproducts` - Product list kept live over `/ws/products`
//! - `GET /chat` - Chat room over `/ws/chat`

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use types::{ChatMessage, ErrorCode, PopulatedCart, Product, ProductListResponse, ProductParams, ProductQuery, PublicUser};

use super::parse_id;
use crate::auth::MaybeUser;
use crate::error::{AppError, AppResult};
use crate::service::blocking;
use crate::state::ServerState;

/// Chat history shown when the page loads.
pub const CHAT_HISTORY: usize = 50;

/// Helper to render templates into axum responses
fn render_template<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template render error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response()
        }
    }
}

/// Display name for the page header.
fn greeting(user: Option<PublicUser>) -> Option<String> {
    user.map(|u| format!("{} {}", u.first_name, u.last_name))
}

/// GET / - Home page
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub products: Vec<Product>,
    pub user: Option<String>,
}

pub async fn home(State(state): State<ServerState>, MaybeUser(user): MaybeUser) -> AppResult<Response> {
    let products = state.products.all().await?;
    let user = greeting(user.as_ref().map(PublicUser::from));
    Ok(render_template(&HomePage { products, user }))
}

/// GET /products - Paginated catalogue
#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductsPage {
    pub list: ProductListResponse<Product>,
    pub user: Option<String>,
}

pub async fn products(
    State(state): State<ServerState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<ProductParams>,
) -> AppResult<Response> {
    let query = ProductQuery::try_from(params)?;
    let page = state.products.list(query.clone()).await?;
    let list = ProductListResponse::from_page(page, &query, "/products");
    let user = greeting(user.as_ref().map(PublicUser::from));
    Ok(render_template(&ProductsPage { list, user }))
}

/// GET /carts/{cid} - Cart detail
#[derive(Template)]
#[template(path = "cart.html")]
pub struct CartPage {
    pub cart: PopulatedCart,
}

pub async fn cart(State(state): State<ServerState>, Path(cid): Path<String>) -> AppResult<Response> {
    let id = parse_id(&cid, ErrorCode::InvalidCartId)?;
    let cart = state
        .carts
        .get_populated(id)
        .await?
        .ok_or_else(|| AppError::code(ErrorCode::CartNotFound))?;
    Ok(render_template(&CartPage { cart }))
}

/// GET /realtimeproducts - Live product list
#[derive(Template)]
#[template(path = "realtime_products.html")]
pub struct RealtimePage {
    pub products: Vec<Product>,
}

pub async fn realtime_products(State(state): State<ServerState>) -> AppResult<Response> {
    let snapshot = state.broadcaster.snapshot(&state.store).await?;
    let products = snapshot.payload.as_ref().clone();
    Ok(render_template(&RealtimePage { products }))
}

/// GET /chat - Chat room
#[derive(Template)]
#[template(path = "chat.html")]
pub struct ChatPage {
    pub messages: Vec<ChatMessage>,
}

pub async fn chat(State(state): State<ServerState>) -> AppResult<Response> {
    let messages = blocking(&state.store, |s| s.list_messages(CHAT_HISTORY)).await?;
    Ok(render_template(&ChatPage { messages }))
}
