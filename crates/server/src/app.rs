//! Axum application builder.
//!
//! Configures routes, middleware, and state for the server.
//!
//! # Design Principles
//!
//! - **Declarative**: Routes declared via Axum's type-safe Router
//! - **Modular**: App builder separate from handlers
//! - **SoC**: Configuration here, logic in route modules

use axum::Router;
use axum::routing::{get, post, put};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{self, carts, health, logger, mocks, products, sessions, views, ws};
use crate::state::ServerState;

/// Create the Axum application with all routes.
pub fn create_app(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        // Health endpoints
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        // Products API
        .route(
            "/api/products",
            get(products::list_products).post(products::add_products),
        )
        .route(
            "/api/products/{pid}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Carts API
        .route("/api/carts", post(carts::create_cart))
        .route(
            "/api/carts/{cid}",
            get(carts::get_cart)
                .put(carts::replace_products)
                .delete(carts::clear_cart),
        )
        .route("/api/carts/{cid}/product/{pid}", post(carts::add_product))
        .route(
            "/api/carts/{cid}/products/{pid}",
            put(carts::set_quantity).delete(carts::remove_product),
        )
        .route("/api/carts/{cid}/purchase", post(carts::purchase))
        // Sessions API
        .route("/api/sessions/register", post(sessions::register))
        .route("/api/sessions/login", post(sessions::login))
        .route("/api/sessions/current", get(sessions::current))
        .route("/api/sessions/logout", post(sessions::logout))
        // Views
        .route("/", get(views::home))
        .route("/products", get(views::products))
        .route("/carts/{cid}", get(views::cart))
        .route("/realtimeproducts", get(views::realtime_products))
        .route("/chat", get(views::chat))
        // WebSocket endpoints
        .route("/ws/products", get(ws::products_ws))
        .route("/ws/chat", get(ws::chat_ws))
        // Utilities
        .route("/mockingproducts", get(mocks::mocking_products))
        .route("/loggertest", get(logger::logger_test))
        .fallback(routes::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".into(),
        }
    }
}

impl ServerConfig {
    /// Get bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
