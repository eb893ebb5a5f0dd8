//! Server crate: Axum-based HTTP, view and WebSocket surface for the storefront.
//!
//! Translates requests into store operations and keeps live clients in step
//! with the catalogue.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  routes/*    │──>│  services    │──>│  Store       │
//! │  (validate,  │   │  (blocking   │   │  (SQLite tx) │
//! │   map errors)│   │   pool)      │   └──────────────┘
//! └──────────────┘   └──────┬───────┘
//!                           │ after commit
//!                           ▼
//!                 ┌────────────────────┐ broadcast ┌──────────────┐
//!                 │ ProductBroadcaster │──────────>│ /ws/products │
//!                 │ (re-query + seq)   │           │  clients     │
//!                 └────────────────────┘           └──────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Declarative**: Routes and handlers declared via Axum's type-safe routing
//! - **Modular**: Each surface (API, views, WebSocket) in its own module
//! - **SoC**: The store owns persistence; services own broadcast timing
//!
//! # Modules
//!
//! - [`app`]: Axum application builder and router setup
//! - [`state`]: Shared server state (store, services, channels, metrics)
//! - [`error`]: Unified error handling with HTTP status codes
//! - [`service`]: Product and cart services over the blocking pool
//! - [`broadcast`]: Sequenced product list broadcast
//! - [`auth`]: Signed session cookies and password hashing
//! - [`routes`]: HTTP, view and WebSocket handlers

pub mod app;
pub mod auth;
pub mod broadcast;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use app::{ServerConfig, create_app};
pub use broadcast::{ProductBroadcaster, ProductsUpdate};
pub use error::{AppError, AppResult};
pub use state::{ServerState, StateConfig};
