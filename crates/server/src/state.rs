//! Shared server state.
//!
//! Contains the store, services, channels and metrics shared across handlers.
//!
//! # Design Principles
//!
//! - **Declarative**: State is data, handlers extract what they need
//! - **Modular**: State independent of route logic
//! - **SoC**: State holds handles; the store owns persistence

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use storage::Store;
use tokio::sync::broadcast;
use types::{ChatMessage, Role, user::normalize_email};

use crate::auth::SessionKeys;
use crate::broadcast::ProductBroadcaster;
use crate::service::{CartService, ProductService};

/// Buffered updates per product subscriber before it lags.
pub const PRODUCT_CHANNEL_CAPACITY: usize = 64;
/// Buffered chat messages per subscriber before it lags.
pub const CHAT_CHANNEL_CAPACITY: usize = 256;

/// Settings that shape state but are not part of the store.
#[derive(Debug, Clone)]
pub struct StateConfig {
    pub session_secret: String,
    pub session_ttl: Duration,
    /// Accounts registered with this email get the admin role.
    pub admin_email: Option<String>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            session_secret: "change-me".into(),
            session_ttl: Duration::from_secs(60 * 60 * 24),
            admin_email: None,
        }
    }
}

// =============================================================================
// ServerState
// =============================================================================

/// Shared state for all route handlers.
///
/// Cloned into each handler via Axum's State extractor.
#[derive(Clone)]
pub struct ServerState {
    /// Document store (also used directly for users and chat).
    pub store: Arc<Store>,

    pub products: ProductService,
    pub carts: CartService,

    /// Product list broadcast (services publish, `/ws/products` subscribes).
    pub broadcaster: ProductBroadcaster,

    /// Chat fan-out to every `/ws/chat` client.
    pub chat_tx: broadcast::Sender<ChatMessage>,

    pub sessions: Arc<SessionKeys>,

    admin_email: Option<String>,

    /// Server start time.
    pub start_time: Instant,

    /// Shared metrics.
    pub metrics: Arc<ServerMetrics>,
}

impl ServerState {
    pub fn new(store: Arc<Store>, config: StateConfig) -> Self {
        let broadcaster = ProductBroadcaster::new(PRODUCT_CHANNEL_CAPACITY);
        let (chat_tx, _) = broadcast::channel(CHAT_CHANNEL_CAPACITY);

        Self {
            products: ProductService::new(Arc::clone(&store), broadcaster.clone()),
            carts: CartService::new(Arc::clone(&store), broadcaster.clone()),
            store,
            broadcaster,
            chat_tx,
            sessions: Arc::new(SessionKeys::new(config.session_secret, config.session_ttl)),
            admin_email: config.admin_email.as_deref().map(normalize_email),
            start_time: Instant::now(),
            metrics: Arc::new(ServerMetrics::new()),
        }
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Role a new account with `email` receives.
    pub fn role_for(&self, email: &str) -> Role {
        match &self.admin_email {
            Some(admin) if *admin == normalize_email(email) => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn subscribe_chat(&self) -> broadcast::Receiver<ChatMessage> {
        self.chat_tx.subscribe()
    }
}

// =============================================================================
// ServerMetrics
// =============================================================================

/// Server-side metrics.
pub struct ServerMetrics {
    /// Active WebSocket connections (products and chat).
    pub ws_connections: AtomicU64,
    /// Chat messages accepted since start.
    pub chat_messages: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self {
            ws_connections: AtomicU64::new(0),
            chat_messages: AtomicU64::new(0),
        }
    }

    /// Increment WebSocket connection count.
    pub fn ws_connect(&self) {
        self.ws_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement WebSocket connection count.
    pub fn ws_disconnect(&self) {
        self.ws_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Get WebSocket connection count.
    pub fn ws_count(&self) -> u64 {
        self.ws_connections.load(Ordering::Relaxed)
    }

    pub fn chat_message(&self) {
        self.chat_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn chat_count(&self) -> u64 {
        self.chat_messages.load(Ordering::Relaxed)
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
