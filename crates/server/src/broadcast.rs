//! Real-time product list broadcast.
//!
//! After every committed product mutation the full product list is re-read
//! from the store and pushed to every `/ws/products` subscriber.
//!
//! # Ordering
//!
//! ```text
//! handler A: commit ─┐                       ┌─ send(seq=7)
//!                    ├─ publish_lock ─ query ┤
//! handler B: commit ─┘   (one at a time)     └─ send(seq=8)
//! ```
//!
//! Re-query and send happen under one async mutex, and each update carries a
//! sequence number. A query that starts later observes every commit an
//! earlier query did, so a higher `seq` is never older state. Subscribers
//! drop anything at or below the `seq` they already hold.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use storage::Store;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;
use types::Product;

use crate::error::AppResult;
use crate::service::blocking;

/// Event name clients listen for.
pub const PRODUCTS_EVENT: &str = "productos";

/// One broadcast of the full product list.
#[derive(Debug, Clone, Serialize)]
pub struct ProductsUpdate {
    pub event: &'static str,
    pub seq: u64,
    pub payload: Arc<Vec<Product>>,
}

impl ProductsUpdate {
    fn new(seq: u64, products: Vec<Product>) -> Self {
        Self {
            event: PRODUCTS_EVENT,
            seq,
            payload: Arc::new(products),
        }
    }
}

struct Inner {
    tx: broadcast::Sender<ProductsUpdate>,
    seq: AtomicU64,
    latest: RwLock<Option<ProductsUpdate>>,
    publish_lock: Mutex<()>,
}

/// Shared handle to the product broadcast channel.
#[derive(Clone)]
pub struct ProductBroadcaster {
    inner: Arc<Inner>,
}

impl ProductBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Inner {
                tx,
                seq: AtomicU64::new(0),
                latest: RwLock::new(None),
                publish_lock: Mutex::new(()),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProductsUpdate> {
        self.inner.tx.subscribe()
    }

    /// Sequence number of the last published update (0 before the first).
    pub fn current_seq(&self) -> u64 {
        self.inner.seq.load(Ordering::SeqCst)
    }

    /// Most recent update, if any was published or snapshotted.
    pub fn latest(&self) -> Option<ProductsUpdate> {
        self.inner.latest.read().clone()
    }

    /// Re-query the full product list and send it to every subscriber.
    ///
    /// Call only after the mutation has committed.
    pub async fn publish(&self, store: &Arc<Store>) -> AppResult<u64> {
        let _guard = self.inner.publish_lock.lock().await;

        let products = blocking(store, |s| s.all_products()).await?;
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let update = ProductsUpdate::new(seq, products);

        *self.inner.latest.write() = Some(update.clone());
        // Err only means nobody is subscribed right now
        let receivers = self.inner.tx.send(update).unwrap_or(0);

        debug!(seq, receivers, "product list broadcast");
        Ok(seq)
    }

    #[cfg(test)]
    pub(crate) async fn hold_publish(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.inner.publish_lock.lock().await
    }

    /// The latest update, querying the store if nothing was published yet.
    pub async fn snapshot(&self, store: &Arc<Store>) -> AppResult<ProductsUpdate> {
        if let Some(latest) = self.latest() {
            return Ok(latest);
        }

        let _guard = self.inner.publish_lock.lock().await;
        // A publish may have landed while we waited
        if let Some(latest) = self.latest() {
            return Ok(latest);
        }

        let products = blocking(store, |s| s.all_products()).await?;
        let update = ProductsUpdate::new(self.current_seq(), products);
        *self.inner.latest.write() = Some(update.clone());
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::NewProduct;

    fn new_product(code: &str) -> NewProduct {
        NewProduct {
            title: code.into(),
            description: "d".into(),
            code: code.into(),
            price: 1.0,
            status: true,
            stock: 1,
            category: "c".into(),
            thumbnails: vec![],
        }
    }

    #[tokio::test]
    async fn test_publish_sends_full_list_with_increasing_seq() {
        let store = Arc::new(Store::in_memory().unwrap());
        let broadcaster = ProductBroadcaster::new(16);
        let mut rx = broadcaster.subscribe();

        store.insert_product(new_product("A")).unwrap();
        assert_eq!(broadcaster.publish(&store).await.unwrap(), 1);
        store.insert_product(new_product("B")).unwrap();
        assert_eq!(broadcaster.publish(&store).await.unwrap(), 2);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(first.payload.len(), 1);
        assert_eq!(second.seq, 2);
        assert_eq!(second.payload.len(), 2);
        assert_eq!(second.event, PRODUCTS_EVENT);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let store = Arc::new(Store::in_memory().unwrap());
        let broadcaster = ProductBroadcaster::new(4);
        assert!(broadcaster.publish(&store).await.is_ok());
        assert_eq!(broadcaster.latest().unwrap().seq, 1);
    }

    #[tokio::test]
    async fn test_snapshot_before_any_publish() {
        let store = Arc::new(Store::in_memory().unwrap());
        store.insert_product(new_product("A")).unwrap();
        let broadcaster = ProductBroadcaster::new(4);

        let snap = broadcaster.snapshot(&store).await.unwrap();
        assert_eq!(snap.seq, 0);
        assert_eq!(snap.payload.len(), 1);

        store.insert_product(new_product("B")).unwrap();
        broadcaster.publish(&store).await.unwrap();
        let snap = broadcaster.snapshot(&store).await.unwrap();
        assert_eq!(snap.seq, 1);
        assert_eq!(snap.payload.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_publishes_arrive_in_order() {
        let store = Arc::new(Store::in_memory().unwrap());
        let broadcaster = ProductBroadcaster::new(64);
        let mut rx = broadcaster.subscribe();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            let broadcaster = broadcaster.clone();
            handles.push(tokio::spawn(async move {
                store.insert_product(new_product(&format!("P{i}"))).unwrap();
                broadcaster.publish(&store).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut last_seq = 0;
        let mut last_len = 0;
        for _ in 0..10 {
            let update = rx.recv().await.unwrap();
            assert!(update.seq > last_seq);
            assert!(update.payload.len() >= last_len);
            last_seq = update.seq;
            last_len = update.payload.len();
        }
        assert_eq!(last_len, 10);
    }
}
