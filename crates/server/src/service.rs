//! Product and cart services.
//!
//! Handlers call these instead of the store directly. Each service runs
//! store calls on the blocking pool. Writes that change the product list
//! run together with their [`ProductBroadcaster`] publish on a spawned task,
//! so the broadcast follows the commit even when the request is dropped.
//!
//! # Design Principles
//!
//! - **Declarative**: One method per operation, typed inputs and outputs
//! - **Modular**: Products and carts are separate services over one store
//! - **SoC**: Services own broadcast timing; handlers own HTTP shapes

use std::sync::Arc;

use storage::{Store, StoreResult};
use tracing::{info, warn};
use types::{
    AddOutcome, CartLine, DocumentId, NewProduct, Page, PopulatedCart, Product, ProductPatch,
    ProductQuery, PurchaseReport,
};

use crate::broadcast::ProductBroadcaster;
use crate::error::{AppError, AppResult};

// =============================================================================
// Blocking helpers
// =============================================================================

/// Run a store call on the blocking pool.
pub async fn run_blocking<T, F>(store: &Arc<Store>, f: F) -> AppResult<T>
where
    F: FnOnce(&Store) -> T + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| AppError::Internal(format!("store task failed: {e}")))
}

/// Run a fallible store call on the blocking pool.
pub async fn blocking<T, F>(store: &Arc<Store>, f: F) -> AppResult<T>
where
    F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(run_blocking(store, f).await??)
}

/// Broadcast after a committed write. The write already succeeded, so a
/// failed re-query is logged rather than surfaced to the caller.
async fn notify(broadcaster: &ProductBroadcaster, store: &Arc<Store>) {
    if let Err(e) = broadcaster.publish(store).await {
        warn!(error = %e, "product broadcast failed");
    }
}

/// Run a product-affecting write, then broadcast when `changed` says so.
///
/// Both halves run on a spawned task. Dropping the caller after the write
/// commits cannot skip the broadcast.
async fn commit<T, F, C>(
    store: &Arc<Store>,
    broadcaster: &ProductBroadcaster,
    write: F,
    changed: C,
) -> AppResult<T>
where
    F: FnOnce(&Store) -> StoreResult<T> + Send + 'static,
    C: FnOnce(&T) -> bool + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    let broadcaster = broadcaster.clone();
    tokio::spawn(async move {
        let result = blocking(&store, write).await?;
        if changed(&result) {
            notify(&broadcaster, &store).await;
        }
        Ok::<_, AppError>(result)
    })
    .await
    .map_err(|e| AppError::Internal(format!("commit task failed: {e}")))?
}

// =============================================================================
// ProductService
// =============================================================================

#[derive(Clone)]
pub struct ProductService {
    store: Arc<Store>,
    broadcaster: ProductBroadcaster,
}

impl ProductService {
    pub fn new(store: Arc<Store>, broadcaster: ProductBroadcaster) -> Self {
        Self { store, broadcaster }
    }

    pub async fn list(&self, query: ProductQuery) -> AppResult<Page<Product>> {
        blocking(&self.store, move |s| s.list_products(&query)).await
    }

    pub async fn all(&self) -> AppResult<Vec<Product>> {
        blocking(&self.store, |s| s.all_products()).await
    }

    pub async fn get(&self, id: DocumentId) -> AppResult<Option<Product>> {
        blocking(&self.store, move |s| s.get_product(&id)).await
    }

    /// Add a validated batch. Broadcasts once if anything was added.
    pub async fn add_many(&self, products: Vec<NewProduct>) -> AppResult<Vec<AddOutcome>> {
        commit(
            &self.store,
            &self.broadcaster,
            |s| Ok(products.into_iter().map(|p| s.add_product(p)).collect()),
            |outcomes: &Vec<AddOutcome>| {
                let added = outcomes.iter().filter(|o| **o == AddOutcome::Added).count();
                if added > 0 {
                    info!(added, requested = outcomes.len(), "products added");
                }
                added > 0
            },
        )
        .await
    }

    /// `None` when the product does not exist.
    pub async fn update(&self, id: DocumentId, patch: ProductPatch) -> AppResult<Option<Product>> {
        commit(
            &self.store,
            &self.broadcaster,
            move |s| s.update_product(&id, patch),
            |updated: &Option<Product>| match updated {
                Some(product) => {
                    info!(product_id = %product.id, "product updated");
                    true
                }
                None => false,
            },
        )
        .await
    }

    /// `false` when the product does not exist.
    pub async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        let product_id = id.clone();
        commit(
            &self.store,
            &self.broadcaster,
            move |s| s.delete_product(&id),
            move |removed: &bool| {
                if *removed {
                    info!(%product_id, "product removed");
                }
                *removed
            },
        )
        .await
    }
}

// =============================================================================
// CartService
// =============================================================================

#[derive(Clone)]
pub struct CartService {
    store: Arc<Store>,
    broadcaster: ProductBroadcaster,
}

impl CartService {
    pub fn new(store: Arc<Store>, broadcaster: ProductBroadcaster) -> Self {
        Self { store, broadcaster }
    }

    pub async fn create(&self) -> AppResult<types::Cart> {
        blocking(&self.store, |s| s.create_cart()).await
    }

    pub async fn get_populated(&self, id: DocumentId) -> AppResult<Option<PopulatedCart>> {
        blocking(&self.store, move |s| s.get_cart_populated(&id)).await
    }

    /// Add `quantity` of a product, returning the populated cart.
    pub async fn add(&self, cart: DocumentId, product: DocumentId, quantity: u32) -> AppResult<PopulatedCart> {
        self.modify(cart, move |s, cid| s.add_to_cart(cid, &product, quantity))
            .await
    }

    pub async fn remove(&self, cart: DocumentId, product: DocumentId) -> AppResult<PopulatedCart> {
        self.modify(cart, move |s, cid| s.remove_from_cart(cid, &product))
            .await
    }

    pub async fn set_quantity(
        &self,
        cart: DocumentId,
        product: DocumentId,
        quantity: u32,
    ) -> AppResult<PopulatedCart> {
        self.modify(cart, move |s, cid| s.set_cart_quantity(cid, &product, quantity))
            .await
    }

    pub async fn replace(&self, cart: DocumentId, lines: Vec<CartLine>) -> AppResult<PopulatedCart> {
        self.modify(cart, move |s, cid| s.replace_cart_products(cid, lines))
            .await
    }

    pub async fn clear(&self, cart: DocumentId) -> AppResult<PopulatedCart> {
        self.modify(cart, |s, cid| s.clear_cart(cid)).await
    }

    /// Check out a cart. Stock changes, so a ticket triggers a broadcast.
    pub async fn purchase(&self, cart: DocumentId, purchaser: String) -> AppResult<PurchaseReport> {
        commit(
            &self.store,
            &self.broadcaster,
            move |s| s.purchase_cart(&cart, &purchaser),
            |report: &PurchaseReport| match &report.ticket {
                Some(ticket) => {
                    info!(ticket = %ticket.code, amount = ticket.amount, "purchase completed");
                    true
                }
                None => false,
            },
        )
        .await
    }

    /// Apply a cart write and re-read the cart populated.
    async fn modify<F>(&self, cart: DocumentId, f: F) -> AppResult<PopulatedCart>
    where
        F: FnOnce(&Store, &DocumentId) -> StoreResult<types::Cart> + Send + 'static,
    {
        blocking(&self.store, move |s| {
            f(s, &cart)?;
            s.get_cart_populated(&cart)?
                .ok_or(storage::StoreError::CartNotFound(cart))
        })
        .await
    }
}
