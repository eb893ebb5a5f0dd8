//! Cart persistence and checkout.
//!
//! Every mutation loads the cart, edits it through the [`Cart`] methods and
//! writes it back inside one transaction, so concurrent edits to the same
//! cart serialise on the connection lock.

use chrono::Utc;
use rusqlite::Transaction;
use tracing::{debug, info};
use types::{
    Cart, CartLine, DocumentId, PopulatedCart, PopulatedLine, Product, PurchaseReport, Ticket,
};

use crate::document::{self, Collection};
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

fn load_cart(tx: &Transaction<'_>, id: &DocumentId) -> StoreResult<Cart> {
    document::get(tx, Collection::Carts, id)?.ok_or_else(|| StoreError::CartNotFound(id.clone()))
}

fn require_product(tx: &Transaction<'_>, id: &DocumentId) -> StoreResult<Product> {
    document::get(tx, Collection::Products, id)?
        .ok_or_else(|| StoreError::ProductNotFound(id.clone()))
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

impl Store {
    pub fn create_cart(&self) -> StoreResult<Cart> {
        let cart = Cart::new(DocumentId::generate());
        document::insert(&self.conn.lock(), Collection::Carts, &cart.id, &cart)?;
        debug!(cart_id = %cart.id, "cart created");
        Ok(cart)
    }

    pub fn get_cart(&self, id: &DocumentId) -> StoreResult<Option<Cart>> {
        document::get(&self.conn.lock(), Collection::Carts, id)
    }

    /// Cart with product documents resolved. Lines whose product no longer
    /// exists are left out.
    pub fn get_cart_populated(&self, id: &DocumentId) -> StoreResult<Option<PopulatedCart>> {
        let conn = self.conn.lock();
        let Some(cart) = document::get::<Cart>(&conn, Collection::Carts, id)? else {
            return Ok(None);
        };

        let mut products = Vec::with_capacity(cart.products.len());
        for line in cart.products {
            if let Some(product) = document::get::<Product>(&conn, Collection::Products, &line.product)? {
                products.push(PopulatedLine {
                    product,
                    quantity: line.quantity,
                });
            }
        }

        Ok(Some(PopulatedCart {
            id: cart.id,
            products,
        }))
    }

    /// Load, edit and store a cart in one transaction.
    fn modify_cart<F>(&self, id: &DocumentId, edit: F) -> StoreResult<Cart>
    where
        F: FnOnce(&Transaction<'_>, &mut Cart) -> StoreResult<()>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut cart = load_cart(&tx, id)?;
        edit(&tx, &mut cart)?;
        document::replace(&tx, Collection::Carts, id, &cart)?;

        tx.commit()?;
        Ok(cart)
    }

    /// Add `quantity` units of a product, incrementing an existing line.
    pub fn add_to_cart(&self, cart_id: &DocumentId, product_id: &DocumentId, quantity: u32) -> StoreResult<Cart> {
        self.modify_cart(cart_id, |tx, cart| {
            require_product(tx, product_id)?;
            cart.add(product_id.clone(), quantity);
            Ok(())
        })
    }

    pub fn remove_from_cart(&self, cart_id: &DocumentId, product_id: &DocumentId) -> StoreResult<Cart> {
        self.modify_cart(cart_id, |_, cart| {
            if cart.remove(product_id) {
                Ok(())
            } else {
                Err(StoreError::ProductNotInCart(product_id.clone()))
            }
        })
    }

    pub fn set_cart_quantity(
        &self,
        cart_id: &DocumentId,
        product_id: &DocumentId,
        quantity: u32,
    ) -> StoreResult<Cart> {
        self.modify_cart(cart_id, |_, cart| {
            if cart.set_quantity(product_id, quantity) {
                Ok(())
            } else {
                Err(StoreError::ProductNotInCart(product_id.clone()))
            }
        })
    }

    /// Replace every line. Each referenced product must exist.
    pub fn replace_cart_products(&self, cart_id: &DocumentId, lines: Vec<CartLine>) -> StoreResult<Cart> {
        self.modify_cart(cart_id, |tx, cart| {
            for line in &lines {
                require_product(tx, &line.product)?;
            }
            cart.replace(lines);
            Ok(())
        })
    }

    pub fn clear_cart(&self, cart_id: &DocumentId) -> StoreResult<Cart> {
        self.modify_cart(cart_id, |_, cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Check out a cart.
    ///
    /// Lines whose product is available with enough stock are billed and the
    /// stock is decremented; the rest stay in the cart and are reported as
    /// unavailable. A ticket is stored only if something was billed.
    pub fn purchase_cart(&self, cart_id: &DocumentId, purchaser: &str) -> StoreResult<PurchaseReport> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut cart = load_cart(&tx, cart_id)?;
        let mut amount = 0.0;
        let mut billed = 0usize;
        let mut remaining = Vec::new();
        let mut unavailable = Vec::new();

        for line in std::mem::take(&mut cart.products) {
            let product = document::get::<Product>(&tx, Collection::Products, &line.product)?;
            match product {
                Some(mut product) if product.status && product.stock >= line.quantity => {
                    product.stock -= line.quantity;
                    amount += product.price * f64::from(line.quantity);
                    billed += 1;
                    document::replace(&tx, Collection::Products, &product.id, &product)?;
                }
                _ => {
                    unavailable.push(line.product.clone());
                    remaining.push(line);
                }
            }
        }

        cart.products = remaining;
        document::replace(&tx, Collection::Carts, cart_id, &cart)?;

        let ticket = if billed > 0 {
            let ticket = Ticket {
                id: DocumentId::generate(),
                code: uuid::Uuid::new_v4().to_string(),
                purchase_datetime: Utc::now(),
                amount: round_cents(amount),
                purchaser: purchaser.to_string(),
            };
            document::insert(&tx, Collection::Tickets, &ticket.id, &ticket)?;
            Some(ticket)
        } else {
            None
        };

        tx.commit()?;
        info!(
            cart_id = %cart_id,
            billed,
            unavailable = unavailable.len(),
            "cart purchased"
        );

        Ok(PurchaseReport {
            ticket,
            unavailable,
        })
    }
}
