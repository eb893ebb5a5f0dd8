//! Carts, cart lines and purchase tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;
use crate::product::Product;

/// One product reference inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: DocumentId,
    pub quantity: u32,
}

/// A stored cart. Lines hold product ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(default)]
    pub products: Vec<CartLine>,
}

impl Cart {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            products: Vec::new(),
        }
    }

    /// Add `quantity` units, incrementing an existing line.
    pub fn add(&mut self, product: DocumentId, quantity: u32) {
        match self.products.iter_mut().find(|l| l.product == product) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.products.push(CartLine { product, quantity }),
        }
    }

    /// Overwrite the quantity of an existing line. Returns false if absent.
    pub fn set_quantity(&mut self, product: &DocumentId, quantity: u32) -> bool {
        match self.products.iter_mut().find(|l| &l.product == product) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns false if absent.
    pub fn remove(&mut self, product: &DocumentId) -> bool {
        let before = self.products.len();
        self.products.retain(|l| &l.product != product);
        self.products.len() != before
    }

    pub fn clear(&mut self) {
        self.products.clear();
    }

    /// Replace every line, merging repeated products by summing quantities.
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        self.products.clear();
        for line in lines {
            self.add(line.product, line.quantity);
        }
    }
}

/// A cart line with its product document resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulatedLine {
    pub product: Product,
    pub quantity: u32,
}

impl PopulatedLine {
    pub fn subtotal(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// A cart as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulatedCart {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub products: Vec<PopulatedLine>,
}

impl PopulatedCart {
    pub fn total(&self) -> f64 {
        self.products.iter().map(PopulatedLine::subtotal).sum()
    }
}

/// Record of a completed purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub code: String,
    pub purchase_datetime: DateTime<Utc>,
    pub amount: f64,
    /// Purchaser email.
    pub purchaser: String,
}

/// Outcome of `POST /api/carts/{cid}/purchase`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseReport {
    /// Absent when nothing in the cart could be billed.
    pub ticket: Option<Ticket>,
    /// Products left in the cart for lack of stock or availability.
    pub unavailable: Vec<DocumentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line<'a>(cart: &'a Cart, product: &DocumentId) -> Option<&'a CartLine> {
        cart.products.iter().find(|l| &l.product == product)
    }

    #[test]
    fn test_add_increments_existing_line() {
        let pid = DocumentId::generate();
        let mut cart = Cart::new(DocumentId::generate());
        cart.add(pid.clone(), 1);
        cart.add(pid.clone(), 2);
        assert_eq!(cart.products.len(), 1);
        assert_eq!(line(&cart, &pid).unwrap().quantity, 3);
    }

    #[test]
    fn test_set_and_remove() {
        let pid = DocumentId::generate();
        let other = DocumentId::generate();
        let mut cart = Cart::new(DocumentId::generate());
        cart.add(pid.clone(), 1);

        assert!(cart.set_quantity(&pid, 7));
        assert!(!cart.set_quantity(&other, 7));
        assert_eq!(line(&cart, &pid).unwrap().quantity, 7);

        assert!(!cart.remove(&other));
        assert!(cart.remove(&pid));
        assert!(cart.products.is_empty());
    }

    #[test]
    fn test_replace_merges_duplicates() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        let mut cart = Cart::new(DocumentId::generate());
        cart.add(b.clone(), 9);
        cart.replace(vec![
            CartLine {
                product: a.clone(),
                quantity: 1,
            },
            CartLine {
                product: a.clone(),
                quantity: 4,
            },
        ]);
        assert_eq!(cart.products.len(), 1);
        assert_eq!(line(&cart, &a).unwrap().quantity, 5);
        assert!(line(&cart, &b).is_none());
    }
}
