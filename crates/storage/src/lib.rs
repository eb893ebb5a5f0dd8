//! Storage layer for the storefront
//!
//! **Philosophy:** Declarative, Modular, SoC
//! - Declarative: Schema defined upfront, queries built from typed input
//! - Modular: One document table, collections are a column
//! - SoC: This crate ONLY handles persistence, no HTTP or broadcast logic
//!
//! **Collections**
//! - `products`: catalogue, `code` unique (enforced by a partial index)
//! - `carts`: product references with quantities
//! - `users`: accounts, `email` unique; each user owns a cart
//! - `tickets`: completed purchases
//! - `messages`: chat history

mod carts;
mod document;
mod error;
mod products;
mod query;
mod schema;
mod store;
mod users;

pub use document::Collection;
pub use error::{StoreError, StoreResult};
pub use query::ProductQueryBuilder;
pub use schema::StorageConfig;
pub use store::Store;
pub use users::UserDraft;

#[cfg(test)]
mod tests;
