//! Core types for the storefront backend.
//!
//! This crate holds the documents the store persists (products, carts,
//! users, tickets, chat messages), the listing query and page types, product
//! payload validation and the named error codes. It has no I/O.

pub mod cart;
pub mod chat;
pub mod error_code;
pub mod ids;
pub mod product;
pub mod query;
pub mod user;
pub mod validation;

pub use cart::{Cart, CartLine, PopulatedCart, PopulatedLine, PurchaseReport, Ticket};
pub use chat::{ChatMessage, IncomingMessage};
pub use error_code::ErrorCode;
pub use ids::{DocumentId, InvalidId};
pub use product::{AddOutcome, NewProduct, Product, ProductPatch};
pub use query::{Page, PriceSort, ProductListResponse, ProductParams, ProductQuery, QueryError};
pub use user::{LoginRequest, PublicUser, RegisterRequest, Role, User};
pub use validation::{ValidationError, as_batch, validate_products};
