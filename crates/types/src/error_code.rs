//! Named error codes shared by every API surface.
//!
//! Each code carries a stable name, a default message and the HTTP status it
//! maps to. The server crate turns these into `{"name", "code", "message"}`
//! bodies; this crate stays free of any HTTP dependency.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidProductId,
    ProductNotFound,
    InvalidCartId,
    CartNotFound,
    ProductNotInCart,
    InvalidQuantity,
    InvalidQuery,
    InvalidProductData,
    DuplicateProductCode,
    UserAlreadyExists,
    InvalidCredentials,
    Unauthorized,
    Forbidden,
    InternalServerError,
}

impl ErrorCode {
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::InvalidProductId => "INVALID_PRODUCT_ID",
            ErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCode::InvalidCartId => "INVALID_CART_ID",
            ErrorCode::CartNotFound => "CART_NOT_FOUND",
            ErrorCode::ProductNotInCart => "PRODUCT_NOT_IN_CART",
            ErrorCode::InvalidQuantity => "INVALID_QUANTITY",
            ErrorCode::InvalidQuery => "INVALID_QUERY",
            ErrorCode::InvalidProductData => "INVALID_PRODUCT_DATA",
            ErrorCode::DuplicateProductCode => "DUPLICATE_PRODUCT_CODE",
            ErrorCode::UserAlreadyExists => "USER_ALREADY_EXISTS",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::InvalidProductId => "Invalid product ID",
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::InvalidCartId => "Invalid cart ID",
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::ProductNotInCart => "Product not found in cart",
            ErrorCode::InvalidQuantity => "Quantity must be a positive integer",
            ErrorCode::InvalidQuery => "Invalid query parameters",
            ErrorCode::InvalidProductData => "Invalid product data",
            ErrorCode::DuplicateProductCode => "Product with that code already exists",
            ErrorCode::UserAlreadyExists => "User already exists",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::Forbidden => "Not allowed",
            ErrorCode::InternalServerError => "Internal server error",
        }
    }

    pub fn status(self) -> u16 {
        match self {
            ErrorCode::InvalidProductId
            | ErrorCode::InvalidCartId
            | ErrorCode::InvalidQuantity
            | ErrorCode::InvalidQuery
            | ErrorCode::InvalidProductData
            | ErrorCode::DuplicateProductCode => 400,
            ErrorCode::InvalidCredentials | ErrorCode::Unauthorized => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::ProductNotFound | ErrorCode::CartNotFound | ErrorCode::ProductNotInCart => {
                404
            }
            ErrorCode::UserAlreadyExists => 409,
            ErrorCode::InternalServerError => 500,
        }
    }
}
