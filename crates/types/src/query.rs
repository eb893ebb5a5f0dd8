//! Product listing queries and paginated results.
//!
//! # Flow
//!
//! ```text
//! ?page=2&limit=5&category=food&available=true&sortByPrice=desc
//!        │
//!        ▼
//! ProductParams (raw strings) ──try_from──▶ ProductQuery (typed, clamped)
//!                                                │
//!                                   storage query builder
//!                                                │
//!                                                ▼
//!                         Page<Product> ──▶ ProductListResponse (links)
//! ```

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

// =============================================================================
// Query Types
// =============================================================================

/// Rejected query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value {value:?} for query parameter '{param}'")]
pub struct QueryError {
    pub param: &'static str,
    pub value: String,
}

/// Sort direction on price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSort {
    Asc,
    Desc,
}

impl PriceSort {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceSort::Asc => "asc",
            PriceSort::Desc => "desc",
        }
    }
}

/// Raw query string parameters, as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub available: Option<String>,
    pub sort_by_price: Option<String>,
}

/// Typed product listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    /// Page size, within `1..=MAX_LIMIT`.
    pub limit: u32,
    pub category: Option<String>,
    /// Filter on the product `status` flag.
    pub available: Option<bool>,
    pub sort_by_price: Option<PriceSort>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            category: None,
            available: None,
            sort_by_price: None,
        }
    }
}

fn present(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_number(param: &'static str, raw: Option<String>, default: u32) -> Result<u32, QueryError> {
    match present(raw) {
        None => Ok(default),
        Some(value) => match value.parse::<u32>() {
            Ok(n) => Ok(n),
            // Too many digits is still a number; the caller clamps it
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u32::MAX),
            Err(_) => Err(QueryError { param, value }),
        },
    }
}

impl TryFrom<ProductParams> for ProductQuery {
    type Error = QueryError;

    fn try_from(params: ProductParams) -> Result<Self, Self::Error> {
        let page = parse_number("page", params.page, DEFAULT_PAGE)?.max(1);
        let limit = parse_number("limit", params.limit, DEFAULT_LIMIT)?.clamp(1, MAX_LIMIT);

        let available = match present(params.available) {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
            Some(value) => {
                return Err(QueryError {
                    param: "available",
                    value,
                });
            }
        };

        let sort_by_price = match present(params.sort_by_price) {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("asc") => Some(PriceSort::Asc),
            Some(v) if v.eq_ignore_ascii_case("desc") => Some(PriceSort::Desc),
            Some(value) => {
                return Err(QueryError {
                    param: "sortByPrice",
                    value,
                });
            }
        };

        Ok(Self {
            page,
            limit,
            category: present(params.category),
            available,
            sort_by_price,
        })
    }
}

impl ProductQuery {
    /// Row offset of the first document on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Build a link to `page` on `base_path`, keeping every active filter.
    pub fn link(&self, base_path: &str, page: u32) -> String {
        let mut qs = form_urlencoded::Serializer::new(String::new());
        qs.append_pair("page", &page.to_string());
        qs.append_pair("limit", &self.limit.to_string());
        if let Some(category) = &self.category {
            qs.append_pair("category", category);
        }
        if let Some(available) = self.available {
            qs.append_pair("available", if available { "true" } else { "false" });
        }
        if let Some(sort) = self.sort_by_price {
            qs.append_pair("sortByPrice", sort.as_str());
        }
        format!("{base_path}?{}", qs.finish())
    }
}

// =============================================================================
// Paginated Results
// =============================================================================

/// One page of documents plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub limit: u32,
    /// Always at least 1, even for an empty collection.
    pub total_pages: u32,
    pub page: u32,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(docs: Vec<T>, total_docs: u64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        let total_pages = u32::try_from(total_docs.div_ceil(u64::from(limit)))
            .unwrap_or(u32::MAX)
            .max(1);
        let has_prev_page = page > 1;
        let has_next_page = page < total_pages;
        Self {
            docs,
            total_docs,
            limit,
            total_pages,
            page,
            has_prev_page,
            has_next_page,
            prev_page: has_prev_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
        }
    }
}

/// Response envelope for `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse<T> {
    pub status: &'static str,
    pub payload: Vec<T>,
    pub total_pages: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub page: u32,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

impl<T> ProductListResponse<T> {
    pub fn from_page(page: Page<T>, query: &ProductQuery, base_path: &str) -> Self {
        Self {
            status: "success",
            prev_link: page.prev_page.map(|p| query.link(base_path, p)),
            next_link: page.next_page.map(|p| query.link(base_path, p)),
            payload: page.docs,
            total_pages: page.total_pages,
            prev_page: page.prev_page,
            next_page: page.next_page,
            page: page.page,
            has_prev_page: page.has_prev_page,
            has_next_page: page.has_next_page,
        }
    }
}
