//! Pagination/filter/sort query builder over the products collection.
//!
//! **SoC:** This module ONLY turns a [`ProductQuery`] into SQL text plus bound
//! parameters. User input never reaches the SQL string itself.

use rusqlite::types::Value;
use types::{PriceSort, ProductQuery};

use crate::document::Collection;

/// SQL fragments and parameters for one product listing.
#[derive(Debug, Clone)]
pub struct ProductQueryBuilder {
    conditions: Vec<&'static str>,
    params: Vec<Value>,
    order_by: &'static str,
    limit: i64,
    offset: i64,
}

impl ProductQueryBuilder {
    pub fn new(query: &ProductQuery) -> Self {
        let mut conditions = vec!["collection = ?"];
        let mut params = vec![Value::Text(Collection::Products.as_str().to_string())];

        if let Some(category) = &query.category {
            conditions.push("lower(json_extract(body, '$.category')) = lower(?)");
            params.push(Value::Text(category.clone()));
        }

        if let Some(available) = query.available {
            // JSON booleans come back from json_extract as 1/0
            conditions.push("json_extract(body, '$.status') = ?");
            params.push(Value::Integer(i64::from(available)));
        }

        let order_by = match query.sort_by_price {
            Some(PriceSort::Asc) => "json_extract(body, '$.price') ASC, seq ASC",
            Some(PriceSort::Desc) => "json_extract(body, '$.price') DESC, seq ASC",
            None => "seq ASC",
        };

        Self {
            conditions,
            params,
            order_by,
            limit: i64::from(query.limit),
            offset: i64::try_from(query.offset()).unwrap_or(i64::MAX),
        }
    }

    pub fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    /// `SELECT body ...` for one page.
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT body FROM documents WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
            self.where_clause(),
            self.order_by
        )
    }

    /// `SELECT COUNT(*) ...` over the same filter.
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM documents WHERE {}", self.where_clause())
    }

    /// Parameters for [`Self::select_sql`] (filters, then limit and offset).
    pub fn select_params(&self) -> Vec<Value> {
        let mut params = self.params.clone();
        params.push(Value::Integer(self.limit));
        params.push(Value::Integer(self.offset));
        params
    }

    /// Parameters for [`Self::count_sql`].
    pub fn count_params(&self) -> &[Value] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let builder = ProductQueryBuilder::new(&ProductQuery::default());
        assert_eq!(
            builder.select_sql(),
            "SELECT body FROM documents WHERE collection = ? ORDER BY seq ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(builder.count_params().len(), 1);
        assert_eq!(
            builder.select_params()[1..],
            [Value::Integer(10), Value::Integer(0)]
        );
    }

    #[test]
    fn test_filters_and_sort() {
        let query = ProductQuery {
            page: 3,
            limit: 4,
            category: Some("Food".into()),
            available: Some(false),
            sort_by_price: Some(PriceSort::Desc),
        };
        let builder = ProductQueryBuilder::new(&query);

        assert_eq!(
            builder.count_sql(),
            "SELECT COUNT(*) FROM documents WHERE collection = ? \
             AND lower(json_extract(body, '$.category')) = lower(?) \
             AND json_extract(body, '$.status') = ?"
        );
        assert!(builder
            .select_sql()
            .contains("ORDER BY json_extract(body, '$.price') DESC, seq ASC"));
        assert_eq!(
            builder.select_params(),
            vec![
                Value::Text("products".into()),
                Value::Text("Food".into()),
                Value::Integer(0),
                Value::Integer(4),
                Value::Integer(8),
            ]
        );
    }
}
