//! Product persistence.

use rusqlite::params_from_iter;
use tracing::{debug, warn};
use types::{AddOutcome, Cart, DocumentId, NewProduct, Page, Product, ProductPatch, ProductQuery};

use crate::document::{self, Collection};
use crate::error::{StoreError, StoreResult, is_unique_violation};
use crate::query::ProductQueryBuilder;
use crate::store::Store;

impl Store {
    /// One page of products matching `query`.
    pub fn list_products(&self, query: &ProductQuery) -> StoreResult<Page<Product>> {
        let builder = ProductQueryBuilder::new(query);
        let conn = self.conn.lock();

        let total: i64 = conn.query_row(
            &builder.count_sql(),
            params_from_iter(builder.count_params()),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&builder.select_sql())?;
        let bodies = stmt
            .query_map(params_from_iter(builder.select_params()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let docs = bodies
            .iter()
            .map(|body| serde_json::from_str(body))
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(Page::new(
            docs,
            u64::try_from(total).unwrap_or(0),
            query.page,
            query.limit,
        ))
    }

    /// Every product in natural order. This is what gets broadcast.
    pub fn all_products(&self) -> StoreResult<Vec<Product>> {
        document::all(&self.conn.lock(), Collection::Products)
    }

    pub fn get_product(&self, id: &DocumentId) -> StoreResult<Option<Product>> {
        document::get(&self.conn.lock(), Collection::Products, id)
    }

    /// Insert a product, failing with [`StoreError::DuplicateCode`] if the
    /// code is taken.
    pub fn insert_product(&self, new: NewProduct) -> StoreResult<Product> {
        let product = new.into_product(DocumentId::generate());
        let conn = self.conn.lock();
        match document::insert(&conn, Collection::Products, &product.id, &product) {
            Ok(()) => {
                debug!(product_id = %product.id, code = %product.code, "product inserted");
                Ok(product)
            }
            Err(StoreError::Sqlite(e)) if is_unique_violation(&e) => {
                Err(StoreError::DuplicateCode(product.code))
            }
            Err(e) => Err(e),
        }
    }

    /// Insert a product and report the outcome the way the API does.
    pub fn add_product(&self, new: NewProduct) -> AddOutcome {
        match self.insert_product(new) {
            Ok(_) => AddOutcome::Added,
            Err(StoreError::DuplicateCode(code)) => {
                debug!(%code, "duplicate product code rejected");
                AddOutcome::DuplicateCode
            }
            Err(e) => {
                warn!(error = %e, "failed to add product");
                AddOutcome::Failed
            }
        }
    }

    /// Apply a patch. `Ok(None)` when the product does not exist.
    pub fn update_product(&self, id: &DocumentId, patch: ProductPatch) -> StoreResult<Option<Product>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let Some(mut product) = document::get::<Product>(&tx, Collection::Products, id)? else {
            return Ok(None);
        };
        patch.apply(&mut product);

        match document::replace(&tx, Collection::Products, id, &product) {
            Ok(_) => {}
            Err(StoreError::Sqlite(e)) if is_unique_violation(&e) => {
                return Err(StoreError::DuplicateCode(product.code));
            }
            Err(e) => return Err(e),
        }

        tx.commit()?;
        Ok(Some(product))
    }

    /// Delete a product and pull it from every cart. Returns false if absent.
    pub fn delete_product(&self, id: &DocumentId) -> StoreResult<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if !document::delete(&tx, Collection::Products, id)? {
            return Ok(false);
        }

        let carts: Vec<Cart> = document::all(&tx, Collection::Carts)?;
        for mut cart in carts {
            if cart.remove(id) {
                document::replace(&tx, Collection::Carts, &cart.id, &cart)?;
            }
        }

        tx.commit()?;
        debug!(product_id = %id, "product deleted");
        Ok(true)
    }
}
