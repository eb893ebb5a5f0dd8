//! Store-level tests: products, queries, carts, checkout, users, messages.

use types::{
    AddOutcome, CartLine, DocumentId, NewProduct, PriceSort, ProductPatch, ProductQuery, Role,
    Ticket,
};

use crate::document::{self, Collection};
use crate::{Store, StoreError, UserDraft};

fn product(code: &str, price: f64, category: &str, status: bool, stock: u32) -> NewProduct {
    NewProduct {
        title: format!("Product {code}"),
        description: "test product".into(),
        code: code.into(),
        price,
        status,
        stock,
        category: category.into(),
        thumbnails: vec![],
    }
}

fn seeded() -> Store {
    let store = Store::in_memory().unwrap();
    store.insert_product(product("A", 30.0, "food", true, 5)).unwrap();
    store.insert_product(product("B", 10.0, "toys", true, 0)).unwrap();
    store.insert_product(product("C", 20.0, "food", false, 2)).unwrap();
    store.insert_product(product("D", 5.0, "Food", true, 9)).unwrap();
    store
}

fn codes(products: &[types::Product]) -> Vec<&str> {
    products.iter().map(|p| p.code.as_str()).collect()
}

// =============================================================================
// Products
// =============================================================================

#[test]
fn test_duplicate_code_is_rejected() {
    let store = Store::in_memory().unwrap();
    assert_eq!(store.add_product(product("X", 1.0, "a", true, 1)), AddOutcome::Added);
    assert_eq!(
        store.add_product(product("X", 2.0, "b", true, 1)),
        AddOutcome::DuplicateCode
    );
    assert_eq!(store.all_products().unwrap().len(), 1);
}

#[test]
fn test_list_default_is_natural_order() {
    let store = seeded();
    let page = store.list_products(&ProductQuery::default()).unwrap();
    assert_eq!(codes(&page.docs), vec!["A", "B", "C", "D"]);
    assert_eq!(page.total_docs, 4);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn test_list_filters_and_sorts() {
    let store = seeded();

    let query = ProductQuery {
        category: Some("food".into()),
        ..Default::default()
    };
    let page = store.list_products(&query).unwrap();
    assert_eq!(codes(&page.docs), vec!["A", "C", "D"]);

    let query = ProductQuery {
        available: Some(true),
        sort_by_price: Some(PriceSort::Asc),
        ..Default::default()
    };
    let page = store.list_products(&query).unwrap();
    assert_eq!(codes(&page.docs), vec!["D", "B", "A"]);

    let query = ProductQuery {
        available: Some(false),
        ..Default::default()
    };
    let page = store.list_products(&query).unwrap();
    assert_eq!(codes(&page.docs), vec!["C"]);
}

#[test]
fn test_list_paginates() {
    let store = seeded();
    let query = ProductQuery {
        page: 2,
        limit: 3,
        sort_by_price: Some(PriceSort::Desc),
        ..Default::default()
    };
    let page = store.list_products(&query).unwrap();
    assert_eq!(codes(&page.docs), vec!["D"]);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_prev_page);
    assert!(!page.has_next_page);

    let beyond = ProductQuery {
        page: 9,
        limit: 3,
        ..Default::default()
    };
    assert!(store.list_products(&beyond).unwrap().docs.is_empty());
}

#[test]
fn test_update_product() {
    let store = seeded();
    let a = store.all_products().unwrap().remove(0);

    let patch = ProductPatch {
        price: Some(99.0),
        ..Default::default()
    };
    let updated = store.update_product(&a.id, patch).unwrap().unwrap();
    assert_eq!(updated.price, 99.0);
    assert_eq!(store.get_product(&a.id).unwrap().unwrap().price, 99.0);

    // Order survives the rewrite
    assert_eq!(store.all_products().unwrap()[0].id, a.id);

    let clash = ProductPatch {
        code: Some("B".into()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_product(&a.id, clash),
        Err(StoreError::DuplicateCode(code)) if code == "B"
    ));

    let missing = store
        .update_product(&DocumentId::generate(), ProductPatch::default())
        .unwrap();
    assert!(missing.is_none());
}

#[test]
fn test_delete_product_pulls_it_from_carts() {
    let store = seeded();
    let products = store.all_products().unwrap();
    let cart = store.create_cart().unwrap();
    store.add_to_cart(&cart.id, &products[0].id, 1).unwrap();
    store.add_to_cart(&cart.id, &products[3].id, 2).unwrap();

    assert!(store.delete_product(&products[0].id).unwrap());
    assert!(!store.delete_product(&products[0].id).unwrap());

    let cart = store.get_cart(&cart.id).unwrap().unwrap();
    assert_eq!(cart.products.len(), 1);
    assert_eq!(cart.products[0].product, products[3].id);
}

// =============================================================================
// Carts
// =============================================================================

#[test]
fn test_cart_operations() {
    let store = seeded();
    let products = store.all_products().unwrap();
    let cart = store.create_cart().unwrap();

    store.add_to_cart(&cart.id, &products[0].id, 1).unwrap();
    let updated = store.add_to_cart(&cart.id, &products[0].id, 2).unwrap();
    assert_eq!(updated.products[0].quantity, 3);

    let updated = store.set_cart_quantity(&cart.id, &products[0].id, 7).unwrap();
    assert_eq!(updated.products[0].quantity, 7);

    assert!(matches!(
        store.set_cart_quantity(&cart.id, &products[1].id, 1),
        Err(StoreError::ProductNotInCart(_))
    ));
    assert!(matches!(
        store.add_to_cart(&cart.id, &DocumentId::generate(), 1),
        Err(StoreError::ProductNotFound(_))
    ));
    assert!(matches!(
        store.add_to_cart(&DocumentId::generate(), &products[0].id, 1),
        Err(StoreError::CartNotFound(_))
    ));

    let updated = store.remove_from_cart(&cart.id, &products[0].id).unwrap();
    assert!(updated.products.is_empty());
}

#[test]
fn test_replace_and_clear_cart() {
    let store = seeded();
    let products = store.all_products().unwrap();
    let cart = store.create_cart().unwrap();

    let lines = vec![
        CartLine {
            product: products[1].id.clone(),
            quantity: 2,
        },
        CartLine {
            product: products[2].id.clone(),
            quantity: 1,
        },
    ];
    let replaced = store.replace_cart_products(&cart.id, lines).unwrap();
    assert_eq!(replaced.products.len(), 2);

    let bad = vec![CartLine {
        product: DocumentId::generate(),
        quantity: 1,
    }];
    assert!(matches!(
        store.replace_cart_products(&cart.id, bad),
        Err(StoreError::ProductNotFound(_))
    ));
    // Failed replace left the cart untouched
    assert_eq!(store.get_cart(&cart.id).unwrap().unwrap().products.len(), 2);

    let cleared = store.clear_cart(&cart.id).unwrap();
    assert!(cleared.products.is_empty());
}

#[test]
fn test_populated_cart() {
    let store = seeded();
    let products = store.all_products().unwrap();
    let cart = store.create_cart().unwrap();
    store.add_to_cart(&cart.id, &products[0].id, 2).unwrap();
    store.add_to_cart(&cart.id, &products[3].id, 1).unwrap();

    let populated = store.get_cart_populated(&cart.id).unwrap().unwrap();
    assert_eq!(populated.products.len(), 2);
    assert_eq!(populated.products[0].product.code, "A");
    assert_eq!(populated.total(), 65.0);

    assert!(store.get_cart_populated(&DocumentId::generate()).unwrap().is_none());
}

#[test]
fn test_purchase_bills_what_is_in_stock() {
    let store = seeded();
    let products = store.all_products().unwrap();
    let cart = store.create_cart().unwrap();
    store.add_to_cart(&cart.id, &products[0].id, 2).unwrap(); // A: stock 5
    store.add_to_cart(&cart.id, &products[1].id, 1).unwrap(); // B: stock 0
    store.add_to_cart(&cart.id, &products[2].id, 1).unwrap(); // C: unavailable

    let report = store.purchase_cart(&cart.id, "ana@example.com").unwrap();
    let ticket = report.ticket.expect("ticket");
    assert_eq!(ticket.amount, 60.0);
    assert_eq!(ticket.purchaser, "ana@example.com");
    assert_eq!(report.unavailable, vec![products[1].id.clone(), products[2].id.clone()]);

    assert_eq!(store.get_product(&products[0].id).unwrap().unwrap().stock, 3);
    let stored: Option<Ticket> =
        document::get(&store.conn.lock(), Collection::Tickets, &ticket.id).unwrap();
    assert_eq!(stored.unwrap().code, ticket.code);

    let cart = store.get_cart(&cart.id).unwrap().unwrap();
    assert_eq!(cart.products.len(), 2);
}

#[test]
fn test_purchase_with_nothing_billable() {
    let store = seeded();
    let products = store.all_products().unwrap();
    let cart = store.create_cart().unwrap();
    store.add_to_cart(&cart.id, &products[1].id, 1).unwrap();

    let report = store.purchase_cart(&cart.id, "ana@example.com").unwrap();
    assert!(report.ticket.is_none());
    assert_eq!(report.unavailable.len(), 1);
}

// =============================================================================
// Users and messages
// =============================================================================

fn draft(email: &str) -> UserDraft {
    UserDraft {
        first_name: "Ana".into(),
        last_name: "Paz".into(),
        email: email.into(),
        age: Some(30),
        password_hash: "hash".into(),
        role: Role::User,
    }
}

#[test]
fn test_user_creation_and_lookup() {
    let store = Store::in_memory().unwrap();
    let user = store.create_user(draft("Ana@Example.com")).unwrap();
    assert_eq!(user.email, "ana@example.com");
    assert!(store.get_cart(&user.cart).unwrap().is_some());

    let found = store.find_user_by_email("ANA@example.com").unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(store.find_user_by_email("bob@example.com").unwrap().is_none());

    assert!(matches!(
        store.create_user(draft("ana@example.com")),
        Err(StoreError::DuplicateEmail(_))
    ));
}

#[test]
fn test_messages_keep_latest() {
    let store = Store::in_memory().unwrap();
    for i in 0..5 {
        store.add_message("ana", &format!("msg {i}")).unwrap();
    }
    let latest = store.list_messages(3).unwrap();
    let bodies: Vec<&str> = latest.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["msg 2", "msg 3", "msg 4"]);
}

#[test]
fn test_on_disk_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite");
    {
        let store = Store::from_path(&path).unwrap();
        store.insert_product(product("P", 1.0, "x", true, 1)).unwrap();
    }
    let store = Store::from_path(&path).unwrap();
    assert_eq!(store.all_products().unwrap().len(), 1);
    assert!(store.ping());
}
