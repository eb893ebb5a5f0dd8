//! Mock products: `GET /mockingproducts`
//!
//! Returns a batch of generated products for front-end work. Nothing is
//! written to the store and nothing is broadcast.

use axum::Json;
use rand::Rng;
use rand::seq::IndexedRandom;
use types::{DocumentId, Product};

/// Products per response.
pub const MOCK_COUNT: usize = 100;

const ADJECTIVES: &[&str] = &[
    "Rustic", "Sleek", "Ergonomic", "Handmade", "Compact", "Vintage", "Refined", "Sturdy",
];
const NOUNS: &[&str] = &[
    "Chair", "Lamp", "Backpack", "Keyboard", "Mug", "Jacket", "Watch", "Notebook",
];
const CATEGORIES: &[&str] = &["home", "office", "outdoor", "clothing", "electronics"];

/// Generate one product with random but well-formed fields.
pub fn mock_product<R: Rng + ?Sized>(rng: &mut R, index: usize) -> Product {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Plain");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Item");
    let category = CATEGORIES.choose(rng).copied().unwrap_or("misc");
    let cents: u32 = rng.random_range(100..=50_000);
    let id = DocumentId::generate();

    Product {
        title: format!("{adjective} {noun}"),
        description: format!("A {} {} for everyday use", adjective.to_lowercase(), noun.to_lowercase()),
        code: format!("MOCK-{index:03}-{}", &id.as_str()[..6]),
        price: f64::from(cents) / 100.0,
        status: rng.random_bool(0.9),
        stock: rng.random_range(0..=200),
        category: category.to_string(),
        thumbnails: vec![format!("/img/mock/{}.png", noun.to_lowercase())],
        id,
    }
}

pub fn mock_products(count: usize) -> Vec<Product> {
    let mut rng = rand::rng();
    (0..count).map(|i| mock_product(&mut rng, i)).collect()
}

pub async fn mocking_products() -> Json<Vec<Product>> {
    Json(mock_products(MOCK_COUNT))
}
