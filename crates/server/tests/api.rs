//! End-to-end tests against a live server on an ephemeral port.

use std::sync::Arc;

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use server::{ServerState, StateConfig, create_app};
use storage::Store;

struct TestServer {
    base: String,
    state: ServerState,
    client: Client,
}

impl TestServer {
    async fn start() -> Self {
        let store = Arc::new(Store::in_memory().unwrap());
        let config = StateConfig {
            session_secret: "integration-secret".into(),
            admin_email: Some("admin@shop.com".into()),
            ..Default::default()
        };
        let state = ServerState::new(store, config);
        let app = create_app(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            state,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::DELETE, path, None).await
    }

    /// Add one product and return its id.
    async fn seed(&self, code: &str, price: f64, stock: u32) -> String {
        let (status, _) = self.post("/api/products", product(code, price, stock)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, list) = self.get("/api/products?limit=100").await;
        list["payload"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["code"] == code)
            .map(|p| p["_id"].as_str().unwrap().to_string())
            .unwrap()
    }
}

fn product(code: &str, price: f64, stock: u32) -> Value {
    json!({
        "title": format!("Product {code}"),
        "description": "integration test product",
        "code": code,
        "price": price,
        "stock": stock,
        "category": "tools",
    })
}

const MISSING_ID: &str = "0123456789abcdef01234567";

// =============================================================================
// Basics
// =============================================================================

#[tokio::test]
async fn test_health_and_fallback() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = server.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let (status, body) = server.get("/no/such/page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Page not found" }));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_add_products() {
    let server = TestServer::start().await;

    let (status, body) = server.post("/api/products", product("A1", 10.0, 5)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["messages"], json!(["Product added successfully."]));

    let batch = json!([product("A1", 1.0, 1), product("B1", 2.0, 2)]);
    let (status, body) = server.post("/api/products", batch).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["messages"],
        json!([
            "Product with that code already exist. Not added",
            "Product added successfully."
        ])
    );

    let (status, _) = server.post("/api/products", product("B1", 2.0, 2)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let invalid = json!([product("C1", 1.0, 1), { "title": "no code" }]);
    let (status, body) = server.post("/api/products", invalid).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // The invalid batch wrote nothing
    let (_, list) = server.get("/api/products").await;
    assert_eq!(list["payload"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_envelope_and_query_errors() {
    let server = TestServer::start().await;
    for (i, price) in [5.0, 1.0, 3.0].into_iter().enumerate() {
        server.seed(&format!("P{i}"), price, 1).await;
    }

    let (status, body) = server.get("/api/products?limit=2&sortByPrice=asc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["hasNextPage"], true);
    assert_eq!(body["payload"][0]["price"], 1.0);
    let next = body["nextLink"].as_str().unwrap();
    assert!(next.starts_with("/api/products?page=2"));
    assert!(next.contains("sortByPrice=asc"));

    let (status, body) = server.get("/api/products?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "INVALID_QUERY");

    let (status, _) = server.get("/api/products?sortByPrice=sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_update_delete_product() {
    let server = TestServer::start().await;
    let id = server.seed("U1", 4.0, 2).await;

    let (status, body) = server.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "U1");

    let (status, body) = server.get("/api/products/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "INVALID_PRODUCT_ID");
    assert_eq!(body["code"], 400);

    let (status, body) = server.get(&format!("/api/products/{MISSING_ID}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["name"], "PRODUCT_NOT_FOUND");

    let (status, body) = server.put(&format!("/api/products/{id}"), json!({ "price": 9.5 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["product"]["price"], 9.5);

    let (status, body) = server.put(&format!("/api/products/{id}"), json!({ "_id": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid product data"));

    server.seed("U2", 1.0, 1).await;
    for taken in ["U2", " U2 "] {
        let (status, body) = server.put(&format!("/api/products/{id}"), json!({ "code": taken })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{taken:?}");
        assert_eq!(body["status"], 400);
        assert!(body["message"].as_str().unwrap().contains("U2"));
        assert!(body.get("name").is_none());
    }

    let (status, body) = server
        .put(&format!("/api/products/{MISSING_ID}"), json!({ "price": 1.0 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);

    let (status, body) = server.delete(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product removed correctly");

    let (status, _) = server.delete(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_are_broadcast_in_order() {
    let server = TestServer::start().await;
    let mut rx = server.state.broadcaster.subscribe();

    let id = server.seed("W1", 1.0, 1).await;
    server.put(&format!("/api/products/{id}"), json!({ "stock": 7 })).await;
    server.delete(&format!("/api/products/{id}")).await;

    let added = rx.recv().await.unwrap();
    let updated = rx.recv().await.unwrap();
    let removed = rx.recv().await.unwrap();

    assert_eq!(added.event, "productos");
    assert!(added.seq < updated.seq && updated.seq < removed.seq);
    assert_eq!(added.payload.len(), 1);
    assert_eq!(updated.payload[0].stock, 7);
    assert!(removed.payload.is_empty());
}

// =============================================================================
// Carts
// =============================================================================

#[tokio::test]
async fn test_cart_lifecycle() {
    let server = TestServer::start().await;
    let a = server.seed("CA", 2.0, 10).await;
    let b = server.seed("CB", 3.0, 10).await;

    let (status, cart) = server.post("/api/carts", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    let cid = cart["_id"].as_str().unwrap().to_string();

    let (status, body) = server.send(reqwest::Method::POST, &format!("/api/carts/{cid}/product/{a}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"][0]["quantity"], 1);

    let (_, body) = server
        .post(&format!("/api/carts/{cid}/product/{a}"), json!({ "quantity": 2 }))
        .await;
    assert_eq!(body["products"][0]["quantity"], 3);
    assert_eq!(body["products"][0]["product"]["code"], "CA");

    let (status, body) = server
        .put(&format!("/api/carts/{cid}/products/{a}"), json!({ "quantity": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "INVALID_QUANTITY");

    let (status, body) = server
        .put(&format!("/api/carts/{cid}/products/{b}"), json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["name"], "PRODUCT_NOT_IN_CART");

    let lines = json!([{ "product": a, "quantity": 1 }, { "product": b, "quantity": 4 }]);
    let (status, body) = server.put(&format!("/api/carts/{cid}"), lines).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);

    let (status, body) = server.delete(&format!("/api/carts/{cid}/products/{a}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let (status, body) = server.delete(&format!("/api/carts/{cid}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["products"].as_array().unwrap().is_empty());

    let (status, body) = server.get("/api/carts/bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "INVALID_CART_ID");

    let (status, body) = server.get(&format!("/api/carts/{MISSING_ID}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["name"], "CART_NOT_FOUND");
}

// =============================================================================
// Sessions and checkout
// =============================================================================

async fn register(server: &TestServer, email: &str) -> (StatusCode, Value) {
    server
        .post(
            "/api/sessions/register",
            json!({
                "first_name": "Ana",
                "last_name": "Paz",
                "email": email,
                "age": 31,
                "password": "secret-pass",
            }),
        )
        .await
}

/// Log in and return the `name=value` cookie pair.
async fn login(server: &TestServer, email: &str, password: &str) -> Option<String> {
    let resp = server
        .client
        .post(server.url("/api/sessions/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    if resp.status() != StatusCode::OK {
        return None;
    }
    let cookie = resp.headers().get(SET_COOKIE)?.to_str().ok()?;
    cookie.split(';').next().map(str::to_string)
}

#[tokio::test]
async fn test_sessions_and_purchase() {
    let server = TestServer::start().await;
    let pid = server.seed("S1", 5.0, 2).await;

    let (status, body) = register(&server, "ana@example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"]["role"], "user");
    assert!(body["payload"].get("password_hash").is_none());
    let cart = body["payload"]["cart"].as_str().unwrap().to_string();

    let (status, body) = register(&server, "ANA@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["name"], "USER_ALREADY_EXISTS");

    assert!(login(&server, "ana@example.com", "wrong-pass").await.is_none());
    let cookie = login(&server, "ana@example.com", "secret-pass").await.unwrap();
    assert!(cookie.starts_with("sessionToken="));

    let resp = server
        .client
        .get(server.url("/api/sessions/current"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["payload"]["email"], "ana@example.com");

    let (status, _) = server.get("/api/sessions/current").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Three requested, two in stock: nothing billable leaves the line in place
    server
        .post(&format!("/api/carts/{cart}/product/{pid}"), json!({ "quantity": 3 }))
        .await;

    let (status, _) = server
        .send(reqwest::Method::POST, &format!("/api/carts/{cart}/purchase"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let purchase = |cid: String| {
        let client = server.client.clone();
        let url = server.url(&format!("/api/carts/{cid}/purchase"));
        let cookie = cookie.clone();
        async move { client.post(url).header(COOKIE, cookie).send().await.unwrap() }
    };

    let resp = purchase(cart.clone()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let report: Value = resp.json().await.unwrap();
    assert!(report["ticket"].is_null());
    assert_eq!(report["unavailable"], json!([pid]));

    server
        .put(&format!("/api/carts/{cart}/products/{pid}"), json!({ "quantity": 2 }))
        .await;
    let report: Value = purchase(cart.clone()).await.json().await.unwrap();
    assert_eq!(report["ticket"]["amount"], 10.0);
    assert_eq!(report["ticket"]["purchaser"], "ana@example.com");

    let (_, product) = server.get(&format!("/api/products/{pid}")).await;
    assert_eq!(product["stock"], 0);

    let (_, other) = server.post("/api/carts", json!({})).await;
    let resp = purchase(other["_id"].as_str().unwrap().to_string()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = server
        .client
        .post(server.url("/api/sessions/logout"))
        .send()
        .await
        .unwrap();
    let cleared = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_admin_email_gets_admin_role() {
    let server = TestServer::start().await;
    let (status, body) = register(&server, "Admin@Shop.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payload"]["role"], "admin");
}

// =============================================================================
// Views and utilities
// =============================================================================

#[tokio::test]
async fn test_views_render() {
    let server = TestServer::start().await;
    server.seed("V1", 12.0, 3).await;

    for path in ["/", "/products?limit=5", "/realtimeproducts", "/chat"] {
        let resp = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let html = resp.text().await.unwrap();
        assert!(html.contains("<html"), "{path}");
    }

    let html = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Product V1"));

    let (status, _) = server.get("/products?page=zero").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, cart) = server.post("/api/carts", json!({})).await;
    let cid = cart["_id"].as_str().unwrap();
    let resp = server.client.get(server.url(&format!("/carts/{cid}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_mocks_and_logger() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/mockingproducts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 100);

    // Mocks are not persisted
    let (_, list) = server.get("/api/products").await;
    assert!(list["payload"].as_array().unwrap().is_empty());

    let (status, body) = server.get("/loggertest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["levels"].as_array().unwrap().len(), 5);
}
