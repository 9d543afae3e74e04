//! Integration tests for Meme Shop.
//!
//! The tests drive the real [`ApiClient`] over HTTP against
//! [`MockBackend`], an in-process `axum` server that speaks the same
//! HAL/REST dialect as the catalog and order API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p meme-shop-integration-tests
//! ```
//!
//! # Mock catalog
//!
//! - Products 1..=20; odd IDs are named `Doge {id}`, even IDs `Cat {id}`
//! - Products 1..=12 belong to category 1 (Meme), the rest to category 2
//! - Product `id` costs `id + 0.50`
//! - Countries `CA` (3 states), `US` (2 states) and `AQ` (none)

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use meme_shop_storefront::ApiClient;
use meme_shop_storefront::api::ApiError;
use meme_shop_storefront::config::ApiConfig;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Number of products in the mock catalog.
pub const PRODUCT_COUNT: i32 = 20;

/// Products in category 1.
pub const MEME_PRODUCT_COUNT: i32 = 12;

/// Tracking number returned for accepted orders.
pub const TRACKING_NUMBER: &str = "MOCK-20261017-0001";

type Shared = Arc<Mutex<MockState>>;

#[derive(Default)]
struct MockState {
    fail_orders: bool,
    category_requests: Vec<(i32, u32, u32)>,
    searches: Vec<String>,
    orders: Vec<Value>,
}

/// An in-process storefront API. The server stops when this is dropped.
pub struct MockBackend {
    base_url: Url,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Shared::default();

        let api = Router::new()
            .route(
                "/products/search/findByCategoryId",
                get(products_by_category),
            )
            .route(
                "/products/search/findByNameContaining",
                get(products_by_name),
            )
            .route("/products/{id}", get(product))
            .route("/product-category", get(categories))
            .route("/countries", get(countries))
            .route("/states/search/findByCountryCode", get(states))
            .route("/checkout/purchase", post(purchase))
            .with_state(Arc::clone(&state));
        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url =
            Url::parse(&format!("http://{addr}/api/")).map_err(std::io::Error::other)?;

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            state,
            server,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A real API client pointed at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&ApiConfig::new(self.base_url.clone()))
    }

    /// Make the order endpoint answer 500.
    pub fn fail_orders(&self, fail: bool) {
        lock(&self.state).fail_orders = fail;
    }

    /// `(category id, page, size)` of every category listing request.
    #[must_use]
    pub fn category_requests(&self) -> Vec<(i32, u32, u32)> {
        lock(&self.state).category_requests.clone()
    }

    /// Keywords of every search request.
    #[must_use]
    pub fn searches(&self) -> Vec<String> {
        lock(&self.state).searches.clone()
    }

    /// Raw JSON bodies of every order posted, accepted or not.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state).orders.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn product_json(id: i32) -> Value {
    let kind = if id % 2 == 0 { "Cat" } else { "Doge" };
    json!({
        "id": id,
        "sku": format!("MEME-{id:04}"),
        "name": format!("{kind} {id}"),
        "description": format!("A fine {kind} meme"),
        "unitPrice": f64::from(id) + 0.5,
        "imageUrl": format!("assets/images/products/{id}.png"),
        "active": true,
        "unitsInStock": 100,
    })
}

const fn category_of(id: i32) -> i32 {
    if id <= MEME_PRODUCT_COUNT { 1 } else { 2 }
}

fn query_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    key: &str,
) -> Result<T, StatusCode> {
    params
        .get(key)
        .and_then(|value| value.parse().ok())
        .ok_or(StatusCode::BAD_REQUEST)
}

async fn products_by_category(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let category: i32 = query_param(&params, "id")?;
    let page: u32 = query_param(&params, "page")?;
    let size: u32 = query_param(&params, "size")?;
    if size == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    lock(&state).category_requests.push((category, page, size));

    let ids: Vec<i32> = (1..=PRODUCT_COUNT)
        .filter(|id| category_of(*id) == category)
        .collect();
    let products: Vec<Value> = ids
        .chunks(size as usize)
        .nth(page as usize)
        .unwrap_or_default()
        .iter()
        .map(|id| product_json(*id))
        .collect();
    let total = ids.len();

    Ok(Json(json!({
        "_embedded": { "products": products },
        "page": {
            "size": size,
            "totalElements": total,
            "totalPages": total.div_ceil(size as usize),
            "number": page,
        },
    })))
}

async fn products_by_name(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let name: String = query_param(&params, "name")?;
    let products: Vec<Value> = (1..=PRODUCT_COUNT)
        .map(product_json)
        .filter(|p| p["name"].as_str().is_some_and(|n| n.contains(&name)))
        .collect();
    lock(&state).searches.push(name);

    Ok(Json(json!({ "_embedded": { "products": products } })))
}

async fn product(Path(id): Path<i32>) -> Result<Json<Value>, StatusCode> {
    if (1..=PRODUCT_COUNT).contains(&id) {
        Ok(Json(product_json(id)))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn categories() -> Json<Value> {
    Json(json!({
        "_embedded": {
            "productCategory": [
                { "id": 1, "categoryName": "Meme" },
                { "id": 2, "categoryName": "Cats" },
            ],
        },
    }))
}

async fn countries() -> Json<Value> {
    Json(json!({
        "_embedded": {
            "countries": [
                { "id": 1, "code": "CA", "name": "Canada" },
                { "id": 2, "code": "US", "name": "United States" },
                { "id": 3, "code": "AQ", "name": "Antarctica" },
            ],
        },
    }))
}

async fn states(Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, StatusCode> {
    let code: String = query_param(&params, "code")?;
    let states = match code.as_str() {
        "CA" => json!([
            { "id": 1, "name": "Alberta" },
            { "id": 2, "name": "British Columbia" },
            { "id": 3, "name": "Ontario" },
        ]),
        "US" => json!([
            { "id": 4, "name": "Alabama" },
            { "id": 5, "name": "Alaska" },
        ]),
        _ => json!([]),
    };

    Ok(Json(json!({ "_embedded": { "states": states } })))
}

async fn purchase(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut state = lock(&state);
    state.orders.push(body);
    if state.fail_orders {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "order service unavailable".to_string(),
        ));
    }

    Ok(Json(json!({ "orderTrackingNumber": TRACKING_NUMBER })))
}
