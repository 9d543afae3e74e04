//! In-memory backend used by the controller tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use meme_shop_core::{CategoryId, CountryId, Price, ProductId, StateId};

use crate::api::{
    ApiError, CatalogGateway, Country, OrderGateway, PageInfo, Product, ProductCategory,
    ProductPage, Purchase, PurchaseResponse, ReferenceDataGateway, State, card_months, card_years,
};

/// Records every call and answers from fixed data.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    countries: Vec<Country>,
    states: HashMap<String, Vec<State>>,
    tracking_number: String,
    fail_catalog: bool,
    fail_reference: bool,
    fail_order: bool,
    page_requests: Vec<(CategoryId, u32, u32)>,
    searches: Vec<String>,
    state_requests: Vec<String>,
    month_requests: Vec<u32>,
    year_requests: Vec<i32>,
    orders: Vec<Purchase>,
}

fn failure() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "backend unavailable".to_string(),
    }
}

impl FakeBackend {
    /// A backend with `count` products priced `id` dollars and 99 cents.
    pub fn with_catalog(count: i64) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.products = (1..=count)
                .map(|id| Product {
                    id: ProductId::new(id),
                    sku: Some(format!("MEME-{id:04}")),
                    name: format!("Product {id}"),
                    description: None,
                    unit_price: Price::from_cents(id * 100 + 99),
                    image_url: Some(format!("assets/images/products/{id}.png")),
                    active: true,
                    units_in_stock: Some(100),
                })
                .collect();
            state.countries = vec![canada(), united_states()];
            state.states.insert(
                "CA".to_string(),
                vec![state_of(1, "Alberta"), state_of(2, "British Columbia")],
            );
            state.states.insert(
                "US".to_string(),
                vec![state_of(3, "Alabama"), state_of(4, "Alaska")],
            );
            state.tracking_number = "X123".to_string();
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn fail_catalog(&self, fail: bool) {
        self.lock().fail_catalog = fail;
    }

    pub fn fail_reference(&self, fail: bool) {
        self.lock().fail_reference = fail;
    }

    pub fn fail_order(&self, fail: bool) {
        self.lock().fail_order = fail;
    }

    pub fn set_states(&self, country_code: &str, states: Vec<State>) {
        self.lock().states.insert(country_code.to_string(), states);
    }

    pub fn page_requests(&self) -> Vec<(CategoryId, u32, u32)> {
        self.lock().page_requests.clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.lock().searches.clone()
    }

    pub fn state_requests(&self) -> Vec<String> {
        self.lock().state_requests.clone()
    }

    pub fn month_requests(&self) -> Vec<u32> {
        self.lock().month_requests.clone()
    }

    pub fn year_requests(&self) -> Vec<i32> {
        self.lock().year_requests.clone()
    }

    pub fn orders(&self) -> Vec<Purchase> {
        self.lock().orders.clone()
    }
}

pub fn canada() -> Country {
    Country {
        id: CountryId::new(1),
        code: "CA".to_string(),
        name: "Canada".to_string(),
    }
}

pub fn united_states() -> Country {
    Country {
        id: CountryId::new(2),
        code: "US".to_string(),
        name: "United States".to_string(),
    }
}

pub fn state_of(id: i64, name: &str) -> State {
    State {
        id: StateId::new(id),
        name: name.to_string(),
    }
}

impl CatalogGateway for FakeBackend {
    async fn products_by_category(
        &self,
        category_id: CategoryId,
        page: u32,
        size: u32,
    ) -> Result<ProductPage, ApiError> {
        let mut state = self.lock();
        state.page_requests.push((category_id, page, size));
        if state.fail_catalog {
            return Err(failure());
        }

        let products = state
            .products
            .chunks(size.max(1) as usize)
            .nth(page as usize)
            .map(<[Product]>::to_vec)
            .unwrap_or_default();
        let total = state.products.len() as u64;

        Ok(ProductPage {
            products,
            page: PageInfo {
                size,
                total_elements: total,
                total_pages: u32::try_from(total.div_ceil(u64::from(size.max(1)))).unwrap_or(0),
                number: page,
            },
        })
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        let mut state = self.lock();
        state.searches.push(keyword.to_string());
        if state.fail_catalog {
            return Err(failure());
        }

        Ok(state
            .products
            .iter()
            .filter(|p| p.name.contains(keyword))
            .cloned()
            .collect())
    }

    async fn categories(&self) -> Result<Vec<ProductCategory>, ApiError> {
        Ok(vec![ProductCategory {
            id: CategoryId::new(1),
            category_name: "Meme".to_string(),
        }])
    }

    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.lock()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("products/{id}")))
    }
}

impl ReferenceDataGateway for FakeBackend {
    async fn countries(&self) -> Result<Vec<Country>, ApiError> {
        let state = self.lock();
        if state.fail_reference {
            return Err(failure());
        }
        Ok(state.countries.clone())
    }

    async fn states(&self, country_code: &str) -> Result<Vec<State>, ApiError> {
        let mut state = self.lock();
        state.state_requests.push(country_code.to_string());
        if state.fail_reference {
            return Err(failure());
        }
        Ok(state.states.get(country_code).cloned().unwrap_or_default())
    }

    async fn credit_card_months(&self, start_month: u32) -> Result<Vec<u32>, ApiError> {
        let mut state = self.lock();
        state.month_requests.push(start_month);
        if state.fail_reference {
            return Err(failure());
        }
        Ok(card_months(start_month))
    }

    async fn credit_card_years(&self, start_year: i32) -> Result<Vec<i32>, ApiError> {
        let mut state = self.lock();
        state.year_requests.push(start_year);
        if state.fail_reference {
            return Err(failure());
        }
        Ok(card_years(start_year))
    }
}

impl OrderGateway for FakeBackend {
    async fn place_order(&self, purchase: &Purchase) -> Result<PurchaseResponse, ApiError> {
        let mut state = self.lock();
        state.orders.push(purchase.clone());
        if state.fail_order {
            return Err(failure());
        }
        Ok(PurchaseResponse {
            order_tracking_number: state.tracking_number.clone(),
        })
    }
}
