//! Product listing controller.
//!
//! Drives paginated category listings and keyword search from navigation
//! parameters. The controller is meant to be kept alive while the shopper
//! moves between listing routes, so pagination survives revisits to the
//! same category and resets when the category changes.

use meme_shop_core::CategoryId;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, CatalogGateway, Product, ProductPage};
use crate::cart::{Cart, CartItem};
use crate::config::DEFAULT_PAGE_SIZE;

/// Category shown when the route names none.
pub const DEFAULT_CATEGORY_ID: CategoryId = CategoryId::new(1);

/// Display name of [`DEFAULT_CATEGORY_ID`].
pub const DEFAULT_CATEGORY_NAME: &str = "Meme";

/// Navigation parameters consumed by the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    /// Category ID, as it appears in the route.
    pub id: Option<String>,
    /// Category display name.
    pub name: Option<String>,
    /// Search keyword; its presence selects search mode.
    pub keyword: Option<String>,
}

impl RouteParams {
    /// The plain product listing route (default category).
    #[must_use]
    pub fn products() -> Self {
        Self::default()
    }

    /// A category route.
    #[must_use]
    pub fn category(id: impl ToString, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.into()),
            keyword: None,
        }
    }

    /// A search route.
    #[must_use]
    pub fn search(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }
}

/// What the listing currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    List {
        category_id: CategoryId,
        category_name: String,
    },
    Search {
        keyword: String,
    },
}

/// The part of the controller a failed fetch rolls back.
struct ViewState {
    route: RouteParams,
    mode: ListingMode,
    page_number: u32,
    page_size: u32,
    previous_category_id: CategoryId,
}

/// Paginated, searchable product listing.
pub struct ProductListController<G> {
    gateway: G,
    cart: Cart,
    route: RouteParams,
    mode: ListingMode,
    products: Vec<Product>,
    /// 1-based.
    page_number: u32,
    page_size: u32,
    total_elements: u64,
    previous_category_id: CategoryId,
}

impl<G: CatalogGateway> ProductListController<G> {
    /// Create a controller showing nothing yet; call
    /// [`on_route_change`](Self::on_route_change) to load products.
    #[must_use]
    pub fn new(gateway: G, cart: Cart) -> Self {
        Self {
            gateway,
            cart,
            route: RouteParams::products(),
            mode: ListingMode::List {
                category_id: DEFAULT_CATEGORY_ID,
                category_name: DEFAULT_CATEGORY_NAME.to_string(),
            },
            products: Vec::new(),
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_elements: 0,
            previous_category_id: DEFAULT_CATEGORY_ID,
        }
    }

    /// Use a page size other than the default.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// React to a navigation change.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails; the product list,
    /// mode and pagination are then left as they were.
    pub async fn on_route_change(&mut self, route: RouteParams) -> Result<(), ApiError> {
        let saved = self.view_state();
        self.route = route;
        self.reload(saved).await
    }

    /// Change the page size and go back to the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    pub async fn update_page_size(&mut self, page_size: u32) -> Result<(), ApiError> {
        let saved = self.view_state();
        self.page_size = page_size.max(1);
        self.page_number = 1;
        self.reload(saved).await
    }

    /// Jump to a 1-based page of the current category.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    pub async fn go_to_page(&mut self, page_number: u32) -> Result<(), ApiError> {
        let saved = self.view_state();
        self.page_number = page_number.max(1);
        self.reload(saved).await
    }

    /// Add one unit of `product` to the cart.
    pub fn add_to_cart(&self, product: &Product) {
        info!(product = %product.name, unit_price = %product.unit_price, "Adding to cart");
        self.cart.add_to_cart(CartItem::from(product));
    }

    fn view_state(&self) -> ViewState {
        ViewState {
            route: self.route.clone(),
            mode: self.mode.clone(),
            page_number: self.page_number,
            page_size: self.page_size,
            previous_category_id: self.previous_category_id,
        }
    }

    async fn reload(&mut self, saved: ViewState) -> Result<(), ApiError> {
        let result = self.list_products().await;
        if let Err(e) = &result {
            warn!(error = %e, "Product listing failed; keeping previous results");
            self.route = saved.route;
            self.mode = saved.mode;
            self.page_number = saved.page_number;
            self.page_size = saved.page_size;
            self.previous_category_id = saved.previous_category_id;
        }
        result
    }

    async fn list_products(&mut self) -> Result<(), ApiError> {
        match self.route.keyword.clone() {
            Some(keyword) => self.handle_search_products(keyword).await,
            None => self.handle_list_products().await,
        }
    }

    #[instrument(skip(self))]
    async fn handle_search_products(&mut self, keyword: String) -> Result<(), ApiError> {
        self.mode = ListingMode::Search {
            keyword: keyword.clone(),
        };

        self.products = self.gateway.search_products(&keyword).await?;
        Ok(())
    }

    async fn handle_list_products(&mut self) -> Result<(), ApiError> {
        let (category_id, category_name) = self.route_category();

        // A different category starts over at page 1; the same one keeps its page.
        if self.previous_category_id != category_id {
            self.page_number = 1;
        }
        self.previous_category_id = category_id;

        info!(
            category_id = %category_id,
            page_number = self.page_number,
            "Listing products"
        );

        self.mode = ListingMode::List {
            category_id,
            category_name,
        };

        let page = self
            .gateway
            .products_by_category(
                category_id,
                self.page_number.saturating_sub(1),
                self.page_size,
            )
            .await?;
        self.process_result(page);
        Ok(())
    }

    fn route_category(&self) -> (CategoryId, String) {
        let Some(raw_id) = self.route.id.as_deref() else {
            return (DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME.to_string());
        };

        match raw_id.parse::<CategoryId>() {
            Ok(id) => (id, self.route.name.clone().unwrap_or_default()),
            Err(e) => {
                warn!(id = raw_id, error = %e, "Ignoring unparsable category id");
                (DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME.to_string())
            }
        }
    }

    fn process_result(&mut self, page: ProductPage) {
        self.products = page.products;
        self.page_number = page.page.number + 1;
        self.page_size = page.page.size;
        self.total_elements = page.page.total_elements;
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn mode(&self) -> &ListingMode {
        &self.mode
    }

    #[must_use]
    pub const fn is_search_mode(&self) -> bool {
        matches!(self.mode, ListingMode::Search { .. })
    }

    /// Current page, 1-based.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn total_elements(&self) -> u64 {
        self.total_elements
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }
}
