//! Catalog browsing commands.

use meme_shop_core::ProductId;
use meme_shop_storefront::api::{ApiError, CatalogGateway, Product};
use meme_shop_storefront::listing::{ListingMode, ProductListController, RouteParams};
use meme_shop_storefront::{ApiClient, Cart};
use tracing::info;

fn log_product(product: &Product) {
    info!(
        id = %product.id,
        sku = product.sku.as_deref().unwrap_or("-"),
        price = %product.unit_price,
        "{}",
        product.name
    );
}

/// List one page of a category.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
pub async fn products(
    client: ApiClient,
    category: Option<String>,
    name: Option<String>,
    page: u32,
    page_size: u32,
) -> Result<(), ApiError> {
    let mut listing = ProductListController::new(client, Cart::new()).with_page_size(page_size);

    let route = RouteParams {
        id: category,
        name,
        keyword: None,
    };
    listing.on_route_change(route).await?;
    if page > 1 {
        listing.go_to_page(page).await?;
    }

    if let ListingMode::List { category_name, .. } = listing.mode() {
        info!("Category: {category_name}");
    }
    for product in listing.products() {
        log_product(product);
    }
    info!(
        page = listing.page_number(),
        page_size = listing.page_size(),
        total = listing.total_elements(),
        "Page {} of {}",
        listing.page_number(),
        listing.total_elements().div_ceil(u64::from(listing.page_size().max(1)))
    );

    Ok(())
}

/// Search products whose name contains `keyword`.
///
/// # Errors
///
/// Returns an error if the search request fails.
pub async fn search(client: ApiClient, keyword: String) -> Result<(), ApiError> {
    let mut listing = ProductListController::new(client, Cart::new());
    listing.on_route_change(RouteParams::search(keyword)).await?;

    for product in listing.products() {
        log_product(product);
    }
    info!(count = listing.products().len(), "Search complete");

    Ok(())
}

/// List product categories.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn categories(client: &ApiClient) -> Result<(), ApiError> {
    for category in client.categories().await? {
        info!(id = %category.id, "{}", category.category_name);
    }
    Ok(())
}

/// Show a single product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
pub async fn product(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    let product = client.product(ProductId::new(id)).await?;

    log_product(&product);
    if let Some(description) = &product.description {
        info!("{description}");
    }
    if let Some(stock) = product.units_in_stock {
        info!(units_in_stock = stock, active = product.active, "Stock");
    }

    Ok(())
}
