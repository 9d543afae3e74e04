//! Reference data commands.

use chrono::{Datelike, Local};
use meme_shop_storefront::api::{ApiError, ReferenceDataGateway};
use meme_shop_storefront::{ApiClient, Cart, CheckoutController};
use tracing::info;

/// List countries.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn countries(client: &ApiClient) -> Result<(), ApiError> {
    for country in client.countries().await? {
        info!(id = %country.id, code = %country.code, "{}", country.name);
    }
    Ok(())
}

/// List the states of the country with `code`.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn states(client: &ApiClient, code: &str) -> Result<(), ApiError> {
    let states = client.states(code).await?;
    if states.is_empty() {
        info!(country = code, "No states");
    }
    for state in states {
        info!(id = %state.id, "{}", state.name);
    }
    Ok(())
}

/// Selectable expiration months for `year` (the current year by default).
pub async fn card_months(client: ApiClient, year: Option<i32>) {
    let year = year.unwrap_or_else(|| Local::now().year());

    let mut checkout = CheckoutController::new(client, Cart::new());
    checkout.select_expiration_year(year).await;

    info!(year, months = ?checkout.credit_card_months(), "Expiration months");
}

/// Selectable expiration years, starting this year.
///
/// # Errors
///
/// Returns an error if the years cannot be computed.
pub async fn card_years(client: &ApiClient) -> Result<(), ApiError> {
    let years = client.credit_card_years(Local::now().year()).await?;
    info!(years = ?years, "Expiration years");
    Ok(())
}
