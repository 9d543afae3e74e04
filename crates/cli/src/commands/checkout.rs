//! Scripted checkout.
//!
//! Reads an order file, fills a cart and the checkout form through the
//! storefront controllers, and submits the order.
//!
//! # Order file
//!
//! ```yaml
//! items:
//!   - product_id: 1
//!     quantity: 2
//! customer:
//!   first_name: Ada
//!   last_name: Lovelace
//!   email: ada@example.com
//! billing_address:
//!   street: 1 Main St
//!   city: Calgary
//!   country: CA          # code or name
//!   state: Alberta       # optional, defaults to the country's first state
//!   zip_code: T2P 1J9
//! credit_card:
//!   card_type: Visa
//!   name_on_card: Ada Lovelace
//!   card_number: "4111111111111111"
//!   security_code: "123"
//!   expiration_month: 11
//!   expiration_year: 2027
//! ```

use std::path::Path;

use meme_shop_core::ProductId;
use meme_shop_storefront::api::{ApiError, CatalogGateway};
use meme_shop_storefront::checkout::{AddressSection, SubmitOutcome};
use meme_shop_storefront::listing::ProductListController;
use meme_shop_storefront::{ApiClient, Cart, CheckoutController, StorefrontError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors from the checkout command.
#[derive(Debug, Error)]
pub enum CheckoutCommandError {
    /// The order file could not be read.
    #[error("Failed to read order file: {0}")]
    Io(#[from] std::io::Error),

    /// The order file is not valid YAML for an order.
    #[error("Invalid order file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The order file has no items.
    #[error("Order has no items")]
    EmptyOrder,

    /// No country matches the order file.
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// The country has no state with this name.
    #[error("Unknown state {state} for {country}")]
    UnknownState { country: String, state: String },

    /// The storefront rejected the form.
    #[error("Checkout form has {0} invalid fields")]
    Rejected(usize),

    /// Storefront operation failed.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),
}

impl From<ApiError> for CheckoutCommandError {
    fn from(error: ApiError) -> Self {
        Self::Storefront(error.into())
    }
}

#[derive(Debug, Deserialize)]
struct OrderFile {
    items: Vec<OrderFileItem>,
    customer: CustomerFields,
    billing_address: AddressFields,
    credit_card: CardFields,
}

#[derive(Debug, Deserialize)]
struct OrderFileItem {
    product_id: i64,
    #[serde(default = "one")]
    quantity: u32,
}

const fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct CustomerFields {
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct AddressFields {
    street: String,
    city: String,
    country: String,
    state: Option<String>,
    zip_code: String,
}

#[derive(Debug, Deserialize)]
struct CardFields {
    card_type: String,
    name_on_card: String,
    card_number: String,
    security_code: String,
    expiration_month: Option<u32>,
    expiration_year: Option<i32>,
}

/// Run a scripted checkout from `path`.
///
/// # Errors
///
/// Returns an error if the file is unreadable, references unknown products,
/// countries or states, the form is rejected, or an API call fails.
pub async fn run(client: ApiClient, path: &Path) -> Result<(), CheckoutCommandError> {
    let content = tokio::fs::read_to_string(path).await?;
    let order: OrderFile = serde_yaml::from_str(&content)?;
    if order.items.is_empty() {
        return Err(CheckoutCommandError::EmptyOrder);
    }

    info!(path = %path.display(), items = order.items.len(), "Loaded order file");

    let cart = Cart::new();
    let listing = ProductListController::new(client.clone(), cart.clone());
    for item in &order.items {
        let product = client.product(ProductId::new(item.product_id)).await?;
        for _ in 0..item.quantity {
            listing.add_to_cart(&product);
        }
    }

    let mut checkout = CheckoutController::new(client, cart);
    checkout.initialize().await;

    let totals = checkout.totals();
    info!(
        total_quantity = totals.total_quantity,
        total_price = %totals.total_price,
        "Cart filled"
    );

    fill_address(&mut checkout, &order.billing_address).await?;

    let form = checkout.form_mut();
    form.customer.first_name = order.customer.first_name;
    form.customer.last_name = order.customer.last_name;
    form.customer.email = order.customer.email;
    form.credit_card.card_type = order.credit_card.card_type;
    form.credit_card.name_on_card = order.credit_card.name_on_card;
    form.credit_card.card_number = order.credit_card.card_number;
    form.credit_card.security_code = order.credit_card.security_code;

    if let Some(year) = order.credit_card.expiration_year {
        checkout.select_expiration_year(year).await;
    }
    if let Some(month) = order.credit_card.expiration_month {
        if !checkout.credit_card_months().contains(&month) {
            warn!(month, "Expiration month is not selectable for this year");
        }
        checkout.form_mut().credit_card.expiration_month = Some(month);
    }

    match checkout.submit().await.map_err(StorefrontError::from)? {
        SubmitOutcome::Rejected(report) => {
            for line in report.to_string().lines() {
                error!("{line}");
            }
            Err(CheckoutCommandError::Rejected(report.invalid_fields().count()))
        }
        SubmitOutcome::Completed(confirmation) => {
            if confirmation.is_fallback() {
                warn!("The order service did not confirm this order");
            }
            info!("{}", confirmation.message());
            Ok(())
        }
    }
}

async fn fill_address(
    checkout: &mut CheckoutController<ApiClient>,
    fields: &AddressFields,
) -> Result<(), CheckoutCommandError> {
    let country = checkout
        .countries()
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(&fields.country) || c.name == fields.country)
        .cloned()
        .ok_or_else(|| CheckoutCommandError::UnknownCountry(fields.country.clone()))?;

    let country_name = country.name.clone();
    checkout
        .select_country(AddressSection::Billing, country)
        .await
        .map_err(StorefrontError::from)?;

    if let Some(state_name) = &fields.state {
        let state = checkout
            .states(AddressSection::Billing)
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(state_name))
            .cloned()
            .ok_or_else(|| CheckoutCommandError::UnknownState {
                country: country_name,
                state: state_name.clone(),
            })?;
        checkout.form_mut().billing_address.state = Some(state);
    }

    let address = &mut checkout.form_mut().billing_address;
    address.street.clone_from(&fields.street);
    address.city.clone_from(&fields.city);
    address.zip_code.clone_from(&fields.zip_code);

    Ok(())
}
