//! Checkout form controller.
//!
//! [`CheckoutController`] owns one checkout session: the form values, which
//! fields the shopper has touched, the reference lists that populate the
//! form's choices, and a live view of the cart totals. Submitting turns the
//! form and cart into a [`Purchase`](crate::api::Purchase) and hands it to
//! the order gateway.

pub mod form;
pub mod purchase;
pub mod validation;

use std::collections::BTreeSet;

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, Country, OrderGateway, ReferenceDataGateway, State};
use crate::cart::{Cart, CartTotals};
use crate::error::add_breadcrumb;

pub use form::{AddressForm, AddressSection, CheckoutForm, CreditCardForm, CustomerForm, FieldPath};
pub use purchase::build_purchase;
pub use validation::{Pattern, Rule, ValidationReport, rules_for, validate};

/// Tracking number reported when the order service does not return one.
pub const FALLBACK_TRACKING_NUMBER: &str = "5818264819328";

/// Where the shopper is sent after submitting an order.
pub const PRODUCTS_ROUTE: &str = "/products";

/// Checkout controller errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// States were requested before a country was chosen.
    #[error("No country selected for {0}")]
    CountryNotSelected(AddressSection),

    /// A selection needed to build the order is unset.
    #[error("Missing selection for {0}")]
    MissingSelection(FieldPath),
}

/// Source of "today" for expiration-date choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// The local calendar date.
    #[default]
    System,
    /// A fixed date.
    Fixed(NaiveDate),
}

impl Clock {
    #[must_use]
    pub fn today(self) -> NaiveDate {
        match self {
            Self::System => Local::now().date_naive(),
            Self::Fixed(date) => date,
        }
    }
}

/// Where an order confirmation's tracking number came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationSource {
    /// Returned by the order service.
    Server,
    /// The order service failed; the tracking number is
    /// [`FALLBACK_TRACKING_NUMBER`].
    Fallback { error: String },
}

/// What the shopper is told after submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub tracking_number: String,
    pub source: ConfirmationSource,
    /// Route to navigate to next.
    pub redirect_to: &'static str,
}

impl OrderConfirmation {
    /// Message shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Your order has been received.\nOrder tracking number: {}",
            self.tracking_number
        )
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, ConfirmationSource::Fallback { .. })
    }
}

/// Result of [`CheckoutController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form is invalid; nothing was sent.
    Rejected(ValidationReport),
    /// The order was sent and the cart emptied.
    Completed(OrderConfirmation),
}

/// One checkout session.
pub struct CheckoutController<G> {
    gateway: G,
    cart: Cart,
    totals: watch::Receiver<CartTotals>,
    clock: Clock,
    form: CheckoutForm,
    touched: BTreeSet<FieldPath>,
    countries: Vec<Country>,
    billing_address_states: Vec<State>,
    credit_card_months: Vec<u32>,
    credit_card_years: Vec<i32>,
}

impl<G: ReferenceDataGateway + OrderGateway> CheckoutController<G> {
    /// Create a controller with an empty form. Reference lists stay empty
    /// until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(gateway: G, cart: Cart) -> Self {
        let totals = cart.subscribe();
        Self {
            gateway,
            cart,
            totals,
            clock: Clock::System,
            form: CheckoutForm::default(),
            touched: BTreeSet::new(),
            countries: Vec::new(),
            billing_address_states: Vec::new(),
            credit_card_months: Vec::new(),
            credit_card_years: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch countries and card expiration ranges concurrently.
    ///
    /// A failed fetch leaves its list empty; the others still apply.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) {
        let today = self.clock.today();

        let (countries, months, years) = tokio::join!(
            self.gateway.countries(),
            self.gateway.credit_card_months(today.month()),
            self.gateway.credit_card_years(today.year()),
        );

        self.countries = loaded("countries", countries);
        self.credit_card_months = loaded("credit card months", months);
        self.credit_card_years = loaded("credit card years", years);

        let totals = *self.totals.borrow();
        info!(
            countries = self.countries.len(),
            total_quantity = totals.total_quantity,
            total_price = %totals.total_price,
            "Checkout initialized"
        );
    }

    /// Recompute selectable months for the selected expiration year.
    ///
    /// The current year starts at the current month; any other year offers
    /// all twelve.
    pub async fn handle_months_and_years(&mut self) {
        let today = self.clock.today();
        let start_month = if self.form.credit_card.expiration_year == Some(today.year()) {
            today.month()
        } else {
            1
        };

        let months = self.gateway.credit_card_months(start_month).await;
        self.credit_card_months = loaded("credit card months", months);
    }

    /// Select an expiration year and refresh the months.
    pub async fn select_expiration_year(&mut self, year: i32) {
        self.form.credit_card.expiration_year = Some(year);
        self.handle_months_and_years().await;
    }

    /// Fetch states for the section's selected country and preselect the
    /// first one (none when the country has no states).
    ///
    /// # Errors
    ///
    /// Returns `CountryNotSelected` if the section has no country.
    #[instrument(skip(self))]
    pub async fn load_states(&mut self, section: AddressSection) -> Result<(), CheckoutError> {
        let country_code = self
            .form
            .address(section)
            .country
            .as_ref()
            .map(|country| country.code.clone())
            .ok_or(CheckoutError::CountryNotSelected(section))?;

        let states = loaded("states", self.gateway.states(&country_code).await);

        self.form.address_mut(section).state = states.first().cloned();
        match section {
            AddressSection::Billing => self.billing_address_states = states,
        }
        Ok(())
    }

    /// Select a country for `section` and load its states.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`load_states`](Self::load_states).
    pub async fn select_country(
        &mut self,
        section: AddressSection,
        country: Country,
    ) -> Result<(), CheckoutError> {
        self.form.address_mut(section).country = Some(country);
        self.load_states(section).await
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// Mark a field as interacted with, so its errors become visible.
    pub fn touch(&mut self, field: FieldPath) {
        self.touched.insert(field);
    }

    pub fn mark_all_as_touched(&mut self) {
        self.touched.extend(FieldPath::ALL);
    }

    #[must_use]
    pub fn is_touched(&self, field: FieldPath) -> bool {
        self.touched.contains(&field)
    }

    /// Validate the current form values.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        validate(&self.form)
    }

    /// Validation errors of touched fields only.
    #[must_use]
    pub fn visible_errors(&self) -> ValidationReport {
        self.validate().filtered(|field| self.touched.contains(&field))
    }

    /// Latest cart totals.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        *self.totals.borrow()
    }

    /// Validate and place the order.
    ///
    /// An invalid form marks every field touched and sends nothing. A valid
    /// form is sent; whether the order service accepts it or fails, the cart
    /// and form are reset and a confirmation is returned. A failure is
    /// reported through [`ConfirmationSource::Fallback`].
    ///
    /// # Errors
    ///
    /// Returns `MissingSelection` if the purchase cannot be assembled.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<SubmitOutcome, CheckoutError> {
        let report = self.validate();
        if !report.is_valid() {
            self.mark_all_as_touched();
            info!(invalid_fields = report.invalid_fields().count(), "Checkout form rejected");
            return Ok(SubmitOutcome::Rejected(report));
        }

        let totals = *self.totals.borrow();
        let purchase = build_purchase(&self.form, totals, &self.cart.lines())?;

        add_breadcrumb("checkout", "Placing order", None);

        let confirmation = match self.gateway.place_order(&purchase).await {
            Ok(response) => {
                info!(tracking_number = %response.order_tracking_number, "Order placed");
                OrderConfirmation {
                    tracking_number: response.order_tracking_number,
                    source: ConfirmationSource::Server,
                    redirect_to: PRODUCTS_ROUTE,
                }
            }
            Err(error) => {
                let event_id = sentry::capture_error(&error);
                warn!(
                    error = %error,
                    sentry_event_id = %event_id,
                    tracking_number = FALLBACK_TRACKING_NUMBER,
                    "Order submission failed; confirming with fallback tracking number"
                );
                OrderConfirmation {
                    tracking_number: FALLBACK_TRACKING_NUMBER.to_string(),
                    source: ConfirmationSource::Fallback {
                        error: error.to_string(),
                    },
                    redirect_to: PRODUCTS_ROUTE,
                }
            }
        };

        self.reset_cart();
        Ok(SubmitOutcome::Completed(confirmation))
    }

    /// Empty the cart and start a fresh form.
    pub fn reset_cart(&mut self) {
        self.cart.reset();
        self.form = CheckoutForm::default();
        self.touched.clear();
        self.billing_address_states.clear();
    }

    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    #[must_use]
    pub fn states(&self, section: AddressSection) -> &[State] {
        match section {
            AddressSection::Billing => &self.billing_address_states,
        }
    }

    #[must_use]
    pub fn credit_card_months(&self) -> &[u32] {
        &self.credit_card_months
    }

    #[must_use]
    pub fn credit_card_years(&self) -> &[i32] {
        &self.credit_card_years
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }
}

/// Unwrap a reference-data fetch, logging failures as an empty list.
fn loaded<T>(what: &str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load {what}");
        Vec::new()
    })
}
