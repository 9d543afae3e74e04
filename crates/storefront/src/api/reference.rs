//! Reference data: countries, states and credit-card expiration ranges.

use std::future::Future;

use tracing::instrument;

use super::types::{Country, HalCollection, State};
use super::{ApiClient, ApiError};

/// How many years past the current one a card expiration may be.
const CARD_YEAR_SPAN: i32 = 10;

/// Lookup lists used to populate checkout form choices.
pub trait ReferenceDataGateway {
    /// All countries.
    fn countries(&self) -> impl Future<Output = Result<Vec<Country>, ApiError>> + Send;

    /// States/provinces of the country with the given code.
    fn states(
        &self,
        country_code: &str,
    ) -> impl Future<Output = Result<Vec<State>, ApiError>> + Send;

    /// Selectable expiration months, `start_month` through December.
    fn credit_card_months(
        &self,
        start_month: u32,
    ) -> impl Future<Output = Result<Vec<u32>, ApiError>> + Send;

    /// Selectable expiration years, starting at `start_year`.
    fn credit_card_years(
        &self,
        start_year: i32,
    ) -> impl Future<Output = Result<Vec<i32>, ApiError>> + Send;
}

/// Months `start_month..=12`; out-of-range starts are clamped into 1..=12.
#[must_use]
pub fn card_months(start_month: u32) -> Vec<u32> {
    (start_month.clamp(1, 12)..=12).collect()
}

/// Years `current_year..=current_year + 10`.
#[must_use]
pub fn card_years(current_year: i32) -> Vec<i32> {
    (current_year..=current_year + CARD_YEAR_SPAN).collect()
}

impl ReferenceDataGateway for ApiClient {
    #[instrument(skip(self))]
    async fn countries(&self) -> Result<Vec<Country>, ApiError> {
        let mut envelope: HalCollection<Country> = self.get_json("countries", &[]).await?;
        Ok(envelope.take("countries"))
    }

    #[instrument(skip(self))]
    async fn states(&self, country_code: &str) -> Result<Vec<State>, ApiError> {
        let mut envelope: HalCollection<State> = self
            .get_json(
                "states/search/findByCountryCode",
                &[("code", country_code.to_string())],
            )
            .await?;
        Ok(envelope.take("states"))
    }

    // Expiration ranges are derived from the calendar, not fetched.
    async fn credit_card_months(&self, start_month: u32) -> Result<Vec<u32>, ApiError> {
        Ok(card_months(start_month))
    }

    async fn credit_card_years(&self, start_year: i32) -> Result<Vec<i32>, ApiError> {
        Ok(card_years(start_year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_months_from_start() {
        assert_eq!(card_months(10), vec![10, 11, 12]);
        assert_eq!(card_months(12), vec![12]);
        assert_eq!(card_months(1), (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_card_months_clamps_out_of_range() {
        assert_eq!(card_months(0).len(), 12);
        assert_eq!(card_months(13), vec![12]);
    }

    #[test]
    fn test_card_years_span() {
        let years = card_years(2026);
        assert_eq!(years.first(), Some(&2026));
        assert_eq!(years.last(), Some(&2036));
        assert_eq!(years.len(), 11);
    }
}
