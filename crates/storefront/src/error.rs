//! Unified error handling with Sentry integration.
//!
//! Each layer has its own error enum; [`StorefrontError`] unifies them for
//! callers that drive several layers (the CLI). Failures worth alerting on
//! are captured to Sentry via [`report_error`].

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Top-level error type for the storefront library.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout form operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Capture an error to Sentry and log it.
///
/// Without an initialized Sentry client the capture is a no-op and only the
/// log line remains.
pub fn report_error<E>(error: &E, context: &str)
where
    E: std::error::Error + ?Sized,
{
    let event_id = sentry::capture_error(error);
    tracing::error!(
        error = %error,
        sentry_event_id = %event_id,
        "{context}"
    );
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::from(ApiError::NotFound("products/9".to_string()));
        assert_eq!(err.to_string(), "API error: Not found: products/9");

        let err = StorefrontError::from(ConfigError::MissingEnvVar("STOREFRONT_API_URL".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: STOREFRONT_API_URL"
        );
    }

    #[test]
    fn test_reporting_without_client_is_harmless() {
        let err = ApiError::RateLimited(5);
        report_error(&err, "Rate limited");
        add_breadcrumb("test", "breadcrumb", None);
    }
}
