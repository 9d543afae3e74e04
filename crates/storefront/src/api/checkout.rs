//! Order placement endpoint.

use std::future::Future;

use tracing::instrument;

use super::types::{Purchase, PurchaseResponse};
use super::{ApiClient, ApiError};

/// Places orders.
///
/// There is no idempotency key: sending the same purchase twice creates two
/// orders.
pub trait OrderGateway {
    /// Submit a purchase and return the server's tracking number.
    fn place_order(
        &self,
        purchase: &Purchase,
    ) -> impl Future<Output = Result<PurchaseResponse, ApiError>> + Send;
}

impl OrderGateway for ApiClient {
    #[instrument(skip_all, fields(items = purchase.order_items.len()))]
    async fn place_order(&self, purchase: &Purchase) -> Result<PurchaseResponse, ApiError> {
        self.post_json("checkout/purchase", purchase).await
    }
}
