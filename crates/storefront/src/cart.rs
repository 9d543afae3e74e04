//! Shopping cart state holder.
//!
//! A [`Cart`] is an explicitly owned handle: create one per shopper session
//! and pass clones to every component that reads or mutates it. Totals are
//! published on a `tokio::sync::watch` channel so views can subscribe to
//! them instead of polling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use meme_shop_core::{Price, ProductId};
use tokio::sync::watch;
use tracing::debug;

use crate::api::Product;
use crate::error::add_breadcrumb;

/// One distinct product in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Price,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Price of this line (unit price x quantity).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A product to add to the cart, one unit at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub unit_price: Price,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            unit_price: product.unit_price,
        }
    }
}

/// Aggregate quantity and price of all cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    pub total_quantity: u32,
    pub total_price: Price,
}

impl CartTotals {
    fn compute(lines: &[CartLine]) -> Self {
        Self {
            total_quantity: lines.iter().map(|line| line.quantity).sum(),
            total_price: lines.iter().map(CartLine::subtotal).sum(),
        }
    }
}

/// Shared shopping cart.
///
/// Cheap to clone; clones refer to the same cart. Every mutation recomputes
/// the totals and publishes them to subscribers.
#[derive(Clone)]
pub struct Cart {
    inner: Arc<CartInner>,
}

struct CartInner {
    lines: Mutex<Vec<CartLine>>,
    totals: watch::Sender<CartTotals>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        let (totals, _) = watch::channel(CartTotals::default());
        Self {
            inner: Arc::new(CartInner {
                lines: Mutex::new(Vec::new()),
                totals,
            }),
        }
    }

    /// Add one unit of `item`.
    ///
    /// Increments the existing line for the same product, or appends a new
    /// line with quantity 1.
    pub fn add_to_cart(&self, item: CartItem) {
        let product_id = item.product_id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

        self.mutate(|lines| {
            if let Some(line) = lines.iter_mut().find(|l| l.product_id == item.product_id) {
                line.quantity += 1;
            } else {
                debug!(product_id = %item.product_id, name = %item.name, "New cart line");
                lines.push(CartLine {
                    product_id: item.product_id,
                    name: item.name,
                    image_url: item.image_url,
                    unit_price: item.unit_price,
                    quantity: 1,
                });
            }
        });
    }

    /// Remove one unit of a product; the line disappears when it reaches zero.
    pub fn decrement_quantity(&self, product_id: ProductId) {
        self.mutate(|lines| {
            if let Some(index) = lines.iter().position(|l| l.product_id == product_id) {
                let remove = lines.get_mut(index).is_some_and(|line| {
                    line.quantity -= 1;
                    line.quantity == 0
                });
                if remove {
                    lines.remove(index);
                }
            }
        });
    }

    /// Remove a product's line entirely.
    pub fn remove(&self, product_id: ProductId) {
        self.mutate(|lines| lines.retain(|l| l.product_id != product_id));
    }

    /// Empty the cart and publish zero totals.
    pub fn reset(&self) {
        self.mutate(Vec::clear);
    }

    /// Snapshot of the current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().clone()
    }

    /// Current totals.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        *self.inner.totals.borrow()
    }

    /// Subscribe to totals; the receiver always sees the latest value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartTotals> {
        self.inner.totals.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLine>> {
        // Lines stay consistent even if a holder panicked: every mutation is a single Vec op.
        self.inner.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLine>)) {
        let mut lines = self.lock();
        f(&mut lines);
        let totals = CartTotals::compute(&lines);
        self.inner.totals.send_replace(totals);
        debug!(
            total_quantity = totals.total_quantity,
            total_price = %totals.total_price,
            "Cart totals updated"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, cents: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image_url: None,
            unit_price: Price::from_cents(cents),
        }
    }

    #[test]
    fn test_totals_are_sums_over_lines() {
        let cart = Cart::new();
        let sequence = [(1, 1500), (2, 999), (1, 1500), (3, 1), (2, 999), (1, 1500)];
        for (id, cents) in sequence {
            cart.add_to_cart(item(id, cents));
        }

        let lines = cart.lines();
        let totals = cart.totals();
        assert_eq!(
            totals.total_quantity,
            lines.iter().map(|l| l.quantity).sum::<u32>()
        );
        assert_eq!(
            totals.total_price,
            lines.iter().map(CartLine::subtotal).sum::<Price>()
        );
        assert_eq!(totals.total_quantity, 6);
        assert_eq!(totals.total_price, Price::from_cents(3 * 1500 + 2 * 999 + 1));
    }

    #[test]
    fn test_adding_same_product_increments_line() {
        let cart = Cart::new();
        cart.add_to_cart(item(1, 1500));
        cart.add_to_cart(item(1, 1500));

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[test]
    fn test_decrement_removes_line_at_zero() {
        let cart = Cart::new();
        cart.add_to_cart(item(1, 1500));
        cart.add_to_cart(item(1, 1500));
        cart.add_to_cart(item(2, 500));

        cart.decrement_quantity(ProductId::new(1));
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.decrement_quantity(ProductId::new(1));
        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, ProductId::new(2));
        assert_eq!(cart.totals().total_price, Price::from_cents(500));

        // Unknown product is a no-op
        cart.decrement_quantity(ProductId::new(99));
        assert_eq!(cart.totals().total_quantity, 1);
    }

    #[test]
    fn test_remove_line() {
        let cart = Cart::new();
        cart.add_to_cart(item(1, 1500));
        cart.add_to_cart(item(2, 500));
        cart.remove(ProductId::new(1));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.totals().total_quantity, 1);
    }

    #[test]
    fn test_reset_zeros_totals() {
        let cart = Cart::new();
        cart.add_to_cart(item(1, 1500));
        cart.reset();

        assert!(cart.lines().is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let cart = Cart::new();
        let mut rx = cart.subscribe();
        assert_eq!(rx.borrow().total_quantity, 0);

        let writer = cart.clone();
        writer.add_to_cart(item(1, 1500));

        rx.changed().await.unwrap();
        let totals = *rx.borrow_and_update();
        assert_eq!(totals.total_quantity, 1);
        assert_eq!(totals.total_price, Price::from_cents(1500));
    }
}
