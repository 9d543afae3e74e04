//! Purchase assembly: checkout form + cart snapshot -> order payload.

use crate::api::{Address, Customer, Order, OrderItem, Purchase};
use crate::cart::{CartLine, CartTotals};

use super::CheckoutError;
use super::form::{AddressForm, CheckoutForm, CustomerForm, FieldPath};

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            image_url: line.image_url.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            product_id: line.product_id,
        }
    }
}

impl From<CartTotals> for Order {
    fn from(totals: CartTotals) -> Self {
        Self {
            total_quantity: totals.total_quantity,
            total_price: totals.total_price,
        }
    }
}

impl From<&CustomerForm> for Customer {
    fn from(form: &CustomerForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            email: form.email.clone(),
        }
    }
}

/// Billing address with the selected state and country flattened to names.
fn billing_address(form: &AddressForm) -> Result<Address, CheckoutError> {
    let state = form
        .state
        .as_ref()
        .ok_or(CheckoutError::MissingSelection(FieldPath::BillingState))?;
    let country = form
        .country
        .as_ref()
        .ok_or(CheckoutError::MissingSelection(FieldPath::BillingCountry))?;

    Ok(Address {
        street: form.street.clone(),
        city: form.city.clone(),
        state: state.name.clone(),
        country: country.name.clone(),
        zip_code: form.zip_code.clone(),
    })
}

/// Build the order payload.
///
/// Order totals come from `totals`; there is one order item per cart line.
///
/// # Errors
///
/// Returns `MissingSelection` if the billing state or country is unset.
/// Validated forms always have both.
pub fn build_purchase(
    form: &CheckoutForm,
    totals: CartTotals,
    lines: &[CartLine],
) -> Result<Purchase, CheckoutError> {
    Ok(Purchase {
        customer: Customer::from(&form.customer),
        billing_address: billing_address(&form.billing_address)?,
        order: Order::from(totals),
        order_items: lines.iter().map(OrderItem::from).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use meme_shop_core::{Price, ProductId};

    use super::*;
    use crate::testing::{canada, state_of};

    fn line(id: i64, cents: i64, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            image_url: Some(format!("assets/{id}.png")),
            unit_price: Price::from_cents(cents),
            quantity,
        }
    }

    #[test]
    fn test_purchase_flattens_state_and_country() {
        let mut form = CheckoutForm::default();
        form.customer.first_name = "Ada".to_string();
        form.billing_address.country = Some(canada());
        form.billing_address.state = Some(state_of(9, "Ontario"));
        form.billing_address.street = "1 Main St".to_string();

        let lines = vec![line(1, 1500, 2), line(2, 1500, 1)];
        let totals = CartTotals {
            total_quantity: 3,
            total_price: Price::from_cents(4500),
        };

        let purchase = build_purchase(&form, totals, &lines).unwrap();

        assert_eq!(purchase.customer.first_name, "Ada");
        assert_eq!(purchase.billing_address.country, "Canada");
        assert_eq!(purchase.billing_address.state, "Ontario");
        assert_eq!(purchase.billing_address.street, "1 Main St");
        assert_eq!(purchase.order.total_quantity, 3);
        assert_eq!(purchase.order.total_price, Price::from_cents(4500));
        assert_eq!(purchase.order_items.len(), 2);
        assert_eq!(purchase.order_items[0].quantity, 2);
        assert_eq!(purchase.order_items[0].image_url.as_deref(), Some("assets/1.png"));
    }

    #[test]
    fn test_missing_country_is_an_error() {
        let mut form = CheckoutForm::default();
        form.billing_address.state = Some(state_of(9, "Ontario"));

        let err = build_purchase(&form, CartTotals::default(), &[]).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::MissingSelection(FieldPath::BillingCountry)
        ));
    }
}
