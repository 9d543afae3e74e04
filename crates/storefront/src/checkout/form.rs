//! Checkout form values.
//!
//! The form is plain data: every field holds what the shopper entered or
//! selected. Validity is computed separately (see [`super::validation`]).

use core::fmt;

use crate::api::{Country, State};

/// Customer contact section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// An address section. State and country hold the selected reference
/// objects; only their names are sent with the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub street: String,
    pub city: String,
    pub state: Option<State>,
    pub country: Option<Country>,
    pub zip_code: String,
}

/// Payment card section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditCardForm {
    pub card_type: String,
    pub name_on_card: String,
    pub card_number: String,
    pub security_code: String,
    pub expiration_month: Option<u32>,
    pub expiration_year: Option<i32>,
}

/// The whole checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub customer: CustomerForm,
    pub billing_address: AddressForm,
    pub credit_card: CreditCardForm,
}

/// Address sections that carry a country/state pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSection {
    Billing,
}

impl AddressSection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "billingAddress",
        }
    }
}

impl fmt::Display for AddressSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CheckoutForm {
    #[must_use]
    pub const fn address(&self, section: AddressSection) -> &AddressForm {
        match section {
            AddressSection::Billing => &self.billing_address,
        }
    }

    pub const fn address_mut(&mut self, section: AddressSection) -> &mut AddressForm {
        match section {
            AddressSection::Billing => &mut self.billing_address,
        }
    }
}

/// Every field of the form, addressed by its `section.field` path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    FirstName,
    LastName,
    Email,
    BillingStreet,
    BillingCity,
    BillingState,
    BillingCountry,
    BillingZipCode,
    CardType,
    NameOnCard,
    CardNumber,
    SecurityCode,
    ExpirationMonth,
    ExpirationYear,
}

impl FieldPath {
    /// All fields, in form order.
    pub const ALL: [Self; 14] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::BillingStreet,
        Self::BillingCity,
        Self::BillingState,
        Self::BillingCountry,
        Self::BillingZipCode,
        Self::CardType,
        Self::NameOnCard,
        Self::CardNumber,
        Self::SecurityCode,
        Self::ExpirationMonth,
        Self::ExpirationYear,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "customer.firstName",
            Self::LastName => "customer.lastName",
            Self::Email => "customer.email",
            Self::BillingStreet => "billingAddress.street",
            Self::BillingCity => "billingAddress.city",
            Self::BillingState => "billingAddress.state",
            Self::BillingCountry => "billingAddress.country",
            Self::BillingZipCode => "billingAddress.zipCode",
            Self::CardType => "creditCard.cardType",
            Self::NameOnCard => "creditCard.nameOnCard",
            Self::CardNumber => "creditCard.cardNumber",
            Self::SecurityCode => "creditCard.securityCode",
            Self::ExpirationMonth => "creditCard.expirationMonth",
            Self::ExpirationYear => "creditCard.expirationYear",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown checkout field: {s}"))
    }
}
