//! Meme Shop storefront library.
//!
//! Client-side storefront logic: a REST client for the catalog and order
//! API, a shared shopping cart, the product listing controller and the
//! checkout form controller. Rendering is left to the caller; controllers
//! expose their state for a UI or the CLI to read and drive.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod listing;

#[cfg(test)]
mod testing;

pub use api::ApiClient;
pub use cart::Cart;
pub use checkout::CheckoutController;
pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use listing::ProductListController;
