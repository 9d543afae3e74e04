//! Meme Shop Core - Shared types library.
//!
//! This crate provides common types used across all Meme Shop components:
//! - `storefront` - Cart, product listing and checkout controllers
//! - `cli` - Command-line driver for browsing and scripted checkout
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices, plus the email pattern

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
