//! An order-management web service for creating and listing items.
//!
//! Items are validated before they are stored: the name must not be blank
//! and the price must be greater than zero.

pub mod feature;
pub mod infra;
pub mod server;
