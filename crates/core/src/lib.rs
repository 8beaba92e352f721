//! Fournil Core - Shared domain library.
//!
//! This crate holds the domain model and the order lifecycle service used by
//! the Fournil components:
//! - `storefront` - Public ordering API
//! - `admin` - Back-office API (order management, catalog, audit trail)
//! - `cli` - Command-line tools for migrations and seed data
//!
//! # Architecture
//!
//! The binaries are thin HTTP layers; everything with an invariant lives here:
//!
//! - [`types`] - Newtype wrappers for IDs, money amounts, emails, and statuses
//! - [`model`] - Persisted entities (products, flavors, orders, audit entries)
//! - [`store`] - Storage traits plus Postgres (`postgres` feature) and
//!   in-memory implementations
//! - [`service`] - Order pricing/lifecycle and catalog management
//! - [`notify`] / [`payment`] - Collaborator traits for email and the payment
//!   provider; implementations live with the binaries (or behind the `smtp`
//!   feature for email)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod model;
pub mod notify;
pub mod order_number;
pub mod payment;
pub mod service;
pub mod store;
pub mod types;

pub use error::{CatalogError, OrderError, StoreError};
pub use types::*;
