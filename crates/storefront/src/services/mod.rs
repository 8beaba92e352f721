//! External service clients.

pub mod paypal;

pub use paypal::PayPalClient;
