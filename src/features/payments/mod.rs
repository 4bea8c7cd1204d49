//! Payment status and checkout.

pub mod client;
pub mod types;

pub use client::{checkout, my_payments, payment_status};
pub use types::{CheckoutSession, PaymentState, PaymentStatus};
