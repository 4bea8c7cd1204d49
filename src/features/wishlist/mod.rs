//! Wishlist endpoints and the client-side membership mirror.

pub mod client;
pub mod set;
pub mod types;

pub use client::{add, fetch_wishlist, remove};
pub use set::WishlistSet;
pub use types::WishlistItem;
