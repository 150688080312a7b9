// Marketplace (restaurant integrations) API
//
// Seed-token login, order polling, take/reject and cancellation listing.
// The bearer travels in the `X-Auth-Int` header.

pub mod client;
pub mod models;

pub use client::{MarketplaceClient, MarketplaceConfig};
pub use models::{
    AddressDetails, CancelledOrderSummary, Customer, Order, OrderError, OrderItem, OrderSummary,
    RejectOrderRequest, Store,
};

/// Header carrying the marketplace bearer, both on the login response and on
/// every authenticated request.
pub const MARKETPLACE_AUTH_HEADER: &str = "X-Auth-Int";
