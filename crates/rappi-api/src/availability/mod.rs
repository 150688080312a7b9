// Availability service API
//
// OAuth client-credentials login and store / item on-off toggles.
// The bearer travels as `x-authorization: Bearer <token>`.

pub mod client;
pub mod models;

pub use client::{AvailabilityClient, AvailabilityConfig};
pub use models::{AvailabilityToggle, StoreItemsAvailability};

/// Header carrying the availability bearer.
pub const AVAILABILITY_AUTH_HEADER: &str = "x-authorization";
