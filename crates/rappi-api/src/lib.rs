// rappi-api: Async Rust client for the Rappi marketplace and availability APIs

pub mod auth;
pub mod availability;
pub mod client;
pub mod error;
pub mod login;
pub mod marketplace;
pub mod transport;

pub use auth::{
    Clock, Credential, DEFAULT_TOKEN_TTL, IssuedToken, ManualClock, SystemClock, TokenCache,
};
pub use availability::{
    AvailabilityClient, AvailabilityConfig, AvailabilityToggle, StoreItemsAvailability,
};
pub use client::{AuthenticatedClient, CredentialHeader, LoginEvent};
pub use error::Error;
pub use login::{ClientCredentialsLogin, HeaderTokenLogin, LoginStrategy};
pub use marketplace::{
    CancelledOrderSummary, MarketplaceClient, MarketplaceConfig, OrderError, OrderSummary,
};
pub use transport::{TlsMode, TransportConfig};
