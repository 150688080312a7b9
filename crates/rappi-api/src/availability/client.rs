// Availability endpoints
//
// `AvailabilityClient` is the authenticated client configured for the
// availability service: client-credentials login against a fixed URL, the
// audience as base URL, and `x-authorization: Bearer ...` on every request.

use secrecy::SecretString;
use url::Url;

use super::AVAILABILITY_AUTH_HEADER;
use super::models::{AvailabilityToggle, StoreItemsAvailability};
use crate::auth::{Clock, SystemClock, TokenCache};
use crate::client::{AuthenticatedClient, CredentialHeader};
use crate::error::Error;
use crate::login::ClientCredentialsLogin;
use crate::transport::TransportConfig;

/// Static settings for one availability client.
#[derive(Debug, Clone)]
pub struct AvailabilityConfig {
    /// OAuth audience; doubles as the API base URL.
    pub audience: Url,
    /// Token endpoint for the client-credentials grant.
    pub login_url: Url,
    pub client_id: String,
    pub client_secret: SecretString,
}

pub type AvailabilityClient<C = SystemClock> = AuthenticatedClient<ClientCredentialsLogin, C>;

const CREDENTIAL_HEADER: CredentialHeader = CredentialHeader {
    name: AVAILABILITY_AUTH_HEADER,
    scheme: Some("Bearer"),
};

impl AvailabilityClient<SystemClock> {
    /// Build a client with its own `reqwest::Client` from `transport`.
    pub fn from_config(
        config: &AvailabilityConfig,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::from_reqwest(config, http, TokenCache::new()))
    }
}

impl<C: Clock> AvailabilityClient<C> {
    /// Wrap an existing `reqwest::Client` and token cache.
    pub fn from_reqwest(
        config: &AvailabilityConfig,
        http: reqwest::Client,
        cache: TokenCache<C>,
    ) -> Self {
        // The audience claim is the bare origin string, without the
        // trailing slash `Url` adds to an empty path.
        let audience = config.audience.as_str().trim_end_matches('/');
        let strategy = ClientCredentialsLogin::new(
            config.login_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            audience,
        );
        Self::with_cache(
            http,
            config.audience.clone(),
            CREDENTIAL_HEADER,
            strategy,
            cache,
        )
    }

    /// Switch whole stores on and off.
    pub async fn set_store_availability(&self, toggle: &AvailabilityToggle) -> Result<(), Error> {
        self.put_no_response(self.url("availability/stores")?, toggle)
            .await
    }

    /// Switch items on and off, per store.
    pub async fn set_item_availability(
        &self,
        requests: &[StoreItemsAvailability],
    ) -> Result<(), Error> {
        self.put_no_response(self.url("availability/stores/items")?, requests)
            .await
    }
}
