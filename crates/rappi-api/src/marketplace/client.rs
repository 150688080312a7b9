// Marketplace endpoints
//
// `MarketplaceClient` is the authenticated client configured for the
// marketplace: header-token login against `{base}/login` and `X-Auth-Int`
// on every request.

use secrecy::SecretString;
use url::Url;

use super::MARKETPLACE_AUTH_HEADER;
use super::models::{CancelledOrderSummary, OrderSummary, RejectOrderRequest};
use crate::auth::{Clock, SystemClock, TokenCache};
use crate::client::{AuthenticatedClient, CredentialHeader, endpoint};
use crate::error::Error;
use crate::login::HeaderTokenLogin;
use crate::transport::TransportConfig;

/// Static settings for one marketplace client.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// API root, e.g. `http://microservices.dev.rappi.com/api/restaurants-integrations-public-api`.
    pub base_url: Url,
    /// Partner token issued by the marketplace, exchanged for a bearer at login.
    pub seed_token: SecretString,
}

pub type MarketplaceClient<C = SystemClock> = AuthenticatedClient<HeaderTokenLogin, C>;

const CREDENTIAL_HEADER: CredentialHeader = CredentialHeader {
    name: MARKETPLACE_AUTH_HEADER,
    scheme: None,
};

impl MarketplaceClient<SystemClock> {
    /// Build a client with its own `reqwest::Client` from `transport`.
    pub fn from_config(
        config: &MarketplaceConfig,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(config, http, TokenCache::new())
    }
}

impl<C: Clock> MarketplaceClient<C> {
    /// Wrap an existing `reqwest::Client` and token cache.
    pub fn from_reqwest(
        config: &MarketplaceConfig,
        http: reqwest::Client,
        cache: TokenCache<C>,
    ) -> Result<Self, Error> {
        let login_url = endpoint(&config.base_url, "login")?;
        let strategy = HeaderTokenLogin::new(login_url, config.seed_token.clone());
        Ok(Self::with_cache(
            http,
            config.base_url.clone(),
            CREDENTIAL_HEADER,
            strategy,
            cache,
        ))
    }

    /// Pending orders. An empty marketplace answers with `[]`.
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, Error> {
        self.get(self.url("orders")?).await
    }

    /// Accept an order.
    ///
    /// Returns `true` once the marketplace acknowledges it. A business
    /// rejection (e.g. already taken) surfaces as `Error::BadRequest`.
    pub async fn take_order(&self, order_id: &str) -> Result<bool, Error> {
        let url = self.url_segments(["orders", "take", order_id])?;
        self.get_no_response(url).await?;
        Ok(true)
    }

    /// Reject an order with a free-text reason.
    pub async fn reject_order(&self, order_id: &str, reason: &str) -> Result<bool, Error> {
        let body = RejectOrderRequest { order_id, reason };
        self.post_no_response(self.url("orders/reject")?, &body)
            .await?;
        Ok(true)
    }

    /// Cancelled orders from a caller-supplied URL (absolute, or relative
    /// to the base URL).
    pub async fn list_cancelled_orders(
        &self,
        url: &str,
    ) -> Result<Vec<CancelledOrderSummary>, Error> {
        self.get(self.resolve(url)?).await
    }
}
