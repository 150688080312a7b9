// Login strategies
//
// Each integration exchanges static secrets for a short-lived credential in
// its own way. The client only sees the `LoginStrategy` trait; the two
// implementations below cover the marketplace (seed token in, bearer back in
// a response header) and the availability service (OAuth client credentials).

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::auth::IssuedToken;
use crate::availability::models::{AccessTokenResponse, ClientCredentialsGrant};
use crate::client::{EMPTY_SENTINEL, preview};
use crate::error::Error;
use crate::marketplace::MARKETPLACE_AUTH_HEADER;
use crate::marketplace::models::SeedTokenLogin;

/// Exchanges configured secrets for a credential.
pub trait LoginStrategy: Send + Sync {
    /// Short label used in logs and `MissingCredential` errors.
    fn name(&self) -> &'static str;

    fn login(
        &self,
        http: &reqwest::Client,
    ) -> impl Future<Output = Result<IssuedToken, Error>> + Send;
}

// ── Header-token exchange ────────────────────────────────────────────

/// `POST {base}/login` with `{"token": seed}`; the bearer comes back in the
/// `X-Auth-Int` response header.
#[derive(Debug, Clone)]
pub struct HeaderTokenLogin {
    login_url: Url,
    seed_token: SecretString,
}

impl HeaderTokenLogin {
    pub fn new(login_url: Url, seed_token: SecretString) -> Self {
        Self {
            login_url,
            seed_token,
        }
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }
}

impl LoginStrategy for HeaderTokenLogin {
    fn name(&self) -> &'static str {
        "marketplace login"
    }

    async fn login(&self, http: &reqwest::Client) -> Result<IssuedToken, Error> {
        debug!("logging in at {}", self.login_url);

        let body = SeedTokenLogin {
            token: self.seed_token.expose_secret(),
        };
        let resp = http.post(self.login_url.clone()).json(&body).send().await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                message: "invalid token".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token = resp
            .headers()
            .get(MARKETPLACE_AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingCredential {
                source_name: format!("{} ({MARKETPLACE_AUTH_HEADER} header)", self.name()),
            })?;

        debug!("login successful");
        Ok(IssuedToken::new(token))
    }
}

// ── Client-credentials exchange ──────────────────────────────────────

/// OAuth client-credentials grant posted as JSON to a fixed login URL.
#[derive(Debug, Clone)]
pub struct ClientCredentialsLogin {
    login_url: Url,
    client_id: String,
    client_secret: SecretString,
    audience: String,
}

impl ClientCredentialsLogin {
    pub fn new(
        login_url: Url,
        client_id: impl Into<String>,
        client_secret: SecretString,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            login_url,
            client_id: client_id.into(),
            client_secret,
            audience: audience.into(),
        }
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }
}

impl LoginStrategy for ClientCredentialsLogin {
    fn name(&self) -> &'static str {
        "availability login"
    }

    async fn login(&self, http: &reqwest::Client) -> Result<IssuedToken, Error> {
        debug!("requesting client-credentials token at {}", self.login_url);

        let grant = ClientCredentialsGrant {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            audience: &self.audience,
            grant_type: "client_credentials",
        };
        let resp = http.post(self.login_url.clone()).json(&grant).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        if body.trim() == EMPTY_SENTINEL {
            return Err(Error::MissingCredential {
                source_name: self.name().into(),
            });
        }

        let parsed: AccessTokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        if parsed.access_token.is_empty() {
            return Err(Error::MissingCredential {
                source_name: self.name().into(),
            });
        }

        debug!(expires_in = ?parsed.expires_in, "client-credentials token issued");
        let mut issued = IssuedToken::new(parsed.access_token);
        if let Some(secs) = parsed.expires_in {
            issued = issued.with_expires_in(Duration::from_secs(secs));
        }
        Ok(issued)
    }
}
