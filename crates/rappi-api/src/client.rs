// Authenticated HTTP client
//
// Wraps `reqwest::Client` with credential attachment, URL construction and
// response interpretation shared by both integrations. Endpoint methods live
// in the `marketplace` and `availability` modules as inherent impls on the
// concrete client aliases, keeping this module about transport mechanics.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{Clock, Credential, SystemClock, TokenCache};
use crate::error::Error;
use crate::login::LoginStrategy;
use crate::marketplace::OrderError;

/// Body the wire API uses to say "nothing here", whatever the endpoint's
/// normal result shape.
pub(crate) const EMPTY_SENTINEL: &str = "[]";

/// First 200 characters of a body, for error messages.
pub(crate) fn preview(body: &str) -> &str {
    body.char_indices()
        .nth(200)
        .map_or(body, |(idx, _)| &body[..idx])
}

/// Join the `/`-separated `path` onto `base`, keeping every segment of the
/// base path and its query.
///
/// `Url::join` would drop the last segment of a base without a trailing
/// slash, and partner base URLs are usually configured without one.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, Error> {
    endpoint_segments(base, path.split('/').filter(|s| !s.is_empty()))
}

/// Append each segment to the base path, percent-encoding `/`, `?` and `#`
/// so a caller-supplied identifier stays a single segment.
pub(crate) fn endpoint_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, Error> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| Error::InvalidPath(format!("{base} cannot carry a path")))?;
        path.pop_if_empty();
        for segment in segments {
            if matches!(segment, "" | "." | "..") {
                return Err(Error::InvalidPath(format!("{segment:?} is not a valid segment")));
            }
            path.push(segment);
        }
    }
    Ok(url)
}

/// Decode a successful body, mapping the empty sentinel to `T::default()`.
pub(crate) fn decode_body<T: DeserializeOwned + Default>(body: &str) -> Result<T, Error> {
    if body.trim() == EMPTY_SENTINEL {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

// ── Credential header ────────────────────────────────────────────────

/// Where and how the credential travels on each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialHeader {
    pub name: &'static str,
    /// Optional auth scheme prepended to the token (e.g. `Bearer`).
    pub scheme: Option<&'static str>,
}

impl CredentialHeader {
    fn value(&self, token: &SecretString) -> Result<HeaderValue, Error> {
        let raw = match self.scheme {
            Some(scheme) => format!("{scheme} {}", token.expose_secret()),
            None => token.expose_secret().to_owned(),
        };
        let mut value = HeaderValue::from_str(&raw)
            .map_err(|e| Error::InvalidHeader(format!("credential for {}: {e}", self.name)))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

// ── Login notifications ──────────────────────────────────────────────

/// Emitted every time a fresh credential is acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEvent {
    pub integration: &'static str,
    pub expires_at: DateTime<Utc>,
}

type LoginObserver = Arc<dyn Fn(&LoginEvent) + Send + Sync>;

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client that owns one credential and attaches it to every request.
///
/// Parametrized by the login strategy and the clock; the marketplace and
/// availability clients are aliases of this type. The credential is fetched
/// (or refreshed) before each call, a 401 drops it so the next call logs in
/// again, and nothing is retried internally.
pub struct AuthenticatedClient<L, C = SystemClock> {
    http: reqwest::Client,
    base_url: Url,
    header: CredentialHeader,
    strategy: L,
    cache: Mutex<TokenCache<C>>,
    observer: Option<LoginObserver>,
}

impl<L, C> fmt::Debug for AuthenticatedClient<L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.base_url.as_str())
            .field("header", &self.header.name)
            .finish_non_exhaustive()
    }
}

impl<L: LoginStrategy> AuthenticatedClient<L, SystemClock> {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        header: CredentialHeader,
        strategy: L,
    ) -> Self {
        Self::with_cache(http, base_url, header, strategy, TokenCache::new())
    }
}

impl<L: LoginStrategy, C: Clock> AuthenticatedClient<L, C> {
    /// Build around an existing cache (e.g. one driven by a `ManualClock`).
    pub fn with_cache(
        http: reqwest::Client,
        base_url: Url,
        header: CredentialHeader,
        strategy: L,
        cache: TokenCache<C>,
    ) -> Self {
        Self {
            http,
            base_url,
            header,
            strategy,
            cache: Mutex::new(cache),
            observer: None,
        }
    }

    /// Register a callback invoked after every successful login.
    pub fn with_login_observer(
        mut self,
        observer: impl Fn(&LoginEvent) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn credential_header(&self) -> CredentialHeader {
        self.header
    }

    pub fn strategy(&self) -> &L {
        &self.strategy
    }

    // ── Credential management ────────────────────────────────────────

    /// Log in now, replacing any cached credential, and return its expiry.
    pub async fn login(&self) -> Result<DateTime<Utc>, Error> {
        let mut cache = self.cache.lock().await;
        cache.invalidate();
        let credential = cache
            .get_or_refresh(|| self.strategy.login(&self.http))
            .await?;
        drop(cache);

        self.notify(&credential);
        Ok(credential.expires_at())
    }

    /// Forget the cached credential; the next call logs in again.
    pub async fn invalidate_credential(&self) {
        self.cache.lock().await.invalidate();
    }

    /// Expiry of the cached credential, if one is held.
    pub async fn credential_expiry(&self) -> Option<DateTime<Utc>> {
        self.cache.lock().await.current().map(Credential::expires_at)
    }

    async fn credential(&self) -> Result<Credential, Error> {
        let mut cache = self.cache.lock().await;
        let mut refreshed = false;
        let credential = cache
            .get_or_refresh(|| {
                refreshed = true;
                self.strategy.login(&self.http)
            })
            .await?;
        drop(cache);

        if refreshed {
            self.notify(&credential);
        }
        Ok(credential)
    }

    fn notify(&self, credential: &Credential) {
        debug!(
            integration = self.strategy.name(),
            expires_at = %credential.expires_at(),
            "logged in"
        );
        if let Some(observer) = &self.observer {
            observer(&LoginEvent {
                integration: self.strategy.name(),
                expires_at: credential.expires_at(),
            });
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base_url}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        endpoint(&self.base_url, path)
    }

    /// `{base_url}/{segment}/...`, each segment encoded on its own.
    pub(crate) fn url_segments<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, Error> {
        endpoint_segments(&self.base_url, segments)
    }

    /// Accept either an absolute URL or a path relative to the base URL.
    pub(crate) fn resolve(&self, url_or_path: &str) -> Result<Url, Error> {
        match Url::parse(url_or_path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let (path, query) = match url_or_path.split_once('?') {
                    Some((path, query)) => (path, Some(query)),
                    None => (url_or_path, None),
                };
                let mut url = self.url(path)?;
                if query.is_some() {
                    url.set_query(query);
                }
                Ok(url)
            }
            Err(e) => Err(Error::InvalidUrl(e)),
        }
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned + Default>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.execute(self.http.get(url)).await?;
        Self::decode(resp).await
    }

    pub(crate) async fn get_no_response(&self, url: Url) -> Result<(), Error> {
        debug!("GET {url}");
        self.execute(self.http.get(url)).await?;
        Ok(())
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("POST {url}");
        self.execute(self.http.post(url).json(body)).await?;
        Ok(())
    }

    pub(crate) async fn put_no_response<B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("PUT {url}");
        self.execute(self.http.put(url).json(body)).await?;
        Ok(())
    }

    // ── Response handling ────────────────────────────────────────────

    /// Attach the credential, send, and return the response if it is 2xx.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, Error> {
        let credential = self.credential().await?;
        let value = self.header.value(credential.token())?;

        let resp = builder.header(self.header.name, value).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(self.parse_error(status, resp, &credential).await)
        }
    }

    async fn decode<T: DeserializeOwned + Default>(resp: Response) -> Result<T, Error> {
        let body = resp.text().await?;
        decode_body(&body)
    }

    async fn parse_error(&self, status: StatusCode, resp: Response, sent: &Credential) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            warn!(
                integration = self.strategy.name(),
                "credential rejected, dropping it"
            );
            // Another caller may already have logged in again.
            self.cache.lock().await.invalidate_if_current(sent.token());
            return Error::Unauthorized {
                message: "credential rejected by the server".into(),
            };
        }

        let body = resp.text().await.unwrap_or_default();

        if status == StatusCode::BAD_REQUEST {
            return match serde_json::from_str::<OrderError>(&body) {
                Ok(err) => Error::BadRequest(err),
                Err(e) => Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", preview(&body)),
                    body,
                },
            };
        }

        Error::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
    }
}
