// Credential lifecycle: clock abstraction, issued tokens and the TokenCache.
//
// The cache is an owned value inside each client instance -- no globals --
// so independent clients never share a bearer and tests can drive expiry
// through a `ManualClock`.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::Error;

/// Lifetime assumed for a credential whose login response carries no expiry.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

// ── Clock ────────────────────────────────────────────────────────────

/// Source of "now" for expiry comparisons.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the client under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = add_saturating(*now, by);
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn add_saturating(instant: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(by)
        .ok()
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ── Credentials ──────────────────────────────────────────────────────

/// What a login strategy hands back: the secret and, optionally, how long
/// the issuer says it lives.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: SecretString,
    pub expires_in: Option<Duration>,
}

impl IssuedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_in: None,
        }
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = Some(expires_in);
        self
    }
}

/// A cached credential and the instant it stops being usable.
#[derive(Debug, Clone)]
pub struct Credential {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: SecretString, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Usable strictly before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// ── TokenCache ───────────────────────────────────────────────────────

/// Holds at most one credential and re-acquires it when absent or expired.
///
/// Not synchronized: the owning client wraps it in a mutex so the
/// check-then-login sequence runs for one caller at a time.
#[derive(Debug)]
pub struct TokenCache<C = SystemClock> {
    credential: Option<Credential>,
    clock: C,
    default_ttl: Duration,
}

impl TokenCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TokenCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TokenCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            credential: None,
            clock,
            default_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// TTL applied when a login does not report `expires_in`.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The cached credential, whether or not it is still valid.
    pub fn current(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// The cached credential if it is valid right now.
    pub fn valid(&self) -> Option<&Credential> {
        let now = self.clock.now();
        self.credential.as_ref().filter(|c| c.is_valid_at(now))
    }

    /// Drop the cached credential so the next call logs in again.
    pub fn invalidate(&mut self) {
        if self.credential.take().is_some() {
            debug!("cached credential invalidated");
        }
    }

    /// Drop the cached credential only if it still holds `token`.
    ///
    /// Returns `false` when the cache is empty or already holds a newer
    /// credential.
    pub fn invalidate_if_current(&mut self, token: &SecretString) -> bool {
        let matches = self
            .credential
            .as_ref()
            .is_some_and(|c| c.token().expose_secret() == token.expose_secret());
        if matches {
            self.invalidate();
        }
        matches
    }

    /// Return the cached credential, or run `login` once and cache its result.
    ///
    /// On login failure the cache is left empty and the error is returned
    /// unchanged.
    pub async fn get_or_refresh<F, Fut>(&mut self, login: F) -> Result<Credential, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken, Error>>,
    {
        if let Some(credential) = self.valid() {
            return Ok(credential.clone());
        }

        self.credential = None;
        let issued = login().await?;

        let ttl = issued.expires_in.unwrap_or(self.default_ttl);
        let expires_at = add_saturating(self.clock.now(), ttl);
        debug!(%expires_at, "credential refreshed");

        let credential = Credential::new(issued.token, expires_at);
        self.credential = Some(credential.clone());
        Ok(credential)
    }
}
