use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::navigator::Navigator;
use crate::storage::{KeyValueStore, StoreError};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "authToken";

/// Storage key for the absolute expiry, epoch milliseconds as a decimal string
pub const EXPIRY_KEY: &str = "tokenExpiry";

/// Token lifetime in hours. There is no refresh; expiry forces a new login.
const TOKEN_TTL_HOURS: i64 = 24;

/// A bearer token together with the moment it stops being usable locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }
}

/// Result of resolving the stored credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenLookup {
    Valid(String),
    /// Nothing (or only half a credential) was stored
    Missing,
    /// The credential was past its expiry; storage has been cleared and the
    /// session-ended signal already sent
    Expired,
}

/// Single source of truth for the current session credential.
///
/// Token and expiry are always written and cleared together. Reading an expired
/// credential clears it and asks the navigator to return to login.
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            storage,
            navigator,
            clock: Arc::new(SystemClock),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Get the token if one is stored and not past its local expiry.
    ///
    /// This is a local check only; the server may still reject the token.
    pub fn get_valid_token(&self) -> Result<Option<String>, StoreError> {
        match self.lookup()? {
            TokenLookup::Valid(token) => Ok(Some(token)),
            TokenLookup::Missing | TokenLookup::Expired => Ok(None),
        }
    }

    /// Store a fresh token expiring one TTL from now, replacing any prior one.
    pub fn set_token(&self, token: &str) -> Result<Credential, StoreError> {
        let expires_at = self.clock.now() + self.ttl;
        let expiry = expires_at.timestamp_millis().to_string();
        self.storage
            .set_entries(&[(TOKEN_KEY, token), (EXPIRY_KEY, expiry.as_str())])?;
        info!(expires_at = %expires_at, "Session token stored");
        Ok(Credential {
            token: token.to_string(),
            expires_at,
        })
    }

    /// Remove token and expiry. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_entries(&[TOKEN_KEY, EXPIRY_KEY])?;
        debug!("Session token cleared");
        Ok(())
    }

    /// Read the stored credential without expiry side effects.
    ///
    /// Returns `None` when either half is missing or the expiry is unreadable.
    pub fn credential(&self) -> Result<Option<Credential>, StoreError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let expiry = self.storage.get(EXPIRY_KEY)?;
        Ok(match (token, expiry) {
            (Some(token), Some(expiry)) => {
                parse_expiry(&expiry).map(|expires_at| Credential { token, expires_at })
            }
            _ => None,
        })
    }

    /// Whether a locally valid credential exists, without side effects.
    pub fn is_authenticated(&self) -> Result<bool, StoreError> {
        let now = self.clock.now();
        Ok(self
            .credential()?
            .map(|c| !c.is_expired_at(now))
            .unwrap_or(false))
    }

    pub(crate) fn lookup(&self) -> Result<TokenLookup, StoreError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let expiry = self.storage.get(EXPIRY_KEY)?;

        let (token, expiry) = match (token, expiry) {
            (Some(token), Some(expiry)) => (token, expiry),
            _ => return Ok(TokenLookup::Missing),
        };

        let expired = match parse_expiry(&expiry) {
            Some(expires_at) => self.clock.now() > expires_at,
            None => {
                warn!(expiry = %expiry, "Unreadable token expiry, treating session as expired");
                true
            }
        };

        if expired {
            info!("Session token expired");
            self.clear()?;
            self.signal_session_ended();
            return Ok(TokenLookup::Expired);
        }

        Ok(TokenLookup::Valid(token))
    }

    /// Clear the credential after the server rejected it, then return to login.
    ///
    /// A storage failure is logged rather than returned so the caller can still
    /// report the rejection itself.
    pub(crate) fn invalidate(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear rejected session token");
        }
        self.signal_session_ended();
    }

    pub(crate) fn signal_session_ended(&self) {
        self.navigator.reset_to_login();
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let millis = raw.trim().parse::<i64>().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}
