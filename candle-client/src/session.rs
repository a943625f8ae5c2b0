//! Anonymous session identity.
//!
//! Identity is an explicit value threaded through backend calls and the
//! creation flow rather than a module-level singleton. Sessions are issued by
//! the backend, optionally gated by a human-verification challenge token, and
//! re-issued by the client when they approach expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// An issued anonymous session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Session {
    /// Anonymous user identity (owns created candles)
    pub user_id: String,
    /// Bearer token for authenticated calls
    pub access_token: String,
    /// When the session was issued
    pub issued_at: DateTime<Utc>,
    /// When the token expires, if the backend reports it
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Whether the session expires within the given margin.
    ///
    /// Sessions without a reported expiry never expire.
    pub fn expires_within(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + margin >= expires_at,
            None => false,
        }
    }
}
