//! Core traits for persistence backends.
//!
//! This module defines the `CandleBackend` trait - the primary abstraction
//! over the hosted persistence/auth service.

use async_trait::async_trait;

use crate::candle::{Candle, NewCandle};
use crate::session::Session;
use crate::sidechannel::RejectionReport;
use crate::stream::CandleStream;

/// Error types for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Backend is not reachable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Submission throttled by abuse prevention
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// The caller does not own the candle
    #[error("Not the owner of candle {0}")]
    NotOwner(String),

    /// Session missing, expired, or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl BackendError {
    /// Whether this failure is a rate-limit rejection.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Core trait for persistence backends.
///
/// Abstracts the hosted service behind the narrow contract the client core
/// needs: anonymous session issuance, candle listing/creation/deletion, and a
/// best-effort rejection audit call.
#[async_trait]
pub trait CandleBackend: Send + Sync {
    /// Identifier for this backend (e.g. project URL).
    fn id(&self) -> &str;

    /// Check if the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Issue an anonymous session, optionally presenting a human-verification
    /// challenge token. The token is opaque to the core.
    async fn issue_session(&self, challenge: Option<&str>) -> Result<Session, BackendError>;

    /// Fetch all candles, concatenating fixed-size pages until a short page.
    async fn list_candles(&self) -> Result<Vec<Candle>, BackendError>;

    /// Fetch candles as a stream of batches for progressive rendering.
    ///
    /// The default implementation wraps `list_candles` into a single batch.
    async fn stream_candles(&self) -> Result<CandleStream, BackendError> {
        let candles = self.list_candles().await?;
        Ok(CandleStream::from_complete(candles))
    }

    /// Create a candle. Identity is the caller's anonymous session.
    async fn create_candle(
        &self,
        session: &Session,
        candle: &NewCandle,
    ) -> Result<Candle, BackendError>;

    /// Delete a candle. Permitted only when the session owns it.
    async fn delete_candle(&self, session: &Session, id: &str) -> Result<(), BackendError>;

    /// Record a rejected submission. Best effort; callers must tolerate failure.
    async fn log_rejection(&self, report: &RejectionReport) -> Result<(), BackendError>;
}
