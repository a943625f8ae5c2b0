//! Non-blocking side channel for rejection audit logs.
//!
//! Rate-limited submissions are reported to the backend on a best-effort
//! basis. Dispatches run as detached tasks: their failures are swallowed,
//! logged locally, and counted, but never propagate to the submit path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::backend::traits::CandleBackend;
use crate::candle::Position;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Abuse-prevention throttling
    RateLimited,
    /// Any other failure
    Other,
}

/// A rejected submission, as reported to the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RejectionReport {
    /// Classified rejection reason
    pub reason: RejectionReason,
    /// Emotion of the rejected draft
    pub emotion: Option<String>,
    /// Position of the rejected draft
    pub position: Option<Position>,
    /// Backend error message, if any
    pub message: Option<String>,
    /// When the rejection was observed
    pub occurred_at: DateTime<Utc>,
}

impl RejectionReport {
    /// Build a rate-limit report from the rejected draft.
    pub fn rate_limited(emotion: Option<String>, position: Option<Position>) -> Self {
        Self {
            reason: RejectionReason::RateLimited,
            emotion,
            position,
            message: None,
            occurred_at: Utc::now(),
        }
    }

    /// Attach the backend error message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Counters observable without touching the main flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideChannelStats {
    /// Reports handed to the channel
    pub dispatched: u64,
    /// Reports the backend accepted
    pub delivered: u64,
    /// Reports the backend rejected or that failed in transit
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    dispatched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Best-effort dispatcher for rejection reports.
pub struct RejectionReporter {
    backend: Arc<dyn CandleBackend>,
    counters: Arc<Counters>,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

impl RejectionReporter {
    /// Create a reporter over the given backend.
    pub fn new(backend: Arc<dyn CandleBackend>) -> Self {
        Self {
            backend,
            counters: Arc::new(Counters::default()),
            inflight: Mutex::new(Vec::new()),
        }
    }

    /// Dispatch a report without waiting for it.
    ///
    /// Must be called within a tokio runtime. The dispatch outcome is only
    /// visible through [`stats`](Self::stats) and local logs.
    pub fn dispatch(&self, report: RejectionReport) {
        self.counters.dispatched.fetch_add(1, Ordering::SeqCst);

        let backend = Arc::clone(&self.backend);
        let counters = Arc::clone(&self.counters);
        let handle = tokio::spawn(async move {
            match backend.log_rejection(&report).await {
                Ok(()) => {
                    counters.delivered.fetch_add(1, Ordering::SeqCst);
                }
                Err(err) => {
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    warn!(error = %err, "Rejection log call failed");
                }
            }
        });

        let mut inflight = self
            .inflight
            .lock()
            .expect("side-channel task list poisoned");
        // Drop finished handles so the list stays bounded.
        inflight.retain(|h| !h.is_finished());
        inflight.push(handle);
    }

    /// Await all in-flight dispatches (tests, shutdown).
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut inflight = self
                .inflight
                .lock()
                .expect("side-channel task list poisoned");
            inflight.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Current dispatch counters.
    pub fn stats(&self) -> SideChannelStats {
        SideChannelStats {
            dispatched: self.counters.dispatched.load(Ordering::SeqCst),
            delivered: self.counters.delivered.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}
