//! Mock persistence backend for testing.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use super::traits::*;
use crate::candle::{Candle, NewCandle};
use crate::session::Session;
use crate::sidechannel::RejectionReport;

/// How the mock should fail candle creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Succeed
    #[default]
    None,
    /// Reject with a rate-limit error
    RateLimited,
    /// Reject with a generic failure
    RequestFailed,
    /// Reject as unavailable
    Unavailable,
}

impl FailureMode {
    fn to_error(self) -> Option<BackendError> {
        match self {
            Self::None => None,
            Self::RateLimited => Some(BackendError::RateLimited {
                retry_after_ms: Some(30_000),
            }),
            Self::RequestFailed => Some(BackendError::RequestFailed(
                "Mock create failure".to_string(),
            )),
            Self::Unavailable => Some(BackendError::Unavailable("Mock backend down".to_string())),
        }
    }
}

/// Mock backend for testing.
///
/// Seeded candles, per-operation call counters, and a configurable failure
/// mode for the create path.
pub struct MockBackend {
    backend_id: String,
    available: AtomicBool,
    candles: Mutex<Vec<Candle>>,
    create_failure: Mutex<FailureMode>,
    log_failure: AtomicBool,
    rejections: Mutex<Vec<RejectionReport>>,
    list_calls: AtomicU32,
    create_calls: AtomicU32,
    delete_calls: AtomicU32,
    log_calls: AtomicU32,
    session_counter: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(backend_id: impl Into<String>) -> Self {
        Self {
            backend_id: backend_id.into(),
            available: AtomicBool::new(true),
            candles: Mutex::new(Vec::new()),
            create_failure: Mutex::new(FailureMode::None),
            log_failure: AtomicBool::new(false),
            rejections: Mutex::new(Vec::new()),
            list_calls: AtomicU32::new(0),
            create_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
            log_calls: AtomicU32::new(0),
            session_counter: AtomicU32::new(0),
        }
    }

    /// Seed the backend with existing candles.
    pub fn with_seeded(self, candles: Vec<Candle>) -> Self {
        *self.candles.lock().expect("mock candles poisoned") = candles;
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Set the failure mode for candle creation.
    pub fn with_create_failure(self, mode: FailureMode) -> Self {
        self.set_create_failure(mode);
        self
    }

    /// Make rejection logging fail.
    pub fn with_log_failure(self, fail: bool) -> Self {
        self.log_failure.store(fail, Ordering::SeqCst);
        self
    }

    /// Change the create failure mode at runtime.
    pub fn set_create_failure(&self, mode: FailureMode) {
        *self
            .create_failure
            .lock()
            .expect("mock failure mode poisoned") = mode;
    }

    /// Number of list calls seen.
    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of create calls seen.
    pub fn create_calls(&self) -> u32 {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of delete calls seen.
    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Number of rejection-log calls seen.
    pub fn log_calls(&self) -> u32 {
        self.log_calls.load(Ordering::SeqCst)
    }

    /// Rejection reports accepted so far.
    pub fn rejection_reports(&self) -> Vec<RejectionReport> {
        self.rejections
            .lock()
            .expect("mock rejections poisoned")
            .clone()
    }

    /// Current backend contents.
    pub fn stored_candles(&self) -> Vec<Candle> {
        self.candles.lock().expect("mock candles poisoned").clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-backend")
    }
}

#[async_trait]
impl CandleBackend for MockBackend {
    fn id(&self) -> &str {
        &self.backend_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn issue_session(&self, _challenge: Option<&str>) -> Result<Session, BackendError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("Mock backend down".to_string()));
        }
        let n = self.session_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Session {
            user_id: format!("anon-{}", n),
            access_token: uuid::Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }

    async fn list_candles(&self) -> Result<Vec<Candle>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("Mock backend down".to_string()));
        }
        Ok(self.stored_candles())
    }

    async fn create_candle(
        &self,
        session: &Session,
        candle: &NewCandle,
    ) -> Result<Candle, BackendError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mode = *self
            .create_failure
            .lock()
            .expect("mock failure mode poisoned");
        if let Some(err) = mode.to_error() {
            return Err(err);
        }

        let created = Candle {
            id: uuid::Uuid::new_v4().to_string(),
            position: candle.position,
            emotion: Some(candle.emotion.clone()),
            created_at: Some(Utc::now()),
            user_timestamp: Some(candle.user_timestamp.clone()),
            user_id: Some(session.user_id.clone()),
        };
        self.candles
            .lock()
            .expect("mock candles poisoned")
            .push(created.clone());
        Ok(created)
    }

    async fn delete_candle(&self, session: &Session, id: &str) -> Result<(), BackendError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        let mut candles = self.candles.lock().expect("mock candles poisoned");
        let Some(index) = candles.iter().position(|c| c.id == id) else {
            return Err(BackendError::RequestFailed(format!(
                "No candle with id {}",
                id
            )));
        };
        if candles[index].user_id.as_deref() != Some(session.user_id.as_str()) {
            return Err(BackendError::NotOwner(id.to_string()));
        }
        candles.remove(index);
        Ok(())
    }

    async fn log_rejection(&self, report: &RejectionReport) -> Result<(), BackendError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        if self.log_failure.load(Ordering::SeqCst) {
            return Err(BackendError::RequestFailed(
                "Mock rejection log failure".to_string(),
            ));
        }
        self.rejections
            .lock()
            .expect("mock rejections poisoned")
            .push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candle::Position;

    #[tokio::test]
    async fn test_create_and_delete_round_trip() {
        let backend = MockBackend::default();
        let session = backend.issue_session(None).await.unwrap();

        let created = backend
            .create_candle(
                &session,
                &NewCandle::new("lonely", Position::new(10.0, 20.0).unwrap()),
            )
            .await
            .unwrap();

        assert_eq!(backend.create_calls(), 1);
        assert_eq!(created.user_id.as_deref(), Some(session.user_id.as_str()));

        backend.delete_candle(&session, &created.id).await.unwrap();
        assert!(backend.stored_candles().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let backend = MockBackend::default();
        let owner = backend.issue_session(None).await.unwrap();
        let stranger = backend.issue_session(None).await.unwrap();

        let created = backend
            .create_candle(
                &owner,
                &NewCandle::new("awe", Position::new(0.0, 0.0).unwrap()),
            )
            .await
            .unwrap();

        let result = backend.delete_candle(&stranger, &created.id).await;
        assert!(matches!(result, Err(BackendError::NotOwner(_))));
        assert_eq!(backend.stored_candles().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_failure_mode() {
        let backend = MockBackend::default().with_create_failure(FailureMode::RateLimited);
        let session = backend.issue_session(None).await.unwrap();

        let result = backend
            .create_candle(
                &session,
                &NewCandle::new("lonely", Position::new(0.0, 0.0).unwrap()),
            )
            .await;

        assert!(matches!(result, Err(ref err) if err.is_rate_limit()));
        assert!(backend.stored_candles().is_empty());
    }
}
