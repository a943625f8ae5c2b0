//! CandlesClient - main entry point for the client core.
//!
//! Owns the backend, the anonymous session, the local candle collection, and
//! the rejection side channel, and wires creation flows over them.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use taxonomy::EmotionTaxonomy;

use crate::backend::traits::{BackendError, CandleBackend};
use crate::candle::Candle;
use crate::collection::CandleCollection;
use crate::config::ClientConfig;
use crate::flow::CandleFlow;
use crate::session::Session;
use crate::sidechannel::{RejectionReporter, SideChannelStats};

/// Error types for the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No session has been issued - call initialize() first
    #[error("Client not initialized - call initialize() first")]
    NotInitialized,

    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Main entry point for the Candles client core.
pub struct CandlesClient {
    config: ClientConfig,
    taxonomy: Arc<EmotionTaxonomy>,
    backend: Arc<dyn CandleBackend>,
    collection: Arc<CandleCollection>,
    reporter: Arc<RejectionReporter>,
    session: RwLock<Option<Session>>,
}

impl CandlesClient {
    /// Create a client over the given backend with the default taxonomy.
    pub fn new(backend: Arc<dyn CandleBackend>) -> Self {
        Self {
            config: ClientConfig::default(),
            taxonomy: Arc::new(EmotionTaxonomy::default()),
            collection: Arc::new(CandleCollection::new()),
            reporter: Arc::new(RejectionReporter::new(backend.clone())),
            backend,
            session: RwLock::new(None),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the taxonomy.
    pub fn with_taxonomy(mut self, taxonomy: EmotionTaxonomy) -> Self {
        self.taxonomy = Arc::new(taxonomy);
        self
    }

    /// The client's taxonomy.
    pub fn taxonomy(&self) -> &Arc<EmotionTaxonomy> {
        &self.taxonomy
    }

    /// Issue the anonymous session and perform the initial full load.
    ///
    /// The optional challenge token comes from the human-verification widget
    /// and is consumed once by session issuance.
    pub async fn initialize(&self, challenge: Option<&str>) -> Result<(), ClientError> {
        info!(client_id = %self.config.client_id, backend = %self.backend.id(), "Initializing candles client");

        let session = self.backend.issue_session(challenge).await?;
        {
            let mut guard = self.session.write().await;
            *guard = Some(session);
        }

        let loaded = self.refresh().await?;
        info!(candles = loaded, "Candles client initialized");
        Ok(())
    }

    /// Whether a session has been issued.
    pub async fn is_initialized(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// The current session, re-issued when it approaches expiry.
    pub async fn ensure_session(&self) -> Result<Session, ClientError> {
        {
            let guard = self.session.read().await;
            match guard.as_ref() {
                Some(session) if !session.expires_within(self.config.session_margin()) => {
                    return Ok(session.clone());
                }
                Some(_) => {}
                None => return Err(ClientError::NotInitialized),
            }
        }

        // Renewal does not repeat the human-verification challenge.
        debug!("Session expiring, re-issuing");
        let fresh = self.backend.issue_session(None).await?;
        let mut guard = self.session.write().await;
        *guard = Some(fresh.clone());
        Ok(fresh)
    }

    /// Replace the local collection with a full reload. Returns the count.
    pub async fn refresh(&self) -> Result<usize, ClientError> {
        let candles = self.backend.list_candles().await?;
        let count = candles.len();
        self.collection.replace_all(candles);
        debug!(count, "Candle collection reloaded");
        Ok(count)
    }

    /// Wire a new creation flow over the shared parts.
    pub fn new_flow(&self) -> CandleFlow {
        CandleFlow::new(
            self.taxonomy.clone(),
            self.backend.clone(),
            self.collection.clone(),
            self.reporter.clone(),
            self.config.hold_duration(),
        )
        .with_rejection_reporting(self.config.report_rejections)
    }

    /// Delete an owned candle and drop it from the local collection.
    ///
    /// Ownership is enforced by the backend; the collection is only touched
    /// after the backend confirms.
    pub async fn delete_candle(&self, id: &str) -> Result<(), ClientError> {
        let session = self.ensure_session().await?;
        self.backend.delete_candle(&session, id).await?;
        self.collection.remove(id);
        debug!(id, "Candle deleted");
        Ok(())
    }

    /// Snapshot of the local candle collection.
    pub fn candles(&self) -> Vec<Candle> {
        self.collection.snapshot()
    }

    /// Number of candles held locally.
    pub fn candle_count(&self) -> usize {
        self.collection.len()
    }

    /// The shared collection (for aggregation snapshots).
    pub fn collection(&self) -> &Arc<CandleCollection> {
        &self.collection
    }

    /// Counters from the rejection side channel.
    pub fn side_channel_stats(&self) -> SideChannelStats {
        self.reporter.stats()
    }
}
