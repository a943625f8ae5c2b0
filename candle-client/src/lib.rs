//! Candles Client Core
//!
//! Provides the client-side core of the Candles map:
//! - Trait-based persistence backends (hosted REST, mock)
//! - Explicit anonymous session identity with re-issuance on expiry
//! - The candle creation state machine (select → place → hold → submit)
//! - A local candle collection cache and a best-effort rejection side channel
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             CandlesClient               │
//! │   (session, collection, side channel)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ CandleFlow  │       │CandleBackend│
//! │ (creation   │       │ (REST /     │
//! │  steps)     │       │  mock)      │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod candle;
pub mod client;
pub mod collection;
pub mod config;
pub mod draft;
pub mod flow;
pub mod session;
pub mod sidechannel;
pub mod stream;

// Re-export main types for convenience
pub use backend::traits::{BackendError, CandleBackend};
pub use candle::{Candle, NewCandle, Position, MAX_LATITUDE};
pub use client::{CandlesClient, ClientError};
pub use collection::CandleCollection;
pub use config::ClientConfig;
pub use draft::{CreationDraft, HoldToConfirm};
pub use flow::{CandleFlow, FlowError, FlowState, SubmitOutcome};
pub use session::Session;
pub use sidechannel::{RejectionReport, RejectionReporter, SideChannelStats};
pub use stream::{CandleBatch, CandleStream};
