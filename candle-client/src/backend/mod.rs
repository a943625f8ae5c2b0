//! Persistence backend abstraction layer.
//!
//! Provides a trait-based interface over the hosted persistence/auth service:
//! - Supabase-style REST (PostgREST + GoTrue)
//! - Mock backend for testing

pub mod mock;
pub mod supabase;
pub mod traits;

pub use mock::{FailureMode, MockBackend};
pub use supabase::{SupabaseBackend, DEFAULT_PAGE_SIZE};
pub use traits::{BackendError, CandleBackend};
