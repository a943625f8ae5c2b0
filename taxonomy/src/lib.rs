//! Emotion Taxonomy for the Candles Map
//!
//! This crate implements the three-level emotion tree behind the picker and
//! the charts:
//!
//! - **Main**: top-level category used for coloring and coarse aggregation
//! - **Mid**: thematic cluster under a main emotion
//! - **Leaf**: the specific emotion assigned to a candle
//!
//! # Key Components
//!
//! - [`EmotionTaxonomy`]: the assembled tree with O(1) name resolution
//! - [`Breadcrumb`]: typed ancestry of any emotion name
//! - [`EmotionPalette`]: static color table keyed by main emotion
//!
//! # Example
//!
//! ```
//! use taxonomy::EmotionTaxonomy;
//!
//! let tree = EmotionTaxonomy::default();
//! assert_eq!(tree.resolve_parent("sorrow"), "sad");
//! assert_eq!(tree.resolve_breadcrumb("sorrow"), "sad > grief > sorrow");
//! ```

pub mod defaults;
pub mod palette;
pub mod tree;
pub mod types;

// Re-export main types
pub use defaults::default_wheel;
pub use palette::{EmotionPalette, FALLBACK_COLOR};
pub use tree::EmotionTaxonomy;
pub use types::{Breadcrumb, MainEmotion, MidCategory, TaxonomyError};
