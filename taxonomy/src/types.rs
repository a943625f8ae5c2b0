//! Core types for the emotion taxonomy.
//!
//! The taxonomy is a fixed three-level tree: main emotion → mid-category → leaf
//! emotion. It is loaded once at startup and immutable for the process lifetime.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for consistency with the web frontend.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A top-level emotion category with its mid-level subdivisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MainEmotion {
    /// Main emotion name (e.g. "sad")
    pub name: String,
    /// Mid-level categories nested under this main emotion
    pub mids: Vec<MidCategory>,
}

impl MainEmotion {
    /// Create a main emotion from a name and (mid, leaves) pairs.
    pub fn new<S, M, L>(name: S, mids: M) -> Self
    where
        S: Into<String>,
        M: IntoIterator<Item = (&'static str, L)>,
        L: IntoIterator<Item = &'static str>,
    {
        Self {
            name: name.into(),
            mids: mids
                .into_iter()
                .map(|(mid, leaves)| MidCategory {
                    name: mid.to_string(),
                    leaves: leaves.into_iter().map(String::from).collect(),
                })
                .collect(),
        }
    }
}

/// A mid-level category holding the leaf emotions directly assignable to candles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MidCategory {
    /// Mid-category name (e.g. "grief")
    pub name: String,
    /// Ordered leaf emotion names
    pub leaves: Vec<String>,
}

/// Resolution of an emotion string against the taxonomy.
///
/// Unknown names are carried through unchanged rather than rejected: an emotion
/// the tree does not know acts as its own singleton bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case", tag = "level")]
pub enum Breadcrumb {
    /// The name is a main emotion
    Main { main: String },
    /// The name is a mid-category
    Mid { main: String, mid: String },
    /// The name is a leaf emotion
    Leaf {
        main: String,
        mid: String,
        leaf: String,
    },
    /// The name does not appear anywhere in the tree
    Unknown { name: String },
}

impl Breadcrumb {
    /// The main-level ancestor, or the raw name when unknown.
    pub fn parent(&self) -> &str {
        match self {
            Self::Main { main } | Self::Mid { main, .. } | Self::Leaf { main, .. } => main,
            Self::Unknown { name } => name,
        }
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main { main } => write!(f, "{}", main),
            Self::Mid { main, mid } => write!(f, "{} > {}", main, mid),
            Self::Leaf { main, mid, leaf } => write!(f, "{} > {} > {}", main, mid, leaf),
            Self::Unknown { name } => write!(f, "{}", name),
        }
    }
}

/// Error types for taxonomy construction.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// The tree has no main emotions
    #[error("Taxonomy is empty")]
    Empty,

    /// A main emotion name appears twice
    #[error("Duplicate main emotion: {0}")]
    DuplicateMain(String),

    /// A mid-category name appears twice across the mid level
    #[error("Duplicate mid-category: {0}")]
    DuplicateMid(String),

    /// A leaf emotion appears under two different mid-categories
    #[error("Duplicate leaf emotion: {0}")]
    DuplicateLeaf(String),

    /// The tree file could not be parsed
    #[error("Failed to parse taxonomy: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_display() {
        let leaf = Breadcrumb::Leaf {
            main: "sad".to_string(),
            mid: "grief-cluster".to_string(),
            leaf: "lonely".to_string(),
        };
        assert_eq!(leaf.to_string(), "sad > grief-cluster > lonely");

        let unknown = Breadcrumb::Unknown {
            name: "wistful".to_string(),
        };
        assert_eq!(unknown.to_string(), "wistful");
        assert_eq!(unknown.parent(), "wistful");
    }

    #[test]
    fn test_breadcrumb_parent() {
        let mid = Breadcrumb::Mid {
            main: "happy".to_string(),
            mid: "playful".to_string(),
        };
        assert_eq!(mid.parent(), "happy");
    }
}
