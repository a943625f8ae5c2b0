//! Taxonomy assembly and resolution.
//!
//! The tree is assembled once, validated, and indexed for O(1) lookups. All
//! resolution operations are pure and never fail: names the tree does not know
//! resolve to themselves.

use std::collections::HashMap;

use crate::types::{Breadcrumb, MainEmotion, MidCategory, TaxonomyError};

/// The assembled emotion taxonomy.
///
/// Holds the ordered tree plus flattened lookup indices built at construction.
/// Name resolution checks main, then mid, then leaf: when a name is reused
/// across levels, the shallowest match wins.
#[derive(Debug, Clone)]
pub struct EmotionTaxonomy {
    /// Main emotions in definition order
    mains: Vec<MainEmotion>,
    /// main name → index into `mains`
    main_index: HashMap<String, usize>,
    /// mid name → (main index, mid index)
    mid_index: HashMap<String, (usize, usize)>,
    /// leaf name → (main index, mid index)
    leaf_index: HashMap<String, (usize, usize)>,
}

impl EmotionTaxonomy {
    /// Build a taxonomy from main emotions, validating level uniqueness.
    ///
    /// Every main name must be unique, every mid name unique across the mid
    /// level, and every leaf unique across the whole tree.
    pub fn new(mains: Vec<MainEmotion>) -> Result<Self, TaxonomyError> {
        if mains.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        let mut main_index = HashMap::new();
        let mut mid_index = HashMap::new();
        let mut leaf_index = HashMap::new();

        for (mi, main) in mains.iter().enumerate() {
            if main_index.insert(main.name.clone(), mi).is_some() {
                return Err(TaxonomyError::DuplicateMain(main.name.clone()));
            }
            for (ci, mid) in main.mids.iter().enumerate() {
                if mid_index.insert(mid.name.clone(), (mi, ci)).is_some() {
                    return Err(TaxonomyError::DuplicateMid(mid.name.clone()));
                }
                for leaf in &mid.leaves {
                    if leaf_index.insert(leaf.clone(), (mi, ci)).is_some() {
                        return Err(TaxonomyError::DuplicateLeaf(leaf.clone()));
                    }
                }
            }
        }

        tracing::debug!(
            mains = mains.len(),
            mids = mid_index.len(),
            leaves = leaf_index.len(),
            "Assembled emotion taxonomy"
        );

        Ok(Self {
            mains,
            main_index,
            mid_index,
            leaf_index,
        })
    }

    /// Load a taxonomy from a YAML document (a sequence of main emotions).
    pub fn from_yaml(yaml: &str) -> Result<Self, TaxonomyError> {
        let mains: Vec<MainEmotion> = serde_yaml::from_str(yaml)?;
        Self::new(mains)
    }

    /// Serialize the tree to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.mains)
    }

    /// Resolve the main-level ancestor of any emotion name.
    ///
    /// A main name resolves to itself; an unknown name also resolves to
    /// itself and acts as its own bucket. Never fails.
    pub fn resolve_parent<'a>(&'a self, emotion: &'a str) -> &'a str {
        if let Some(&mi) = self.main_index.get(emotion) {
            return &self.mains[mi].name;
        }
        if let Some(&(mi, _)) = self.mid_index.get(emotion) {
            return &self.mains[mi].name;
        }
        if let Some(&(mi, _)) = self.leaf_index.get(emotion) {
            return &self.mains[mi].name;
        }
        emotion
    }

    /// Resolve the full ancestry of an emotion name.
    pub fn breadcrumb(&self, emotion: &str) -> Breadcrumb {
        if self.main_index.contains_key(emotion) {
            return Breadcrumb::Main {
                main: emotion.to_string(),
            };
        }
        if let Some(&(mi, _)) = self.mid_index.get(emotion) {
            return Breadcrumb::Mid {
                main: self.mains[mi].name.clone(),
                mid: emotion.to_string(),
            };
        }
        if let Some(&(mi, ci)) = self.leaf_index.get(emotion) {
            return Breadcrumb::Leaf {
                main: self.mains[mi].name.clone(),
                mid: self.mains[mi].mids[ci].name.clone(),
                leaf: emotion.to_string(),
            };
        }
        Breadcrumb::Unknown {
            name: emotion.to_string(),
        }
    }

    /// Resolve the breadcrumb path as a display string ("main > mid > leaf").
    pub fn resolve_breadcrumb(&self, emotion: &str) -> String {
        self.breadcrumb(emotion).to_string()
    }

    /// All main emotion names, in definition order.
    pub fn mains(&self) -> impl Iterator<Item = &str> {
        self.mains.iter().map(|m| m.name.as_str())
    }

    /// Mid-category names under a main emotion, in definition order.
    pub fn mids_of(&self, main: &str) -> &[MidCategory] {
        self.main_index
            .get(main)
            .map(|&mi| self.mains[mi].mids.as_slice())
            .unwrap_or(&[])
    }

    /// Leaf names under a (main, mid) pair, in definition order.
    pub fn leaves_of(&self, main: &str, mid: &str) -> &[String] {
        match (self.main_index.get(main), self.mid_index.get(mid)) {
            (Some(&mi), Some(&(owner, ci))) if owner == mi => {
                self.mains[mi].mids[ci].leaves.as_slice()
            }
            _ => &[],
        }
    }

    /// Whether the name is a main emotion.
    pub fn contains_main(&self, name: &str) -> bool {
        self.main_index.contains_key(name)
    }

    /// Whether the name is a leaf emotion anywhere in the tree.
    pub fn contains_leaf(&self, name: &str) -> bool {
        self.leaf_index.contains_key(name)
    }

    /// Number of leaf emotions across the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_index.len()
    }
}
