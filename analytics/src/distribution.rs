//! Per-parent emotion counts.
//!
//! Backs the distribution bar chart: each candle resolves to its main-level
//! ancestor and increments that bucket. Candles without an emotion are
//! skipped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use candle_client::Candle;
use taxonomy::EmotionTaxonomy;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One parent bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ParentCount {
    /// Main emotion name
    pub parent: String,
    /// Candles under it
    pub count: u64,
}

/// Parent counts for the whole collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ParentDistribution {
    /// Buckets, descending by count; ties keep first-appearance order
    pub entries: Vec<ParentCount>,
    /// Total counted candles
    pub total: u64,
    /// Largest bucket (bar-width normalization)
    pub max: u64,
}

impl ParentDistribution {
    /// Count for a parent, zero when absent.
    pub fn count_of(&self, parent: &str) -> u64 {
        self.entries
            .iter()
            .find(|e| e.parent == parent)
            .map(|e| e.count)
            .unwrap_or(0)
    }
}

/// Count candles per resolved parent emotion.
///
/// Ordering: descending by count; ties keep the order in which a parent first
/// appeared in the input. The sort is stable, so the tie rule holds for any
/// input.
pub fn parent_distribution(candles: &[Candle], taxonomy: &EmotionTaxonomy) -> ParentDistribution {
    let mut entries: Vec<ParentCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total = 0u64;

    for candle in candles {
        let Some(emotion) = candle.emotion_name() else {
            continue;
        };
        let parent = taxonomy.resolve_parent(emotion);

        let i = *index.entry(parent.to_string()).or_insert_with(|| {
            entries.push(ParentCount {
                parent: parent.to_string(),
                count: 0,
            });
            entries.len() - 1
        });
        entries[i].count += 1;
        total += 1;
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    let max = entries.first().map(|e| e.count).unwrap_or(0);

    ParentDistribution {
        entries,
        total,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::candle_with_emotion;

    #[test]
    fn test_counts_resolve_to_parents() {
        let taxonomy = EmotionTaxonomy::default();
        let candles = vec![
            candle_with_emotion("sorrow"),
            candle_with_emotion("mourning"),
            candle_with_emotion("annoyed"),
        ];

        let dist = parent_distribution(&candles, &taxonomy);
        assert_eq!(dist.total, 3);
        assert_eq!(dist.count_of("sad"), 2);
        assert_eq!(dist.count_of("angry"), 1);
        assert_eq!(dist.max, 2);
        assert_eq!(dist.entries[0].parent, "sad");
    }

    #[test]
    fn test_missing_emotions_are_skipped() {
        let taxonomy = EmotionTaxonomy::default();
        let mut blank = candle_with_emotion("sorrow");
        blank.emotion = None;
        let mut empty = candle_with_emotion("sorrow");
        empty.emotion = Some("  ".to_string());

        let dist = parent_distribution(
            &[blank, empty, candle_with_emotion("awe")],
            &taxonomy,
        );
        assert_eq!(dist.total, 1);
        assert_eq!(dist.entries.len(), 1);
    }

    #[test]
    fn test_unknown_emotion_is_its_own_bucket() {
        let taxonomy = EmotionTaxonomy::default();
        let dist = parent_distribution(&[candle_with_emotion("wistful")], &taxonomy);
        assert_eq!(dist.count_of("wistful"), 1);
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let taxonomy = EmotionTaxonomy::default();
        let candles = vec![
            candle_with_emotion("awe"),     // surprised, appears first
            candle_with_emotion("sorrow"),  // sad
            candle_with_emotion("annoyed"), // angry
            candle_with_emotion("sorrow"),  // sad pulls ahead
        ];

        let dist = parent_distribution(&candles, &taxonomy);
        let parents: Vec<&str> = dist.entries.iter().map(|e| e.parent.as_str()).collect();
        assert_eq!(parents, vec!["sad", "surprised", "angry"]);
    }
}
