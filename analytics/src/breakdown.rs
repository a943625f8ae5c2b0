//! Three-level emotion breakdown.
//!
//! Backs the three-ring donut: parent totals, mid totals nested under their
//! parent, and leaf totals nested under (parent, mid). The outer rings iterate
//! parents in the same order as the inner ring so nested segments align with
//! their ancestor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use candle_client::Candle;
use taxonomy::{Breadcrumb, EmotionTaxonomy};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Mid bucket for emotions with no resolvable mid-ancestor.
pub const SYNTHETIC_MID: &str = "other";

/// A leaf-ring segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LeafSegment {
    pub name: String,
    pub count: u64,
}

/// A mid-ring segment with its leaf segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MidSegment {
    pub name: String,
    pub count: u64,
    /// Leaf segments, descending by count
    pub leaves: Vec<LeafSegment>,
}

/// An inner-ring segment with its mid segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ParentSegment {
    pub name: String,
    pub count: u64,
    /// Mid segments, descending by count
    pub mids: Vec<MidSegment>,
}

/// The full three-ring breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EmotionBreakdown {
    /// Candles counted (non-empty emotion)
    pub total: u64,
    /// Parent segments, descending by count
    pub parents: Vec<ParentSegment>,
}

/// Reference to a ring segment for click inspection.
#[derive(Debug, Clone, Copy)]
pub enum SegmentRef<'a> {
    Parent(&'a str),
    Mid { parent: &'a str, mid: &'a str },
    Leaf {
        parent: &'a str,
        mid: &'a str,
        leaf: &'a str,
    },
}

/// What a clicked segment means, relative to its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SegmentInfo {
    /// Breadcrumb path ("parent > mid > leaf")
    pub path: String,
    /// Candles in this segment
    pub count: u64,
    /// Share of all counted candles, rounded percent
    pub pct_of_total: u32,
    /// Share of the parent segment (mid and leaf segments)
    pub pct_of_parent: Option<u32>,
    /// Share of the mid segment (leaf segments only)
    pub pct_of_mid: Option<u32>,
}

impl EmotionBreakdown {
    /// Mid-ring segments flattened in inner-ring parent order.
    pub fn mid_ring(&self) -> impl Iterator<Item = (&str, &MidSegment)> {
        self.parents
            .iter()
            .flat_map(|p| p.mids.iter().map(move |m| (p.name.as_str(), m)))
    }

    /// Leaf-ring segments flattened in inner-ring parent and mid order.
    pub fn leaf_ring(&self) -> impl Iterator<Item = (&str, &str, &LeafSegment)> {
        self.parents.iter().flat_map(|p| {
            p.mids.iter().flat_map(move |m| {
                m.leaves
                    .iter()
                    .map(move |l| (p.name.as_str(), m.name.as_str(), l))
            })
        })
    }

    /// Inspect a clicked segment.
    pub fn segment_info(&self, segment: SegmentRef<'_>) -> Option<SegmentInfo> {
        match segment {
            SegmentRef::Parent(name) => {
                let parent = self.parents.iter().find(|p| p.name == name)?;
                Some(SegmentInfo {
                    path: parent.name.clone(),
                    count: parent.count,
                    pct_of_total: pct(parent.count, self.total),
                    pct_of_parent: None,
                    pct_of_mid: None,
                })
            }
            SegmentRef::Mid { parent, mid } => {
                let parent = self.parents.iter().find(|p| p.name == parent)?;
                let mid = parent.mids.iter().find(|m| m.name == mid)?;
                Some(SegmentInfo {
                    path: format!("{} > {}", parent.name, mid.name),
                    count: mid.count,
                    pct_of_total: pct(mid.count, self.total),
                    pct_of_parent: Some(pct(mid.count, parent.count)),
                    pct_of_mid: None,
                })
            }
            SegmentRef::Leaf { parent, mid, leaf } => {
                let parent = self.parents.iter().find(|p| p.name == parent)?;
                let mid = parent.mids.iter().find(|m| m.name == mid)?;
                let leaf = mid.leaves.iter().find(|l| l.name == leaf)?;
                Some(SegmentInfo {
                    path: format!("{} > {} > {}", parent.name, mid.name, leaf.name),
                    count: leaf.count,
                    pct_of_total: pct(leaf.count, self.total),
                    pct_of_parent: Some(pct(leaf.count, parent.count)),
                    pct_of_mid: Some(pct(leaf.count, mid.count)),
                })
            }
        }
    }
}

fn pct(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

/// Build the three-ring breakdown in one pass.
///
/// Each counted candle contributes exactly one (parent, mid, leaf) triple:
/// the declared leaf's ancestry when resolvable, the synthetic `"other"` mid
/// when not, and an own-name parent for unknown emotions. That keeps the ring
/// sums exact: mids under a parent total the parent; leaves under a mid total
/// the mid.
pub fn emotion_breakdown(candles: &[Candle], taxonomy: &EmotionTaxonomy) -> EmotionBreakdown {
    let mut parents: Vec<ParentSegment> = Vec::new();
    let mut parent_index: HashMap<String, usize> = HashMap::new();
    let mut total = 0u64;

    for candle in candles {
        let Some(emotion) = candle.emotion_name() else {
            continue;
        };

        let (parent, mid) = match taxonomy.breadcrumb(emotion) {
            Breadcrumb::Leaf { main, mid, .. } => (main, mid),
            Breadcrumb::Mid { main, mid } => (main, mid),
            Breadcrumb::Main { main } => (main, SYNTHETIC_MID.to_string()),
            Breadcrumb::Unknown { name } => (name, SYNTHETIC_MID.to_string()),
        };

        total += 1;

        let pi = *parent_index.entry(parent.clone()).or_insert_with(|| {
            parents.push(ParentSegment {
                name: parent.clone(),
                count: 0,
                mids: Vec::new(),
            });
            parents.len() - 1
        });
        let parent_segment = &mut parents[pi];
        parent_segment.count += 1;

        let mi = match parent_segment.mids.iter().position(|m| m.name == mid) {
            Some(i) => i,
            None => {
                parent_segment.mids.push(MidSegment {
                    name: mid,
                    count: 0,
                    leaves: Vec::new(),
                });
                parent_segment.mids.len() - 1
            }
        };
        let mid_segment = &mut parent_segment.mids[mi];
        mid_segment.count += 1;

        match mid_segment.leaves.iter_mut().find(|l| l.name == emotion) {
            Some(leaf) => leaf.count += 1,
            None => mid_segment.leaves.push(LeafSegment {
                name: emotion.to_string(),
                count: 1,
            }),
        }
    }

    // Descending by count at every ring; stable, so ties keep first-seen order.
    for parent in &mut parents {
        for mid in &mut parent.mids {
            mid.leaves.sort_by(|a, b| b.count.cmp(&a.count));
        }
        parent.mids.sort_by(|a, b| b.count.cmp(&a.count));
    }
    parents.sort_by(|a, b| b.count.cmp(&a.count));

    EmotionBreakdown { total, parents }
}
