//! Time-of-day aggregation.
//!
//! Backs the 100%-stacked chart: each candle's local hour maps to one of four
//! fixed dayparts, counted per (daypart, parent emotion).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use candle_client::Candle;
use taxonomy::EmotionTaxonomy;

use crate::time::local_hour;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// The four fixed local-time buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Daypart {
    /// 00:00–04:59
    LateNight,
    /// 05:00–11:59
    Morning,
    /// 12:00–16:59
    Afternoon,
    /// 17:00–23:59
    Evening,
}

impl Daypart {
    /// All dayparts in display order.
    pub const ALL: [Daypart; 4] = [
        Daypart::LateNight,
        Daypart::Morning,
        Daypart::Afternoon,
        Daypart::Evening,
    ];

    /// Bucket an hour of day (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=4 => Self::LateNight,
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LateNight => "Late night",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::LateNight => 0,
            Self::Morning => 1,
            Self::Afternoon => 2,
            Self::Evening => 3,
        }
    }
}

/// One daypart's counts, aligned with the distribution's parent order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct DaypartRow {
    /// Which bucket this row is
    pub daypart: Daypart,
    /// Candles in this bucket
    pub total: u64,
    /// Counts per parent, aligned with `DaypartDistribution::parents`
    pub counts: Vec<u64>,
}

impl DaypartRow {
    /// Per-parent shares of this bucket (the 100%-stacked normalization).
    ///
    /// An empty bucket yields all zeros.
    pub fn shares(&self) -> Vec<f64> {
        if self.total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / self.total as f64)
            .collect()
    }
}

/// Counts per (daypart, parent emotion).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct DaypartDistribution {
    /// Parents ordered by overall total descending (ties first-seen)
    pub parents: Vec<String>,
    /// One row per daypart, in display order
    pub rows: Vec<DaypartRow>,
}

impl DaypartDistribution {
    /// Count for a (daypart, parent) pair.
    pub fn count_of(&self, daypart: Daypart, parent: &str) -> u64 {
        let Some(pi) = self.parents.iter().position(|p| p == parent) else {
            return 0;
        };
        self.rows[daypart.index()].counts[pi]
    }

    /// Candles counted across all dayparts.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.total).sum()
    }
}

/// Aggregate candles by daypart and parent emotion.
///
/// Candles without an emotion or without a parseable timestamp are skipped.
pub fn daypart_distribution(candles: &[Candle], taxonomy: &EmotionTaxonomy) -> DaypartDistribution {
    let mut parents: Vec<String> = Vec::new();
    let mut parent_index: HashMap<String, usize> = HashMap::new();
    // counts[parent][daypart]
    let mut counts: Vec<[u64; 4]> = Vec::new();
    let mut totals = [0u64; 4];

    for candle in candles {
        let Some(emotion) = candle.emotion_name() else {
            continue;
        };
        let Some(hour) = local_hour(candle) else {
            continue;
        };
        let daypart = Daypart::from_hour(hour);
        let parent = taxonomy.resolve_parent(emotion);

        let pi = *parent_index.entry(parent.to_string()).or_insert_with(|| {
            parents.push(parent.to_string());
            counts.push([0; 4]);
            counts.len() - 1
        });
        counts[pi][daypart.index()] += 1;
        totals[daypart.index()] += 1;
    }

    // Order parents by overall total descending; stable, ties first-seen.
    let mut order: Vec<usize> = (0..parents.len()).collect();
    order.sort_by(|&a, &b| {
        let total_a: u64 = counts[a].iter().sum();
        let total_b: u64 = counts[b].iter().sum();
        total_b.cmp(&total_a)
    });

    let ordered_parents: Vec<String> = order.iter().map(|&i| parents[i].clone()).collect();
    let rows = Daypart::ALL
        .iter()
        .map(|&daypart| DaypartRow {
            daypart,
            total: totals[daypart.index()],
            counts: order.iter().map(|&i| counts[i][daypart.index()]).collect(),
        })
        .collect();

    DaypartDistribution {
        parents: ordered_parents,
        rows,
    }
}
