//! Weekday × emotion heatmap aggregation.
//!
//! One cell per (parent emotion, weekday), plus per-day totals and the running
//! maximum cell count used externally for color-scale normalization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use candle_client::Candle;
use taxonomy::EmotionTaxonomy;

use crate::time::weekday_index;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Column labels, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One parent emotion's weekday cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct HeatmapRow {
    /// Main emotion name
    pub parent: String,
    /// Counts per weekday, Monday = 0 … Sunday = 6
    pub cells: [u64; 7],
}

/// The assembled heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct WeekdayHeatmap {
    /// Rows sorted alphabetically by parent
    pub rows: Vec<HeatmapRow>,
    /// Candles per weekday across all parents
    pub totals_by_day: [u64; 7],
    /// Largest single cell (color-scale normalization)
    pub max_cell: u64,
}

impl WeekdayHeatmap {
    /// Cell count for a (parent, weekday) pair.
    pub fn cell(&self, parent: &str, day: usize) -> u64 {
        self.rows
            .iter()
            .find(|r| r.parent == parent)
            .map(|r| r.cells[day])
            .unwrap_or(0)
    }
}

/// Aggregate candles into the weekday heatmap.
///
/// Candles without an emotion or without a parseable timestamp are skipped.
pub fn weekday_heatmap(candles: &[Candle], taxonomy: &EmotionTaxonomy) -> WeekdayHeatmap {
    let mut cells: HashMap<String, [u64; 7]> = HashMap::new();
    let mut totals_by_day = [0u64; 7];
    let mut max_cell = 0u64;

    for candle in candles {
        let Some(emotion) = candle.emotion_name() else {
            continue;
        };
        let Some(day) = weekday_index(candle) else {
            continue;
        };
        let parent = taxonomy.resolve_parent(emotion);

        let row = cells.entry(parent.to_string()).or_insert([0; 7]);
        row[day] += 1;
        totals_by_day[day] += 1;
        if row[day] > max_cell {
            max_cell = row[day];
        }
    }

    let mut rows: Vec<HeatmapRow> = cells
        .into_iter()
        .map(|(parent, cells)| HeatmapRow { parent, cells })
        .collect();
    rows.sort_by(|a, b| a.parent.cmp(&b.parent));

    WeekdayHeatmap {
        rows,
        totals_by_day,
        max_cell,
    }
}
