//! Candles Analytics - The Aggregation Engine
//!
//! Pure aggregation functions over the candle collection, producing the
//! inputs consumed by the sidebar charts:
//!
//! - [`parent_distribution`]: per-parent counts (distribution bars)
//! - [`emotion_breakdown`]: three-ring parent/mid/leaf totals (donut)
//! - [`daypart_distribution`]: four fixed local-time buckets (100% stacked)
//! - [`weekday_heatmap`]: parent × weekday cells (heatmap)
//!
//! All aggregations are single-pass, never mutate their input, skip malformed
//! records instead of failing, and are cheap enough to recompute per render.

pub mod breakdown;
pub mod daypart;
pub mod distribution;
pub mod time;
pub mod weekday;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types
pub use breakdown::{
    emotion_breakdown, EmotionBreakdown, LeafSegment, MidSegment, ParentSegment, SegmentInfo,
    SegmentRef, SYNTHETIC_MID,
};
pub use daypart::{daypart_distribution, Daypart, DaypartDistribution, DaypartRow};
pub use distribution::{parent_distribution, ParentCount, ParentDistribution};
pub use weekday::{weekday_heatmap, HeatmapRow, WeekdayHeatmap, WEEKDAY_LABELS};
