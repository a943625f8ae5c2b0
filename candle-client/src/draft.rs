//! The ephemeral creation draft.
//!
//! A draft is the in-progress candle before confirmation: a partially
//! specified emotion, a tentative position, and the hold-to-confirm progress.
//! It exists only in memory and is discarded on cancel or after submission.

use std::time::Duration;

use crate::candle::Position;

/// Sustained-press gate in front of submission.
///
/// Progress accumulates while the press is held and resets to zero when the
/// press is released early, with no other side effect.
#[derive(Debug, Clone)]
pub struct HoldToConfirm {
    required: Duration,
    progress: Duration,
}

impl HoldToConfirm {
    /// Create a gate requiring the given hold duration.
    pub fn new(required: Duration) -> Self {
        Self {
            required,
            progress: Duration::ZERO,
        }
    }

    /// Advance the held press by `dt`. Returns true once complete.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.progress = (self.progress + dt).min(self.required);
        self.is_complete()
    }

    /// Abort the press, resetting visual progress to zero.
    pub fn reset(&mut self) {
        self.progress = Duration::ZERO;
    }

    /// Completed fraction in [0, 1].
    pub fn fraction(&self) -> f32 {
        if self.required.is_zero() {
            return 1.0;
        }
        (self.progress.as_secs_f32() / self.required.as_secs_f32()).min(1.0)
    }

    /// Whether the required duration has been held.
    pub fn is_complete(&self) -> bool {
        self.progress >= self.required
    }
}

/// The in-progress candle being composed by the creation flow.
#[derive(Debug, Clone)]
pub struct CreationDraft {
    /// Selected main emotion
    pub main: Option<String>,
    /// Selected mid-category
    pub mid: Option<String>,
    /// Selected leaf emotion
    pub leaf: Option<String>,
    /// Tentative map position (overwritten on every placement click)
    pub position: Option<Position>,
    /// Hold-to-confirm progress
    pub hold: HoldToConfirm,
}

impl CreationDraft {
    /// Create an empty draft with the given hold requirement.
    pub fn new(hold_duration: Duration) -> Self {
        Self {
            main: None,
            mid: None,
            leaf: None,
            position: None,
            hold: HoldToConfirm::new(hold_duration),
        }
    }

    /// The fully specified emotion, once a leaf is selected.
    pub fn emotion(&self) -> Option<&str> {
        self.leaf.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_accumulates() {
        let mut hold = HoldToConfirm::new(Duration::from_millis(2500));
        assert!(!hold.advance(Duration::from_millis(1000)));
        assert!((hold.fraction() - 0.4).abs() < 1e-6);
        assert!(!hold.is_complete());

        assert!(hold.advance(Duration::from_millis(1500)));
        assert!(hold.is_complete());
        assert_eq!(hold.fraction(), 1.0);
    }

    #[test]
    fn test_hold_abort_resets_progress() {
        let mut hold = HoldToConfirm::new(Duration::from_millis(2500));
        hold.advance(Duration::from_millis(2000));
        hold.reset();
        assert_eq!(hold.fraction(), 0.0);
        assert!(!hold.is_complete());
    }

    #[test]
    fn test_fraction_saturates() {
        let mut hold = HoldToConfirm::new(Duration::from_millis(100));
        hold.advance(Duration::from_millis(500));
        assert_eq!(hold.fraction(), 1.0);
    }

    #[test]
    fn test_zero_duration_hold_is_complete() {
        let hold = HoldToConfirm::new(Duration::ZERO);
        assert!(hold.is_complete());
        assert_eq!(hold.fraction(), 1.0);
    }
}
