//! Candle creation state machine.
//!
//! Governs the UI flow from idle through the three taxonomy selection steps,
//! map placement, hold-to-confirm, and submission. Strictly linear; one draft
//! at a time; cancellation returns to idle from any step.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use taxonomy::EmotionTaxonomy;

use crate::backend::traits::{BackendError, CandleBackend};
use crate::candle::{Candle, NewCandle, Position};
use crate::collection::CandleCollection;
use crate::draft::CreationDraft;
use crate::session::Session;
use crate::sidechannel::{RejectionReport, RejectionReporter};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// The step the creation flow is in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum FlowState {
    /// No draft exists
    Idle,
    /// Picking the main emotion
    SelectingMain,
    /// Picking the mid-category
    SelectingMid,
    /// Picking the leaf emotion
    SelectingLeaf,
    /// Map is click-sensitive; placement pending confirmation
    Placing,
    /// Create call in flight
    Submitting,
    /// Candle created; shows the same-emotion tally until closed
    Succeeded { tally: u64 },
    /// Submission failed; draft retained for retry
    Rejected,
}

impl FlowState {
    /// Short state name for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SelectingMain => "selecting_main",
            Self::SelectingMid => "selecting_mid",
            Self::SelectingLeaf => "selecting_leaf",
            Self::Placing => "placing",
            Self::Submitting => "submitting",
            Self::Succeeded { .. } => "succeeded",
            Self::Rejected => "rejected",
        }
    }
}

/// Error types for flow operations.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The operation does not apply to the current step
    #[error("Cannot {action} in the {state} step")]
    WrongState {
        action: &'static str,
        state: &'static str,
    },

    /// The selection is not in the taxonomy at the current level
    #[error("Unknown {level} emotion: {name}")]
    UnknownSelection {
        level: &'static str,
        name: String,
    },

    /// No position has been placed yet
    #[error("No position has been placed")]
    NoPosition,

    /// The draft has no fully specified leaf emotion
    #[error("No leaf emotion selected")]
    NoEmotion,

    /// The hold-to-confirm gate has not completed
    #[error("Hold-to-confirm has not completed")]
    HoldIncomplete,
}

/// Result of a submission attempt.
///
/// Both outcomes are ordinary results of driving the flow; `FlowError` is
/// reserved for misuse of the state machine itself.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The candle was created and appended to the collection
    Created {
        candle: Candle,
        /// Candles now carrying the same emotion (shown on the success screen)
        tally: u64,
    },
    /// The backend rejected the submission; the draft is retained
    Rejected {
        rate_limited: bool,
        message: String,
    },
}

/// The candle creation flow for one user session.
pub struct CandleFlow {
    taxonomy: Arc<EmotionTaxonomy>,
    backend: Arc<dyn CandleBackend>,
    collection: Arc<CandleCollection>,
    reporter: Arc<RejectionReporter>,
    hold_duration: Duration,
    report_rejections: bool,
    state: FlowState,
    draft: Option<CreationDraft>,
    last_rejection: Option<String>,
}

impl CandleFlow {
    /// Wire a flow over the shared client parts.
    pub fn new(
        taxonomy: Arc<EmotionTaxonomy>,
        backend: Arc<dyn CandleBackend>,
        collection: Arc<CandleCollection>,
        reporter: Arc<RejectionReporter>,
        hold_duration: Duration,
    ) -> Self {
        Self {
            taxonomy,
            backend,
            collection,
            reporter,
            hold_duration,
            report_rejections: true,
            state: FlowState::Idle,
            draft: None,
            last_rejection: None,
        }
    }

    /// Disable the best-effort rejection reporting.
    pub fn with_rejection_reporting(mut self, enabled: bool) -> Self {
        self.report_rejections = enabled;
        self
    }

    /// Current step.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// The in-progress draft, if any.
    pub fn draft(&self) -> Option<&CreationDraft> {
        self.draft.as_ref()
    }

    /// Hold-to-confirm progress in [0, 1].
    pub fn hold_fraction(&self) -> f32 {
        self.draft.as_ref().map(|d| d.hold.fraction()).unwrap_or(0.0)
    }

    /// The transient message from the last rejected submission.
    pub fn last_rejection(&self) -> Option<&str> {
        self.last_rejection.as_deref()
    }

    /// The side channel carrying rejection reports.
    pub fn side_channel(&self) -> &RejectionReporter {
        &self.reporter
    }

    /// Start a new draft.
    pub fn begin(&mut self) -> Result<(), FlowError> {
        if self.state != FlowState::Idle {
            return Err(self.wrong_state("begin"));
        }
        self.draft = Some(CreationDraft::new(self.hold_duration));
        self.transition(FlowState::SelectingMain);
        Ok(())
    }

    /// Select the main emotion and advance to the mid-category step.
    pub fn select_main(&mut self, name: &str) -> Result<(), FlowError> {
        if self.state != FlowState::SelectingMain {
            return Err(self.wrong_state("select a main emotion"));
        }
        if !self.taxonomy.contains_main(name) {
            return Err(FlowError::UnknownSelection {
                level: "main",
                name: name.to_string(),
            });
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(self.wrong_state("select a main emotion"));
        };
        draft.main = Some(name.to_string());
        self.transition(FlowState::SelectingMid);
        Ok(())
    }

    /// Select the mid-category and advance to the leaf step.
    pub fn select_mid(&mut self, name: &str) -> Result<(), FlowError> {
        if self.state != FlowState::SelectingMid {
            return Err(self.wrong_state("select a mid-category"));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(self.wrong_state("select a mid-category"));
        };
        let main = draft.main.clone().unwrap_or_default();
        if !self.taxonomy.mids_of(&main).iter().any(|m| m.name == name) {
            return Err(FlowError::UnknownSelection {
                level: "mid",
                name: name.to_string(),
            });
        }
        draft.mid = Some(name.to_string());
        self.transition(FlowState::SelectingLeaf);
        Ok(())
    }

    /// Select the leaf emotion. Auto-advances to placement.
    pub fn select_leaf(&mut self, name: &str) -> Result<(), FlowError> {
        if self.state != FlowState::SelectingLeaf {
            return Err(self.wrong_state("select a leaf emotion"));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(self.wrong_state("select a leaf emotion"));
        };
        let main = draft.main.clone().unwrap_or_default();
        let mid = draft.mid.clone().unwrap_or_default();
        if !self
            .taxonomy
            .leaves_of(&main, &mid)
            .iter()
            .any(|l| l == name)
        {
            return Err(FlowError::UnknownSelection {
                level: "leaf",
                name: name.to_string(),
            });
        }
        draft.leaf = Some(name.to_string());
        self.transition(FlowState::Placing);
        Ok(())
    }

    /// Step back one level.
    ///
    /// Clears the datum owned by the step being left (and everything deeper)
    /// while preserving shallower selections. From the first step this
    /// discards the draft and returns to idle; from the rejected step it
    /// returns to placement with the draft intact.
    pub fn back(&mut self) -> Result<(), FlowError> {
        let next = match self.state {
            FlowState::SelectingMain => {
                self.reset_to_idle();
                return Ok(());
            }
            FlowState::SelectingMid => FlowState::SelectingMain,
            FlowState::SelectingLeaf => FlowState::SelectingMid,
            FlowState::Placing => FlowState::SelectingLeaf,
            FlowState::Rejected => FlowState::Placing,
            _ => return Err(self.wrong_state("go back")),
        };

        if let Some(draft) = self.draft.as_mut() {
            match self.state {
                FlowState::SelectingMid => {
                    draft.mid = None;
                    draft.leaf = None;
                    draft.position = None;
                }
                FlowState::SelectingLeaf => {
                    draft.leaf = None;
                    draft.position = None;
                }
                FlowState::Placing => {
                    draft.position = None;
                }
                // Rejected keeps the draft untouched for retry.
                _ => {}
            }
            draft.hold.reset();
        }

        self.transition(next);
        Ok(())
    }

    /// Place (or re-place) the draft on the map.
    ///
    /// Each placement overwrites the previous one and aborts any hold in
    /// progress.
    pub fn place(&mut self, position: Position) -> Result<(), FlowError> {
        if self.state != FlowState::Placing {
            return Err(self.wrong_state("place the candle"));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(self.wrong_state("place the candle"));
        };
        draft.position = Some(position);
        draft.hold.reset();
        debug!(lat = position.lat, lon = position.lon, "Draft placed");
        Ok(())
    }

    /// Advance the hold-to-confirm press. Returns the completed fraction.
    pub fn advance_hold(&mut self, dt: Duration) -> Result<f32, FlowError> {
        if self.state != FlowState::Placing {
            return Err(self.wrong_state("hold to confirm"));
        }
        let Some(draft) = self.draft.as_mut() else {
            return Err(self.wrong_state("hold to confirm"));
        };
        if draft.position.is_none() {
            return Err(FlowError::NoPosition);
        }
        draft.hold.advance(dt);
        Ok(draft.hold.fraction())
    }

    /// Abort the hold-to-confirm press. No side effects.
    pub fn release_hold(&mut self) {
        if self.state == FlowState::Placing {
            if let Some(draft) = self.draft.as_mut() {
                draft.hold.reset();
            }
        }
    }

    /// Submit the confirmed draft.
    ///
    /// Requires a full leaf selection, a placed position, and a completed
    /// hold. On rejection the draft is preserved so the user can retry.
    pub async fn submit(&mut self, session: &Session) -> Result<SubmitOutcome, FlowError> {
        if self.state != FlowState::Placing {
            return Err(self.wrong_state("submit"));
        }
        let Some(draft) = self.draft.as_ref() else {
            return Err(self.wrong_state("submit"));
        };
        if draft.position.is_none() {
            return Err(FlowError::NoPosition);
        }
        if !draft.hold.is_complete() {
            return Err(FlowError::HoldIncomplete);
        }
        self.do_submit(session).await
    }

    /// Retry a rejected submission with the preserved draft.
    ///
    /// The placement was already confirmed once, so the hold gate is not
    /// repeated.
    pub async fn retry(&mut self, session: &Session) -> Result<SubmitOutcome, FlowError> {
        if self.state != FlowState::Rejected {
            return Err(self.wrong_state("retry"));
        }
        self.do_submit(session).await
    }

    /// Close the success screen and return to idle.
    pub fn acknowledge(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::Succeeded { .. }) {
            return Err(self.wrong_state("acknowledge"));
        }
        self.reset_to_idle();
        Ok(())
    }

    /// Abandon the flow from any step, discarding the draft.
    ///
    /// An already-dispatched submission is not aborted; if it later succeeds
    /// the candle still lands in the collection.
    pub fn cancel(&mut self) {
        if self.state != FlowState::Idle {
            debug!(from = self.state.name(), "Flow cancelled");
            self.reset_to_idle();
        }
    }

    async fn do_submit(&mut self, session: &Session) -> Result<SubmitOutcome, FlowError> {
        let (emotion, position) = match self.draft.as_ref() {
            Some(draft) => match (draft.emotion(), draft.position) {
                (Some(emotion), Some(position)) => (emotion.to_string(), position),
                (None, _) => return Err(FlowError::NoEmotion),
                (_, None) => return Err(FlowError::NoPosition),
            },
            None => return Err(self.wrong_state("submit")),
        };

        self.transition(FlowState::Submitting);

        let payload = NewCandle::new(emotion.clone(), position);
        debug!(emotion = %emotion, user_id = %session.user_id, "Submitting candle");

        match self.backend.create_candle(session, &payload).await {
            Ok(candle) => {
                self.collection.insert(candle.clone());
                let tally = self.collection.count_emotion(&emotion);
                self.draft = None;
                self.last_rejection = None;
                self.transition(FlowState::Succeeded { tally });
                Ok(SubmitOutcome::Created { candle, tally })
            }
            Err(err) => {
                let rate_limited = err.is_rate_limit();
                let message = user_message(&err);
                warn!(error = %err, rate_limited, "Candle submission rejected");

                if rate_limited && self.report_rejections {
                    self.reporter.dispatch(
                        RejectionReport::rate_limited(Some(emotion), Some(position))
                            .with_message(err.to_string()),
                    );
                }

                // Draft stays intact for retry; only the hold resets.
                if let Some(draft) = self.draft.as_mut() {
                    draft.hold.reset();
                }
                self.last_rejection = Some(message.clone());
                self.transition(FlowState::Rejected);
                Ok(SubmitOutcome::Rejected {
                    rate_limited,
                    message,
                })
            }
        }
    }

    fn wrong_state(&self, action: &'static str) -> FlowError {
        FlowError::WrongState {
            action,
            state: self.state.name(),
        }
    }

    fn transition(&mut self, next: FlowState) {
        debug!(from = self.state.name(), to = next.name(), "Flow transition");
        self.state = next;
    }

    fn reset_to_idle(&mut self) {
        self.draft = None;
        self.last_rejection = None;
        self.state = FlowState::Idle;
    }
}

/// Transient message shown for a failed submission.
fn user_message(err: &BackendError) -> String {
    match err {
        BackendError::RateLimited { .. } => {
            "You're lighting candles too quickly. Please wait a moment and try again.".to_string()
        }
        _ => "Your candle couldn't be placed. Please try again.".to_string(),
    }
}
