use serde::{Deserialize, Serialize};

/// The learner's recorded response for one question index.
///
/// Mutated only through the methods below; once `submitted` is set the
/// record is locked and only `feedback_shown` may still change. Records are
/// never deleted within a session so review navigation can restore them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected: Option<String>,
    pub submitted: bool,
    pub correct: bool,
    pub feedback_shown: bool,
}

impl AnswerRecord {
    pub fn new(question_index: usize) -> Self {
        Self {
            question_index,
            selected: None,
            submitted: false,
            correct: false,
            feedback_shown: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.submitted
    }

    /// `Unanswered → Selected`, or re-selection while still unsubmitted.
    /// Rejected silently after submission; reachable only through UI races,
    /// so it is a logged no-op rather than an error.
    pub(crate) fn select(&mut self, option: &str) -> bool {
        if self.submitted {
            tracing::debug!(index = self.question_index, "select after submit ignored");
            return false;
        }
        self.selected = Some(option.to_string());
        true
    }

    /// `Selected → Submitted`. Requires a prior selection; submitting with
    /// nothing selected is a silent local no-op.
    pub(crate) fn submit(&mut self, correct: bool) -> bool {
        if self.submitted {
            tracing::debug!(index = self.question_index, "duplicate submit ignored");
            return false;
        }
        if self.selected.is_none() {
            tracing::debug!(index = self.question_index, "submit without selection ignored");
            return false;
        }
        self.submitted = true;
        self.correct = correct;
        true
    }

    /// `Submitted → Submitted`: toggling the explanation is the only
    /// re-entrant transition.
    pub(crate) fn set_feedback_shown(&mut self, shown: bool) {
        self.feedback_shown = shown;
    }
}
