#[cfg(feature = "network")]
pub mod http;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::generator::DifficultyTier;
use crate::session::summary::SessionSummary;

/// One submitted question, as reported to the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub skill_id: u32,
    #[serde(rename = "difficulty_level")]
    pub difficulty: DifficultyTier,
    pub question_text: String,
    pub correct_answer: String,
    pub student_answer: String,
    pub is_correct: bool,
    pub solution_text: String,
    pub time_spent_seconds: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Where attempts and reports go. Every call is best-effort: the engine
/// catches and logs failures, never retries, and never lets one block or
/// desynchronize local session state.
pub trait TelemetrySink {
    fn session_started(&mut self, user_id: &str, skill_id: u32) -> Result<(), TelemetryError>;
    fn attempt(&mut self, attempt: &AttemptRecord) -> Result<(), TelemetryError>;
    fn session_finished(&mut self) -> Result<(), TelemetryError>;
    fn report(&mut self, summary: &SessionSummary) -> Result<(), TelemetryError>;
}

/// Discards everything. The default sink.
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn session_started(&mut self, _user_id: &str, _skill_id: u32) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn attempt(&mut self, _attempt: &AttemptRecord) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn session_finished(&mut self) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn report(&mut self, _summary: &SessionSummary) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Test double: appends every call to a shared log.
#[derive(Clone, Debug, PartialEq)]
pub enum TelemetryCall {
    SessionStarted { user_id: String, skill_id: u32 },
    Attempt(Box<AttemptRecord>),
    SessionFinished,
    Report(Box<SessionSummary>),
}

#[derive(Default)]
pub struct RecordingSink {
    calls: Rc<RefCell<Vec<TelemetryCall>>>,
    /// When set, every call fails. Lets tests prove failures never leak.
    pub fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Rc::default(),
            fail: true,
        }
    }

    /// Shared handle to the call log; clones observe the same log.
    pub fn calls(&self) -> Rc<RefCell<Vec<TelemetryCall>>> {
        Rc::clone(&self.calls)
    }

    fn push(&mut self, call: TelemetryCall) -> Result<(), TelemetryError> {
        if self.fail {
            return Err(TelemetryError::Transport("recording sink set to fail".into()));
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl TelemetrySink for RecordingSink {
    fn session_started(&mut self, user_id: &str, skill_id: u32) -> Result<(), TelemetryError> {
        self.push(TelemetryCall::SessionStarted {
            user_id: user_id.to_string(),
            skill_id,
        })
    }

    fn attempt(&mut self, attempt: &AttemptRecord) -> Result<(), TelemetryError> {
        self.push(TelemetryCall::Attempt(Box::new(attempt.clone())))
    }

    fn session_finished(&mut self) -> Result<(), TelemetryError> {
        self.push(TelemetryCall::SessionFinished)
    }

    fn report(&mut self, summary: &SessionSummary) -> Result<(), TelemetryError> {
        self.push(TelemetryCall::Report(Box::new(summary.clone())))
    }
}
