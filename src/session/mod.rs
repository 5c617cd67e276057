pub mod answer;
pub mod cache;
pub mod clock;
pub mod engine;
pub mod summary;

pub use engine::{Advance, PracticeSession, QuestionView, SessionPhase, SubmitOutcome};
