//! Adaptive practice session engine for procedurally generated math drills.
//!
//! One [`session::PracticeSession`] runs a learner through a fixed-length
//! sequence of questions for a single skill. The skill supplies a
//! [`generator::QuestionGenerator`] strategy and a [`skill::SkillProfile`]
//! (question count, difficulty banding, answer comparison rule); the engine
//! owns question caching, the answer/navigation state machine,
//! visibility-aware time accounting, and best-effort telemetry.

pub mod compare;
pub mod error;
pub mod generator;
pub mod rng;
pub mod session;
pub mod skill;
pub mod telemetry;

pub use compare::AnswerComparator;
pub use error::{GenerationError, TelemetryError};
pub use generator::{DifficultyTier, QuestionContext, QuestionDraft, QuestionGenerator, QuestionSpec};
pub use rng::RandomSource;
pub use session::{Advance, PracticeSession, SessionPhase, SubmitOutcome};
pub use skill::{SkillProfile, TierBanding};
