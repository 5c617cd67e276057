pub mod arithmetic;
pub mod decimals;
pub mod distractor;
pub mod perimeter;

use serde::{Deserialize, Serialize};

use crate::compare::normalize;
use crate::error::GenerationError;
use crate::rng::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Medium => "Medium",
            DifficultyTier::Hard => "Hard",
        }
    }
}

/// Where in the session a question is being generated for.
#[derive(Clone, Copy, Debug)]
pub struct QuestionContext {
    pub index: usize,
    pub tier: DifficultyTier,
    pub total_questions: usize,
}

/// Generator output before the engine has validated it and fixed the
/// option order. `options` must include `correct_answer`; order is
/// irrelevant here since the engine shuffles exactly once.
#[derive(Clone, Debug)]
pub struct QuestionDraft {
    pub text: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub explanation: String,
    pub visual: Option<serde_json::Value>,
}

/// One skill's question-production strategy.
///
/// Must be a pure function of `(ctx, rng state)`: given the same context and
/// the same seeded [`RandomSource`], the same draft comes back. Generators
/// branch on `ctx.tier` to scale their numeric ranges.
pub trait QuestionGenerator {
    fn generate(
        &self,
        ctx: &QuestionContext,
        rng: &mut RandomSource,
    ) -> Result<QuestionDraft, GenerationError>;
}

/// A validated question, frozen for the lifetime of the session.
///
/// `options` is the final display order. Regenerating or re-shuffling a spec
/// after creation would desynchronize what the learner saw from what got
/// recorded, so neither ever happens.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionSpec {
    pub index: usize,
    pub tier: DifficultyTier,
    pub text: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub explanation: String,
    pub visual: Option<serde_json::Value>,
}

impl QuestionSpec {
    /// Validate a draft and lock in the option order.
    pub(crate) fn from_draft(
        ctx: &QuestionContext,
        draft: QuestionDraft,
        rng: &mut RandomSource,
    ) -> Result<Self, GenerationError> {
        if draft.options.is_empty() {
            return Err(GenerationError::EmptyOptions);
        }
        if !(2..=6).contains(&draft.options.len()) {
            return Err(GenerationError::OptionCountOutOfRange(draft.options.len()));
        }
        if !draft.options.iter().any(|o| o == &draft.correct_answer) {
            return Err(GenerationError::CorrectAnswerMissing(draft.correct_answer));
        }
        let mut seen = Vec::with_capacity(draft.options.len());
        for option in &draft.options {
            let key = normalize(option);
            if seen.contains(&key) {
                return Err(GenerationError::DuplicateOption(option.clone()));
            }
            seen.push(key);
        }

        let mut options = draft.options;
        rng.shuffle(&mut options);

        Ok(Self {
            index: ctx.index,
            tier: ctx.tier,
            text: draft.text,
            correct_answer: draft.correct_answer,
            options,
            explanation: draft.explanation,
            visual: draft.visual,
        })
    }
}
