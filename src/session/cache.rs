use crate::error::GenerationError;
use crate::generator::{QuestionContext, QuestionGenerator, QuestionSpec};
use crate::rng::RandomSource;
use crate::session::answer::AnswerRecord;

struct Slot {
    spec: QuestionSpec,
    answer: AnswerRecord,
}

/// Index-addressed store of generated questions and their answer records.
///
/// Questions are generated lazily on first visit and never regenerated:
/// a revisit returns the identical spec with the identical option order,
/// so UI highlighting always lines up with what was recorded. A failed
/// generation leaves the slot empty and is retried on the next visit.
pub struct HistoryCache {
    slots: Vec<Option<Slot>>,
}

impl HistoryCache {
    pub fn new(total_questions: usize) -> Self {
        let mut slots = Vec::with_capacity(total_questions);
        slots.resize_with(total_questions, || None);
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn visited(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.is_some())
    }

    /// The cached spec for `index`, generating it on first visit.
    pub fn get_or_create(
        &mut self,
        ctx: &QuestionContext,
        generator: &dyn QuestionGenerator,
        rng: &mut RandomSource,
    ) -> Result<&QuestionSpec, GenerationError> {
        let index = ctx.index;
        debug_assert!(index < self.slots.len(), "question index out of range");
        if self.slots[index].is_none() {
            let draft = generator.generate(ctx, rng)?;
            let spec = QuestionSpec::from_draft(ctx, draft, rng)?;
            self.slots[index] = Some(Slot {
                spec,
                answer: AnswerRecord::new(index),
            });
        }
        Ok(&self.slots[index].as_ref().unwrap().spec)
    }

    pub fn spec(&self, index: usize) -> Option<&QuestionSpec> {
        self.slots.get(index)?.as_ref().map(|s| &s.spec)
    }

    pub fn answer(&self, index: usize) -> Option<&AnswerRecord> {
        self.slots.get(index)?.as_ref().map(|s| &s.answer)
    }

    pub(crate) fn answer_mut(&mut self, index: usize) -> Option<&mut AnswerRecord> {
        self.slots.get_mut(index)?.as_mut().map(|s| &mut s.answer)
    }

    /// Ordered per-question log for the session summary. Unvisited indices
    /// appear as untouched records so the log always has one entry per
    /// question.
    pub fn answer_log(&self) -> Vec<AnswerRecord> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(s) => s.answer.clone(),
                None => AnswerRecord::new(i),
            })
            .collect()
    }

    pub fn correct_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.answer.submitted && s.answer.correct)
            .count()
    }
}
