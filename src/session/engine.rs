use std::time::Instant;

use chrono::Utc;

use crate::error::{GenerationError, TelemetryError};
use crate::generator::{QuestionContext, QuestionGenerator, QuestionSpec};
use crate::rng::RandomSource;
use crate::session::answer::AnswerRecord;
use crate::session::cache::HistoryCache;
use crate::session::clock::SessionClock;
use crate::session::summary::SessionSummary;
use crate::skill::SkillProfile;
use crate::telemetry::{AttemptRecord, NullSink, TelemetrySink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Completed,
}

/// What the shell renders for one question: the frozen spec plus the
/// learner's record so far.
#[derive(Clone, Copy, Debug)]
pub struct QuestionView<'a> {
    pub spec: &'a QuestionSpec,
    pub answer: &'a AnswerRecord,
}

/// Result of a successful submit.
#[derive(Clone, Debug)]
pub struct SubmitOutcome {
    pub correct: bool,
    pub correct_answer: String,
    /// Encouragement drawn from the skill's message pool on a correct answer.
    pub feedback: Option<String>,
    pub time_spent_seconds: u64,
}

/// Result of `next()`: either the following question or the terminal summary.
#[derive(Debug)]
pub enum Advance<'a> {
    Question(QuestionView<'a>),
    Completed(&'a SessionSummary),
}

/// One run through a skill's question sequence.
///
/// Owns the history cache, the answer state machine, the clocks, and the
/// telemetry seam. Single-threaded: the shell forwards UI events plus two
/// external interrupts (a 1 Hz tick and the visibility signal). Telemetry is
/// fire-and-forget; a failed call is logged and never surfaces to the
/// learner or blocks a transition.
pub struct PracticeSession {
    skill: SkillProfile,
    generator: Box<dyn QuestionGenerator>,
    rng: RandomSource,
    cache: HistoryCache,
    clock: SessionClock,
    phase: SessionPhase,
    current: usize,
    entered: bool,
    telemetry: Box<dyn TelemetrySink>,
    summary: Option<SessionSummary>,
}

impl PracticeSession {
    pub fn new(skill: SkillProfile, generator: impl QuestionGenerator + 'static) -> Self {
        let total = skill.total_questions;
        Self {
            skill,
            generator: Box::new(generator),
            rng: RandomSource::from_entropy(),
            cache: HistoryCache::new(total),
            clock: SessionClock::new(),
            phase: SessionPhase::Active,
            current: 0,
            entered: false,
            telemetry: Box::new(NullSink),
            summary: None,
        }
    }

    /// Swap in a seeded source for deterministic replay.
    pub fn with_rng(mut self, rng: RandomSource) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_telemetry(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Box::new(sink);
        self
    }

    /// Announce the session to the backend. Best-effort, call once.
    pub fn start(&mut self, user_id: &str) {
        let result = self.telemetry.session_started(user_id, self.skill.skill_id);
        log_telemetry(result, "session_started");
    }

    pub fn skill(&self) -> &SkillProfile {
        &self.skill
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.skill.total_questions
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.total_elapsed_seconds()
    }

    pub fn format_elapsed(&self) -> String {
        self.clock.format_elapsed()
    }

    /// Host-driven 1-second tick. Stops counting once completed.
    pub fn tick(&mut self) {
        if self.phase == SessionPhase::Active {
            self.clock.tick();
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.set_visible_at(visible, Instant::now());
    }

    pub fn set_visible_at(&mut self, visible: bool, now: Instant) {
        if self.phase == SessionPhase::Active {
            self.clock.set_visible_at(visible, now);
        }
    }

    pub fn enter_question(&mut self, index: usize) -> Result<QuestionView<'_>, GenerationError> {
        self.enter_question_at(index, Instant::now())
    }

    /// Navigate to `index`, generating its question on first visit. An
    /// out-of-range index, or any navigation after completion, is a local
    /// no-op that re-presents the current question.
    pub fn enter_question_at(
        &mut self,
        index: usize,
        now: Instant,
    ) -> Result<QuestionView<'_>, GenerationError> {
        let total = self.skill.total_questions;
        let target = if self.phase == SessionPhase::Completed || index >= total {
            tracing::debug!(index, total, "navigation rejected, staying put");
            self.current
        } else {
            index
        };

        let ctx = QuestionContext {
            index: target,
            tier: self.skill.banding.tier_for(target, total),
            total_questions: total,
        };
        if let Err(err) = self
            .cache
            .get_or_create(&ctx, &*self.generator, &mut self.rng)
        {
            tracing::warn!(index = target, error = %err, "question generation failed");
            return Err(err);
        }

        let changed = target != self.current || !self.entered;
        if changed && self.phase == SessionPhase::Active {
            self.clock.reset_question_at(now);
        }
        self.current = target;
        self.entered = true;

        Ok(QuestionView {
            spec: self.cache.spec(target).expect("slot filled above"),
            answer: self.cache.answer(target).expect("slot filled above"),
        })
    }

    /// Record a pick on the current question. Rejected (silently) when the
    /// option is not one of the question's, after submission, or after
    /// completion.
    pub fn select_option(&mut self, option: &str) -> bool {
        if self.phase == SessionPhase::Completed {
            tracing::debug!("select after completion ignored");
            return false;
        }
        let Some(spec) = self.cache.spec(self.current) else {
            tracing::debug!(index = self.current, "select before entering ignored");
            return false;
        };
        if !spec.options.iter().any(|o| o == option) {
            tracing::debug!(index = self.current, option, "unknown option ignored");
            return false;
        }
        self.cache
            .answer_mut(self.current)
            .map(|record| record.select(option))
            .unwrap_or(false)
    }

    pub fn submit(&mut self) -> Option<SubmitOutcome> {
        self.submit_at(Instant::now())
    }

    /// Grade the current selection. `None` when there is nothing to grade:
    /// no selection yet, already submitted, or the session is over.
    pub fn submit_at(&mut self, now: Instant) -> Option<SubmitOutcome> {
        if self.phase == SessionPhase::Completed {
            tracing::debug!("submit after completion ignored");
            return None;
        }
        let spec = self.cache.spec(self.current)?;
        let record = self.cache.answer(self.current)?;
        if record.submitted {
            tracing::debug!(index = self.current, "duplicate submit ignored");
            return None;
        }
        let selected = record.selected.clone()?;

        let correct = self.skill.comparator.matches(&selected, &spec.correct_answer);
        let attempt = AttemptRecord {
            skill_id: self.skill.skill_id,
            difficulty: spec.tier,
            question_text: spec.text.clone(),
            correct_answer: spec.correct_answer.clone(),
            student_answer: selected,
            is_correct: correct,
            solution_text: spec.explanation.clone(),
            time_spent_seconds: self.clock.question_seconds_at(now),
            recorded_at: Utc::now(),
        };
        let correct_answer = attempt.correct_answer.clone();

        self.cache
            .answer_mut(self.current)
            .expect("record exists for graded question")
            .submit(correct);

        let feedback = if correct && !self.skill.feedback_messages.is_empty() {
            Some(self.rng.pick(&self.skill.feedback_messages).clone())
        } else {
            None
        };

        let result = self.telemetry.attempt(&attempt);
        log_telemetry(result, "attempt");

        Some(SubmitOutcome {
            correct,
            correct_answer,
            feedback,
            time_spent_seconds: attempt.time_spent_seconds,
        })
    }

    /// Toggle the explanation view on the current (submitted) question.
    /// The only mutation allowed on a locked record.
    pub fn set_explanation_shown(&mut self, shown: bool) {
        if self.phase == SessionPhase::Completed {
            tracing::debug!("explanation toggle after completion ignored");
            return;
        }
        if let Some(record) = self.cache.answer_mut(self.current) {
            if record.submitted {
                record.set_feedback_shown(shown);
            }
        }
    }

    pub fn next(&mut self) -> Result<Advance<'_>, GenerationError> {
        self.next_at(Instant::now())
    }

    /// Advance to the following question; past the last index this completes
    /// the session, which is terminal.
    pub fn next_at(&mut self, now: Instant) -> Result<Advance<'_>, GenerationError> {
        if self.phase == SessionPhase::Completed {
            return Ok(Advance::Completed(
                self.summary.as_ref().expect("completed session has summary"),
            ));
        }
        if self.current + 1 >= self.skill.total_questions {
            self.complete();
            return Ok(Advance::Completed(
                self.summary.as_ref().expect("just computed"),
            ));
        }
        let view = self.enter_question_at(self.current + 1, now)?;
        Ok(Advance::Question(view))
    }

    pub fn previous(&mut self) -> Result<QuestionView<'_>, GenerationError> {
        self.previous_at(Instant::now())
    }

    /// Step back one question; at index 0 this re-presents the current one.
    pub fn previous_at(&mut self, now: Instant) -> Result<QuestionView<'_>, GenerationError> {
        let target = self.current.saturating_sub(1);
        self.enter_question_at(target, now)
    }

    /// Explicit terminal transition (the shell's Done/Exit path). Idempotent.
    pub fn finish(&mut self) -> &SessionSummary {
        if self.phase == SessionPhase::Active {
            self.complete();
        }
        self.summary.as_ref().expect("completed session has summary")
    }

    fn complete(&mut self) {
        self.phase = SessionPhase::Completed;
        let summary = SessionSummary::compute(
            &self.skill,
            self.cache.answer_log(),
            self.clock.total_elapsed_seconds(),
        );
        let result = self.telemetry.report(&summary);
        log_telemetry(result, "report");
        let result = self.telemetry.session_finished();
        log_telemetry(result, "session_finished");
        self.summary = Some(summary);
    }
}

fn log_telemetry(result: Result<(), TelemetryError>, op: &'static str) {
    if let Err(err) = result {
        tracing::warn!(op, error = %err, "telemetry call failed, continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::generator::QuestionDraft;
    use crate::telemetry::{RecordingSink, TelemetryCall};

    /// Always asks 3 + 4 with a fixed option set.
    struct FixedGenerator;

    impl QuestionGenerator for FixedGenerator {
        fn generate(
            &self,
            ctx: &QuestionContext,
            _rng: &mut RandomSource,
        ) -> Result<QuestionDraft, GenerationError> {
            Ok(QuestionDraft {
                text: format!("Question {}: what is 3 + 4?", ctx.index + 1),
                correct_answer: "7".to_string(),
                options: vec!["7", "8", "9", "10"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                explanation: "3 + 4 = 7.".to_string(),
                visual: None,
            })
        }
    }

    fn session(total: usize) -> PracticeSession {
        let skill = SkillProfile::new(42, "Addition").with_total_questions(total);
        PracticeSession::new(skill, FixedGenerator).with_rng(RandomSource::seeded(7))
    }

    #[test]
    fn test_enter_select_submit_correct() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        assert!(s.select_option("7"));
        let outcome = s.submit().unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.correct_answer, "7");
        assert!(outcome.feedback.is_some());
    }

    #[test]
    fn test_incorrect_submit_has_no_feedback_message() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        s.select_option("8");
        let outcome = s.submit().unwrap();
        assert!(!outcome.correct);
        assert!(outcome.feedback.is_none());
    }

    #[test]
    fn test_submit_without_selection_is_noop() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        assert!(s.submit().is_none());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        assert!(!s.select_option("11"));
    }

    #[test]
    fn test_select_before_entering_rejected() {
        let mut s = session(3);
        assert!(!s.select_option("7"));
    }

    #[test]
    fn test_reselect_after_submit_keeps_record() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        s.select_option("8");
        s.submit().unwrap();
        assert!(!s.select_option("7"));
        let view = s.enter_question(0).unwrap();
        assert_eq!(view.answer.selected.as_deref(), Some("8"));
        assert!(!view.answer.correct);
    }

    #[test]
    fn test_navigation_round_trip_preserves_record() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        s.select_option("8");
        s.submit().unwrap();
        let options_before: Vec<String> = s.enter_question(0).unwrap().spec.options.clone();

        match s.next().unwrap() {
            Advance::Question(_) => {}
            Advance::Completed(_) => panic!("session ended early"),
        }
        let view = s.previous().unwrap();
        assert_eq!(view.answer.selected.as_deref(), Some("8"));
        assert!(view.answer.submitted);
        assert_eq!(view.spec.options, options_before, "no re-shuffle on revisit");
    }

    #[test]
    fn test_next_past_last_completes() {
        let mut s = session(1);
        s.enter_question(0).unwrap();
        s.select_option("7");
        s.submit().unwrap();
        match s.next().unwrap() {
            Advance::Completed(summary) => {
                assert_eq!(summary.total_questions, 1);
                assert_eq!(summary.correct_count, 1);
            }
            Advance::Question(_) => panic!("expected completion"),
        }
        assert_eq!(s.phase(), SessionPhase::Completed);
    }

    #[test]
    fn test_completion_is_terminal() {
        let mut s = session(2);
        s.enter_question(0).unwrap();
        s.finish();
        assert!(s.submit().is_none());
        assert!(!s.select_option("7"));
        // Navigation after completion stays on the current question.
        let view = s.enter_question(1).unwrap();
        assert_eq!(view.spec.index, 0);
        // And the summary was computed exactly once.
        assert_eq!(s.finish().total_questions, 2);
    }

    #[test]
    fn test_previous_at_zero_stays() {
        let mut s = session(3);
        s.enter_question(0).unwrap();
        let view = s.previous().unwrap();
        assert_eq!(view.spec.index, 0);
    }

    #[test]
    fn test_telemetry_order_and_payload() {
        let sink = RecordingSink::new();
        let calls = sink.calls();
        let mut s = session(1).with_telemetry(sink);
        s.start("u-55");
        s.enter_question(0).unwrap();
        s.select_option("8");
        s.submit().unwrap();
        s.finish();

        let log = calls.borrow();
        assert_eq!(log.len(), 4);
        assert!(matches!(
            log[0],
            TelemetryCall::SessionStarted { skill_id: 42, .. }
        ));
        match &log[1] {
            TelemetryCall::Attempt(attempt) => {
                assert_eq!(attempt.student_answer, "8");
                assert!(!attempt.is_correct);
            }
            other => panic!("expected attempt, got {other:?}"),
        }
        assert!(matches!(log[2], TelemetryCall::Report(_)));
        assert!(matches!(log[3], TelemetryCall::SessionFinished));
    }

    #[test]
    fn test_telemetry_failures_never_surface() {
        let mut s = session(1).with_telemetry(RecordingSink::failing());
        s.start("u-55");
        s.enter_question(0).unwrap();
        s.select_option("7");
        let outcome = s.submit().unwrap();
        assert!(outcome.correct, "grading unaffected by telemetry failure");
        let summary = s.finish();
        assert_eq!(summary.correct_count, 1);
    }

    #[test]
    fn test_tick_stops_after_completion() {
        let mut s = session(1);
        s.enter_question(0).unwrap();
        s.tick();
        s.tick();
        s.finish();
        s.tick();
        assert_eq!(s.elapsed_seconds(), 2);
    }

    #[test]
    fn test_difficulty_tier_follows_banding() {
        let mut s = session(10);
        let view = s.enter_question(0).unwrap();
        assert_eq!(view.spec.tier, crate::generator::DifficultyTier::Easy);
        let view = s.enter_question(9).unwrap();
        assert_eq!(view.spec.tier, crate::generator::DifficultyTier::Hard);
    }
}
