use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::answer::AnswerRecord;
use crate::skill::SkillProfile;

/// End-of-session report, computed exactly once at the terminal transition
/// and handed to the reporting adapter. The engine never persists it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub skill_id: u32,
    pub skill_name: String,
    pub total_questions: usize,
    pub correct_count: usize,
    pub score_percent: f64,
    pub stars: u8,
    pub total_time_seconds: u64,
    pub per_question_log: Vec<AnswerRecord>,
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    pub(crate) fn compute(
        skill: &SkillProfile,
        per_question_log: Vec<AnswerRecord>,
        total_time_seconds: u64,
    ) -> Self {
        let total_questions = per_question_log.len();
        let correct_count = per_question_log
            .iter()
            .filter(|r| r.submitted && r.correct)
            .count();
        let score_percent = if total_questions == 0 {
            0.0
        } else {
            round2(correct_count as f64 / total_questions as f64 * 100.0)
        };

        Self {
            skill_id: skill.skill_id,
            skill_name: skill.name.clone(),
            total_questions,
            correct_count,
            score_percent,
            stars: stars_for(score_percent),
            total_time_seconds,
            per_question_log,
            completed_at: Utc::now(),
        }
    }
}

/// Two decimal places, half away from zero: 2 of 3 correct is 66.67.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Star thresholds from the results screen: one each at 33%, 66%, 99%.
fn stars_for(score_percent: f64) -> u8 {
    [33.0, 66.0, 99.0]
        .iter()
        .filter(|&&threshold| score_percent >= threshold)
        .count() as u8
}
