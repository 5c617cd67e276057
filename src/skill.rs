use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::compare::AnswerComparator;
use crate::generator::DifficultyTier;

/// Fraction of the question sequence assigned to each difficulty tier:
/// the leading `easy` share is Easy, the next `medium` share is Medium,
/// everything after is Hard.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TierBanding {
    #[serde(default = "default_easy_share")]
    pub easy: f64,
    #[serde(default = "default_medium_share")]
    pub medium: f64,
}

fn default_easy_share() -> f64 {
    0.3
}
fn default_medium_share() -> f64 {
    0.3
}

impl Default for TierBanding {
    fn default() -> Self {
        Self {
            easy: default_easy_share(),
            medium: default_medium_share(),
        }
    }
}

impl TierBanding {
    pub fn tier_for(&self, index: usize, total: usize) -> DifficultyTier {
        if total == 0 {
            return DifficultyTier::Easy;
        }
        let position = index as f64 / total as f64;
        if position < self.easy {
            DifficultyTier::Easy
        } else if position < self.easy + self.medium {
            DifficultyTier::Medium
        } else {
            DifficultyTier::Hard
        }
    }
}

/// Per-skill configuration: everything a practice screen supplies besides
/// its question generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillProfile {
    pub skill_id: u32,
    pub name: String,
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    // Plain values stay ahead of the table-valued fields so the profile
    // serializes cleanly to TOML.
    #[serde(default = "default_feedback_messages")]
    pub feedback_messages: Vec<String>,
    #[serde(default)]
    pub banding: TierBanding,
    #[serde(default)]
    pub comparator: AnswerComparator,
}

fn default_total_questions() -> usize {
    10
}

fn default_feedback_messages() -> Vec<String> {
    [
        "Amazing! You nailed it!",
        "Correct! You really know your stuff!",
        "Fantastic work!",
        "Super! Keep striving for excellence!",
        "Spot on! Excellent!",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SkillProfile {
    pub fn new(skill_id: u32, name: impl Into<String>) -> Self {
        Self {
            skill_id,
            name: name.into(),
            total_questions: default_total_questions(),
            banding: TierBanding::default(),
            comparator: AnswerComparator::default(),
            feedback_messages: default_feedback_messages(),
        }
    }

    pub fn with_total_questions(mut self, total: usize) -> Self {
        self.total_questions = total;
        self
    }

    pub fn with_banding(mut self, banding: TierBanding) -> Self {
        self.banding = banding;
        self
    }

    pub fn with_comparator(mut self, comparator: AnswerComparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut profile: SkillProfile = toml::from_str(&content)?;
        profile.normalize();
        Ok(profile)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut profile: SkillProfile = toml::from_str(content)?;
        profile.normalize();
        Ok(profile)
    }

    /// Clamp malformed values from hand-edited profile files.
    /// Call after deserialization.
    pub fn normalize(&mut self) {
        if self.total_questions == 0 {
            self.total_questions = default_total_questions();
        }
        self.banding.easy = self.banding.easy.clamp(0.0, 1.0);
        self.banding.medium = self
            .banding
            .medium
            .clamp(0.0, 1.0 - self.banding.easy);
        if self.feedback_messages.is_empty() {
            self.feedback_messages = default_feedback_messages();
        }
    }
}
