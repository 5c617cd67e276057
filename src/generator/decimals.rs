use crate::error::GenerationError;
use crate::generator::distractor::{AnswerValue, DistractorStrategy, synthesize};
use crate::generator::{DifficultyTier, QuestionContext, QuestionDraft, QuestionGenerator};
use crate::rng::RandomSource;

/// Tenths and hundredths: writing fractions as decimals and back.
/// The classic trap at every tier is the misplaced decimal point.
pub struct DecimalGenerator;

impl QuestionGenerator for DecimalGenerator {
    fn generate(
        &self,
        ctx: &QuestionContext,
        rng: &mut RandomSource,
    ) -> Result<QuestionDraft, GenerationError> {
        match ctx.tier {
            DifficultyTier::Easy => Ok(tenths(rng)),
            DifficultyTier::Medium => Ok(hundredths(rng)),
            DifficultyTier::Hard => Ok(mixed_number(rng)),
        }
    }
}

fn tenths(rng: &mut RandomSource) -> QuestionDraft {
    let n = rng.next_int(1, 9);
    let correct = AnswerValue::decimal(n as f64 / 10.0, 1);
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::decimal(n as f64 / 100.0, 2), // hundredths instead of tenths
                AnswerValue::decimal(n as f64, 1),         // ignored the denominator
                AnswerValue::decimal((10 - n) as f64 / 10.0, 1),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!("Write $\\frac{{{n}}}{{10}}$ as a decimal."),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "$\\frac{{{n}}}{{10}}$ means {n} tenths, written as ${}$.",
            correct.render()
        ),
        visual: None,
    }
}

fn hundredths(rng: &mut RandomSource) -> QuestionDraft {
    let n = rng.next_int(1, 9);
    let correct = AnswerValue::decimal(n as f64 / 100.0, 2);
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::decimal(n as f64 / 10.0, 1), // forgot the tenths-place zero
                AnswerValue::decimal(n as f64 * 10.0, 1),
                AnswerValue::decimal(n as f64, 2),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!("Write $\\frac{{{n}}}{{100}}$ as a decimal."),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "$\\frac{{{n}}}{{100}}$ means {n} hundredths, so a $0$ holds the tenths place: ${}$.",
            correct.render()
        ),
        visual: None,
    }
}

fn mixed_number(rng: &mut RandomSource) -> QuestionDraft {
    let whole = rng.next_int(1, 5);
    let num = rng.next_int(1, 9);
    let value = whole as f64 + num as f64 / 10.0;
    let correct = AnswerValue::decimal(value, 1);
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::decimal(whole as f64 / 10.0 + num as f64, 1), // swapped places
                AnswerValue::decimal(value / 10.0, 2),
                AnswerValue::decimal(value + 1.0, 1),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!(
            "What is ${whole}$ ones and ${num}$ tenths written as a decimal?"
        ),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "${whole}$ ones and ${num}$ tenths $= {whole} + 0.{num} = {}$.",
            correct.render()
        ),
        visual: None,
    }
}

fn with_correct(correct: String, mut distractors: Vec<String>) -> Vec<String> {
    let mut options = vec![correct];
    options.append(&mut distractors);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(tier: DifficultyTier) -> QuestionContext {
        QuestionContext {
            index: 0,
            tier,
            total_questions: 10,
        }
    }

    #[test]
    fn test_easy_renders_one_decimal_place() {
        let mut rng = RandomSource::seeded(42);
        let draft = DecimalGenerator
            .generate(&ctx(DifficultyTier::Easy), &mut rng)
            .unwrap();
        assert!(draft.correct_answer.starts_with("0."));
        assert_eq!(draft.correct_answer.len(), 3);
    }

    #[test]
    fn test_medium_keeps_tenths_place_zero() {
        let mut rng = RandomSource::seeded(42);
        let draft = DecimalGenerator
            .generate(&ctx(DifficultyTier::Medium), &mut rng)
            .unwrap();
        assert!(draft.correct_answer.starts_with("0.0"));
    }

    #[test]
    fn test_every_tier_yields_unique_options() {
        for tier in [
            DifficultyTier::Easy,
            DifficultyTier::Medium,
            DifficultyTier::Hard,
        ] {
            for seed in 0..20 {
                let mut rng = RandomSource::seeded(seed);
                let draft = DecimalGenerator.generate(&ctx(tier), &mut rng).unwrap();
                let mut options = draft.options.clone();
                options.sort();
                options.dedup();
                assert_eq!(options.len(), 4, "duplicates at tier {tier:?} seed {seed}");
            }
        }
    }
}
