use crate::error::GenerationError;
use crate::generator::distractor::{AnswerValue, DistractorStrategy, synthesize};
use crate::generator::{DifficultyTier, QuestionContext, QuestionDraft, QuestionGenerator};
use crate::rng::RandomSource;

/// Arithmetic word problems: addition sums at the easy tier, single-step
/// multiplication in the middle, two-step problems at the hard tier.
pub struct ArithmeticGenerator;

impl QuestionGenerator for ArithmeticGenerator {
    fn generate(
        &self,
        ctx: &QuestionContext,
        rng: &mut RandomSource,
    ) -> Result<QuestionDraft, GenerationError> {
        match ctx.tier {
            DifficultyTier::Easy => Ok(addition(rng)),
            DifficultyTier::Medium => Ok(multiplication(rng)),
            DifficultyTier::Hard => Ok(two_step(rng)),
        }
    }
}

fn addition(rng: &mut RandomSource) -> QuestionDraft {
    let a = rng.next_int(25, 89);
    let b = rng.next_int(14, 78);
    let sum = a + b;
    let correct = AnswerValue::integer(sum);
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(sum - 10), // dropped the carry
                AnswerValue::integer(a - b),    // subtracted instead
                AnswerValue::integer(sum + 1),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!(
            "Ravi collected ${a}$ marbles and his sister gave him ${b}$ more. \
             How many marbles does he have now?"
        ),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!("Adding the two groups: ${a} + {b} = {sum}$."),
        visual: None,
    }
}

fn multiplication(rng: &mut RandomSource) -> QuestionDraft {
    let pay = rng.next_int(120, 180);
    let days = rng.next_int(25, 31);
    let total = pay * days;
    let correct = AnswerValue::integer(total);
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(pay + days),          // added instead
                AnswerValue::integer(pay * (days - 1)),    // off by one day
                AnswerValue::integer(total + 10),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!(
            "A worker is paid ₹${pay}$ every day. How much money will the worker \
             earn in ${days}$ days?"
        ),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "Daily pay times the number of days: ${pay} \\times {days} = {total}$."
        ),
        visual: None,
    }
}

fn two_step(rng: &mut RandomSource) -> QuestionDraft {
    let boxes = rng.next_int(10, 15);
    let laddoos = rng.next_int(20, 30);
    let eaten = rng.next_int(5, 15);
    let made = boxes * laddoos;
    let left = made - eaten;
    let correct = AnswerValue::integer(left);
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(made),         // forgot the second step
                AnswerValue::integer(made + eaten), // added instead of removing
                AnswerValue::integer(left - 10),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!(
            "A sweet shop packs ${boxes}$ boxes with ${laddoos}$ laddoos in each box. \
             If ${eaten}$ laddoos are eaten on the way, how many reach the fair?"
        ),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "Total made $= {boxes} \\times {laddoos} = {made}$; \
             after removing ${eaten}$, ${made} - {eaten} = {left}$ remain."
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
    fn test_easy_sum_is_consistent_with_text() {
        let mut rng = RandomSource::seeded(42);
        let draft = ArithmeticGenerator
            .generate(&ctx(DifficultyTier::Easy), &mut rng)
            .unwrap();
        let answer: i64 = draft.correct_answer.parse().unwrap();
        assert!((39..=167).contains(&answer));
        assert!(draft.options.contains(&draft.correct_answer));
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
                let draft = ArithmeticGenerator.generate(&ctx(tier), &mut rng).unwrap();
                let mut options = draft.options.clone();
                options.sort();
                options.dedup();
                assert_eq!(options.len(), 4, "duplicates at tier {tier:?} seed {seed}");
            }
        }
    }

    #[test]
    fn test_hard_answer_is_positive() {
        for seed in 0..50 {
            let mut rng = RandomSource::seeded(seed);
            let draft = ArithmeticGenerator
                .generate(&ctx(DifficultyTier::Hard), &mut rng)
                .unwrap();
            let answer: i64 = draft.correct_answer.parse().unwrap();
            assert!(answer > 0);
        }
    }
}
