use serde_json::json;

use crate::error::GenerationError;
use crate::generator::distractor::{AnswerValue, DistractorStrategy, synthesize};
use crate::generator::{DifficultyTier, QuestionContext, QuestionDraft, QuestionGenerator};
use crate::rng::RandomSource;

/// Rectangle perimeter skill: reading a shape off a grid, applying the
/// formula, and inverting it to recover a missing side.
pub struct PerimeterGenerator;

impl QuestionGenerator for PerimeterGenerator {
    fn generate(
        &self,
        ctx: &QuestionContext,
        rng: &mut RandomSource,
    ) -> Result<QuestionDraft, GenerationError> {
        match ctx.tier {
            DifficultyTier::Easy => Ok(grid_perimeter(rng)),
            DifficultyTier::Medium => Ok(formula_perimeter(rng)),
            DifficultyTier::Hard => Ok(missing_side(rng)),
        }
    }
}

fn grid_perimeter(rng: &mut RandomSource) -> QuestionDraft {
    let w = rng.next_int(4, 7);
    let h = rng.next_int(3, 5);
    let p = 2 * (w + h);
    let correct = AnswerValue::integer(p).with_unit("cm");
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(w * h).with_unit("cm"), // counted squares, not boundary
                AnswerValue::integer(p + 2).with_unit("cm"),
                AnswerValue::integer(p - 2).with_unit("cm"),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: "Find the <strong>perimeter</strong> of the shape on the grid.".to_string(),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!("Boundary length $= {w} + {h} + {w} + {h} = {p}$ cm."),
        visual: Some(json!({ "kind": "grid", "width": w, "height": h, "cell_cm": 1 })),
    }
}

fn formula_perimeter(rng: &mut RandomSource) -> QuestionDraft {
    let w = rng.next_int(8, 15);
    let h = rng.next_int(5, 10);
    let p = 2 * (w + h);
    let correct = AnswerValue::integer(p).with_unit("cm");
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(w * h).with_unit("cm"), // area instead of perimeter
                AnswerValue::integer(w + h).with_unit("cm"), // forgot to double
                AnswerValue::integer(p + 10).with_unit("cm"),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!(
            "A rectangle has Length = ${w}$ cm and Width = ${h}$ cm. \
             What is its <strong>perimeter</strong>?"
        ),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "Perimeter $= 2 \\times (L + W) = 2 \\times ({w} + {h}) = {p}$ cm."
        ),
        visual: Some(json!({ "kind": "rect", "width": w, "height": h, "unit": "cm" })),
    }
}

fn missing_side(rng: &mut RandomSource) -> QuestionDraft {
    let p = rng.next_int(30, 50) * 2;
    let l = rng.next_int(10, 20);
    let w = p / 2 - l;
    let correct = AnswerValue::integer(w).with_unit("cm");
    let distractors = synthesize(
        &correct,
        3,
        &DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(l).with_unit("cm"),     // returned the given side
                AnswerValue::integer(p / 2).with_unit("cm"), // stopped at half-perimeter
                AnswerValue::integer(w + 5).with_unit("cm"),
            ],
        },
        rng,
    );
    QuestionDraft {
        text: format!(
            "If Perimeter is ${p}$ cm and Length is ${l}$ cm, what is the <strong>width</strong>?"
        ),
        correct_answer: correct.render(),
        options: with_correct(correct.render(), distractors),
        explanation: format!(
            "Width $= (\\text{{Perimeter}} \\div 2) - \\text{{Length}} = ({p} \\div 2) - {l} = {w}$ cm."
        ),
        visual: None,
    }
}

fn with_correct(correct: String, mut distractors: Vec<String>) -> Vec<String> {
    let mut options = vec![correct];
    options.append(&mut distractors);
    options
}
