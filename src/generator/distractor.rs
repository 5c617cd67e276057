use crate::compare::normalize;
use crate::rng::RandomSource;

/// Bound on strategy draws before falling back to arbitrary unique filler.
const MAX_ATTEMPTS: usize = 100;

/// A correct answer in a form the synthesizer can perturb, plus the unit
/// suffix (if any) carried through formatting.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerValue {
    kind: ValueKind,
    unit: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
enum ValueKind {
    Integer(i64),
    Decimal { value: f64, precision: usize },
    Text(String),
}

impl AnswerValue {
    pub fn integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer(value),
            unit: None,
        }
    }

    pub fn decimal(value: f64, precision: usize) -> Self {
        Self {
            kind: ValueKind::Decimal { value, precision },
            unit: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Text(value.into()),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Display form, e.g. `24 cm`, `0.50`, `one half`.
    pub fn render(&self) -> String {
        let body = match &self.kind {
            ValueKind::Integer(n) => n.to_string(),
            ValueKind::Decimal { value, precision } => format!("{value:.precision$}"),
            ValueKind::Text(s) => s.clone(),
        };
        match &self.unit {
            Some(unit) => format!("{body} {unit}"),
            None => body,
        }
    }

    fn numeric(&self) -> Option<f64> {
        match &self.kind {
            ValueKind::Integer(n) => Some(*n as f64),
            ValueKind::Decimal { value, .. } => Some(*value),
            ValueKind::Text(_) => None,
        }
    }

    /// Shift a numeric value by `delta` steps of its own granularity:
    /// whole units for integers, one unit in the last decimal place for
    /// decimals. Text values are returned unchanged.
    fn offset(&self, delta: i64) -> Self {
        let kind = match &self.kind {
            ValueKind::Integer(n) => ValueKind::Integer(n + delta),
            ValueKind::Decimal { value, precision } => ValueKind::Decimal {
                value: value + delta as f64 * 10f64.powi(-(*precision as i32)),
                precision: *precision,
            },
            ValueKind::Text(s) => ValueKind::Text(s.clone()),
        };
        Self {
            kind,
            unit: self.unit.clone(),
        }
    }
}

/// How wrong answers get manufactured. Data supplied by the skill, not
/// hardcoded per screen.
#[derive(Clone, Debug)]
pub enum DistractorStrategy {
    /// Correct value nudged by a nonzero delta up to `max_delta` steps.
    OffsetByDelta { max_delta: i64 },
    /// Generator-supplied wrong results of the underlying computation,
    /// e.g. the area where the perimeter was asked, or a sum where a
    /// difference was. Falls back to offsets once exhausted.
    CommonMisconception { candidates: Vec<AnswerValue> },
    /// Same magnitude, wrong unit.
    UnitConfusion { units: Vec<String> },
    /// One digit of the rendered answer changed.
    StructuralNearMiss,
}

/// Produce exactly `count` distractors: none equal to `correct`, no internal
/// duplicates, both judged on the normalized string form. Strategy draws are
/// bounded; unique numeric filler covers any shortfall.
pub fn synthesize(
    correct: &AnswerValue,
    count: usize,
    strategy: &DistractorStrategy,
    rng: &mut RandomSource,
) -> Vec<String> {
    let correct_key = normalize(&correct.render());
    let mut out: Vec<String> = Vec::with_capacity(count);
    let mut keys: Vec<String> = Vec::with_capacity(count);
    let mut misconceptions = match strategy {
        DistractorStrategy::CommonMisconception { candidates } => candidates.clone(),
        _ => Vec::new(),
    };

    let mut attempts = 0;
    while out.len() < count && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let candidate = if !misconceptions.is_empty() {
            misconceptions.remove(0).render()
        } else {
            propose(correct, strategy, rng)
        };
        let key = normalize(&candidate);
        if key != correct_key && !keys.contains(&key) {
            keys.push(key);
            out.push(candidate);
        }
    }

    // Strategy under-produced: pad with arbitrary-but-unique values.
    let mut step = 1;
    while out.len() < count {
        let candidate = filler(correct, step);
        let key = normalize(&candidate);
        if key != correct_key && !keys.contains(&key) {
            keys.push(key);
            out.push(candidate);
        }
        step += 1;
    }

    out
}

fn propose(correct: &AnswerValue, strategy: &DistractorStrategy, rng: &mut RandomSource) -> String {
    match strategy {
        DistractorStrategy::OffsetByDelta { max_delta } => {
            offset_candidate(correct, (*max_delta).max(1), rng)
        }
        // Candidate list already drained by the caller.
        DistractorStrategy::CommonMisconception { .. } => offset_candidate(correct, 5, rng),
        DistractorStrategy::UnitConfusion { units } => {
            if units.is_empty() {
                return offset_candidate(correct, 5, rng);
            }
            let unit = rng.pick(units);
            match &correct.unit {
                // Occasionally also nudge the magnitude so more than
                // `units.len()` distinct candidates exist.
                Some(current) if current == unit => offset_candidate(correct, 3, rng),
                _ => {
                    let base = if rng.next_bool(0.3) {
                        nonzero_offset(correct, 3, rng)
                    } else {
                        correct.clone()
                    };
                    base.with_unit(unit.clone()).render()
                }
            }
        }
        DistractorStrategy::StructuralNearMiss => near_miss(&correct.render(), rng)
            .unwrap_or_else(|| offset_candidate(correct, 5, rng)),
    }
}

fn offset_candidate(correct: &AnswerValue, max_delta: i64, rng: &mut RandomSource) -> String {
    nonzero_offset(correct, max_delta, rng).render()
}

fn nonzero_offset(correct: &AnswerValue, max_delta: i64, rng: &mut RandomSource) -> AnswerValue {
    let magnitude = rng.next_int(1, max_delta);
    let delta = if rng.next_bool(0.5) { magnitude } else { -magnitude };
    correct.offset(delta)
}

/// Replace one digit of the rendered answer. None when it has no digits.
fn near_miss(rendered: &str, rng: &mut RandomSource) -> Option<String> {
    let digit_positions: Vec<usize> = rendered
        .char_indices()
        .filter(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .collect();
    if digit_positions.is_empty() {
        return None;
    }
    let pos = *rng.pick(&digit_positions);
    let old = rendered.as_bytes()[pos] - b'0';
    let mut replacement = rng.next_int(0, 9) as u8;
    if replacement == old {
        replacement = (replacement + 1) % 10;
    }
    let mut bytes = rendered.as_bytes().to_vec();
    bytes[pos] = b'0' + replacement;
    String::from_utf8(bytes).ok()
}

fn filler(correct: &AnswerValue, step: i64) -> String {
    match correct.numeric() {
        Some(_) => correct.offset(step * 10 + 1).render(),
        None => {
            let mut s = correct.render();
            s.push_str(&" again".repeat(step as usize));
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_returns_exact_count() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(28).with_unit("cm");
        let strategy = DistractorStrategy::OffsetByDelta { max_delta: 6 };
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        for d in &distractors {
            assert_ne!(normalize(d), normalize("28 cm"));
        }
    }

    #[test]
    fn test_no_internal_duplicates() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(10);
        let strategy = DistractorStrategy::OffsetByDelta { max_delta: 2 };
        // Only 4 possible offsets (8, 9, 11, 12) but 3 requested: all unique.
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        let mut keys: Vec<String> = distractors.iter().map(|d| normalize(d)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_under_producing_strategy_pads_with_filler() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(5);
        // max_delta 1 yields only "4" and "6"; the third must come from filler.
        let strategy = DistractorStrategy::OffsetByDelta { max_delta: 1 };
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        let mut keys: Vec<String> = distractors.iter().map(|d| normalize(d)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
        assert!(!keys.contains(&"5".to_string()));
    }

    #[test]
    fn test_misconception_candidates_come_first() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(28).with_unit("cm");
        let strategy = DistractorStrategy::CommonMisconception {
            candidates: vec![
                AnswerValue::integer(40).with_unit("cm"), // area instead of perimeter
                AnswerValue::integer(14).with_unit("cm"), // forgot to double
            ],
        };
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        assert_eq!(distractors[0], "40 cm");
        assert_eq!(distractors[1], "14 cm");
    }

    #[test]
    fn test_misconception_equal_to_correct_is_rejected() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(28).with_unit("cm");
        let strategy = DistractorStrategy::CommonMisconception {
            candidates: vec![AnswerValue::integer(28).with_unit("CM")],
        };
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        for d in &distractors {
            assert_ne!(normalize(d), normalize("28 cm"));
        }
    }

    #[test]
    fn test_unit_confusion_swaps_units() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(500).with_unit("g");
        let strategy = DistractorStrategy::UnitConfusion {
            units: vec!["kg".to_string(), "mg".to_string()],
        };
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        assert!(
            distractors
                .iter()
                .any(|d| d.ends_with("kg") || d.ends_with("mg"))
        );
    }

    #[test]
    fn test_near_miss_changes_one_digit() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::integer(347);
        let strategy = DistractorStrategy::StructuralNearMiss;
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        for d in &distractors {
            assert_ne!(d, "347");
        }
    }

    #[test]
    fn test_decimal_offsets_move_last_place() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::decimal(0.5, 2);
        let strategy = DistractorStrategy::OffsetByDelta { max_delta: 3 };
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        for d in &distractors {
            let v: f64 = d.parse().unwrap();
            assert!((v - 0.5).abs() > 1e-9);
            assert!((v - 0.5).abs() < 0.05);
        }
    }

    #[test]
    fn test_text_answer_fillers_stay_unique() {
        let mut rng = RandomSource::seeded(42);
        let correct = AnswerValue::text("one half");
        let strategy = DistractorStrategy::StructuralNearMiss; // no digits to mutate
        let distractors = synthesize(&correct, 3, &strategy, &mut rng);
        assert_eq!(distractors.len(), 3);
        let mut keys: Vec<String> = distractors.iter().map(|d| normalize(d)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }
}
