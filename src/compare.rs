use serde::{Deserialize, Serialize};

/// How a submitted answer is matched against the correct one.
///
/// The practice screens this engine replaces disagreed on this: most compared
/// raw strings, the chapter tests trimmed free-form input first. The choice is
/// per-skill configuration rather than a single hardcoded rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "epsilon")]
pub enum AnswerComparator {
    /// Byte-for-byte equality. The default.
    Exact,
    /// Trimmed, case-folded, inner whitespace collapsed to single spaces.
    Normalized,
    /// Leading numeric values compared within `epsilon`; any trailing unit
    /// text is compared normalized.
    NumericTolerance(f64),
}

impl Default for AnswerComparator {
    fn default() -> Self {
        AnswerComparator::Exact
    }
}

impl AnswerComparator {
    pub fn matches(&self, submitted: &str, correct: &str) -> bool {
        match self {
            AnswerComparator::Exact => submitted == correct,
            AnswerComparator::Normalized => normalize(submitted) == normalize(correct),
            AnswerComparator::NumericTolerance(epsilon) => {
                match (split_numeric(submitted), split_numeric(correct)) {
                    (Some((a, unit_a)), Some((b, unit_b))) => {
                        (a - b).abs() <= *epsilon && normalize(&unit_a) == normalize(&unit_b)
                    }
                    // Non-numeric content falls back to normalized comparison.
                    _ => normalize(submitted) == normalize(correct),
                }
            }
        }
    }
}

/// Trim, lowercase, collapse runs of whitespace.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split "42.5 cm" into (42.5, "cm"). Returns None when no leading number.
fn split_numeric(s: &str) -> Option<(f64, String)> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .take_while(|(i, c)| {
            c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    let value: f64 = trimmed[..end].parse().ok()?;
    Some((value, trimmed[end..].trim().to_string()))
}
