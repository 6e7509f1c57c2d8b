//! Surface style edits keyed on a resolved trait vector.
//!
//! Purely lexical: punctuation and a fixed table of connective swaps.
//! Meaning is never changed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::traits::TraitVector;

/// Enthusiasm strictly above this turns on punctuation emphasis.
pub const ENTHUSIASM_THRESHOLD: f32 = 0.8;
/// Professionalism strictly below this turns on casual connectives.
pub const CASUAL_THRESHOLD: f32 = 0.6;

static COMMA_WITHOUT_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r",([A-Za-z])").unwrap());
static TERMINAL_PERIOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^.])\.(\s*)$").unwrap());

/// Formal → casual connectives, applied on word boundaries.
const CASUAL_SUBSTITUTIONS: [(&str, &str); 10] = [
    ("However,", "But"),
    ("however,", "but"),
    ("Therefore,", "So"),
    ("therefore,", "so"),
    ("Additionally,", "Also,"),
    ("additionally,", "also,"),
    ("Furthermore,", "Plus,"),
    ("furthermore,", "plus,"),
    ("utilize", "use"),
    ("Utilize", "Use"),
];

static CASUAL_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    CASUAL_SUBSTITUTIONS
        .iter()
        .map(|(from, to)| {
            let pattern = format!(r"\b{}", regex::escape(from));
            (Regex::new(&pattern).unwrap(), *to)
        })
        .collect()
});

/// Apply the style rules triggered by `traits` to `text`.
pub fn apply_style_edits(text: &str, traits: &TraitVector) -> String {
    let mut out = text.to_string();

    if traits.professionalism() < CASUAL_THRESHOLD {
        for (rule, replacement) in CASUAL_RULES.iter() {
            out = rule.replace_all(&out, *replacement).into_owned();
        }
    }

    if traits.enthusiasm() > ENTHUSIASM_THRESHOLD {
        out = COMMA_WITHOUT_SPACE.replace_all(&out, ", $1").into_owned();
        out = TERMINAL_PERIOD.replace(&out, "$1!$2").into_owned();
    }

    out
}
