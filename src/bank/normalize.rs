// src/bank/normalize.rs

use serde_json::Value;

/// Normalizes a source answer to an option index.
///
/// Accepted forms, checked in order:
/// * a JSON number in `0..=3` (`2.0` counts as `2`)
/// * a single letter `A`-`D` (any case)
/// * text equal to one of the options (surrounding whitespace ignored)
/// * a numeric string in `0..=3` (`"2.0"` counts as `2`)
///
/// Anything else resolves to `0`.
pub fn normalize_answer(raw: &Value, options: &[String; 4]) -> usize {
    match raw {
        Value::Number(n) => n.as_f64().and_then(whole_index).unwrap_or(0),
        Value::String(s) => normalize_answer_str(s, options),
        _ => 0,
    }
}

fn normalize_answer_str(s: &str, options: &[String; 4]) -> usize {
    let trimmed = s.trim();

    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(idx) = "abcd".find(c.to_ascii_lowercase()) {
            return idx;
        }
    }

    if let Some(idx) = options.iter().position(|opt| opt.trim() == trimmed) {
        return idx;
    }

    trimmed
        .parse::<f64>()
        .ok()
        .and_then(whole_index)
        .unwrap_or(0)
}

/// Accepts `2` and `2.0` alike. Fractions and out-of-range values are rejected.
fn whole_index(x: f64) -> Option<usize> {
    if x.fract() == 0.0 && (0.0..=3.0).contains(&x) {
        Some(x as usize)
    } else {
        None
    }
}
