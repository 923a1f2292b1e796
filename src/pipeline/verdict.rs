//! Match-percentage extraction from a free-form model reply.
//!
//! The match prompt asks the model to state a percentage, but nothing
//! enforces it. The first `N%` in the reply decides the verdict; a reply
//! without one is [`MatchVerdict::Indeterminate`]. `N` is any run of Unicode
//! decimal digits (`\d`), so full-width and Arabic-Indic figures count too.

use crate::output::MatchVerdict;
use once_cell::sync::Lazy;
use regex::Regex;

/// Inclusive acceptance threshold.
pub const MATCH_THRESHOLD: u32 = 80;

static RE_PERCENTAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());
static RE_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").unwrap());

fn is_decimal(c: char) -> bool {
    let mut buf = [0u8; 4];
    RE_DECIMAL.is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a Unicode decimal digit.
///
/// Decimal digits are laid out in contiguous runs of ten, `0` through `9`,
/// so the value is the offset from the start of the run modulo ten.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

/// First percentage figure in `text`, saturating at `u32::MAX`.
pub fn first_percentage(text: &str) -> Option<u32> {
    let caps = RE_PERCENTAGE.captures(text)?;
    let value = caps[1]
        .chars()
        .filter_map(decimal_value)
        .try_fold(0u32, |acc, d| acc.checked_mul(10)?.checked_add(d))
        .unwrap_or(u32::MAX);
    Some(value)
}

/// Classify a match reply.
pub fn parse_verdict(response_text: &str) -> MatchVerdict {
    match first_percentage(response_text) {
        Some(percentage) if percentage >= MATCH_THRESHOLD => MatchVerdict::Accepted { percentage },
        Some(percentage) => MatchVerdict::Rejected { percentage },
        None => MatchVerdict::Indeterminate,
    }
}
