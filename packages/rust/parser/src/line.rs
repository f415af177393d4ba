//! Line classification for exam documents.
//!
//! Patterns are tried in a fixed priority order on a stripped line:
//! - `## Section Name`
//! - `12. Question text`
//! - `答案：B` / `答案:B`
//! - anything else is content (a candidate for option scanning)

use std::sync::LazyLock;

use regex::Regex;

/// What a single stripped, non-empty line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `## name`; the name is trimmed.
    Section(&'a str),
    /// `<id>. text`.
    QuestionStart { id: u64, text: &'a str },
    /// `答案：text`; the answer is trimmed.
    Answer(&'a str),
    /// Everything else.
    Content,
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `## Section` (at least one whitespace after the marker).
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.*)$").expect("section regex"));

/// Matches `<digits>.` followed by the question text. `\d` is any Unicode
/// decimal digit, so full-width `１２.` numbers a question too.
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("question regex"));

/// A single Unicode decimal digit (general category Nd).
static DECIMAL_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Nd}$").expect("decimal digit regex"));

/// Matches `答案` with a half-width or full-width colon.
static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^答案[：:]\s*(.*)$").expect("answer regex"));

/// Classify one line. The caller strips it and skips blanks first.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(caps) = SECTION_RE.captures(line) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::Section(name.trim());
    }

    if let Some(caps) = QUESTION_RE.captures(line) {
        // Ids too large for u64 cannot be stored; the line falls through to content.
        if let Some(id) = parse_question_number(&caps[1]) {
            let text = caps.get(2).map_or("", |m| m.as_str());
            return LineKind::QuestionStart { id, text };
        }
    }

    if let Some(caps) = ANSWER_RE.captures(line) {
        let answer = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::Answer(answer.trim());
    }

    LineKind::Content
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0; 4];
    DECIMAL_DIGIT_RE.is_match(c.encode_utf8(&mut buf))
}

/// Value of one decimal digit from any script.
///
/// Unicode encodes every Nd digit set as a contiguous `0..=9` run, and
/// adjacent runs (the mathematical digit styles) always start on a zero, so
/// the value is the distance from the start of the run block, modulo 10.
fn digit_value(c: char) -> Option<u64> {
    if let Some(d) = c.to_digit(10) {
        return Some(u64::from(d));
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut start = u32::from(c);
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some(u64::from((u32::from(c) - start) % 10))
}

/// Numeric value of a run of decimal digits, or `None` on overflow.
fn parse_question_number(digits: &str) -> Option<u64> {
    digits.chars().try_fold(0u64, |acc, c| {
        acc.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}
