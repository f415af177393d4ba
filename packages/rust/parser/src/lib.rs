//! Exam document parser.
//!
//! Turns a line-oriented exam document into ordered [`QuestionRecord`]s:
//! - `## Section` headers set the section of subsequent questions
//! - `12. Question text` opens a new question
//! - `A. x B. y` lines add options to the open question
//! - `答案：…` sets the answer and may reclassify the question as fill-in

mod builder;
mod classify;
mod line;
mod options;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, instrument};

use quizbank_shared::{QuestionRecord, QuestionType, QuizBankError, Result};

pub use builder::QuestionBuilder;
pub use classify::classify_answer;
pub use line::{LineKind, classify_line};
pub use options::scan_options;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a whole document held in memory. Malformed lines are skipped, never rejected.
pub fn parse_document(content: &str) -> Vec<QuestionRecord> {
    let mut builder = QuestionBuilder::new();
    for line in physical_lines(content) {
        builder.feed_line(line);
    }
    builder.finish()
}

/// Split on `\n`, `\r\n` and a lone `\r`.
fn physical_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().flat_map(|line| line.split('\r'))
}

/// Read and parse a UTF-8 document from disk.
///
/// An unreadable file or invalid UTF-8 aborts before any parsing happens.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn parse_file(path: &Path) -> Result<Vec<QuestionRecord>> {
    let bytes = std::fs::read(path).map_err(|e| QuizBankError::io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|e| {
        QuizBankError::parse(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;

    let records = parse_document(&content);
    info!(questions = records.len(), "parsed exam document");
    Ok(records)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-type and per-section counts of a parsed bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub total: usize,
    pub choice: usize,
    pub fill: usize,
    /// Question count per section, in section name order.
    pub sections: BTreeMap<String, usize>,
}

impl ParseSummary {
    pub fn of(records: &[QuestionRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.kind {
                QuestionType::Choice => summary.choice += 1,
                QuestionType::Fill => summary.fill += 1,
            }
            *summary.sections.entry(record.section.clone()).or_default() += 1;
        }

        summary
    }
}
