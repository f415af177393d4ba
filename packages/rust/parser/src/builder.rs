//! Line-by-line question assembly.
//!
//! At most one record is open at a time. A new question line flushes the open
//! record unconditionally, complete or not; the end of input flushes the last one.

use tracing::{debug, trace};

use quizbank_shared::{DEFAULT_SECTION, QuestionRecord, QuestionType};

use crate::classify::classify_answer;
use crate::line::{LineKind, classify_line};
use crate::options::scan_options;

/// Parser state: either idle or holding the record under construction.
#[derive(Debug)]
enum BuilderState {
    NoOpenQuestion,
    OpenQuestion(QuestionRecord),
}

/// Incremental question builder. Feed lines in document order, then [`finish`](Self::finish).
#[derive(Debug)]
pub struct QuestionBuilder {
    state: BuilderState,
    current_section: String,
    finished: Vec<QuestionRecord>,
    line_no: usize,
    ignored_lines: usize,
}

impl Default for QuestionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionBuilder {
    pub fn new() -> Self {
        Self {
            state: BuilderState::NoOpenQuestion,
            current_section: DEFAULT_SECTION.to_string(),
            finished: Vec::new(),
            line_no: 0,
            ignored_lines: 0,
        }
    }

    /// Process one physical line. Never fails: lines that cannot attach to
    /// an open question are dropped.
    pub fn feed_line(&mut self, raw: &str) {
        self.line_no += 1;

        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        match classify_line(line) {
            LineKind::Section(name) => {
                trace!(line = self.line_no, section = name, "section header");
                self.current_section = name.to_string();
            }
            LineKind::QuestionStart { id, text } => {
                let record = QuestionRecord::open(id, text, self.current_section.as_str());
                let previous =
                    std::mem::replace(&mut self.state, BuilderState::OpenQuestion(record));
                if let BuilderState::OpenQuestion(done) = previous {
                    self.finished.push(done);
                }
            }
            LineKind::Answer(answer) => match &mut self.state {
                BuilderState::OpenQuestion(record) => {
                    record.answer = answer.to_string();
                    // Only ever moves a record to fill; choice is the starting value.
                    if classify_answer(answer) == QuestionType::Fill {
                        record.kind = QuestionType::Fill;
                    }
                }
                BuilderState::NoOpenQuestion => self.ignore("answer"),
            },
            LineKind::Content => match &mut self.state {
                BuilderState::OpenQuestion(record) => {
                    record.options.extend(scan_options(line));
                }
                BuilderState::NoOpenQuestion => self.ignore("content"),
            },
        }
    }

    /// Flush the open record (if any) and return all records in document order.
    pub fn finish(mut self) -> Vec<QuestionRecord> {
        if let BuilderState::OpenQuestion(done) = self.state {
            self.finished.push(done);
        }

        debug!(
            questions = self.finished.len(),
            lines = self.line_no,
            ignored = self.ignored_lines,
            "question builder finished"
        );

        self.finished
    }

    fn ignore(&mut self, kind: &str) {
        self.ignored_lines += 1;
        trace!(line = self.line_no, kind, "no open question, line ignored");
    }
}
