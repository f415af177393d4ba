//! Structural sanity checks over a finished question bank.
//!
//! All findings are advisory. Nothing here mutates the bank or fails on
//! suspicious data; only an unreadable bank file is an error.

use std::fmt;
use std::path::Path;

use tracing::{instrument, warn};

use quizbank_shared::{QuestionRecord, QuestionType, Result};

use crate::bank::load_bank;

/// How many empty-answer fill questions are quoted in the report.
const EMPTY_ANSWER_SAMPLES: usize = 3;

/// How many single-character fill answers are quoted in the report.
const SINGLE_CHAR_SAMPLES: usize = 5;

/// A question quoted as an example of a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedQuestion {
    pub id: u64,
    pub answer: String,
    pub question: String,
}

impl From<&QuestionRecord> for FlaggedQuestion {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            id: record.id,
            answer: record.answer.clone(),
            question: record.question.clone(),
        }
    }
}

/// One class of anomaly, present only when at least one record is affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankWarning {
    /// Fill questions whose trimmed answer is empty.
    EmptyFillAnswers {
        count: usize,
        samples: Vec<FlaggedQuestion>,
    },
    /// Fill questions that nevertheless carry options.
    FillWithOptions { count: usize },
    /// Choice questions without a single option.
    ChoiceWithoutOptions { count: usize },
    /// Fill questions with a one-character answer; possibly misclassified.
    SingleCharFillAnswers {
        count: usize,
        samples: Vec<FlaggedQuestion>,
    },
}

impl BankWarning {
    /// Number of affected records (not just the quoted samples).
    pub fn count(&self) -> usize {
        match self {
            Self::EmptyFillAnswers { count, .. }
            | Self::FillWithOptions { count }
            | Self::ChoiceWithoutOptions { count }
            | Self::SingleCharFillAnswers { count, .. } => *count,
        }
    }
}

impl fmt::Display for BankWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFillAnswers { count, samples } => {
                write!(f, "WARNING: {count} fill questions have empty answers!")?;
                for q in samples {
                    write!(f, "\n  ID {}: {}", q.id, q.question)?;
                }
                Ok(())
            }
            Self::FillWithOptions { count } => {
                write!(f, "WARNING: {count} fill questions have options!")
            }
            Self::ChoiceWithoutOptions { count } => {
                write!(f, "WARNING: {count} choice questions have no options!")
            }
            Self::SingleCharFillAnswers { count, samples } => {
                write!(
                    f,
                    "WARNING: {count} fill questions have single-letter answers (might be choice?):"
                )?;
                for q in samples {
                    write!(
                        f,
                        "\n  ID {}: Answer='{}' Question='{}'",
                        q.id, q.answer, q.question
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Counts and warnings for one bank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankReport {
    pub total: usize,
    pub fill_count: usize,
    pub choice_count: usize,
    pub warnings: Vec<BankWarning>,
}

impl BankReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for BankReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total questions: {}", self.total)?;
        writeln!(f, "Fill questions: {}", self.fill_count)?;
        write!(f, "Choice questions: {}", self.choice_count)?;
        for warning in &self.warnings {
            write!(f, "\n{warning}")?;
        }
        Ok(())
    }
}

/// Run every check over `records`. The checks are independent; one record
/// may show up under several warnings.
pub fn validate_bank(records: &[QuestionRecord]) -> BankReport {
    let fill: Vec<&QuestionRecord> = records
        .iter()
        .filter(|r| r.kind == QuestionType::Fill)
        .collect();
    let choice: Vec<&QuestionRecord> = records
        .iter()
        .filter(|r| r.kind == QuestionType::Choice)
        .collect();

    let mut warnings = Vec::new();

    let empty_answer: Vec<_> = fill
        .iter()
        .filter(|r| r.answer.trim().is_empty())
        .collect();
    if !empty_answer.is_empty() {
        warnings.push(BankWarning::EmptyFillAnswers {
            count: empty_answer.len(),
            samples: empty_answer
                .iter()
                .take(EMPTY_ANSWER_SAMPLES)
                .map(|r| FlaggedQuestion::from(**r))
                .collect(),
        });
    }

    let fill_with_options = fill.iter().filter(|r| !r.options.is_empty()).count();
    if fill_with_options > 0 {
        warnings.push(BankWarning::FillWithOptions {
            count: fill_with_options,
        });
    }

    let choice_without_options = choice.iter().filter(|r| r.options.is_empty()).count();
    if choice_without_options > 0 {
        warnings.push(BankWarning::ChoiceWithoutOptions {
            count: choice_without_options,
        });
    }

    let single_char: Vec<_> = fill
        .iter()
        .filter(|r| r.answer.trim().chars().count() == 1)
        .collect();
    if !single_char.is_empty() {
        warnings.push(BankWarning::SingleCharFillAnswers {
            count: single_char.len(),
            samples: single_char
                .iter()
                .take(SINGLE_CHAR_SAMPLES)
                .map(|r| FlaggedQuestion::from(**r))
                .collect(),
        });
    }

    BankReport {
        total: records.len(),
        fill_count: fill.len(),
        choice_count: choice.len(),
        warnings,
    }
}

/// Load a persisted bank and validate it.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn check_bank_file(path: &Path) -> Result<BankReport> {
    let records = load_bank(path)?;
    let report = validate_bank(&records);

    for warning in &report.warnings {
        warn!(count = warning.count(), "{}", first_line(warning));
    }

    Ok(report)
}

fn first_line(warning: &BankWarning) -> String {
    warning
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizbank_shared::QuestionOption;

    fn record(id: u64, kind: QuestionType, answer: &str, options: usize) -> QuestionRecord {
        let mut r = QuestionRecord::open(id, format!("题目{id}"), "章");
        r.kind = kind;
        r.answer = answer.into();
        r.options = (0..options)
            .map(|i| QuestionOption::new(["A", "B", "C", "D"][i % 4], "x"))
            .collect();
        r
    }

    #[test]
    fn null_answer_in_bank_file_is_an_empty_fill_answer() {
        let path = std::env::temp_dir().join(format!("qb-null-{}.json", uuid::Uuid::now_v7()));
        std::fs::write(
            &path,
            r#"[{"id": 3, "question": "极化率的符号", "options": [], "answer": null, "type": "fill", "section": "章"}]"#,
        )
        .unwrap();

        let report = check_bank_file(&path).expect("bank with null answer loads");
        assert_eq!(report.fill_count, 1);
        assert_eq!(
            report.warnings,
            vec![BankWarning::EmptyFillAnswers {
                count: 1,
                samples: vec![FlaggedQuestion {
                    id: 3,
                    answer: String::new(),
                    question: "极化率的符号".into(),
                }],
            }]
        );
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn clean_bank() {
        let report = validate_bank(&[
            record(1, QuestionType::Choice, "A", 4),
            record(2, QuestionType::Fill, "介电常数", 0),
        ]);
        assert!(report.is_clean());
        assert_eq!(report.total, 2);
        assert_eq!(report.fill_count, 1);
        assert_eq!(report.choice_count, 1);
    }

    #[test]
    fn empty_fill_answer_is_flagged_alone() {
        let report = validate_bank(&[record(9, QuestionType::Fill, "", 0)]);
        assert_eq!(
            report.warnings,
            vec![BankWarning::EmptyFillAnswers {
                count: 1,
                samples: vec![FlaggedQuestion {
                    id: 9,
                    answer: String::new(),
                    question: "题目9".into(),
                }],
            }]
        );
    }

    #[test]
    fn whitespace_answer_counts_as_empty() {
        let report = validate_bank(&[record(1, QuestionType::Fill, "  ", 0)]);
        assert!(matches!(
            report.warnings[0],
            BankWarning::EmptyFillAnswers { count: 1, .. }
        ));
    }

    #[test]
    fn empty_answer_samples_capped_at_three() {
        let records: Vec<_> = (1..=5)
            .map(|id| record(id, QuestionType::Fill, "", 0))
            .collect();
        let report = validate_bank(&records);
        match &report.warnings[0] {
            BankWarning::EmptyFillAnswers { count, samples } => {
                assert_eq!(*count, 5);
                let ids: Vec<_> = samples.iter().map(|s| s.id).collect();
                assert_eq!(ids, vec![1, 2, 3]);
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn single_char_samples_capped_at_five() {
        let records: Vec<_> = (1..=7)
            .map(|id| record(id, QuestionType::Fill, "χ", 0))
            .collect();
        let report = validate_bank(&records);
        match &report.warnings[0] {
            BankWarning::SingleCharFillAnswers { count, samples } => {
                assert_eq!(*count, 7);
                assert_eq!(samples.len(), 5);
                assert_eq!(samples[0].answer, "χ");
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn options_mismatch_counts() {
        let report = validate_bank(&[
            record(1, QuestionType::Fill, "文字", 2),
            record(2, QuestionType::Choice, "A", 0),
            record(3, QuestionType::Choice, "", 0),
        ]);
        assert_eq!(
            report.warnings,
            vec![
                BankWarning::FillWithOptions { count: 1 },
                BankWarning::ChoiceWithoutOptions { count: 2 },
            ]
        );
    }

    #[test]
    fn checks_are_not_exclusive() {
        // Single-character answer and options on the same fill record.
        let report = validate_bank(&[record(1, QuestionType::Fill, "x", 1)]);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0], BankWarning::FillWithOptions { count: 1 });
        assert!(matches!(
            report.warnings[1],
            BankWarning::SingleCharFillAnswers { count: 1, .. }
        ));
    }

    #[test]
    fn validation_does_not_touch_input() {
        let records = vec![record(1, QuestionType::Fill, "", 3)];
        let before = records.clone();
        let _ = validate_bank(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn report_text() {
        let report = validate_bank(&[
            record(1, QuestionType::Fill, "", 0),
            record(2, QuestionType::Fill, "δ", 0),
        ]);
        let text = report.to_string();
        assert!(text.starts_with("Total questions: 2\nFill questions: 2\nChoice questions: 0"));
        assert!(text.contains("WARNING: 1 fill questions have empty answers!\n  ID 1: 题目1"));
        assert!(text.contains("  ID 2: Answer='δ' Question='题目2'"));
    }

    #[test]
    fn check_fixture_bank() {
        let report =
            check_bank_file(Path::new("../../../fixtures/json/questions.fixture.json"))
                .expect("check fixture");
        assert_eq!(report.total, 5);
        assert_eq!(report.fill_count, 3);
        assert_eq!(report.choice_count, 2);

        let counts: Vec<_> = report.warnings.iter().map(BankWarning::count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1]);
    }

    #[test]
    fn check_unreadable_bank_fails() {
        assert!(check_bank_file(Path::new("../../../fixtures/json/nope.json")).is_err());
    }

    #[test]
    fn parsed_document_round_trip_through_checker() {
        let records = quizbank_parser::parse_document("1. 题\nA. 甲\n答案：A\n2. 填空\n答案：");
        let report = validate_bank(&records);
        assert_eq!(report.choice_count, 1);
        assert_eq!(report.fill_count, 1);
        assert!(matches!(
            report.warnings[0],
            BankWarning::EmptyFillAnswers { count: 1, .. }
        ));
    }
}
