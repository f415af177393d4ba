//! Question bank persistence (`questions.json`).

use std::path::Path;

use tracing::{debug, info, instrument};

use quizbank_shared::{QuestionRecord, QuizBankError, Result};

/// Write the bank as a pretty-printed JSON array, creating parent directories.
#[instrument(skip_all, fields(path = %path.display(), questions = records.len()))]
pub fn save_bank(path: &Path, records: &[QuestionRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| QuizBankError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(records).map_err(|e| QuizBankError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| QuizBankError::io(path, e))?;
    info!("saved question bank");
    Ok(())
}

/// Load a bank written by [`save_bank`] (or edited by hand).
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_bank(path: &Path) -> Result<Vec<QuestionRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| QuizBankError::io(path, e))?;
    let records: Vec<QuestionRecord> =
        serde_json::from_str(&content).map_err(|e| QuizBankError::json(path, e))?;
    debug!(questions = records.len(), "loaded question bank");
    Ok(records)
}

/// Raw bank contents, handed out verbatim to quiz consumers.
pub fn read_bank_raw(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(QuizBankError::validation(format!(
            "Quiz data not found: {}",
            path.display()
        )));
    }
    std::fs::read_to_string(path).map_err(|e| QuizBankError::io(path, e))
}
