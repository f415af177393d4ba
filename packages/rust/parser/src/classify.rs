//! Answer-based question type heuristic.

use quizbank_shared::QuestionType;

/// Labels that make an answer look like a choice.
const CHOICE_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// Decide the question type from its answer text alone.
///
/// Anything longer than one character, or not one of `A`..`D`, is a fill-in
/// answer. A one-character fill answer that happens to be `A`..`D` cannot be
/// told apart from a choice and stays [`QuestionType::Choice`].
pub fn classify_answer(answer: &str) -> QuestionType {
    let answer = answer.trim();
    if answer.chars().count() > 1 || !CHOICE_LABELS.contains(&answer) {
        QuestionType::Fill
    } else {
        QuestionType::Choice
    }
}
