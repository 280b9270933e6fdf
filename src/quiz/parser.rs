//! Line-oriented parser for model-generated quiz completions.
//!
//! Expected template:
//!
//! ```text
//! Question: <text>
//! 1. <option>
//! 2. <option>
//! 3. <option>
//! 4. <option>
//! Answer: <1-4>
//! ```

use tracing::debug;

use super::{MalformedReason, QuizError, QuizQuestion, OPTION_COUNT};
use crate::markdown::RenderFormat;

const QUESTION_LABEL: &str = "Question:";
const ANSWER_LABEL: &str = "Answer:";
const OPTION_SEPARATOR: &str = ". ";
const TEMPLATE_LINES: usize = OPTION_COUNT + 2;

/// Parses a raw completion into a question, escaping extracted text for `format`.
///
/// Blank lines are skipped and anything after the `Answer:` line is ignored.
/// The returned question keeps the model's option order.
pub fn parse_quiz(raw: &str, format: RenderFormat) -> Result<QuizQuestion, QuizError> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < TEMPLATE_LINES {
        return Err(MalformedReason::TooFewLines { found: lines.len() }.into());
    }

    let text = parse_question_line(lines[0])?;

    let mut options: [String; OPTION_COUNT] = Default::default();
    for (i, option) in options.iter_mut().enumerate() {
        let line = i + 1;
        *option = format.escape(parse_option_line(lines[line], line)?).into_owned();
    }

    let answer = parse_answer_line(lines[OPTION_COUNT + 1])?;

    debug!(question = text, answer, "parsed quiz completion");

    QuizQuestion::new(format.escape(text).into_owned(), options, answer - 1)
}

fn parse_question_line(line: &str) -> Result<&str, MalformedReason> {
    let text = line
        .strip_prefix(QUESTION_LABEL)
        .ok_or(MalformedReason::MissingQuestionLabel)?
        .trim();

    if text.is_empty() {
        return Err(MalformedReason::EmptyQuestion);
    }

    Ok(text)
}

fn parse_option_line(line: &str, line_no: usize) -> Result<&str, MalformedReason> {
    let (number, text) = line
        .split_once(OPTION_SEPARATOR)
        .ok_or(MalformedReason::MissingOptionSeparator { line: line_no })?;

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(MalformedReason::MissingOptionSeparator { line: line_no });
    }

    Ok(text.trim())
}

fn parse_answer_line(line: &str) -> Result<usize, MalformedReason> {
    let value = line
        .strip_prefix(ANSWER_LABEL)
        .ok_or(MalformedReason::MissingAnswerLabel)?
        .trim();

    let answer: i64 = value
        .parse()
        .map_err(|_| MalformedReason::NonNumericAnswer(value.to_owned()))?;

    match usize::try_from(answer) {
        Ok(n) if (1..=OPTION_COUNT).contains(&n) => Ok(n),
        _ => Err(MalformedReason::AnswerOutOfRange(answer)),
    }
}
