use thiserror::Error;

/// Why a completion did not match the quiz template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("expected 6 non-empty lines, found {found}")]
    TooFewLines { found: usize },

    #[error("first line has no 'Question:' label")]
    MissingQuestionLabel,

    #[error("question text is empty")]
    EmptyQuestion,

    #[error("option line {line} has no '<number>. ' separator")]
    MissingOptionSeparator { line: usize },

    #[error("last line has no 'Answer:' label")]
    MissingAnswerLabel,

    #[error("answer '{0}' is not a number")]
    NonNumericAnswer(String),

    #[error("answer {0} is outside 1..=4")]
    AnswerOutOfRange(i64),

    #[error("correct index {0} does not point at an option")]
    CorrectIndexOutOfRange(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("malformed quiz: {0}")]
    MalformedQuiz(MalformedReason),

    #[error("a quiz is already active for this user")]
    ActiveQuizExists,

    #[error("no active quiz for this user")]
    NoActiveQuiz,

    #[error("invalid reply: {0:?}")]
    InvalidReply(String),
}

impl QuizError {
    /// Text shown to the chat user for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            QuizError::MalformedQuiz(_) => "Could not generate a quiz, please try again.",
            QuizError::ActiveQuizExists => "Finish your current quiz first.",
            QuizError::NoActiveQuiz => "Use /quiz to start a quiz first.",
            QuizError::InvalidReply(_) => "Please reply with the option number (1-4).",
        }
    }
}

impl From<MalformedReason> for QuizError {
    fn from(reason: MalformedReason) -> Self {
        QuizError::MalformedQuiz(reason)
    }
}
