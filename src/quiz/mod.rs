use rand::{seq::SliceRandom, Rng};

pub mod error;
pub mod parser;
pub mod session;

pub use error::{MalformedReason, QuizError};
pub use parser::parse_quiz;
pub use session::{QuizSessionStore, UserKey};

/// Every generated question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// A multiple-choice question in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
}

/// Result of grading a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub selected_index: usize,
    pub correct_index: usize,
    pub correct_option_text: String,
}

impl QuizQuestion {
    pub fn new(
        text: String,
        options: [String; OPTION_COUNT],
        correct_index: usize,
    ) -> Result<Self, QuizError> {
        if correct_index >= OPTION_COUNT {
            return Err(QuizError::MalformedQuiz(
                MalformedReason::CorrectIndexOutOfRange(correct_index),
            ));
        }

        Ok(Self {
            text,
            options,
            correct_index,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Reorders the options so that `new[i] = old[order[i]]`, moving the
    /// correct index along with its option.
    ///
    /// Returns `None` when `order` is not a permutation of `0..OPTION_COUNT`.
    /// The index follows the permutation; option texts are never compared.
    pub fn permuted(&self, order: [usize; OPTION_COUNT]) -> Option<Self> {
        let mut seen = [false; OPTION_COUNT];
        for &idx in &order {
            if idx >= OPTION_COUNT || seen[idx] {
                return None;
            }
            seen[idx] = true;
        }

        Some(self.reorder(order))
    }

    /// Same question with its options in a uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut order: [usize; OPTION_COUNT] = std::array::from_fn(|i| i);
        order.shuffle(rng);
        self.reorder(order)
    }

    // `order` must be a permutation of 0..OPTION_COUNT
    fn reorder(&self, order: [usize; OPTION_COUNT]) -> Self {
        let options = order.map(|idx| self.options[idx].clone());
        let correct_index = order
            .iter()
            .enumerate()
            .fold(0, |found, (new, &old)| {
                if old == self.correct_index {
                    new
                } else {
                    found
                }
            });

        Self {
            text: self.text.clone(),
            options,
            correct_index,
        }
    }

    pub(crate) fn grade(&self, selected_index: usize) -> AnswerOutcome {
        AnswerOutcome {
            correct: selected_index == self.correct_index,
            selected_index,
            correct_index: self.correct_index,
            correct_option_text: self.correct_option().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_plus_two() -> QuizQuestion {
        QuizQuestion::new(
            "2+2?".into(),
            ["3".into(), "4".into(), "5".into(), "6".into()],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_index() {
        let err = QuizQuestion::new(
            "q".into(),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            4,
        )
        .unwrap_err();
        assert_eq!(
            err,
            QuizError::MalformedQuiz(MalformedReason::CorrectIndexOutOfRange(4))
        );
    }

    #[test]
    fn test_permuted_moves_correct_option() {
        let shuffled = two_plus_two().permuted([0, 2, 3, 1]).unwrap();
        assert_eq!(shuffled.options(), ["3", "5", "6", "4"]);
        assert_eq!(shuffled.correct_index(), 3);
        assert_eq!(shuffled.correct_option(), "4");
    }

    #[test]
    fn test_permuted_rejects_non_bijection() {
        assert!(two_plus_two().permuted([0, 0, 1, 2]).is_none());
        assert!(two_plus_two().permuted([0, 1, 2, 7]).is_none());
    }

    #[test]
    fn test_permuted_with_duplicate_texts() {
        let question = QuizQuestion::new(
            "pick the second".into(),
            ["same".into(), "same".into(), "x".into(), "y".into()],
            1,
        )
        .unwrap();

        // identical texts: only the tracked index tells them apart
        let shuffled = question.permuted([1, 0, 3, 2]).unwrap();
        assert_eq!(shuffled.correct_index(), 0);

        let shuffled = question.permuted([3, 2, 0, 1]).unwrap();
        assert_eq!(shuffled.correct_index(), 3);
    }

    #[test]
    fn test_shuffled_keeps_options_and_answer() {
        use rand::{rngs::StdRng, SeedableRng};

        let question = two_plus_two();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let shuffled = question.shuffled(&mut rng);
            let mut options = shuffled.options().to_vec();
            options.sort();
            assert_eq!(options, ["3", "4", "5", "6"]);
            assert_eq!(shuffled.correct_option(), "4");
        }
    }

    #[test]
    fn test_grade() {
        let question = two_plus_two();
        let outcome = question.grade(1);
        assert!(outcome.correct);
        assert_eq!(outcome.correct_option_text, "4");

        let outcome = question.grade(2);
        assert!(!outcome.correct);
        assert_eq!(outcome.selected_index, 2);
        assert_eq!(outcome.correct_index, 1);
    }
}
