use dashmap::{mapref::entry::Entry, DashMap};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use super::{AnswerOutcome, QuizError, QuizQuestion};

/// Chat the quiz belongs to.
pub type UserKey = i64;

/// A question that was shown to a user and is waiting for a reply.
#[derive(Debug)]
struct QuizSession {
    id: Uuid,
    question: QuizQuestion,
}

/// Holds at most one pending question per user.
///
/// Every operation goes through a single `DashMap` entry, so calls for the
/// same user are serialised on its shard lock while other users proceed in
/// parallel. No lock is held across an `.await`: all methods are synchronous.
#[derive(Debug, Default)]
pub struct QuizSessionStore {
    sessions: DashMap<UserKey, QuizSession>,
}

impl QuizSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shuffles the options and stores the question for `user`.
    ///
    /// Returns the question in the order it must be shown in.
    pub fn start_quiz(
        &self,
        user: UserKey,
        question: QuizQuestion,
    ) -> Result<QuizQuestion, QuizError> {
        self.start_quiz_with_rng(user, question, &mut rand::thread_rng())
    }

    pub fn start_quiz_with_rng<R: Rng + ?Sized>(
        &self,
        user: UserKey,
        question: QuizQuestion,
        rng: &mut R,
    ) -> Result<QuizQuestion, QuizError> {
        match self.sessions.entry(user) {
            Entry::Occupied(_) => {
                debug!(user, "quiz start rejected: session already pending");
                Err(QuizError::ActiveQuizExists)
            }
            Entry::Vacant(entry) => {
                let presented = question.shuffled(rng);

                let session = QuizSession {
                    id: Uuid::new_v4(),
                    question: presented.clone(),
                };
                info!(
                    user,
                    session = %session.id,
                    correct_index = presented.correct_index(),
                    "quiz started"
                );
                entry.insert(session);
                Ok(presented)
            }
        }
    }

    /// Grades `raw_reply` against the pending question for `user`.
    ///
    /// A graded reply (right or wrong) ends the session. A reply that is not
    /// an option number leaves it pending so the user can try again.
    pub fn submit_answer(
        &self,
        user: UserKey,
        raw_reply: &str,
    ) -> Result<AnswerOutcome, QuizError> {
        let Entry::Occupied(entry) = self.sessions.entry(user) else {
            return Err(QuizError::NoActiveQuiz);
        };

        let options = entry.get().question.options().len();
        let selected = raw_reply
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| (1..=options).contains(n))
            .ok_or_else(|| QuizError::InvalidReply(raw_reply.to_owned()))?;

        let (_, session) = entry.remove_entry();
        let outcome = session.question.grade(selected - 1);
        info!(
            user,
            session = %session.id,
            correct = outcome.correct,
            "quiz answered"
        );
        Ok(outcome)
    }

    pub fn is_pending(&self, user: UserKey) -> bool {
        self.sessions.contains_key(&user)
    }

    /// Drops the pending session for `user`, if any.
    pub fn cancel(&self, user: UserKey) -> bool {
        match self.sessions.remove(&user) {
            Some((_, session)) => {
                info!(user, session = %session.id, "quiz cancelled");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
