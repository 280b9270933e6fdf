use std::{future::Future, sync::Arc};

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatAction, Message},
    Bot,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::{
    commands::AI_UNAVAILABLE,
    completion::{quiz_prompt, CompletionError, GenerateCompletion},
    keyboard::{options_keyboard, remove_keyboard},
    markdown::{render_outcome, render_question, RenderFormat},
    quiz::{parse_quiz, QuizError, QuizQuestion, QuizSessionStore, UserKey},
    HandlerResult,
};

/// Markup used for every quiz message the bot sends.
pub const QUIZ_FORMAT: RenderFormat = RenderFormat::MarkdownV2;

#[derive(Error, Debug)]
pub enum FetchQuizError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Quiz(#[from] QuizError),
}

#[derive(Error, Debug)]
pub enum PresentQuizError<E> {
    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error("quiz question was not delivered: {0}")]
    Delivery(E),
}

/// Starts a quiz for `user` and hands the shuffled question to `send`.
///
/// A failed `send` drops the session again, so the user is never graded
/// against a question they did not receive.
pub async fn present_quiz<Deliver, Fut, E>(
    store: &QuizSessionStore,
    user: UserKey,
    question: QuizQuestion,
    send: Deliver,
) -> Result<(), PresentQuizError<E>>
where
    Deliver: FnOnce(QuizQuestion) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let presented = store.start_quiz(user, question)?;

    if let Err(e) = send(presented).await {
        store.cancel(user);
        return Err(PresentQuizError::Delivery(e));
    }
    Ok(())
}

/// Asks the model for a question on `topic` and parses the completion.
pub async fn fetch_quiz<Generator: GenerateCompletion>(
    generator: &Generator,
    topic: &str,
    format: RenderFormat,
) -> Result<QuizQuestion, FetchQuizError> {
    let completion = generator.complete(&quiz_prompt(topic)).await?;
    parse_quiz(&completion, format).map_err(|e| {
        warn!(completion = %completion, "model reply does not follow the quiz template: {}", e);
        e.into()
    })
}

#[instrument(level = "info", skip(bot, msg, store, generator), fields(chat = msg.chat.id.0))]
pub(crate) async fn quiz<Generator: GenerateCompletion>(
    bot: Bot,
    msg: Message,
    topic: String,
    store: Arc<QuizSessionStore>,
    generator: Arc<Generator>,
) -> HandlerResult {
    let user = msg.chat.id.0;

    // Skip the completion call for a pending user; start_quiz enforces this too.
    if store.is_pending(user) {
        bot.send_message(msg.chat.id, QuizError::ActiveQuizExists.user_message())
            .await?;
        return Ok(());
    }

    // typing indicator is best-effort
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

    let question = match fetch_quiz(generator.as_ref(), &topic, QUIZ_FORMAT).await {
        Ok(question) => question,
        Err(FetchQuizError::Quiz(e)) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
            return Ok(());
        }
        Err(FetchQuizError::Completion(e)) => {
            error!("completion failed: {}", e);
            bot.send_message(msg.chat.id, AI_UNAVAILABLE).await?;
            return Ok(());
        }
    };

    let sent = present_quiz(&store, user, question, |presented| {
        let mut request = bot
            .send_message(msg.chat.id, render_question(&presented, QUIZ_FORMAT))
            .reply_markup(options_keyboard(&presented));
        if let Some(mode) = QUIZ_FORMAT.parse_mode() {
            request = request.parse_mode(mode);
        }
        async move { request.await.map(|_| ()) }
    })
    .await;

    match sent {
        Ok(()) => Ok(()),
        Err(PresentQuizError::Quiz(e)) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
            Ok(())
        }
        Err(PresentQuizError::Delivery(e)) => {
            error!("quiz question could not be sent: {}", e);
            Err(e.into())
        }
    }
}

#[instrument(level = "info", skip(bot, msg, store), fields(chat = msg.chat.id.0))]
pub(crate) async fn take_answer(
    bot: Bot,
    msg: Message,
    store: Arc<QuizSessionStore>,
) -> HandlerResult {
    let reply = msg.text().unwrap_or_default();

    match store.submit_answer(msg.chat.id.0, reply) {
        Ok(outcome) => {
            info!(correct = outcome.correct, "answer graded");
            let mut request = bot
                .send_message(msg.chat.id, render_outcome(&outcome, QUIZ_FORMAT))
                .reply_markup(remove_keyboard());
            if let Some(mode) = QUIZ_FORMAT.parse_mode() {
                request = request.parse_mode(mode);
            }
            request.await?;
        }
        Err(e) => {
            info!("reply not graded: {}", e);
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }

    Ok(())
}
