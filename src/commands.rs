use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatAction, Message},
    utils::command::BotCommands,
    Bot,
};
use tracing::{error, info, instrument};

use crate::{
    completion::{explain_prompt, study_plan_prompt, GenerateCompletion},
    keyboard::{action_keyboard, remove_keyboard},
    markdown::{split_message, MESSAGE_LIMIT},
    quiz::QuizSessionStore,
    HandlerResult,
};

pub(crate) const AI_UNAVAILABLE: &str =
    "Sorry, I couldn't reach the AI right now. Please try again later.";

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "start the bot.")]
    Start,
    #[command(description = "get a quiz question, optionally on a topic: /quiz <topic>.")]
    Quiz(String),
    #[command(description = "explain a topic: /explain <topic>.")]
    Explain(String),
    #[command(description = "get a study plan, optionally for a topic.")]
    StudyPlan(String),
    #[command(description = "abandon the current quiz.")]
    Cancel,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

pub(crate) async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Hello! I'm your AI Mentor Bot. 🤖\n\
         Use /studyplan to get a study plan, /quiz for a quiz,\n\
         or simply ask me anything!",
    )
    .reply_markup(action_keyboard())
    .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, store), fields(chat = msg.chat.id.0))]
pub(crate) async fn cancel(bot: Bot, msg: Message, store: Arc<QuizSessionStore>) -> HandlerResult {
    let text = if store.cancel(msg.chat.id.0) {
        "Quiz cancelled."
    } else {
        "There is no quiz to cancel."
    };
    bot.send_message(msg.chat.id, text)
        .reply_markup(remove_keyboard())
        .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, generator), fields(chat = msg.chat.id.0))]
pub(crate) async fn explain<Generator: GenerateCompletion>(
    bot: Bot,
    msg: Message,
    topic: String,
    generator: Arc<Generator>,
) -> HandlerResult {
    if topic.trim().is_empty() {
        bot.send_message(msg.chat.id, "❌ Please provide a topic. Example: /explain Python")
            .await?;
        return Ok(());
    }

    ask(&bot, &msg, generator.as_ref(), &explain_prompt(&topic)).await
}

#[instrument(level = "info", skip(bot, msg, generator), fields(chat = msg.chat.id.0))]
pub(crate) async fn study_plan<Generator: GenerateCompletion>(
    bot: Bot,
    msg: Message,
    topic: String,
    generator: Arc<Generator>,
) -> HandlerResult {
    ask(&bot, &msg, generator.as_ref(), &study_plan_prompt(&topic)).await
}

/// Forwards free text with no pending quiz straight to the model.
#[instrument(level = "info", skip(bot, msg, generator), fields(chat = msg.chat.id.0))]
pub(crate) async fn free_question<Generator: GenerateCompletion>(
    bot: Bot,
    msg: Message,
    generator: Arc<Generator>,
) -> HandlerResult {
    match msg.text() {
        Some(text) => {
            info!("user asks: {:?}", text);
            ask(&bot, &msg, generator.as_ref(), text).await
        }
        None => {
            bot.send_message(msg.chat.id, "I can only read text messages.")
                .await?;
            Ok(())
        }
    }
}

async fn ask<Generator: GenerateCompletion>(
    bot: &Bot,
    msg: &Message,
    generator: &Generator,
    prompt: &str,
) -> HandlerResult {
    // typing indicator is best-effort
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

    let reply = match generator.complete(prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("completion failed: {}", e);
            AI_UNAVAILABLE.to_owned()
        }
    };

    for chunk in split_message(&reply, MESSAGE_LIMIT) {
        bot.send_message(msg.chat.id, chunk).await?;
    }
    Ok(())
}
