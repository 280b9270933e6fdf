use std::sync::Arc;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    commands::{self, Command},
    completion::GenerateCompletion,
    keyboard::action_keyboard,
    quiz::QuizSessionStore,
    runner, HandlerResult,
};

/// Dispatch tree. Expects `Arc<QuizSessionStore>` and `Arc<Generator>` in the
/// dependency map.
pub fn schema<Generator>() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>>
where
    Generator: GenerateCompletion + Send + Sync + 'static,
{
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Quiz(topic)].endpoint(runner::quiz::<Generator>))
        .branch(case![Command::Explain(topic)].endpoint(commands::explain::<Generator>))
        .branch(case![Command::StudyPlan(topic)].endpoint(commands::study_plan::<Generator>))
        .branch(case![Command::Cancel].endpoint(commands::cancel));

    let text_handler = dptree::filter(|msg: Message| {
        msg.text().is_some_and(|text| !text.starts_with('/'))
    })
        .branch(
            dptree::filter(|msg: Message, store: Arc<QuizSessionStore>| {
                store.is_pending(msg.chat.id.0)
            })
            .endpoint(runner::take_answer),
        )
        .endpoint(commands::free_question::<Generator>);

    Update::filter_message()
        .branch(command_handler)
        .branch(text_handler)
        .endpoint(unsupported_message)
}

#[instrument(level = "info", skip(bot, msg), fields(chat = msg.chat.id.0))]
async fn unsupported_message(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .reply_markup(action_keyboard())
    .await?;
    Ok(())
}
