use std::{error::Error, sync::Arc};

use aimentorbot::{
    completion::TogetherClient,
    config::{self, Config},
    quiz::QuizSessionStore,
    schema::schema,
};
use teloxide::{
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks::{self, Options},
};
use tracing::{error, info};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing(&config::log_level());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let bot = Bot::new(config.telegram_token.clone());
    let store = Arc::new(QuizSessionStore::new());
    let generator = Arc::new(TogetherClient::new(&config.completion));
    info!(model = %config.completion.model, "Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema::<TogetherClient>())
        .dependencies(dptree::deps![store, generator])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            info!(url = %webhook.url, addr = %webhook.addr, "listening for webhook updates");
            let options = Options::new(webhook.addr, webhook.url);
            let listener = match webhooks::axum(bot, options).await {
                Ok(listener) => listener,
                Err(e) => {
                    error!("failed to build a webhook listener: {}", e);
                    return Err(e.into());
                }
            };
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => {
            info!("polling for updates");
            dispatcher.dispatch().await
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        // teloxide logs through the `log` crate
        let _ = tracing_log::LogTracer::init();
    }
}
