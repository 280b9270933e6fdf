pub mod commands;
pub mod completion;
pub mod config;
mod keyboard;
pub mod markdown;
pub mod quiz;
pub mod runner;
pub mod schema;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
