use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CompletionConfig;

pub const SYSTEM_PROMPT: &str = "You are a friendly AI mentor. Help students learn complex topics, generate structured study plans, and provide clear explanations.";

pub const DEFAULT_QUIZ_TOPIC: &str = "Python programming";
pub const DEFAULT_STUDY_PLAN_TOPIC: &str = "AI and ML";

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion API error: {0}")]
    Api(#[from] OpenAIError),

    #[error("completion API returned no content")]
    EmptyResponse,
}

/// Source of raw model completions.
pub trait GenerateCompletion {
    fn complete(&self, prompt: &str)
        -> impl Future<Output = Result<String, CompletionError>> + Send;
}

/// Chat-completions client for Together AI (or any OpenAI-compatible API).
#[derive(Clone)]
pub struct TogetherClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl TogetherClient {
    pub fn new(config: &CompletionConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.clone())
            .with_api_base(config.base_url.clone());

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }
}

impl std::fmt::Debug for TogetherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TogetherClient")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenerateCompletion for TogetherClient {
    #[instrument(level = "debug", skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}

fn topic_or<'a>(topic: &'a str, default: &'a str) -> &'a str {
    match topic.trim() {
        "" => default,
        topic => topic,
    }
}

pub fn quiz_prompt(topic: &str) -> String {
    format!(
        "Generate one multiple-choice quiz question about {}.\n\
         Reply with exactly these six lines and nothing else:\n\
         Question: <question text>\n\
         1. <option>\n\
         2. <option>\n\
         3. <option>\n\
         4. <option>\n\
         Answer: <number of the correct option, 1-4>",
        topic_or(topic, DEFAULT_QUIZ_TOPIC)
    )
}

pub fn explain_prompt(topic: &str) -> String {
    format!("Explain {} in simple terms.", topic.trim())
}

pub fn study_plan_prompt(topic: &str) -> String {
    format!(
        "Generate a structured study plan for learning {}.",
        topic_or(topic, DEFAULT_STUDY_PLAN_TOPIC)
    )
}
