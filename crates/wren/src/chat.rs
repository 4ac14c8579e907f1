use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;

use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::providers::base::{CompletionRequest, Provider};

pub const DEFAULT_MAX_OUTPUT_TOKENS: i32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
const BASE_DELAY: Duration = Duration::from_millis(600);
const DEFAULT_RETRIES: u32 = 2;

/// Per-call overrides layered on top of the engine defaults.
#[derive(Debug, Default)]
pub struct SendOptions {
    pub system: Option<String>,
    /// `None` omits the tools parameter from the request entirely.
    pub tools: Option<Vec<Value>>,
    pub max_output_tokens: Option<i32>,
    pub temperature: Option<f32>,
}

/// Drives streamed model calls against a provider: builds the request from
/// the conversation history, forwards fragments to the chunk callback, and
/// retries transient failures with exponential backoff.
///
/// The engine never mutates the transcript; committing a reply is the
/// caller's job, so a failed call leaves no partial conversation state.
pub struct ChatEngine {
    provider: Box<dyn Provider>,
    retries: u32,
    base_delay: Duration,
}

impl ChatEngine {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            retries: DEFAULT_RETRIES,
            base_delay: BASE_DELAY,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Run one streamed completion over `history`, retrying up to the
    /// configured budget. On failure the partial accumulated text is
    /// discarded; the delay before attempt `n + 1` is `base * 2^n`, with no
    /// delay after the final failed attempt. On success returns the full
    /// text with surrounding whitespace trimmed.
    pub async fn send(
        &self,
        history: &[Message],
        options: SendOptions,
        on_chunk: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> ChatResult<String> {
        if history.is_empty() {
            return Err(ChatError::Configuration(
                "cannot send an empty conversation".to_string(),
            ));
        }

        let request = CompletionRequest {
            messages: history.to_vec(),
            system: options.system,
            tools: options.tools,
            max_output_tokens: options
                .max_output_tokens
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            temperature: options.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let mut last_error = ChatError::Provider("no attempts were made".to_string());
        for attempt in 0..=self.retries {
            match self.provider.stream_completion(&request, on_chunk).await {
                Ok(text) => return Ok(text.trim().to_string()),
                Err(error) => {
                    last_error = error;
                    if attempt < self.retries {
                        // Saturate so an oversized retry budget flattens the
                        // delay instead of overflowing the multiplier.
                        let factor = 2u32.saturating_pow(attempt);
                        sleep(self.base_delay.saturating_mul(factor)).await;
                    }
                }
            }
        }
        Err(last_error)
    }
}
