use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ChatResult;
use crate::models::message::Message;

/// One fully-specified model call. Constructed per call and discarded after.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    /// `None` means "do not send a tools parameter at all". Some providers
    /// treat an empty tool set differently from an absent one.
    pub tools: Option<Vec<Value>>,
    pub max_output_tokens: i32,
    pub temperature: f32,
}

/// Base trait for streaming model providers.
///
/// `on_delta` runs synchronously inside stream consumption and must not
/// start a new model call or mutate shared conversation state.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Drive a single streamed completion, forwarding each text fragment to
    /// `on_delta` as it arrives, and return the full concatenated text.
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> ChatResult<String>;
}
