use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{ChatError, ChatResult};
use crate::providers::base::{CompletionRequest, Provider};

/// A mock provider that replays pre-configured streamed responses for
/// testing. Each entry is either the chunk sequence of a successful call or
/// the error message of a failed one.
pub struct MockProvider {
    responses: Mutex<Vec<Result<Vec<String>, String>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<Vec<String>, String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }

    pub fn succeeding(chunks: Vec<&str>) -> Self {
        Self::new(vec![Ok(chunks.into_iter().map(String::from).collect())])
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream_completion(
        &self,
        _request: &CompletionRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> ChatResult<String> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return an empty response if no more pre-configured responses
            return Ok(String::new());
        }
        match responses.remove(0) {
            Ok(chunks) => {
                let mut accumulated = String::new();
                for chunk in chunks {
                    on_delta(&chunk);
                    accumulated.push_str(&chunk);
                }
                Ok(accumulated)
            }
            Err(message) => Err(ChatError::Provider(message)),
        }
    }
}
