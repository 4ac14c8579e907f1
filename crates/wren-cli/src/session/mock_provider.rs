use std::sync::Mutex;

use async_trait::async_trait;

use wren::errors::{ChatError, ChatResult};
use wren::providers::base::{CompletionRequest, Provider};

/// Copy of the mock provider in the wren crate, which is configured out of
/// that crate's public surface under test builds. Used by the session tests
/// until the engine itself grows a test seam.

pub struct MockProvider {
    responses: Mutex<Vec<Result<Vec<String>, String>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<Vec<String>, String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }

    pub fn reply(text: &str) -> Result<Vec<String>, String> {
        Ok(vec![text.to_string()])
    }

    pub fn failure(message: &str) -> Result<Vec<String>, String> {
        Err(message.to_string())
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
