use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{CompletionRequest, Provider};
use super::configs::GeminiConfig;
use crate::errors::{ChatError, ChatResult};
use crate::models::message::Role;

pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> ChatResult<Self> {
        if config.model.trim().is_empty() {
            return Err(ChatError::Configuration(
                "Model configuration is missing".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(ChatError::Configuration(
                "API key configuration is missing".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()
            .map_err(|e| ChatError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_payload(request: &CompletionRequest) -> Value {
        let contents: Vec<Value> = request
            .messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                json!({
                    "role": role,
                    "parts": [{ "text": message.content }]
                })
            })
            .collect();

        let mut payload = json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": request.max_output_tokens,
                "temperature": request.temperature
            }
        });

        if let Some(system) = &request.system {
            payload["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        // Absent tools means no tools parameter at all, not an empty array.
        if let Some(tools) = &request.tools {
            payload["tools"] = json!(tools);
        }

        payload
    }

    /// Text fragments carried by one streamed event.
    fn extract_deltas(event: &Value) -> Vec<String> {
        event
            .pointer("/candidates/0/content/parts")
            .and_then(|parts| parts.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn stream_completion(
        &self,
        request: &CompletionRequest,
        on_delta: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> ChatResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.config.host.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&Self::build_payload(request))
            .send()
            .await
            .map_err(|e| ChatError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider(format!(
                "request failed with status {}: {}",
                status, body
            )));
        }

        let mut accumulated = String::new();
        let mut buffer: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| ChatError::Provider(e.to_string()))?;
            buffer.extend_from_slice(&bytes);

            // SSE frames are newline-delimited; only `data:` lines carry
            // payloads we care about.
            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let Some(data) = line.trim_end().strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() || data == "[DONE]" {
                    continue;
                }

                let event: Value = serde_json::from_str(data).map_err(|e| {
                    ChatError::Provider(format!("malformed stream payload: {}", e))
                })?;
                if let Some(error) = event.get("error") {
                    return Err(ChatError::Provider(error.to_string()));
                }
                for delta in Self::extract_deltas(&event) {
                    on_delta(&delta);
                    accumulated.push_str(&delta);
                }
            }
        }

        Ok(accumulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            messages,
            system: None,
            tools: None,
            max_output_tokens: 2048,
            temperature: 0.7,
        }
    }

    async fn setup_mock_server(body: &str, status: u16) -> (MockServer, GeminiProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .and(header("x-goog-api-key", "test_api_key"))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/event-stream"),
            )
            .mount(&mock_server)
            .await;

        let config = GeminiConfig::new(
            mock_server.uri(),
            "test_api_key".to_string(),
            "gemini-test".to_string(),
        );
        let provider = GeminiProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_stream_accumulates_deltas_in_order() {
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\", \"},{\"text\":\"world\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"!\"}]}}]}\n\n",
        );
        let (_server, provider) = setup_mock_server(body, 200).await;

        let mut seen = Vec::new();
        let mut on_delta = |delta: &str| seen.push(delta.to_string());
        let text = provider
            .stream_completion(&request(vec![Message::user("hi")]), &mut on_delta)
            .await
            .unwrap();

        assert_eq!(text, "Hello, world!");
        assert_eq!(seen, vec!["Hello", ", ", "world", "!"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_provider_error() {
        let (_server, provider) = setup_mock_server("quota exceeded", 429).await;

        let mut on_delta = |_: &str| {};
        let err = provider
            .stream_completion(&request(vec![Message::user("hi")]), &mut on_delta)
            .await
            .unwrap_err();

        match err {
            ChatError::Provider(message) => assert!(message.contains("429")),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_event_mid_stream_aborts() {
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"partial\"}]}}]}\n\n",
            "data: {\"error\":{\"code\":500,\"message\":\"internal\"}}\n\n",
        );
        let (_server, provider) = setup_mock_server(body, 200).await;

        let mut on_delta = |_: &str| {};
        let err = provider
            .stream_completion(&request(vec![Message::user("hi")]), &mut on_delta)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Provider(_)));
    }

    #[test]
    fn test_empty_model_is_a_configuration_error() {
        let config = GeminiConfig::new(
            crate::providers::configs::DEFAULT_HOST.to_string(),
            "key".to_string(),
            "".to_string(),
        );
        assert!(matches!(
            GeminiProvider::new(config),
            Err(ChatError::Configuration(_))
        ));
    }

    #[test]
    fn test_payload_shape() {
        let mut req = request(vec![
            Message::user("question"),
            Message::assistant("answer"),
        ]);
        req.system = Some("be terse".to_string());
        req.tools = Some(vec![json!({ "google_search": {} })]);

        let payload = GeminiProvider::build_payload(&req);
        assert_eq!(payload["contents"][0]["role"], "user");
        assert_eq!(payload["contents"][1]["role"], "model");
        assert_eq!(payload["contents"][1]["parts"][0]["text"], "answer");
        assert_eq!(payload["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(payload["tools"][0], json!({ "google_search": {} }));
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_payload_omits_tools_when_absent() {
        let req = request(vec![Message::user("question")]);
        let payload = GeminiProvider::build_payload(&req);
        assert!(payload.get("tools").is_none());
        assert!(payload.get("systemInstruction").is_none());
    }
}
