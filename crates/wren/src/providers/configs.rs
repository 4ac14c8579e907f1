use std::env;

use dotenv::dotenv;

use crate::errors::{ChatError, ChatResult};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    pub fn new(host: String, api_key: String, model: String) -> Self {
        Self {
            host,
            api_key,
            model,
        }
    }

    /// Build the config from the environment, loading a `.env` file first if
    /// one is present. The API key is required; host and model have defaults.
    pub fn from_env() -> ChatResult<Self> {
        dotenv().ok();

        let api_key = env::var("GOOGLE_GENERATIVE_AI_API_KEY").map_err(|_| {
            ChatError::Configuration(
                "GOOGLE_GENERATIVE_AI_API_KEY is not set. Export it or add it to a .env file."
                    .to_string(),
            )
        })?;
        let model = env::var("WREN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let host = env::var("WREN_API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        Ok(Self::new(host, api_key, model))
    }
}
