use crate::config::AppConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use tracing::{debug, info};

pub const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: String,
    usage: Usage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// One finished chat completion.
pub struct Completion {
    pub text: String,
    pub model: String,
    pub tokens_used: u32,
}

impl From<MessagesResponse> for Completion {
    fn from(response: MessagesResponse) -> Self {
        let text = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        Self {
            text,
            model: response.model,
            tokens_used: response.usage.input_tokens + response.usage.output_tokens,
        }
    }
}

/// Blocking client for the Anthropic Messages API.
///
/// A value of this type only exists after a successful connection probe, so
/// holding one means the key has been validated.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ApiClient {
    /// Validates `api_key` with a minimal probe request and returns the
    /// connected client.
    pub fn connect(config: &AppConfig, api_key: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let client = Self {
            http,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        };
        client.request("test", config.test_max_tokens)?;
        info!("connected, model {}", client.model);
        Ok(client)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user message and waits for the completion.
    pub fn send(&self, prompt: &str) -> Result<Completion> {
        let response = self.request(prompt, self.max_tokens)?;
        Ok(Completion::from(response))
    }

    fn request(&self, content: &str, max_tokens: u32) -> Result<MessagesResponse> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content,
            }],
        };
        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()?;

        let status = response.status();
        debug!("messages endpoint answered {}", status);
        if !status.is_success() {
            let raw = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(Error::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json()?)
    }
}

/// Results marshaled from worker threads back onto the UI thread's event
/// queue; drained with `try_recv` at the top of each frame.
pub enum ApiEvent {
    Connected(Result<ApiClient>),
    Completion(Result<Completion>),
}

/// Channel pair owned by the app shell; workers clone the sender.
pub struct ApiBridge {
    pub tx: mpsc::Sender<ApiEvent>,
    pub rx: mpsc::Receiver<ApiEvent>,
}

impl Default for ApiBridge {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_messages_shape() {
        let body = MessagesRequest {
            model: "claude-sonnet-4-5-20250929",
            max_tokens: 10,
            messages: vec![Message {
                role: "user",
                content: "test",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "claude-sonnet-4-5-20250929");
        assert_eq!(json["max_tokens"], 10);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "test");
    }

    #[test]
    fn completion_joins_text_blocks_and_sums_usage() {
        let raw = r#"{
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "tool_use", "id": "t1", "name": "noop", "input": {}},
                {"type": "text", "text": " world"}
            ],
            "model": "claude-sonnet-4-5-20250929",
            "usage": {"input_tokens": 12, "output_tokens": 30}
        }"#;
        let response: MessagesResponse = serde_json::from_str(raw).unwrap();
        let completion = Completion::from(response);

        assert_eq!(completion.text, "Hello world");
        assert_eq!(completion.model, "claude-sonnet-4-5-20250929");
        assert_eq!(completion.tokens_used, 42);
    }

    #[test]
    fn error_envelope_parses_message() {
        let raw = r#"{"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.error.message, "invalid x-api-key");
    }

    #[test]
    fn bridge_carries_events_across_threads() {
        let bridge = ApiBridge::default();
        let tx = bridge.tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(ApiEvent::Completion(Err(Error::api("boom"))));
        })
        .join()
        .unwrap();

        match bridge.rx.try_recv() {
            Ok(ApiEvent::Completion(Err(e))) => assert!(e.to_string().contains("boom")),
            _ => panic!("expected a completion event"),
        }
    }
}
