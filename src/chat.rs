use eyre::{Result, bail, eyre};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;

const STUDY_ASSISTANT_PROMPT: &str = "You are a helpful AI study assistant for students watching educational YouTube videos. \
Help explain complex concepts from the videos, answer questions about the content, provide additional context and examples, \
suggest related topics to explore, and break down difficult topics into simpler terms. \
Encourage active learning and critical thinking, and create study guides and summaries when requested. \
Be encouraging, patient, and educational. Keep your answers concise but informative, \
and use examples and analogies to make complex topics easier to understand.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Forwards a conversation to the configured model provider
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });
        Self { client, config }
    }

    /// Send the ordered history and return the assistant's single reply
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<ChatMessage> {
        if messages.is_empty() {
            bail!("no messages to send");
        }

        let text = if is_anthropic_model(&self.config.model) {
            self.reply_anthropic(messages).await?
        } else {
            self.reply_openai(messages).await?
        };
        Ok(ChatMessage::assistant(text))
    }

    async fn reply_anthropic(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_key = self
            .config
            .anthropic_api_key
            .as_deref()
            .ok_or_else(|| eyre!("Anthropic API key not configured (set ANTHROPIC_API_KEY or chat.anthropic_api_key)"))?;

        debug!("Forwarding {} messages to Anthropic model {}", messages.len(), self.config.model);

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.config.anthropic_base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&anthropic_body(&self.config, messages))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Anthropic API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_anthropic_text(&json)
    }

    async fn reply_openai(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_key = self
            .config
            .openai_api_key
            .as_deref()
            .ok_or_else(|| eyre!("OpenAI API key not configured (set OPENAI_API_KEY or chat.openai_api_key)"))?;

        debug!("Forwarding {} messages to OpenAI model {}", messages.len(), self.config.model);

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.openai_base_url))
            .bearer_auth(api_key)
            .json(&openai_body(&self.config, messages))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("OpenAI API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }
}

fn is_anthropic_model(model: &str) -> bool {
    model.starts_with("claude")
}

fn anthropic_body(config: &ChatConfig, messages: &[ChatMessage]) -> serde_json::Value {
    // The Messages API takes the system prompt separately and rejects system turns.
    let turns: Vec<&ChatMessage> = messages.iter().filter(|m| m.role != Role::System).collect();
    serde_json::json!({
        "model": config.model,
        "max_tokens": config.max_tokens,
        "system": STUDY_ASSISTANT_PROMPT,
        "messages": turns,
    })
}

fn openai_body(config: &ChatConfig, messages: &[ChatMessage]) -> serde_json::Value {
    let system = ChatMessage {
        role: Role::System,
        content: STUDY_ASSISTANT_PROMPT.to_string(),
    };
    let all: Vec<&ChatMessage> = std::iter::once(&system).chain(messages).collect();
    serde_json::json!({
        "model": config.model,
        "max_tokens": config.max_tokens,
        "messages": all,
    })
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str().map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    bail!("unexpected Anthropic API response format");
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        return Ok(text.to_string());
    }
    bail!("unexpected OpenAI API response format");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn spawn_provider(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn user(content: &str) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_is_anthropic_model() {
        assert!(is_anthropic_model("claude-sonnet-4-5"));
        assert!(is_anthropic_model("claude-3-opus-20240229"));
        assert!(!is_anthropic_model("gpt-4o"));
        assert!(!is_anthropic_model("gpt-4o-mini"));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_value(user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_openai_body_prepends_system_prompt() {
        let history = vec![user("What is a vector?"), ChatMessage::assistant("An arrow."), user("And a matrix?")];
        let body = openai_body(&ChatConfig::default(), &history);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], STUDY_ASSISTANT_PROMPT);
        assert_eq!(messages[1]["content"], "What is a vector?");
        assert_eq!(messages[3]["content"], "And a matrix?");
        assert_eq!(body["model"], "gpt-4o");
    }

    #[test]
    fn test_anthropic_body_moves_system_prompt() {
        let history = vec![
            ChatMessage {
                role: Role::System,
                content: "ignored".to_string(),
            },
            user("Explain entropy"),
        ];
        let body = anthropic_body(&ChatConfig::default(), &history);

        assert_eq!(body["system"], STUDY_ASSISTANT_PROMPT);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
    }

    #[test]
    fn test_extract_anthropic_text() {
        let json = serde_json::json!({
            "content": [
                {
                    "type": "text",
                    "text": "Entropy measures disorder."
                }
            ]
        });
        assert_eq!(extract_anthropic_text(&json).unwrap(), "Entropy measures disorder.");
    }

    #[test]
    fn test_extract_anthropic_text_joins_blocks_and_skips_tool_use() {
        let json = serde_json::json!({
            "content": [
                {"type": "text", "text": "Step 1: find the derivative. "},
                {"type": "tool_use", "id": "toolu_1", "name": "calculator", "input": {"expr": "2*x"}},
                {"type": "text", "text": "Step 2: set it to zero."}
            ]
        });
        assert_eq!(
            extract_anthropic_text(&json).unwrap(),
            "Step 1: find the derivative. Step 2: set it to zero."
        );
    }

    #[test]
    fn test_extract_anthropic_text_only_tool_use() {
        let json = serde_json::json!({
            "content": [{"type": "tool_use", "id": "toolu_1", "name": "search", "input": {}}]
        });
        assert!(extract_anthropic_text(&json).is_err());
    }

    #[test]
    fn test_extract_anthropic_text_empty() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_text(&json).is_err());
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [
                {
                    "message": {
                        "role": "assistant",
                        "content": "A matrix is a grid of numbers."
                    }
                }
            ]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "A matrix is a grid of numbers.");
    }

    #[test]
    fn test_extract_openai_text_uses_first_choice() {
        let json = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "first");
    }

    #[test]
    fn test_extract_openai_text_null_content() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null, "tool_calls": []}}]
        });
        assert!(extract_openai_text(&json).is_err());
    }

    #[test]
    fn test_extract_openai_text_empty() {
        let json = serde_json::json!({"choices": []});
        assert!(extract_openai_text(&json).is_err());
    }

    #[tokio::test]
    async fn test_reply_without_key_fails() {
        let client = ChatClient::new(ChatConfig::default());
        assert!(client.reply(&[user("hello")]).await.is_err());
    }

    #[tokio::test]
    async fn test_reply_with_no_messages_fails() {
        let client = ChatClient::new(ChatConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..ChatConfig::default()
        });
        assert!(client.reply(&[]).await.is_err());
    }

    #[tokio::test]
    async fn test_reply_via_openai_compatible_server() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                let last = body["messages"]
                    .as_array()
                    .and_then(|m| m.last())
                    .and_then(|m| m["content"].as_str())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("echo: {last}")}}]
                }))
            }),
        );
        let base = spawn_provider(app).await;

        let client = ChatClient::new(ChatConfig {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: base,
            ..ChatConfig::default()
        });

        let reply = client.reply(&[user("ping")]).await.unwrap();
        assert_eq!(reply, ChatMessage::assistant("echo: ping"));
    }

    #[tokio::test]
    async fn test_reply_via_anthropic_compatible_server() {
        // The fake provider reports what it received back in the reply text.
        let app = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-")
                        .to_string()
                };
                let roles: Vec<&str> = body["messages"]
                    .as_array()
                    .map(|m| m.iter().filter_map(|m| m["role"].as_str()).collect())
                    .unwrap_or_default();
                let system_ok = body["system"] == STUDY_ASSISTANT_PROMPT;
                Json(serde_json::json!({
                    "content": [
                        {"type": "text", "text": format!("key={} ", header("x-api-key"))},
                        {"type": "text", "text": format!("version={} ", header("anthropic-version"))},
                        {"type": "text", "text": format!("system={system_ok} roles={}", roles.join(","))}
                    ]
                }))
            }),
        );
        let base = spawn_provider(app).await;

        let client = ChatClient::new(ChatConfig {
            model: "claude-sonnet-4-5".to_string(),
            anthropic_api_key: Some("sk-ant-test".to_string()),
            anthropic_base_url: base,
            ..ChatConfig::default()
        });

        let history = vec![
            ChatMessage {
                role: Role::System,
                content: "client-side system turn".to_string(),
            },
            user("What is a derivative?"),
            ChatMessage::assistant("A rate of change."),
            user("Give an example."),
        ];
        let reply = client.reply(&history).await.unwrap();
        assert_eq!(
            reply.content,
            "key=sk-ant-test version=2023-06-01 system=true roles=user,assistant,user"
        );
    }

    #[tokio::test]
    async fn test_reply_times_out_on_silent_provider() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = ChatClient::new(ChatConfig {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: format!("http://{addr}"),
            timeout: Duration::from_millis(300),
            ..ChatConfig::default()
        });

        let result = tokio::time::timeout(Duration::from_secs(5), client.reply(&[user("hello?")]))
            .await
            .expect("client timeout should end the request");
        assert!(result.is_err());
    }
}
