//! Anthropic Messages API (/v1/messages) バックエンド

use crate::error::Error;
use crate::llm::http::post_json;
use crate::llm::response::{AiResponse, GenerateOptions, TokenUsage};
use crate::ports::outbound::ResponseGenerator;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicGenerator {
    client: reqwest::Client,
    model: String,
    base_url: String,
    api_key: String,
}

impl AnthropicGenerator {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn make_request_payload(&self, prompt: &str, options: &GenerateOptions) -> Value {
        json!({
            "model": self.model,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "messages": [{ "role": "user", "content": prompt }]
        })
    }

    async fn request(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<(String, Option<TokenUsage>), Error> {
        let builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let v = post_json(builder, &self.make_request_payload(prompt, options), "Messages API").await?;
        parse_response(&v)
    }
}

/// content 配列の text ブロックを連結する。usage は input/output のみ（合計は TokenUsage::total）
fn parse_response(v: &Value) -> Result<(String, Option<TokenUsage>), Error> {
    let blocks = v["content"]
        .as_array()
        .ok_or_else(|| Error::json("Response has no content array"))?;
    let text: String = blocks
        .iter()
        .filter(|b| b["type"] == "text")
        .filter_map(|b| b["text"].as_str())
        .collect();
    let usage = v.get("usage").map(|u| TokenUsage {
        input_tokens: u["input_tokens"].as_u64(),
        output_tokens: u["output_tokens"].as_u64(),
        total_tokens: None,
    });
    Ok((text, usage))
}

#[async_trait]
impl ResponseGenerator for AnthropicGenerator {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> AiResponse {
        match self.request(prompt, options).await {
            Ok((text, usage)) => AiResponse::ok(self.model.clone(), text, usage),
            Err(e) => AiResponse::failed(self.model.clone(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_request_payload() {
        let g = AnthropicGenerator::new("claude-3-sonnet-20240229", ANTHROPIC_BASE_URL, "k");
        let p = g.make_request_payload("hi", &GenerateOptions::default());
        assert_eq!(p["model"], "claude-3-sonnet-20240229");
        assert_eq!(p["max_tokens"], 1000);
        assert_eq!(p["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let v = json!({
            "content": [
                { "type": "text", "text": "Hello" },
                { "type": "text", "text": ", world" }
            ],
            "usage": { "input_tokens": 7, "output_tokens": 4 }
        });
        let (text, usage) = parse_response(&v).unwrap();
        assert_eq!(text, "Hello, world");
        assert_eq!(usage.unwrap().total(), Some(11));
    }
}
