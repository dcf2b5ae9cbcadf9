//! Google Gemini (generateContent) バックエンド
//!
//! max_tokens / temperature は generationConfig で送る。API キーは x-goog-api-key ヘッダーで送る。

use crate::error::Error;
use crate::llm::http::post_json;
use crate::llm::response::{AiResponse, GenerateOptions, TokenUsage};
use crate::ports::outbound::ResponseGenerator;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiGenerator {
    client: reqwest::Client,
    model: String,
    base_url: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(model: impl Into<String>, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn make_request_payload(&self, prompt: &str, options: &GenerateOptions) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": options.max_tokens,
                "temperature": options.temperature
            }
        })
    }

    async fn request(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<(String, Option<TokenUsage>), Error> {
        let builder = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str());
        let v = post_json(builder, &self.make_request_payload(prompt, options), "Gemini API").await?;
        parse_response(&v)
    }
}

fn parse_response(v: &Value) -> Result<(String, Option<TokenUsage>), Error> {
    let parts = v["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| Error::json("Response has no candidates[0].content.parts"))?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    let usage = v.get("usageMetadata").map(|u| TokenUsage {
        input_tokens: u["promptTokenCount"].as_u64(),
        output_tokens: u["candidatesTokenCount"].as_u64(),
        total_tokens: u["totalTokenCount"].as_u64(),
    });
    Ok((text, usage))
}

#[async_trait]
impl ResponseGenerator for GeminiGenerator {
    fn provider(&self) -> &str {
        "google"
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
