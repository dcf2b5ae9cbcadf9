//! OpenAI Chat Completions 互換 (/chat/completions) バックエンド
//!
//! OpenAI と DeepSeek はどちらもこの実装を使う（base_url とデフォルトモデルだけが違う）。

use crate::error::Error;
use crate::llm::http::post_json;
use crate::llm::response::{AiResponse, GenerateOptions, TokenUsage};
use crate::ports::outbound::ResponseGenerator;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Chat Completions 互換バックエンド
pub struct OpenAiCompatGenerator {
    client: reqwest::Client,
    provider: String,
    model: String,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatGenerator {
    /// * `provider` - 表示・ログ用のプロバイダ名（"openai" / "deepseek"）
    /// * `base_url` - 末尾の `/` は取り除く
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider: provider.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn make_request_payload(&self, prompt: &str, options: &GenerateOptions) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "stream": false
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
            .header("Authorization", format!("Bearer {}", self.api_key));
        let v = post_json(builder, &self.make_request_payload(prompt, options), "Chat completions").await?;
        parse_response(&v)
    }
}

fn parse_response(v: &Value) -> Result<(String, Option<TokenUsage>), Error> {
    let text = v["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| Error::json("Response has no choices[0].message.content"))?
        .to_string();
    let usage = v.get("usage").map(|u| TokenUsage {
        input_tokens: u["prompt_tokens"].as_u64(),
        output_tokens: u["completion_tokens"].as_u64(),
        total_tokens: u["total_tokens"].as_u64(),
    });
    Ok((text, usage))
}

#[async_trait]
impl ResponseGenerator for OpenAiCompatGenerator {
    fn provider(&self) -> &str {
        &self.provider
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
