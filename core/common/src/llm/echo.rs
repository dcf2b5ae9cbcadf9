//! Echo バックエンド
//!
//! 実際の API は呼ばず、受け取った依頼文をそのまま返す。デモやテスト用。
//! 依頼文に `EXECUTE:` 行を含めれば、ディレクティブ実行までオフラインで試せる。

use crate::llm::response::{AiResponse, GenerateOptions, TokenUsage, REQUEST_MARKER};
use crate::ports::outbound::ResponseGenerator;
use async_trait::async_trait;

pub struct EchoGenerator {
    model: String,
}

impl EchoGenerator {
    pub fn new() -> Self {
        Self {
            model: "echo".to_string(),
        }
    }

    fn reply(prompt: &str) -> String {
        let tail = match prompt.find(REQUEST_MARKER) {
            Some(i) => {
                let rest = &prompt[i + REQUEST_MARKER.len()..];
                // 依頼文は空行まで
                rest.split("\n\n").next().unwrap_or(rest)
            }
            None => prompt,
        };
        tail.trim().to_string()
    }
}

impl Default for EchoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseGenerator for EchoGenerator {
    fn provider(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> AiResponse {
        let text = Self::reply(prompt);
        let input = prompt.split_whitespace().count() as u64;
        let output = text.split_whitespace().count() as u64;
        let usage = TokenUsage {
            input_tokens: Some(input),
            output_tokens: Some(output),
            total_tokens: Some(input + output),
        };
        AiResponse::ok(self.model.clone(), text, Some(usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_returns_request_block() {
        let g = EchoGenerator::new();
        let prompt = "User request: make a.txt\nEXECUTE: create_file(\"a.txt\", \"x\")\n\nAvailable operations:\n- list_files";
        let r = g.generate(prompt, &GenerateOptions::default()).await;
        assert!(r.success);
        assert_eq!(
            r.text.as_deref(),
            Some("make a.txt\nEXECUTE: create_file(\"a.txt\", \"x\")")
        );
        assert_eq!(r.model, "echo");
        assert!(r.usage.unwrap().total().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_echo_without_marker_returns_prompt() {
        let g = EchoGenerator::new();
        let r = g.generate("  say hi  ", &GenerateOptions::default()).await;
        assert_eq!(r.text.as_deref(), Some("say hi"));
    }
}
