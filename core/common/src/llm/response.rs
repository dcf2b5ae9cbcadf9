//! 生成リクエストのオプションと応答
//!
//! ベンダーごとの差（usage のキー名など）はここで正規化する。

use serde::Serialize;

/// プロンプト中の依頼文の目印（プロンプトを組む側と Echo バックエンドが共有する）
pub const REQUEST_MARKER: &str = "User request:";

/// generate に渡すオプション
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// トークン使用量（ベンダー間で正規化済み）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    /// 合計。total が無いベンダー（Anthropic）は input + output
    pub fn total(&self) -> Option<u64> {
        self.total_tokens.or(match (self.input_tokens, self.output_tokens) {
            (Some(i), Some(o)) => Some(i + o),
            _ => None,
        })
    }
}

/// AI バックエンドの応答
///
/// 失敗もこの形で返る（generate は Err を返さない）。
#[derive(Debug, Clone, PartialEq)]
pub struct AiResponse {
    pub success: bool,
    pub text: Option<String>,
    pub error: Option<String>,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl AiResponse {
    pub fn ok(model: impl Into<String>, text: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        Self {
            success: true,
            text: Some(text.into()),
            error: None,
            model: model.into(),
            usage,
        }
    }

    pub fn failed(model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            error: Some(error.into()),
            model: model.into(),
            usage: None,
        }
    }
}
