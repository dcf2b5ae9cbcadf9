//! プロバイダファクトリー
//!
//! プロバイダタイプに基づいて ResponseGenerator を作成します。
//! usecase はここで作られた trait オブジェクトだけを見て、ベンダーで分岐しない。

use crate::error::Error;
use crate::llm::anthropic::{AnthropicGenerator, ANTHROPIC_BASE_URL};
use crate::llm::echo::EchoGenerator;
use crate::llm::gemini::{GeminiGenerator, GEMINI_BASE_URL};
use crate::llm::openai_compat::{OpenAiCompatGenerator, DEEPSEEK_BASE_URL, OPENAI_BASE_URL};
use crate::ports::outbound::ResponseGenerator;
use std::sync::Arc;

/// プロバイダタイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
    Anthropic,
    Google,
    DeepSeek,
    /// オフライン（依頼文を返すだけ）
    Echo,
}

/// API キーを持つベンダー（echo 以外）
pub const VENDORS: [ProviderType; 4] = [
    ProviderType::OpenAi,
    ProviderType::Anthropic,
    ProviderType::Google,
    ProviderType::DeepSeek,
];

impl ProviderType {
    /// 文字列からプロバイダタイプを解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "google" | "gemini" => Some(Self::Google),
            "deepseek" => Some(Self::DeepSeek),
            "echo" => Some(Self::Echo),
            _ => None,
        }
    }

    /// プロバイダタイプを文字列に変換（設定キー・環境変数名の元になる）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::DeepSeek => "deepseek",
            Self::Echo => "echo",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::Anthropic => "claude-3-sonnet-20240229",
            Self::Google => "gemini-pro",
            Self::DeepSeek => "deepseek-chat",
            Self::Echo => "echo",
        }
    }

    /// 既知のモデル一覧
    pub fn available_models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview", "gpt-4o", "gpt-4o-mini"],
            Self::Anthropic => &[
                "claude-3-opus-20240229",
                "claude-3-sonnet-20240229",
                "claude-3-haiku-20240307",
            ],
            Self::Google => &["gemini-pro", "gemini-pro-vision"],
            Self::DeepSeek => &["deepseek-chat", "deepseek-coder"],
            Self::Echo => &["echo"],
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Echo)
    }

    /// API キーを読む環境変数名（OPENAI_API_KEY 等）
    pub fn api_key_env(&self) -> String {
        format!("{}_API_KEY", self.as_str().to_uppercase())
    }

    /// このベンダーのカタログにあるモデルか
    pub fn is_known_model(&self, model: &str) -> bool {
        self.available_models().contains(&model)
    }

    /// 設定されたモデルを実際に使うモデルに解決する
    ///
    /// 空、または別ベンダーの既知モデルならこのベンダーのデフォルトを返す（2 つ目は置換したかどうか）。
    /// どのカタログにも無いモデル名はそのまま使う。
    pub fn resolve_model(&self, configured: Option<&str>) -> (String, bool) {
        let requested = match configured.map(str::trim) {
            Some(m) if !m.is_empty() => m,
            _ => return (self.default_model().to_string(), false),
        };
        if self.is_known_model(requested) {
            return (requested.to_string(), false);
        }
        let foreign = VENDORS
            .iter()
            .filter(|v| *v != self)
            .any(|v| v.available_models().contains(&requested));
        if foreign {
            (self.default_model().to_string(), true)
        } else {
            (requested.to_string(), false)
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ResponseGenerator を作成する
///
/// # Arguments
/// * `provider_type` - プロバイダタイプ
/// * `model` - 解決済みのモデル名（ProviderType::resolve_model の結果）
/// * `api_key` - echo 以外は必須。無ければ Error::env
/// * `base_url` - None のとき各ベンダーのデフォルト
pub fn create_generator(
    provider_type: ProviderType,
    model: &str,
    api_key: Option<String>,
    base_url: Option<String>,
) -> Result<Arc<dyn ResponseGenerator>, Error> {
    let key = || {
        api_key.clone().ok_or_else(|| {
            Error::env(format!(
                "{} is not set (API key for provider '{}')",
                provider_type.api_key_env(),
                provider_type
            ))
        })
    };
    let generator: Arc<dyn ResponseGenerator> = match provider_type {
        ProviderType::OpenAi => Arc::new(OpenAiCompatGenerator::new(
            "openai",
            model,
            base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            key()?,
        )),
        ProviderType::DeepSeek => Arc::new(OpenAiCompatGenerator::new(
            "deepseek",
            model,
            base_url.unwrap_or_else(|| DEEPSEEK_BASE_URL.to_string()),
            key()?,
        )),
        ProviderType::Anthropic => Arc::new(AnthropicGenerator::new(
            model,
            base_url.unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string()),
            key()?,
        )),
        ProviderType::Google => Arc::new(GeminiGenerator::new(
            model,
            base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            key()?,
        )),
        ProviderType::Echo => Arc::new(EchoGenerator::new()),
    };
    Ok(generator)
}
