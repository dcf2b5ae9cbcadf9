//! AI バックエンド（ResponseGenerator の実装）とプロバイダファクトリー
//!
//! ベンダーごとの差（エンドポイント・認証ヘッダ・usage のキー名）はこのモジュールに閉じる。

pub mod anthropic;
pub mod echo;
pub mod factory;
pub mod gemini;
mod http;
pub mod openai_compat;
pub mod response;

pub use factory::{create_generator, ProviderType};
pub use response::{AiResponse, GenerateOptions, TokenUsage, REQUEST_MARKER};
