//! AI 応答生成 Outbound ポート
//!
//! ベンダーごとの HTTP 差分は adapter（common::llm）に閉じ込め、
//! コーディネータはこの trait だけを見る。

use crate::llm::{AiResponse, GenerateOptions};
use async_trait::async_trait;

/// プロンプトを送り、生成テキストと usage を受け取る
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// プロバイダ名（openai, anthropic 等）
    fn provider(&self) -> &str;

    /// 使用中のモデル名
    fn model(&self) -> &str;

    /// 1 回の生成。通信・API エラーは `AiResponse::failed` として返す
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> AiResponse;
}
