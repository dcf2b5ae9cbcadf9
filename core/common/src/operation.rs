//! 操作結果レコード
//!
//! ファイル操作・AI 処理のどちらも最終的に OperationResult を返す。
//! フロントエンド（CLI の表示 / --json 出力）はこの形だけを見る。

use crate::llm::TokenUsage;
use serde::Serialize;

/// list_files の 1 エントリ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub name: String,
    /// ワークスペースからの相対パス（ワークスペース外なら絶対パス）
    pub path: String,
    /// ファイルのみ。ディレクトリは None
    pub size: Option<u64>,
    /// RFC3339
    pub modified: String,
    pub is_file: bool,
    pub is_directory: bool,
}

/// 操作結果
///
/// 成否とメッセージは常にある。その他は操作ごとに埋まるフィールド。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directories: Option<Vec<FileEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_directories: Option<usize>,
    /// 直接操作の成功後に AI が生成した確認メッセージ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// AI が要求した操作ごとの結果行
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<String>>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_src_dst(mut self, src: impl Into<String>, dst: impl Into<String>) -> Self {
        self.src_path = Some(src.into());
        self.dst_path = Some(dst.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}
