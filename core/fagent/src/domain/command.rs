//! 分類結果のコマンド（Command Pattern）
//!
//! 直接のファイル操作 vs AI 対話の分岐を enum で明示する。

use std::collections::BTreeMap;
use std::fmt;

/// 操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateFile,
    ReadFile,
    WriteFile,
    DeleteFile,
    MoveFile,
    CopyFile,
    CreateDirectory,
    ListFiles,
    /// AI バックエンドへのフォールバック
    AiProcess,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::CreateFile,
        Operation::ReadFile,
        Operation::WriteFile,
        Operation::DeleteFile,
        Operation::MoveFile,
        Operation::CopyFile,
        Operation::CreateDirectory,
        Operation::ListFiles,
        Operation::AiProcess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateFile => "create_file",
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::DeleteFile => "delete_file",
            Self::MoveFile => "move_file",
            Self::CopyFile => "copy_file",
            Self::CreateDirectory => "create_directory",
            Self::ListFiles => "list_files",
            Self::AiProcess => "ai_process",
        }
    }

    /// 名前から解決する。知らない名前は None
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// パラメータ値
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

pub type Params = BTreeMap<String, ParamValue>;

/// 分類済みコマンド。生成後は変更しない
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub operation: Operation,
    pub params: Params,
}

impl Command {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            params: Params::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// AI へのフォールバック
    pub fn ai_process(prompt: &str) -> Self {
        Self::new(Operation::AiProcess).with("prompt", prompt)
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(ParamValue::as_str)
    }

    #[cfg(test)]
    pub fn bool_param(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(ParamValue::as_bool)
    }

    /// ログ用の `k=v, ...` 表記
    pub fn params_summary(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.as_str()), Some(op));
        }
        assert_eq!(Operation::from_name("format_disk"), None);
    }

    #[test]
    fn test_command_params() {
        let cmd = Command::new(Operation::ListFiles)
            .with("path", ".")
            .with("recursive", true);
        assert_eq!(cmd.str_param("path"), Some("."));
        assert_eq!(cmd.bool_param("recursive"), Some(true));
        assert_eq!(cmd.str_param("recursive"), None);
        assert_eq!(cmd.params_summary(), "path=\".\", recursive=true");
    }
}
