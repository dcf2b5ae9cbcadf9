//! ルールベースのコマンド分類
//!
//! キーワードの部分一致で操作を決め、引用符で囲まれたファイル名や内容を取り出す。
//! 規則は上から順に評価し、最初に当たった規則だけを使う。
//! キーワードが当たっても取り出しに失敗したら後続の規則には進まず ai_process にする。

use crate::domain::{Command, Operation};
use common::error::Error;
use regex::Regex;

const CREATE: &[&str] = &["create", "创建"];
const FILE: &[&str] = &["file", "文件"];
const DIRECTORY: &[&str] = &["directory", "folder", "目录", "文件夹"];
const READ: &[&str] = &["read", "view", "读取", "查看"];
const LIST: &[&str] = &["list", "show", "列出", "显示"];
const RECURSIVE: &[&str] = &["recursive", "递归"];
const DELETE: &[&str] = &["delete", "删除"];
const COPY: &[&str] = &["copy", "duplicate", "复制", "拷贝"];

/// 引用符として扱う文字（ASCII と全角の両方）
const QUOTES: &str = r#""'“”‘’"#;

fn has_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

/// 発話を Command に分類する（純粋・決定的）
pub struct CommandClassifier {
    /// 拡張子付きの引用トークン
    filename: Regex,
    /// 任意の引用トークン
    quoted: Regex,
    /// 内容キーワードの直後の引用文字列
    quoted_content: Regex,
    /// 内容キーワード以降の自由テキスト
    free_content: Regex,
}

impl CommandClassifier {
    pub fn new() -> Result<Self, Error> {
        let q = regex::escape(QUOTES);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| Error::system(format!("Invalid pattern: {}", e)))
        };
        Ok(Self {
            filename: compile(format!(r"[{q}]([^{q}]+\.\w+)[{q}]"))?,
            quoted: compile(format!(r"[{q}]([^{q}]+)[{q}]"))?,
            quoted_content: compile(format!(
                r"(?:内容[是为]?|(?i:\bcontents?\b)(?:\s+is|\s*[:=])?)\s*[{q}]([^{q}]+)[{q}]"
            ))?,
            free_content: compile(
                r"(?s)(?:内容[是为:：]?|(?i:\bcontents?\b)(?:\s+is|\s*[:=])?)\s*(.+)$".to_string(),
            )?,
        })
    }

    pub fn classify(&self, utterance: &str) -> Command {
        let original = utterance.trim();
        let lower = original.to_lowercase();

        if has_any(&lower, CREATE) && has_any(&lower, FILE) {
            return self.create_file(original);
        }
        if has_any(&lower, CREATE) && has_any(&lower, DIRECTORY) {
            return match self.first_capture(&self.quoted, original) {
                Some(path) => Command::new(Operation::CreateDirectory).with("path", path),
                None => Command::ai_process(original),
            };
        }
        if has_any(&lower, READ) {
            return match self.first_capture(&self.filename, original) {
                Some(path) => Command::new(Operation::ReadFile).with("path", path),
                None => Command::ai_process(original),
            };
        }
        if has_any(&lower, LIST) {
            return Command::new(Operation::ListFiles)
                .with("path", ".")
                .with("recursive", has_any(&lower, RECURSIVE));
        }
        if has_any(&lower, DELETE) {
            return match self.first_capture(&self.filename, original) {
                Some(path) => Command::new(Operation::DeleteFile).with("path", path),
                None => Command::ai_process(original),
            };
        }
        if has_any(&lower, COPY) {
            let names: Vec<&str> = self
                .filename
                .captures_iter(original)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();
            return match names.as_slice() {
                [src, dst, ..] => Command::new(Operation::CopyFile)
                    .with("src_path", *src)
                    .with("dst_path", *dst),
                _ => Command::ai_process(original),
            };
        }
        Command::ai_process(original)
    }

    fn first_capture<'a>(&self, re: &Regex, text: &'a str) -> Option<&'a str> {
        re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    fn create_file(&self, original: &str) -> Command {
        let name = match self.filename.captures(original).and_then(|c| c.get(1)) {
            Some(m) => m,
            None => return Command::ai_process(original),
        };
        let content = self
            .first_capture(&self.quoted_content, original)
            .map(str::to_string)
            .or_else(|| {
                // ファイル名より後ろの自由テキスト
                let tail = &original[name.end()..];
                self.first_capture(&self.free_content, tail)
                    .map(|s| s.trim().trim_matches(|c| QUOTES.contains(c)).trim().to_string())
            })
            .unwrap_or_default();
        Command::new(Operation::CreateFile)
            .with("path", name.as_str())
            .with("content", content)
    }
}
