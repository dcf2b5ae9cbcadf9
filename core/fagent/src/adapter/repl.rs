//! 対話ループ（`fagent> ` プロンプト）
//!
//! 1 行ずつ読み、組み込みコマンド以外はコーディネータに渡す。Ctrl-C か EOF で終わる。

use crate::adapter::console;
use crate::usecase::ExecutionCoordinator;
use common::config::AppConfig;
use common::error::Error;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const PROMPT: &str = "fagent> ";

/// 対話ループの 1 行
#[derive(Debug, Clone, PartialEq)]
pub enum ReplInput<'a> {
    Empty,
    Help,
    Status,
    Config,
    Exit,
    Command(&'a str),
}

impl<'a> ReplInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Self::Empty,
            "help" | "h" => Self::Help,
            "status" => Self::Status,
            "config" => Self::Config,
            "exit" | "quit" | "q" => Self::Exit,
            _ => Self::Command(trimmed),
        }
    }
}

/// 対話ループに必要な参照
pub struct Session<'a> {
    pub coordinator: &'a ExecutionCoordinator,
    pub config: &'a AppConfig,
    pub workspace: &'a Path,
    pub json: bool,
}

pub async fn run(session: Session<'_>) -> Result<(), Error> {
    let color = std::io::stdout().is_terminal();
    println!("{}", console::banner());
    println!("Workspace: {}", session.workspace.display());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let line = match line {
            Some(l) => l,
            None => {
                println!();
                break;
            }
        };

        match ReplInput::parse(&line) {
            ReplInput::Empty => continue,
            ReplInput::Exit => break,
            ReplInput::Help => println!("{}", console::interactive_help()),
            ReplInput::Status => println!(
                "{}",
                console::format_status(
                    &session.coordinator.status(),
                    session.workspace,
                    session.config.file_manager.backup_enabled,
                )
            ),
            ReplInput::Config => println!("{}", console::format_config(session.config)?),
            ReplInput::Command(text) => {
                let result = session.coordinator.execute(text).await;
                if session.json {
                    println!("{}", console::result_to_json(&result)?);
                } else {
                    println!("{}", console::format_result(&result, color));
                }
            }
        }
    }
    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builtins() {
        assert_eq!(ReplInput::parse("   "), ReplInput::Empty);
        assert_eq!(ReplInput::parse("HELP"), ReplInput::Help);
        assert_eq!(ReplInput::parse("h"), ReplInput::Help);
        assert_eq!(ReplInput::parse(" status "), ReplInput::Status);
        assert_eq!(ReplInput::parse("config"), ReplInput::Config);
        assert_eq!(ReplInput::parse("quit"), ReplInput::Exit);
        assert_eq!(ReplInput::parse("q"), ReplInput::Exit);
    }

    #[test]
    fn test_parse_command_keeps_original_case() {
        assert_eq!(
            ReplInput::parse("  Read \"Notes.MD\" "),
            ReplInput::Command("Read \"Notes.MD\"")
        );
    }
}
