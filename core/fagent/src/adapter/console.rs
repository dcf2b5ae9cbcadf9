//! 端末への表示（結果の整形・ヘルプ・status / config 表示）

use crate::usecase::CoordinatorStatus;
use common::config::AppConfig;
use common::error::Error;
use common::operation::OperationResult;
use std::path::Path;

const PREVIEW_CHARS: usize = 200;
const MAX_FILES_SHOWN: usize = 10;
const MAX_DIRS_SHOWN: usize = 5;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}

/// 結果を人が読む形に整形する
pub fn format_result(result: &OperationResult, color: bool) -> String {
    let mut out = String::new();
    let (mark, c) = if result.success { ("✓", GREEN) } else { ("✗", RED) };
    out.push_str(&format!("{} {}", paint(mark, c, color), result.message));

    if let Some(content) = &result.content {
        let preview: String = content.chars().take(PREVIEW_CHARS).collect();
        out.push_str("\nContent:\n");
        out.push_str(&preview);
        if content.chars().count() > PREVIEW_CHARS {
            out.push_str("...");
        }
    }

    if let Some(files) = &result.files {
        out.push_str(&format!("\nFiles ({}):", files.len()));
        for f in files.iter().take(MAX_FILES_SHOWN) {
            match f.size {
                Some(size) => out.push_str(&format!("\n  {} ({} bytes)", f.path, size)),
                None => out.push_str(&format!("\n  {}", f.path)),
            }
        }
        if files.len() > MAX_FILES_SHOWN {
            out.push_str(&format!("\n  ... and {} more", files.len() - MAX_FILES_SHOWN));
        }
    }

    if let Some(dirs) = &result.directories {
        out.push_str(&format!("\nDirectories ({}):", dirs.len()));
        for d in dirs.iter().take(MAX_DIRS_SHOWN) {
            out.push_str(&format!("\n  {}/", d.path));
        }
        if dirs.len() > MAX_DIRS_SHOWN {
            out.push_str(&format!("\n  ... and {} more", dirs.len() - MAX_DIRS_SHOWN));
        }
    }

    if let Some(backup) = &result.backup {
        out.push_str(&format!("\nBackup: {}", backup));
    }

    if let Some(msg) = &result.ai_message {
        out.push_str(&format!("\n{} {}", paint("AI:", CYAN, color), msg));
    }

    if let Some(total) = result.usage.as_ref().and_then(|u| u.total()) {
        out.push_str(&format!("\nTokens used: {}", total));
    }
    out
}

/// --json 用
pub fn result_to_json(result: &OperationResult) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn banner() -> String {
    [
        "fagent - natural-language file agent",
        "Type 'help' for examples, 'exit' to quit.",
    ]
    .join("\n")
}

pub fn interactive_help() -> String {
    [
        "Commands:",
        "  help, h          Show this help",
        "  status           Show provider, model and workspace",
        "  config           Show the effective configuration",
        "  exit, quit, q    Leave",
        "",
        "Examples:",
        "  create file \"notes.txt\" with content \"hello\"",
        "  read \"notes.txt\"",
        "  list files recursive",
        "  copy \"notes.txt\" to \"backup.txt\"",
        "  delete \"backup.txt\"",
        "  创建一个名为\"hello.txt\"的文件，内容是\"Hello, World!\"",
        "",
        "Anything else is sent to the AI provider, which may run file operations for you.",
    ]
    .join("\n")
}

pub fn format_status(status: &CoordinatorStatus, workspace: &Path, backup_enabled: bool) -> String {
    let mut lines = vec![
        format!(
            "Provider:   {}",
            status.provider.as_deref().unwrap_or("(not configured)")
        ),
        format!("Model:      {}", status.model.as_deref().unwrap_or("-")),
        format!("Workspace:  {}", workspace.display()),
        format!("Backups:    {}", if backup_enabled { "enabled" } else { "disabled" }),
        format!(
            "Confirm:    {}",
            if status.confirm_operations { "on" } else { "off" }
        ),
    ];
    lines.push(format!("Operations: {}", status.operations.join(", ")));
    lines.join("\n")
}

/// 実効設定を JSON で表示する（API キーは伏せる）
pub fn format_config(config: &AppConfig) -> Result<String, Error> {
    let mut shown = config.clone();
    for key in shown.api_keys.values_mut() {
        *key = mask(key);
    }
    Ok(serde_json::to_string_pretty(&shown)?)
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

pub fn print_help() {
    println!("Usage: fagent [options]");
    println!("Options:");
    println!("  -h, --help                 Show this help message");
    println!("  -c, --command <command>    Execute a single command and exit (exit code 1 if it fails)");
    println!("  -w, --workspace <dir>      Workspace directory (default: file_manager.default_workspace)");
    println!("  -f, --config <file>        Configuration file, YAML or JSON (default: config.yaml)");
    println!("                             config.local.yaml next to it is merged on top.");
    println!("  -p, --provider <provider>  AI provider: openai, anthropic, google, deepseek, echo");
    println!("  -m, --model <model>        Model name (default: ai.default_model)");
    println!("  -v, --verbose              Log at DEBUG level");
    println!("      --json                 Print results as JSON");
    println!("      --generate <shell>     Generate shell completion script (bash, zsh, fish, ...)");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY, ANTHROPIC_API_KEY, GOOGLE_API_KEY, DEEPSEEK_API_KEY");
    println!("  AI_DEFAULT_PROVIDER, AI_DEFAULT_MODEL, AI_MAX_TOKENS, AI_TEMPERATURE");
    println!("  FILE_MANAGER_DEFAULT_WORKSPACE, FILE_MANAGER_BACKUP_ENABLED, FILE_MANAGER_BACKUP_DIR,");
    println!("  FILE_MANAGER_MAX_FILE_SIZE_MB, LOGGING_LEVEL, LOGGING_FILE");
    println!();
    println!("Without -c, an interactive prompt is started.");
    println!();
    println!("Examples:");
    println!("  fagent -c 'create file \"notes.txt\" with content \"hello\"'");
    println!("  fagent -p deepseek -c 'summarize what is in my workspace'");
    println!("  fagent -p echo -c 'EXECUTE: list_files(\".\", \"*.txt\")'");
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::llm::TokenUsage;
    use common::operation::FileEntry;

    fn entry(path: &str, size: Option<u64>) -> FileEntry {
        FileEntry {
            name: path.to_string(),
            path: path.to_string(),
            size,
            modified: String::new(),
            is_file: size.is_some(),
            is_directory: size.is_none(),
        }
    }

    #[test]
    fn test_format_success_and_failure() {
        let ok = OperationResult::ok("File created successfully: a.txt");
        assert_eq!(format_result(&ok, false), "✓ File created successfully: a.txt");
        let ng = OperationResult::failed("File not found: b.txt");
        assert_eq!(format_result(&ng, false), "✗ File not found: b.txt");
        assert!(format_result(&ok, true).contains("\x1b[32m"));
    }

    #[test]
    fn test_format_truncates_content() {
        let mut r = OperationResult::ok("File read successfully: a.txt");
        r.content = Some("x".repeat(250));
        let out = format_result(&r, false);
        assert!(out.contains(&format!("{}...", "x".repeat(200))));
        assert!(!out.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_format_limits_listing() {
        let mut r = OperationResult::ok("Directory listing for: .");
        r.files = Some((0..12).map(|i| entry(&format!("f{:02}.txt", i), Some(1))).collect());
        r.directories = Some((0..6).map(|i| entry(&format!("d{}", i), None)).collect());
        let out = format_result(&r, false);
        assert!(out.contains("Files (12):"));
        assert!(out.contains("f09.txt (1 bytes)"));
        assert!(!out.contains("f10.txt"));
        assert!(out.contains("... and 2 more"));
        assert!(out.contains("d4/"));
        assert!(!out.contains("d5/"));
        assert!(out.contains("... and 1 more"));
    }

    #[test]
    fn test_format_ai_fields() {
        let mut r = OperationResult::ok("done");
        r.ai_message = Some("Created it for you.".into());
        r.usage = Some(TokenUsage {
            input_tokens: Some(3),
            output_tokens: Some(4),
            total_tokens: None,
        });
        let out = format_result(&r, false);
        assert!(out.contains("AI: Created it for you."));
        assert!(out.contains("Tokens used: 7"));
    }

    #[test]
    fn test_format_config_masks_keys() {
        let mut c = AppConfig::default();
        c.api_keys.insert("openai".into(), "sk-1234567890".into());
        let out = format_config(&c).unwrap();
        assert!(out.contains("sk-1****"));
        assert!(!out.contains("sk-1234567890"));
    }
}
