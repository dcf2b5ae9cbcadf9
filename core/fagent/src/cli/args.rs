use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::{ModelName, ProviderName};
use common::error::Error;
use std::path::PathBuf;

pub const BIN_NAME: &str = "fagent";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -c / --command: 1 回だけ実行して終了する
    pub command: Option<String>,
    /// -w / --workspace: 設定の file_manager.default_workspace を上書き
    pub workspace: Option<PathBuf>,
    /// -f / --config: 設定ファイル（既定 config.yaml）
    pub config_file: Option<PathBuf>,
    pub provider: Option<ProviderName>,
    pub model: Option<ModelName>,
    /// -v / --verbose: ログレベルを DEBUG にする
    pub verbose: bool,
    /// --json: 結果を JSON で出力する
    pub json: bool,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

/// 実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Help,
    /// -c で渡された 1 コマンドを実行
    Once(String),
    /// 対話ループ
    Interactive,
}

fn build_clap_command() -> clap::Command {
    clap::Command::new(BIN_NAME)
        .about("Natural-language file agent")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("command")
                .short('c')
                .long("command")
                .value_name("command")
                .help("Execute a single command and exit")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("workspace")
                .short('w')
                .long("workspace")
                .value_name("dir")
                .help("Workspace directory")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("config")
                .short('f')
                .long("config")
                .value_name("file")
                .help("Configuration file (YAML or JSON)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("provider")
                .short('p')
                .long("provider")
                .value_name("provider")
                .help("AI provider (openai, anthropic, google, deepseek, echo)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .value_name("model")
                .help("Model name (e.g. gpt-4, deepseek-chat)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    Config {
        help: matches.get_flag("help"),
        command: matches.get_one::<String>("command").cloned(),
        workspace: matches.get_one::<PathBuf>("workspace").cloned(),
        config_file: matches.get_one::<PathBuf>("config").cloned(),
        provider: matches
            .get_one::<String>("provider")
            .map(|s| ProviderName::new(s.clone())),
        model: matches
            .get_one::<String>("model")
            .map(|s| ModelName::new(s.clone())),
        verbose: matches.get_flag("verbose"),
        json: matches.get_flag("json"),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    outcome_from_matches(&matches)
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[&str]) -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    outcome_from_matches(&matches)
}

fn outcome_from_matches(matches: &clap::ArgMatches) -> Result<ParseOutcome, Error> {
    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(matches)))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
}

/// Config を実行モードに変換する
pub fn config_to_mode(config: &Config) -> RunMode {
    if config.help {
        return RunMode::Help;
    }
    match config.command.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => RunMode::Once(c.to_string()),
        _ => RunMode::Interactive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_of(args: &[&str]) -> Config {
        match parse_args_from(args).unwrap() {
            ParseOutcome::Config(c) => c,
            other => panic!("expected Config, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_args_no_args() {
        let config = config_of(&["fagent"]);
        assert_eq!(config, Config::default());
        assert_eq!(config_to_mode(&config), RunMode::Interactive);
    }

    #[test]
    fn test_parse_args_help() {
        assert!(config_of(&["fagent", "-h"]).help);
        let config = config_of(&["fagent", "--help", "-c", "list files"]);
        assert_eq!(config_to_mode(&config), RunMode::Help);
    }

    #[test]
    fn test_parse_args_all_options() {
        let config = config_of(&[
            "fagent", "-c", "list files", "-w", "/tmp/ws", "-f", "my.yaml", "-p", "deepseek", "-m",
            "deepseek-chat", "-v", "--json",
        ]);
        assert_eq!(config.command.as_deref(), Some("list files"));
        assert_eq!(config.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(config.config_file, Some(PathBuf::from("my.yaml")));
        assert_eq!(config.provider.as_deref(), Some("deepseek"));
        assert_eq!(config.model.as_deref(), Some("deepseek-chat"));
        assert!(config.verbose);
        assert!(config.json);
        assert_eq!(config_to_mode(&config), RunMode::Once("list files".to_string()));
    }

    #[test]
    fn test_blank_command_is_interactive() {
        let config = config_of(&["fagent", "-c", "   "]);
        assert_eq!(config_to_mode(&config), RunMode::Interactive);
    }

    #[test]
    fn test_parse_args_unknown_option() {
        let err = parse_args_from(&["fagent", "--unknown"]).unwrap_err();
        assert_eq!(err.exit_code(), 64);
        let err = parse_args_from(&["fagent", "-x"]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_parse_args_generate() {
        match parse_args_from(&["fagent", "--generate", "bash"]).unwrap() {
            ParseOutcome::GenerateCompletion(shell) => assert_eq!(shell, Shell::Bash),
            other => panic!("expected GenerateCompletion, got {:?}", other),
        }
        assert!(parse_args_from(&["fagent", "--generate", "cmd.exe"]).is_err());
    }
}
