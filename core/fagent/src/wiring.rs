//! 配線: 設定を読み、標準アダプタで ExecutionCoordinator を組み立てる

use std::path::PathBuf;
use std::sync::Arc;

use common::adapter::{FileJsonLog, FileManagerSettings, WorkspaceFileManager};
use common::config::{AppConfig, DEFAULT_CONFIG_FILE};
use common::error::Error;
use common::llm::{create_generator, GenerateOptions, ProviderType};
use common::ports::outbound::{EnvResolver, FileOperations, Log, LogLevel, LogRecord, ResponseGenerator};

use crate::cli::Config;
use crate::usecase::{CommandClassifier, ExecutionCoordinator};

/// 組み立て済みのアプリケーション
pub struct App {
    pub coordinator: ExecutionCoordinator,
    pub logger: Arc<dyn Log>,
    pub config: AppConfig,
    pub workspace: PathBuf,
}

/// CLI フラグを設定に重ねる（環境変数より後勝ち）
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Config) {
    if let Some(ws) = &cli.workspace {
        config.file_manager.default_workspace = ws.clone();
    }
    if let Some(p) = &cli.provider {
        config.ai.default_provider = p.to_string();
    }
    if let Some(m) = &cli.model {
        config.ai.default_model = m.to_string();
    }
}

/// 配線: 設定ファイル・環境変数・CLI フラグから App を組み立てる
pub fn wire_fagent(cli: &Config, env: &dyn EnvResolver) -> Result<App, Error> {
    let config_path = cli
        .config_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = AppConfig::load(&config_path, env)?;
    apply_cli_overrides(&mut config, cli);

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::parse(&config.logging.level).unwrap_or(LogLevel::Info)
    };
    let logger: Arc<dyn Log> = Arc::new(FileJsonLog::new(config.logging.file.clone(), level));
    wire_with_logger(config, env, logger)
}

/// ロガーを差し替えて組み立てる（テストは NoopLog を渡す）
pub fn wire_with_logger(config: AppConfig, env: &dyn EnvResolver, logger: Arc<dyn Log>) -> Result<App, Error> {
    let log = |level: LogLevel, message: String| {
        let _ = logger.log(&LogRecord::new(level, message).layer("wiring").kind("config"));
    };

    for issue in config.validate(env) {
        log(LogLevel::Warn, format!("Configuration issue: {}", issue));
    }

    let manager = WorkspaceFileManager::new(
        FileManagerSettings {
            workspace: config.file_manager.default_workspace.clone(),
            backup_enabled: config.file_manager.backup_enabled,
            backup_dir: config.file_manager.backup_dir.clone(),
            max_file_bytes: config.file_manager.max_file_bytes(),
        },
        Arc::clone(&logger),
    )?;
    let workspace = manager.workspace().to_path_buf();
    let files: Arc<dyn FileOperations> = Arc::new(manager);

    let generator = build_generator(&config, env, &log);
    match &generator {
        Some(g) => log(
            LogLevel::Info,
            format!("AI provider ready: {} ({})", g.provider(), g.model()),
        ),
        None => log(LogLevel::Warn, "AI provider not available".to_string()),
    }

    let coordinator = ExecutionCoordinator::new(
        CommandClassifier::new()?,
        files,
        generator,
        Arc::clone(&logger),
    )
    .with_options(GenerateOptions {
        max_tokens: config.ai.max_tokens,
        temperature: config.ai.temperature,
    })
    .with_confirmations(config.ai.confirm_operations);

    Ok(App {
        coordinator,
        logger,
        config,
        workspace,
    })
}

/// プロバイダを解決して ResponseGenerator を作る。使えなければ None（AI なしで動く）
fn build_generator(
    config: &AppConfig,
    env: &dyn EnvResolver,
    log: &dyn Fn(LogLevel, String),
) -> Option<Arc<dyn ResponseGenerator>> {
    let provider = match ProviderType::from_str(&config.ai.default_provider) {
        Some(p) => p,
        None => {
            log(
                LogLevel::Warn,
                format!("Unknown AI provider: {}", config.ai.default_provider),
            );
            return None;
        }
    };
    let (model, replaced) = provider.resolve_model(Some(&config.ai.default_model));
    if replaced {
        log(
            LogLevel::Info,
            format!(
                "Model {} does not belong to {}; using {}",
                config.ai.default_model, provider, model
            ),
        );
    } else if !provider.is_known_model(&model) {
        log(
            LogLevel::Info,
            format!(
                "Model {} is not in the {} catalogue; using it as configured",
                model, provider
            ),
        );
    }
    match create_generator(
        provider,
        &model,
        config.api_key(provider, env),
        config.ai.base_url.clone(),
    ) {
        Ok(g) => Some(g),
        Err(e) => {
            log(LogLevel::Warn, e.to_string());
            None
        }
    }
}

