//! アプリケーション設定
//!
//! 解決順（後勝ち）: 組み込みデフォルト → 設定ファイル（YAML / JSON）→ 同じディレクトリの
//! config.local.yaml（マッピング単位のディープマージ）→ 環境変数。CLI フラグは呼び出し側で上書きする。

use crate::error::Error;
use crate::llm::ProviderType;
use crate::ports::outbound::EnvResolver;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const LOCAL_CONFIG_FILE: &str = "config.local.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSection {
    pub default_provider: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// 直接操作の成功後に AI の確認メッセージを付けるか
    pub confirm_operations: bool,
    pub base_url: Option<String>,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            default_model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            confirm_operations: true,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileManagerSection {
    pub default_workspace: PathBuf,
    pub max_file_size_mb: u64,
    pub backup_enabled: bool,
    pub backup_dir: PathBuf,
}

impl Default for FileManagerSection {
    fn default() -> Self {
        Self {
            default_workspace: PathBuf::from("./workspace"),
            max_file_size_mb: 10,
            backup_enabled: true,
            backup_dir: PathBuf::from("./backups"),
        }
    }
}

impl FileManagerSection {
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// ERROR / WARNING / INFO / DEBUG
    pub level: String,
    pub file: PathBuf,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: PathBuf::from("./logs/agent.log"),
        }
    }
}

/// 設定全体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ai: AiSection,
    pub file_manager: FileManagerSection,
    pub logging: LoggingSection,
    /// プロバイダ名 -> API キー（環境変数が優先）
    pub api_keys: BTreeMap<String, String>,
}

impl AppConfig {
    /// 設定ファイルと環境変数から読み込む。ファイルが無いのはエラーにしない
    pub fn load(config_path: &Path, env: &dyn EnvResolver) -> Result<Self, Error> {
        let mut merged = serde_yaml::to_value(AppConfig::default())?;

        if let Some(v) = read_config_file(config_path)? {
            merge_values(&mut merged, v);
        }
        let local = config_path.with_file_name(LOCAL_CONFIG_FILE);
        if local != config_path {
            if let Some(v) = read_config_file(&local)? {
                merge_values(&mut merged, v);
            }
        }

        let mut config: AppConfig = serde_yaml::from_value(merged)
            .map_err(|e| Error::yaml(format!("{}: {}", config_path.display(), e)))?;
        config.apply_env(env)?;
        Ok(config)
    }

    /// 環境変数による上書き（キーはセクション名とキー名を大文字・アンダースコアで連結）
    pub fn apply_env(&mut self, env: &dyn EnvResolver) -> Result<(), Error> {
        if let Some(v) = env.var("AI_DEFAULT_PROVIDER") {
            self.ai.default_provider = v;
        }
        if let Some(v) = env.var("AI_DEFAULT_MODEL") {
            self.ai.default_model = v;
        }
        if let Some(v) = env.var("AI_MAX_TOKENS") {
            self.ai.max_tokens = parse_env("AI_MAX_TOKENS", &v)?;
        }
        if let Some(v) = env.var("AI_TEMPERATURE") {
            self.ai.temperature = parse_env("AI_TEMPERATURE", &v)?;
        }
        if let Some(v) = env.var("FILE_MANAGER_DEFAULT_WORKSPACE") {
            self.file_manager.default_workspace = PathBuf::from(v);
        }
        if let Some(v) = env.var("FILE_MANAGER_BACKUP_ENABLED") {
            self.file_manager.backup_enabled = parse_bool("FILE_MANAGER_BACKUP_ENABLED", &v)?;
        }
        if let Some(v) = env.var("FILE_MANAGER_BACKUP_DIR") {
            self.file_manager.backup_dir = PathBuf::from(v);
        }
        if let Some(v) = env.var("FILE_MANAGER_MAX_FILE_SIZE_MB") {
            self.file_manager.max_file_size_mb = parse_env("FILE_MANAGER_MAX_FILE_SIZE_MB", &v)?;
        }
        if let Some(v) = env.var("LOGGING_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env.var("LOGGING_FILE") {
            self.logging.file = PathBuf::from(v);
        }
        Ok(())
    }

    /// プロバイダの API キー。`<PROVIDER>_API_KEY` → api_keys.<provider> の順。
    /// 空や `your_` で始まるプレースホルダは無いものとして扱う
    pub fn api_key(&self, provider: ProviderType, env: &dyn EnvResolver) -> Option<String> {
        env.var(&provider.api_key_env())
            .filter(|k| !is_placeholder(k))
            .or_else(|| {
                self.api_keys
                    .get(provider.as_str())
                    .filter(|k| !is_placeholder(k))
                    .cloned()
            })
    }

    /// 設定の問題点を列挙する（起動は止めない）
    pub fn validate(&self, env: &dyn EnvResolver) -> Vec<String> {
        let mut issues = Vec::new();

        match ProviderType::from_str(&self.ai.default_provider) {
            None => issues.push(format!("Unknown AI provider: {}", self.ai.default_provider)),
            Some(p) if p.requires_api_key() && self.api_key(p, env).is_none() => {
                issues.push(format!(
                    "API key for {} not configured (set {} or api_keys.{})",
                    p,
                    p.api_key_env(),
                    p
                ));
            }
            Some(_) => {}
        }

        if self.ai.max_tokens == 0 {
            issues.push("ai.max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            issues.push(format!(
                "ai.temperature out of range (0.0-2.0): {}",
                self.ai.temperature
            ));
        }

        if let Err(e) = fs::create_dir_all(&self.file_manager.default_workspace) {
            issues.push(format!(
                "Cannot create workspace directory {}: {}",
                self.file_manager.default_workspace.display(),
                e
            ));
        }
        issues
    }
}

fn is_placeholder(key: &str) -> bool {
    let k = key.trim();
    k.is_empty() || k.starts_with("your_")
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::env(format!("{}: invalid value '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::env(format!("{}: invalid value '{}'", key, value))),
    }
}

/// 設定ファイルを読む。無ければ None。拡張子 .json は JSON、それ以外は YAML
fn read_config_file(path: &Path) -> Result<Option<Value>, Error> {
    if !path.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::io_msg(format!("{}: {}", path.display(), e)))?;
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let value = if is_json {
        serde_json::from_str::<Value>(&contents)
            .map_err(|e| Error::json(format!("{}: {}", path.display(), e)))?
    } else {
        serde_yaml::from_str::<Value>(&contents)
            .map_err(|e| Error::yaml(format!("{}: {}", path.display(), e)))?
    };
    Ok(Some(value))
}

/// overlay を base に再帰的にマージする。マッピング同士はキー単位、それ以外は置換。
/// マッピングに null を重ねても消さない（空の `ai:` 等）
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(existing) => merge_values(existing, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (Value::Mapping(_), Value::Null) => {}
        (b, o) => *b = o,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MapEnvResolver;

    #[test]
    fn test_defaults() {
        let c = AppConfig::default();
        assert_eq!(c.ai.default_provider, "openai");
        assert_eq!(c.ai.default_model, "gpt-3.5-turbo");
        assert_eq!(c.ai.max_tokens, 1000);
        assert!(c.file_manager.backup_enabled);
        assert_eq!(c.file_manager.max_file_bytes(), 10 * 1024 * 1024);
        assert_eq!(c.logging.level, "INFO");
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let c = AppConfig::load(&tmp.path().join("config.yaml"), &MapEnvResolver::new()).unwrap();
        assert_eq!(c, AppConfig::default());
    }

    #[test]
    fn test_load_yaml_with_local_override() {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("config.yaml");
        fs::write(
            &main,
            "ai:\n  default_provider: deepseek\n  max_tokens: 500\nfile_manager:\n  backup_enabled: false\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("config.local.yaml"),
            "ai:\n  max_tokens: 2000\napi_keys:\n  deepseek: sk-local\n",
        )
        .unwrap();

        let c = AppConfig::load(&main, &MapEnvResolver::new()).unwrap();
        assert_eq!(c.ai.default_provider, "deepseek");
        assert_eq!(c.ai.max_tokens, 2000);
        // マージで他のキーは残る
        assert_eq!(c.ai.default_model, "gpt-3.5-turbo");
        assert!(!c.file_manager.backup_enabled);
        assert_eq!(
            c.api_key(ProviderType::DeepSeek, &MapEnvResolver::new()).as_deref(),
            Some("sk-local")
        );
    }

    #[test]
    fn test_load_json_and_empty_section() {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("settings.json");
        fs::write(&main, r#"{"logging": {"level": "DEBUG"}, "ai": null}"#).unwrap();
        let c = AppConfig::load(&main, &MapEnvResolver::new()).unwrap();
        assert_eq!(c.logging.level, "DEBUG");
        assert_eq!(c.ai, AiSection::default());
    }

    #[test]
    fn test_load_broken_yaml_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("config.yaml");
        fs::write(&main, "ai: [unclosed").unwrap();
        let err = AppConfig::load(&main, &MapEnvResolver::new()).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env = MapEnvResolver::new()
            .with("AI_DEFAULT_PROVIDER", "anthropic")
            .with("AI_TEMPERATURE", "0.2")
            .with("FILE_MANAGER_BACKUP_ENABLED", "false")
            .with("LOGGING_FILE", "/tmp/x.log");
        let mut c = AppConfig::default();
        c.apply_env(&env).unwrap();
        assert_eq!(c.ai.default_provider, "anthropic");
        assert!((c.ai.temperature - 0.2).abs() < f32::EPSILON);
        assert!(!c.file_manager.backup_enabled);
        assert_eq!(c.logging.file, PathBuf::from("/tmp/x.log"));

        let bad = MapEnvResolver::new().with("AI_MAX_TOKENS", "lots");
        assert!(c.apply_env(&bad).is_err());
    }

    #[test]
    fn test_api_key_skips_placeholders() {
        let mut c = AppConfig::default();
        c.api_keys
            .insert("openai".to_string(), "your_openai_api_key_here".to_string());
        assert_eq!(c.api_key(ProviderType::OpenAi, &MapEnvResolver::new()), None);

        let env = MapEnvResolver::new().with("OPENAI_API_KEY", "sk-env");
        assert_eq!(c.api_key(ProviderType::OpenAi, &env).as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_validate_reports_issues() {
        let tmp = tempfile::tempdir().unwrap();
        let mut c = AppConfig::default();
        c.file_manager.default_workspace = tmp.path().join("ws");
        let issues = c.validate(&MapEnvResolver::new());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("OPENAI_API_KEY"));

        c.ai.default_provider = "nope".to_string();
        let issues = c.validate(&MapEnvResolver::new());
        assert!(issues[0].contains("Unknown AI provider"));

        c.ai.default_provider = "echo".to_string();
        assert!(c.validate(&MapEnvResolver::new()).is_empty());
    }
}
