//! Outbound ポート: アプリが外界（FS・LLM・環境変数・ログ）を使うための trait

pub mod env_resolver;
pub mod file_operations;
pub mod log;
pub mod response_generator;

pub use env_resolver::EnvResolver;
pub use file_operations::FileOperations;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
pub use response_generator::ResponseGenerator;
