//! アダプター（Outbound ポートの標準実装）
//!
//! usecase は ports::outbound の trait 経由でのみファイル・環境変数・ログに触れる。
//! ここの実装は wiring で注入し、テストでは NoopLog や MapEnvResolver に差し替える。

pub mod file_json_log;
pub mod std_env_resolver;
pub mod workspace_file_manager;

pub use file_json_log::{FileJsonLog, NoopLog};
pub use std_env_resolver::{MapEnvResolver, StdEnvResolver};
pub use workspace_file_manager::{FileManagerSettings, WorkspaceFileManager};
