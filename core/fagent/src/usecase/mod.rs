//! ユースケース（分類とコマンド実行の調整）

pub mod classifier;
pub mod coordinator;

pub use classifier::CommandClassifier;
pub use coordinator::{CoordinatorStatus, ExecutionCoordinator};
