//! Inbound ポート: ドライバ（CLI）がアプリを呼び出すインターフェース

use crate::cli::Config;
use async_trait::async_trait;
use common::error::Error;

/// 解析済みの Config を受け取り、終了コードを返す
#[async_trait]
pub trait UseCaseRunner: Send + Sync {
    async fn run(&self, config: Config) -> Result<i32, Error>;
}
