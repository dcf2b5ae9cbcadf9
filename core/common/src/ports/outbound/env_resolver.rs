//! 環境変数解決 Outbound ポート
//!
//! 設定の上書き・API キーの取得はこの trait 経由でのみ環境変数にアクセスする。

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用の `MapEnvResolver`。
pub trait EnvResolver: Send + Sync {
    /// 変数を取得する。未設定・空文字は None
    fn var(&self, key: &str) -> Option<String>;
}
