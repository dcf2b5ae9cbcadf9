//! fagent 共通ライブラリ
//!
//! ファイル操作・AI バックエンド・設定・構造化ログなど、ユースケースから
//! ポート経由で使う部品を提供します。

/// アダプター（ポートの標準実装）
pub mod adapter;

/// 設定の読み込みとマージ
pub mod config;

/// ドメイン型（Newtype）
pub mod domain;

/// エラーハンドリング
pub mod error;

/// AI バックエンドとプロバイダファクトリー
pub mod llm;

/// 操作結果レコード
pub mod operation;

/// Ports & Adapters のポート定義
pub mod ports;
