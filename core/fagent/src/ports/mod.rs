//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（main / CLI）がアプリを呼び出す入口
//! - outbound: common::ports::outbound を使う（ファイル操作・AI・ログ）

pub mod inbound;
