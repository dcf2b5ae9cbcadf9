//! ファイル操作 Outbound ポート
//!
//! コーディネータはこの trait 経由でのみワークスペースに触れる。
//! どの操作も失敗を Err ではなく `success == false` の OperationResult で返す。

use crate::operation::OperationResult;

/// ファイル操作プリミティブ
///
/// パスはワークスペース相対（絶対パスはそのまま）。上書き・削除の前には
/// バックアップが有効なら退避コピーを作る。
pub trait FileOperations: Send + Sync {
    fn create_file(&self, path: &str, content: &str) -> OperationResult;
    fn read_file(&self, path: &str) -> OperationResult;
    fn write_file(&self, path: &str, content: &str, append: bool) -> OperationResult;
    fn delete_file(&self, path: &str) -> OperationResult;
    fn move_file(&self, src_path: &str, dst_path: &str) -> OperationResult;
    fn copy_file(&self, src_path: &str, dst_path: &str) -> OperationResult;
    fn create_directory(&self, path: &str) -> OperationResult;
    /// `pattern` はグロブ（既定 "*"）。recursive なら配下すべて
    fn list_files(&self, path: &str, pattern: &str, recursive: bool) -> OperationResult;
}
