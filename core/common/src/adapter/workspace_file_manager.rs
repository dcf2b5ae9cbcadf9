//! ワークスペース配下のファイル操作（FileOperations の標準実装）
//!
//! 相対パスはワークスペース基準で解決し、絶対パスはそのまま使う。
//! 上書き・削除の前にはバックアップを作る。バックアップの失敗はログに残して本処理を続ける。

use crate::error::Error;
use crate::operation::{FileEntry, OperationResult};
use crate::ports::outbound::{FileOperations, Log, LogLevel, LogRecord};
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

/// ファイルマネージャの設定
#[derive(Debug, Clone)]
pub struct FileManagerSettings {
    pub workspace: PathBuf,
    pub backup_enabled: bool,
    pub backup_dir: PathBuf,
    /// read_file で読み込む上限（バイト）
    pub max_file_bytes: u64,
}

/// FileOperations の標準実装
pub struct WorkspaceFileManager {
    workspace: PathBuf,
    backup_enabled: bool,
    backup_dir: PathBuf,
    max_file_bytes: u64,
    log: Arc<dyn Log>,
}

impl WorkspaceFileManager {
    /// ワークスペース（とバックアップ有効時はバックアップ先）を作成して初期化する
    pub fn new(settings: FileManagerSettings, log: Arc<dyn Log>) -> Result<Self, Error> {
        let workspace = absolutize(&settings.workspace)?;
        fs::create_dir_all(&workspace)
            .map_err(|e| Error::io_msg(format!("{}: {}", workspace.display(), e)))?;
        let workspace = workspace
            .canonicalize()
            .map_err(|e| Error::io_msg(format!("{}: {}", workspace.display(), e)))?;

        let backup_dir = absolutize(&settings.backup_dir)?;
        if settings.backup_enabled {
            fs::create_dir_all(&backup_dir)
                .map_err(|e| Error::io_msg(format!("{}: {}", backup_dir.display(), e)))?;
        }

        Ok(Self {
            workspace,
            backup_enabled: settings.backup_enabled,
            backup_dir,
            max_file_bytes: settings.max_file_bytes,
            log,
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn backup_enabled(&self) -> bool {
        self.backup_enabled
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.workspace.join(p)
        }
    }

    fn emit(&self, level: LogLevel, message: String) {
        let _ = self
            .log
            .log(&LogRecord::new(level, message).layer("adapter").kind("fs"));
    }

    /// バックアップを作る。無効・対象なし・失敗時は None（失敗はログのみ）
    fn create_backup(&self, file_path: &Path) -> Option<PathBuf> {
        if !self.backup_enabled || !file_path.is_file() {
            return None;
        }
        let name = file_path.file_name()?.to_string_lossy().to_string();
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let attempt = fs::create_dir_all(&self.backup_dir).and_then(|_| {
            let mut backup_path = self.backup_dir.join(format!("{}.{}.bak", name, stamp));
            let mut n = 1;
            while backup_path.exists() {
                backup_path = self.backup_dir.join(format!("{}.{}.{}.bak", name, stamp, n));
                n += 1;
            }
            fs::copy(file_path, &backup_path).map(|_| backup_path)
        });

        match attempt {
            Ok(backup_path) => {
                self.emit(
                    LogLevel::Info,
                    format!("Created backup: {}", backup_path.display()),
                );
                Some(backup_path)
            }
            Err(e) => {
                self.emit(
                    LogLevel::Error,
                    format!("Failed to create backup for {}: {}", file_path.display(), e),
                );
                None
            }
        }
    }

    /// Err を失敗結果に変換してログに残す
    fn settle(
        &self,
        result: Result<OperationResult, Error>,
        what: &str,
        on_err: impl FnOnce(String) -> OperationResult,
    ) -> OperationResult {
        match result {
            Ok(r) => r,
            Err(e) => {
                self.emit(LogLevel::Error, format!("Failed to {}: {}", what, e));
                on_err(format!("Failed to {}: {}", what, e))
            }
        }
    }

    fn ensure_parent(path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io_msg(format!("{}: {}", parent.display(), e)))?;
        }
        Ok(())
    }

    fn try_create_file(&self, path: &str, content: &str) -> Result<OperationResult, Error> {
        let file_path = self.full_path(path);
        Self::ensure_parent(&file_path)?;
        if file_path.exists() {
            self.create_backup(&file_path);
        }
        fs::write(&file_path, content)?;
        self.emit(LogLevel::Info, format!("Created file: {}", file_path.display()));
        let size = fs::metadata(&file_path)?.len();
        Ok(OperationResult::ok(format!("File created successfully: {}", path))
            .with_path(file_path.display().to_string())
            .with_size(size))
    }

    fn try_read_file(&self, path: &str) -> Result<OperationResult, Error> {
        let file_path = self.full_path(path);
        if !file_path.exists() {
            return Ok(OperationResult::failed(format!("File not found: {}", path)).with_path(path));
        }
        let meta = fs::metadata(&file_path)?;
        if meta.len() > self.max_file_bytes {
            return Ok(OperationResult::failed(format!(
                "File too large: {} ({} bytes, limit {} bytes)",
                path,
                meta.len(),
                self.max_file_bytes
            ))
            .with_path(path));
        }
        let content = fs::read_to_string(&file_path)?;
        self.emit(LogLevel::Info, format!("Read file: {}", file_path.display()));
        let mut result = OperationResult::ok(format!("File read successfully: {}", path))
            .with_path(file_path.display().to_string())
            .with_size(meta.len());
        result.content = Some(content);
        result.modified = meta.modified().ok().map(rfc3339);
        Ok(result)
    }

    fn try_write_file(&self, path: &str, content: &str, append: bool) -> Result<OperationResult, Error> {
        let file_path = self.full_path(path);
        Self::ensure_parent(&file_path)?;
        if file_path.exists() && !append {
            self.create_backup(&file_path);
        }
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&file_path)?;
        f.write_all(content.as_bytes())?;
        drop(f);

        let action = if append { "appended to" } else { "written to" };
        self.emit(
            LogLevel::Info,
            format!("Content {} file: {}", action, file_path.display()),
        );
        let size = fs::metadata(&file_path)?.len();
        Ok(
            OperationResult::ok(format!("Content {} file successfully: {}", action, path))
                .with_path(file_path.display().to_string())
                .with_size(size),
        )
    }

    fn try_delete_file(&self, path: &str) -> Result<OperationResult, Error> {
        let file_path = self.full_path(path);
        if !file_path.exists() {
            return Ok(OperationResult::failed(format!("File not found: {}", path)).with_path(path));
        }
        let backup = self.create_backup(&file_path);
        fs::remove_file(&file_path)?;
        self.emit(LogLevel::Info, format!("Deleted file: {}", file_path.display()));
        let mut result = OperationResult::ok(format!("File deleted successfully: {}", path))
            .with_path(file_path.display().to_string());
        result.backup = backup.map(|b| b.display().to_string());
        Ok(result)
    }

    fn try_move_file(&self, src_path: &str, dst_path: &str) -> Result<OperationResult, Error> {
        let src = self.full_path(src_path);
        let dst = self.full_path(dst_path);
        if !src.exists() {
            let mut r = OperationResult::failed(format!("Source file not found: {}", src_path));
            r.src_path = Some(src_path.to_string());
            return Ok(r);
        }
        Self::ensure_parent(&dst)?;
        if dst.exists() {
            self.create_backup(&dst);
        }
        if fs::rename(&src, &dst).is_err() {
            // デバイスをまたぐ移動は rename できないのでコピー＋削除
            fs::copy(&src, &dst)?;
            fs::remove_file(&src)?;
        }
        self.emit(
            LogLevel::Info,
            format!("Moved file from {} to {}", src.display(), dst.display()),
        );
        Ok(OperationResult::ok(format!(
            "File moved successfully from {} to {}",
            src_path, dst_path
        ))
        .with_src_dst(src.display().to_string(), dst.display().to_string()))
    }

    fn try_copy_file(&self, src_path: &str, dst_path: &str) -> Result<OperationResult, Error> {
        let src = self.full_path(src_path);
        let dst = self.full_path(dst_path);
        if !src.exists() {
            let mut r = OperationResult::failed(format!("Source file not found: {}", src_path));
            r.src_path = Some(src_path.to_string());
            return Ok(r);
        }
        Self::ensure_parent(&dst)?;
        if dst.exists() {
            self.create_backup(&dst);
        }
        let size = fs::copy(&src, &dst)?;
        self.emit(
            LogLevel::Info,
            format!("Copied file from {} to {}", src.display(), dst.display()),
        );
        Ok(OperationResult::ok(format!(
            "File copied successfully from {} to {}",
            src_path, dst_path
        ))
        .with_src_dst(src.display().to_string(), dst.display().to_string())
        .with_size(size))
    }

    fn try_create_directory(&self, path: &str) -> Result<OperationResult, Error> {
        let dir_path = self.full_path(path);
        fs::create_dir_all(&dir_path)?;
        self.emit(LogLevel::Info, format!("Created directory: {}", dir_path.display()));
        Ok(OperationResult::ok(format!("Directory created successfully: {}", path))
            .with_path(dir_path.display().to_string()))
    }

    fn try_list_files(&self, path: &str, pattern: &str, recursive: bool) -> Result<OperationResult, Error> {
        let dir_path = self.full_path(path);
        if !dir_path.exists() {
            return Ok(OperationResult::failed(format!("Directory not found: {}", path)).with_path(path));
        }
        if !dir_path.is_dir() {
            return Ok(
                OperationResult::failed(format!("Path is not a directory: {}", path)).with_path(path),
            );
        }

        let pattern = if pattern.trim().is_empty() { "*" } else { pattern };
        let base = glob::Pattern::escape(&dir_path.to_string_lossy());
        let full_pattern = if recursive {
            format!("{}{}**{}{}", base, MAIN_SEPARATOR, MAIN_SEPARATOR, pattern)
        } else {
            format!("{}{}{}", base, MAIN_SEPARATOR, pattern)
        };
        let entries = glob::glob(&full_pattern)
            .map_err(|e| Error::invalid_argument(format!("Invalid pattern '{}': {}", pattern, e)))?;

        let mut files = Vec::new();
        let mut directories = Vec::new();
        for entry in entries {
            let item = match entry {
                Ok(p) => p,
                Err(e) => {
                    self.emit(LogLevel::Warn, format!("Skipped unreadable entry: {}", e));
                    continue;
                }
            };
            let meta = match fs::metadata(&item) {
                Ok(m) => m,
                Err(_) => continue,
            };
            let relative = item
                .strip_prefix(&self.workspace)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| item.display().to_string());
            let info = FileEntry {
                name: item
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                path: relative,
                size: if meta.is_file() { Some(meta.len()) } else { None },
                modified: meta.modified().map(rfc3339).unwrap_or_default(),
                is_file: meta.is_file(),
                is_directory: meta.is_dir(),
            };
            if meta.is_file() {
                files.push(info);
            } else if meta.is_dir() {
                directories.push(info);
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        directories.sort_by(|a, b| a.path.cmp(&b.path));

        self.emit(
            LogLevel::Info,
            format!(
                "Listed {} files and {} directories in {}",
                files.len(),
                directories.len(),
                dir_path.display()
            ),
        );
        let mut result = OperationResult::ok(format!("Directory listing for: {}", path))
            .with_path(dir_path.display().to_string());
        result.total_files = Some(files.len());
        result.total_directories = Some(directories.len());
        result.files = Some(files);
        result.directories = Some(directories);
        Ok(result)
    }
}

impl FileOperations for WorkspaceFileManager {
    fn create_file(&self, path: &str, content: &str) -> OperationResult {
        self.settle(self.try_create_file(path, content), "create file", |m| {
            OperationResult::failed(m).with_path(path)
        })
    }

    fn read_file(&self, path: &str) -> OperationResult {
        self.settle(self.try_read_file(path), "read file", |m| {
            OperationResult::failed(m).with_path(path)
        })
    }

    fn write_file(&self, path: &str, content: &str, append: bool) -> OperationResult {
        self.settle(self.try_write_file(path, content, append), "write to file", |m| {
            OperationResult::failed(m).with_path(path)
        })
    }

    fn delete_file(&self, path: &str) -> OperationResult {
        self.settle(self.try_delete_file(path), "delete file", |m| {
            OperationResult::failed(m).with_path(path)
        })
    }

    fn move_file(&self, src_path: &str, dst_path: &str) -> OperationResult {
        self.settle(self.try_move_file(src_path, dst_path), "move file", |m| {
            OperationResult::failed(m).with_src_dst(src_path, dst_path)
        })
    }

    fn copy_file(&self, src_path: &str, dst_path: &str) -> OperationResult {
        self.settle(self.try_copy_file(src_path, dst_path), "copy file", |m| {
            OperationResult::failed(m).with_src_dst(src_path, dst_path)
        })
    }

    fn create_directory(&self, path: &str) -> OperationResult {
        self.settle(self.try_create_directory(path), "create directory", |m| {
            OperationResult::failed(m).with_path(path)
        })
    }

    fn list_files(&self, path: &str, pattern: &str, recursive: bool) -> OperationResult {
        self.settle(self.try_list_files(path, pattern, recursive), "list directory", |m| {
            OperationResult::failed(m).with_path(path)
        })
    }
}

fn absolutize(p: &Path) -> Result<PathBuf, Error> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::io_msg(format!("Failed to get current directory: {}", e)))?;
    Ok(cwd.join(p))
}

fn rfc3339(t: std::time::SystemTime) -> String {
    DateTime::<Local>::from(t).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::NoopLog;
    use tempfile::TempDir;

    fn manager(backup_enabled: bool) -> (TempDir, WorkspaceFileManager) {
        let tmp = tempfile::tempdir().unwrap();
        let settings = FileManagerSettings {
            workspace: tmp.path().join("workspace"),
            backup_enabled,
            backup_dir: tmp.path().join("backups"),
            max_file_bytes: 1024 * 1024,
        };
        let fm = WorkspaceFileManager::new(settings, Arc::new(NoopLog)).unwrap();
        (tmp, fm)
    }

    #[test]
    fn test_create_then_read_round_trip() {
        let (_tmp, fm) = manager(true);
        let r = fm.create_file("test.txt", "Hello, World!");
        assert!(r.success, "{}", r.message);
        assert!(r.message.contains("test.txt"));
        assert_eq!(r.size, Some(13));

        let r = fm.read_file("test.txt");
        assert!(r.success);
        assert_eq!(r.content.as_deref(), Some("Hello, World!"));
        assert!(r.modified.is_some());
    }

    #[test]
    fn test_create_file_makes_parent_dirs() {
        let (_tmp, fm) = manager(false);
        let r = fm.create_file("nested/deep/a.md", "# hi");
        assert!(r.success);
        assert_eq!(
            fs::read_to_string(fm.workspace().join("nested/deep/a.md")).unwrap(),
            "# hi"
        );
    }

    #[test]
    fn test_read_nonexistent_file() {
        let (_tmp, fm) = manager(true);
        let r = fm.read_file("nonexistent.txt");
        assert!(!r.success);
        assert!(r.message.to_lowercase().contains("not found"));
    }

    #[test]
    fn test_read_file_over_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = FileManagerSettings {
            workspace: tmp.path().join("ws"),
            backup_enabled: false,
            backup_dir: tmp.path().join("bk"),
            max_file_bytes: 4,
        };
        let fm = WorkspaceFileManager::new(settings, Arc::new(NoopLog)).unwrap();
        fm.create_file("big.txt", "0123456789");
        let r = fm.read_file("big.txt");
        assert!(!r.success);
        assert!(r.message.contains("too large"));
    }

    #[test]
    fn test_append_preserves_prefix() {
        let (_tmp, fm) = manager(true);
        fm.create_file("append_test.txt", "Initial content");
        let r = fm.write_file("append_test.txt", "\nAppended content", true);
        assert!(r.success);
        assert!(r.message.contains("appended to"));
        let content = fm.read_file("append_test.txt").content.unwrap();
        assert!(content.starts_with("Initial content"));
        assert_eq!(content, "Initial content\nAppended content");
    }

    #[test]
    fn test_overwrite_creates_backup() {
        let (tmp, fm) = manager(true);
        fm.create_file("w.txt", "old");
        let r = fm.write_file("w.txt", "new", false);
        assert!(r.success);
        assert_eq!(fm.read_file("w.txt").content.as_deref(), Some("new"));
        let backups: Vec<_> = fs::read_dir(tmp.path().join("backups")).unwrap().collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_delete_existing_file_returns_backup() {
        let (_tmp, fm) = manager(true);
        fm.create_file("delete_test.txt", "To be deleted");
        let r = fm.delete_file("delete_test.txt");
        assert!(r.success);
        let backup = r.backup.expect("backup path");
        assert!(!backup.is_empty());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "To be deleted");
        assert!(!fm.workspace().join("delete_test.txt").exists());
    }

    #[test]
    fn test_delete_nonexistent_file_has_no_backup() {
        let (_tmp, fm) = manager(true);
        let r = fm.delete_file("ghost.txt");
        assert!(!r.success);
        assert!(r.message.to_lowercase().contains("not found"));
        assert!(r.backup.is_none());
    }

    #[test]
    fn test_delete_without_backup_enabled() {
        let (_tmp, fm) = manager(false);
        fm.create_file("x.txt", "x");
        let r = fm.delete_file("x.txt");
        assert!(r.success);
        assert!(r.backup.is_none());
    }

    #[test]
    fn test_repeated_backups_do_not_collide() {
        let (tmp, fm) = manager(true);
        fm.create_file("c.txt", "1");
        fm.create_file("c.txt", "2");
        fm.create_file("c.txt", "3");
        let count = fs::read_dir(tmp.path().join("backups")).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_move_file() {
        let (_tmp, fm) = manager(true);
        fm.create_file("source.txt", "Content to move");
        let r = fm.move_file("source.txt", "sub/destination.txt");
        assert!(r.success);
        assert!(!fm.workspace().join("source.txt").exists());
        assert_eq!(
            fm.read_file("sub/destination.txt").content.as_deref(),
            Some("Content to move")
        );
    }

    #[test]
    fn test_move_missing_source() {
        let (_tmp, fm) = manager(true);
        let r = fm.move_file("nope.txt", "b.txt");
        assert!(!r.success);
        assert!(r.message.contains("Source file not found"));
        assert_eq!(r.src_path.as_deref(), Some("nope.txt"));
    }

    #[test]
    fn test_copy_file() {
        let (_tmp, fm) = manager(true);
        fm.create_file("a.txt", "abc");
        let r = fm.copy_file("a.txt", "b.txt");
        assert!(r.success);
        assert_eq!(r.size, Some(3));
        assert_eq!(fm.read_file("a.txt").content.as_deref(), Some("abc"));
        assert_eq!(fm.read_file("b.txt").content.as_deref(), Some("abc"));
    }

    #[test]
    fn test_create_directory_and_list() {
        let (_tmp, fm) = manager(false);
        assert!(fm.create_directory("docs").success);
        fm.create_file("a.txt", "a");
        fm.create_file("b.py", "b");
        fm.create_file("docs/c.txt", "c");

        let r = fm.list_files(".", "*", false);
        assert!(r.success);
        let files = r.files.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.py"]);
        let dirs = r.directories.unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].name, "docs");
        assert!(dirs[0].size.is_none());
        assert!(dirs[0].is_directory);
        assert_eq!(r.total_files, Some(2));
    }

    #[test]
    fn test_list_files_pattern_and_recursive() {
        let (_tmp, fm) = manager(false);
        fm.create_file("a.txt", "a");
        fm.create_file("b.py", "b");
        fm.create_file("docs/c.txt", "c");

        let r = fm.list_files(".", "*.txt", false);
        assert_eq!(r.total_files, Some(1));

        let r = fm.list_files(".", "*.txt", true);
        let paths: Vec<String> = r.files.unwrap().into_iter().map(|f| f.path).collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.ends_with("c.txt") && p.starts_with("docs")));
    }

    #[test]
    fn test_list_files_missing_or_not_dir() {
        let (_tmp, fm) = manager(false);
        let r = fm.list_files("missing", "*", false);
        assert!(!r.success);
        assert!(r.message.contains("Directory not found"));

        fm.create_file("f.txt", "");
        let r = fm.list_files("f.txt", "*", false);
        assert!(!r.success);
        assert!(r.message.contains("not a directory"));
    }
}
