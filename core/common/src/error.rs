//! エラーハンドリング
//!
//! 全レイヤー共通のエラー型。終了コードは sysexits(3) に合わせる。

/// エラー型
///
/// 表示はメッセージ本体のみ（CLI は `fagent: <msg>` の形で stderr に出す）。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("YAML error: {0}")]
    Yaml(String),
    #[error("{0}")]
    Http(String),
    #[error("{0}")]
    Env(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    System(String),
}

impl Error {
    /// I/O エラー（メッセージ指定）
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn yaml(msg: impl Into<String>) -> Self {
        Self::Yaml(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    /// 引数不正エラー（usage 表示対象）
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Io(_) => 74,
            Self::Env(_) => 78,
            _ => 70,
        }
    }

    /// usage を表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = Error::invalid_argument("test");
        assert_eq!(err.to_string(), "test");
        assert_eq!(err.exit_code(), 64);
        assert!(err.is_usage());

        let err = Error::system("boom");
        assert_eq!(err.exit_code(), 70);
        assert!(!err.is_usage());

        let err = Error::io_msg("disk");
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(ref m) if m.contains("missing")));
    }

    #[test]
    fn test_json_display_has_prefix() {
        let err = Error::json("unexpected token");
        assert_eq!(err.to_string(), "JSON error: unexpected token");
    }
}
