//! 実行可能な操作の一覧（許可リスト）
//!
//! 直接操作と AI 由来のディレクティブの両方がこの表を通る。
//! 引数の束縛・型チェック・デフォルト補完はここにだけ書く。

use crate::domain::command::{Operation, ParamValue, Params};
use crate::domain::directive::{ArgValue, DirectiveArg};
use common::error::Error;
use common::operation::OperationResult;
use common::ports::outbound::FileOperations;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
}

impl DefaultValue {
    fn to_param(self) -> ParamValue {
        match self {
            Self::Str(s) => ParamValue::Str(s.to_string()),
            Self::Bool(b) => ParamValue::Bool(b),
        }
    }
}

/// 引数 1 つ分の定義。default が無ければ必須
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: Option<DefaultValue>,
}

const fn req(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind: ParamKind::Str,
        default: None,
    }
}

const fn opt(name: &'static str, default: DefaultValue) -> ParamSpec {
    let kind = match default {
        DefaultValue::Str(_) => ParamKind::Str,
        DefaultValue::Bool(_) => ParamKind::Bool,
    };
    ParamSpec {
        name,
        kind,
        default: Some(default),
    }
}

/// 操作 1 つ分の定義
#[derive(Debug, PartialEq)]
pub struct OperationSpec {
    pub operation: Operation,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

pub static OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        operation: Operation::CreateFile,
        description: "Create a new file with optional content",
        params: &[
            req("path"),
            opt("content", DefaultValue::Str("")),
            opt("encoding", DefaultValue::Str("utf-8")),
        ],
    },
    OperationSpec {
        operation: Operation::ReadFile,
        description: "Read the content of a file",
        params: &[req("path"), opt("encoding", DefaultValue::Str("utf-8"))],
    },
    OperationSpec {
        operation: Operation::WriteFile,
        description: "Write content to a file (append=true adds to the end)",
        params: &[
            req("path"),
            req("content"),
            opt("append", DefaultValue::Bool(false)),
            opt("encoding", DefaultValue::Str("utf-8")),
        ],
    },
    OperationSpec {
        operation: Operation::DeleteFile,
        description: "Delete a file (a backup is kept)",
        params: &[req("path")],
    },
    OperationSpec {
        operation: Operation::MoveFile,
        description: "Move or rename a file",
        params: &[req("src_path"), req("dst_path")],
    },
    OperationSpec {
        operation: Operation::CopyFile,
        description: "Copy a file",
        params: &[req("src_path"), req("dst_path")],
    },
    OperationSpec {
        operation: Operation::CreateDirectory,
        description: "Create a directory (parents included)",
        params: &[req("path")],
    },
    OperationSpec {
        operation: Operation::ListFiles,
        description: "List files and directories, optionally filtered by a glob pattern",
        params: &[
            opt("path", DefaultValue::Str(".")),
            opt("pattern", DefaultValue::Str("*")),
            opt("recursive", DefaultValue::Bool(false)),
        ],
    },
];

/// 名前で引く。表に無い名前（ai_process を含む）は None
pub fn lookup(name: &str) -> Option<&'static OperationSpec> {
    Operation::from_name(name).and_then(spec_for)
}

pub fn spec_for(operation: Operation) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|s| s.operation == operation)
}

/// 操作名の一覧（status 表示用）
pub fn operation_names() -> Vec<&'static str> {
    OPERATIONS.iter().map(|s| s.name()).collect()
}

impl OperationSpec {
    pub fn name(&self) -> &'static str {
        self.operation.as_str()
    }

    /// `create_file(path, content="", encoding="utf-8")` 形式のシグネチャ
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| match p.default {
                None => p.name.to_string(),
                Some(DefaultValue::Str(s)) => format!("{}={:?}", p.name, s),
                Some(DefaultValue::Bool(b)) => format!("{}={}", p.name, b),
            })
            .collect();
        format!("{}({})", self.name(), params.join(", "))
    }

    /// ディレクティブの引数（位置 + name=value）を Params に束縛する
    pub fn bind(&self, args: &[DirectiveArg]) -> Result<Params, Error> {
        let mut params = Params::new();
        let mut position = 0;
        for arg in args {
            let spec = match &arg.keyword {
                Some(k) => self
                    .params
                    .iter()
                    .find(|p| p.name == k.as_str())
                    .ok_or_else(|| {
                        Error::invalid_argument(format!("unexpected argument '{}'", k))
                    })?,
                None => {
                    let spec = self.params.get(position).ok_or_else(|| {
                        Error::invalid_argument(format!(
                            "takes at most {} arguments ({} given)",
                            self.params.len(),
                            args.len()
                        ))
                    })?;
                    position += 1;
                    spec
                }
            };
            if params.contains_key(spec.name) {
                return Err(Error::invalid_argument(format!(
                    "got multiple values for argument '{}'",
                    spec.name
                )));
            }
            if let Some(v) = convert(spec, &arg.value)? {
                params.insert(spec.name.to_string(), v);
            }
        }
        Ok(params)
    }

    /// 必須・型・未知キーを検査し、省略された引数をデフォルトで埋めて返す
    pub fn validate(&self, params: &Params) -> Result<Params, Error> {
        if let Some(unknown) = params
            .keys()
            .find(|k| !self.params.iter().any(|p| p.name == k.as_str()))
        {
            return Err(Error::invalid_argument(format!(
                "unexpected argument '{}'",
                unknown
            )));
        }

        let mut out = Params::new();
        for spec in self.params {
            let value = match (params.get(spec.name), spec.default) {
                (Some(v), _) => v.clone(),
                (None, Some(d)) => d.to_param(),
                (None, None) => {
                    return Err(Error::invalid_argument(format!(
                        "missing required argument '{}'",
                        spec.name
                    )))
                }
            };
            let kind_ok = match spec.kind {
                ParamKind::Str => value.as_str().is_some(),
                ParamKind::Bool => value.as_bool().is_some(),
            };
            if !kind_ok {
                return Err(Error::invalid_argument(format!(
                    "argument '{}' has the wrong type",
                    spec.name
                )));
            }
            out.insert(spec.name.to_string(), value);
        }

        if let Some(enc) = out.get("encoding").and_then(ParamValue::as_str) {
            let e = enc.trim().to_ascii_lowercase();
            if e != "utf-8" && e != "utf8" {
                return Err(Error::invalid_argument(format!(
                    "unsupported encoding '{}' (only utf-8 is supported)",
                    enc
                )));
            }
        }
        Ok(out)
    }

    /// 検査してから FileOperations を呼ぶ
    pub fn invoke(&self, files: &dyn FileOperations, params: &Params) -> Result<OperationResult, Error> {
        let p = self.validate(params)?;
        let result = match self.operation {
            Operation::CreateFile => files.create_file(str_arg(&p, "path")?, str_arg(&p, "content")?),
            Operation::ReadFile => files.read_file(str_arg(&p, "path")?),
            Operation::WriteFile => files.write_file(
                str_arg(&p, "path")?,
                str_arg(&p, "content")?,
                bool_arg(&p, "append"),
            ),
            Operation::DeleteFile => files.delete_file(str_arg(&p, "path")?),
            Operation::MoveFile => files.move_file(str_arg(&p, "src_path")?, str_arg(&p, "dst_path")?),
            Operation::CopyFile => files.copy_file(str_arg(&p, "src_path")?, str_arg(&p, "dst_path")?),
            Operation::CreateDirectory => files.create_directory(str_arg(&p, "path")?),
            Operation::ListFiles => files.list_files(
                str_arg(&p, "path")?,
                str_arg(&p, "pattern")?,
                bool_arg(&p, "recursive"),
            ),
            Operation::AiProcess => {
                return Err(Error::invalid_argument(format!(
                    "Unknown operation: {}",
                    self.operation
                )))
            }
        };
        Ok(result)
    }
}

fn str_arg<'a>(p: &'a Params, key: &str) -> Result<&'a str, Error> {
    p.get(key)
        .and_then(ParamValue::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("missing required argument '{}'", key)))
}

fn bool_arg(p: &Params, key: &str) -> bool {
    p.get(key).and_then(ParamValue::as_bool).unwrap_or(false)
}

/// ディレクティブの値を引数の型に合わせる。None（null）は省略扱い
fn convert(spec: &ParamSpec, value: &ArgValue) -> Result<Option<ParamValue>, Error> {
    let wrong = || {
        Error::invalid_argument(format!(
            "argument '{}' expects {}",
            spec.name,
            match spec.kind {
                ParamKind::Str => "a string",
                ParamKind::Bool => "a boolean",
            }
        ))
    };
    match (spec.kind, value) {
        (_, ArgValue::Null) => Ok(None),
        (ParamKind::Str, ArgValue::Str(s)) => Ok(Some(ParamValue::Str(s.clone()))),
        (ParamKind::Str, _) => Err(wrong()),
        (ParamKind::Bool, ArgValue::Bool(b)) => Ok(Some(ParamValue::Bool(*b))),
        (ParamKind::Bool, ArgValue::Str(s)) | (ParamKind::Bool, ArgValue::Num(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(ParamValue::Bool(true))),
                "false" | "0" | "no" => Ok(Some(ParamValue::Bool(false))),
                _ => Err(wrong()),
            }
        }
    }
}
