//! コマンド実行のコーディネータ
//!
//! 分類 → 直接操作（＋AI の確認メッセージ）、または
//! AI 対話 → ディレクティブ抽出 → 許可リスト内の操作の実行、を行い
//! 1 つの OperationResult にまとめる。内部エラーやパニックも失敗結果に変換し、外には出さない。

use crate::domain::directive::{self, Directive};
use crate::domain::operation_table;
use crate::domain::{Command, Operation};
use crate::usecase::classifier::CommandClassifier;
use common::error::Error;
use common::llm::{GenerateOptions, REQUEST_MARKER};
use common::operation::OperationResult;
use common::ports::outbound::{FileOperations, Log, LogLevel, LogRecord, ResponseGenerator};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// 確認メッセージ生成時の上限トークン
const CONFIRM_MAX_TOKENS: u32 = 100;

pub const NOT_CONFIGURED: &str = "AI provider not configured";

/// status 表示用のスナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorStatus {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub confirm_operations: bool,
    pub operations: Vec<&'static str>,
}

pub struct ExecutionCoordinator {
    classifier: CommandClassifier,
    files: Arc<dyn FileOperations>,
    generator: Option<Arc<dyn ResponseGenerator>>,
    options: GenerateOptions,
    confirm_operations: bool,
    log: Arc<dyn Log>,
}

impl ExecutionCoordinator {
    pub fn new(
        classifier: CommandClassifier,
        files: Arc<dyn FileOperations>,
        generator: Option<Arc<dyn ResponseGenerator>>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            classifier,
            files,
            generator,
            options: GenerateOptions::default(),
            confirm_operations: true,
            log,
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_confirmations(mut self, enabled: bool) -> Self {
        self.confirm_operations = enabled;
        self
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            provider: self.generator.as_ref().map(|g| g.provider().to_string()),
            model: self.generator.as_ref().map(|g| g.model().to_string()),
            confirm_operations: self.confirm_operations,
            operations: operation_table::operation_names(),
        }
    }

    /// 発話を 1 つ実行する。失敗は常に success == false の結果として返る
    pub async fn execute(&self, utterance: &str) -> OperationResult {
        let outcome = AssertUnwindSafe(self.dispatch(utterance))
            .catch_unwind()
            .await;
        let fault = match outcome {
            Ok(Ok(result)) => return result,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic),
        };
        self.emit(
            LogRecord::new(LogLevel::Error, format!("Error executing command: {}", fault))
                .kind("error")
                .field("utterance", utterance),
        );
        OperationResult::failed(format!("Error executing command: {}", fault))
    }

    async fn dispatch(&self, utterance: &str) -> Result<OperationResult, Error> {
        let command = self.classifier.classify(utterance);
        self.emit(
            LogRecord::new(LogLevel::Info, format!("Classified as {}", command.operation))
                .kind("classify")
                .field("operation", command.operation.as_str())
                .field("params", command.params_summary()),
        );
        match command.operation {
            Operation::AiProcess => {
                let prompt = command.str_param("prompt").unwrap_or(utterance.trim());
                self.ai_process(prompt).await
            }
            _ => self.run_primitive(&command).await,
        }
    }

    async fn run_primitive(&self, command: &Command) -> Result<OperationResult, Error> {
        let spec = operation_table::spec_for(command.operation).ok_or_else(|| {
            Error::invalid_argument(format!("Unknown operation: {}", command.operation))
        })?;
        let mut result = spec.invoke(self.files.as_ref(), &command.params)?;
        result.operation = Some(spec.name().to_string());
        self.emit(
            LogRecord::new(
                if result.success { LogLevel::Info } else { LogLevel::Warn },
                result.message.clone(),
            )
            .kind("operation")
            .field("operation", spec.name())
            .field("success", result.success),
        );

        if result.success && self.confirm_operations {
            if let Some(message) = self.confirmation(command).await {
                result.ai_message = Some(message);
            }
        }
        Ok(result)
    }

    /// 直接操作の成功後に AI に短い確認文を書かせる。失敗しても主結果は変えない
    async fn confirmation(&self, command: &Command) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let prompt = format!(
            "The file operation '{}' was executed successfully with parameters: {}. \
             Reply with one short sentence confirming this to the user.",
            command.operation,
            command.params_summary()
        );
        let options = GenerateOptions {
            max_tokens: CONFIRM_MAX_TOKENS,
            temperature: self.options.temperature,
        };
        let response = generator.generate(&prompt, &options).await;
        if !response.success {
            self.emit(
                LogRecord::new(
                    LogLevel::Warn,
                    format!(
                        "Confirmation message failed: {}",
                        response.error.as_deref().unwrap_or("unknown error")
                    ),
                )
                .kind("llm"),
            );
            return None;
        }
        response.text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
    }

    async fn ai_process(&self, request: &str) -> Result<OperationResult, Error> {
        let generator = match &self.generator {
            Some(g) => g,
            None => {
                self.emit(LogRecord::new(LogLevel::Warn, NOT_CONFIGURED).kind("llm"));
                return Ok(OperationResult::failed(NOT_CONFIGURED).with_operation("ai_process"));
            }
        };

        let prompt = build_enhanced_prompt(request);
        let response = generator.generate(&prompt, &self.options).await;

        if !response.success {
            let error = response.error.unwrap_or_else(|| "unknown error".to_string());
            self.emit(
                LogRecord::new(LogLevel::Error, format!("AI processing failed: {}", error))
                    .kind("llm")
                    .field("provider", generator.provider())
                    .field("model", response.model.as_str()),
            );
            let mut result = OperationResult::failed(format!("AI processing failed: {}", error))
                .with_operation("ai_process");
            result.ai_model = Some(response.model);
            result.usage = response.usage;
            return Ok(result);
        }

        let text = response.text.unwrap_or_default();
        let directives = directive::scan(&text);
        let outcomes = self.execute_directives(&directives);
        let mut message = directive::strip(&text, &directives);
        if !outcomes.is_empty() {
            if !message.is_empty() {
                message.push_str("\n\n");
            }
            message.push_str("Executed operations:\n");
            message.push_str(&outcomes.join("\n"));
        }

        self.emit(
            LogRecord::new(LogLevel::Info, "AI response processed")
                .kind("llm")
                .field("model", response.model.as_str())
                .field("directives", directives.len())
                .field("executed", outcomes.len()),
        );

        let mut result = OperationResult::ok(message).with_operation("ai_process");
        result.ai_model = Some(response.model);
        result.usage = response.usage;
        if !outcomes.is_empty() {
            result.outcomes = Some(outcomes);
        }
        Ok(result)
    }

    /// 許可リストにあるディレクティブだけを順に実行し、結果行を返す。
    /// 知らない名前は黙って無視する。1 つの失敗で残りを止めない
    fn execute_directives(&self, directives: &[Directive]) -> Vec<String> {
        let mut outcomes = Vec::new();
        for d in directives {
            let spec = match operation_table::lookup(&d.name) {
                Some(spec) => spec,
                None => {
                    self.emit(
                        LogRecord::new(LogLevel::Warn, format!("Ignored directive: {}", d.name))
                            .kind("directive"),
                    );
                    continue;
                }
            };
            let line = match spec
                .bind(&d.args())
                .and_then(|params| spec.invoke(self.files.as_ref(), &params))
            {
                Ok(r) if r.success => format!("✓ {}", r.message),
                Ok(r) => format!("✗ {}: {}", spec.name(), r.message),
                Err(e) => format!("✗ {}: {}", spec.name(), e),
            };
            self.emit(
                LogRecord::new(LogLevel::Info, line.clone())
                    .kind("directive")
                    .field("operation", spec.name()),
            );
            outcomes.push(line);
        }
        outcomes
    }

    fn emit(&self, record: LogRecord) {
        let _ = self.log.log(&record.layer("usecase"));
    }
}

/// AI に渡すプロンプト。依頼文・使える操作（表から生成）・ディレクティブの書式を含む
pub fn build_enhanced_prompt(request: &str) -> String {
    let operations: Vec<String> = operation_table::OPERATIONS
        .iter()
        .map(|spec| format!("- {}: {}", spec.signature(), spec.description))
        .collect();
    format!(
        "{marker} {request}\n\n\
         You are a file management assistant working inside the user's workspace.\n\
         Available operations:\n\
         {operations}\n\n\
         If the request needs any of these operations, answer briefly and then add one line per \
         operation in exactly this form:\n\
         {execute} operation_name(\"arg1\", \"arg2\", ...)\n\
         Quote string arguments. Only use the operations listed above.",
        marker = REQUEST_MARKER,
        request = request,
        operations = operations.join("\n"),
        execute = directive::MARKER,
    )
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
