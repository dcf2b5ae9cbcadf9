mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io::IsTerminal;
use std::process;

use async_trait::async_trait;
use cli::{config_to_mode, parse_args, print_completion, Config, ParseOutcome, RunMode};
use common::adapter::StdEnvResolver;
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use ports::inbound::UseCaseRunner;
use wiring::{wire_fagent, App};

use adapter::{console, repl};

/// RunMode をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

#[async_trait]
impl UseCaseRunner for Runner {
    async fn run(&self, config: Config) -> Result<i32, Error> {
        let mode = config_to_mode(&config);
        let mode_name = mode_name_for_log(&mode);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("mode", mode_name)
                .field("workspace", self.app.workspace.display().to_string()),
        );

        let result = match mode {
            RunMode::Help => {
                console::print_help();
                Ok(0)
            }
            RunMode::Once(command) => {
                let outcome = self.app.coordinator.execute(&command).await;
                if config.json {
                    println!("{}", console::result_to_json(&outcome)?);
                } else {
                    let color = std::io::stdout().is_terminal();
                    println!("{}", console::format_result(&outcome, color));
                }
                Ok(if outcome.success { 0 } else { 1 })
            }
            RunMode::Interactive => repl::run(repl::Session {
                coordinator: &self.app.coordinator,
                config: &self.app.config,
                workspace: &self.app.workspace,
                json: config.json,
            })
            .await
            .map(|_| 0),
        };

        let code = result.as_ref().copied().unwrap_or(0);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("mode", mode_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self.app.logger.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
        }
        result
    }
}

fn mode_name_for_log(mode: &RunMode) -> &'static str {
    match mode {
        RunMode::Help => "help",
        RunMode::Once(_) => "once",
        RunMode::Interactive => "interactive",
    }
}

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("fagent: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub async fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    if config.help {
        console::print_help();
        return Ok(0);
    }
    let app = wire_fagent(&config, &StdEnvResolver)?;
    let runner = Runner { app };
    runner.run(config).await
}

fn print_usage() {
    eprintln!("Usage: fagent [-c <command>] [-w <dir>] [-f <config>] [-p <provider>] [-m <model>] [-v] [--json]");
}
