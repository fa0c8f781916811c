use std::process::ExitCode;

use anyhow::Context;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use hftok::config::{LoggingConfig, Settings};
use hftok::hub::HubLoader;
use hftok::models::Catalog;
use hftok::session::{LinePrompter, Session};

/// Main entry point for hftok
///
/// Loads settings, sets up logging, reads the access token once, then runs a
/// single interactive session on the terminal.
///
/// Exits with 0 when the user leaves normally and 1 when the tokenizer could
/// not be loaded or startup failed.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let settings = Settings::new().context("Failed to load configuration")?;

    // Held until exit so buffered log lines reach the file
    let _guard = init_logging(&settings.logging);

    info!("hftok starting up...");
    info!("Hub endpoint: {}", settings.hub.endpoint);

    let credential = read_credential(&settings.hub.token_env);
    info!(
        "Credential from {}: {}",
        settings.hub.token_env,
        if credential.is_some() { "present" } else { "absent" }
    );

    let loader = HubLoader::new(
        settings.hub.clone(),
        credential,
        settings.tokenize.add_special_tokens,
    );
    let catalog = Catalog::new(settings.models.candidates.clone());
    let prompter = LinePrompter::new().context("Failed to open the terminal")?;

    let mut session = Session::new(prompter, &loader, &catalog, std::io::stdout());
    match session.run().await {
        Ok(outcome) => {
            info!("Session ended: {:?}", outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_reported() => {
            info!("Session failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Logs to a daily rolling file when a directory is configured, to stderr otherwise.
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    match &logging.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::RollingFileAppender::new(
                tracing_appender::rolling::Rotation::DAILY,
                directory,
                "hftok",
            );
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                // Disable ANSI colors for cleaner log files
                .with_ansi(false)
                .with_line_number(true)
                .with_file(true)
                .with_target(false)
                .with_env_filter(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_env_filter(filter)
                .init();
            None
        }
    }
}

/// Reads the access token once; an empty value counts as unset
fn read_credential(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
