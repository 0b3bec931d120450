//! Desktop shell launcher for the dental clinic front end.
//!
//! Starts the local clinic API, waits until it answers HTTP, runs the front
//! end to completion, then stops the API. The API never outlives the shell.

pub mod config;
pub mod process;

pub use config::*;
pub use process::*;

use std::process::{Command, ExitStatus};

use thiserror::Error;

/// Shell errors.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API exited before becoming ready ({status})")]
    ApiExited { status: String },

    #[error("API not ready after {waited_ms}ms")]
    StartupTimeout { waited_ms: u64 },

    #[error("HTTP client error: {0}")]
    Http(String),
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Shortest per-request timeout for readiness polls.
const POLL_FLOOR: std::time::Duration = std::time::Duration::from_millis(200);

/// Run one shell session and return the front end's exit status.
pub fn run(config: &ShellConfig) -> ShellResult<ExitStatus> {
    let mut api = ApiProcess::spawn(config)?;

    let probe = HttpProbe::new(config.readiness_url(), config.poll_interval().max(POLL_FLOOR))?;
    tracing::info!(url = %probe.url(), "Waiting for API");
    api.wait_until_ready(&probe, config.startup_timeout(), config.poll_interval())?;

    let frontend = &config.frontend;
    tracing::info!(program = %frontend.program, "Starting front end");
    let status = Command::new(&frontend.program)
        .args(&frontend.args)
        .status()
        .map_err(|source| ShellError::Spawn {
            program: frontend.program.clone(),
            source,
        })?;

    tracing::info!(%status, "Front end exited");
    api.shutdown();
    Ok(status)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_run_fails_when_api_exits() {
        let config = ShellConfig {
            api_executable: PathBuf::from("false"),
            api_base_url: "http://127.0.0.1:1".into(),
            poll_interval_ms: 20,
            startup_timeout_secs: 5,
            ..ShellConfig::default()
        };

        let result = run(&config);
        assert!(matches!(result, Err(ShellError::ApiExited { .. })));
    }

    #[test]
    fn test_run_fails_when_api_missing() {
        let config = ShellConfig {
            api_executable: PathBuf::from("definitely-not-a-clinic-api"),
            ..ShellConfig::default()
        };

        assert!(matches!(run(&config), Err(ShellError::Spawn { .. })));
    }
}
