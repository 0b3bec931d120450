//! Shell launcher configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use dental_chart_core::config::DEFAULT_API_URL;

use crate::ShellResult;

/// Env var naming the config file when no path is given on the command line.
pub const ENV_SHELL_CONFIG: &str = "DENTAL_SHELL_CONFIG";

/// Config file used when neither argument nor env var is set.
pub const DEFAULT_CONFIG_PATH: &str = "shell.json";

/// What to start and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Local API executable; started with its own directory as working directory
    pub api_executable: PathBuf,
    pub api_args: Vec<String>,
    /// Base URL the API serves on
    pub api_base_url: String,
    /// Path under `api_base_url` polled until the API answers
    pub readiness_path: String,
    pub startup_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Front end to run once the API is up
    pub frontend: FrontendCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrontendCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_executable: PathBuf::from("electron-api/DentalClinic.API"),
            api_args: Vec::new(),
            api_base_url: DEFAULT_API_URL.to_string(),
            readiness_path: "/Teeth/patient/0".to_string(),
            startup_timeout_secs: 30,
            poll_interval_ms: 250,
            frontend: FrontendCommand::default(),
        }
    }
}

impl Default for FrontendCommand {
    fn default() -> Self {
        Self {
            program: "dental-ui".to_string(),
            args: Vec::new(),
        }
    }
}

impl ShellConfig {
    /// Parse from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> ShellResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> ShellResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Full URL polled while waiting for the API.
    pub fn readiness_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let path = self.readiness_path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
