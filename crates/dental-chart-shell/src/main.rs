use anyhow::Context;
use tracing_subscriber::EnvFilter;

use dental_chart_core::config::{default_log_filter, APP_NAME, APP_VERSION};
use dental_chart_shell::{ShellConfig, DEFAULT_CONFIG_PATH, ENV_SHELL_CONFIG};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .init();

    tracing::info!("{} shell starting v{}", APP_NAME, APP_VERSION);

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_SHELL_CONFIG).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = ShellConfig::load(&path)
        .with_context(|| format!("failed to load shell config from {}", path))?;

    let status = dental_chart_shell::run(&config).context("shell session failed")?;
    std::process::exit(status.code().unwrap_or(1));
}
