//! Local API child process.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::ShellConfig;
use crate::{ShellError, ShellResult};

/// Something that can tell whether the API is accepting requests.
pub trait ReadinessProbe {
    fn is_ready(&self) -> bool;
}

impl<F: Fn() -> bool> ReadinessProbe for F {
    fn is_ready(&self) -> bool {
        self()
    }
}

/// Probe that treats any HTTP response, error statuses included, as ready.
pub struct HttpProbe {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ShellResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShellError::Http(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReadinessProbe for HttpProbe {
    fn is_ready(&self) -> bool {
        match self.client.get(&self.url).send() {
            Ok(response) => {
                tracing::debug!(status = %response.status(), url = %self.url, "API answered");
                true
            }
            Err(_) => false,
        }
    }
}

/// Running API process. Killed on [`ApiProcess::shutdown`] or drop.
pub struct ApiProcess {
    child: Option<Child>,
}

impl ApiProcess {
    /// Start the configured API executable with null stdio.
    ///
    /// An executable given with a directory runs from that directory; a bare
    /// program name is looked up on `PATH` and keeps the current directory.
    pub fn spawn(config: &ShellConfig) -> ShellResult<Self> {
        let exe = &config.api_executable;
        let program = exe.display().to_string();
        let spawn_error = |source| ShellError::Spawn {
            program: program.clone(),
            source,
        };

        let mut command = if has_directory(exe) {
            let resolved = std::fs::canonicalize(exe).map_err(spawn_error)?;
            let mut command = Command::new(&resolved);
            if let Some(dir) = resolved.parent() {
                command.current_dir(dir);
            }
            command
        } else {
            Command::new(exe)
        };

        let child = command
            .args(&config.api_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;

        tracing::info!(pid = child.id(), program = %program, "API process started");
        Ok(Self { child: Some(child) })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Whether the process is still alive.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Poll `probe` every `interval` until it reports ready.
    ///
    /// Fails as soon as the process exits, or once `timeout` has elapsed.
    pub fn wait_until_ready<P>(
        &mut self,
        probe: &P,
        timeout: Duration,
        interval: Duration,
    ) -> ShellResult<()>
    where
        P: ReadinessProbe + ?Sized,
    {
        let started = Instant::now();

        loop {
            let child = self.child.as_mut().ok_or_else(|| ShellError::ApiExited {
                status: "already shut down".to_string(),
            })?;
            if let Some(status) = child.try_wait()? {
                return Err(ShellError::ApiExited {
                    status: status.to_string(),
                });
            }

            if probe.is_ready() {
                tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "API ready");
                return Ok(());
            }

            if started.elapsed() >= timeout {
                return Err(ShellError::StartupTimeout {
                    waited_ms: timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(interval);
        }
    }

    /// Kill the process if it is still running and reap it.
    pub fn shutdown(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Ok(None) = child.try_wait() {
            if let Err(e) = child.kill() {
                tracing::warn!(error = %e, "Failed to kill API process");
            }
        }

        match child.wait() {
            Ok(status) => tracing::info!(%status, "API process stopped"),
            Err(e) => tracing::warn!(error = %e, "Failed to reap API process"),
        }
    }
}

impl Drop for ApiProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Whether `path` has a directory component.
pub(crate) fn has_directory(path: &Path) -> bool {
    path.parent().is_some_and(|dir| !dir.as_os_str().is_empty())
}
