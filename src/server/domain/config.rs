//! Typed configuration for the supervised inference server.

use super::{ConfigurationError, EntryPoint, LaunchCommand};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Prefix shared by every environment variable read by [`InferenceServerConfig::from_env`].
pub const ENV_PREFIX: &str = "VISION_AGENT_";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8001;
const DEFAULT_GPU_MEMORY_UTILIZATION: f64 = 0.8;
const DEFAULT_PYTHON: &str = "python";
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Host and port the server binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Creates a validated address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyHost`] for a blank host and
    /// [`ConfigurationError::InvalidPort`] for port zero.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConfigurationError> {
        let normalized = host.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ConfigurationError::EmptyHost);
        }
        if port == 0 {
            return Err(ConfigurationError::InvalidPort);
        }
        Ok(Self {
            host: normalized,
            port,
        })
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns `http://host:port`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{self}")
    }

    /// Returns the health endpoint URL.
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url())
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.host, self.port)
    }
}

/// Settings for launching and supervising the inference server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceServerConfig {
    model_path: String,
    address: ServerAddress,
    gpu_memory_utilization: f64,
    max_model_len: Option<u32>,
    python: String,
    extra_args: Vec<String>,
    startup_timeout: Duration,
    probe_interval: Duration,
    shutdown_grace: Duration,
}

impl InferenceServerConfig {
    /// Creates a configuration with default settings for `model_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingModelPath`] when `model_path` is
    /// empty after trimming.
    pub fn new(model_path: impl Into<String>) -> Result<Self, ConfigurationError> {
        let normalized = model_path.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ConfigurationError::MissingModelPath);
        }

        Ok(Self {
            model_path: normalized,
            address: ServerAddress::new(DEFAULT_HOST, DEFAULT_PORT)?,
            gpu_memory_utilization: DEFAULT_GPU_MEMORY_UTILIZATION,
            max_model_len: None,
            python: DEFAULT_PYTHON.to_owned(),
            extra_args: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// Reads the configuration from `VISION_AGENT_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`InferenceServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, keyed by full variable name.
    ///
    /// `VISION_AGENT_MODEL_PATH` is required. `HOST`, `PORT`,
    /// `GPU_MEMORY_UTILIZATION`, `MAX_MODEL_LEN`, `PYTHON`,
    /// `STARTUP_TIMEOUT_SECS` and `PROBE_INTERVAL_MILLIS` override the
    /// defaults when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingModelPath`] when no model path
    /// is set, [`ConfigurationError::InvalidEnvironmentValue`] for values
    /// that do not parse, and the builder validation errors otherwise.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        let mut config = Self::new(read("MODEL_PATH").unwrap_or_default())?;
        let host = read("HOST").unwrap_or_else(|| config.address.host().to_owned());
        let port = parse_var(&read, "PORT")?.unwrap_or(config.address.port());
        config = config.with_address(ServerAddress::new(host, port)?);

        if let Some(utilization) = parse_var(&read, "GPU_MEMORY_UTILIZATION")? {
            config = config.with_gpu_memory_utilization(utilization)?;
        }
        if let Some(max_model_len) = parse_var(&read, "MAX_MODEL_LEN")? {
            config = config.with_max_model_len(max_model_len);
        }
        if let Some(python) = read("PYTHON") {
            config = config.with_python(python)?;
        }
        if let Some(seconds) = parse_var(&read, "STARTUP_TIMEOUT_SECS")? {
            config = config.with_startup_timeout(Duration::from_secs(seconds))?;
        }
        if let Some(millis) = parse_var(&read, "PROBE_INTERVAL_MILLIS")? {
            config = config.with_probe_interval(Duration::from_millis(millis))?;
        }
        Ok(config)
    }

    /// Replaces the bind address.
    #[must_use]
    pub fn with_address(mut self, address: ServerAddress) -> Self {
        self.address = address;
        self
    }

    /// Sets the fraction of GPU memory the server may claim.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidGpuMemoryUtilization`] unless
    /// `utilization` lies in `(0, 1]`.
    pub fn with_gpu_memory_utilization(
        mut self,
        utilization: f64,
    ) -> Result<Self, ConfigurationError> {
        let in_range = utilization > 0.0 && utilization <= 1.0;
        if !in_range {
            return Err(ConfigurationError::InvalidGpuMemoryUtilization(
                utilization.to_string(),
            ));
        }
        self.gpu_memory_utilization = utilization;
        Ok(self)
    }

    /// Caps the model context length.
    #[must_use]
    pub const fn with_max_model_len(mut self, max_model_len: u32) -> Self {
        self.max_model_len = Some(max_model_len);
        self
    }

    /// Sets the interpreter used to run the server module.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyInterpreter`] for a blank command.
    pub fn with_python(mut self, python: impl Into<String>) -> Result<Self, ConfigurationError> {
        let normalized = python.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(ConfigurationError::EmptyInterpreter);
        }
        self.python = normalized;
        Ok(self)
    }

    /// Appends extra server arguments after the standard ones.
    #[must_use]
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Sets how long start-up may wait for a healthy server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroDuration`] for a zero timeout.
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Result<Self, ConfigurationError> {
        if timeout.is_zero() {
            return Err(ConfigurationError::ZeroDuration("startup timeout"));
        }
        self.startup_timeout = timeout;
        Ok(self)
    }

    /// Sets the delay between health probes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroDuration`] for a zero interval.
    pub fn with_probe_interval(mut self, interval: Duration) -> Result<Self, ConfigurationError> {
        if interval.is_zero() {
            return Err(ConfigurationError::ZeroDuration("probe interval"));
        }
        self.probe_interval = interval;
        Ok(self)
    }

    /// Sets how long a graceful stop waits before force-killing.
    #[must_use]
    pub const fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Returns the model path or hub reference.
    #[must_use]
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Returns the bind address.
    #[must_use]
    pub const fn address(&self) -> &ServerAddress {
        &self.address
    }

    /// Returns the GPU memory fraction.
    #[must_use]
    pub const fn gpu_memory_utilization(&self) -> f64 {
        self.gpu_memory_utilization
    }

    /// Returns the context length cap, if any.
    #[must_use]
    pub const fn max_model_len(&self) -> Option<u32> {
        self.max_model_len
    }

    /// Returns the interpreter command.
    #[must_use]
    pub fn python(&self) -> &str {
        &self.python
    }

    /// Returns the start-up deadline.
    #[must_use]
    pub const fn startup_timeout(&self) -> Duration {
        self.startup_timeout
    }

    /// Returns the delay between health probes.
    #[must_use]
    pub const fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    /// Returns the graceful stop window.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }

    /// Renders the command that starts `entry_point`.
    #[must_use]
    pub fn launch_command(&self, entry_point: EntryPoint) -> LaunchCommand {
        let mut args = vec![
            "-m".to_owned(),
            entry_point.module().to_owned(),
            "--host".to_owned(),
            self.address.host().to_owned(),
            "--port".to_owned(),
            self.address.port().to_string(),
            "--model".to_owned(),
            self.model_path.clone(),
            "--gpu-memory-utilization".to_owned(),
            self.gpu_memory_utilization.to_string(),
        ];
        if let Some(max_model_len) = self.max_model_len {
            args.push("--max-model-len".to_owned());
            args.push(max_model_len.to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        LaunchCommand::new(entry_point, self.python.clone(), args)
    }
}

fn parse_var<T>(
    read: &impl Fn(&str) -> Option<String>,
    suffix: &str,
) -> Result<Option<T>, ConfigurationError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = read(suffix) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err: T::Err| ConfigurationError::InvalidEnvironmentValue {
            variable: format!("{ENV_PREFIX}{suffix}"),
            value: raw.clone(),
            reason: err.to_string(),
        })
}
