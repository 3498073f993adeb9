use std::path::Path;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::cli::Cli;

/// File picked up from the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Scheme and host; `/plate` paths are appended.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub state_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub redirect_delay_ms: u64,
    pub toast_duration_ms: u64,
    pub viewport_width: u32,
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UiConfig {
    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    #[must_use]
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Defaults < config file < `PLATE__*` environment < CLI flags (and
    /// their `env` fallbacks).
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.base_url", "http://127.0.0.1:8000")?
            .set_default("http.timeout_secs", 30)?
            .set_default("storage.state_file", ".plate-console/state.json")?
            .set_default("ui.redirect_delay_ms", 1000)?
            .set_default("ui.toast_duration_ms", 5000)?
            .set_default("ui.viewport_width", 1280)?;

        match &cli.config {
            Some(path) => {
                builder = builder.add_source(File::from(Path::new(path)).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
            }
            None => {}
        }

        // E.g. PLATE__SERVER__BASE_URL=http://plates.local
        builder = builder.add_source(
            Environment::with_prefix("PLATE")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &cli.base_url {
            builder = builder.set_override("server.base_url", url.as_str())?;
        }
        if let Some(path) = &cli.state_file {
            builder = builder.set_override("storage.state_file", path.as_str())?;
        }
        if let Some(secs) = cli.timeout_secs {
            builder =
                builder.set_override("http.timeout_secs", i64::try_from(secs).unwrap_or(i64::MAX))?;
        }

        builder.build()?.try_deserialize()
    }
}
