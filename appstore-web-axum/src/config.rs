//! Application configuration.
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by values from the `appstore.json` file and then by environment variables prefixed with
//! `APPSTORE_`. Nested keys in environment variables are separated by `__`, e.g.
//! `APPSTORE_WEB__SERVERS__DEFAULT__LISTEN_ADDRESS=127.0.0.1:3000`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use fxhash::FxHashMap;
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "APPSTORE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "appstore.json";

/// Name of the server present in the default configuration.
pub const DEFAULT_SERVER_NAME: &str = "default";

/// Server configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Address on which to listen.
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Web server configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct WebConfig {
    /// Map from server name to their config. Typically, only one server with one address will be
    /// present, but in case multiple servers are desired, they should be specified here.
    pub servers: FxHashMap<String, ServerConfig>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            servers: [(DEFAULT_SERVER_NAME.to_string(), Default::default())]
                .into_iter()
                .collect(),
        }
    }
}

impl From<OptionalWebConfig> for WebConfig {
    fn from(value: OptionalWebConfig) -> Self {
        let default = Self::default();
        Self {
            servers: value.servers.unwrap_or(default.servers),
        }
    }
}

/// Top-level application configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed in the scope of the application.
    pub install_tracing_logger: bool,
    /// Configuration of web servers.
    pub web: WebConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            web: Default::default(),
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            web: value.web.map(Into::into).unwrap_or(default.web),
        }
    }
}

impl ApplicationConfig {
    /// Loads the config from the config file and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::load(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(CONFIG_ENV_PREFIX)
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionalApplicationConfig>())
            .map(|config| config.into())
    }
}

#[derive(Deserialize)]
struct OptionalWebConfig {
    servers: Option<FxHashMap<String, ServerConfig>>,
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
    web: Option<OptionalWebConfig>,
}
