//! Configuration types for toolgate

use crate::policy::DEFAULT_PROVIDER_PREFIX;
use serde::{Deserialize, Serialize};

/// Main configuration for a gateway deployment
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server identity and exposure mode
    pub server: ServerConfig,

    /// Provider allow-list
    pub access: AccessConfig,

    /// Strict argument validation
    pub validation: ValidationConfig,

    /// Logging output
    pub logging: LoggingConfig,
}

/// Server identity and exposure mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Name reported in `initialize`
    pub name: String,

    /// Version reported in `initialize`
    pub version: String,

    /// Expose only the discover/get-info/execute meta tools instead of every
    /// allowed operation
    pub gateway_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "toolgate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            gateway_mode: false,
        }
    }
}

/// Provider allow-list configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccessConfig {
    /// Expose every registered operation regardless of provider
    pub include_all_tools: bool,

    /// Provider prefix an operation must start with to be exposed
    pub allowed_provider_prefix: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            include_all_tools: false,
            allowed_provider_prefix: DEFAULT_PROVIDER_PREFIX.to_string(),
        }
    }
}

/// Strict validation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate coerced arguments against the derived schema before
    /// instantiating an operation. Off by default: calls only go through
    /// lenient coercion.
    pub validate_arguments: bool,

    /// Maximum number of errors reported per validation
    pub max_errors: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_arguments: false,
            max_errors: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `toolgate.toml` in the working directory
    /// 3. The file named by `TOOLGATE_CONFIG_PATH`
    /// 4. `TOOLGATE_*` environment variables, with `__` separating sections
    ///    (for example `TOOLGATE_ACCESS__INCLUDE_ALL_TOOLS=true`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or the result fails
    /// validation.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new().merge(Toml::file("toolgate.toml"));

        if let Ok(path) = std::env::var("TOOLGATE_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: GatewayConfig = figment
            .merge(Env::prefixed("TOOLGATE_").split("__"))
            .extract()
            .map_err(|e| {
                crate::error::GatewayError::Configuration(format!(
                    "Failed to load configuration: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// JSON files are accepted when the extension is `.json`; everything else
    /// is read as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or fails validation.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Json, Toml},
        };

        let path = path.as_ref();
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Figment::new().merge(Json::file(path)),
            _ => Figment::new().merge(Toml::file(path)),
        };

        let config: GatewayConfig = figment.extract().map_err(|e| {
            crate::error::GatewayError::Configuration(format!(
                "Failed to load configuration file: {}",
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when no operation could ever be exposed or when
    /// validation is set to report zero errors.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.access.include_all_tools && self.access.allowed_provider_prefix.trim().is_empty() {
            return Err(crate::error::GatewayError::Configuration(
                "access.allowed_provider_prefix must not be empty unless include_all_tools is set"
                    .to_string(),
            ));
        }

        if self.validation.max_errors == 0 {
            return Err(crate::error::GatewayError::Configuration(
                "validation.max_errors must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
