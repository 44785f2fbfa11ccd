//! Component configuration.
//!
//! Supplied once by the hosting process and read-only afterwards. Build it
//! explicitly with [`ComponentConfig::new`] and the `with_*` methods, or
//! from `RELAY_*` environment variables with [`ComponentConfig::from_env`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const VAR_PREFIX: &str = "RELAY_VAR_";

/// Wire encoding style the external mapper uses for payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStyle {
    /// Short field names.
    #[default]
    Compact,
    /// Long, self-describing field names.
    Extended,
}

impl MappingStyle {
    /// The canonical style name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for MappingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "extended" => Ok(Self::Extended),
            other => Err(ConfigError::InvalidMapping(other.to_string())),
        }
    }
}

/// Read-only configuration of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
    /// Version of the platform the component runs on.
    #[serde(default)]
    pub platform_version: String,
    /// Debug mode.
    #[serde(default)]
    pub debug: bool,
    /// Suppress all log output.
    #[serde(default)]
    pub quiet: bool,
    /// Payload mapping style.
    #[serde(default)]
    pub mapping: MappingStyle,
    /// Free-form variables.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl ComponentConfig {
    /// Configuration with defaults for everything but identity.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform_version: String::new(),
            debug: false,
            quiet: false,
            mapping: MappingStyle::default(),
            variables: BTreeMap::new(),
        }
    }

    /// Set the platform version reported to handlers.
    pub fn with_platform_version(mut self, version: impl Into<String>) -> Self {
        self.platform_version = version.into();
        self
    }

    /// Enable debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Silence all log output. Takes precedence over `debug`.
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the payload mapping style.
    pub fn with_mapping(mut self, mapping: MappingStyle) -> Self {
        self.mapping = mapping;
        self
    }

    /// Add a config variable, replacing any previous value of `name`.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RELAY_SERVICE_NAME` (required)
    /// - `RELAY_SERVICE_VERSION` (required)
    /// - `RELAY_PLATFORM_VERSION` (default: empty)
    /// - `RELAY_DEBUG`, `RELAY_QUIET` (default: false)
    /// - `RELAY_MAPPING`, `compact` or `extended` (default: `compact`)
    /// - `RELAY_VAR_<NAME>`, one variable each
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`from_env`](Self::from_env), over an explicit variable set.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let required = |var: &'static str| {
            vars.get(var)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or(ConfigError::Missing(var))
        };
        let flag = |var: &'static str| vars.get(var).map_or(Ok(false), |v| parse_bool(var, v));

        let mut config = Self::new(
            required("RELAY_SERVICE_NAME")?,
            required("RELAY_SERVICE_VERSION")?,
        )
        .with_debug(flag("RELAY_DEBUG")?)
        .with_quiet(flag("RELAY_QUIET")?);

        if let Some(version) = vars.get("RELAY_PLATFORM_VERSION") {
            config.platform_version = version.clone();
        }
        if let Some(mapping) = vars.get("RELAY_MAPPING") {
            config.mapping = mapping.parse()?;
        }
        config.variables = vars
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(VAR_PREFIX)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.to_string(), v.clone()))
            })
            .collect();

        Ok(config)
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid boolean for {var}: {value}")]
    InvalidFlag { var: String, value: String },
    #[error("invalid mapping style: {0}")]
    InvalidMapping(String),
}
