//! Runtime configuration.
//!
//! Configuration is resolved once, when a [`Registry`](crate::Registry) or a
//! root [`Scope`](crate::Scope) is created, and shared by every scope of that
//! tree. Values can come from code, from environment variables through
//! [`EnvironmentConfigSource`], or from JSON with the `config` feature.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{RtError, RtResult};

/// Default number of watcher passes a scope may run in one digest.
pub const DEFAULT_DIGEST_TTL: usize = 10;

/// How string expression failures are reported by `Scope::eval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum EvalMode {
    /// Failures evaluate to `Value::Undefined`
    #[default]
    Lenient,
    /// Failures are returned as `RtError::Eval`
    Strict,
}

impl FromStr for EvalMode {
    type Err = RtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(EvalMode::Lenient),
            "strict" => Ok(EvalMode::Strict),
            other => Err(RtError::Config(format!("unknown eval mode: {}", other))),
        }
    }
}

impl fmt::Display for EvalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalMode::Lenient => f.write_str("lenient"),
            EvalMode::Strict => f.write_str("strict"),
        }
    }
}

/// Settings shared by a scope tree.
///
/// # Examples
///
/// ```rust
/// use nglite::{RuntimeConfig, EvalMode, MapConfigSource};
///
/// let source = MapConfigSource::new()
///     .with("DIGEST_TTL", "25")
///     .with("EVAL_MODE", "strict");
/// let config = RuntimeConfig::from_source(&source).unwrap();
/// assert_eq!(config.digest_ttl, 25);
/// assert_eq!(config.eval_mode, EvalMode::Strict);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RuntimeConfig {
    /// Maximum watcher passes per scope in one digest; `0` means unbounded
    pub digest_ttl: usize,
    /// Reporting of string expression failures
    pub eval_mode: EvalMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            digest_ttl: DEFAULT_DIGEST_TTL,
            eval_mode: EvalMode::Lenient,
        }
    }
}

impl RuntimeConfig {
    pub fn with_digest_ttl(mut self, ttl: usize) -> Self {
        self.digest_ttl = ttl;
        self
    }

    pub fn with_eval_mode(mut self, mode: EvalMode) -> Self {
        self.eval_mode = mode;
        self
    }

    /// Builds a config from a source, keeping defaults for absent keys.
    pub fn from_source(source: &dyn ConfigSource) -> RtResult<Self> {
        let mut config = Self::default();
        if let Some(ttl) = source.get("DIGEST_TTL") {
            config.digest_ttl = ttl
                .trim()
                .parse()
                .map_err(|_| RtError::Config(format!("DIGEST_TTL is not a count: {}", ttl)))?;
        }
        if let Some(mode) = source.get("EVAL_MODE") {
            config.eval_mode = mode.parse()?;
        }
        Ok(config)
    }

    /// Reads `NGL_DIGEST_TTL` and `NGL_EVAL_MODE`.
    pub fn from_env() -> RtResult<Self> {
        Self::from_source(&EnvironmentConfigSource::with_prefix("NGL"))
    }

    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> RtResult<Self> {
        serde_json::from_str(json).map_err(|e| RtError::Config(e.to_string()))
    }
}

/// Trait for configuration sources
pub trait ConfigSource: fmt::Debug {
    /// Get a raw configuration value by key
    fn get(&self, key: &str) -> Option<String>;
}

/// Environment variable configuration source
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    /// Prefix to filter environment variables
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        let env_key = if let Some(prefix) = &self.prefix {
            format!("{}_{}", prefix.to_uppercase(), key.to_uppercase())
        } else {
            key.to_uppercase()
        };
        env::var(env_key).ok()
    }
}

/// In-memory configuration source
#[derive(Debug, Default, Clone)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
