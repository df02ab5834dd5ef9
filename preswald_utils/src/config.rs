//! Readers for `preswald.toml`.
//!
//! Two failure styles live here. The port reader is forgiving: problems are
//! logged and the caller's default wins. The slug lookup is strict: any
//! problem is wrapped into a single error and handed back to the caller.

use anyhow::Context;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "preswald.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config from '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config from '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing [{0}] section")]
    MissingSection(&'static str),
    #[error("missing key `{0}`")]
    MissingKey(&'static str),
    #[error("`{key}` should be {expected}")]
    InvalidType { key: &'static str, expected: &'static str },
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
    #[error("another logger is already installed for this process")]
    LoggerAlreadySet,
}

/// A parsed `preswald.toml`.
#[derive(Debug, Clone, Default)]
pub struct PreswaldConfig {
    table: toml::Table,
}

impl PreswaldConfig {
    /// Read and parse the config file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config text that did not come from a file.
    ///
    /// # Errors
    /// Returns the underlying TOML error if `contents` is malformed.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        Ok(Self {
            table: toml::from_str(contents)?,
        })
    }

    /// The named top-level table, if present.
    pub fn section(&self, name: &str) -> Option<&toml::Table> {
        self.table.get(name).and_then(toml::Value::as_table)
    }

    /// `project.port`, if set.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidType`] unless the value is an integer
    /// that fits a TCP port.
    pub fn project_port(&self) -> Result<Option<u16>, ConfigError> {
        let Some(value) = self.section("project").and_then(|project| project.get("port")) else {
            return Ok(None);
        };
        value
            .as_integer()
            .and_then(|port| u16::try_from(port).ok())
            .map(Some)
            .ok_or(ConfigError::InvalidType {
                key: "project.port",
                expected: "an integer between 0 and 65535",
            })
    }

    /// `project.slug`, which must exist.
    ///
    /// # Errors
    /// Returns an error if `[project]` or its `slug` is missing, or the slug
    /// is not a string.
    pub fn project_slug(&self) -> Result<&str, ConfigError> {
        let project = self.section("project").ok_or(ConfigError::MissingSection("project"))?;
        let slug = project.get("slug").ok_or(ConfigError::MissingKey("project.slug"))?;
        slug.as_str().ok_or(ConfigError::InvalidType {
            key: "project.slug",
            expected: "a string",
        })
    }
}

/// Read the server port from `config_path`, falling back to `default_port`.
///
/// A missing file or missing `project.port` yields the default. Read or
/// parse failures, and ports that are not valid integers, are logged and
/// also yield the default.
pub fn read_port(config_path: &Path, default_port: u16) -> u16 {
    if !config_path.exists() {
        return default_port;
    }

    match PreswaldConfig::load(config_path).and_then(|config| config.project_port()) {
        Ok(port) => port.unwrap_or(default_port),
        Err(e) => {
            warn!(
                "Could not load port config from '{}': {}. Using port {default_port}.",
                config_path.display(),
                error_chain(&e)
            );
            default_port
        },
    }
}

/// Read the project slug from `config_path`.
///
/// # Errors
/// Any read, parse or lookup failure, wrapped with the config path.
pub fn get_slug(config_path: &Path) -> anyhow::Result<String> {
    PreswaldConfig::load(config_path)
        .and_then(|config| config.project_slug().map(str::to_string))
        .with_context(|| format!("error reading slug from '{}'", config_path.display()))
}

/// Render an error with its sources, `outer: inner: ...`.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
