//! Process-wide logging bootstrap.
//!
//! Settings are resolved from three layers (built-in defaults, the
//! `[logging]` table of `preswald.toml`, an explicit level) and then
//! installed into a forwarding logger. The forwarding logger is registered
//! with the `log` facade once; every later call swaps the `env_logger`
//! instance behind it, so reconfiguring replaces the previous settings
//! instead of stacking another output on top of them.
//!
//! Line formats use `%(field)s` placeholders:
//!
//! ```text
//! %(asctime)s - %(name)s - %(levelname)-8s - %(message)s
//! ```
//!
//! Known fields are `asctime`, `name`, `levelname`, `levelno`, `message`,
//! `module`, `filename`, `lineno` and `process`. `%%` is a literal percent
//! sign. Unknown placeholders are printed as written.

use env_logger::{Target, WriteStyle};
use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record, debug, warn};
use regex::Regex;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::sync::{OnceLock, RwLock};
use time::{OffsetDateTime, UtcOffset};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::config::{ConfigError, DEFAULT_CONFIG_FILE, PreswaldConfig, error_chain};

pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_LOG_FORMAT: &str = "%(asctime)s - %(name)s - %(levelname)s - %(message)s";

const ASCTIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second],[subsecond digits:3]");

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"%%|%\((?P<field>\w+)\)(?P<align>-?)(?P<width>\d*)[sd]").expect("placeholder pattern is valid");
}

static LOGGER: ReloadableLogger = ReloadableLogger {
    inner: RwLock::new(None),
};
static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Fully resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Severity name, e.g. `INFO` or `debug`.
    pub level: String,
    /// Line template using `%(field)s` placeholders.
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

/// Keys accepted from the `[logging]` table.
#[derive(Debug, Default, Deserialize)]
struct LoggingOverrides {
    level: Option<String>,
    format: Option<String>,
}

impl LogConfig {
    /// Shallow-merge the `[logging]` table of `config` over these settings.
    ///
    /// Nothing is changed if the table is malformed.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidType`] if `logging` is not a table of
    /// string settings.
    pub fn merge_from(&mut self, config: &PreswaldConfig) -> Result<(), ConfigError> {
        let Some(section) = config.section("logging") else {
            return Ok(());
        };
        let overrides: LoggingOverrides = toml::Value::Table(section.clone())
            .try_into()
            .map_err(|_| ConfigError::InvalidType {
                key: "logging",
                expected: "a table with string `level` and `format` keys",
            })?;

        if let Some(level) = overrides.level {
            self.level = level;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        Ok(())
    }
}

/// Resolve the logging settings without installing them.
///
/// `config_path` defaults to `preswald.toml` in the working directory.
/// Problems with the file are logged and leave the defaults in place;
/// `level`, when given, always wins.
pub fn resolve_log_config(config_path: Option<&Path>, level: Option<&str>) -> LogConfig {
    let (log_config, load_warning) = resolve_deferring_warning(config_path, level);
    if let Some(message) = load_warning {
        warn!("{message}");
    }
    log_config
}

/// Same as [`resolve_log_config`], but hands back the load warning instead
/// of logging it, for callers that have no logger installed yet.
fn resolve_deferring_warning(config_path: Option<&Path>, level: Option<&str>) -> (LogConfig, Option<String>) {
    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let mut log_config = LogConfig::default();
    let mut load_warning = None;

    if path.exists()
        && let Err(e) = PreswaldConfig::load(path).and_then(|config| log_config.merge_from(&config))
    {
        load_warning = Some(format!(
            "Could not load logging config from '{}': {}",
            path.display(),
            error_chain(&e)
        ));
    }

    if let Some(level) = level {
        log_config.level = level.to_string();
    }
    (log_config, load_warning)
}

/// Configure logging for the whole process and return the resolved level.
///
/// Safe to call repeatedly; the last call wins.
///
/// # Errors
/// Returns [`ConfigError::UnknownLevel`] for an unrecognized severity name
/// and [`ConfigError::LoggerAlreadySet`] if something else already owns
/// the `log` facade.
pub fn configure_logging(config_path: Option<&Path>, level: Option<&str>) -> Result<String, ConfigError> {
    configure_with_target(config_path, level, Target::Stderr)
}

fn configure_with_target(
    config_path: Option<&Path>,
    level: Option<&str>,
    target: Target,
) -> Result<String, ConfigError> {
    let (log_config, load_warning) = resolve_deferring_warning(config_path, level);
    apply_with_target(&log_config, target)?;
    // reported only now so the first call at startup does not lose it
    if let Some(message) = load_warning {
        warn!("{message}");
    }
    debug!("Logging configured with level {}", log_config.level);
    Ok(log_config.level)
}

/// Install `config` as the active logging setup, replacing any previous one.
///
/// # Errors
/// See [`configure_logging`].
pub fn apply_log_config(config: &LogConfig) -> Result<(), ConfigError> {
    apply_with_target(config, Target::Stderr)
}

fn apply_with_target(config: &LogConfig, target: Target) -> Result<(), ConfigError> {
    let level = parse_level(&config.level)?;
    let template = LogTemplate::parse(&config.format);
    // the local offset is only readable while the process is single-threaded
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let logger = env_logger::Builder::new()
        .filter_level(level)
        .target(target)
        .write_style(WriteStyle::Never)
        .format(move |buf, record| writeln!(buf, "{}", template.render(record, offset)))
        .build();

    if !*INSTALLED.get_or_init(|| log::set_logger(&LOGGER).is_ok()) {
        return Err(ConfigError::LoggerAlreadySet);
    }
    LOGGER.replace(logger);
    log::set_max_level(level);
    Ok(())
}

/// Map a standard severity name onto a `log` filter, ignoring case.
///
/// `TRACE` is accepted alongside the usual names. Surrounding whitespace
/// is not stripped.
///
/// # Errors
/// Returns [`ConfigError::UnknownLevel`] for anything unrecognized.
pub fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.to_ascii_uppercase().as_str() {
        "NOTSET" | "TRACE" => Ok(LevelFilter::Trace),
        "DEBUG" => Ok(LevelFilter::Debug),
        "INFO" => Ok(LevelFilter::Info),
        "WARN" | "WARNING" => Ok(LevelFilter::Warn),
        "ERROR" | "CRITICAL" | "FATAL" => Ok(LevelFilter::Error),
        _ => Err(ConfigError::UnknownLevel(level.to_string())),
    }
}

/// `log` facade entry point whose backing `env_logger` can be swapped.
struct ReloadableLogger {
    inner: RwLock<Option<env_logger::Logger>>,
}

impl ReloadableLogger {
    fn replace(&self, logger: env_logger::Logger) {
        let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(logger);
    }
}

impl Log for ReloadableLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner
            .read()
            .is_ok_and(|guard| guard.as_ref().is_some_and(|logger| logger.enabled(metadata)))
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(guard) = self.inner.read()
            && let Some(logger) = guard.as_ref()
        {
            logger.log(record);
        }
    }

    fn flush(&self) {
        if let Ok(guard) = self.inner.read()
            && let Some(logger) = guard.as_ref()
        {
            logger.flush();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AscTime,
    Name,
    LevelName,
    LevelNo,
    Message,
    Module,
    FileName,
    LineNo,
    Process,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "asctime" => Self::AscTime,
            "name" => Self::Name,
            "levelname" => Self::LevelName,
            "levelno" => Self::LevelNo,
            "message" => Self::Message,
            "module" => Self::Module,
            "filename" => Self::FileName,
            "lineno" => Self::LineNo,
            "process" => Self::Process,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { field: Field, left_align: bool, width: usize },
}

/// A parsed line template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTemplate {
    segments: Vec<Segment>,
}

impl LogTemplate {
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            literal.push_str(&template[last..whole.start()]);
            last = whole.end();

            let Some(field) = caps.name("field") else {
                literal.push('%');
                continue;
            };
            let Some(field) = Field::from_name(field.as_str()) else {
                literal.push_str(whole.as_str());
                continue;
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field {
                field,
                left_align: caps.name("align").is_some_and(|m| !m.as_str().is_empty()),
                width: caps.name("width").and_then(|m| m.as_str().parse().ok()).unwrap_or(0),
            });
        }

        literal.push_str(&template[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { segments }
    }

    /// Render `record`, stamping it with the current time at `offset` if needed.
    pub fn render(&self, record: &Record<'_>, offset: UtcOffset) -> String {
        let asctime = if self.uses(Field::AscTime) {
            format_asctime(now_at(offset))
        } else {
            String::new()
        };
        self.render_with_asctime(record, &asctime)
    }

    fn uses(&self, wanted: Field) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field { field, .. } if *field == wanted))
    }

    fn render_with_asctime(&self, record: &Record<'_>, asctime: &str) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field {
                    field,
                    left_align,
                    width,
                } => {
                    let value = field_value(*field, record, asctime);
                    let width = *width;
                    let padded = if *left_align {
                        format!("{value:<width$}")
                    } else {
                        format!("{value:>width$}")
                    };
                    line.push_str(&padded);
                },
            }
        }
        line
    }
}

fn field_value(field: Field, record: &Record<'_>, asctime: &str) -> String {
    match field {
        Field::AscTime => asctime.to_string(),
        Field::Name => record.target().to_string(),
        Field::LevelName => level_name(record.level()).to_string(),
        Field::LevelNo => level_number(record.level()).to_string(),
        Field::Message => record.args().to_string(),
        Field::Module => record
            .module_path()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or_default()
            .to_string(),
        Field::FileName => record
            .file()
            .and_then(|file| Path::new(file).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        Field::LineNo => record.line().map(|line| line.to_string()).unwrap_or_default(),
        Field::Process => std::process::id().to_string(),
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn level_number(level: Level) -> u8 {
    match level {
        Level::Error => 40,
        Level::Warn => 30,
        Level::Info => 20,
        Level::Debug => 10,
        Level::Trace => 5,
    }
}

fn now_at(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}

fn format_asctime(at: OffsetDateTime) -> String {
    at.format(ASCTIME_FORMAT).unwrap_or_default()
}
