use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Immutable per-deployment settings. Built once at construction time and
/// shared read-only by every invocation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Channel name the response is rendered for (`lex`, `sms`).
    pub channel: String,
    /// Consult the disambiguation collaborator before regular dispatch.
    pub enable_disambiguation: bool,
    /// Convert uncaught pipeline errors into a fallback closing response.
    /// Disabled, `handle_event` still returns the minimal static document
    /// rather than raising (its signature guarantees a document); callers
    /// that want the error itself should use `handle_request`.
    pub auto_handle_exceptions: bool,
    /// Apology text for the fallback response; tried as a catalog key first,
    /// used verbatim when no catalog entry matches.
    pub error_message: Option<String>,
    /// Intent exempt from the exit-transition tracking context.
    pub exit_feedback_intent: String,
    /// Locale used when the inbound event carries none.
    pub locale: String,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: "lex".to_string(),
            enable_disambiguation: false,
            auto_handle_exceptions: true,
            error_message: None,
            exit_feedback_intent: "Common_Exit_Feedback".to_string(),
            locale: "en_US".to_string(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    channel: Option<String>,
    enable_disambiguation: Option<bool>,
    auto_handle_exceptions: Option<bool>,
    error_message: Option<String>,
    exit_feedback_intent: Option<String>,
    locale: Option<String>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl Config {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("parley.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document over the defaults, without touching the
    /// filesystem or environment.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let patch = toml::from_str::<ConfigPatch>(raw).map_err(|source| {
            ConfigError::ParseFile { path: PathBuf::from("<inline>"), source }
        })?;
        let mut config = Self::default();
        config.apply_patch(patch);
        config.validate()?;
        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(channel) = patch.channel {
            self.channel = channel;
        }
        if let Some(enable_disambiguation) = patch.enable_disambiguation {
            self.enable_disambiguation = enable_disambiguation;
        }
        if let Some(auto_handle_exceptions) = patch.auto_handle_exceptions {
            self.auto_handle_exceptions = auto_handle_exceptions;
        }
        if let Some(error_message) = patch.error_message {
            self.error_message = Some(error_message);
        }
        if let Some(exit_feedback_intent) = patch.exit_feedback_intent {
            self.exit_feedback_intent = exit_feedback_intent;
        }
        if let Some(locale) = patch.locale {
            self.locale = locale;
        }
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PARLEY_CHANNEL") {
            self.channel = value;
        }
        if let Some(value) = read_env("PARLEY_ENABLE_DISAMBIGUATION") {
            self.enable_disambiguation = parse_bool("PARLEY_ENABLE_DISAMBIGUATION", &value)?;
        }
        if let Some(value) = read_env("PARLEY_AUTO_HANDLE_EXCEPTIONS") {
            self.auto_handle_exceptions = parse_bool("PARLEY_AUTO_HANDLE_EXCEPTIONS", &value)?;
        }
        if let Some(value) = read_env("PARLEY_ERROR_MESSAGE") {
            self.error_message = Some(value);
        }
        if let Some(value) = read_env("PARLEY_EXIT_FEEDBACK_INTENT") {
            self.exit_feedback_intent = value;
        }
        if let Some(value) = read_env("PARLEY_LOCALE") {
            self.locale = value;
        }
        if let Some(value) = read_env("PARLEY_LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read_env("PARLEY_LOGGING_FORMAT") {
            self.logging.format = value.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.trim().is_empty() {
            return Err(ConfigError::Validation("channel must not be empty".to_string()));
        }
        if self.exit_feedback_intent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "exit_feedback_intent must not be empty".to_string(),
            ));
        }
        if self.locale.trim().is_empty() {
            return Err(ConfigError::Validation("locale must not be empty".to_string()));
        }
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("parley.toml"), PathBuf::from("config/parley.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }),
    }
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}
