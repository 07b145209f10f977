use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MIXPANEL_BASE_URL: &str = "http://mixpanel.com/api";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub slack: SlackConfig,
    pub mixpanel: MixpanelConfig,
    pub timezone: Tz,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub auth_users: BTreeSet<String>,
    pub token: SecretString,
    pub post_to_channel: bool,
}

#[derive(Clone, Debug)]
pub struct MixpanelConfig {
    pub api_key: SecretString,
    pub api_secret: SecretString,
    pub base_url: String,
    pub connect_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub slack_token: Option<String>,
    pub slack_auth_users: Option<Vec<String>>,
    pub post_to_channel: Option<bool>,
    pub mixpanel_key: Option<String>,
    pub mixpanel_secret: Option<String>,
    pub mixpanel_base_url: Option<String>,
    pub timezone: Option<Tz>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
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
    #[error("unknown timezone `{0}` (expected an IANA name such as `Europe/Vienna`)")]
    UnknownTimezone(String),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack: SlackConfig {
                auth_users: BTreeSet::new(),
                token: String::new().into(),
                post_to_channel: false,
            },
            mixpanel: MixpanelConfig {
                api_key: String::new().into(),
                api_secret: String::new().into(),
                base_url: DEFAULT_MIXPANEL_BASE_URL.to_string(),
                connect_timeout_secs: 2,
            },
            timezone: Tz::UTC,
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("slackpanel.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(timezone) = patch.timezone {
            self.timezone = parse_timezone(&timezone)?;
        }

        if let Some(slack) = patch.slack {
            if let Some(auth_users) = slack.auth_users {
                self.slack.auth_users = normalize_users(auth_users);
            }
            if let Some(slack_token_value) = slack.token {
                self.slack.token = secret_value(slack_token_value);
            }
            if let Some(post_to_channel) = slack.post_to_channel {
                self.slack.post_to_channel = post_to_channel.enabled();
            }
        }

        if let Some(mixpanel) = patch.mixpanel {
            if let Some(mixpanel_key_value) = mixpanel.key {
                self.mixpanel.api_key = secret_value(mixpanel_key_value);
            }
            if let Some(mixpanel_secret_value) = mixpanel.secret {
                self.mixpanel.api_secret = secret_value(mixpanel_secret_value);
            }
            if let Some(base_url) = mixpanel.base_url {
                self.mixpanel.base_url = base_url;
            }
            if let Some(connect_timeout_secs) = mixpanel.connect_timeout_secs {
                self.mixpanel.connect_timeout_secs = connect_timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SLACKPANEL_SLACK_TOKEN") {
            self.slack.token = secret_value(value);
        }
        if let Some(value) = read_env("SLACKPANEL_SLACK_AUTH_USERS") {
            self.slack.auth_users =
                normalize_users(value.split(',').map(str::to_string).collect::<Vec<_>>());
        }
        if let Some(value) = read_env("SLACKPANEL_SLACK_POST_TO_CHANNEL") {
            self.slack.post_to_channel = parse_flag("SLACKPANEL_SLACK_POST_TO_CHANNEL", &value)?;
        }

        if let Some(value) = read_env("SLACKPANEL_MIXPANEL_KEY") {
            self.mixpanel.api_key = secret_value(value);
        }
        if let Some(value) = read_env("SLACKPANEL_MIXPANEL_SECRET") {
            self.mixpanel.api_secret = secret_value(value);
        }
        if let Some(value) = read_env("SLACKPANEL_MIXPANEL_BASE_URL") {
            self.mixpanel.base_url = value;
        }
        if let Some(value) = read_env("SLACKPANEL_MIXPANEL_CONNECT_TIMEOUT_SECS") {
            self.mixpanel.connect_timeout_secs =
                parse_u64("SLACKPANEL_MIXPANEL_CONNECT_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SLACKPANEL_TIMEZONE") {
            self.timezone = parse_timezone(&value)?;
        }

        if let Some(value) = read_env("SLACKPANEL_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SLACKPANEL_SERVER_PORT") {
            self.server.port = parse_u16("SLACKPANEL_SERVER_PORT", &value)?;
        }

        let log_level =
            read_env("SLACKPANEL_LOGGING_LEVEL").or_else(|| read_env("SLACKPANEL_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SLACKPANEL_LOGGING_FORMAT").or_else(|| read_env("SLACKPANEL_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(slack_token) = overrides.slack_token {
            self.slack.token = secret_value(slack_token);
        }
        if let Some(auth_users) = overrides.slack_auth_users {
            self.slack.auth_users = normalize_users(auth_users);
        }
        if let Some(post_to_channel) = overrides.post_to_channel {
            self.slack.post_to_channel = post_to_channel;
        }
        if let Some(mixpanel_key) = overrides.mixpanel_key {
            self.mixpanel.api_key = secret_value(mixpanel_key);
        }
        if let Some(mixpanel_secret) = overrides.mixpanel_secret {
            self.mixpanel.api_secret = secret_value(mixpanel_secret);
        }
        if let Some(base_url) = overrides.mixpanel_base_url {
            self.mixpanel.base_url = base_url;
        }
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_slack(&self.slack)?;
        validate_mixpanel(&self.mixpanel)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("slackpanel.toml"), PathBuf::from("config/slackpanel.toml")]
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

fn validate_slack(slack: &SlackConfig) -> Result<(), ConfigError> {
    if slack.token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "slack.token is required. Copy the verification token from your slash command settings at https://api.slack.com/apps".to_string(),
        ));
    }

    if slack.auth_users.is_empty() {
        return Err(ConfigError::Validation(
            "slack.auth_users must list at least one Slack user id (for example `U024BE7LH`)"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_mixpanel(mixpanel: &MixpanelConfig) -> Result<(), ConfigError> {
    if mixpanel.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation("mixpanel.key is required".to_string()));
    }
    if mixpanel.api_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation("mixpanel.secret is required".to_string()));
    }

    let base_url = mixpanel.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "mixpanel.base_url must start with http:// or https://".to_string(),
        ));
    }

    if mixpanel.connect_timeout_secs == 0 || mixpanel.connect_timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "mixpanel.connect_timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
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

fn normalize_users(users: Vec<String>) -> BTreeSet<String> {
    users
        .into_iter()
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty())
        .collect()
}

pub fn parse_timezone(value: &str) -> Result<Tz, ConfigError> {
    value.trim().parse::<Tz>().map_err(|_| ConfigError::UnknownTimezone(value.to_string()))
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }),
    }
}

/// `post_to_channel` is written as `0`/`1` in legacy configs and as a bool in newer ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
}

impl FlagValue {
    fn enabled(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value == 1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    timezone: Option<String>,
    slack: Option<SlackPatch>,
    mixpanel: Option<MixpanelPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    auth_users: Option<Vec<String>>,
    token: Option<String>,
    post_to_channel: Option<FlagValue>,
}

#[derive(Debug, Default, Deserialize)]
struct MixpanelPatch {
    key: Option<String>,
    secret: Option<String>,
    base_url: Option<String>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use chrono_tz::Tz;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const REQUIRED_VARS: [&str; 4] = [
        "SLACKPANEL_SLACK_TOKEN",
        "SLACKPANEL_SLACK_AUTH_USERS",
        "SLACKPANEL_MIXPANEL_KEY",
        "SLACKPANEL_MIXPANEL_SECRET",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn set_required_vars() {
        env::set_var("SLACKPANEL_SLACK_TOKEN", "token-from-env");
        env::set_var("SLACKPANEL_SLACK_AUTH_USERS", "U1, U2,,");
        env::set_var("SLACKPANEL_MIXPANEL_KEY", "key-from-env");
        env::set_var("SLACKPANEL_MIXPANEL_SECRET", "secret-from-env");
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> Result<std::path::PathBuf, String> {
        let path = dir.path().join("slackpanel.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn file_load_supports_env_interpolation_and_legacy_flags() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SLACK_COMMAND_TOKEN", "token-from-interpolation");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
timezone = "Europe/Vienna"

[slack]
auth_users = ["U1", " U2 "]
token = "${TEST_SLACK_COMMAND_TOKEN}"
post_to_channel = 1

[mixpanel]
key = "file-key"
secret = "file-secret"
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.slack.token.expose_secret() == "token-from-interpolation",
                "token should be interpolated from environment",
            )?;
            ensure(config.slack.post_to_channel, "post_to_channel = 1 should enable channel posts")?;
            ensure(config.slack.auth_users.contains("U2"), "auth users should be trimmed")?;
            ensure(config.timezone == Tz::Europe__Vienna, "timezone should be parsed")?;
            ensure(
                config.mixpanel.base_url == "http://mixpanel.com/api",
                "base url should keep its default",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_SLACK_COMMAND_TOKEN"]);
        result
    }

    #[test]
    fn boolean_post_to_channel_is_accepted() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        set_required_vars();

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(&dir, "[slack]\npost_to_channel = false\n")?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;
            ensure(!config.slack.post_to_channel, "false should keep replies ephemeral")
        })();

        clear_vars(&REQUIRED_VARS);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_required_vars();
        env::set_var("SLACKPANEL_LOG_LEVEL", "warn");
        env::set_var("SLACKPANEL_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            ensure(config.slack.auth_users.len() == 2, "comma separated users should be split")?;
            Ok(())
        })();

        clear_vars(&REQUIRED_VARS);
        clear_vars(&["SLACKPANEL_LOG_LEVEL", "SLACKPANEL_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_required_vars();
        env::set_var("SLACKPANEL_TIMEZONE", "America/New_York");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
timezone = "Europe/Vienna"

[slack]
token = "token-from-file"

[mixpanel]
base_url = "https://eu.mixpanel.com/api"

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    slack_auth_users: Some(vec!["U9".to_string()]),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.slack.token.expose_secret() == "token-from-env",
                "env token should win over file and defaults",
            )?;
            ensure(config.timezone == Tz::America__New_York, "env timezone should win over file")?;
            ensure(
                config.mixpanel.base_url == "https://eu.mixpanel.com/api",
                "file base url should win over default",
            )?;
            ensure(
                config.slack.auth_users.len() == 1 && config.slack.auth_users.contains("U9"),
                "override users should replace env users",
            )?;
            Ok(())
        })();

        clear_vars(&REQUIRED_VARS);
        clear_vars(&["SLACKPANEL_TIMEZONE"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLACKPANEL_MIXPANEL_KEY", "key");
        env::set_var("SLACKPANEL_MIXPANEL_SECRET", "secret");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("slack.token")
            );
            ensure(has_message, "validation failure should mention slack.token")
        })();

        clear_vars(&REQUIRED_VARS);
        result
    }

    #[test]
    fn unknown_timezone_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_required_vars();
        env::set_var("SLACKPANEL_TIMEZONE", "Mars/Olympus_Mons");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::UnknownTimezone(name)) => {
                ensure(name == "Mars/Olympus_Mons", "error should name the timezone")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("unknown timezone should fail to load".to_string()),
        };

        clear_vars(&REQUIRED_VARS);
        clear_vars(&["SLACKPANEL_TIMEZONE"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_required_vars();

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("token-from-env"), "debug output should not contain token")?;
            ensure(!debug.contains("secret-from-env"), "debug output should not contain secret")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&REQUIRED_VARS);
        result
    }
}
