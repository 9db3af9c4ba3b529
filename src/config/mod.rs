//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides};

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::notify::DEFAULT_EMAIL_SENDER;
use crate::infra::notify::DEFAULT_LINE_PUSH_ENDPOINT;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "postboard";
const ENV_PREFIX: &str = "POSTBOARD";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Outbound notification channels. A channel is `None` unless explicitly enabled.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub timeout: Duration,
    pub email: Option<EmailSettings>,
    pub line: Option<LineSettings>,
}

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub sender: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LineSettings {
    pub endpoint: String,
    pub channel_token: String,
    pub to: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("notifications.email.recipients"),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    notifications: RawNotificationSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(seconds) = overrides.notify_timeout_seconds {
            self.notifications.timeout_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            notifications,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            notifications: build_notification_settings(notifications)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_notification_settings(
    notifications: RawNotificationSettings,
) -> Result<NotificationSettings, LoadError> {
    let timeout_seconds = notifications
        .timeout_seconds
        .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "notifications.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(NotificationSettings {
        timeout: Duration::from_secs(timeout_seconds),
        email: build_email_settings(notifications.email)?,
        line: build_line_settings(notifications.line)?,
    })
}

fn build_email_settings(email: RawEmailSettings) -> Result<Option<EmailSettings>, LoadError> {
    if !email.enabled.unwrap_or(false) {
        return Ok(None);
    }

    let endpoint = non_empty(email.endpoint).ok_or_else(|| {
        LoadError::invalid(
            "notifications.email.endpoint",
            "required when email notifications are enabled",
        )
    })?;
    validate_http_url(&endpoint, "notifications.email.endpoint")?;

    let sender = non_empty(email.sender).unwrap_or_else(|| DEFAULT_EMAIL_SENDER.to_string());
    let recipients: Vec<String> = email
        .recipients
        .unwrap_or_default()
        .into_iter()
        .filter_map(|recipient| non_empty(Some(recipient)))
        .collect();
    if recipients.is_empty() {
        return Err(LoadError::invalid(
            "notifications.email.recipients",
            "at least one recipient is required when email notifications are enabled",
        ));
    }

    Ok(Some(EmailSettings {
        endpoint,
        api_token: non_empty(email.api_token),
        sender,
        recipients,
    }))
}

fn build_line_settings(line: RawLineSettings) -> Result<Option<LineSettings>, LoadError> {
    if !line.enabled.unwrap_or(false) {
        return Ok(None);
    }

    let endpoint =
        non_empty(line.endpoint).unwrap_or_else(|| DEFAULT_LINE_PUSH_ENDPOINT.to_string());
    validate_http_url(&endpoint, "notifications.line.endpoint")?;

    let channel_token = non_empty(line.channel_token).ok_or_else(|| {
        LoadError::invalid(
            "notifications.line.channel_token",
            "required when LINE notifications are enabled",
        )
    })?;
    let to = non_empty(line.to).ok_or_else(|| {
        LoadError::invalid(
            "notifications.line.to",
            "required when LINE notifications are enabled",
        )
    })?;

    Ok(Some(LineSettings {
        endpoint,
        channel_token,
        to,
    }))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawNotificationSettings {
    timeout_seconds: Option<u64>,
    email: RawEmailSettings,
    line: RawLineSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEmailSettings {
    enabled: Option<bool>,
    endpoint: Option<String>,
    api_token: Option<String>,
    sender: Option<String>,
    recipients: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLineSettings {
    enabled: Option<bool>,
    endpoint: Option<String>,
    channel_token: Option<String>,
    to: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn validate_http_url(value: &str, key: &'static str) -> Result<(), LoadError> {
    let url = reqwest::Url::parse(value)
        .map_err(|err| LoadError::invalid(key, format!("invalid url `{value}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(LoadError::invalid(
            key,
            format!("unsupported url scheme `{other}`"),
        )),
    }
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
