//! Configuration for the ZamDash tools.
//!
//! TOML settings with `ZAMDASH_*` environment overrides, credential
//! validation, and translation into the api transport config, the core
//! engine thresholds, and the display name table.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use zamdash_api::{TicketApi, TlsMode, TransportConfig};
use zamdash_core::{EngineConfig, NameTable};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured (set username/password or ZAMDASH_USERNAME/ZAMDASH_PASSWORD)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Top-level settings, loaded once at process start.
#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Zammad instance root URL (e.g. "https://helpdesk.example.com").
    pub url: Option<String>,

    /// Agent login for basic auth.
    pub username: Option<String>,

    /// Agent password (plaintext in the file -- prefer the env var).
    pub password: Option<String>,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Classification and caching thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Display-name overrides keyed by priority id.
    #[serde(default)]
    pub priority_names: HashMap<String, String>,

    /// Display-name overrides keyed by state id.
    #[serde(default)]
    pub state_names: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
            thresholds: Thresholds::default(),
            priority_names: HashMap::new(),
            state_names: HashMap::new(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Engine thresholds as they appear in the config file. Defaults match
/// `EngineConfig::default()`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Thresholds {
    #[serde(default = "default_sla_warning_minutes")]
    pub sla_warning_minutes: i64,

    #[serde(default = "default_p1_priority_id")]
    pub p1_priority_id: u32,

    #[serde(default = "default_closed_state_id")]
    pub closed_state_id: u32,

    #[serde(default = "default_hold_state_ids")]
    pub hold_state_ids: Vec<u32>,

    #[serde(default = "default_open_states")]
    pub open_states: Vec<String>,

    #[serde(default = "default_aged_after_hours")]
    pub aged_after_hours: i64,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sla_warning_minutes: default_sla_warning_minutes(),
            p1_priority_id: default_p1_priority_id(),
            closed_state_id: default_closed_state_id(),
            hold_state_ids: default_hold_state_ids(),
            open_states: default_open_states(),
            aged_after_hours: default_aged_after_hours(),
            search_limit: default_search_limit(),
            fetch_timeout: default_fetch_timeout(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

fn default_sla_warning_minutes() -> i64 {
    60
}
fn default_p1_priority_id() -> u32 {
    1
}
fn default_closed_state_id() -> u32 {
    4
}
fn default_hold_state_ids() -> Vec<u32> {
    vec![3, 6, 7]
}
fn default_open_states() -> Vec<String> {
    vec!["new".into(), "open".into(), "pending".into()]
}
fn default_aged_after_hours() -> i64 {
    48
}
fn default_search_limit() -> usize {
    1000
}
fn default_fetch_timeout() -> u64 {
    15
}
fn default_cache_ttl() -> u64 {
    30
}

// ── Loading ─────────────────────────────────────────────────────────

/// Default config file path: `{config_dir}/zamdash/zamdash.toml`.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "zamdash")
        .map(|dirs| dirs.config_dir().join("zamdash.toml"))
        .unwrap_or_else(|| PathBuf::from("zamdash.toml"))
}

/// Load settings from defaults, the given TOML file (if it exists), and
/// `ZAMDASH_*` environment variables, in increasing precedence.
pub fn load(path: &std::path::Path) -> Result<Settings, ConfigError> {
    let settings = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZAMDASH_").split("__"))
        .extract()?;
    Ok(settings)
}

/// Serialize settings to TOML and write them to `path`, creating parent
/// directories as needed.
pub fn save(settings: &Settings, path: &std::path::Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Settings {
    /// Validated instance URL.
    pub fn instance_url(&self) -> Result<Url, ConfigError> {
        let raw = self.url.as_deref().ok_or_else(|| ConfigError::Validation {
            field: "url".into(),
            reason: "no instance URL configured".into(),
        })?;
        raw.parse().map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: format!("{e}: {raw}"),
        })
    }

    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> TransportConfig {
        let tls = if let Some(ref path) = self.ca_cert {
            TlsMode::CustomCa(path.clone())
        } else if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Build the authenticated API client.
    pub fn build_api(&self) -> Result<TicketApi, ConfigError> {
        let url = self.instance_url()?;
        let (Some(username), Some(password)) = (self.username.clone(), self.password.clone())
        else {
            return Err(ConfigError::NoCredentials);
        };
        TicketApi::new(url, username, SecretString::from(password), &self.transport()).map_err(
            |e| ConfigError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
        )
    }

    /// Engine thresholds.
    pub fn engine_config(&self) -> EngineConfig {
        let t = &self.thresholds;
        EngineConfig {
            sla_warning_threshold: chrono_minutes(t.sla_warning_minutes),
            p1_priority_id: t.p1_priority_id,
            closed_state_id: t.closed_state_id,
            hold_state_ids: t.hold_state_ids.clone(),
            open_states: t.open_states.clone(),
            aged_after: chrono_hours(t.aged_after_hours),
            search_limit: t.search_limit,
            fetch_timeout: Duration::from_secs(t.fetch_timeout),
            cache_ttl: Duration::from_secs(t.cache_ttl),
        }
    }

    /// Display name table: built-in defaults plus configured overrides.
    pub fn name_table(&self) -> Result<NameTable, ConfigError> {
        let priorities = parse_id_names(&self.priority_names, "priority_names")?;
        let states = parse_id_names(&self.state_names, "state_names")?;
        Ok(NameTable::default().with_overrides(priorities, states))
    }
}

fn parse_id_names(
    raw: &HashMap<String, String>,
    field: &str,
) -> Result<HashMap<u32, String>, ConfigError> {
    raw.iter()
        .map(|(k, v)| {
            let id = k.parse::<u32>().map_err(|_| ConfigError::Validation {
                field: field.into(),
                reason: format!("'{k}' is not a numeric id"),
            })?;
            Ok((id, v.clone()))
        })
        .collect()
}

// TOML-facing durations stay integral; chrono handles the conversion.
fn chrono_minutes(minutes: i64) -> chrono::Duration {
    chrono::Duration::minutes(minutes)
}

fn chrono_hours(hours: i64) -> chrono::Duration {
    chrono::Duration::hours(hours)
}
