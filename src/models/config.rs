//! Connection settings for the distribution service.
//!
//! Two knobs only: the API version (which selects the base URL) and an
//! optional token. The token falls back to the `ONEDIST_TOKEN` environment
//! variable when not given explicitly.

use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Origin of the hosted distribution service.
pub const DEFAULT_API_ORIGIN: &str = "https://onedist.io";

/// API version used when none is requested.
pub const DEFAULT_VERSION: &str = "v0";

/// Environment variable consulted for a token when none is passed.
pub const TOKEN_ENV_VAR: &str = "ONEDIST_TOKEN";

/// Resolved, read-only connection settings.
///
/// Build with [`Settings::resolve`] (or [`Settings::default`]), or construct
/// the struct directly to point at another deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL every request path is appended to, e.g. `https://onedist.io/s/api/v0`
    pub base_url: String,

    /// Token sent as `Authorization: Token <token>`; `None` sends no header
    pub token: Option<String>,
}

impl Settings {
    /// Resolve settings from an optional explicit token and an API version.
    ///
    /// A missing or empty token falls back to [`TOKEN_ENV_VAR`]; if that is
    /// unset or empty too, requests go out unauthenticated.
    pub fn resolve(token: Option<String>, version: &str) -> Self {
        Self::resolve_with_env(token, version, std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Same as [`Settings::resolve`] with the environment value supplied by the caller.
    pub fn resolve_with_env(token: Option<String>, version: &str, env_token: Option<String>) -> Self {
        let token = non_empty(token).or_else(|| non_empty(env_token));
        Self {
            base_url: base_url_for(version),
            token,
        }
    }

    /// Whether requests made with these settings carry an `Authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(None, DEFAULT_VERSION)
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Base URL for an API version on the hosted service.
pub fn base_url_for(version: &str) -> String {
    format!("{DEFAULT_API_ORIGIN}/s/api/{version}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// On-disk configuration, used by the CLI.
///
/// ```toml
/// token = "${ONEDIST_TOKEN}"
/// version = "v0"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Token; `${VAR}` placeholders are expanded from the environment
    #[serde(default)]
    pub token: Option<String>,

    /// API version (default: "v0")
    #[serde(default)]
    pub version: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Turn the file contents into settings, with an optional token override.
    ///
    /// Precedence: `token_override`, then the file's token, then the environment.
    /// A file token whose `${VAR}` placeholder could not be expanded counts as
    /// absent, so it is never sent as a literal.
    pub fn into_settings(self, token_override: Option<String>) -> Settings {
        let token = non_empty(token_override).or_else(|| self.file_token());
        let version = self.version.as_deref().unwrap_or(DEFAULT_VERSION);
        Settings::resolve(token, version)
    }

    fn file_token(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(expand_env_vars)
            .filter(|t| !ENV_PLACEHOLDER.is_match(t))
    }
}

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(s, |cap: &regex::Captures<'_>| {
            std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
        })
        .into_owned()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
