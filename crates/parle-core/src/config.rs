//! Configuration management for Parle.
//!
//! Loads configuration from ${PARLE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// Which gateway implementation backs the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Firebase Authentication + Cloud Firestore over REST (default)
    #[default]
    Firebase,
    /// In-process store, nothing survives a restart
    Memory,
}

/// How the vocabulary query delivers results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Initial list plus a full replacement list after every change.
    #[default]
    Live,
    /// Exactly one list.
    Snapshot,
}

impl QueryMode {
    pub fn display_name(self) -> &'static str {
        match self {
            QueryMode::Live => "live",
            QueryMode::Snapshot => "snapshot",
        }
    }
}

/// Firebase project settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub auth_base_url: Option<String>,
    pub token_base_url: Option<String>,
    pub firestore_base_url: Option<String>,
}

impl FirebaseConfig {
    /// Returns the API key: config value first, then `FIREBASE_API_KEY`.
    pub fn effective_api_key(&self) -> Option<String> {
        non_empty(self.api_key.as_deref())
            .map(str::to_string)
            .or_else(|| env_value("FIREBASE_API_KEY"))
    }

    /// Returns the project id: config value first, then `FIREBASE_PROJECT_ID`.
    pub fn effective_project_id(&self) -> Option<String> {
        non_empty(self.project_id.as_deref())
            .map(str::to_string)
            .or_else(|| env_value("FIREBASE_PROJECT_ID"))
    }

    pub fn effective_auth_base_url(&self) -> String {
        resolve_base_url(
            env_value("PARLE_AUTH_BASE_URL").as_deref(),
            self.auth_base_url.as_deref(),
            DEFAULT_AUTH_BASE_URL,
        )
    }

    pub fn effective_token_base_url(&self) -> String {
        resolve_base_url(
            env_value("PARLE_TOKEN_BASE_URL").as_deref(),
            self.token_base_url.as_deref(),
            DEFAULT_TOKEN_BASE_URL,
        )
    }

    pub fn effective_firestore_base_url(&self) -> String {
        resolve_base_url(
            env_value("PARLE_FIRESTORE_BASE_URL").as_deref(),
            self.firestore_base_url.as_deref(),
            DEFAULT_FIRESTORE_BASE_URL,
        )
    }
}

/// Google OAuth client used for federated sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub callback_port: u16,
}

impl GoogleConfig {
    const DEFAULT_CALLBACK_PORT: u16 = 8085;

    pub fn effective_client_id(&self) -> Option<&str> {
        non_empty(self.client_id.as_deref())
    }

    pub fn effective_client_secret(&self) -> Option<&str> {
        non_empty(self.client_secret.as_deref())
    }

    /// Google sign-in is offered only when a client id is configured.
    pub fn is_enabled(&self) -> bool {
        self.effective_client_id().is_some()
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            callback_port: Self::DEFAULT_CALLBACK_PORT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments and sections from the template survive, user values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Env override first, then config, then the production default.
/// Trailing slashes are dropped so callers can append paths.
fn resolve_base_url(env: Option<&str>, config: Option<&str>, default: &str) -> String {
    non_empty(env)
        .or_else(|| non_empty(config))
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

pub mod paths {
    //! Path resolution for Parle configuration and data directories.
    //!
    //! PARLE_HOME resolution order:
    //! 1. PARLE_HOME environment variable (if set)
    //! 2. ~/.config/parle (default)

    use std::path::PathBuf;

    /// Returns the Parle home directory.
    pub fn parle_home() -> PathBuf {
        if let Ok(home) = std::env::var("PARLE_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".parle"),
            |h| h.join(".config").join("parle"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        parle_home().join("config.toml")
    }

    /// Returns the path to the cached sign-in credentials.
    pub fn credentials_path() -> PathBuf {
        parle_home().join("credentials.json")
    }

    /// Returns the directory receiving log files.
    pub fn logs_dir() -> PathBuf {
        parle_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,

    pub query_mode: QueryMode,

    /// Seconds between store polls in live mode (minimum 1)
    pub live_poll_interval_secs: u64,

    /// HTTP request timeout in seconds (0 disables)
    pub request_timeout_secs: u64,

    /// Email of the last successful sign-in
    pub last_email: Option<String>,

    pub firebase: FirebaseConfig,

    pub google: GoogleConfig,

    pub logging: LoggingConfig,
}

impl Config {
    const DEFAULT_LIVE_POLL_INTERVAL_SECS: u64 = 5;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Remembers the email of a successful sign-in.
    pub fn save_last_email(email: &str) -> Result<()> {
        Self::save_last_email_to(&paths::config_path(), email)
    }

    /// Saves only the `last_email` field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_last_email_to(path: &Path, email: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        doc["last_email"] = value(email);

        Self::write_config(path, &doc.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    pub fn live_poll_interval(&self) -> Duration {
        Duration::from_secs(self.live_poll_interval_secs.max(1))
    }

    pub fn effective_last_email(&self) -> Option<&str> {
        non_empty(self.last_email.as_deref())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with `Config::default()`.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            query_mode: QueryMode::default(),
            live_poll_interval_secs: Self::DEFAULT_LIVE_POLL_INTERVAL_SECS,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
            firebase: FirebaseConfig::default(),
            google: GoogleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.backend, BackendKind::Firebase);
        assert_eq!(config.query_mode, QueryMode::Live);
        assert_eq!(config.live_poll_interval_secs, 5);
        assert_eq!(config.google.callback_port, 8085);
        assert_eq!(config.last_email, None);
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "backend = \"memory\"\n[google]\nclient_id = \"abc\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.query_mode, QueryMode::Live);
        assert_eq!(config.google.effective_client_id(), Some("abc"));
        assert_eq!(config.google.callback_port, 8085);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_rejects_unknown_backend() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "backend = \"sqlite\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("backend = \"firebase\""));
        assert!(contents.contains("# api_key ="));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.backend, defaults.backend);
        assert_eq!(parsed.query_mode, defaults.query_mode);
        assert_eq!(parsed.request_timeout_secs, defaults.request_timeout_secs);
        assert_eq!(parsed.google.callback_port, defaults.google.callback_port);
        assert_eq!(parsed.logging.file, defaults.logging.file);
    }

    #[test]
    fn test_generate_keeps_template_comments() {
        let generated = Config::generate().unwrap();
        assert!(generated.contains("# Parle Configuration"));
        assert!(generated.contains("live_poll_interval_secs = 5"));
    }

    #[test]
    fn test_request_timeout_zero_disables() {
        let config = Config {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_live_poll_interval_has_floor() {
        let config = Config {
            live_poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.live_poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_base_url_env_wins_over_config() {
        assert_eq!(
            resolve_base_url(
                Some("http://127.0.0.1:9099/"),
                Some("https://proxy.example.com"),
                DEFAULT_AUTH_BASE_URL
            ),
            "http://127.0.0.1:9099"
        );
    }

    #[test]
    fn test_base_url_blank_values_fall_back() {
        assert_eq!(
            resolve_base_url(Some("  "), Some(""), DEFAULT_FIRESTORE_BASE_URL),
            DEFAULT_FIRESTORE_BASE_URL
        );
        assert_eq!(
            resolve_base_url(None, Some("https://proxy.example.com"), DEFAULT_AUTH_BASE_URL),
            "https://proxy.example.com"
        );
    }

    #[test]
    fn test_google_blank_client_id_is_disabled() {
        let google = GoogleConfig {
            client_id: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!google.is_enabled());
    }

    #[test]
    fn test_save_last_email_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        Config::save_last_email_to(&config_path, "marie@example.com").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.effective_last_email(), Some("marie@example.com"));

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Parle Configuration"));
    }

    #[test]
    fn test_save_last_email_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "backend = \"memory\"\nquery_mode = \"snapshot\"\n[firebase]\nproject_id = \"parle-dev\"\n",
        )
        .unwrap();

        Config::save_last_email_to(&config_path, "jean@example.com").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.last_email.as_deref(), Some("jean@example.com"));
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.query_mode, QueryMode::Snapshot);
        assert_eq!(config.firebase.project_id.as_deref(), Some("parle-dev"));
    }
}
