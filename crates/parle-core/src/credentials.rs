//! Signed-in identity cache.
//!
//! Stores the current Firebase identity in `<base>/credentials.json` with
//! restricted permissions (0600). Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;
use crate::model::Session;

/// ID tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_MS: u64 = 60_000;

pub fn now_millis_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// Expiry timestamp for a token valid for `expires_in_secs` from now.
pub fn compute_expires_at(expires_in_secs: u64) -> u64 {
    now_millis_u64().saturating_add(expires_in_secs.saturating_mul(1000))
}

/// Cached identity and tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    /// Expiry timestamp of `id_token` in milliseconds since epoch
    pub expires_at: u64,
}

impl StoredCredentials {
    pub fn session(&self) -> Session {
        Session::new(self.user_id.clone(), self.email.clone())
    }

    /// Returns true if the ID token is expired or about to expire.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(now_millis_u64())
    }

    fn needs_refresh_at(&self, now: u64) -> bool {
        now.saturating_add(REFRESH_MARGIN_MS) >= self.expires_at
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$PARLE_HOME/credentials.json`.
    pub fn default_location() -> Self {
        Self::new(paths::credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` if no identity is cached.
    pub fn load(&self) -> Result<Option<StoredCredentials>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .map(Some)
            .with_context(|| format!("Failed to parse credentials from {}", self.path.display()))
    }

    /// Saves credentials to disk with restricted permissions (0600).
    pub fn save(&self, creds: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(creds).context("Failed to serialize credentials")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Deletes the cache. Returns whether anything was removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}
