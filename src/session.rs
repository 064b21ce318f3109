// src/session.rs
//! Signed-in session persisted between CLI runs

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::types::response::{AuthResponse, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub auth_token: String,
    pub user: UserProfile,
    /// Epoch milliseconds.
    pub session_expiry: i64,
}

impl StoredSession {
    pub fn is_expired(&self) -> bool {
        self.session_expiry <= Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            path: config.file.clone(),
            lifetime: Duration::hours(config.lifetime_hours),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored session if it has not expired. An expired session
    /// file is removed.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        let session: StoredSession =
            serde_json::from_str(&raw).context("Failed to parse session file")?;

        if session.is_expired() {
            warn!("Session for {} expired, clearing", session.user.email);
            self.clear()?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Stores the result of a sign-in, valid for the configured lifetime.
    pub fn save(&self, auth: &AuthResponse) -> Result<StoredSession> {
        let session = StoredSession {
            auth_token: auth.token.clone(),
            user: auth.user.clone(),
            session_expiry: (Utc::now() + self.lifetime).timestamp_millis(),
        };
        self.write(&session)?;
        info!("Session saved for {}", session.user.email);
        Ok(session)
    }

    pub fn write(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
            info!("Session cleared");
        }
        Ok(())
    }
}
