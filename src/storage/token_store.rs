// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Two-tier bearer token storage.
//!
//! "Remember me" logins go to the durable tier (survives restarts); other
//! logins go to the ephemeral tier (cleared when the login session ends).
//! Reads check the durable tier first. Writes always clear both tiers before
//! writing the selected one, so a stale token never lingers in the other tier.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Which tier a session lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    Durable,
    Ephemeral,
}

impl Persistence {
    pub fn from_remember(remember: bool) -> Self {
        if remember {
            Persistence::Durable
        } else {
            Persistence::Ephemeral
        }
    }
}

/// Access token plus optional refresh token, as persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

// Never print token material.
impl std::fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokens")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl StoredTokens {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: access.into(),
            refresh,
        }
    }
}

/// One persistence tier. Operations are synchronous.
pub trait TokenTier: Send + Sync {
    fn read(&self) -> Result<Option<StoredTokens>>;
    fn write(&self, tokens: &StoredTokens) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// In-process tier. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryTier {
    slot: Arc<Mutex<Option<StoredTokens>>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenTier for MemoryTier {
    fn read(&self) -> Result<Option<StoredTokens>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    fn write(&self, tokens: &StoredTokens) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(tokens.clone());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

/// JSON file tier with owner-only permissions on Unix.
#[derive(Debug, Clone)]
pub struct FileTier {
    path: PathBuf,
}

impl FileTier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenTier for FileTier {
    fn read(&self) -> Result<Option<StoredTokens>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| storage_error(&self.path, e))
    }

    fn write(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
        }

        let json = serde_json::to_vec_pretty(tokens).map_err(|e| storage_error(&self.path, e))?;

        // Write to a sibling temp file and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp).map_err(|e| storage_error(&tmp, e))?;
            file.write_all(&json).map_err(|e| storage_error(&tmp, e))?;
            file.sync_all().map_err(|e| storage_error(&tmp, e))?;
        }
        std::fs::rename(&tmp, &self.path).map_err(|e| storage_error(&self.path, e))?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), err))
}

/// Single source of truth for the current bearer token.
#[derive(Clone)]
pub struct TokenStore {
    durable: Arc<dyn TokenTier>,
    ephemeral: Arc<dyn TokenTier>,
}

impl TokenStore {
    pub fn new(durable: Arc<dyn TokenTier>, ephemeral: Arc<dyn TokenTier>) -> Self {
        Self { durable, ephemeral }
    }

    /// File-backed tiers at the configured locations.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            Arc::new(FileTier::new(config.durable_token_path())),
            Arc::new(FileTier::new(config.ephemeral_token_path())),
        )
    }

    fn tier(&self, persistence: Persistence) -> &dyn TokenTier {
        match persistence {
            Persistence::Durable => self.durable.as_ref(),
            Persistence::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Stored tokens and the tier holding them, durable checked first.
    ///
    /// An unreadable tier counts as empty.
    pub fn load(&self) -> Option<(StoredTokens, Persistence)> {
        [Persistence::Durable, Persistence::Ephemeral]
            .into_iter()
            .find_map(|persistence| match self.tier(persistence).read() {
                Ok(tokens) => tokens.map(|t| (t, persistence)),
                Err(e) => {
                    tracing::warn!(error = %e, ?persistence, "Ignoring unreadable token tier");
                    None
                }
            })
    }

    /// Current access token, if any tier holds one.
    pub fn get(&self) -> Option<String> {
        self.load().map(|(tokens, _)| tokens.access)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.load().and_then(|(tokens, _)| tokens.refresh)
    }

    /// Tier currently holding the session.
    pub fn persistence(&self) -> Option<Persistence> {
        self.load().map(|(_, persistence)| persistence)
    }

    /// Clear both tiers, then write to the selected one only.
    pub fn set(&self, tokens: &StoredTokens, persistence: Persistence) -> Result<()> {
        self.clear()?;
        self.tier(persistence).write(tokens)?;
        tracing::debug!(?persistence, "Stored session tokens");
        Ok(())
    }

    /// Remove tokens from both tiers.
    ///
    /// Both tiers are attempted even if the first fails; the first error is returned.
    pub fn clear(&self) -> Result<()> {
        let durable = self.durable.remove();
        let ephemeral = self.ephemeral.remove();
        durable.and(ephemeral)
    }
}
