//! Durable client storage. Everything a page reload must keep (correlation ids,
//! verification flags, the bearer token, the current page) is grouped into one
//! [`PortalState`] and saved through a single [`SessionStore`].

use crate::portal::{flow::RegistrationFlow, routes::Route, session::VerificationSession};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalState {
    #[serde(default)]
    pub session: VerificationSession,
    #[serde(default)]
    pub registration: RegistrationFlow,
    #[serde(default)]
    pub route: Route,
}

pub trait SessionStore {
    /// Load the last saved state, or the default state when nothing was saved.
    ///
    /// # Errors
    /// Returns an error if the stored state cannot be read or decoded.
    fn load(&self) -> Result<PortalState>;

    /// # Errors
    /// Returns an error if the state cannot be written.
    fn save(&self, state: &PortalState) -> Result<()>;
}

/// JSON file on disk, the CLI counterpart of browser local storage.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<PortalState> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no saved state, starting fresh");
                return Ok(PortalState::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to decode portal state in {}", self.path.display()))
    }

    #[instrument(skip(self, state), fields(path = %self.path.display()))]
    fn save(&self, state: &PortalState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let payload =
            serde_json::to_vec_pretty(state).context("Failed to encode portal state")?;
        let temp_path = self.temp_path();

        let mut file = open_private(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(&payload)
            .and_then(|()| file.sync_all())
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("portal state saved");

        Ok(())
    }
}

// The state holds the bearer token, keep it owner-only.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// In-process store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<Option<PortalState>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<PortalState> {
        let state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        Ok(state.clone().unwrap_or_default())
    }

    fn save(&self, state: &PortalState) -> Result<()> {
        let mut slot = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        *slot = Some(state.clone());
        Ok(())
    }
}
