//! Local persistence of the store credential set.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use shared::StoreCredentials;
use thiserror::Error;
use tracing::warn;

pub const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("credential file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode credentials: {0}")]
    Encode(#[from] toml::ser::Error),
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<StoreCredentials>, CredentialError>;
    fn save(&self, credentials: &StoreCredentials) -> Result<(), CredentialError>;
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn in_dir(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoreCredentials>, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(toml::from_str(&raw)?))
    }

    /// Writes the whole set to a sibling temp file and renames it into place,
    /// so a failed save leaves the previous file untouched.
    fn save(&self, credentials: &StoreCredentials) -> Result<(), CredentialError> {
        let encoded = toml::to_string_pretty(credentials)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, encoded)?;
        if let Err(err) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Stored credentials when they are present and usable, else the built-in set.
pub fn resolve_credentials(store: &dyn CredentialStore) -> StoreCredentials {
    match store.load() {
        Ok(Some(credentials)) if credentials.is_usable() => credentials,
        Ok(Some(_)) => {
            warn!("credentials: stored set is incomplete, using built-in default");
            StoreCredentials::builtin_default()
        }
        Ok(None) => StoreCredentials::builtin_default(),
        Err(err) => {
            warn!("credentials: invalid stored set, using built-in default: {err}");
            StoreCredentials::builtin_default()
        }
    }
}
