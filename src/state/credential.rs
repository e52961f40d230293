//! Durable bearer-credential storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store writes the credential; the gateway reads it on every
//! request and clears it when the backend rejects it. Both go through one
//! `CredentialSlot`, which stamps every write with a generation so a response
//! to an older credential can never clear a newer one.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Storage key (file name) of the persisted token.
pub const TOKEN_KEY: &str = "token";

#[cfg(unix)]
const TOKEN_FILE_MODE: u32 = 0o600;

// =============================================================================
// CREDENTIAL
// =============================================================================

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token; blank tokens are treated as absent.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// =============================================================================
// STORES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential storage I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A single named slot holding the raw token; absence means unauthenticated.
pub trait CredentialStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn load(&self) -> Result<Option<Credential>, CredentialError>;

    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn save(&self, credential: &Credential) -> Result<(), CredentialError>;

    /// Removing an already-absent credential succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be modified.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// Process-local store, used by tests and embedders without durable storage.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { slot: Mutex::new(Credential::new(token)) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token persisted as a plain file named [`TOKEN_KEY`] inside a state directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self { path: state_dir.as_ref().join(TOKEN_KEY) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Credential::new(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The file is owner-only (0600 on unix) before any token byte is written.
    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(TOKEN_FILE_MODE);
        }
        let mut file = options.open(&self.path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(TOKEN_FILE_MODE))?;
        }
        file.write_all(credential.as_str().as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// SLOT
// =============================================================================

/// Write counter of a [`CredentialSlot`]; changes on every save or clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// The one shared handle to the credential store.
///
/// All reads and writes hold the generation lock, so a compare-and-clear
/// cannot interleave with a concurrent save.
pub struct CredentialSlot {
    store: Arc<dyn CredentialStore>,
    generation: Mutex<u64>,
}

impl CredentialSlot {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store, generation: Mutex::new(0) }
    }

    /// The stored credential together with the generation it was read at.
    ///
    /// Storage read failures are logged and reported as "absent".
    pub fn current(&self) -> (Option<Credential>, Generation) {
        let generation = self.lock();
        let credential = self.store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "credential read failed; treating as absent");
            None
        });
        (credential, Generation(*generation))
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation(*self.lock())
    }

    /// Persist a new credential and return its generation.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be written; the generation is
    /// left unchanged in that case.
    pub fn replace(&self, credential: &Credential) -> Result<Generation, CredentialError> {
        let mut generation = self.lock();
        self.store.save(credential)?;
        *generation += 1;
        Ok(Generation(*generation))
    }

    /// Unconditionally clear the credential.
    pub fn clear(&self) -> Generation {
        let mut generation = self.lock();
        self.clear_locked(&mut generation);
        Generation(*generation)
    }

    /// Clear the credential only if nothing was written since `seen`.
    ///
    /// Returns `true` when this call performed the clear.
    pub fn clear_if_current(&self, seen: Generation) -> bool {
        let mut generation = self.lock();
        if *generation != seen.0 {
            return false;
        }
        self.clear_locked(&mut generation);
        true
    }

    /// Run `apply` while holding the slot, only if nothing was written since `seen`.
    pub fn run_if_current(&self, seen: Generation, apply: impl FnOnce()) -> bool {
        let generation = self.lock();
        if *generation != seen.0 {
            return false;
        }
        apply();
        true
    }

    fn clear_locked(&self, generation: &mut u64) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "credential clear failed");
        }
        *generation += 1;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
