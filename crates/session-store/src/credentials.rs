//! Credential store for user and admin session tokens
//!
//! Keeps a key/value map in memory and, when file-backed, mirrors every
//! mutation to a JSON file via atomic temp-file + rename. A tokio Mutex
//! serializes access, so a `get` always observes the most recently completed
//! `set` or `clear`, and concurrent 401 invalidations resolve as last-wins.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use common::Secret;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::keys::{ADMIN_TOKEN, LEGACY_USER_TOKEN, USER_TOKEN};

/// Which session a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    User,
    Admin,
}

impl CredentialKind {
    /// Key the credential is persisted under.
    pub fn storage_key(self) -> &'static str {
        match self {
            CredentialKind::User => USER_TOKEN,
            CredentialKind::Admin => ADMIN_TOKEN,
        }
    }

    /// Every key that must disappear when this credential is cleared.
    fn owned_keys(self) -> &'static [&'static str] {
        match self {
            CredentialKind::User => &[USER_TOKEN, LEGACY_USER_TOKEN],
            CredentialKind::Admin => &[ADMIN_TOKEN],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CredentialKind::User => "user",
            CredentialKind::Admin => "admin",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A credential handed out by the store.
///
/// `stored_at` is a unix timestamp in milliseconds, 0 when unknown (entries
/// imported as bare strings).
#[derive(Debug, Clone)]
pub struct Credential {
    pub kind: CredentialKind,
    pub token: Secret<String>,
    pub stored_at: u64,
}

/// Snapshot of which credentials are bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    pub user: bool,
    pub admin: bool,
}

impl Presence {
    pub fn has(&self, kind: CredentialKind) -> bool {
        match kind {
            CredentialKind::User => self.user,
            CredentialKind::Admin => self.admin,
        }
    }
}

/// On-disk form of a single entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    value: String,
    #[serde(default)]
    stored_at: u64,
}

/// Entries written by the browser front-end are bare strings; entries written
/// by this store carry a timestamp. Both load.
#[derive(Deserialize)]
#[serde(untagged)]
enum FileEntry {
    Plain(String),
    Full(StoredCredential),
}

impl From<FileEntry> for StoredCredential {
    fn from(entry: FileEntry) -> Self {
        match entry {
            FileEntry::Plain(value) => StoredCredential {
                value,
                stored_at: 0,
            },
            FileEntry::Full(stored) => stored,
        }
    }
}

/// Process-wide credential store.
///
/// Construct with `load` for a file-backed store that survives restarts, or
/// `in_memory` for tests and ephemeral sessions.
pub struct CredentialStore {
    path: Option<PathBuf>,
    state: Mutex<HashMap<String, StoredCredential>>,
}

impl CredentialStore {
    /// Store with no persistence.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Load credentials from the given file path.
    ///
    /// A missing file is created as `{}`. Empty values are treated as absent
    /// and dropped. A user token found only under the legacy key is moved to
    /// the current key. The file is rewritten when either changed it.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let mut state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading credential file: {e}")))?;
            let entries: HashMap<String, FileEntry> = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing credential file: {e}")))?;
            entries
                .into_iter()
                .map(|(key, entry)| (key, StoredCredential::from(entry)))
                .collect::<HashMap<_, _>>()
        } else {
            info!(path = %path.display(), "credential file not found, starting with empty store");
            let empty = HashMap::new();
            write_atomic(&path, &empty).await?;
            empty
        };

        let before = state.len();
        state.retain(|key, stored| {
            if stored.value.is_empty() {
                warn!(key = %key, "dropping empty credential entry");
                return false;
            }
            true
        });
        let mut dirty = state.len() != before;

        if migrate_legacy_user_token(&mut state) {
            info!(path = %path.display(), "migrated legacy user token key");
            dirty = true;
        }

        if dirty {
            write_atomic(&path, &state).await?;
        }

        info!(
            path = %path.display(),
            user = state.contains_key(USER_TOKEN),
            admin = state.contains_key(ADMIN_TOKEN),
            "loaded credentials"
        );

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a clone of the credential for `kind`, if bound.
    pub async fn get(&self, kind: CredentialKind) -> Option<Credential> {
        let state = self.state.lock().await;
        state.get(kind.storage_key()).map(|stored| Credential {
            kind,
            token: Secret::new(stored.value.clone()),
            stored_at: stored.stored_at,
        })
    }

    /// Which credentials are currently bound.
    pub async fn presence(&self) -> Presence {
        let state = self.state.lock().await;
        Presence {
            user: state.contains_key(USER_TOKEN),
            admin: state.contains_key(ADMIN_TOKEN),
        }
    }

    /// Bind `value` as the credential for `kind`, overwriting any previous one.
    ///
    /// The token shape is not inspected; only the empty string is refused.
    /// When the write to disk fails the previous binding is kept.
    pub async fn set(&self, kind: CredentialKind, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::EmptyCredential(kind.label()));
        }
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.insert(
            kind.storage_key().to_string(),
            StoredCredential {
                value,
                stored_at: now_millis(),
            },
        );
        self.persist(&next).await?;
        *state = next;
        debug!(kind = %kind, "stored credential");
        Ok(())
    }

    /// Remove the credential for `kind`.
    ///
    /// Idempotent: returns `Ok(false)` without touching disk when nothing was
    /// bound. When the write to disk fails the credential stays bound.
    pub async fn clear(&self, kind: CredentialKind) -> Result<bool> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let mut removed = false;
        for key in kind.owned_keys() {
            removed |= next.remove(*key).is_some();
        }
        if !removed {
            return Ok(false);
        }
        self.persist(&next).await?;
        *state = next;
        debug!(kind = %kind, "cleared credential");
        Ok(true)
    }

    async fn persist(&self, state: &HashMap<String, StoredCredential>) -> Result<()> {
        match &self.path {
            Some(path) => write_atomic(path, state).await,
            None => Ok(()),
        }
    }
}

/// Move a user token stored only under the legacy key to the current key.
fn migrate_legacy_user_token(state: &mut HashMap<String, StoredCredential>) -> bool {
    if state.contains_key(USER_TOKEN) {
        return false;
    }
    match state.remove(LEGACY_USER_TOKEN) {
        Some(stored) => {
            state.insert(USER_TOKEN.to_string(), stored);
            true
        }
        None => false,
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Write the credential map atomically with 0600 permissions on unix.
async fn write_atomic(path: &Path, data: &HashMap<String, StoredCredential>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Parse(format!("serializing credentials: {e}")))?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "credentials".to_string());
    let tmp_path = dir.join(format!(".{file_name}.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}
