// ── Session lifecycle ──
//
// A `SessionStore` owns the on-disk session cache and decides when a new
// login is needed. Authentication itself sits behind the `Authenticator`
// trait so the store can be driven by a fake in tests.

use std::future::Future;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AuthError, CacheError};

/// Default head-room subtracted from a session's expiry before reuse.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(30);

/// An authenticated CV-CUE session.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub client_id: String,
    /// API root the session was issued by, when known.
    pub base_url: Option<String>,
}

impl Session {
    pub fn new(
        token: SecretString,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            token,
            issued_at,
            expires_at,
            client_id: client_id.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build a session from a fresh login grant, issued now.
    pub fn from_grant(grant: &cvcue_api::SessionGrant, client_id: &str) -> Self {
        let issued_at = Utc::now();
        let lifetime =
            TimeDelta::try_seconds(i64::try_from(grant.timeout_secs).unwrap_or(i64::MAX))
                .unwrap_or(TimeDelta::MAX);
        Self::new(
            grant.token.clone(),
            issued_at,
            issued_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
            client_id,
        )
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Time left before expiry at `now`, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Utc::now())
    }
}

/// On-disk form of a `Session`.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.expose_secret().to_owned(),
            issued_at: session.issued_at,
            expires_at: session.expires_at,
            client_id: session.client_id.clone(),
            base_url: session.base_url.clone(),
        }
    }
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        let session = Self::new(
            SecretString::from(record.token),
            record.issued_at,
            record.expires_at,
            record.client_id,
        );
        match record.base_url {
            Some(url) => session.with_base_url(url),
            None => session,
        }
    }
}

// ── Authenticator ───────────────────────────────────────────────────

/// Something that can trade configured credentials for a new session.
pub trait Authenticator {
    fn authenticate(&self) -> impl Future<Output = Result<Session, AuthError>> + Send;
}

// ── Status ──────────────────────────────────────────────────────────

/// Snapshot of the cached session, for `session status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Missing,
    Valid {
        client_id: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        remaining: Duration,
    },
    Expired {
        client_id: String,
        expires_at: DateTime<Utc>,
    },
}

// ── Store ───────────────────────────────────────────────────────────

/// The client and tenant a cached session must belong to before reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOwner {
    pub client_id: String,
    pub base_url: String,
}

impl SessionOwner {
    pub fn new(client_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            base_url: base_url.into(),
        }
    }

    /// Same client id, and the same API root up to trailing slashes.
    pub fn owns(&self, session: &Session) -> bool {
        session.client_id == self.client_id
            && session
                .base_url
                .as_deref()
                .is_some_and(|url| url.trim_end_matches('/') == self.base_url.trim_end_matches('/'))
    }
}

/// Persisted session cache plus the reuse-or-login policy.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    safety_margin: Duration,
    owner: Option<SessionOwner>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            safety_margin: DEFAULT_SAFETY_MARGIN,
            owner: None,
        }
    }

    /// Only reuse cached sessions issued to `owner`.
    pub fn with_owner(mut self, owner: SessionOwner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// Load the cached session.
    ///
    /// A missing file is `None`. An unreadable or undecodable file is
    /// deleted and reported as absent, so the next call logs in again.
    pub fn load(&self) -> Option<Session> {
        match self.try_load() {
            Ok(session) => session,
            Err(err) => {
                warn!("{err}, discarding");
                if let Err(err) = self.clear() {
                    warn!("{err}");
                }
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<Session>, CacheError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let record: SessionRecord =
            serde_json::from_str(&raw).map_err(|source| CacheError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(record.into()))
    }

    /// Persist a session atomically: write a sibling temp file, then rename.
    pub fn save(&self, session: &Session) -> Result<(), CacheError> {
        let write_err = |source| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(write_err)?;

        let json = serde_json::to_vec_pretty(&SessionRecord::from(session))
            .map_err(|e| write_err(e.into()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!("session cached at {}", self.path.display());
        Ok(())
    }

    /// Delete the cached session. Succeeds when nothing is cached.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("session cache {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Whether a session is still usable at `now`: its expiry lies beyond
    /// `now` plus the safety margin.
    pub fn is_valid_at(&self, session: &Session, now: DateTime<Utc>) -> bool {
        let margin = TimeDelta::from_std(self.safety_margin).unwrap_or(TimeDelta::MAX);
        now.checked_add_signed(margin)
            .is_some_and(|cutoff| session.expires_at > cutoff)
    }

    pub fn is_valid(&self, session: &Session) -> bool {
        self.is_valid_at(session, Utc::now())
    }

    pub fn status(&self) -> SessionStatus {
        let now = Utc::now();
        match self.load() {
            None => SessionStatus::Missing,
            Some(session) if self.is_valid_at(&session, now) => SessionStatus::Valid {
                remaining: session.remaining_at(now),
                client_id: session.client_id,
                issued_at: session.issued_at,
                expires_at: session.expires_at,
            },
            Some(session) => SessionStatus::Expired {
                client_id: session.client_id,
                expires_at: session.expires_at,
            },
        }
    }

    /// Authenticate unconditionally and cache the result.
    ///
    /// A cache write failure is logged and the session still returned.
    pub async fn login<A: Authenticator>(&self, auth: &A) -> Result<Session, AuthError> {
        let session = auth.authenticate().await?;
        info!(
            "new session for client {}, expires {}",
            session.client_id, session.expires_at
        );
        if let Err(err) = self.save(&session) {
            warn!("{err}");
        }
        Ok(session)
    }

    /// Reuse the cached session if it's still valid and was issued to the
    /// configured owner, otherwise log in.
    pub async fn ensure_valid<A: Authenticator>(
        &self,
        auth: &A,
    ) -> Result<Session, AuthError> {
        if let Some(session) = self.load() {
            if let Some(owner) = self.owner.as_ref().filter(|o| !o.owns(&session)) {
                debug!(
                    "cached session belongs to client {}, not {} at {}",
                    session.client_id, owner.client_id, owner.base_url
                );
            } else if self.is_valid(&session) {
                debug!(
                    "reusing cached session, {}s left",
                    session.remaining().as_secs()
                );
                return Ok(session);
            } else {
                debug!("cached session expired at {}", session.expires_at);
            }
        }
        self.login(auth).await
    }
}
