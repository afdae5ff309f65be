//! Session State
//!
//! Holds the opaque access token and the signed-in user's profile, mirrored to
//! durable storage under the keys `token` and `userInfo`.
//!
//! ## Consistency
//!
//! Reads are synchronous and served from memory. Writes update memory first
//! and then persist, so a caller that checks [`SessionStore::is_authenticated`]
//! right after [`SessionStore::clear`] always sees the cleared state even if
//! the storage write later fails. Clearing is unconditional and idempotent.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::SessionStore;
//! use bridge_traits::storage::MemorySettingsStore;
//! use std::sync::Arc;
//! # async fn example() -> core_auth::Result<()> {
//! let session = SessionStore::new(Arc::new(MemorySettingsStore::new()), None);
//! session.load().await?;
//!
//! session.set_token("3f9a…").await?;
//! assert!(session.is_authenticated());
//!
//! session.clear().await?;
//! assert!(!session.is_authenticated());
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::UserProfile;
use bridge_traits::storage::SettingsStore;
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Storage key for the access token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the JSON-encoded profile.
pub const USER_INFO_KEY: &str = "userInfo";

/// In-memory view of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }
}

/// Session handle shared by the transport, the dispatcher and the UI shell.
pub struct SessionStore {
    storage: Arc<dyn SettingsStore>,
    state: RwLock<SessionState>,
    events: Option<EventBus>,
}

impl SessionStore {
    /// Create an empty session. Call [`load`](Self::load) to restore a stored one.
    pub fn new(storage: Arc<dyn SettingsStore>, events: Option<EventBus>) -> Self {
        Self {
            storage,
            state: RwLock::new(SessionState::default()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Session(event));
        }
    }

    /// Restore token and profile from storage.
    ///
    /// A profile that is not valid JSON is discarded (and deleted) with a
    /// warning; the token is still restored.
    pub async fn load(&self) -> Result<()> {
        let token = self
            .storage
            .get_string(TOKEN_KEY)
            .await
            .map_err(AuthError::StorageUnavailable)?
            .filter(|token| !token.is_empty());

        let raw_profile = self
            .storage
            .get_string(USER_INFO_KEY)
            .await
            .map_err(AuthError::StorageUnavailable)?;

        let profile = match raw_profile {
            None => None,
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) if profile.is_empty() => None,
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "Stored profile is corrupted; discarding it");
                    if let Err(delete_err) = self.storage.delete(USER_INFO_KEY).await {
                        warn!(error = %delete_err, "Failed to delete corrupted profile");
                    }
                    None
                }
            },
        };

        let mut state = self.write();
        state.token = token;
        state.profile = profile;

        info!(
            authenticated = state.is_authenticated(),
            has_profile = state.profile.is_some(),
            "Session restored"
        );
        Ok(())
    }

    /// Current token, if a non-empty one is stored.
    pub fn token(&self) -> Option<String> {
        self.read().token.clone().filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn user_info(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// Store a new token verbatim.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        let username = {
            let mut state = self.write();
            state.token = Some(token.clone());
            state.profile.as_ref().and_then(|p| p.username.clone())
        };

        self.storage
            .set_string(TOKEN_KEY, &token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to persist token");
                AuthError::StorageUnavailable(e)
            })?;

        debug!("Token stored");
        self.emit(SessionEvent::SignedIn { username });
        Ok(())
    }

    /// Replace the stored profile.
    pub async fn set_user_info(&self, profile: UserProfile) -> Result<()> {
        let json = serde_json::to_string(&profile)?;
        let username = profile.username.clone();
        self.write().profile = Some(profile);

        self.storage
            .set_string(USER_INFO_KEY, &json)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to persist profile");
                AuthError::StorageUnavailable(e)
            })?;

        self.emit(SessionEvent::ProfileUpdated { username });
        Ok(())
    }

    /// Drop token and profile (explicit logout).
    pub async fn clear(&self) -> Result<()> {
        let result = self.clear_inner().await;
        self.emit(SessionEvent::SignedOut);
        result
    }

    /// Drop token and profile because the server rejected the credential.
    pub async fn invalidate(&self, code: i32) -> Result<()> {
        let result = self.clear_inner().await;
        self.emit(SessionEvent::Invalidated { code });
        result
    }

    async fn clear_inner(&self) -> Result<()> {
        *self.write() = SessionState::default();

        // Both keys are attempted even if the first delete fails.
        let token_result = self.storage.delete(TOKEN_KEY).await;
        let profile_result = self.storage.delete(USER_INFO_KEY).await;

        info!("Session cleared");
        token_result
            .and(profile_result)
            .map_err(|e| {
                warn!(error = %e, "Failed to remove stored session");
                AuthError::StorageUnavailable(e)
            })
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
