use std::sync::Arc;

use catalog_flux::StateStore;
use catalog_kv::{KVStore, ScopedKV};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::model::{LoginResponse, User};
use crate::token;

/// Storage keys, one set per API origin.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const CURRENT_USER_KEY: &str = "current_user";

/// `bool`: whether a usable session exists.
pub const AUTHENTICATED_PATH: &str = "session/authenticated";
/// `Option<User>`: the signed-in profile.
pub const USER_PATH: &str = "session/user";

/// The single owner of the persisted session.
///
/// Every mutation writes through to storage and then publishes
/// [`AUTHENTICATED_PATH`] and [`USER_PATH`] before returning.
pub struct SessionStore {
    kv: Arc<dyn KVStore>,
    state: Arc<StateStore>,
}

impl SessionStore {
    /// Open the session and publish its initial state.
    ///
    /// An expired or unreadable stored token is cleared here.
    pub fn new(kv: Arc<dyn KVStore>, state: Arc<StateStore>) -> Self {
        let store = Self { kv, state };
        let valid = store.has_valid_token();
        let user = if valid { store.current_user() } else { None };
        store.state.set(AUTHENTICATED_PATH, valid);
        store.state.set(USER_PATH, user);
        store
    }

    /// Session confined to one API origin inside a shared backing store.
    pub fn for_origin(backing: Arc<dyn KVStore>, origin: &str, state: Arc<StateStore>) -> Self {
        Self::new(Arc::new(ScopedKV::new(backing, origin)), state)
    }

    pub fn token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// The stored profile. An unparseable profile is dropped.
    pub fn current_user(&self) -> Option<User> {
        let raw = self.read(CURRENT_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("dropping unreadable stored profile: {}", e);
                if let Err(e) = self.kv.delete(CURRENT_USER_KEY) {
                    warn!("failed to delete stored profile: {}", e);
                }
                None
            }
        }
    }

    pub fn set_session(&self, login: &LoginResponse) -> Result<(), ApiError> {
        let user = serde_json::to_string(&login.user)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut entries: Vec<(&str, &[u8])> = vec![
            (ACCESS_TOKEN_KEY, login.access_token.as_bytes()),
            (CURRENT_USER_KEY, user.as_bytes()),
        ];
        if let Some(refresh) = &login.refresh_token {
            entries.push((REFRESH_TOKEN_KEY, refresh.as_bytes()));
        }
        self.kv.batch_set(&entries)?;

        debug!(user = %login.user.username, "session stored");
        self.state.set(AUTHENTICATED_PATH, true);
        self.state.set(USER_PATH, Some(login.user.clone()));
        Ok(())
    }

    /// Replace only the access token. Nothing is republished.
    pub fn set_access_token(&self, token: &str) -> Result<(), ApiError> {
        self.kv.set(ACCESS_TOKEN_KEY, token.as_bytes())?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        let result = self
            .kv
            .batch_delete(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, CURRENT_USER_KEY]);
        self.state.set(AUTHENTICATED_PATH, false);
        self.state.set(USER_PATH, None::<User>);
        debug!("session cleared");
        result.map_err(ApiError::from)
    }

    /// Whether the stored access token is present and unexpired.
    ///
    /// A token that fails to decode or is past `exp` clears the session.
    pub fn has_valid_token(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        let expired = match token::decode_claims(&token) {
            Ok(claims) => claims.is_expired_at(chrono::Utc::now().timestamp()),
            Err(e) => {
                debug!("stored token unreadable: {}", e);
                true
            }
        };
        if expired {
            if let Err(e) = self.clear() {
                warn!("failed to clear expired session: {}", e);
            }
            return false;
        }
        true
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .get_cloned::<bool>(AUTHENTICATED_PATH)
            .unwrap_or(false)
    }

    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value.and_then(|v| String::from_utf8(v).ok()),
            Err(e) => {
                warn!(key, "session read failed: {}", e);
                None
            }
        }
    }
}
