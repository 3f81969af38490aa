pub mod file;
pub mod memory;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::StoreError;
use crate::models::session::Session;
use crate::models::user::UserProfile;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Synchronous persistence for named string values.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Typed view over a [`SessionStore`].
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.non_empty(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        self.non_empty(REFRESH_TOKEN_KEY)
    }

    pub fn user(&self) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.non_empty(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(error = %err, "stored user profile is unreadable; ignoring it");
                Ok(None)
            }
        }
    }

    /// The full session, if every part of it is present.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let (Some(access_token), Some(refresh_token), Some(user)) =
            (self.access_token()?, self.refresh_token()?, self.user()?)
        else {
            return Ok(None);
        };
        Ok(Some(Session {
            access_token,
            refresh_token,
            user,
        }))
    }

    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let user = serde_json::to_string(&session.user)?;
        self.store.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        self.store.set(USER_KEY, &user)?;
        self.store.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        debug!(user_id = %session.user.id, "session persisted");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        debug!("session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> Result<bool, StoreError> {
        Ok(self.access_token()?.is_some())
    }

    fn non_empty(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(key)?.filter(|value| !value.is_empty()))
    }
}
