//! Who is signed in, published as a stream that replays the latest value.

use serde::Serialize;
use tokio::sync::watch;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{User, UserRole},
    store::{Store, StoreError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

pub trait Identity {
    /// New receivers observe the latest known user immediately.
    fn current_user(&self) -> watch::Receiver<Option<CurrentUser>>;

    fn current_user_value(&self) -> Option<CurrentUser>;
}

/// Signed-in state of one client, plus its cached profile.
///
/// Signing out is the teardown point: the cached profile is dropped.
#[derive(Debug)]
pub struct Session {
    user: watch::Sender<Option<CurrentUser>>,
    profile: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        let (user, _) = watch::channel(None);
        Self {
            user,
            profile: None,
        }
    }

    pub fn signed_in(user: CurrentUser) -> Self {
        let session = Self::new();
        session.user.send_replace(Some(user));
        session
    }

    pub fn sign_in(&mut self, user: CurrentUser) {
        if self.profile.as_ref().is_some_and(|p| p.id != user.id) {
            self.profile = None;
        }
        tracing::debug!(user_id = %user.id, "session signed in");
        self.user.send_replace(Some(user));
    }

    pub fn sign_out(&mut self) {
        self.profile = None;
        if let Some(user) = self.user.send_replace(None) {
            tracing::debug!(user_id = %user.id, "session signed out");
        }
    }

    pub fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    /// Fetches the signed-in user's profile unless it is already cached.
    pub async fn load_profile(&mut self, store: &dyn Store) -> Result<Option<&User>, StoreError> {
        let Some(user) = self.current_user_value() else {
            return Ok(None);
        };
        if self.profile.as_ref().is_none_or(|p| p.id != user.id) {
            self.profile = store.get_user(user.id).await?;
        }
        Ok(self.profile.as_ref())
    }

    /// Replaces the cached profile after an edit, when it belongs to the signed-in user.
    pub fn cache_profile(&mut self, profile: User) {
        if self
            .current_user_value()
            .is_some_and(|user| user.id == profile.id)
        {
            self.profile = Some(profile);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Identity for Session {
    fn current_user(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.user.subscribe()
    }

    fn current_user_value(&self) -> Option<CurrentUser> {
        self.user.borrow().clone()
    }
}
