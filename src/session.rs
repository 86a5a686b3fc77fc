//! Session context: the signed-in user and the credential pair.
//!
//! A [`Session`] is created once from the persisted [`CredentialStore`] and
//! shared (behind an `Arc`) by the API client and the token refresher. Login
//! and refresh call [`Session::establish`]; logout calls [`Session::clear`].

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::api::ApiError;
use crate::db::{CredentialStore, StoreError};
use crate::models::Role;

/// Refresh once the access credential has less than this many seconds left.
pub const REFRESH_MARGIN_SECS: i64 = 300;

pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];
pub const SUPERADMIN_ROLES: &[Role] = &[Role::SuperAdmin];

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed access credential")]
    MalformedToken,

    #[error("no access token received from server")]
    MissingToken,

    #[error("no refresh credential stored")]
    NoRefreshToken,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Page refused for the current session. Callers send the user to [`LOGIN_PATH`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessDenied {
    #[error("not signed in")]
    SignedOut,

    #[error("the {} role may not open this page", .role.label())]
    Forbidden { role: Role },
}

impl AccessDenied {
    pub fn redirect(&self) -> &'static str {
        LOGIN_PATH
    }
}

/// Claims carried in the access credential's payload segment.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let payload = token.split('.').nth(1).ok_or(AuthError::MalformedToken)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| AuthError::MalformedToken)?;
        serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

impl From<&Claims> for SessionUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: claims.role,
        }
    }
}

struct Credentials {
    access_token: String,
    refresh_token: Option<String>,
    claims: Claims,
}

pub struct Session {
    store: CredentialStore,
    state: RwLock<Option<Credentials>>,
}

impl Session {
    /// Restores the persisted credentials. An undecodable access token wipes the store.
    pub fn init(store: CredentialStore) -> Result<Self, StoreError> {
        let state = match store.load()? {
            Some(stored) => match Claims::decode(&stored.access_token) {
                Ok(claims) => Some(Credentials {
                    access_token: stored.access_token,
                    refresh_token: stored.refresh_token,
                    claims,
                }),
                Err(err) => {
                    warn!(error = %err, "discarding stored credentials");
                    store.clear()?;
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credentials>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn bearer(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().as_ref().and_then(|c| c.refresh_token.clone())
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read().as_ref().map(|c| SessionUser::from(&c.claims))
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.read().as_ref().and_then(|c| c.claims.exp)
    }

    /// True when signed in and the credential expires within [`REFRESH_MARGIN_SECS`] of `now`.
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.expires_at()
            .is_some_and(|exp| exp - now < REFRESH_MARGIN_SECS)
    }

    pub fn authorize(&self, allowed: &[Role]) -> Result<SessionUser, AccessDenied> {
        let user = self.user().ok_or(AccessDenied::SignedOut)?;
        if allowed.contains(&user.role) {
            Ok(user)
        } else {
            Err(AccessDenied::Forbidden { role: user.role })
        }
    }

    /// Decodes, persists and installs a fresh credential pair.
    pub fn establish(
        &self,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<SessionUser, AuthError> {
        let claims = Claims::decode(&access_token)?;
        self.store.save(&access_token, refresh_token.as_deref())?;

        let user = SessionUser::from(&claims);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = Some(Credentials {
            access_token,
            refresh_token,
            claims,
        });
        Ok(user)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.store.clear()
    }
}
