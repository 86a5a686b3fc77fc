//! Login, logout and credential refresh against `/auth/*`.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::db::StoreError;
use crate::models::Role;
use crate::session::{AuthError, SessionUser};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Where a freshly signed-in user lands.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "/superadmin-dashboard",
        Role::Admin => "/admin-dashboard",
    }
}

pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<SessionUser, AuthError> {
    let response: TokenResponse = api
        .post_json("/auth/login", &LoginRequest { email, password })
        .await?;

    let access_token = response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let user = api.session().establish(access_token, response.refresh_token)?;
    info!(email = %user.email, role = ?user.role, "signed in");
    Ok(user)
}

pub fn logout(api: &ApiClient) -> Result<(), StoreError> {
    api.session().clear()?;
    info!("signed out");
    Ok(())
}

pub async fn profile(api: &ApiClient) -> Result<Value, ApiError> {
    api.get_json("/auth/profile").await
}

/// Exchanges the refresh credential for a new pair. The old refresh token is
/// kept when the server does not rotate it.
pub async fn refresh(api: &ApiClient) -> Result<SessionUser, AuthError> {
    let refresh_token = api
        .session()
        .refresh_token()
        .ok_or(AuthError::NoRefreshToken)?;

    let response: TokenResponse = api
        .post_json(
            "/auth/refresh",
            &RefreshRequest {
                refresh_token: &refresh_token,
            },
        )
        .await?;

    let access_token = response
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let user = api
        .session()
        .establish(access_token, response.refresh_token.or(Some(refresh_token)))?;
    debug!(email = %user.email, "credential refreshed");
    Ok(user)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Signed out, or the credential is not close to expiry.
    Idle,
    Refreshed(SessionUser),
    /// Refresh failed and the session was cleared; the user must sign in again.
    SignedOut,
}

/// One expiry check at `now` (unix seconds).
pub async fn check_expiry(api: &ApiClient, now: i64) -> RefreshOutcome {
    if !api.session().needs_refresh(now) {
        return RefreshOutcome::Idle;
    }

    match refresh(api).await {
        Ok(user) => RefreshOutcome::Refreshed(user),
        Err(err) => {
            warn!(error = %err, "credential refresh failed, signing out");
            if let Err(err) = api.session().clear() {
                warn!(error = %err, "failed to clear credentials");
            }
            RefreshOutcome::SignedOut
        }
    }
}

/// Checks immediately, then every `every`, until the handle is aborted.
pub fn spawn_token_refresh(api: ApiClient, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            check_expiry(&api, Utc::now().timestamp()).await;
        }
    })
}
