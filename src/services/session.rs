// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session bootstrap: resolve the current user from the stored token.
//!
//! State machine per mount:
//!
//! ```text
//! Idle ──(no token)──────────────────────────────▶ Unauthenticated
//!   │
//!   └─(token)─▶ Resolving ──(exp in future, /me ok)──▶ Authenticated
//!                  │  ▲  └──(/me fails)──────────────▶ Unauthenticated (cleared)
//!                  │  │
//!   (expired / undecodable)
//!                  ▼  │ (refresh ok, at most once)
//!               refresh ──(no refresh token / rejected)▶ Unauthenticated (cleared)
//! ```
//!
//! Concurrent callers for the same mount share one in-flight resolution.
//! A result that completes after its mount was dropped is discarded, and
//! entries for unmounted views are pruned on the next resolve.

use crate::error::{ClientError, Result, SESSION_EXPIRED_MESSAGE};
use crate::models::User;
use crate::navigation::Route;
use crate::notices::{Notice, NoticeSink};
use crate::services::api::ApiClient;
use crate::services::auth::AuthSession;
use crate::storage::{StoredTokens, TokenStore};
use crate::time_utils::now_unix;
use dashmap::DashMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};

pub type MountId = u64;

static NEXT_MOUNT_ID: AtomicU64 = AtomicU64::new(1);

/// One consumer of the session (a CLI invocation, a screen).
///
/// Clones refer to the same mount.
#[derive(Debug, Clone)]
pub struct Mount {
    id: MountId,
    mounted: Arc<AtomicBool>,
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Mount {
    pub fn new() -> Self {
        Self {
            id: NEXT_MOUNT_ID.fetch_add(1, Ordering::Relaxed),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> MountId {
        self.id
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// Nothing stored at mount time.
    NoSession,
    /// A stored session could not be resolved and was cleared.
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Resolving,
    Authenticated(User),
    Unauthenticated(UnauthenticatedReason),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Where the consumer must navigate; every unauthenticated outcome goes to login.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            SessionState::Unauthenticated(_) => Some(Route::Login),
            _ => None,
        }
    }
}

/// The only claim read locally.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Read the `exp` claim without verifying the signature.
///
/// The client never holds the signing key; the backend verifies on use.
/// Returns `None` for anything that is not a decodable JWT with `exp`.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims.exp)
}

/// Expired means `exp` is not strictly in the future.
pub fn is_expired(token: &str, now: i64) -> bool {
    token_expiry(token).map_or(true, |exp| exp <= now)
}

/// Shared resolution for one mount, tied to that mount's lifetime flag.
struct InFlight {
    mounted: Arc<AtomicBool>,
    cell: Arc<OnceCell<SessionState>>,
}

/// Resolves the session once per mount and publishes the outcome.
pub struct SessionBootstrapper {
    api: ApiClient,
    store: TokenStore,
    notices: Arc<dyn NoticeSink>,
    in_flight: DashMap<MountId, InFlight>,
    state: watch::Sender<SessionState>,
}

impl SessionBootstrapper {
    pub fn new(api: ApiClient, store: TokenStore, notices: Arc<dyn NoticeSink>) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            api,
            store,
            notices,
            in_flight: DashMap::new(),
            state,
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Resolve the session for `mount`.
    ///
    /// Returns `None` when the mount was dropped before the result arrived.
    /// Repeated and concurrent calls for one mount share a single resolution.
    pub async fn resolve(&self, mount: &Mount) -> Option<SessionState> {
        self.in_flight.retain(|_, entry| entry.mounted.load(Ordering::Acquire));
        if !mount.is_mounted() {
            return None;
        }

        let cell = self
            .in_flight
            .entry(mount.id())
            .or_insert_with(|| InFlight {
                mounted: mount.mounted.clone(),
                cell: Arc::new(OnceCell::new()),
            })
            .cell
            .clone();

        let state = cell.get_or_init(|| self.run(mount)).await.clone();

        if !mount.is_mounted() {
            tracing::debug!(mount = mount.id(), "Discarding session result for unmounted view");
            self.in_flight.remove(&mount.id());
            return None;
        }
        Some(state)
    }

    /// Resolve and hand back an [`AuthSession`] for authenticated calls.
    pub async fn session(&self, mount: &Mount) -> Result<AuthSession> {
        match self.resolve(mount).await {
            Some(SessionState::Authenticated(user)) => {
                let token = self.store.get().ok_or(ClientError::SessionExpired)?;
                Ok(AuthSession::new(
                    user,
                    token,
                    self.store.clone(),
                    self.notices.clone(),
                ))
            }
            Some(SessionState::Unauthenticated(UnauthenticatedReason::SessionExpired)) => {
                Err(ClientError::SessionExpired)
            }
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    /// Forget the cached outcome for a mount that is still mounted.
    pub fn release(&self, mount: &Mount) {
        self.in_flight.remove(&mount.id());
    }

    async fn run(&self, mount: &Mount) -> SessionState {
        let Some((tokens, persistence)) = self.store.load() else {
            tracing::debug!("No stored session");
            return self.finish(
                mount,
                SessionState::Unauthenticated(UnauthenticatedReason::NoSession),
            );
        };

        self.publish(mount, SessionState::Resolving);

        let StoredTokens {
            access: mut access,
            refresh: refresh_token,
        } = tokens;
        let mut refreshed = false;

        loop {
            if !is_expired(&access, now_unix()) {
                return match self.api.me(&access).await {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Session resolved");
                        self.finish(mount, SessionState::Authenticated(user))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to fetch current user");
                        self.force_logout(mount)
                    }
                };
            }

            if refreshed {
                tracing::warn!("Refreshed access token is already expired");
                return self.force_logout(mount);
            }

            let Some(refresh) = refresh_token.as_deref() else {
                tracing::info!("Access token expired and no refresh token stored");
                return self.force_logout(mount);
            };

            match self.api.refresh(refresh).await {
                Ok(response) => {
                    let next = StoredTokens::new(
                        response.access,
                        response.refresh.or_else(|| refresh_token.clone()),
                    );
                    if let Err(e) = self.store.set(&next, persistence) {
                        tracing::warn!(error = %e, "Failed to persist refreshed token");
                    }
                    tracing::info!(?persistence, "Access token refreshed");
                    access = next.access;
                    refreshed = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Token refresh rejected");
                    return self.force_logout(mount);
                }
            }
        }
    }

    /// Clear both tiers and report a forced logout.
    fn force_logout(&self, mount: &Mount) -> SessionState {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        if mount.is_mounted() {
            self.notices.push(Notice::error(SESSION_EXPIRED_MESSAGE));
        }
        self.finish(
            mount,
            SessionState::Unauthenticated(UnauthenticatedReason::SessionExpired),
        )
    }

    fn finish(&self, mount: &Mount, state: SessionState) -> SessionState {
        self.publish(mount, state.clone());
        state
    }

    fn publish(&self, mount: &Mount, state: SessionState) {
        if mount.is_mounted() {
            self.state.send_replace(state);
        }
    }
}
