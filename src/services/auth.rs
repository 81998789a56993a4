// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, signup and logout flows, plus the authenticated-call guard.

use crate::error::{ClientError, Result, SESSION_EXPIRED_MESSAGE};
use crate::models::{LoginForm, Role, SignupForm, User};
use crate::notices::{Notice, NoticeSink};
use crate::services::api::ApiClient;
use crate::storage::{Persistence, StoredTokens, TokenStore};
use std::sync::Arc;

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub role: Option<Role>,
    pub persistence: Persistence,
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    store: TokenStore,
    notices: Arc<dyn NoticeSink>,
}

impl AuthService {
    pub fn new(api: ApiClient, store: TokenStore, notices: Arc<dyn NoticeSink>) -> Self {
        Self { api, store, notices }
    }

    /// Validate, authenticate and store the tokens in the tier picked by
    /// the form's "remember me" flag.
    pub async fn login(&self, form: &LoginForm) -> Result<LoginOutcome> {
        let errors = form.validate_fields();
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }

        let response = match self.api.login(form).await {
            Ok(response) => response,
            // Wrong credentials come back as 401; that is not a session problem
            Err(ClientError::Unauthorized) => {
                return Err(ClientError::Api {
                    status: 401,
                    message: "Invalid email or password".to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let persistence = Persistence::from_remember(form.remember);
        self.store
            .set(&StoredTokens::new(response.access, response.refresh), persistence)?;

        tracing::info!(?persistence, role = ?response.role, "Logged in");
        self.notices.push(Notice::success("Login successful"));

        Ok(LoginOutcome {
            role: response.role,
            persistence,
        })
    }

    /// Validate and create an account. Does not log in.
    pub async fn signup(&self, form: &SignupForm) -> Result<()> {
        let errors = form.validate_fields();
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }

        self.api.signup(form).await?;
        tracing::info!(role = form.role.as_str(), "Account created");
        self.notices
            .push(Notice::success("Account created. Please log in."));
        Ok(())
    }

    /// Drop the stored session from both tiers.
    pub fn logout(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Logged out");
        self.notices.push(Notice::info("Logged out"));
        Ok(())
    }
}

/// An authenticated session for role-gated calls.
///
/// Obtained from [`crate::services::session::SessionBootstrapper::session`].
#[derive(Clone)]
pub struct AuthSession {
    user: User,
    token: String,
    store: TokenStore,
    notices: Arc<dyn NoticeSink>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.id)
            .field("role", &self.user.role)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    pub fn new(user: User, token: String, store: TokenStore, notices: Arc<dyn NoticeSink>) -> Self {
        Self {
            user,
            token,
            store,
            notices,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Pass a dependent call's result through, forcing a logout on 401.
    ///
    /// A rejected token clears both tiers and pushes the session-expired
    /// notice; the caller then redirects to login. The error is returned as
    /// [`ClientError::SessionExpired`].
    pub fn guard<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Err(ClientError::Unauthorized) => {
                tracing::warn!(user_id = %self.user.id, "Backend rejected session token");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "Failed to clear stored session");
                }
                self.notices.push(Notice::error(SESSION_EXPIRED_MESSAGE));
                Err(ClientError::SessionExpired)
            }
            other => other,
        }
    }
}
