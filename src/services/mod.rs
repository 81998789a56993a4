// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access and session orchestration.

pub mod api;
pub mod auth;
pub mod media;
pub mod notifications;
pub mod session;

pub use api::ApiClient;
pub use auth::{AuthService, AuthSession, LoginOutcome};
pub use media::{MediaUploader, UploadSignature, CERTIFICATE_FOLDER};
pub use notifications::NotificationStream;
pub use session::{Mount, SessionBootstrapper, SessionState, UnauthenticatedReason};
