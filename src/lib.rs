// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CuraPets: client for the CuraPets veterinary booking backend
//!
//! This crate provides the session handling, forms and typed API access
//! used by the `curapets` command-line client.

pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod notices;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use error::Result;
use notices::NoticeSink;
use services::{ApiClient, AuthService, MediaUploader, SessionBootstrapper};
use std::sync::Arc;
use storage::TokenStore;

/// Shared client state, built once and passed explicitly.
pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub store: TokenStore,
    pub notices: Arc<dyn NoticeSink>,
    pub auth: AuthService,
    pub media: MediaUploader,
    pub session: SessionBootstrapper,
}

impl App {
    pub fn new(config: Config, store: TokenStore, notices: Arc<dyn NoticeSink>) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let auth = AuthService::new(api.clone(), store.clone(), notices.clone());
        let media = MediaUploader::new(api.clone(), &config);
        let session = SessionBootstrapper::new(api.clone(), store.clone(), notices.clone());

        Ok(Self {
            config,
            api,
            store,
            notices,
            auth,
            media,
            session,
        })
    }
}
