// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local session storage.

pub mod token_store;

pub use token_store::{FileTier, MemoryTier, Persistence, StoredTokens, TokenStore, TokenTier};
