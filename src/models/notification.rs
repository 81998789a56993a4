// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification model (REST list and socket pushes share the shape).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Notification {
    /// One-line summary, e.g. "Ada Obi booked appointment for Buddy".
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(actor) = self.actor.as_deref().filter(|a| !a.is_empty()) {
            parts.push(actor);
        }
        if !self.verb.is_empty() {
            parts.push(self.verb.as_str());
        }
        let mut line = parts.join(" ");
        if let Some(target) = self.target.as_deref().filter(|t| !t.is_empty()) {
            line.push_str(&format!(" for {}", target));
        }
        line
    }
}
