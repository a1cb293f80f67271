//! Subscription context identity, backed by a UUID.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque identity of a subscriber context.
///
/// The bus deduplicates subscriptions by the full (topic, context, callback)
/// triple, so two subscribers sharing a callback are still distinguished by
/// their context key. Identity semantics, not value semantics: a key compares
/// equal only to copies of itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextKey(uuid::Uuid);

impl Default for ContextKey {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl ContextKey {
    /// Generate a new unique context key.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ContextKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}
