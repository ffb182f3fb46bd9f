//! Stable identity of a singleton service

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable name identifying a singleton service instance.
///
/// Used for dispatch addressing and log lines. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct ServiceId {
    name: String,
}

impl ServiceId {
    /// Create a service identity from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Get the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for ServiceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
