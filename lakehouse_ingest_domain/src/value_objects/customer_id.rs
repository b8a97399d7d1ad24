use serde::{Deserialize, Serialize};
use std::fmt;

/// A tenant identifier. Every persisted row, node, and edge in the
/// lakehouse carries one so customer data never crosses tenant boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
