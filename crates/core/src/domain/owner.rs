use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tenant-scoping identifier. Every customer and campaign belongs to exactly one owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("owner identifier must not be blank")]
pub struct BlankOwnerId;

impl OwnerId {
    pub fn parse(raw: &str) -> Result<Self, BlankOwnerId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BlankOwnerId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OwnerId {
    type Error = BlankOwnerId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
