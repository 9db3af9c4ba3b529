//! Shared domain value types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Store-assigned post identifier. Ids grow monotonically and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PostId {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(DomainError::validation("post id must not be empty"));
        }
        raw.parse::<i64>()
            .map(Self)
            .map_err(|err| DomainError::validation(format!("post id `{raw}` is not an integer: {err}")))
    }
}

/// What happened to a post, carried by every change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostAction {
    Create,
    Update,
    Delete,
}

impl PostAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PostAction::Create => "create",
            PostAction::Update => "update",
            PostAction::Delete => "delete",
        }
    }
}

impl fmt::Display for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
