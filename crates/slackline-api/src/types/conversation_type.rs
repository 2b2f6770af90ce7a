use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Conversation kind filter accepted by `conversations.list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    PublicChannel,
    PrivateChannel,
    Im,
    Mpim,
}

impl ConversationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationType::PublicChannel => "public_channel",
            ConversationType::PrivateChannel => "private_channel",
            ConversationType::Im => "im",
            ConversationType::Mpim => "mpim",
        }
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public_channel" => Ok(ConversationType::PublicChannel),
            "private_channel" => Ok(ConversationType::PrivateChannel),
            "im" => Ok(ConversationType::Im),
            "mpim" => Ok(ConversationType::Mpim),
            other => Err(ApiError::InvalidArgument(format!(
                "unknown conversation type '{}' (expected public_channel, private_channel, im or mpim)",
                other
            ))),
        }
    }
}

/// An ordered, duplicate-free set of conversation types. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTypes(Vec<ConversationType>);

impl ConversationTypes {
    pub fn new(types: impl IntoIterator<Item = ConversationType>) -> Self {
        let mut unique = Vec::new();
        for kind in types {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        if unique.is_empty() {
            return Self::default();
        }
        Self(unique)
    }

    /// Public and private channels, the listing used for cross-channel views.
    pub fn channels() -> Self {
        Self(vec![
            ConversationType::PublicChannel,
            ConversationType::PrivateChannel,
        ])
    }

    /// Parse a comma-separated filter such as `" public_channel , im "`.
    ///
    /// Blank entries are dropped, duplicates keep their first position and an
    /// empty list falls back to `public_channel`.
    pub fn parse(text: &str) -> Result<Self, ApiError> {
        let parsed = text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ConversationType::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parsed))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationType> {
        self.0.iter()
    }

    pub fn contains(&self, kind: ConversationType) -> bool {
        self.0.contains(&kind)
    }
}

impl Default for ConversationTypes {
    fn default() -> Self {
        Self(vec![ConversationType::PublicChannel])
    }
}

impl From<ConversationType> for ConversationTypes {
    fn from(kind: ConversationType) -> Self {
        Self(vec![kind])
    }
}

impl FromStr for ConversationTypes {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConversationTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ConversationType::as_str)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}
