use serde::{Deserialize, Serialize};

/// A conversation as the directory sees it.
///
/// `id` is stable; `name` can change over time and is not unique historically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub is_member: bool,
}

impl ChannelRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            topic: String::new(),
            is_member: false,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn member(mut self, is_member: bool) -> Self {
        self.is_member = is_member;
        self
    }
}
