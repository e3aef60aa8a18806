use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::protocol::constants::{MAX_TOPIC_LEN, TOPIC_DISPLAY_LEN};

/// Topic listed by the catalogue endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Topic {
    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Topic {
    /// Name shortened for list display
    pub fn display_name(&self) -> String {
        if self.name.chars().count() > TOPIC_DISPLAY_LEN {
            let head: String = self.name.chars().take(TOPIC_DISPLAY_LEN).collect();
            format!("{}...", head)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicList {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Serialize)]
pub struct SearchQuery<'a> {
    pub search_text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateTopicBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTopicResponse {
    pub is_created: bool,
}

/// Trim and validate a new topic name
pub fn normalize_topic_name(name: &str) -> Result<&str> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_TOPIC_LEN {
        return Err(Error::validation(format!(
            "Topic name must be 1..={} characters, got {}",
            MAX_TOPIC_LEN, len
        )));
    }
    Ok(name)
}
