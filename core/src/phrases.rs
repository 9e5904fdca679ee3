//! Related-text dictionary.
//!
//! Maps a committed text to a string of characters that commonly follow it
//! (`"中" -> "國文心"`). The related-text add-on offers them as candidates
//! right after a commit.
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseBook {
    entries: AHashMap<String, String>,
}

impl PhraseBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append follow-up characters for `text`.
    pub fn insert<K: Into<String>, V: AsRef<str>>(&mut self, text: K, related: V) {
        self.entries
            .entry(text.into())
            .or_default()
            .push_str(related.as_ref());
    }

    /// Follow-up characters for `text`, if any.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.entries.get(text).map(String::as_str).filter(|s| !s.is_empty())
    }

    /// Parse a JSON object of `text -> related characters`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
