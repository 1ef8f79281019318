//! Note model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a note.
///
/// Assigned by the caller, usually derived from the creation time in
/// milliseconds, never by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteId(pub i64);

impl NoteId {
    /// Get the raw integer value of this ID
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Caller-assigned identifier
    pub id: NoteId,
    /// Plain text content
    pub content: String,
    /// Creation timestamp (Unix ms)
    pub created_time: i64,
    /// Last modification timestamp (Unix ms); the recency signal for merges
    pub modified_time: i64,
    /// Tag names attached to this note
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form user properties
    #[serde(default)]
    pub custom_properties: BTreeMap<String, String>,
    /// Soft delete flag (recycle bin)
    #[serde(default)]
    pub deleted: bool,
}

impl Note {
    /// Create a new note with the given id, stamped with the current time
    #[must_use]
    pub fn new(id: NoteId, content: impl Into<String>) -> Self {
        let now = crate::util::unix_millis_now();
        Self {
            id,
            content: content.into(),
            created_time: now,
            modified_time: now,
            tags: Vec::new(),
            custom_properties: BTreeMap::new(),
            deleted: false,
        }
    }

    /// Attach tag names, replacing any existing ones
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Get first line as title preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

/// Parse a stored property document.
///
/// Empty or malformed documents yield an empty map so that one bad row never
/// fails a whole read or merge.
pub fn parse_properties(raw: Option<&str>) -> BTreeMap<String, String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return BTreeMap::new();
    };

    match serde_json::from_str(raw) {
        Ok(properties) => properties,
        Err(error) => {
            tracing::warn!("Ignoring malformed custom properties: {error}");
            BTreeMap::new()
        }
    }
}

/// Serialize properties as a compact JSON object.
pub fn serialize_properties(properties: &BTreeMap<String, String>) -> String {
    serde_json::to_string(properties).unwrap_or_else(|_| "{}".to_string())
}
