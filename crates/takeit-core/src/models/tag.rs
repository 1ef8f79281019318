//! Tag model

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Color given to tags that never had one assigned
pub const DEFAULT_TAG_COLOR: &str = "#6200EE";

/// Palette offered for new tags
pub const PRESET_COLORS: [&str; 10] = [
    "#6200EE", "#03DAC6", "#FF6200", "#FF5722", "#4CAF50", "#2196F3", "#9C27B0", "#F44336",
    "#795548", "#607D8B",
];

/// Store-assigned identifier of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(pub i64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for organizing notes; `name` is the natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    /// Unique, case-sensitive name
    pub name: String,
    /// Hex RGB color, e.g. `#4CAF50`
    pub color: String,
}

/// Pick a preset color for a new tag. The same name always gets the same color.
pub fn color_for_name(name: &str) -> &'static str {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    let index = usize::try_from(hasher.finish() % PRESET_COLORS.len() as u64).unwrap_or(0);
    PRESET_COLORS[index]
}

/// Black or white text color for a given `#RRGGBB` background.
///
/// Unparseable colors are treated as dark.
pub fn text_color(background: &str) -> &'static str {
    let hex = background.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
            .map_or(0.0, f64::from)
    };
    let brightness = 0.299f64.mul_add(
        channel(0..2),
        0.587f64.mul_add(channel(2..4), 0.114 * channel(4..6)),
    );

    if brightness > 128.0 {
        "#000000"
    } else {
        "#FFFFFF"
    }
}
