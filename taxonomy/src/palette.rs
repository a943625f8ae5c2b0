//! Static color table for main emotions.
//!
//! Marker icons and chart segments are colored by main emotion. The table is
//! declared here rather than probed from the styling layer at runtime, so the
//! core has no dependency on CSS.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Fallback color for emotions outside the table.
pub const FALLBACK_COLOR: &str = "#999999";

/// The production colors, keyed by main emotion.
const DEFAULT_COLORS: [(&str, &str); 7] = [
    ("happy", "#FFD700"),
    ("sad", "#4682B4"),
    ("angry", "#FF4500"),
    ("surprised", "#FFA500"),
    ("disgusted", "#32CD32"),
    ("fearful", "#9932CC"),
    ("tired", "#A9A9A9"),
];

/// Color table keyed by main-emotion name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EmotionPalette {
    /// main emotion → hex color
    colors: HashMap<String, String>,
    /// Color for emotions outside the table
    fallback: String,
}

impl EmotionPalette {
    /// Create an empty palette with the standard fallback.
    pub fn new() -> Self {
        Self {
            colors: HashMap::new(),
            fallback: FALLBACK_COLOR.to_string(),
        }
    }

    /// Builder: assign a color to a main emotion.
    pub fn with_color(mut self, main: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(main.into(), color.into());
        self
    }

    /// Builder: set the fallback color.
    pub fn with_fallback(mut self, color: impl Into<String>) -> Self {
        self.fallback = color.into();
        self
    }

    /// Look up the color for a main emotion.
    ///
    /// The historical "bad" bucket predates the current wheel and reuses the
    /// tired color. Anything else outside the table gets the fallback.
    pub fn color_of(&self, main: &str) -> &str {
        let key = if main == "bad" { "tired" } else { main };
        self.colors
            .get(key)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

impl Default for EmotionPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS
                .iter()
                .map(|&(main, color)| (main.to_string(), color.to_string()))
                .collect(),
            fallback: FALLBACK_COLOR.to_string(),
        }
    }
}
