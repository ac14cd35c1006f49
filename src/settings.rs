use serde::{Deserialize, Serialize};

use crate::joker::WiiLayout;
use crate::statics;

/// User preferences the parser and resolver consult. Passed in explicitly by
/// the caller; nothing in the crate keeps its own copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Layout used for `[Joker:Wii]` tags that do not name one.
    pub wii_layout: WiiLayout,
    /// Invert joker masks by default (PS2/Wii only).
    pub reverse_joker: bool,
    /// Popup notes the user asked not to see again.
    pub dismissed_popups: Vec<String>,
    /// Joiner used when a group collects more than one note.
    pub note_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wii_layout: WiiLayout::default(),
            reverse_joker: false,
            dismissed_popups: Vec::new(),
            note_separator: statics::NOTE_SEPARATOR_HTML.to_string(),
        }
    }
}

impl Settings {
    pub fn is_dismissed(&self, popup: &str) -> bool {
        self.dismissed_popups.iter().any(|p| p == popup)
    }

    pub fn dismiss(&mut self, popup: &str) {
        if !self.is_dismissed(popup) {
            self.dismissed_popups.push(popup.to_string());
        }
    }
}
