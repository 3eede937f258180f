/// Emitted when the user presses enter or the send button in the composer.
///
/// Blank drafts are still emitted; the widget decides whether they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSubmitted {
    pub content: String,
}

/// Emitted when the composer's emoji button is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiPickerToggleClicked;

/// Emitted when a glyph is chosen from the sticker grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerPicked {
    pub glyph: String,
}

impl DraftSubmitted {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}
