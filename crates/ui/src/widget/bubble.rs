use gpui::{Pixels, px};
use repli_widget::{Message, MessageContent, Sender};

pub const PANEL_WIDTH: Pixels = px(384.);
pub const PANEL_HEIGHT: Pixels = px(448.);
/// Bubbles take at most this share of the list width.
pub const BUBBLE_MAX_WIDTH_RATIO: f32 = 0.7;
pub const TEXT_SIZE: Pixels = px(14.);
pub const STICKER_SIZE: Pixels = px(36.);
pub const EMOJI_GRID_COLUMNS: usize = 5;

/// Which edge of the list a bubble hugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleAlignment {
    Start,
    End,
}

/// Color role of a bubble, resolved against the active theme at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleTone {
    Accent,
    Muted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleLayout {
    pub alignment: BubbleAlignment,
    pub tone: BubbleTone,
    pub body: String,
    pub body_size: Pixels,
    pub time_label: String,
}

impl BubbleLayout {
    pub fn for_message(message: &Message) -> Self {
        let (alignment, tone) = match message.sender {
            Sender::User => (BubbleAlignment::End, BubbleTone::Accent),
            Sender::Bot => (BubbleAlignment::Start, BubbleTone::Muted),
        };
        let (body, body_size) = match &message.content {
            MessageContent::Text(text) => (text.clone(), TEXT_SIZE),
            MessageContent::Sticker(glyph) => (glyph.clone(), STICKER_SIZE),
        };

        Self {
            alignment,
            tone,
            body,
            body_size,
            time_label: message.clock_label(),
        }
    }
}

/// Splits the palette into rows of the sticker grid.
pub fn emoji_grid_rows(palette: &[String]) -> Vec<&[String]> {
    palette.chunks(EMOJI_GRID_COLUMNS).collect()
}
