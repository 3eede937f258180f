use gpui::*;
use gpui_component::{
    ActiveTheme,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};

use crate::widget::bubble::emoji_grid_rows;
use crate::widget::events::StickerPicked;

/// Grid of sticker glyphs shown above the composer.
pub struct EmojiPicker {
    palette: Vec<String>,
}

impl EventEmitter<StickerPicked> for EmojiPicker {}

impl EmojiPicker {
    pub fn new(palette: Vec<String>) -> Self {
        Self { palette }
    }

    fn pick(&mut self, index: usize, cx: &mut Context<Self>) {
        let Some(glyph) = self.palette.get(index).cloned() else {
            return;
        };
        cx.emit(StickerPicked { glyph });
    }
}

impl Render for EmojiPicker {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let rows = emoji_grid_rows(&self.palette);
        let mut offset = 0;
        let mut grid = v_flex().gap_2();

        for row in rows {
            let mut cells = h_flex().gap_2();
            for (column, glyph) in row.iter().enumerate() {
                let index = offset + column;
                cells = cells.child(
                    Button::new(format!("repli-emoji-{index}"))
                        .ghost()
                        .tooltip(format!("Send {glyph} emoji"))
                        .child(div().text_2xl().child(glyph.clone()))
                        .on_click(cx.listener(move |this, _, _window, cx| {
                            this.pick(index, cx);
                        })),
                );
            }
            offset += row.len();
            grid = grid.child(cells);
        }

        div()
            .id("repli-emoji-picker")
            .p_2()
            .rounded_lg()
            .shadow_lg()
            .bg(theme.muted)
            .border_1()
            .border_color(theme.border)
            .child(grid)
    }
}
