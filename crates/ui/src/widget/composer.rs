use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::widget::events::{DraftSubmitted, EmojiPickerToggleClicked};

/// Single-line text box with the sticker toggle and send button.
pub struct Composer {
    input_state: Entity<InputState>,
}

impl EventEmitter<DraftSubmitted> for Composer {}
impl EventEmitter<EmojiPickerToggleClicked> for Composer {}

impl Composer {
    pub fn new(placeholder: impl Into<SharedString>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let placeholder = placeholder.into();
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder(placeholder)
                .clean_on_escape()
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, _window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(cx);
                }
            },
        )
        .detach();

        Self { input_state }
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        let content = self.input_state.read(cx).value().to_string();
        cx.emit(DraftSubmitted::new(content));
    }
}

impl Render for Composer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("repli-composer")
            .w_full()
            .gap_2()
            .p_4()
            .items_center()
            .bg(theme.muted)
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .px_3()
                    .py_1()
                    .rounded_full()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .child(Input::new(&self.input_state).w_full()),
            )
            .child(
                Button::new("repli-emoji-toggle")
                    .ghost()
                    .small()
                    .tooltip("Open emoji picker")
                    .child("😊")
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(EmojiPickerToggleClicked);
                    })),
            )
            .child(
                Button::new("repli-send")
                    .primary()
                    .small()
                    .icon(IconName::ArrowUp)
                    .tooltip("Send message")
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.handle_submit(cx);
                    })),
            )
    }
}
