use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, h_flex, label::Label, v_flex};
use repli_widget::Message;

use crate::widget::bubble::{BUBBLE_MAX_WIDTH_RATIO, BubbleAlignment, BubbleLayout, BubbleTone};
use crate::widget::scroll_manager::ScrollManager;

const TYPING_DOT_SIZE: Pixels = px(8.);
const TYPING_DOT_COUNT: usize = 3;

/// Scrollable message log with the typing indicator at its tail.
pub struct MessageList {
    messages: Vec<Message>,
    typing: bool,
    scroll_manager: ScrollManager,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            messages: Vec::new(),
            typing: false,
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replaces the rendered log. `scroll_to_latest` jumps to the newest message.
    pub fn set_messages(
        &mut self,
        messages: &[Message],
        typing: bool,
        scroll_to_latest: bool,
        cx: &mut Context<Self>,
    ) {
        self.messages = messages.to_vec();
        self.typing = typing;

        if scroll_to_latest {
            self.scroll_manager.request_scroll_to_bottom();
        }

        cx.notify();
    }

    fn render_message_row(&self, message: &Message, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let layout = BubbleLayout::for_message(message);
        let (background, foreground) = match layout.tone {
            BubbleTone::Accent => (theme.primary, theme.primary_foreground),
            BubbleTone::Muted => (theme.secondary, theme.secondary_foreground),
        };

        h_flex()
            .id(ElementId::Name(SharedString::from(format!(
                "repli-message-{}",
                message.id
            ))))
            .w_full()
            .map(|row| match layout.alignment {
                BubbleAlignment::End => row.justify_end(),
                BubbleAlignment::Start => row.justify_start(),
            })
            .child(
                v_flex()
                    .max_w(relative(BUBBLE_MAX_WIDTH_RATIO))
                    .px_3()
                    .py_2()
                    .rounded_2xl()
                    .bg(background)
                    .text_color(foreground)
                    .child(div().text_size(layout.body_size).child(layout.body))
                    .child(
                        Label::new(layout.time_label)
                            .text_xs()
                            .text_color(theme.muted_foreground),
                    ),
            )
            .into_any_element()
    }

    fn render_typing_indicator(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        h_flex()
            .id("repli-typing-indicator")
            .w_full()
            .justify_start()
            .child(
                h_flex()
                    .gap_1()
                    .px_3()
                    .py_3()
                    .rounded_full()
                    .bg(theme.secondary)
                    .children((0..TYPING_DOT_COUNT).map(|_| {
                        div()
                            .size(TYPING_DOT_SIZE)
                            .rounded_full()
                            .bg(theme.primary)
                    })),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        let rows = self
            .messages
            .iter()
            .map(|message| self.render_message_row(message, cx))
            .collect::<Vec<_>>();
        let typing_indicator = self.typing.then(|| self.render_typing_indicator(cx));

        div()
            .id("repli-message-list")
            .size_full()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .child(
                v_flex()
                    .w_full()
                    .gap_4()
                    .p_4()
                    .children(rows)
                    .when_some(typing_indicator, |column, indicator| column.child(indicator)),
            )
    }
}
