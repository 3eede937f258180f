use std::collections::HashMap;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex, v_flex,
};
use repli_widget::{ChatWidget, MessageId, PendingReply, WidgetConfig};

use crate::widget::bubble::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::widget::events::{DraftSubmitted, EmojiPickerToggleClicked, StickerPicked};
use crate::widget::{Composer, EmojiPicker, MessageList};

/// Distance between the composer top edge and the sticker grid.
const EMOJI_PICKER_BOTTOM_OFFSET: Pixels = px(64.);

/// Renders one [`ChatWidget`] as a launcher button or an open chat panel.
///
/// Reply timers run on the GPUI executor. Each pending reply keeps its task here,
/// keyed by trigger id, so dropping the view cancels every outstanding reply.
pub struct ChatWidgetView {
    widget: ChatWidget,
    message_list: Entity<MessageList>,
    composer: Entity<Composer>,
    emoji_picker: Entity<EmojiPicker>,
    reply_tasks: HashMap<MessageId, Task<()>>,
}

impl ChatWidgetView {
    pub fn new(config: WidgetConfig, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let widget = ChatWidget::new(config);
        let message_list = cx.new(MessageList::new);
        let placeholder = widget.config().placeholder.clone();
        let composer = cx.new(|cx| Composer::new(placeholder, window, cx));
        let palette = widget.config().emoji_palette.clone();
        let emoji_picker = cx.new(|_| EmojiPicker::new(palette));

        cx.subscribe_in(
            &composer,
            window,
            |this, _, event: &DraftSubmitted, window, cx| {
                this.handle_draft_submitted(event, window, cx);
            },
        )
        .detach();

        cx.subscribe(&composer, |this, _, _event: &EmojiPickerToggleClicked, cx| {
            this.toggle_emoji_picker(cx);
        })
        .detach();

        cx.subscribe(&emoji_picker, |this, _, event: &StickerPicked, cx| {
            this.send_sticker(event.glyph.clone(), cx);
        })
        .detach();

        Self {
            widget,
            message_list,
            composer,
            emoji_picker,
            reply_tasks: HashMap::new(),
        }
    }

    pub fn widget(&self) -> &ChatWidget {
        &self.widget
    }

    pub fn open(&mut self, cx: &mut Context<Self>) {
        if self.widget.open() {
            cx.notify();
        }
    }

    /// Hides the panel; replies already scheduled still arrive.
    pub fn close(&mut self, cx: &mut Context<Self>) {
        if self.widget.close() {
            cx.notify();
        }
    }

    pub fn toggle(&mut self, cx: &mut Context<Self>) {
        self.widget.toggle_open();
        cx.notify();
    }

    pub fn toggle_emoji_picker(&mut self, cx: &mut Context<Self>) {
        self.widget.toggle_emoji_picker();
        cx.notify();
    }

    pub fn send_sticker(&mut self, glyph: String, cx: &mut Context<Self>) {
        let pending = self.widget.send_sticker(glyph);
        self.schedule_reply(pending, cx);
        self.sync_message_list(cx);
    }

    fn handle_draft_submitted(
        &mut self,
        event: &DraftSubmitted,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.widget.set_draft(event.content.clone());
        let Some(pending) = self.widget.submit_draft() else {
            return;
        };

        self.composer
            .update(cx, |composer, cx| composer.clear(window, cx));
        self.schedule_reply(pending, cx);
        self.sync_message_list(cx);
    }

    fn schedule_reply(&mut self, pending: PendingReply, cx: &mut Context<Self>) {
        let trigger = pending.trigger;
        let task = cx.spawn(async move |this, cx| {
            cx.background_executor().timer(pending.delay).await;

            let _ = this.update(cx, |this, cx| {
                this.deliver_reply(trigger, cx);
            });
        });
        self.reply_tasks.insert(trigger, task);
    }

    fn deliver_reply(&mut self, trigger: MessageId, cx: &mut Context<Self>) {
        self.reply_tasks.remove(&trigger);
        if self.widget.complete_reply(trigger).is_none() {
            return;
        }
        self.sync_message_list(cx);
    }

    fn sync_message_list(&mut self, cx: &mut Context<Self>) {
        let scroll_to_latest = self.widget.take_scroll_request();
        let typing = self.widget.is_typing();
        let messages = self.widget.messages();

        self.message_list.update(cx, |list, cx| {
            list.set_messages(messages, typing, scroll_to_latest, cx);
        });
        cx.notify();
    }

    fn render_launcher(&self, cx: &Context<Self>) -> AnyElement {
        Button::new("repli-launcher")
            .primary()
            .large()
            .tooltip("Open chat")
            .child("Chat")
            .on_click(cx.listener(|this, _, _window, cx| {
                this.open(cx);
            }))
            .into_any_element()
    }

    fn render_panel(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let title = self.widget.config().title.clone();
        let show_emoji_picker = self.widget.show_emoji_picker();

        v_flex()
            .id("repli-panel")
            .relative()
            .w(PANEL_WIDTH)
            .h(PANEL_HEIGHT)
            .rounded_lg()
            .shadow_xl()
            .overflow_hidden()
            .border_1()
            .border_color(theme.primary)
            .bg(theme.background)
            .child(
                h_flex()
                    .id("repli-panel-header")
                    .flex_shrink_0()
                    .p_4()
                    .justify_between()
                    .items_center()
                    .bg(theme.muted)
                    .child(
                        div()
                            .text_lg()
                            .font_weight(FontWeight::BOLD)
                            .text_color(theme.primary)
                            .child(title),
                    )
                    .child(
                        Button::new("repli-close")
                            .ghost()
                            .small()
                            .icon(IconName::CircleX)
                            .tooltip("Close chat")
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.close(cx);
                            })),
                    ),
            )
            .child(
                div()
                    .id("repli-panel-messages")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("repli-panel-composer")
                    .flex_shrink_0()
                    .w_full()
                    .child(self.composer.clone()),
            )
            .when(show_emoji_picker, |panel| {
                panel.child(
                    div()
                        .absolute()
                        .bottom(EMOJI_PICKER_BOTTOM_OFFSET)
                        .right_0()
                        .child(self.emoji_picker.clone()),
                )
            })
            .into_any_element()
    }
}

impl Render for ChatWidgetView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        // Launcher and panel are mutually exclusive.
        if self.widget.is_open() {
            self.render_panel(cx)
        } else {
            self.render_launcher(cx)
        }
    }
}
