use std::time::Duration;

use crate::config::WidgetConfig;
use crate::message::{Message, MessageId};

/// A bot reply that has been scheduled but not yet delivered.
///
/// Hosts own the timer; the widget only tracks which triggers are still owed a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingReply {
    pub trigger: MessageId,
    pub delay: Duration,
}

/// Typing lifecycle of one widget.
///
/// Every delivered reply returns the widget to `Idle`, even while other replies
/// are still outstanding; the next delivery appends its message all the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyPhase {
    #[default]
    Idle,
    AwaitingReply,
}

/// Ephemeral UI state of one widget instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    pub is_open: bool,
    pub messages: Vec<Message>,
    pub draft_input: String,
    pub is_typing: bool,
    pub show_emoji_picker: bool,
    pub pending_replies: Vec<PendingReply>,
    scroll_requested: bool,
}

impl WidgetState {
    pub fn phase(&self) -> ReplyPhase {
        if self.is_typing {
            ReplyPhase::AwaitingReply
        } else {
            ReplyPhase::Idle
        }
    }
}

/// Single owner of widget state and the simulated reply lifecycle.
///
/// Every mutation is synchronous. Operations that trigger a reply return the
/// [`PendingReply`] the caller must schedule and later hand back through
/// [`ChatWidget::complete_reply`].
#[derive(Debug, Clone)]
pub struct ChatWidget {
    config: WidgetConfig,
    state: WidgetState,
    next_message_id: u64,
}

impl ChatWidget {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config: config.normalized(),
            state: WidgetState::default(),
            next_message_id: 1,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_typing
    }

    /// Replies scheduled but not yet delivered or cancelled.
    pub fn outstanding_replies(&self) -> usize {
        self.state.pending_replies.len()
    }

    pub fn draft(&self) -> &str {
        &self.state.draft_input
    }

    pub fn show_emoji_picker(&self) -> bool {
        self.state.show_emoji_picker
    }

    pub fn open(&mut self) -> bool {
        self.set_open(true)
    }

    /// Hides the panel. Pending replies keep running.
    pub fn close(&mut self) -> bool {
        self.set_open(false)
    }

    pub fn toggle_open(&mut self) -> bool {
        let next = !self.state.is_open;
        self.set_open(next);
        next
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft_input = text.into();
    }

    pub fn toggle_emoji_picker(&mut self) -> bool {
        self.state.show_emoji_picker = !self.state.show_emoji_picker;
        tracing::debug!(visible = self.state.show_emoji_picker, "emoji picker toggled");
        self.state.show_emoji_picker
    }

    /// Appends a user text message unless `text` is blank.
    ///
    /// The stored content is the original text, not the trimmed one.
    pub fn submit_text(&mut self, text: impl Into<String>) -> Option<PendingReply> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }

        let id = self.alloc_message_id();
        self.push_message(Message::user_text(id, text));
        self.state.draft_input.clear();
        Some(self.simulate_reply(id))
    }

    pub fn submit_draft(&mut self) -> Option<PendingReply> {
        let draft = self.state.draft_input.clone();
        self.submit_text(draft)
    }

    pub fn send_sticker(&mut self, glyph: impl Into<String>) -> PendingReply {
        let id = self.alloc_message_id();
        self.push_message(Message::user_sticker(id, glyph));
        self.state.show_emoji_picker = false;
        self.simulate_reply(id)
    }

    /// Delivers the canned bot reply owed to `trigger` and clears typing.
    ///
    /// Returns the appended bot message id, or `None` when the trigger is no
    /// longer pending.
    pub fn complete_reply(&mut self, trigger: MessageId) -> Option<MessageId> {
        let position = self
            .state
            .pending_replies
            .iter()
            .position(|pending| pending.trigger == trigger)?;
        self.state.pending_replies.remove(position);
        self.state.is_typing = false;

        let id = self.alloc_message_id();
        let reply_text = self.config.reply_text.clone();
        self.push_message(Message::bot_text(id, reply_text));
        tracing::debug!(%trigger, reply = %id, outstanding = self.state.pending_replies.len(), "bot reply delivered");
        Some(id)
    }

    /// Drops every outstanding reply so late timers become no-ops.
    pub fn cancel_pending_replies(&mut self) -> Vec<PendingReply> {
        let cancelled = std::mem::take(&mut self.state.pending_replies);
        self.state.is_typing = false;
        if !cancelled.is_empty() {
            tracing::debug!(count = cancelled.len(), "pending replies cancelled");
        }
        cancelled
    }

    /// Returns true once after each change to the message sequence.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.state.scroll_requested)
    }

    fn simulate_reply(&mut self, trigger: MessageId) -> PendingReply {
        let pending = PendingReply {
            trigger,
            delay: self.config.reply_delay(),
        };
        self.state.pending_replies.push(pending);
        self.state.is_typing = true;
        tracing::debug!(%trigger, delay_ms = self.config.reply_delay_ms, "bot reply scheduled");
        pending
    }

    fn set_open(&mut self, open: bool) -> bool {
        let changed = self.state.is_open != open;
        self.state.is_open = open;
        if changed {
            tracing::debug!(open, "widget visibility changed");
        }
        changed
    }

    fn push_message(&mut self, message: Message) {
        self.state.messages.push(message);
        self.state.scroll_requested = true;
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new(WidgetConfig::default())
    }
}
