use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use snafu::ResultExt;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::config::WidgetConfig;
use crate::error::{MissingRuntimeSnafu, WidgetResult};
use crate::message::{Message, MessageId};
use crate::widget::{ChatWidget, PendingReply, WidgetState};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// State change notifications published by a [`WidgetSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    VisibilityChanged { open: bool },
    DraftChanged,
    EmojiPickerToggled { visible: bool },
    MessageAppended(Message),
    TypingChanged { typing: bool },
}

/// Cloneable async host that schedules reply timers on a tokio runtime.
///
/// Each pending reply owns one task keyed by its trigger id. Shutting down or
/// dropping the last handle aborts them all.
#[derive(Clone)]
pub struct WidgetSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    widget: Mutex<ChatWidget>,
    timers: Mutex<HashMap<MessageId, AbortHandle>>,
    events: broadcast::Sender<WidgetEvent>,
    runtime: Handle,
}

impl WidgetSession {
    /// Creates a session on the runtime of the calling context.
    pub fn new(config: WidgetConfig) -> WidgetResult<Self> {
        let runtime = Handle::try_current().context(MissingRuntimeSnafu {
            stage: "create-widget-session",
        })?;
        Ok(Self::with_handle(config, runtime))
    }

    pub fn with_handle(config: WidgetConfig, runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                widget: Mutex::new(ChatWidget::new(config)),
                timers: Mutex::new(HashMap::new()),
                events,
                runtime,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> WidgetState {
        lock(&self.inner.widget).state().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.inner.widget).messages().to_vec()
    }

    pub fn is_typing(&self) -> bool {
        lock(&self.inner.widget).is_typing()
    }

    pub fn open(&self) {
        if lock(&self.inner.widget).open() {
            self.inner.publish(WidgetEvent::VisibilityChanged { open: true });
        }
    }

    pub fn close(&self) {
        if lock(&self.inner.widget).close() {
            self.inner.publish(WidgetEvent::VisibilityChanged { open: false });
        }
    }

    pub fn toggle_emoji_picker(&self) {
        let visible = lock(&self.inner.widget).toggle_emoji_picker();
        self.inner.publish(WidgetEvent::EmojiPickerToggled { visible });
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.inner.widget).set_draft(text);
        self.inner.publish(WidgetEvent::DraftChanged);
    }

    /// Sends a text message. Blank text is ignored and returns `None`.
    pub fn submit_text(&self, text: impl Into<String>) -> Option<MessageId> {
        let (pending, message, was_typing, draft_cleared) = {
            let mut widget = lock(&self.inner.widget);
            let was_typing = widget.is_typing();
            let had_draft = !widget.draft().is_empty();
            let pending = widget.submit_text(text)?;
            (
                pending,
                widget.messages().last().cloned(),
                was_typing,
                had_draft,
            )
        };

        if draft_cleared {
            self.inner.publish(WidgetEvent::DraftChanged);
        }
        self.after_user_message(pending, message, was_typing);
        Some(pending.trigger)
    }

    pub fn submit_draft(&self) -> Option<MessageId> {
        let draft = lock(&self.inner.widget).draft().to_string();
        self.submit_text(draft)
    }

    pub fn send_sticker(&self, glyph: impl Into<String>) -> MessageId {
        let (pending, message, was_typing, picker_was_open) = {
            let mut widget = lock(&self.inner.widget);
            let was_typing = widget.is_typing();
            let picker_was_open = widget.show_emoji_picker();
            let pending = widget.send_sticker(glyph);
            (
                pending,
                widget.messages().last().cloned(),
                was_typing,
                picker_was_open,
            )
        };

        if picker_was_open {
            self.inner
                .publish(WidgetEvent::EmojiPickerToggled { visible: false });
        }
        self.after_user_message(pending, message, was_typing);
        pending.trigger
    }

    /// Number of reply timers still armed.
    pub fn pending_timers(&self) -> usize {
        lock(&self.inner.timers).len()
    }

    /// Cancels every outstanding reply. The session stays usable.
    pub fn shutdown(&self) {
        self.inner.cancel_all();
    }

    fn after_user_message(&self, pending: PendingReply, message: Option<Message>, was_typing: bool) {
        if let Some(message) = message {
            self.inner.publish(WidgetEvent::MessageAppended(message));
        }
        if !was_typing {
            self.inner.publish(WidgetEvent::TypingChanged { typing: true });
        }
        self.schedule(pending);
    }

    fn schedule(&self, pending: PendingReply) {
        let session = Arc::downgrade(&self.inner);
        // The deadline is fixed at scheduling time, not when the task first runs.
        let deadline = Instant::now() + pending.delay;
        let mut timers = lock(&self.inner.timers);
        let task = self
            .inner
            .runtime
            .spawn(deliver_at(session, pending.trigger, deadline));
        timers.insert(pending.trigger, task.abort_handle());
    }
}

async fn deliver_at(session: Weak<SessionInner>, trigger: MessageId, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;

    // A dropped session must never be revived by its own timers.
    if let Some(session) = session.upgrade() {
        session.deliver(trigger);
    }
}

impl SessionInner {
    fn deliver(&self, trigger: MessageId) {
        lock(&self.timers).remove(&trigger);

        let (message, was_typing) = {
            let mut widget = lock(&self.widget);
            let was_typing = widget.is_typing();
            let Some(reply_id) = widget.complete_reply(trigger) else {
                return;
            };
            let message = widget
                .messages()
                .iter()
                .rev()
                .find(|message| message.id == reply_id)
                .cloned();
            (message, was_typing)
        };

        if let Some(message) = message {
            self.publish(WidgetEvent::MessageAppended(message));
        }
        if was_typing {
            self.publish(WidgetEvent::TypingChanged { typing: false });
        }
    }

    fn cancel_all(&self) {
        let (cancelled, was_typing) = {
            let mut widget = lock(&self.widget);
            let was_typing = widget.is_typing();
            (widget.cancel_pending_replies(), was_typing)
        };
        let timers = std::mem::take(&mut *lock(&self.timers));
        for handle in timers.values() {
            handle.abort();
        }

        if !cancelled.is_empty() {
            tracing::info!(count = cancelled.len(), "widget session cancelled pending replies");
        }
        if was_typing {
            self.publish(WidgetEvent::TypingChanged { typing: false });
        }
    }

    fn publish(&self, event: WidgetEvent) {
        // No subscribers is a normal state for headless hosts.
        let _ = self.events.send(event);
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let timers = self
            .timers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for handle in timers.values() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DEFAULT_REPLY_TEXT;
    use crate::message::{MessageContent, Sender};

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_ms(millis: u64) {
        tokio::time::advance(Duration::from_millis(millis)).await;
        settle().await;
    }

    fn log(session: &WidgetSession) -> Vec<(Sender, MessageContent)> {
        session
            .messages()
            .into_iter()
            .map(|message| (message.sender, message.content))
            .collect()
    }

    fn canned() -> MessageContent {
        MessageContent::Text(DEFAULT_REPLY_TEXT.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn reply_lands_exactly_after_delay() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        session.open();
        session.submit_text("hi").expect("non-blank text");

        advance_ms(1999).await;
        assert!(session.is_typing());
        assert_eq!(session.messages().len(), 1);

        advance_ms(1).await;
        assert!(!session.is_typing());
        assert_eq!(
            log(&session),
            vec![
                (Sender::User, MessageContent::Text("hi".to_string())),
                (Sender::Bot, canned()),
            ]
        );
        assert_eq!(session.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_text_schedules_nothing() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");

        assert_eq!(session.submit_text(""), None);
        assert_eq!(session.submit_text("   "), None);

        advance_ms(5000).await;
        assert!(session.messages().is_empty());
        assert!(!session.is_typing());
        assert_eq!(session.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn quick_successive_sends_get_independent_replies() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        session.submit_text("first").expect("non-blank text");
        advance_ms(500).await;
        session.send_sticker("🚀");

        // Each reply ends typing 2000 ms after its own trigger.
        advance_ms(1500).await;
        assert_eq!(
            log(&session),
            vec![
                (Sender::User, MessageContent::Text("first".to_string())),
                (Sender::User, MessageContent::Sticker("🚀".to_string())),
                (Sender::Bot, canned()),
            ]
        );
        assert!(!session.is_typing());
        assert_eq!(session.pending_timers(), 1);

        advance_ms(500).await;
        assert_eq!(
            log(&session),
            vec![
                (Sender::User, MessageContent::Text("first".to_string())),
                (Sender::User, MessageContent::Sticker("🚀".to_string())),
                (Sender::Bot, canned()),
                (Sender::Bot, canned()),
            ]
        );
        assert!(!session.is_typing());
        assert_eq!(session.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_events_follow_each_trigger() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        let mut events = session.subscribe();

        session.submit_text("first").expect("non-blank text");
        advance_ms(500).await;
        session.submit_text("second").expect("non-blank text");
        advance_ms(1500).await;
        session.submit_text("third").expect("non-blank text");
        advance_ms(2000).await;

        let mut typing = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let WidgetEvent::TypingChanged { typing: value } = event {
                typing.push(value);
            }
        }
        // The second reply clears the typing raised by the third send.
        assert_eq!(typing, vec![true, false, true, false]);
        assert!(!session.is_typing());
        assert_eq!(session.messages().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn draft_events_only_when_the_draft_changes() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        let mut events = session.subscribe();

        session.submit_text("direct").expect("non-blank text");
        session.set_draft("typed");
        session.submit_draft().expect("non-blank draft");

        let mut drafts = 0;
        while let Ok(event) = events.try_recv() {
            if event == WidgetEvent::DraftChanged {
                drafts += 1;
            }
        }
        assert_eq!(drafts, 2);
        assert!(session.snapshot().draft_input.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_does_not_cancel_reply() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        session.open();
        session.submit_text("hello").expect("non-blank text");
        session.close();

        advance_ms(2000).await;
        assert_eq!(session.messages().len(), 2);
        assert!(!session.snapshot().is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_outstanding_replies() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        session.submit_text("one").expect("non-blank text");
        session.send_sticker("❤️");
        assert_eq!(session.pending_timers(), 2);

        session.shutdown();
        advance_ms(5000).await;

        assert_eq!(session.messages().len(), 2);
        assert!(!session.is_typing());
        assert_eq!(session.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_session_is_never_mutated() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        let mut events = session.subscribe();
        session.submit_text("anyone?").expect("non-blank text");
        drop(session);

        advance_ms(5000).await;

        let mut appended = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, WidgetEvent::MessageAppended(_)) {
                appended += 1;
            }
        }
        assert_eq!(appended, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_the_reply_lifecycle() {
        let session = WidgetSession::new(WidgetConfig::default()).expect("runtime available");
        let mut events = session.subscribe();

        session.toggle_emoji_picker();
        session.send_sticker("🎉");
        advance_ms(2000).await;

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(match event {
                WidgetEvent::MessageAppended(message) => format!("{:?}", message.sender),
                other => format!("{other:?}"),
            });
        }

        assert_eq!(
            received,
            vec![
                "EmojiPickerToggled { visible: true }",
                "EmojiPickerToggled { visible: false }",
                "User",
                "TypingChanged { typing: true }",
                "Bot",
                "TypingChanged { typing: false }",
            ]
        );
    }

    #[test]
    fn construction_outside_runtime_fails() {
        let error = WidgetSession::new(WidgetConfig::default())
            .err()
            .expect("no runtime in a plain test");
        assert!(error.to_string().contains("create-widget-session"));
    }
}
