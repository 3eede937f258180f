use std::collections::HashMap;

use repli_widget::{MessageId, PendingReply};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

use crate::error::{DomResultExt, EmbedResult};

struct ArmedTimer {
    handle: i32,
    callback: Closure<dyn FnMut()>,
}

/// One `setTimeout` per pending reply, keyed by the message that triggered it.
///
/// A callback cannot be dropped while it runs, so fired callbacks are parked in
/// `spent` and released the next time a timer is armed.
pub(crate) struct ReplyTimers {
    window: Window,
    armed: HashMap<MessageId, ArmedTimer>,
    spent: Vec<Closure<dyn FnMut()>>,
}

impl ReplyTimers {
    pub(crate) fn new(window: Window) -> Self {
        Self {
            window,
            armed: HashMap::new(),
            spent: Vec::new(),
        }
    }

    pub(crate) fn arm(
        &mut self,
        pending: PendingReply,
        on_elapsed: impl FnMut() + 'static,
    ) -> EmbedResult<()> {
        self.spent.clear();

        let callback = Closure::<dyn FnMut()>::new(on_elapsed);
        let millis = i32::try_from(pending.delay.as_millis()).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            )
            .dom("arm-reply-timer")?;

        log::debug!(
            "armed reply timer {} for message {} ({} ms)",
            handle,
            pending.trigger,
            millis
        );
        self.armed.insert(pending.trigger, ArmedTimer { handle, callback });
        Ok(())
    }

    /// Forgets the timer of `trigger` after it fired.
    pub(crate) fn retire(&mut self, trigger: MessageId) {
        if let Some(timer) = self.armed.remove(&trigger) {
            self.spent.push(timer.callback);
        }
    }

    pub(crate) fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Clears every outstanding timeout. Returns how many were still armed.
    pub(crate) fn cancel_all(&mut self) -> usize {
        let count = self.armed.len();
        for (_, timer) in self.armed.drain() {
            self.window.clear_timeout_with_handle(timer.handle);
            self.spent.push(timer.callback);
        }
        count
    }
}

impl Drop for ReplyTimers {
    fn drop(&mut self) {
        // A timeout firing into a freed closure throws in the host page.
        self.cancel_all();
    }
}
