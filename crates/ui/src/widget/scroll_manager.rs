use gpui::{Pixels, ScrollHandle, point, px};

/// How close to the newest message the log must be to keep following it.
const TAIL_SLACK: Pixels = px(24.);

/// Pins the message log to its newest entry.
///
/// Every appended message, user or bot, jumps to the tail through
/// [`ScrollManager::request_scroll_to_bottom`]. Between appends the log only
/// follows re-renders while the reader stays within [`TAIL_SLACK`] of the bottom.
pub struct ScrollManager {
    scroll_handle: ScrollHandle,
    jump_requested: bool,
    following: bool,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: ScrollHandle::new(),
            jump_requested: false,
            following: true,
        }
    }

    pub fn handle(&self) -> &ScrollHandle {
        &self.scroll_handle
    }

    pub fn is_following_bottom(&self) -> bool {
        self.following
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.jump_requested = true;
    }

    /// Re-reads the scroll position the user left the log at.
    pub fn update_follow_state(&mut self) {
        if self.jump_requested {
            self.following = true;
            return;
        }
        self.following = within_tail(
            self.scroll_handle.offset().y,
            self.scroll_handle.max_offset().height,
        );
    }

    /// Scrolls to the tail when following. Returns whether the offset moved.
    pub fn apply_pending_scroll(&mut self) -> bool {
        let jump = std::mem::take(&mut self.jump_requested);
        if !jump && !self.following {
            return false;
        }

        let offset = self.scroll_handle.offset();
        let max_offset = self.scroll_handle.max_offset().height;
        let tail = if max_offset > Pixels::ZERO {
            -max_offset
        } else {
            Pixels::ZERO
        };
        self.scroll_handle.set_offset(point(offset.x, tail));
        true
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

// Scrolling down makes the y offset negative; at the tail `offset == -max_offset`.
fn within_tail(offset: Pixels, max_offset: Pixels) -> bool {
    max_offset <= Pixels::ZERO || (offset + max_offset).abs() <= TAIL_SLACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_without_overflow_are_at_the_tail() {
        assert!(within_tail(Pixels::ZERO, Pixels::ZERO));
        assert!(within_tail(px(-10.), px(-5.)));
    }

    #[test]
    fn slack_decides_following() {
        assert!(within_tail(px(-300.), px(300.)));
        assert!(within_tail(px(-276.), px(300.)));
        assert!(!within_tail(px(-200.), px(300.)));
    }

    #[test]
    fn jump_request_is_consumed_once() {
        let mut manager = ScrollManager::new();
        manager.following = false;

        manager.request_scroll_to_bottom();
        manager.update_follow_state();

        assert!(manager.is_following_bottom());
        assert!(manager.apply_pending_scroll());
        assert!(!manager.jump_requested);
    }
}
