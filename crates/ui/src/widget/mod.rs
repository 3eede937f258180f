/// Pure layout rules for bubbles and the sticker grid.
pub mod bubble;
pub mod composer;
pub mod emoji_picker;
/// Event contracts between the widget's child views.
pub mod events;
pub mod message_list;
pub mod scroll_manager;
pub mod view;

pub use composer::Composer;
pub use emoji_picker::EmojiPicker;
pub use events::{DraftSubmitted, EmojiPickerToggleClicked, StickerPicked};
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use view::ChatWidgetView;
