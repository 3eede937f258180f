//! Browser embedding of the Repli chat widget.
//!
//! `render` mounts the widget into a caller-supplied element, `mount` into the
//! element named by `container_id` (`repli-widget` by default).

use std::cell::RefCell;
use std::rc::Rc;

use repli_widget::WidgetConfig;
use snafu::{OptionExt, ResultExt};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

mod dom;
mod embed;
pub mod error;
mod timers;

use crate::dom::UiAction;
use crate::embed::Embed;
use crate::error::{
    ContainerNotFoundSnafu, EmbedResult, InvalidOptionsSnafu, MissingDocumentSnafu,
    MissingWindowSnafu,
};

pub use crate::error::EmbedError;

/// Initialize WASM module
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Repli WASM module initialized");
}

/// Mounts a widget into `container`. `options` may be omitted or hold any subset
/// of the widget configuration fields.
#[wasm_bindgen]
pub fn render(container: Element, options: JsValue) -> Result<WidgetHandle, JsValue> {
    let config = parse_options(options)?;
    Ok(WidgetHandle::mount(container, config)?)
}

/// Mounts a widget into the element whose id is the configured `container_id`.
#[wasm_bindgen]
pub fn mount(options: JsValue) -> Result<WidgetHandle, JsValue> {
    let config = parse_options(options)?;
    let (_, document) = browser("mount-widget")?;
    let container = document
        .get_element_by_id(&config.container_id)
        .context(ContainerNotFoundSnafu {
            stage: "find-widget-container",
            id: config.container_id.clone(),
        })?;
    Ok(WidgetHandle::mount(container, config)?)
}

/// Controls one mounted widget from JavaScript.
///
/// Freeing the handle unmounts the widget.
#[wasm_bindgen]
pub struct WidgetHandle {
    embed: Rc<RefCell<Embed>>,
}

impl WidgetHandle {
    fn mount(container: Element, config: WidgetConfig) -> EmbedResult<Self> {
        let (window, document) = browser("mount-widget")?;
        let embed = Embed::mount(window, document, container, config)?;
        Ok(Self { embed })
    }

    fn apply(&self, action: UiAction) -> Result<(), JsValue> {
        Ok(self.embed.borrow_mut().apply(action)?)
    }
}

#[wasm_bindgen]
impl WidgetHandle {
    pub fn open(&self) -> Result<(), JsValue> {
        self.apply(UiAction::Open)
    }

    pub fn close(&self) -> Result<(), JsValue> {
        self.apply(UiAction::Close)
    }

    #[wasm_bindgen(js_name = toggleEmojiPicker)]
    pub fn toggle_emoji_picker(&self) -> Result<(), JsValue> {
        self.apply(UiAction::ToggleEmojiPicker)
    }

    /// Sends a user text message. Returns `false` for blank text.
    #[wasm_bindgen(js_name = sendText)]
    pub fn send_text(&self, text: String) -> Result<bool, JsValue> {
        Ok(self.embed.borrow_mut().submit_text(text)?)
    }

    /// Sends `glyph` as a sticker. Any glyph is accepted, including blank ones.
    #[wasm_bindgen(js_name = sendSticker)]
    pub fn send_sticker(&self, glyph: String) -> Result<(), JsValue> {
        self.apply(UiAction::Sticker(glyph))
    }

    /// Snapshot of the message log as plain objects.
    pub fn messages(&self) -> Result<JsValue, JsValue> {
        let embed = self.embed.borrow();
        Ok(serde_wasm_bindgen::to_value(embed.widget().messages())?)
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.embed.borrow().widget().is_open()
    }

    #[wasm_bindgen(js_name = isTyping)]
    pub fn is_typing(&self) -> bool {
        self.embed.borrow().widget().is_typing()
    }

    #[wasm_bindgen(js_name = pendingReplies)]
    pub fn pending_replies(&self) -> usize {
        self.embed.borrow().armed_timers()
    }

    pub fn unmount(&self) {
        self.embed.borrow_mut().unmount();
    }
}

fn parse_options(options: JsValue) -> EmbedResult<WidgetConfig> {
    if options.is_undefined() || options.is_null() {
        return Ok(WidgetConfig::default());
    }

    let config: WidgetConfig =
        serde_wasm_bindgen::from_value(options).context(InvalidOptionsSnafu {
            stage: "parse-widget-options",
        })?;
    Ok(config.normalized())
}

fn browser(stage: &'static str) -> EmbedResult<(Window, Document)> {
    let window = web_sys::window().context(MissingWindowSnafu { stage })?;
    let document = window.document().context(MissingDocumentSnafu { stage })?;
    Ok((window, document))
}
