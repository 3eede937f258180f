use repli_widget::{ChatWidget, Message, MessageContent};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::error::{DomResultExt, EmbedResult};

/// Attribute carrying the [`UiAction`] a clicked element triggers.
pub(crate) const ACTION_ATTRIBUTE: &str = "data-repli-action";
/// Attribute carrying the glyph of a sticker button.
pub(crate) const GLYPH_ATTRIBUTE: &str = "data-repli-glyph";
pub(crate) const INPUT_SELECTOR: &str = ".repli-input";

const STYLE_MARKER_SELECTOR: &str = "style[data-repli]";
const SEND_GLYPH: &str = "➤";
const LAUNCHER_GLYPH: &str = "💬";
const EMOJI_TOGGLE_GLYPH: &str = "😊";
const TYPING_DOT_COUNT: usize = 3;

const STYLESHEET: &str = r#"
.repli-root { position: fixed; right: 1rem; bottom: 1rem; z-index: 2147483000; font-family: system-ui, sans-serif; }
.repli-launcher { width: 3.5rem; height: 3.5rem; border: 0; border-radius: 9999px; background: #2563eb; color: #fff; font-size: 1.5rem; cursor: pointer; box-shadow: 0 10px 25px rgba(0,0,0,.2); }
.repli-panel { position: relative; display: flex; flex-direction: column; width: 24rem; height: 28rem; border: 1px solid #2563eb; border-radius: .5rem; overflow: hidden; background: #fff; box-shadow: 0 20px 40px rgba(0,0,0,.2); }
.repli-header { display: flex; justify-content: space-between; align-items: center; padding: 1rem; background: #f3f4f6; }
.repli-title { margin: 0; font-size: 1.125rem; color: #2563eb; }
.repli-close, .repli-icon-button { border: 0; background: transparent; cursor: pointer; font-size: 1.125rem; }
.repli-messages { flex: 1; overflow-y: auto; padding: 1rem; display: flex; flex-direction: column; gap: 1rem; }
.repli-row { display: flex; }
.repli-row--user { justify-content: flex-end; }
.repli-row--bot { justify-content: flex-start; }
.repli-bubble { max-width: 70%; padding: .5rem .75rem; border-radius: 1rem; font-size: .875rem; }
.repli-bubble--user { background: #2563eb; color: #fff; }
.repli-bubble--bot { background: #e5e7eb; color: #111827; }
.repli-sticker { font-size: 2.25rem; }
.repli-time { margin-top: .25rem; font-size: .75rem; opacity: .7; }
.repli-typing { display: flex; gap: .25rem; padding: .75rem; border-radius: 9999px; background: #e5e7eb; }
.repli-dot { width: .5rem; height: .5rem; border-radius: 9999px; background: #2563eb; }
.repli-composer { display: flex; gap: .5rem; padding: .75rem; border-top: 1px solid #e5e7eb; }
.repli-input { flex: 1; padding: .5rem .75rem; border: 1px solid #d1d5db; border-radius: 9999px; }
.repli-emoji-picker { position: absolute; right: .5rem; bottom: 4rem; display: grid; grid-template-columns: repeat(5, 2.5rem); gap: .25rem; padding: .5rem; border-radius: .5rem; background: #fff; box-shadow: 0 10px 25px rgba(0,0,0,.2); }
.repli-emoji { border: 0; background: transparent; font-size: 1.5rem; cursor: pointer; }
"#;

/// User intent decoded from a delegated DOM event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiAction {
    Open,
    Close,
    ToggleEmojiPicker,
    Send,
    Sticker(String),
}

impl UiAction {
    pub(crate) fn parse(action: &str, glyph: Option<String>) -> Option<Self> {
        match action {
            "open" => Some(Self::Open),
            "close" => Some(Self::Close),
            "toggle-emoji" => Some(Self::ToggleEmojiPicker),
            "send" => Some(Self::Send),
            "sticker" => glyph
                .filter(|glyph| !glyph.trim().is_empty())
                .map(Self::Sticker),
            _ => None,
        }
    }

    pub(crate) fn from_element(element: &Element) -> Option<Self> {
        let action = element.get_attribute(ACTION_ATTRIBUTE)?;
        Self::parse(&action, element.get_attribute(GLYPH_ATTRIBUTE))
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::ToggleEmojiPicker => "toggle-emoji",
            Self::Send => "send",
            Self::Sticker(_) => "sticker",
        }
    }
}

/// Side a message is drawn on, as a CSS modifier.
pub(crate) fn sender_modifier(message: &Message) -> &'static str {
    if message.is_from_user() { "user" } else { "bot" }
}

/// Installs the widget stylesheet once per document.
pub(crate) fn ensure_stylesheet(document: &Document) -> EmbedResult<()> {
    if document
        .query_selector(STYLE_MARKER_SELECTOR)
        .dom("query-widget-stylesheet")?
        .is_some()
    {
        return Ok(());
    }

    let style = document
        .create_element("style")
        .dom("create-widget-stylesheet")?;
    style
        .set_attribute("data-repli", "")
        .dom("mark-widget-stylesheet")?;
    style.set_text_content(Some(STYLESHEET));

    let Some(parent) = document
        .head()
        .map(Element::from)
        .or_else(|| document.document_element())
    else {
        return Ok(());
    };
    parent
        .append_child(&style)
        .dom("append-widget-stylesheet")?;
    Ok(())
}

/// Rebuilds the widget subtree inside `container` from the current state.
pub(crate) fn render_widget(
    document: &Document,
    container: &Element,
    widget: &ChatWidget,
) -> EmbedResult<()> {
    let composer_focused = document
        .active_element()
        .map(|element| element.matches(INPUT_SELECTOR).unwrap_or(false))
        .unwrap_or(false);

    container.set_inner_html("");
    let root = element(document, "div", "repli-root")?;
    if widget.is_open() {
        root.append_child(&render_panel(document, widget)?)
            .dom("append-widget-panel")?;
    } else {
        root.append_child(&render_launcher(document)?)
            .dom("append-widget-launcher")?;
    }
    container
        .append_child(&root)
        .dom("append-widget-root")?;

    if !widget.is_open() {
        return Ok(());
    }

    // The log is rebuilt on every render, so pin it to the newest message.
    if let Some(list) = container
        .query_selector(".repli-messages")
        .dom("query-message-list")?
    {
        list.set_scroll_top(list.scroll_height());
    }

    if composer_focused {
        if let Some(input) = container
            .query_selector(INPUT_SELECTOR)
            .dom("query-composer-input")?
            .and_then(|input| input.dyn_into::<HtmlElement>().ok())
        {
            input.focus().dom("refocus-composer-input")?;
        }
    }

    Ok(())
}

fn render_launcher(document: &Document) -> EmbedResult<Element> {
    let launcher = action_button(document, "repli-launcher", "open", "Open chat")?;
    launcher.set_text_content(Some(LAUNCHER_GLYPH));
    Ok(launcher)
}

fn render_panel(document: &Document, widget: &ChatWidget) -> EmbedResult<Element> {
    let config = widget.config();
    let panel = element(document, "div", "repli-panel")?;
    panel
        .set_attribute("role", "dialog")
        .dom("set-panel-role")?;
    panel
        .set_attribute("aria-label", &config.title)
        .dom("set-panel-label")?;

    let header = element(document, "div", "repli-header")?;
    let title = element(document, "h3", "repli-title")?;
    title.set_text_content(Some(&config.title));
    let close = action_button(document, "repli-close", "close", "Close chat")?;
    close.set_text_content(Some("×"));
    append_all(&header, &[&title, &close], "build-panel-header")?;

    let messages = element(document, "div", "repli-messages")?;
    messages
        .set_attribute("aria-live", "polite")
        .dom("set-message-list-live")?;
    for message in widget.messages() {
        messages
            .append_child(&render_message(document, message)?)
            .dom("append-message-row")?;
    }
    if widget.is_typing() {
        messages
            .append_child(&render_typing_indicator(document)?)
            .dom("append-typing-indicator")?;
    }

    let composer = render_composer(document, &config.placeholder, widget.draft())?;
    append_all(
        &panel,
        &[&header, &messages, &composer],
        "build-widget-panel",
    )?;

    if widget.show_emoji_picker() {
        panel
            .append_child(&render_emoji_picker(document, &config.emoji_palette)?)
            .dom("append-emoji-picker")?;
    }

    Ok(panel)
}

fn render_message(document: &Document, message: &Message) -> EmbedResult<Element> {
    let modifier = sender_modifier(message);
    let row = element(document, "div", &format!("repli-row repli-row--{modifier}"))?;
    let bubble = element(
        document,
        "div",
        &format!("repli-bubble repli-bubble--{modifier}"),
    )?;

    let body = match &message.content {
        MessageContent::Text(text) => {
            let body = element(document, "div", "repli-text")?;
            body.set_text_content(Some(text));
            body
        }
        MessageContent::Sticker(glyph) => {
            let body = element(document, "span", "repli-sticker")?;
            body.set_attribute("role", "img")
                .dom("set-sticker-role")?;
            body.set_text_content(Some(glyph));
            body
        }
    };

    let time = element(document, "div", "repli-time")?;
    time.set_text_content(Some(&message.clock_label()));

    append_all(&bubble, &[&body, &time], "build-message-bubble")?;
    row.append_child(&bubble).dom("append-message-bubble")?;
    Ok(row)
}

fn render_typing_indicator(document: &Document) -> EmbedResult<Element> {
    let row = element(document, "div", "repli-row repli-row--bot")?;
    let indicator = element(document, "div", "repli-typing")?;
    indicator
        .set_attribute("aria-label", "Bot is typing")
        .dom("set-typing-label")?;
    for _ in 0..TYPING_DOT_COUNT {
        indicator
            .append_child(&element(document, "span", "repli-dot")?)
            .dom("append-typing-dot")?;
    }
    row.append_child(&indicator).dom("append-typing-indicator")?;
    Ok(row)
}

fn render_composer(document: &Document, placeholder: &str, draft: &str) -> EmbedResult<Element> {
    let composer = element(document, "div", "repli-composer")?;

    let input = element(document, "input", "repli-input")?;
    input.set_attribute("type", "text").dom("set-input-type")?;
    input
        .set_attribute("placeholder", placeholder)
        .dom("set-input-placeholder")?;
    input
        .set_attribute("aria-label", "Type a message")
        .dom("set-input-label")?;
    if let Some(input) = input.dyn_ref::<HtmlInputElement>() {
        input.set_value(draft);
    }

    let emoji = action_button(
        document,
        "repli-icon-button",
        "toggle-emoji",
        "Open emoji picker",
    )?;
    emoji.set_text_content(Some(EMOJI_TOGGLE_GLYPH));

    let send = action_button(document, "repli-icon-button", "send", "Send message")?;
    send.set_text_content(Some(SEND_GLYPH));

    append_all(&composer, &[&input, &emoji, &send], "build-composer")?;
    Ok(composer)
}

fn render_emoji_picker(document: &Document, palette: &[String]) -> EmbedResult<Element> {
    let picker = element(document, "div", "repli-emoji-picker")?;
    picker
        .set_attribute("role", "menu")
        .dom("set-emoji-picker-role")?;

    for glyph in palette {
        let button = action_button(
            document,
            "repli-emoji",
            "sticker",
            &format!("Send {glyph} emoji"),
        )?;
        button
            .set_attribute(GLYPH_ATTRIBUTE, glyph)
            .dom("set-emoji-glyph")?;
        button.set_text_content(Some(glyph));
        picker.append_child(&button).dom("append-emoji-button")?;
    }

    Ok(picker)
}

fn element(document: &Document, tag: &str, class_name: &str) -> EmbedResult<Element> {
    let element = document.create_element(tag).dom("create-element")?;
    element.set_class_name(class_name);
    Ok(element)
}

fn action_button(
    document: &Document,
    class_name: &str,
    action: &str,
    label: &str,
) -> EmbedResult<Element> {
    let button = element(document, "button", class_name)?;
    button.set_attribute("type", "button").dom("set-button-type")?;
    button
        .set_attribute(ACTION_ATTRIBUTE, action)
        .dom("set-button-action")?;
    button
        .set_attribute("aria-label", label)
        .dom("set-button-label")?;
    Ok(button)
}

fn append_all(parent: &Element, children: &[&Element], stage: &'static str) -> EmbedResult<()> {
    for child in children {
        parent.append_child(child).dom(stage)?;
    }
    Ok(())
}
