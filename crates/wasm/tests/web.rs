#![cfg(target_arch = "wasm32")]

use js_sys::{Array, JSON, Promise, Reflect};
use repli_wasm::{WidgetHandle, mount, render};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{
    Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, KeyboardEvent,
    KeyboardEventInit,
};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("test runs in a browser")
}

fn container(id: &str) -> Element {
    let document = document();
    let container = document.create_element("div").unwrap();
    container.set_id(id);
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn options(json: &str) -> JsValue {
    JSON::parse(json).unwrap()
}

fn query(container: &Element, selector: &str) -> Option<Element> {
    container.query_selector(selector).unwrap()
}

fn count(container: &Element, selector: &str) -> u32 {
    container.query_selector_all(selector).unwrap().length()
}

fn click(container: &Element, selector: &str) {
    query(container, selector)
        .expect("clickable element")
        .dyn_into::<HtmlElement>()
        .unwrap()
        .click();
}

async fn sleep(millis: i32) {
    let promise = Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn message_count(handle: &WidgetHandle) -> u32 {
    Array::from(&handle.messages().unwrap()).length()
}

#[wasm_bindgen_test]
fn renders_closed_launcher_by_default() {
    let container = container("repli-launcher-test");
    let handle = render(container.clone(), JsValue::UNDEFINED).unwrap();

    assert!(!handle.is_open());
    assert_eq!(count(&container, ".repli-launcher"), 1);
    assert_eq!(count(&container, ".repli-panel"), 0);
    handle.unmount();
}

#[wasm_bindgen_test]
fn launcher_click_opens_panel_with_configured_title() {
    let container = container("repli-open-test");
    let handle = render(container.clone(), options(r#"{ "title": "Help desk" }"#)).unwrap();

    click(&container, ".repli-launcher");

    assert!(handle.is_open());
    assert_eq!(count(&container, ".repli-launcher"), 0);
    let title = query(&container, ".repli-title").unwrap();
    assert_eq!(title.text_content().as_deref(), Some("Help desk"));

    click(&container, ".repli-close");
    assert!(!handle.is_open());
    handle.unmount();
}

#[wasm_bindgen_test]
fn send_text_shows_message_and_typing_indicator() {
    let container = container("repli-send-test");
    let handle = render(container.clone(), JsValue::UNDEFINED).unwrap();
    handle.open().unwrap();

    assert!(handle.send_text("hello".to_string()).unwrap());

    assert_eq!(message_count(&handle), 1);
    assert!(handle.is_typing());
    assert_eq!(count(&container, ".repli-bubble--user"), 1);
    assert_eq!(count(&container, ".repli-typing"), 1);
    handle.unmount();
}

#[wasm_bindgen_test]
fn blank_text_is_ignored() {
    let container = container("repli-blank-test");
    let handle = render(container.clone(), JsValue::UNDEFINED).unwrap();

    assert!(!handle.send_text("   ".to_string()).unwrap());
    assert_eq!(message_count(&handle), 0);
    assert!(!handle.is_typing());
    handle.unmount();
}

#[wasm_bindgen_test]
fn enter_in_composer_submits_the_draft() {
    let container = container("repli-enter-test");
    let handle = render(container.clone(), JsValue::UNDEFINED).unwrap();
    handle.open().unwrap();

    let input = query(&container, ".repli-input")
        .unwrap()
        .dyn_into::<HtmlInputElement>()
        .unwrap();
    input.set_value("typed");
    let init = EventInit::new();
    init.set_bubbles(true);
    let typed = Event::new_with_event_init_dict("input", &init).unwrap();
    input.dispatch_event(&typed).unwrap();

    let init = KeyboardEventInit::new();
    init.set_key("Enter");
    init.set_bubbles(true);
    let enter = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    input.dispatch_event(&enter).unwrap();

    assert_eq!(message_count(&handle), 1);
    let value = query(&container, ".repli-input")
        .unwrap()
        .dyn_into::<HtmlInputElement>()
        .unwrap()
        .value();
    assert_eq!(value, "");
    handle.unmount();
}

#[wasm_bindgen_test]
fn emoji_picker_sends_sticker_and_closes() {
    let container = container("repli-sticker-test");
    let handle = render(container.clone(), JsValue::UNDEFINED).unwrap();
    handle.open().unwrap();

    click(&container, "[data-repli-action='toggle-emoji']");
    assert_eq!(count(&container, ".repli-emoji"), 10);

    click(&container, ".repli-emoji[data-repli-glyph='🔥']");

    assert_eq!(count(&container, ".repli-emoji-picker"), 0);
    assert_eq!(count(&container, ".repli-sticker"), 1);
    let messages = handle.messages().unwrap();
    let first = Array::from(&messages).get(0);
    let content = Reflect::get(&first, &"content".into()).unwrap();
    let body = Reflect::get(&content, &"body".into()).unwrap();
    assert_eq!(body.as_string().as_deref(), Some("🔥"));
    handle.unmount();
}

#[wasm_bindgen_test]
fn send_sticker_accepts_any_glyph() {
    let container = container("repli-any-sticker-test");
    let handle = render(container.clone(), JsValue::UNDEFINED).unwrap();

    handle.send_sticker(String::new()).unwrap();
    handle.send_sticker("  ".to_string()).unwrap();

    assert_eq!(message_count(&handle), 2);
    assert!(handle.is_typing());
    assert_eq!(handle.pending_replies(), 2);
    handle.unmount();
}

#[wasm_bindgen_test]
async fn reply_arrives_after_configured_delay() {
    let container = container("repli-reply-test");
    let handle = render(
        container.clone(),
        options(r#"{ "reply_delay_ms": 20, "reply_text": "On it" }"#),
    )
    .unwrap();
    handle.open().unwrap();
    handle.send_text("ping".to_string()).unwrap();
    assert_eq!(handle.pending_replies(), 1);

    sleep(60).await;

    assert_eq!(message_count(&handle), 2);
    assert!(!handle.is_typing());
    assert_eq!(handle.pending_replies(), 0);
    let reply = query(&container, ".repli-bubble--bot .repli-text").unwrap();
    assert_eq!(reply.text_content().as_deref(), Some("On it"));
    handle.unmount();
}

#[wasm_bindgen_test]
async fn unmount_cancels_pending_replies() {
    let container = container("repli-unmount-test");
    let handle = render(container.clone(), options(r#"{ "reply_delay_ms": 20 }"#)).unwrap();
    handle.send_text("ping".to_string()).unwrap();

    handle.unmount();
    sleep(60).await;

    assert_eq!(message_count(&handle), 1);
    assert!(!handle.is_typing());
    assert_eq!(container.child_element_count(), 0);
}

#[wasm_bindgen_test]
fn mount_uses_configured_container_id() {
    container("repli-custom-container");
    let handle = mount(options(r#"{ "container_id": "repli-custom-container" }"#)).unwrap();

    let container = document()
        .get_element_by_id("repli-custom-container")
        .unwrap();
    assert_eq!(count(&container, ".repli-launcher"), 1);
    handle.unmount();
}

#[wasm_bindgen_test]
fn mount_fails_without_container() {
    let result = mount(options(r#"{ "container_id": "repli-missing" }"#));
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn invalid_options_are_rejected() {
    let container = container("repli-invalid-test");
    let result = render(container, options(r#"{ "reply_delay_ms": "soon" }"#));
    assert!(result.is_err());
}
