use std::cell::RefCell;
use std::rc::{Rc, Weak};

use repli_widget::{ChatWidget, MessageId, PendingReply, WidgetConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Event, HtmlInputElement, KeyboardEvent, Window};

use crate::dom::{self, ACTION_ATTRIBUTE, INPUT_SELECTOR, UiAction};
use crate::error::{DomResultExt, EmbedResult};
use crate::timers::ReplyTimers;

type SharedEmbed = Rc<RefCell<Embed>>;

/// A widget mounted into one container element.
///
/// Listeners and timers only hold a [`Weak`] back-reference, so the embed lives
/// exactly as long as its [`crate::WidgetHandle`].
pub(crate) struct Embed {
    this: Weak<RefCell<Embed>>,
    widget: ChatWidget,
    document: Document,
    container: Element,
    timers: ReplyTimers,
    listeners: Option<DomListeners>,
}

impl Embed {
    pub(crate) fn mount(
        window: Window,
        document: Document,
        container: Element,
        config: WidgetConfig,
    ) -> EmbedResult<SharedEmbed> {
        dom::ensure_stylesheet(&document)?;

        let embed = Rc::new_cyclic(|this| {
            RefCell::new(Self {
                this: this.clone(),
                widget: ChatWidget::new(config),
                document,
                container,
                timers: ReplyTimers::new(window),
                listeners: None,
            })
        });

        {
            let mut state = embed.borrow_mut();
            let listeners = DomListeners::attach(&state.container, Rc::downgrade(&embed))?;
            state.listeners = Some(listeners);
            state.render()?;
        }

        log::info!("mounted chat widget");
        Ok(embed)
    }

    pub(crate) fn widget(&self) -> &ChatWidget {
        &self.widget
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.listeners.is_some()
    }

    pub(crate) fn apply(&mut self, action: UiAction) -> EmbedResult<()> {
        if !self.is_mounted() {
            log::warn!("ignoring `{}` on an unmounted widget", action.name());
            return Ok(());
        }

        let changed = match action {
            UiAction::Open => self.widget.open(),
            UiAction::Close => self.widget.close(),
            UiAction::ToggleEmojiPicker => {
                self.widget.toggle_emoji_picker();
                true
            }
            UiAction::Send => match self.widget.submit_draft() {
                Some(pending) => {
                    self.schedule(pending)?;
                    true
                }
                None => false,
            },
            UiAction::Sticker(glyph) => {
                let pending = self.widget.send_sticker(glyph);
                self.schedule(pending)?;
                true
            }
        };

        if changed {
            self.render()?;
        }
        Ok(())
    }

    /// Sends `text` as a user message. Blank text is ignored.
    pub(crate) fn submit_text(&mut self, text: String) -> EmbedResult<bool> {
        if !self.is_mounted() {
            return Ok(false);
        }
        let Some(pending) = self.widget.submit_text(text) else {
            return Ok(false);
        };
        self.schedule(pending)?;
        self.render()?;
        Ok(true)
    }

    /// Stops every pending reply, detaches listeners and empties the container.
    pub(crate) fn unmount(&mut self) {
        let Some(listeners) = self.listeners.take() else {
            return;
        };
        listeners.detach();

        let cancelled = self.timers.cancel_all();
        self.widget.cancel_pending_replies();
        self.container.set_inner_html("");
        log::info!("unmounted chat widget, cancelled {} pending replies", cancelled);
    }

    pub(crate) fn dispatch(this: &Weak<RefCell<Self>>, action: UiAction) {
        let Some(embed) = this.upgrade() else {
            return;
        };
        let Ok(mut state) = embed.try_borrow_mut() else {
            log::warn!("widget busy, dropping `{}`", action.name());
            return;
        };

        let name = action.name();
        if let Err(error) = state.apply(action) {
            log::error!("failed to handle `{}`: {}", name, error);
        }
    }

    fn set_draft(this: &Weak<RefCell<Self>>, text: String) {
        if let Some(embed) = this.upgrade()
            && let Ok(mut state) = embed.try_borrow_mut()
        {
            state.widget.set_draft(text);
        }
    }

    fn deliver(this: &Weak<RefCell<Self>>, trigger: MessageId) {
        let Some(embed) = this.upgrade() else {
            return;
        };
        let Ok(mut state) = embed.try_borrow_mut() else {
            log::warn!("widget busy, dropping reply to message {}", trigger);
            return;
        };

        state.timers.retire(trigger);
        if state.widget.complete_reply(trigger).is_none() {
            return;
        }
        if let Err(error) = state.render() {
            log::error!("failed to render reply to message {}: {}", trigger, error);
        }
    }

    fn schedule(&mut self, pending: PendingReply) -> EmbedResult<()> {
        let this = self.this.clone();
        let trigger = pending.trigger;
        self.timers
            .arm(pending, move || Self::deliver(&this, trigger))
    }

    fn render(&mut self) -> EmbedResult<()> {
        dom::render_widget(&self.document, &self.container, &self.widget)
    }

    pub(crate) fn armed_timers(&self) -> usize {
        self.timers.armed_count()
    }
}

impl Drop for Embed {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Delegated listeners on the container; rendering never rebinds them.
struct DomListeners {
    target: Element,
    click: Closure<dyn FnMut(Event)>,
    keydown: Closure<dyn FnMut(Event)>,
    input: Closure<dyn FnMut(Event)>,
}

impl DomListeners {
    fn attach(target: &Element, this: Weak<RefCell<Embed>>) -> EmbedResult<Self> {
        let click = {
            let this = this.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let selector = format!("[{ACTION_ATTRIBUTE}]");
                let action = event_element(&event)
                    .and_then(|element| element.closest(&selector).ok().flatten())
                    .and_then(|element| UiAction::from_element(&element));
                if let Some(action) = action {
                    Embed::dispatch(&this, action);
                }
            })
        };

        let keydown = {
            let this = this.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if key.key() != "Enter" || key.is_composing() || !targets_composer(&event) {
                    return;
                }
                event.prevent_default();
                Embed::dispatch(&this, UiAction::Send);
            })
        };

        let input = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if !targets_composer(&event) {
                return;
            }
            if let Some(input) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
            {
                Embed::set_draft(&this, input.value());
            }
        });

        let listeners = Self {
            target: target.clone(),
            click,
            keydown,
            input,
        };

        for (kind, callback) in listeners.bindings() {
            if let Err(error) = target
                .add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
                .dom("attach-widget-listener")
            {
                listeners.detach();
                return Err(error);
            }
        }

        Ok(listeners)
    }

    fn bindings(&self) -> [(&'static str, &Closure<dyn FnMut(Event)>); 3] {
        [
            ("click", &self.click),
            ("keydown", &self.keydown),
            ("input", &self.input),
        ]
    }

    fn detach(&self) {
        for (kind, callback) in self.bindings() {
            let _ = self
                .target
                .remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref());
        }
    }
}

fn event_element(event: &Event) -> Option<Element> {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
}

fn targets_composer(event: &Event) -> bool {
    event_element(event)
        .map(|element| element.matches(INPUT_SELECTOR).unwrap_or(false))
        .unwrap_or(false)
}
