use gpui::*;
use gpui_component::ActiveTheme;

use crate::settings::SettingsStore;
use crate::widget::ChatWidgetView;

/// Key context of the shell root; scopes the widget shortcuts.
pub const SHELL_KEY_CONTEXT: &str = "RepliShell";
/// Inset between the widget and the window's bottom-right corner.
const WIDGET_INSET: Pixels = px(16.);

gpui::actions!(repli, [ToggleWidget, CloseWidget, ToggleTheme, Quit]);

/// Window content standing in for a host page, with the widget floating above it.
pub struct WidgetShell {
    widget: Entity<ChatWidgetView>,
    settings: SettingsStore,
    focus_handle: FocusHandle,
}

impl WidgetShell {
    pub fn new(settings: SettingsStore, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let config = settings.settings().widget.clone();
        let widget = cx.new(|cx| ChatWidgetView::new(config, window, cx));
        let focus_handle = cx.focus_handle();
        window.focus(&focus_handle);

        Self {
            widget,
            settings,
            focus_handle,
        }
    }

    fn toggle_widget(&mut self, _: &ToggleWidget, _window: &mut Window, cx: &mut Context<Self>) {
        self.widget.update(cx, |widget, cx| widget.toggle(cx));
    }

    fn close_widget(&mut self, _: &CloseWidget, _window: &mut Window, cx: &mut Context<Self>) {
        self.widget.update(cx, |widget, cx| widget.close(cx));
    }

    fn toggle_theme(&mut self, _: &ToggleTheme, window: &mut Window, cx: &mut Context<Self>) {
        let settings = self.settings.settings().as_ref().clone().with_toggled_theme();
        if let Err(error) = self.settings.update(settings.clone()) {
            tracing::error!("failed to persist theme change: {}", error);
        }
        settings.apply_theme(Some(window), cx);
        cx.notify();
    }
}

impl Render for WidgetShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let message_count = self.widget.read(cx).widget().messages().len();

        div()
            .id("repli-shell")
            .key_context(SHELL_KEY_CONTEXT)
            .track_focus(&self.focus_handle)
            .on_action(cx.listener(Self::toggle_widget))
            .on_action(cx.listener(Self::close_widget))
            .on_action(cx.listener(Self::toggle_theme))
            .size_full()
            .relative()
            .bg(theme.background)
            .child(
                div()
                    .p_4()
                    .text_sm()
                    .text_color(theme.muted_foreground)
                    .child(format!("Host page preview · {message_count} messages")),
            )
            .child(
                div()
                    .absolute()
                    .bottom(WIDGET_INSET)
                    .right(WIDGET_INSET)
                    .child(self.widget.clone()),
            )
    }
}
