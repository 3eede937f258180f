use gpui::*;
use gpui_component::Root;

use repli::app::{CloseWidget, Quit, SHELL_KEY_CONTEXT, ToggleTheme, ToggleWidget, WidgetShell};
use repli::settings::SettingsStore;

/// Application entry point.
///
/// Loads desktop settings, initializes gpui-component and opens one window hosting
/// the chat widget.
fn main() {
    tracing_subscriber::fmt::init();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        // Required before any Root usage.
        gpui_component::init(cx);

        let settings = SettingsStore::load();
        settings.settings().apply_theme(None, cx);
        tracing::info!(
            "loaded widget settings from {:?}",
            SettingsStore::default_config_path()
        );

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-k", ToggleWidget, Some(SHELL_KEY_CONTEXT)),
            KeyBinding::new("cmd-shift-t", ToggleTheme, Some(SHELL_KEY_CONTEXT)),
            KeyBinding::new("escape", CloseWidget, Some(SHELL_KEY_CONTEXT)),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(720.), px(640.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Repli".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                };

                cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| WidgetShell::new(settings, window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                })
                .expect("failed to open main window");

                cx.activate(true);
            })
        })
        .detach();
    });
}
