use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use gpui::*;
use gpui_component::{Theme, ThemeMode};
use repli_widget::WidgetConfig;
use repli_widget::config::ENV_PREFIX;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::ResultExt;

use crate::settings::error::{
    CommitSnafu, EncodeSnafu, PrepareDirectorySnafu, SettingsError, StageSnafu,
};

pub const SETTINGS_DIRECTORY_NAME: &str = "repli";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Desktop host settings: the widget configuration plus window theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopSettings {
    #[serde(flatten)]
    pub widget: WidgetConfig,
    #[serde(
        default = "default_theme_mode",
        serialize_with = "serialize_theme_mode",
        deserialize_with = "deserialize_theme_mode"
    )]
    pub theme_mode: ThemeMode,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            widget: WidgetConfig::default(),
            theme_mode: default_theme_mode(),
        }
    }
}

impl DesktopSettings {
    pub fn normalized(mut self) -> Self {
        self.widget = self.widget.normalized();
        self
    }

    pub fn with_toggled_theme(mut self) -> Self {
        self.theme_mode = if self.theme_mode.is_dark() {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        self
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        Theme::change(self.theme_mode, window, cx);
    }
}

/// Loads desktop settings once and swaps them atomically on update.
pub struct SettingsStore {
    settings: Arc<ArcSwap<DesktopSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".repli"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn settings(&self) -> Arc<DesktopSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: DesktopSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path) -> DesktopSettings {
        let mut figment = Figment::from(Serialized::defaults(DesktopSettings::default()));
        if path.exists() {
            figment = figment.merge(Json::file(path));
        } else {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }

        match figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<DesktopSettings>()
        {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                DesktopSettings::default()
            }
        }
    }

    fn persist(&self, settings: &DesktopSettings) -> Result<(), SettingsError> {
        write_settings_file(&self.config_path, settings)?;
        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

/// Writes `settings` next to `path` first, then swaps it into place so readers
/// never observe a half-written file.
fn write_settings_file(path: &Path, settings: &DesktopSettings) -> Result<(), SettingsError> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty());
    if let Some(directory) = directory {
        std::fs::create_dir_all(directory).context(PrepareDirectorySnafu {
            stage: "prepare-settings-directory",
            directory: directory.to_path_buf(),
        })?;
    }

    let encoded = serde_json::to_vec_pretty(settings).context(EncodeSnafu {
        stage: "encode-desktop-settings",
    })?;

    let staged = path.with_extension("partial");
    std::fs::write(&staged, encoded).context(StageSnafu {
        stage: "stage-settings-file",
        staged: staged.clone(),
    })?;
    std::fs::rename(&staged, path).context(CommitSnafu {
        stage: "commit-settings-file",
        staged,
        target: path.to_path_buf(),
    })
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Light
}

fn serialize_theme_mode<S>(value: &ThemeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.name())
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> Result<ThemeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(parse_theme_mode(&value))
}

fn parse_theme_mode(value: &str) -> ThemeMode {
    if value.trim().eq_ignore_ascii_case("dark") {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_mode_parsing_defaults_to_light() {
        assert_eq!(parse_theme_mode(" Dark "), ThemeMode::Dark);
        assert_eq!(parse_theme_mode("light"), ThemeMode::Light);
        assert_eq!(parse_theme_mode("sepia"), ThemeMode::Light);
    }

    #[test]
    fn toggling_theme_flips_mode() {
        let settings = DesktopSettings::default().with_toggled_theme();
        assert_eq!(settings.theme_mode, ThemeMode::Dark);
        assert_eq!(settings.with_toggled_theme().theme_mode, ThemeMode::Light);
    }

    #[test]
    fn missing_file_loads_defaults() {
        figment::Jail::expect_with(|_jail| {
            let store = SettingsStore::new(PathBuf::from("missing/settings.json"));
            assert_eq!(*store.settings(), DesktopSettings::default());
            Ok(())
        });
    }

    #[test]
    fn widget_fields_are_read_from_the_flat_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                SETTINGS_FILE_NAME,
                r#"{ "title": "Help desk", "theme_mode": "dark", "reply_delay_ms": 100 }"#,
            )?;

            let store = SettingsStore::new(PathBuf::from(SETTINGS_FILE_NAME));
            let settings = store.settings();
            assert_eq!(settings.widget.title, "Help desk");
            assert_eq!(settings.widget.reply_delay_ms, 100);
            assert_eq!(settings.theme_mode, ThemeMode::Dark);
            Ok(())
        });
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(SETTINGS_FILE_NAME, "{ not json")?;

            let store = SettingsStore::new(PathBuf::from(SETTINGS_FILE_NAME));
            assert_eq!(*store.settings(), DesktopSettings::default());
            Ok(())
        });
    }

    #[test]
    fn update_persists_and_reloads() {
        figment::Jail::expect_with(|_jail| {
            let path = PathBuf::from("nested/settings.json");
            let store = SettingsStore::new(path.clone());
            let updated = DesktopSettings::default().with_toggled_theme();

            store.update(updated.clone()).map_err(|error| error.to_string())?;

            assert_eq!(*store.settings(), updated);
            assert_eq!(*SettingsStore::new(path).settings(), updated);
            Ok(())
        });
    }

    #[test]
    fn failed_save_keeps_previous_settings() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("blocked", "not a directory")?;
            let store = SettingsStore::new(PathBuf::from("blocked/settings.json"));

            let error = store
                .update(DesktopSettings::default().with_toggled_theme())
                .expect_err("a file cannot hold the settings directory");

            assert!(matches!(error, SettingsError::PrepareDirectory { .. }));
            assert!(error.to_string().contains("prepare-settings-directory"));
            assert_eq!(store.settings().theme_mode, ThemeMode::Light);
            Ok(())
        });
    }
}
