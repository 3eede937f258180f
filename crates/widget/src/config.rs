use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::error::{LoadConfigSnafu, WidgetResult};

pub const DEFAULT_TITLE: &str = "Repli Chat";
pub const DEFAULT_PLACEHOLDER: &str = "Type a message...";
pub const DEFAULT_REPLY_TEXT: &str = "Thanks for your message! This is a creative demo response.";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 2000;
pub const DEFAULT_CONTAINER_ID: &str = "repli-widget";
pub const DEFAULT_EMOJI_PALETTE: [&str; 10] =
    ["😊", "😂", "🤔", "👍", "❤️", "🎉", "🌟", "🔥", "🚀", "💡"];
/// Environment variables with this prefix override file configuration.
pub const ENV_PREFIX: &str = "REPLI_";

/// Presentation and reply settings for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub title: String,
    pub placeholder: String,
    pub reply_text: String,
    pub reply_delay_ms: u64,
    pub emoji_palette: Vec<String>,
    pub container_id: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            emoji_palette: default_emoji_palette(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Layers defaults, an optional JSON file and `REPLI_` environment overrides.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Json::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load(path: Option<&Path>) -> WidgetResult<Self> {
        let config = Self::figment(path)
            .extract::<Self>()
            .context(LoadConfigSnafu {
                stage: "extract-widget-config",
                path: path.map(Path::to_path_buf),
            })?;
        Ok(config.normalized())
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Trims text fields and restores defaults for blank values.
    pub fn normalized(mut self) -> Self {
        self.title = trimmed_or(self.title, DEFAULT_TITLE);
        self.placeholder = trimmed_or(self.placeholder, DEFAULT_PLACEHOLDER);
        self.reply_text = trimmed_or(self.reply_text, DEFAULT_REPLY_TEXT);
        self.container_id = trimmed_or(self.container_id, DEFAULT_CONTAINER_ID);

        // Stickers must carry a glyph, so blank palette entries are dropped.
        self.emoji_palette = self
            .emoji_palette
            .into_iter()
            .map(|glyph| glyph.trim().to_string())
            .filter(|glyph| !glyph.is_empty())
            .collect();
        if self.emoji_palette.is_empty() {
            self.emoji_palette = default_emoji_palette();
        }

        self
    }
}

fn default_emoji_palette() -> Vec<String> {
    DEFAULT_EMOJI_PALETTE
        .iter()
        .map(|glyph| glyph.to_string())
        .collect()
}

fn trimmed_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_widget() {
        let config = WidgetConfig::default();

        assert_eq!(config.title, "Repli Chat");
        assert_eq!(config.reply_delay(), Duration::from_millis(2000));
        assert_eq!(config.emoji_palette.len(), 10);
        assert_eq!(config.emoji_palette[0], "😊");
        assert_eq!(config.emoji_palette[9], "💡");
    }

    #[test]
    fn normalized_restores_blank_fields() {
        let config = WidgetConfig {
            title: "   ".to_string(),
            reply_text: String::new(),
            emoji_palette: vec![" ".to_string(), String::new()],
            container_id: " chat-root ".to_string(),
            ..WidgetConfig::default()
        }
        .normalized();

        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.reply_text, DEFAULT_REPLY_TEXT);
        assert_eq!(config.emoji_palette, default_emoji_palette());
        assert_eq!(config.container_id, "chat-root");
    }

    #[test]
    fn file_and_environment_layers_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "repli.json",
                r#"{ "title": "Support", "reply_delay_ms": 500, "emoji_palette": ["👋"] }"#,
            )?;
            jail.set_env("REPLI_REPLY_DELAY_MS", "750");

            let config = WidgetConfig::load(Some(Path::new("repli.json")))
                .map_err(|error| error.to_string())?;

            assert_eq!(config.title, "Support");
            assert_eq!(config.reply_delay_ms, 750);
            assert_eq!(config.emoji_palette, vec!["👋".to_string()]);
            assert_eq!(config.placeholder, DEFAULT_PLACEHOLDER);
            Ok(())
        });
    }

    #[test]
    fn malformed_file_reports_load_error() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("repli.json", r#"{ "reply_delay_ms": "soon" }"#)?;

            let error = WidgetConfig::load(Some(Path::new("repli.json")))
                .expect_err("string delay must not parse");
            assert!(error.to_string().contains("repli.json"));
            Ok(())
        });
    }
}
