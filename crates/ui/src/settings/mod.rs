pub mod error;
pub mod state;

pub use error::SettingsError;
pub use state::{DesktopSettings, SettingsStore};
