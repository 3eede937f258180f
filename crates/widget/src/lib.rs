#![deny(unsafe_code)]

//! Framework-agnostic core of the Repli chat widget.
//!
//! [`ChatWidget`] owns all widget state and the simulated reply lifecycle. Hosts render
//! that state and run one timer per [`PendingReply`]; [`WidgetSession`] is a ready-made
//! host for tokio runtimes.

/// Widget configuration layered from defaults, files and environment.
pub mod config;
pub mod error;
/// Message log entities.
pub mod message;
#[cfg(feature = "tokio")]
pub mod session;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{WidgetError, WidgetResult};
pub use message::{Message, MessageContent, MessageId, Sender};
#[cfg(feature = "tokio")]
pub use session::{WidgetEvent, WidgetSession};
pub use widget::{ChatWidget, PendingReply, ReplyPhase, WidgetState};
