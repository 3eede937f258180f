#![deny(unsafe_code)]

//! Desktop host for the Repli chat widget.
//!
//! The widget is drawn with GPUI and gpui-component in a window that stands in for a
//! host page, anchored to its bottom-right corner.

pub mod app;
/// Settings persistence for the desktop host.
pub mod settings;
/// Launcher, panel and their child views.
pub mod widget;
