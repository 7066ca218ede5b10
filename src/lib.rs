//! Notification list core
//!
//! Toolkit-independent model of a notification panel's message list: URL
//! highlighting labels, the expand/collapse body layout, dismissible messages
//! and the animated sections that hold them. Rendering, input delivery and
//! animation ticking are supplied by the host.

pub mod animation;
pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod message_list;
pub mod shell;
pub mod text;
pub mod widget;

pub use error::{ChildSlot, Error, Result};
