//! Host services consumed by the message list.

use std::rc::Rc;

use crate::animation::Tweener;
use crate::config::PanelConfig;
use crate::text::markup::{DefaultMarkup, MarkupRenderer};

/// Pointer cursor shapes the list asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    PointingHand,
}

/// Desktop shell the list lives in. Every method defaults to doing nothing.
pub trait ShellHost {
    /// Open `uri` with the user's default handler.
    fn launch_uri(&self, _uri: &str) {}

    fn set_cursor(&self, _cursor: Cursor) {}

    /// Re-evaluate what is under the pointer after actors went away.
    fn sync_pointer(&self) {}

    fn hide_overview(&self) {}

    fn close_calendar(&self) {}
}

/// Host that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl ShellHost for NullHost {}

/// Collaborators shared by every message and section.
pub struct Services {
    pub tweener: Rc<dyn Tweener>,
    pub markup: Rc<dyn MarkupRenderer>,
    pub host: Rc<dyn ShellHost>,
    pub config: PanelConfig,
}

impl Services {
    pub fn new(
        tweener: Rc<dyn Tweener>,
        markup: Rc<dyn MarkupRenderer>,
        host: Rc<dyn ShellHost>,
        config: PanelConfig,
    ) -> Rc<Self> {
        Rc::new(Self { tweener, markup, host, config })
    }

    /// Default markup, no host, default config.
    pub fn headless(tweener: Rc<dyn Tweener>) -> Rc<Self> {
        Self::new(tweener, Rc::new(DefaultMarkup), Rc::new(NullHost), PanelConfig::default())
    }
}
