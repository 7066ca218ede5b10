//! Shared test helpers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use notification_list::animation::Timeline;
use notification_list::config::PanelConfig;
use notification_list::shell::{Cursor, Services, ShellHost};
use notification_list::text::DefaultMarkup;

/// Host that records every request.
#[derive(Default)]
pub struct RecordingHost {
    pub launched: RefCell<Vec<String>>,
    pub cursors: RefCell<Vec<Cursor>>,
    pub pointer_syncs: Cell<usize>,
    pub overview_hidden: Cell<usize>,
    pub calendar_closed: Cell<usize>,
}

impl ShellHost for RecordingHost {
    fn launch_uri(&self, uri: &str) {
        self.launched.borrow_mut().push(uri.to_string());
    }

    fn set_cursor(&self, cursor: Cursor) {
        self.cursors.borrow_mut().push(cursor);
    }

    fn sync_pointer(&self) {
        self.pointer_syncs.set(self.pointer_syncs.get() + 1);
    }

    fn hide_overview(&self) {
        self.overview_hidden.set(self.overview_hidden.get() + 1);
    }

    fn close_calendar(&self) {
        self.calendar_closed.set(self.calendar_closed.get() + 1);
    }
}

pub struct Harness {
    pub timeline: Rc<Timeline>,
    pub host: Rc<RecordingHost>,
    pub services: Rc<Services>,
}

impl Harness {
    /// Run the timeline until every tween has finished.
    #[allow(dead_code)]
    pub fn settle(&self) {
        self.timeline.run_until_idle(0.01, 10_000);
        assert!(self.timeline.is_idle(), "animations did not settle");
    }
}

/// Timeline, recording host, default markup and config.
pub fn harness() -> Harness {
    let timeline = Rc::new(Timeline::new());
    let host = Rc::new(RecordingHost::default());
    let services = Services::new(timeline.clone(), Rc::new(DefaultMarkup), host.clone(), PanelConfig::default());
    Harness { timeline, host, services }
}

/// A shared counter and a callback that bumps it.
#[allow(dead_code)]
pub fn counter() -> (Rc<Cell<usize>>, impl Fn() + 'static) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, move || c.set(c.get() + 1))
}
