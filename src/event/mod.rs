//! Named-signal dispatch for actors, messages and sections.
//!
//! Every emitting entity owns a [`Signals`] registry mapping a signal kind to
//! its ordered handler list. Delivery is synchronous, on the calling thread,
//! in connection order.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Opaque handle returned by [`Signals::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Whether an input event should keep travelling to other handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Propagate,
    Stop,
}

/// Keys the message list reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    KpDelete,
    Escape,
}

type Callback = Rc<dyn Fn()>;

/// Per-entity handler registry.
pub struct Signals<S> {
    next_id: Cell<u64>,
    handlers: RefCell<HashMap<S, Vec<(HandlerId, Callback)>>>,
}

impl<S: Copy + Eq + Hash + fmt::Debug> Signals<S> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            handlers: RefCell::new(HashMap::new()),
        }
    }

    /// Register `callback` for `signal`.
    pub fn connect(&self, signal: S, callback: impl Fn() + 'static) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .entry(signal)
            .or_default()
            .push((id, Rc::new(callback)));
        id
    }

    /// Remove a handler. Returns false if it was already gone.
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(hid, _)| *hid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn is_connected(&self, id: HandlerId) -> bool {
        self.handlers
            .borrow()
            .values()
            .any(|list| list.iter().any(|(hid, _)| *hid == id))
    }

    /// Number of handlers currently attached to `signal`.
    pub fn handler_count(&self, signal: S) -> usize {
        self.handlers.borrow().get(&signal).map_or(0, Vec::len)
    }

    /// Invoke every handler of `signal` in connection order.
    ///
    /// The handler list is snapshotted first so handlers may connect or
    /// disconnect freely; a handler disconnected mid-emission is skipped.
    pub fn emit(&self, signal: S) {
        let pending: Vec<(HandlerId, Callback)> = match self.handlers.borrow().get(&signal) {
            Some(list) => list.clone(),
            None => return,
        };
        for (id, callback) in pending {
            if self.is_connected(id) {
                callback();
            }
        }
    }

    /// Drop every handler.
    pub fn clear(&self) {
        self.handlers.borrow_mut().clear();
    }
}

impl<S: Copy + Eq + Hash + fmt::Debug> Default for Signals<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug> fmt::Debug for Signals<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        let mut map = f.debug_map();
        for (signal, list) in handlers.iter() {
            map.entry(signal, &list.len());
        }
        map.finish()
    }
}
