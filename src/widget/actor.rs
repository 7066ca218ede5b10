//! Actor: a reference-counted scene node.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::next_actor_id;
use crate::animation::{Animatable, Property};
use crate::event::{HandlerId, Signals};
use crate::layout::{self, LayoutManager, LayoutRect, SizeRequest};

/// Signals emitted by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorSignal {
    Destroy,
    KeyFocusIn,
    Clicked,
    HoverChanged,
    StyleChanged,
    ChildAdded,
    ChildRemoved,
}

struct ActorState {
    id: u64,
    name: String,
    visible: Cell<bool>,
    hover: Cell<bool>,
    scale_x: Cell<f32>,
    scale_y: Cell<f32>,
    /// Own opacity (0.0 - 1.0).
    opacity: Cell<f32>,
    translation_x: Cell<f32>,
    width_request: Cell<SizeRequest>,
    height_request: Cell<SizeRequest>,
    allocation: Cell<Option<LayoutRect>>,
    needs_layout: Cell<bool>,
    destroyed: Cell<bool>,
    parent: RefCell<Weak<ActorState>>,
    children: RefCell<Vec<Actor>>,
    theme_colors: RefCell<HashMap<String, String>>,
    layout: RefCell<Option<Rc<dyn LayoutManager>>>,
    signals: Signals<ActorSignal>,
}

impl ActorState {
    /// Mark this actor and every ancestor as needing a new layout pass.
    fn queue_relayout(&self) {
        self.needs_layout.set(true);
        let mut parent = self.parent.borrow().upgrade();
        while let Some(p) = parent {
            p.needs_layout.set(true);
            parent = p.parent.borrow().upgrade();
        }
    }
}

impl Animatable for ActorState {
    fn animation_key(&self) -> u64 {
        self.id
    }

    fn property(&self, property: Property) -> f64 {
        match property {
            Property::ScaleX | Property::Scale => self.scale_x.get() as f64,
            Property::ScaleY => self.scale_y.get() as f64,
            Property::Opacity => self.opacity.get() as f64,
            Property::TranslationX => self.translation_x.get() as f64,
            Property::Expansion => 0.0,
        }
    }

    fn set_property(&self, property: Property, value: f64) {
        let value = value as f32;
        match property {
            Property::ScaleX => self.scale_x.set(value),
            Property::ScaleY => self.scale_y.set(value),
            Property::Scale => {
                self.scale_x.set(value);
                self.scale_y.set(value);
            }
            Property::Opacity => self.opacity.set(value.clamp(0.0, 1.0)),
            Property::TranslationX => self.translation_x.set(value),
            Property::Expansion => {
                tracing::warn!(actor = self.id, "Actors have no expansion property");
                return;
            }
        }
        // Scale feeds into ScaleLayout size requests.
        if matches!(property, Property::ScaleX | Property::ScaleY | Property::Scale) {
            self.queue_relayout();
        }
    }
}

/// Handle to a scene node. Clones share the node; equality is identity.
#[derive(Clone)]
pub struct Actor {
    inner: Rc<ActorState>,
}

/// Non-owning handle, for layout managers and callbacks.
#[derive(Clone, Default)]
pub struct WeakActor {
    inner: Weak<ActorState>,
}

impl WeakActor {
    pub fn upgrade(&self) -> Option<Actor> {
        self.inner.upgrade().map(|inner| Actor { inner })
    }
}

impl Actor {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Rc::new(ActorState {
                id: next_actor_id(),
                name: name.to_string(),
                visible: Cell::new(true),
                hover: Cell::new(false),
                scale_x: Cell::new(1.0),
                scale_y: Cell::new(1.0),
                opacity: Cell::new(1.0),
                translation_x: Cell::new(0.0),
                width_request: Cell::new(SizeRequest::default()),
                height_request: Cell::new(SizeRequest::default()),
                allocation: Cell::new(None),
                needs_layout: Cell::new(true),
                destroyed: Cell::new(false),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                theme_colors: RefCell::new(HashMap::new()),
                layout: RefCell::new(None),
                signals: Signals::new(),
            }),
        }
    }

    pub fn with_layout(name: &str, layout: Rc<dyn LayoutManager>) -> Self {
        let actor = Self::new(name);
        actor.set_layout_manager(Some(layout));
        actor
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Style name, for debugging and dumps.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn downgrade(&self) -> WeakActor {
        WeakActor { inner: Rc::downgrade(&self.inner) }
    }

    /// This actor as a tween target.
    pub fn animatable(&self) -> Rc<dyn Animatable> {
        self.inner.clone()
    }

    // --- visibility -------------------------------------------------------

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        if self.inner.visible.replace(visible) != visible {
            self.inner.queue_relayout();
        }
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    /// Visible along with every ancestor.
    pub fn is_mapped(&self) -> bool {
        let mut current = Some(self.clone());
        while let Some(actor) = current {
            if !actor.is_visible() {
                return false;
            }
            current = actor.parent();
        }
        true
    }

    pub fn hover(&self) -> bool {
        self.inner.hover.get()
    }

    /// Update the pointer-hover state; emits `HoverChanged` on change.
    pub fn set_hover(&self, hover: bool) {
        if self.inner.hover.replace(hover) != hover {
            self.inner.signals.emit(ActorSignal::HoverChanged);
        }
    }

    // --- transform and paint ----------------------------------------------

    pub fn scale_x(&self) -> f32 {
        self.inner.scale_x.get()
    }

    pub fn scale_y(&self) -> f32 {
        self.inner.scale_y.get()
    }

    pub fn set_scale(&self, x: f32, y: f32) {
        self.inner.scale_x.set(x);
        self.inner.scale_y.set(y);
        self.inner.queue_relayout();
    }

    pub fn set_scale_y(&self, y: f32) {
        self.inner.scale_y.set(y);
        self.inner.queue_relayout();
    }

    pub fn opacity(&self) -> f32 {
        self.inner.opacity.get()
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.inner.opacity.set(opacity.clamp(0.0, 1.0));
    }

    /// Effective opacity: own opacity times every ancestor's.
    pub fn paint_opacity(&self) -> f32 {
        let mut opacity = self.opacity();
        let mut parent = self.parent();
        while let Some(p) = parent {
            opacity *= p.opacity();
            parent = p.parent();
        }
        opacity
    }

    pub fn translation_x(&self) -> f32 {
        self.inner.translation_x.get()
    }

    pub fn set_translation_x(&self, x: f32) {
        self.inner.translation_x.set(x);
    }

    // --- size negotiation -------------------------------------------------

    /// Leaf size as measured by the renderer.
    pub fn set_size_request(&self, width: SizeRequest, height: SizeRequest) {
        self.inner.width_request.set(width);
        self.inner.height_request.set(height);
        self.inner.queue_relayout();
    }

    pub fn preferred_width(&self, for_height: Option<f32>) -> SizeRequest {
        match self.layout_manager() {
            Some(manager) => manager.preferred_width(self, for_height),
            None => self
                .inner
                .width_request
                .get()
                .max(layout::bin_preferred_width(self, for_height)),
        }
    }

    pub fn preferred_height(&self, for_width: Option<f32>) -> SizeRequest {
        match self.layout_manager() {
            Some(manager) => manager.preferred_height(self, for_width),
            None => self
                .inner
                .height_request
                .get()
                .max(layout::bin_preferred_height(self, for_width)),
        }
    }

    pub fn allocate(&self, rect: LayoutRect) {
        self.inner.allocation.set(Some(rect));
        self.inner.needs_layout.set(false);
        match self.layout_manager() {
            Some(manager) => manager.allocate(self, rect),
            None => layout::bin_allocate(self, rect),
        }
    }

    pub fn allocation(&self) -> Option<LayoutRect> {
        self.inner.allocation.get()
    }

    pub fn clear_allocation(&self) {
        self.inner.allocation.set(None);
    }

    pub fn needs_layout(&self) -> bool {
        self.inner.needs_layout.get()
    }

    pub fn queue_relayout(&self) {
        self.inner.queue_relayout();
    }

    pub fn layout_manager(&self) -> Option<Rc<dyn LayoutManager>> {
        self.inner.layout.borrow().clone()
    }

    pub fn set_layout_manager(&self, layout: Option<Rc<dyn LayoutManager>>) {
        *self.inner.layout.borrow_mut() = layout;
        self.inner.queue_relayout();
    }

    // --- theme ------------------------------------------------------------

    /// Set a named theme color; emits `StyleChanged`.
    pub fn set_theme_color(&self, name: &str, color: &str) {
        self.inner
            .theme_colors
            .borrow_mut()
            .insert(name.to_string(), color.to_string());
        self.inner.signals.emit(ActorSignal::StyleChanged);
    }

    pub fn lookup_color(&self, name: &str) -> Option<String> {
        self.inner.theme_colors.borrow().get(name).cloned()
    }

    // --- tree -------------------------------------------------------------

    pub fn parent(&self) -> Option<Actor> {
        self.inner.parent.borrow().upgrade().map(|inner| Actor { inner })
    }

    pub fn children(&self) -> Vec<Actor> {
        self.inner.children.borrow().clone()
    }

    pub fn n_children(&self) -> usize {
        self.inner.children.borrow().len()
    }

    pub fn child_at_index(&self, index: usize) -> Option<Actor> {
        self.inner.children.borrow().get(index).cloned()
    }

    pub fn index_of_child(&self, child: &Actor) -> Option<usize> {
        self.inner.children.borrow().iter().position(|c| c == child)
    }

    pub fn add_child(&self, child: Actor) {
        self.insert_child_at_index(child, -1);
    }

    /// Insert `child` at `index`; a negative or out-of-range index appends.
    /// A child that already has a parent is moved here.
    pub fn insert_child_at_index(&self, child: Actor, index: isize) {
        if child == *self || self.inner.destroyed.get() {
            return;
        }
        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(&child);
        }
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        {
            let mut children = self.inner.children.borrow_mut();
            match usize::try_from(index) {
                Ok(i) if i <= children.len() => children.insert(i, child),
                _ => children.push(child),
            }
        }
        self.inner.queue_relayout();
        self.inner.signals.emit(ActorSignal::ChildAdded);
    }

    /// Move an existing child to `index` without re-parenting it.
    pub fn set_child_at_index(&self, child: &Actor, index: isize) {
        let moved = {
            let mut children = self.inner.children.borrow_mut();
            match children.iter().position(|c| c == child) {
                Some(pos) => {
                    let c = children.remove(pos);
                    match usize::try_from(index) {
                        Ok(i) if i <= children.len() => children.insert(i, c),
                        _ => children.push(c),
                    }
                    true
                }
                None => false,
            }
        };
        if moved {
            self.inner.queue_relayout();
        }
    }

    /// Detach `child`; emits `ChildRemoved`. Returns false if it was not ours.
    pub fn remove_child(&self, child: &Actor) -> bool {
        let removed = {
            let mut children = self.inner.children.borrow_mut();
            match children.iter().position(|c| c == child) {
                Some(pos) => Some(children.remove(pos)),
                None => None,
            }
        };
        let Some(removed) = removed else {
            return false;
        };
        *removed.inner.parent.borrow_mut() = Weak::new();
        self.inner.queue_relayout();
        self.inner.signals.emit(ActorSignal::ChildRemoved);
        true
    }

    /// Bin semantics: destroy any current children and hold `child` alone.
    pub fn set_child(&self, child: Option<Actor>) {
        for old in self.children() {
            if child.as_ref() != Some(&old) {
                old.destroy();
            }
        }
        if let Some(child) = child {
            if child.parent().as_ref() != Some(self) {
                self.add_child(child);
            }
        }
    }

    // --- lifecycle and signals ---------------------------------------------

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Emit `Destroy`, destroy the subtree, detach from the parent and drop
    /// every handler. Only the first call has any effect.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.inner.signals.emit(ActorSignal::Destroy);

        let children: Vec<Actor> = self.inner.children.borrow_mut().drain(..).collect();
        for child in children {
            *child.inner.parent.borrow_mut() = Weak::new();
            child.destroy();
        }
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }

        self.inner.layout.borrow_mut().take();
        self.inner.signals.clear();
    }

    /// Simulate keyboard focus entering this actor.
    pub fn grab_key_focus(&self) {
        if !self.is_destroyed() {
            self.inner.signals.emit(ActorSignal::KeyFocusIn);
        }
    }

    /// Simulate a button click on this actor.
    pub fn click(&self) {
        if !self.is_destroyed() {
            self.inner.signals.emit(ActorSignal::Clicked);
        }
    }

    pub fn connect(&self, signal: ActorSignal, callback: impl Fn() + 'static) -> HandlerId {
        self.inner.signals.connect(signal, callback)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.inner.signals.disconnect(id)
    }

    pub fn handler_count(&self, signal: ActorSignal) -> usize {
        self.inner.signals.handler_count(signal)
    }
}

impl PartialEq for Actor {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Actor {}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("visible", &self.inner.visible.get())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}
