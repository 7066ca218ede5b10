//! Two-slot layout blending a collapsed child into an expanded one.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{LayoutManager, LayoutRect, SizeRequest};
use crate::animation::{Animatable, Property};
use crate::error::{ChildSlot, Error, Result};
use crate::widget::{Actor, WeakActor, next_actor_id};

/// Cap on how many collapsed heights the expanded child may claim.
pub const DEFAULT_EXPAND_LINES: u32 = 6;

/// Layout manager for a body stack holding at most a collapsed child and an
/// expanded child.
///
/// `expansion` interpolates the preferred height between the two, but only
/// one child is ever visible: the collapsed one at exactly 0, the expanded one
/// above 0.
pub struct ExpanderLayout {
    key: u64,
    container: WeakActor,
    expansion: Cell<f64>,
    expand_lines: Cell<u32>,
    collapsed: RefCell<Option<Actor>>,
    expanded: RefCell<Option<Actor>>,
}

impl ExpanderLayout {
    /// Create the layout and install it as `container`'s layout manager.
    pub fn new(container: &Actor, expand_lines: u32) -> Rc<Self> {
        let layout = Rc::new(Self {
            key: next_actor_id(),
            container: container.downgrade(),
            expansion: Cell::new(0.0),
            expand_lines: Cell::new(expand_lines.max(1)),
            collapsed: RefCell::new(None),
            expanded: RefCell::new(None),
        });
        container.set_layout_manager(Some(layout.clone()));
        layout
    }

    pub fn expansion(&self) -> f64 {
        self.expansion.get()
    }

    pub fn set_expansion(&self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        if value == self.expansion.get() {
            return;
        }
        self.expansion.set(value);
        self.sync_visibility();
        self.queue_relayout();
    }

    pub fn expand_lines(&self) -> u32 {
        self.expand_lines.get()
    }

    pub fn set_expand_lines(&self, lines: u32) {
        let lines = lines.max(1);
        if self.expand_lines.replace(lines) == lines {
            return;
        }
        if self.expansion.get() > 0.0 {
            self.queue_relayout();
        }
    }

    pub fn collapsed_child(&self) -> Option<Actor> {
        Self::live(&self.collapsed)
    }

    pub fn expanded_child(&self) -> Option<Actor> {
        Self::live(&self.expanded)
    }

    /// Fill the collapsed slot, or destroy its occupant with `None`.
    pub fn set_collapsed_child(&self, child: Option<Actor>) -> Result<()> {
        self.fill_slot(&self.collapsed, ChildSlot::CollapsedBody, child, 0)
    }

    /// Fill the expanded slot, or destroy its occupant with `None`.
    pub fn set_expanded_child(&self, child: Option<Actor>) -> Result<()> {
        self.fill_slot(&self.expanded, ChildSlot::ExpandedBody, child, -1)
    }

    fn fill_slot(
        &self,
        slot: &RefCell<Option<Actor>>,
        kind: ChildSlot,
        child: Option<Actor>,
        index: isize,
    ) -> Result<()> {
        let current = Self::live(slot);
        let Some(child) = child else {
            if let Some(old) = current {
                slot.borrow_mut().take();
                old.destroy();
                self.queue_relayout();
            }
            return Ok(());
        };

        if current.is_some() {
            return Err(Error::DuplicateChild(kind));
        }
        *slot.borrow_mut() = Some(child.clone());
        if let Some(container) = self.container.upgrade() {
            container.insert_child_at_index(child, index);
        }
        self.sync_visibility();
        Ok(())
    }

    /// Slot occupant, dropping it if it was destroyed behind our back.
    fn live(slot: &RefCell<Option<Actor>>) -> Option<Actor> {
        let mut slot = slot.borrow_mut();
        if slot.as_ref().is_some_and(Actor::is_destroyed) {
            *slot = None;
        }
        slot.clone()
    }

    fn sync_visibility(&self) {
        let expanded = self.expansion.get() > 0.0;
        if let Some(child) = self.collapsed_child() {
            child.set_visible(!expanded);
        }
        if let Some(child) = self.expanded_child() {
            child.set_visible(expanded);
        }
    }

    fn queue_relayout(&self) {
        if let Some(container) = self.container.upgrade() {
            container.queue_relayout();
        }
    }
}

impl LayoutManager for ExpanderLayout {
    fn preferred_width(&self, _container: &Actor, for_height: Option<f32>) -> SizeRequest {
        [self.collapsed_child(), self.expanded_child()]
            .into_iter()
            .flatten()
            .fold(SizeRequest::default(), |acc, c| acc.max(c.preferred_width(for_height)))
    }

    fn preferred_height(&self, _container: &Actor, for_width: Option<f32>) -> SizeRequest {
        let collapsed = self
            .collapsed_child()
            .map(|c| c.preferred_height(for_width))
            .unwrap_or_default();
        let Some(expanded) = self.expanded_child() else {
            return collapsed;
        };

        let lines = self.expand_lines.get() as f32;
        let full = expanded.preferred_height(for_width);
        let clamped = SizeRequest::new(
            full.min.min(collapsed.min * lines),
            full.natural.min(collapsed.natural * lines),
        );
        let t = self.expansion.get() as f32;
        SizeRequest::new(
            collapsed.min + t * (clamped.min - collapsed.min),
            collapsed.natural + t * (clamped.natural - collapsed.natural),
        )
    }

    fn allocate(&self, container: &Actor, rect: LayoutRect) {
        super::bin_allocate(container, rect);
    }
}

impl Animatable for ExpanderLayout {
    fn animation_key(&self) -> u64 {
        self.key
    }

    fn property(&self, property: Property) -> f64 {
        match property {
            Property::Expansion => self.expansion.get(),
            _ => 0.0,
        }
    }

    fn set_property(&self, property: Property, value: f64) {
        if property == Property::Expansion {
            self.set_expansion(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(height: f32) -> Actor {
        let actor = Actor::new("label");
        actor.set_size_request(SizeRequest::new(50.0, 100.0), SizeRequest::new(height, height));
        actor
    }

    #[test]
    fn test_visibility_is_binary() {
        let stack = Actor::new("body-stack");
        let layout = ExpanderLayout::new(&stack, DEFAULT_EXPAND_LINES);
        let collapsed = label(10.0);
        let expanded = label(30.0);
        layout.set_collapsed_child(Some(collapsed.clone())).unwrap();
        layout.set_expanded_child(Some(expanded.clone())).unwrap();

        assert!(collapsed.is_visible());
        assert!(!expanded.is_visible());

        layout.set_expansion(0.01);
        assert!(!collapsed.is_visible());
        assert!(expanded.is_visible());

        layout.set_expansion(0.0);
        assert!(collapsed.is_visible());
        assert!(!expanded.is_visible());
    }

    #[test]
    fn test_second_child_in_slot_is_rejected() {
        let stack = Actor::new("body-stack");
        let layout = ExpanderLayout::new(&stack, DEFAULT_EXPAND_LINES);
        layout.set_expanded_child(Some(label(1.0))).unwrap();
        let err = layout.set_expanded_child(Some(label(2.0))).unwrap_err();
        assert!(matches!(err, Error::DuplicateChild(ChildSlot::ExpandedBody)));

        layout.set_expanded_child(None).unwrap();
        assert!(layout.expanded_child().is_none());
        layout.set_expanded_child(None).unwrap();
    }

    #[test]
    fn test_expand_lines_clamps_height() {
        let stack = Actor::new("body-stack");
        let layout = ExpanderLayout::new(&stack, 2);
        layout.set_collapsed_child(Some(label(10.0))).unwrap();
        layout.set_expanded_child(Some(label(100.0))).unwrap();

        layout.set_expansion(1.0);
        assert_eq!(stack.preferred_height(None), SizeRequest::new(20.0, 20.0));

        layout.set_expand_lines(4);
        assert_eq!(stack.preferred_height(None), SizeRequest::new(40.0, 40.0));
    }

    #[test]
    fn test_width_covers_both_slots() {
        let stack = Actor::new("body-stack");
        let layout = ExpanderLayout::new(&stack, DEFAULT_EXPAND_LINES);
        let narrow = Actor::new("narrow");
        narrow.set_size_request(SizeRequest::new(10.0, 20.0), SizeRequest::default());
        let wide = Actor::new("wide");
        wide.set_size_request(SizeRequest::new(5.0, 80.0), SizeRequest::default());
        layout.set_collapsed_child(Some(narrow)).unwrap();
        layout.set_expanded_child(Some(wide)).unwrap();

        assert_eq!(stack.preferred_width(None), SizeRequest::new(10.0, 80.0));
    }

    #[test]
    fn test_destroyed_child_frees_slot() {
        let stack = Actor::new("body-stack");
        let layout = ExpanderLayout::new(&stack, DEFAULT_EXPAND_LINES);
        let child = label(5.0);
        layout.set_expanded_child(Some(child.clone())).unwrap();
        child.destroy();
        assert!(layout.set_expanded_child(Some(label(6.0))).is_ok());
    }
}
