//! Size negotiation and allocation for actors.
//!
//! The renderer supplies leaf size requests; containers derive theirs from
//! their children through an optional [`LayoutManager`]. Without one, an actor
//! behaves like a bin: children are stacked and share the same box.

mod expander;
mod scale;

pub use expander::{DEFAULT_EXPAND_LINES, ExpanderLayout};
pub use scale::ScaleLayout;

use crate::widget::Actor;

/// Simple layout rect for actor positioning.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Minimum and natural extent along one axis.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SizeRequest {
    pub min: f32,
    pub natural: f32,
}

impl SizeRequest {
    pub fn new(min: f32, natural: f32) -> Self {
        Self { min, natural }
    }

    /// Component-wise maximum.
    pub fn max(self, other: SizeRequest) -> Self {
        Self {
            min: self.min.max(other.min),
            natural: self.natural.max(other.natural),
        }
    }

    /// Multiply both components and round down.
    pub fn scaled_floor(self, factor: f32) -> Self {
        Self {
            min: (self.min * factor).floor(),
            natural: (self.natural * factor).floor(),
        }
    }
}

/// Pluggable size negotiation for a container actor.
pub trait LayoutManager {
    fn preferred_width(&self, container: &Actor, for_height: Option<f32>) -> SizeRequest;

    fn preferred_height(&self, container: &Actor, for_width: Option<f32>) -> SizeRequest;

    fn allocate(&self, container: &Actor, rect: LayoutRect);
}

/// Widest visible child.
pub fn bin_preferred_width(container: &Actor, for_height: Option<f32>) -> SizeRequest {
    container
        .children()
        .iter()
        .filter(|c| c.is_visible())
        .fold(SizeRequest::default(), |acc, c| acc.max(c.preferred_width(for_height)))
}

/// Tallest visible child.
pub fn bin_preferred_height(container: &Actor, for_width: Option<f32>) -> SizeRequest {
    container
        .children()
        .iter()
        .filter(|c| c.is_visible())
        .fold(SizeRequest::default(), |acc, c| acc.max(c.preferred_height(for_width)))
}

/// Give every visible child the whole box.
pub fn bin_allocate(container: &Actor, rect: LayoutRect) {
    for child in container.children() {
        if child.is_visible() {
            child.allocate(rect);
        } else {
            child.clear_allocation();
        }
    }
}
