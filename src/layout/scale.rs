use super::{LayoutManager, LayoutRect, SizeRequest, bin_allocate, bin_preferred_height, bin_preferred_width};
use crate::widget::Actor;

/// Bin layout whose size request follows the container's own scale, so a
/// shrinking container also shrinks the space it claims from its parent.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScaleLayout;

impl LayoutManager for ScaleLayout {
    fn preferred_width(&self, container: &Actor, for_height: Option<f32>) -> SizeRequest {
        bin_preferred_width(container, for_height).scaled_floor(container.scale_x())
    }

    fn preferred_height(&self, container: &Actor, for_width: Option<f32>) -> SizeRequest {
        bin_preferred_height(container, for_width).scaled_floor(container.scale_y())
    }

    fn allocate(&self, container: &Actor, rect: LayoutRect) {
        bin_allocate(container, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_size_follows_scale() {
        let container = Actor::with_layout("container", Rc::new(ScaleLayout));
        let child = Actor::new("child");
        child.set_size_request(SizeRequest::new(100.0, 101.0), SizeRequest::new(40.0, 41.0));
        container.add_child(child);

        container.set_scale(0.5, 0.5);
        assert_eq!(container.preferred_width(None), SizeRequest::new(50.0, 50.0));
        assert_eq!(container.preferred_height(None), SizeRequest::new(20.0, 20.0));

        container.set_scale(0.0, 0.0);
        assert_eq!(container.preferred_height(None), SizeRequest::default());
    }
}
