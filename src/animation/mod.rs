//! Property tweening contract and the reference tick-driven scheduler.
//!
//! Components never animate anything themselves: they hand a [`Tween`] to a
//! [`Tweener`] and move on. The scheduler interpolates the property on its
//! own clock and invokes the completion callback once the final value has
//! been written.

mod timeline;

use std::fmt;
use std::rc::Rc;

pub use timeline::{ScheduledTween, Timeline};

/// Easing curve applied to linear progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Animatable numeric properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Expander layout blend factor.
    Expansion,
    ScaleX,
    ScaleY,
    /// Both scale axes at once.
    Scale,
    Opacity,
    TranslationX,
}

impl Property {
    /// Whether two properties write to the same underlying value.
    pub fn overlaps(self, other: Property) -> bool {
        use Property::*;
        self == other
            || matches!(
                (self, other),
                (Scale, ScaleX) | (Scale, ScaleY) | (ScaleX, Scale) | (ScaleY, Scale)
            )
    }
}

/// Something a scheduler can drive.
pub trait Animatable {
    /// Identity used to detect tweens on the same target.
    fn animation_key(&self) -> u64;

    fn property(&self, property: Property) -> f64;

    fn set_property(&self, property: Property, value: f64);
}

/// One property animation request.
pub struct Tween {
    pub target: Rc<dyn Animatable>,
    pub property: Property,
    pub value: f64,
    pub duration: f64,
    pub delay: f64,
    pub easing: Easing,
    pub on_complete: Option<Box<dyn FnOnce()>>,
}

impl Tween {
    pub fn new(target: Rc<dyn Animatable>, property: Property, value: f64, duration: f64) -> Self {
        Self {
            target,
            property,
            value,
            duration,
            delay: 0.0,
            easing: Easing::Linear,
            on_complete: None,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("target", &self.target.animation_key())
            .field("property", &self.property)
            .field("value", &self.value)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Scheduler accepting tween requests.
///
/// Implementations must fire `on_complete` at most once, after the property
/// has reached its final value, on the thread that drives them. A tween on a
/// (target, property) pair already being animated supersedes the old one.
pub trait Tweener {
    fn add_tween(&self, tween: Tween);
}
