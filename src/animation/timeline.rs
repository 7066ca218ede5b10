//! Reference scheduler: advance tweens by a time delta, write eased values,
//! fire completion callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Animatable, Property, Tween, Tweener};

/// Read-only view of a pending tween.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTween {
    pub target: u64,
    pub property: Property,
    pub value: f64,
    pub duration: f64,
    pub delay: f64,
    pub elapsed: f64,
    pub has_callback: bool,
}

struct ActiveTween {
    tween: Tween,
    elapsed: f64,
    /// Captured when the delay has elapsed.
    start_value: Option<f64>,
}

impl ActiveTween {
    fn targets(&self, key: u64, property: Property) -> bool {
        self.tween.target.animation_key() == key && self.tween.property.overlaps(property)
    }
}

/// Tick-driven [`Tweener`].
#[derive(Default)]
pub struct Timeline {
    tweens: RefCell<Vec<ActiveTween>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tweens not yet finished.
    pub fn len(&self) -> usize {
        self.tweens.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.borrow().is_empty()
    }

    pub fn scheduled(&self) -> Vec<ScheduledTween> {
        self.tweens
            .borrow()
            .iter()
            .map(|t| ScheduledTween {
                target: t.tween.target.animation_key(),
                property: t.tween.property,
                value: t.tween.value,
                duration: t.tween.duration,
                delay: t.tween.delay,
                elapsed: t.elapsed,
                has_callback: t.tween.on_complete.is_some(),
            })
            .collect()
    }

    /// Advance every tween by `delta` seconds.
    ///
    /// Property writes and completion callbacks run after the internal borrow
    /// is released, so callbacks may schedule new tweens.
    pub fn tick(&self, delta: f64) {
        let mut updates: Vec<(Rc<dyn Animatable>, Property, f64)> = Vec::new();
        let mut finished: Vec<ActiveTween> = Vec::new();

        {
            let mut tweens = self.tweens.borrow_mut();
            let mut i = 0;
            while i < tweens.len() {
                let active = &mut tweens[i];
                active.elapsed += delta;
                if active.elapsed < active.tween.delay {
                    i += 1;
                    continue;
                }

                let start = match active.start_value {
                    Some(v) => v,
                    None => {
                        let v = active.tween.target.property(active.tween.property);
                        active.start_value = Some(v);
                        v
                    }
                };
                let progress = if active.tween.duration <= 0.0 {
                    1.0
                } else {
                    ((active.elapsed - active.tween.delay) / active.tween.duration).clamp(0.0, 1.0)
                };

                if progress >= 1.0 {
                    updates.push((active.tween.target.clone(), active.tween.property, active.tween.value));
                    finished.push(tweens.remove(i));
                } else {
                    let eased = active.tween.easing.apply(progress);
                    let value = start + (active.tween.value - start) * eased;
                    updates.push((active.tween.target.clone(), active.tween.property, value));
                    i += 1;
                }
            }
        }

        for (target, property, value) in updates {
            target.set_property(property, value);
        }
        for done in finished {
            if let Some(callback) = done.tween.on_complete {
                callback();
            }
        }
    }

    /// Tick in `step` increments until idle or `max_ticks` is reached.
    /// Returns the number of ticks run.
    pub fn run_until_idle(&self, step: f64, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while !self.is_idle() && ticks < max_ticks {
            self.tick(step);
            ticks += 1;
        }
        ticks
    }
}

impl Tweener for Timeline {
    fn add_tween(&self, tween: Tween) {
        let key = tween.target.animation_key();
        let property = tween.property;
        let superseded: Vec<ActiveTween> = {
            let mut tweens = self.tweens.borrow_mut();
            let (old, keep): (Vec<_>, Vec<_>) =
                tweens.drain(..).partition(|t| t.targets(key, property));
            *tweens = keep;
            tweens.push(ActiveTween { tween, elapsed: 0.0, start_value: None });
            old
        };
        if !superseded.is_empty() {
            tracing::debug!(target_id = key, ?property, count = superseded.len(), "Superseding in-flight tween");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Easing;
    use std::cell::Cell;

    struct Knob {
        key: u64,
        value: Cell<f64>,
    }

    impl Animatable for Knob {
        fn animation_key(&self) -> u64 {
            self.key
        }
        fn property(&self, _property: Property) -> f64 {
            self.value.get()
        }
        fn set_property(&self, _property: Property, value: f64) {
            self.value.set(value);
        }
    }

    fn knob(key: u64, value: f64) -> Rc<Knob> {
        Rc::new(Knob { key, value: Cell::new(value) })
    }

    #[test]
    fn test_linear_interpolation_and_completion() {
        let timeline = Timeline::new();
        let k = knob(1, 0.0);
        let done = Rc::new(Cell::new(0));
        let d = done.clone();
        timeline.add_tween(Tween::new(k.clone(), Property::Opacity, 1.0, 1.0).on_complete(move || d.set(d.get() + 1)));

        timeline.tick(0.25);
        assert!((k.value.get() - 0.25).abs() < 1e-9);
        assert_eq!(done.get(), 0);

        timeline.tick(1.0);
        assert_eq!(k.value.get(), 1.0);
        assert_eq!(done.get(), 1);
        assert!(timeline.is_idle());

        timeline.tick(1.0);
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn test_delay_captures_start_value_late() {
        let timeline = Timeline::new();
        let k = knob(1, 0.0);
        timeline.add_tween(Tween::new(k.clone(), Property::TranslationX, 100.0, 1.0).delay(0.5));

        timeline.tick(0.25);
        assert_eq!(k.value.get(), 0.0);
        k.value.set(50.0);
        timeline.tick(0.25);
        assert_eq!(k.value.get(), 50.0);
        timeline.tick(0.5);
        assert!((k.value.get() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_easing_applied() {
        let timeline = Timeline::new();
        let k = knob(1, 0.0);
        timeline.add_tween(Tween::new(k.clone(), Property::Expansion, 1.0, 1.0).easing(Easing::EaseOutQuad));
        timeline.tick(0.5);
        assert!((k.value.get() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_new_tween_supersedes_same_property() {
        let timeline = Timeline::new();
        let k = knob(7, 0.0);
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        timeline.add_tween(Tween::new(k.clone(), Property::ScaleY, 1.0, 1.0).on_complete(move || f.set(true)));
        timeline.add_tween(Tween::new(k.clone(), Property::Scale, 0.0, 1.0));

        assert_eq!(timeline.len(), 1);
        timeline.run_until_idle(0.1, 100);
        assert!(!fired.get());
        assert_eq!(k.value.get(), 0.0);
    }

    #[test]
    fn test_callback_may_schedule_followup() {
        let timeline = Rc::new(Timeline::new());
        let k = knob(3, 1.0);
        let t = timeline.clone();
        let k2 = k.clone();
        timeline.add_tween(Tween::new(k.clone(), Property::Scale, 0.0, 0.1).on_complete(move || {
            t.add_tween(Tween::new(k2, Property::Scale, 1.0, 0.1));
        }));

        timeline.tick(0.1);
        assert_eq!(k.value.get(), 0.0);
        assert_eq!(timeline.len(), 1);
        timeline.tick(0.1);
        assert_eq!(k.value.get(), 1.0);
        assert!(timeline.is_idle());
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let timeline = Timeline::new();
        let k = knob(1, 3.0);
        timeline.add_tween(Tween::new(k.clone(), Property::Opacity, 0.0, 0.0));
        timeline.tick(0.0);
        assert_eq!(k.value.get(), 0.0);
        assert!(timeline.is_idle());
    }
}
