//! Clock-driven opacity tweener
//!
//! Tweens progress only when [`Animator::advance`] is called, which keeps the whole
//! interaction single-threaded and deterministic.

use std::time::Duration;

use tracing::trace;

use crate::infrastructure::traits::{Animator, Surface, Tween, TweenId};

#[derive(Debug)]
struct ActiveTween {
    id: TweenId,
    tween: Tween,
    elapsed: Duration,
}

/// Animator that interpolates opacities against an externally advanced clock.
#[derive(Debug, Default)]
pub struct TimelineAnimator {
    active: Vec<ActiveTween>,
    next_id: u64,
}

impl TimelineAnimator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Animator for TimelineAnimator {
    fn start(&mut self, surface: &mut dyn Surface, tween: Tween) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        for &target in &tween.targets {
            surface.set_opacity(target, tween.from);
        }
        trace!("start tween {:?}: {} -> {} over {:?}", id, tween.from, tween.to, tween.duration);
        self.active.push(ActiveTween {
            id,
            tween,
            elapsed: Duration::ZERO,
        });
        id
    }

    fn advance(&mut self, surface: &mut dyn Surface, elapsed: Duration) -> Vec<TweenId> {
        let mut finished = Vec::new();
        for active in &mut self.active {
            active.elapsed += elapsed;
            let progress = if active.tween.duration.is_zero() {
                1.0
            } else {
                (active.elapsed.as_secs_f64() / active.tween.duration.as_secs_f64()).min(1.0)
            };
            let eased = active.tween.easing.apply(progress);
            let value = active.tween.from + (active.tween.to - active.tween.from) * eased;
            for &target in &active.tween.targets {
                surface.set_opacity(target, value);
            }
            if progress >= 1.0 {
                finished.push(active.id);
            }
        }
        self.active.retain(|a| !finished.contains(&a.id));
        finished
    }

    fn cancel(&mut self, id: TweenId) {
        self.active.retain(|a| a.id != id);
    }

    fn in_flight(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::svg::{SvgStyle, SvgSurface};
    use crate::infrastructure::traits::Easing;

    fn fade(target: crate::infrastructure::traits::PrimitiveId) -> Tween {
        Tween {
            targets: vec![target],
            from: 1.0,
            to: 0.0,
            duration: Duration::from_millis(100),
            easing: Easing::Linear,
        }
    }

    #[test]
    fn given_tween_when_advancing_halfway_then_interpolates_opacity() {
        let mut surface = SvgSurface::new(10.0, 10.0, SvgStyle::default());
        let t = surface.text("x");
        let mut animator = TimelineAnimator::new();
        animator.start(&mut surface, fade(t));

        let done = animator.advance(&mut surface, Duration::from_millis(50));

        assert!(done.is_empty());
        assert!((surface.opacity(t) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn given_tween_when_finishing_then_reports_completion_once() {
        let mut surface = SvgSurface::new(10.0, 10.0, SvgStyle::default());
        let t = surface.text("x");
        let mut animator = TimelineAnimator::new();
        let id = animator.start(&mut surface, fade(t));

        assert_eq!(animator.advance(&mut surface, Duration::from_millis(150)), vec![id]);
        assert!(animator.advance(&mut surface, Duration::from_millis(150)).is_empty());
        assert_eq!(surface.opacity(t), 0.0);
        assert_eq!(animator.in_flight(), 0);
    }

    #[test]
    fn given_cancelled_tween_when_advancing_then_not_reported() {
        let mut surface = SvgSurface::new(10.0, 10.0, SvgStyle::default());
        let t = surface.text("x");
        let mut animator = TimelineAnimator::new();
        let id = animator.start(&mut surface, fade(t));
        animator.cancel(id);
        assert!(animator.advance(&mut surface, Duration::from_millis(150)).is_empty());
    }
}
