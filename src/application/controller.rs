//! Interaction controller: owns all scene state and runs the collapse/expand
//! state machine.
//!
//! Clicks become [`Command::Toggle`] messages. With an animator, a transition runs in
//! two strictly sequential fade phases whose completions are collected in
//! [`Controller::advance`]. Without one, transitions apply immediately.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::application::scene::{Scene, ToggleState};
use crate::domain::NodeId;
use crate::infrastructure::traits::{Animator, Easing, PrimitiveId, Surface, Tween, TweenId};

/// Messages handled by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle(NodeId),
}

/// Result of dispatching a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// An animated transition began
    Started,
    /// Applied without animation; carries the new state
    Completed(ToggleState),
    /// The node is mid-transition; the toggle was rejected
    Busy,
    /// Leaf or zero-child node
    NotToggleable,
    UnknownNode,
}

/// Animation parameters of fade phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub duration: Duration,
    pub easing: Easing,
    /// Force-complete a phase that has not finished after this long
    pub timeout: Option<Duration>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            easing: Easing::EaseOutQuad,
            timeout: Some(Duration::from_millis(1500)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    FadeOutChildren,
    FadeInSummary,
    FadeOutSummary,
    FadeInChildren,
}

impl Phase {
    fn opacities(self) -> (f64, f64) {
        match self {
            Phase::FadeOutChildren | Phase::FadeOutSummary => (1.0, 0.0),
            Phase::FadeInSummary | Phase::FadeInChildren => (0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    phase: Phase,
    tween: TweenId,
    phase_started: Duration,
}

/// Sole owner of the drawn surface and every scene group's toggle state.
pub struct Controller {
    surface: Box<dyn Surface>,
    animator: Option<Box<dyn Animator>>,
    scene: Scene,
    transitions: HashMap<NodeId, Transition>,
    timing: Timing,
    clock: Duration,
}

impl Controller {
    pub fn new(
        surface: Box<dyn Surface>,
        animator: Option<Box<dyn Animator>>,
        scene: Scene,
        timing: Timing,
    ) -> Self {
        Self {
            surface,
            animator,
            scene,
            transitions: HashMap::new(),
            timing,
            clock: Duration::ZERO,
        }
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_animated(&self) -> bool {
        self.animator.is_some()
    }

    /// Settled state of a node; mid-transition nodes report their source state.
    pub fn state(&self, id: NodeId) -> Option<ToggleState> {
        self.scene.get(id).map(|g| g.state())
    }

    pub fn in_transition(&self, id: NodeId) -> bool {
        self.transitions.contains_key(&id)
    }

    pub fn has_pending(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Whether the node's summary label is currently shown.
    pub fn summary_visible(&self, id: NodeId) -> bool {
        self.scene
            .get(id)
            .and_then(|g| g.summary)
            .map(|s| self.surface.is_visible(s))
            .unwrap_or(false)
    }

    pub fn to_svg(&self) -> String {
        self.surface.to_svg()
    }

    /// Resolve a click on a primitive into a toggle command.
    pub fn click(&mut self, primitive: PrimitiveId) -> Option<ToggleOutcome> {
        let node = self.surface.hit(primitive)?;
        Some(self.dispatch(Command::Toggle(node)))
    }

    pub fn toggle(&mut self, id: NodeId) -> ToggleOutcome {
        self.dispatch(Command::Toggle(id))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, command: Command) -> ToggleOutcome {
        let Command::Toggle(id) = command;
        let Some(group) = self.scene.get(id) else {
            return ToggleOutcome::UnknownNode;
        };
        if !group.is_toggleable() {
            return ToggleOutcome::NotToggleable;
        }
        if self.transitions.contains_key(&id) {
            debug!("{} is mid-transition, toggle rejected", id);
            return ToggleOutcome::Busy;
        }

        let state = group.state();
        if self.animator.is_none() {
            let next = self.apply_instantly(id, state);
            return ToggleOutcome::Completed(next);
        }

        let phase = match state {
            ToggleState::Expanded => Phase::FadeOutChildren,
            ToggleState::Collapsed => Phase::FadeOutSummary,
        };
        self.begin_phase(id, phase);
        ToggleOutcome::Started
    }

    /// Advance the animation clock and finish every phase that completed.
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock += elapsed;
        let finished = match self.animator.as_mut() {
            Some(animator) => animator.advance(self.surface.as_mut(), elapsed),
            None => Vec::new(),
        };
        for tween in finished {
            let owner = self
                .transitions
                .iter()
                .find(|(_, t)| t.tween == tween)
                .map(|(&id, _)| id);
            if let Some(id) = owner {
                self.finish_phase(id);
            }
        }
        self.expire_stalled();
    }

    /// Advance in `step` increments until no transition is pending.
    ///
    /// Returns false if transitions remain after `max_steps`.
    pub fn settle(&mut self, step: Duration, max_steps: usize) -> bool {
        let mut steps = 0;
        while self.has_pending() && steps < max_steps {
            self.advance(step);
            steps += 1;
        }
        !self.has_pending()
    }

    fn apply_instantly(&mut self, id: NodeId, state: ToggleState) -> ToggleState {
        let Some(group) = self.scene.get(id) else {
            return state;
        };
        let (child_groups, summary) = (group.child_groups.clone(), group.summary);
        let next = match state {
            ToggleState::Expanded => {
                for g in &child_groups {
                    self.surface.hide(*g);
                }
                if let Some(s) = summary {
                    self.surface.show(s);
                }
                ToggleState::Collapsed
            }
            ToggleState::Collapsed => {
                if let Some(s) = summary {
                    self.surface.hide(s);
                }
                for g in &child_groups {
                    self.surface.show(*g);
                }
                ToggleState::Expanded
            }
        };
        self.set_state(id, next);
        next
    }

    fn phase_targets(&self, id: NodeId, phase: Phase) -> Vec<PrimitiveId> {
        let Some(group) = self.scene.get(id) else {
            return Vec::new();
        };
        match phase {
            Phase::FadeOutChildren | Phase::FadeInChildren => group.child_groups.clone(),
            Phase::FadeOutSummary | Phase::FadeInSummary => group.summary.into_iter().collect(),
        }
    }

    fn begin_phase(&mut self, id: NodeId, phase: Phase) {
        let targets = self.phase_targets(id, phase);
        let (from, to) = phase.opacities();
        let Some(animator) = self.animator.as_mut() else {
            return;
        };
        let tween = animator.start(
            self.surface.as_mut(),
            Tween {
                targets,
                from,
                to,
                duration: self.timing.duration,
                easing: self.timing.easing,
            },
        );
        debug!("{}: {:?} started", id, phase);
        self.transitions.insert(
            id,
            Transition {
                phase,
                tween,
                phase_started: self.clock,
            },
        );
    }

    fn finish_phase(&mut self, id: NodeId) {
        let Some(transition) = self.transitions.remove(&id) else {
            return;
        };
        let Some(group) = self.scene.get(id) else {
            return;
        };
        let (child_groups, summary) = (group.child_groups.clone(), group.summary);
        debug!("{}: {:?} finished", id, transition.phase);

        match transition.phase {
            Phase::FadeOutChildren => {
                for g in &child_groups {
                    self.surface.hide(*g);
                }
                if let Some(s) = summary {
                    self.surface.show(s);
                }
                self.begin_phase(id, Phase::FadeInSummary);
            }
            Phase::FadeInSummary => self.set_state(id, ToggleState::Collapsed),
            Phase::FadeOutSummary => {
                if let Some(s) = summary {
                    self.surface.hide(s);
                }
                for g in &child_groups {
                    self.surface.show(*g);
                }
                self.begin_phase(id, Phase::FadeInChildren);
            }
            Phase::FadeInChildren => self.set_state(id, ToggleState::Expanded),
        }
    }

    fn expire_stalled(&mut self) {
        let Some(timeout) = self.timing.timeout else {
            return;
        };
        let stalled: Vec<(NodeId, Transition)> = self
            .transitions
            .iter()
            .filter(|(_, t)| self.clock.saturating_sub(t.phase_started) > timeout)
            .map(|(&id, &t)| (id, t))
            .collect();

        for (id, transition) in stalled {
            warn!(
                "{}: {:?} did not complete within {:?}, forcing completion",
                id, transition.phase, timeout
            );
            if let Some(animator) = self.animator.as_mut() {
                animator.cancel(transition.tween);
            }
            let (_, end) = transition.phase.opacities();
            for target in self.phase_targets(id, transition.phase) {
                self.surface.set_opacity(target, end);
            }
            self.finish_phase(id);
        }
    }

    fn set_state(&mut self, id: NodeId, state: ToggleState) {
        if let Some(group) = self.scene.get_mut(id) {
            group.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scene::SceneBuilder;
    use crate::domain::{layout, LayoutConfig, TreeArena, TreeBuilder, TreeLiteral};
    use crate::infrastructure::svg::{SvgStyle, SvgSurface};

    /// Animator whose tweens never finish.
    struct StalledAnimator;

    impl Animator for StalledAnimator {
        fn start(&mut self, _surface: &mut dyn Surface, _tween: Tween) -> TweenId {
            TweenId(0)
        }
        fn advance(&mut self, _surface: &mut dyn Surface, _elapsed: Duration) -> Vec<TweenId> {
            Vec::new()
        }
        fn cancel(&mut self, _id: TweenId) {}
        fn in_flight(&self) -> usize {
            0
        }
    }

    fn controller(animator: Option<Box<dyn Animator>>, timing: Timing) -> (TreeArena, Controller) {
        let tree = TreeBuilder::new()
            .build(&TreeLiteral::node("VP", ["saw".into(), "you".into()]))
            .unwrap();
        let mut surface = SvgSurface::new(800.0, 300.0, SvgStyle::default());
        let tree_layout = layout(&tree, 0.0, 0.0, &LayoutConfig::default(), |_: &str| 10.0);
        let scene = SceneBuilder::new(&tree, &tree_layout, 40.0).build(&mut surface);
        (tree, Controller::new(Box::new(surface), animator, scene, timing))
    }

    #[test]
    fn given_stalled_animator_when_timeout_passes_then_phase_is_forced() {
        let timing = Timing {
            timeout: Some(Duration::from_millis(100)),
            ..Timing::default()
        };
        let (tree, mut ctl) = controller(Some(Box::new(StalledAnimator)), timing);
        let root = tree.root().unwrap();

        assert_eq!(ctl.toggle(root), ToggleOutcome::Started);
        ctl.advance(Duration::from_millis(150));
        assert!(ctl.in_transition(root), "second phase should be running");
        ctl.advance(Duration::from_millis(150));

        assert!(!ctl.in_transition(root));
        assert_eq!(ctl.state(root), Some(ToggleState::Collapsed));
        assert!(ctl.summary_visible(root));
    }

    #[test]
    fn given_stalled_animator_without_timeout_when_advancing_then_stays_busy() {
        let timing = Timing {
            timeout: None,
            ..Timing::default()
        };
        let (tree, mut ctl) = controller(Some(Box::new(StalledAnimator)), timing);
        let root = tree.root().unwrap();

        ctl.toggle(root);
        assert!(!ctl.settle(Duration::from_millis(100), 20));
        assert_eq!(ctl.toggle(root), ToggleOutcome::Busy);
    }

    #[test]
    fn given_leaf_when_toggling_then_not_toggleable() {
        let (tree, mut ctl) = controller(None, Timing::default());
        let root = tree.root().unwrap();
        let leaf = tree.get_node(root).unwrap().children[0];
        assert_eq!(ctl.toggle(leaf), ToggleOutcome::NotToggleable);
    }

    #[test]
    fn given_label_click_when_dispatching_then_toggles_its_node() {
        let (tree, mut ctl) = controller(None, Timing::default());
        let root = tree.root().unwrap();
        let label = ctl.scene().get(root).unwrap().label;
        assert_eq!(
            ctl.click(label),
            Some(ToggleOutcome::Completed(ToggleState::Collapsed))
        );
    }
}
