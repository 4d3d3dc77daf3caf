//! Integration tests for collapse/expand interaction on a drawn diagram.

use std::time::Duration;

use syntree::application::services::{Diagram, DrawService};
use syntree::application::{ToggleOutcome, ToggleState};
use syntree::config::{DrawOptions, Settings};
use syntree::domain::NodeId;
use syntree::infrastructure::animation::TimelineAnimator;
use syntree::infrastructure::svg::{SvgRenderer, SvgStyle};
use syntree::infrastructure::traits::{Animator, AnimatorFactory, Surface};
use syntree::util::testing::{init_test_setup, sample_sentence};

fn draw(animated: bool) -> Diagram {
    init_test_setup();
    let renderer = SvgRenderer::new(SvgStyle::default()).with_container("tree");
    let animator: Option<AnimatorFactory> = if animated {
        Some(Box::new(|| Box::new(TimelineAnimator::new()) as Box<dyn Animator>))
    } else {
        None
    };
    let mut service = DrawService::new(Some(Box::new(renderer)), animator, Settings::default());
    service
        .draw(&sample_sentence(), "tree", &DrawOptions::default())
        .unwrap()
}

fn node(diagram: &Diagram, label: &str) -> NodeId {
    diagram.tree().find_by_label(label)[0]
}

fn group_rendered(diagram: &Diagram, label: &str) -> bool {
    let id = node(diagram, label);
    let group = diagram.controller().scene().get(id).unwrap().group;
    diagram.controller().surface().is_rendered(group)
}

#[test]
fn given_unanimated_diagram_when_clicking_vp_then_only_its_children_hide() {
    // Arrange
    let mut diagram = draw(false);
    let vp = node(&diagram, "VP");
    let label = diagram.controller().scene().get(vp).unwrap().label;

    // Act
    let outcome = diagram.controller_mut().click(label);

    // Assert
    assert_eq!(outcome, Some(ToggleOutcome::Completed(ToggleState::Collapsed)));
    assert!(!group_rendered(&diagram, "saw"));
    assert!(!group_rendered(&diagram, "you"));
    assert!(diagram.controller().summary_visible(vp));
    assert!(group_rendered(&diagram, "S"));
    assert!(group_rendered(&diagram, "NP"));
    assert!(group_rendered(&diagram, "I"));
    assert!(group_rendered(&diagram, "VP"));
    assert!(!diagram.controller().summary_visible(node(&diagram, "S")));
    assert!(!diagram.controller().summary_visible(node(&diagram, "NP")));
}

#[test]
fn given_unanimated_diagram_when_toggling_then_change_is_synchronous() {
    let mut diagram = draw(false);
    let vp = node(&diagram, "VP");

    diagram.toggle(vp);

    assert!(!diagram.controller().has_pending());
    assert_eq!(diagram.controller().state(vp), Some(ToggleState::Collapsed));
}

#[test]
fn given_animated_diagram_when_collapsing_then_phases_run_in_sequence() {
    // Arrange
    let mut diagram = draw(true);
    let vp = node(&diagram, "VP");
    let saw = diagram.controller().scene().get(node(&diagram, "saw")).unwrap().group;
    let summary = diagram.controller().scene().get(vp).unwrap().summary.unwrap();

    // Act: start and go halfway through the first phase
    assert_eq!(diagram.toggle(vp), ToggleOutcome::Started);
    diagram.controller_mut().advance(Duration::from_millis(150));

    // Assert: children fading, summary still hidden
    let surface = diagram.controller().surface();
    assert!(surface.is_visible(saw));
    assert!(surface.opacity(saw) > 0.0 && surface.opacity(saw) < 1.0);
    assert!(!surface.is_visible(summary));
    assert_eq!(diagram.controller().state(vp), Some(ToggleState::Expanded));

    // Act: finish the first phase
    diagram.controller_mut().advance(Duration::from_millis(150));

    // Assert: children hidden, summary shown and fading in
    let surface = diagram.controller().surface();
    assert!(!surface.is_visible(saw));
    assert!(surface.is_visible(summary));
    assert_eq!(surface.opacity(summary), 0.0);
    assert!(diagram.controller().in_transition(vp));

    // Act: finish the second phase
    diagram.controller_mut().advance(Duration::from_millis(300));

    // Assert
    assert!(!diagram.controller().in_transition(vp));
    assert_eq!(diagram.controller().surface().opacity(summary), 1.0);
    assert_eq!(diagram.controller().state(vp), Some(ToggleState::Collapsed));
}

#[test]
fn given_transition_in_flight_when_toggling_again_then_busy() {
    let mut diagram = draw(true);
    let vp = node(&diagram, "VP");

    assert_eq!(diagram.toggle(vp), ToggleOutcome::Started);
    assert_eq!(diagram.toggle(vp), ToggleOutcome::Busy);
    assert!(diagram.settle());
    assert_eq!(diagram.controller().state(vp), Some(ToggleState::Collapsed));
}

#[test]
fn given_collapsed_node_when_expanding_then_visibility_is_restored() {
    // Arrange
    let mut diagram = draw(true);
    let s = node(&diagram, "S");
    let before: Vec<bool> = ["NP", "I", "VP", "saw", "you"]
        .iter()
        .map(|l| group_rendered(&diagram, l))
        .collect();

    // Act
    diagram.toggle(s);
    assert!(diagram.settle());
    let collapsed = group_rendered(&diagram, "NP");
    diagram.toggle(s);
    assert!(diagram.settle());

    // Assert
    assert!(!collapsed);
    let after: Vec<bool> = ["NP", "I", "VP", "saw", "you"]
        .iter()
        .map(|l| group_rendered(&diagram, l))
        .collect();
    assert_eq!(before, after);
    assert!(!diagram.controller().summary_visible(s));
    let np_group = diagram.controller().scene().get(node(&diagram, "NP")).unwrap().group;
    assert_eq!(diagram.controller().surface().opacity(np_group), 1.0);
}

#[test]
fn given_collapsed_descendant_when_parent_round_trips_then_descendant_stays_collapsed() {
    // Arrange
    let mut diagram = draw(false);
    let s = node(&diagram, "S");
    let vp = node(&diagram, "VP");
    diagram.toggle(vp);

    // Act
    diagram.toggle(s);
    diagram.toggle(s);

    // Assert
    assert_eq!(diagram.controller().state(vp), Some(ToggleState::Collapsed));
    assert!(diagram.controller().summary_visible(vp));
    assert!(!group_rendered(&diagram, "saw"));
    assert!(group_rendered(&diagram, "VP"));
}

#[test]
fn given_label_when_collapsing_by_label_then_matching_nodes_toggle() {
    let mut diagram = draw(false);

    assert_eq!(diagram.collapse_label("VP"), 1);
    assert_eq!(diagram.collapse_label("saw"), 0);
    assert_eq!(diagram.collapse_label("missing"), 0);
    assert_eq!(
        diagram.controller().state(node(&diagram, "VP")),
        Some(ToggleState::Collapsed)
    );
}

#[test]
fn given_collapsed_diagram_when_serializing_then_svg_hides_children() {
    let mut diagram = draw(false);
    diagram.collapse_label("VP");

    let svg = diagram.to_svg();

    assert!(svg.contains(">saw you</text>"));
    assert!(svg.contains("display=\"none\""));
}
