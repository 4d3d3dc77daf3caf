//! Tests for DrawService: collaborator checks, failure ordering and sizing.

use std::cell::Cell;
use std::rc::Rc;

use syntree::application::services::DrawService;
use syntree::application::{ApplicationError, DrawWarning};
use syntree::config::{DrawOptions, Settings};
use syntree::domain::{DomainError, NodeId, TreeBuilder, TreeLiteral};
use syntree::infrastructure::animation::TimelineAnimator;
use syntree::infrastructure::svg::{SvgStyle, SvgSurface};
use syntree::infrastructure::traits::{Animator, PrimitiveId, Renderer, Stroke, Surface};
use syntree::util::testing::{init_test_setup, sample_sentence};

/// SVG surface that counts every primitive it creates.
struct CountingSurface {
    inner: SvgSurface,
    created: Rc<Cell<usize>>,
}

impl CountingSurface {
    fn bump(&self) {
        self.created.set(self.created.get() + 1);
    }
}

impl Surface for CountingSurface {
    fn size(&self) -> (f64, f64) {
        self.inner.size()
    }
    fn set_size(&mut self, width: f64, height: f64) {
        self.inner.set_size(width, height)
    }
    fn text(&mut self, content: &str) -> PrimitiveId {
        self.bump();
        self.inner.text(content)
    }
    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) -> PrimitiveId {
        self.bump();
        self.inner.line(from, to, stroke)
    }
    fn group(&mut self) -> PrimitiveId {
        self.bump();
        self.inner.group()
    }
    fn bbox_width(&self, id: PrimitiveId) -> f64 {
        self.inner.bbox_width(id)
    }
    fn move_to(&mut self, id: PrimitiveId, x: f64, y: f64) {
        self.inner.move_to(id, x, y)
    }
    fn add(&mut self, group: PrimitiveId, child: PrimitiveId) {
        self.inner.add(group, child)
    }
    fn remove(&mut self, id: PrimitiveId) {
        self.inner.remove(id)
    }
    fn parent(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        self.inner.parent(id)
    }
    fn show(&mut self, id: PrimitiveId) {
        self.inner.show(id)
    }
    fn hide(&mut self, id: PrimitiveId) {
        self.inner.hide(id)
    }
    fn is_visible(&self, id: PrimitiveId) -> bool {
        self.inner.is_visible(id)
    }
    fn opacity(&self, id: PrimitiveId) -> f64 {
        self.inner.opacity(id)
    }
    fn set_opacity(&mut self, id: PrimitiveId, opacity: f64) {
        self.inner.set_opacity(id, opacity)
    }
    fn set_interactive(&mut self, id: PrimitiveId, node: NodeId) {
        self.inner.set_interactive(id, node)
    }
    fn hit(&self, id: PrimitiveId) -> Option<NodeId> {
        self.inner.hit(id)
    }
    fn tag(&mut self, id: PrimitiveId, key: &str, value: &str) {
        self.inner.tag(id, key, value)
    }
    fn to_svg(&self) -> String {
        self.inner.to_svg()
    }
}

/// Renderer with a single `tree` container, recording mounts and created primitives.
struct CountingRenderer {
    mounts: Rc<Cell<usize>>,
    created: Rc<Cell<usize>>,
}

impl Renderer for CountingRenderer {
    fn mount(&mut self, container: &str, width: f64, height: f64) -> Option<Box<dyn Surface>> {
        if container != "tree" {
            return None;
        }
        self.mounts.set(self.mounts.get() + 1);
        Some(Box::new(CountingSurface {
            inner: SvgSurface::new(width, height, SvgStyle::default()),
            created: self.created.clone(),
        }))
    }
}

fn counting_service(animated: bool) -> (DrawService, Rc<Cell<usize>>, Rc<Cell<usize>>) {
    init_test_setup();
    let mounts = Rc::new(Cell::new(0));
    let created = Rc::new(Cell::new(0));
    let renderer = CountingRenderer {
        mounts: mounts.clone(),
        created: created.clone(),
    };
    let animator: Option<syntree::infrastructure::traits::AnimatorFactory> = if animated {
        Some(Box::new(|| Box::new(TimelineAnimator::new()) as Box<dyn Animator>))
    } else {
        None
    };
    let service = DrawService::new(Some(Box::new(renderer)), animator, Settings::default());
    (service, mounts, created)
}

#[test]
fn given_no_renderer_when_drawing_then_missing_rendering_collaborator() {
    // Arrange
    init_test_setup();
    let mut service = DrawService::new(None, None, Settings::default());

    // Act
    let result = service.draw(&sample_sentence(), "tree", &DrawOptions::default());

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::MissingRenderingCollaborator)
    ));
}

#[test]
fn given_unknown_container_when_drawing_then_aborts_before_any_primitive() {
    // Arrange
    let (mut service, mounts, created) = counting_service(true);

    // Act
    let result = service.draw(&sample_sentence(), "nowhere", &DrawOptions::default());

    // Assert
    match result {
        Err(ApplicationError::ContainerNotFound(id)) => assert_eq!(id, "nowhere"),
        other => panic!("expected ContainerNotFound, got {:?}", other.err()),
    }
    assert_eq!(mounts.get(), 0);
    assert_eq!(created.get(), 0);
}

#[test]
fn given_malformed_literal_when_drawing_then_nothing_is_mounted() {
    // Arrange
    let (mut service, mounts, created) = counting_service(true);
    let bad = TreeLiteral::node("S", [TreeLiteral::Node(Vec::new())]);

    // Act
    let result = service.draw(&bad, "tree", &DrawOptions::default());

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidTreeShape { .. }))
    ));
    assert_eq!(mounts.get(), 0);
    assert_eq!(created.get(), 0);
}

#[test]
fn given_invalid_json_when_drawing_then_input_error() {
    let (mut service, mounts, created) = counting_service(true);

    let result = service.draw_json("[\"S\", ", "tree", &DrawOptions::default());

    assert!(matches!(result, Err(ApplicationError::Input { .. })));
    assert_eq!(mounts.get(), 0);
    assert_eq!(created.get(), 0);
}

#[test]
fn given_no_animator_when_drawing_then_warns_and_still_draws() {
    // Arrange
    let (mut service, mounts, created) = counting_service(false);

    // Act
    let first = service
        .draw(&sample_sentence(), "tree", &DrawOptions::default())
        .unwrap();
    let second = service
        .draw(&sample_sentence(), "tree", &DrawOptions::default())
        .unwrap();

    // Assert
    assert_eq!(first.warnings(), &[DrawWarning::MissingAnimationCollaborator]);
    assert_eq!(second.warnings(), &[DrawWarning::MissingAnimationCollaborator]);
    assert!(!first.controller().is_animated());
    assert_eq!(mounts.get(), 2);
    assert!(created.get() > 0);
}

#[test]
fn given_animator_when_drawing_then_no_warning() {
    let (mut service, _, _) = counting_service(true);

    let diagram = service
        .draw(&sample_sentence(), "tree", &DrawOptions::default())
        .unwrap();

    assert!(diagram.warnings().is_empty());
    assert!(diagram.controller().is_animated());
    assert_eq!(diagram.controller().scene().len(), 6);
}

#[test]
fn given_fit_option_when_drawing_then_surface_matches_layout_extent() {
    // Arrange
    let (mut service, _, _) = counting_service(false);
    let options = DrawOptions {
        fit: true,
        ..DrawOptions::default()
    };

    // Act
    let diagram = service.draw(&sample_sentence(), "tree", &options).unwrap();

    // Assert: labels are 9.6px per glyph at 16px, leaves sit at y=80, rows are 24px
    assert_eq!(diagram.controller().surface().size(), (98.0, 104.0));
}

#[test]
fn given_size_options_when_drawing_then_override_settings() {
    let (mut service, _, _) = counting_service(false);
    let options = DrawOptions {
        width: Some(320.0),
        height: Some(200.0),
        ..DrawOptions::default()
    };

    let diagram = service.draw(&sample_sentence(), "tree", &options).unwrap();

    assert_eq!(diagram.controller().surface().size(), (320.0, 200.0));
    assert!(diagram.to_svg().starts_with("<svg"));
}

#[test]
fn given_invalid_geometry_when_drawing_then_config_error() {
    let (mut service, mounts, _) = counting_service(false);
    let options = DrawOptions {
        spacing: Some(-1.0),
        ..DrawOptions::default()
    };

    let result = service.draw(&sample_sentence(), "tree", &options);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
    assert_eq!(mounts.get(), 0);
}

#[test]
fn given_depth_limited_builder_when_drawing_deep_literal_then_rejected_before_mount() {
    // Arrange
    let (service, mounts, _) = counting_service(false);
    let mut service = service.with_builder(TreeBuilder::new().with_max_depth(2));

    // Act
    let shallow = service.draw(&TreeLiteral::node("S", ["a".into()]), "tree", &DrawOptions::default());
    let deep = service.draw(&sample_sentence(), "tree", &DrawOptions::default());

    // Assert
    assert!(shallow.is_ok());
    assert!(matches!(
        deep,
        Err(ApplicationError::Domain(DomainError::InvalidTreeShape { .. }))
    ));
    assert_eq!(mounts.get(), 1);
}
