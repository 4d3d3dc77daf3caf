//! Draw service
//!
//! Entry point of the pipeline: literal -> tree -> layout -> scene. Collaborators are
//! checked before anything is built, and the tree is fully built before the first
//! primitive is created.

use std::time::Duration;

use tracing::{debug, error, instrument, warn};

use crate::application::controller::{Controller, Timing, ToggleOutcome};
use crate::application::scene::{SceneBuilder, ToggleState};
use crate::application::{ApplicationError, ApplicationResult, DrawWarning};
use crate::config::{DrawOptions, Settings};
use crate::domain::{layout, NodeId, TreeArena, TreeBuilder, TreeLiteral};
use crate::infrastructure::traits::{AnimatorFactory, Renderer};

/// Upper bound of clock steps used by [`Diagram::settle`].
const MAX_SETTLE_STEPS: usize = 10_000;

/// A drawn, interactive tree.
pub struct Diagram {
    tree: TreeArena,
    controller: Controller,
    warnings: Vec<DrawWarning>,
    frame: Duration,
}

impl Diagram {
    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn warnings(&self) -> &[DrawWarning] {
        &self.warnings
    }

    pub fn toggle(&mut self, id: NodeId) -> ToggleOutcome {
        self.controller.toggle(id)
    }

    /// Collapse every expanded node labeled `label`, top-down.
    ///
    /// Returns the number of nodes toggled. Animated transitions are left running;
    /// call [`Diagram::settle`] to finish them.
    pub fn collapse_label(&mut self, label: &str) -> usize {
        let mut toggled = 0;
        for id in self.tree.find_by_label(label) {
            if self.controller.state(id) != Some(ToggleState::Expanded) {
                continue;
            }
            match self.controller.toggle(id) {
                ToggleOutcome::Started | ToggleOutcome::Completed(_) => toggled += 1,
                outcome => debug!("collapse {}: {:?}", id, outcome),
            }
        }
        toggled
    }

    /// Run pending animations to completion in frame-sized steps.
    pub fn settle(&mut self) -> bool {
        self.controller.settle(self.frame, MAX_SETTLE_STEPS)
    }

    pub fn to_svg(&self) -> String {
        self.controller.to_svg()
    }
}

/// Draws tree literals through injected collaborators.
pub struct DrawService {
    renderer: Option<Box<dyn Renderer>>,
    animator: Option<AnimatorFactory>,
    settings: Settings,
    builder: TreeBuilder,
    animation_warned: bool,
}

impl DrawService {
    /// Create a draw service. A renderer is required to draw; the animator is optional.
    pub fn new(
        renderer: Option<Box<dyn Renderer>>,
        animator: Option<AnimatorFactory>,
        settings: Settings,
    ) -> Self {
        Self {
            renderer,
            animator,
            settings,
            builder: TreeBuilder::new(),
            animation_warned: false,
        }
    }

    /// Use a custom tree builder (e.g. with a depth limit).
    pub fn with_builder(mut self, builder: TreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Draw `data` into `container`.
    ///
    /// # Errors
    /// - `MissingRenderingCollaborator` when no renderer was injected
    /// - `ContainerNotFound` when the renderer has no such mount point
    /// - `Domain(InvalidTreeShape)` for a malformed literal
    ///
    /// All of these abort before anything is mounted into the container.
    #[instrument(level = "debug", skip(self, data, options))]
    pub fn draw(
        &mut self,
        data: &TreeLiteral,
        container: &str,
        options: &DrawOptions,
    ) -> ApplicationResult<Diagram> {
        let settings = self.settings.with_options(options);
        settings.validate()?;

        let Some(renderer) = self.renderer.as_mut() else {
            error!("a rendering collaborator is required to draw");
            return Err(ApplicationError::MissingRenderingCollaborator);
        };

        // Validate the literal before anything is mounted into the container
        let tree = self.builder.build(data).map_err(|e| {
            error!("cannot build tree: {}", e);
            ApplicationError::from(e)
        })?;

        let Some(mut surface) = renderer.mount(container, settings.width, settings.height) else {
            error!("container not found: {}", container);
            return Err(ApplicationError::ContainerNotFound(container.to_string()));
        };

        let mut warnings = Vec::new();
        let animator = match self.animator.as_ref() {
            Some(factory) => Some(factory()),
            None => {
                if !self.animation_warned {
                    warn!("{}", DrawWarning::MissingAnimationCollaborator);
                    self.animation_warned = true;
                }
                warnings.push(DrawWarning::MissingAnimationCollaborator);
                None
            }
        };

        let tree_layout = layout(&tree, 0.0, 0.0, &settings.layout_config(), |label| {
            surface.measure_text_width(label)
        });

        if options.fit {
            let (width, height) = tree_layout.extent(settings.font_size * 1.5);
            debug!("fit surface to {}x{}", width, height);
            surface.set_size(width.ceil().max(1.0), height.ceil().max(1.0));
        }

        let scene = SceneBuilder::new(&tree, &tree_layout, settings.vertical_gap).build(surface.as_mut());

        let timing = Timing {
            duration: settings.animation_duration(),
            easing: settings.easing,
            timeout: settings.transition_timeout(),
        };
        let controller = Controller::new(surface, animator, scene, timing);
        debug!("drew {} nodes into {}", tree.len(), container);

        Ok(Diagram {
            tree,
            controller,
            warnings,
            frame: Duration::from_millis(16),
        })
    }

    /// Parse JSON text and draw it.
    pub fn draw_json(
        &mut self,
        input: &str,
        container: &str,
        options: &DrawOptions,
    ) -> ApplicationResult<Diagram> {
        let data = TreeLiteral::from_json(input).map_err(|source| ApplicationError::Input {
            context: "parse tree literal".to_string(),
            source,
        })?;
        self.draw(&data, container, options)
    }
}
