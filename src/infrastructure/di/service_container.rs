//! Service container for dependency injection
//!
//! Wires the draw service to the in-memory SVG renderer and the timeline animator.

use std::sync::Arc;

use crate::application::services::DrawService;
use crate::config::Settings;
use crate::infrastructure::animation::TimelineAnimator;
use crate::infrastructure::svg::SvgRenderer;
use crate::infrastructure::traits::{Animator, AnimatorFactory, Renderer};

/// Container holding the application settings and building services from them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,
}

impl ServiceContainer {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// SVG renderer exposing a single mount point named `container`.
    pub fn renderer(&self, container: &str) -> Box<dyn Renderer> {
        Box::new(SvgRenderer::new(self.settings.svg_style()).with_container(container))
    }

    /// Factory of fresh animator timelines, one per drawn diagram.
    pub fn animator_factory(&self) -> AnimatorFactory {
        Box::new(|| Box::new(TimelineAnimator::new()) as Box<dyn Animator>)
    }

    /// Draw service mounting into `container`.
    ///
    /// With `animated` false no animator is injected and toggles apply instantly.
    pub fn draw_service(&self, container: &str, animated: bool) -> DrawService {
        let animator = animated.then(|| self.animator_factory());
        DrawService::new(
            Some(self.renderer(container)),
            animator,
            self.settings.as_ref().clone(),
        )
    }
}
