//! Collaborator boundary traits
//!
//! Drawing and tweening are injected capabilities: a [`Renderer`] is required to draw,
//! an [`Animator`] is optional. Services only talk to these traits, so they can be
//! tested against the in-memory implementations.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::NodeId;

/// Handle of a primitive created on a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub usize);

/// Line stroke style.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: String,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            color: "black".to_string(),
        }
    }
}

/// Drawing surface mounted into a container.
///
/// New primitives are attached to the surface root until added to a group.
pub trait Surface {
    /// Surface size in pixels.
    fn size(&self) -> (f64, f64);

    /// Resize the surface.
    fn set_size(&mut self, width: f64, height: f64);

    /// Create a text primitive.
    fn text(&mut self, content: &str) -> PrimitiveId;

    /// Create a line primitive.
    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) -> PrimitiveId;

    /// Create an empty group primitive.
    fn group(&mut self) -> PrimitiveId;

    /// Width of the primitive's bounding box.
    fn bbox_width(&self, id: PrimitiveId) -> f64;

    /// Move the top-left corner of the primitive's bounding box to `(x, y)`.
    fn move_to(&mut self, id: PrimitiveId, x: f64, y: f64);

    /// Reparent `child` into `group`, appending it last.
    fn add(&mut self, group: PrimitiveId, child: PrimitiveId);

    /// Remove a primitive and its descendants.
    fn remove(&mut self, id: PrimitiveId);

    /// Parent group of a primitive, None when attached to the root.
    fn parent(&self, id: PrimitiveId) -> Option<PrimitiveId>;

    fn show(&mut self, id: PrimitiveId);
    fn hide(&mut self, id: PrimitiveId);

    /// The primitive's own visibility flag, ignoring ancestors.
    fn is_visible(&self, id: PrimitiveId) -> bool;

    fn opacity(&self, id: PrimitiveId) -> f64;
    fn set_opacity(&mut self, id: PrimitiveId, opacity: f64);

    /// Mark a primitive clickable (pointer cursor) on behalf of a tree node.
    fn set_interactive(&mut self, id: PrimitiveId, node: NodeId);

    /// Tree node a clickable primitive acts for.
    fn hit(&self, id: PrimitiveId) -> Option<NodeId>;

    /// Attach a `data-*` style marker used by the serialized output.
    fn tag(&mut self, id: PrimitiveId, key: &str, value: &str);

    /// Serialize the surface to SVG markup.
    fn to_svg(&self) -> String;

    /// Measure a label by creating a probe text, reading its width and removing it.
    fn measure_text_width(&mut self, label: &str) -> f64 {
        let probe = self.text(label);
        let width = self.bbox_width(probe);
        self.remove(probe);
        width
    }

    /// Visible itself and through every ancestor group.
    fn is_rendered(&self, id: PrimitiveId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if !self.is_visible(c) {
                return false;
            }
            current = self.parent(c);
        }
        true
    }
}

/// Rendering collaborator: produces surfaces for named mount points.
pub trait Renderer {
    /// Mount a surface of the given size into `container`.
    /// Returns None when no such container exists.
    fn mount(&mut self, container: &str, width: f64, height: f64) -> Option<Box<dyn Surface>>;
}

/// Named easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    #[default]
    EaseOutQuad,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutQuad => t * (2.0 - t),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::EaseOutQuad => write!(f, "easeOutQuad"),
        }
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Easing::Linear),
            "easeOutQuad" | "ease-out-quad" => Ok(Easing::EaseOutQuad),
            other => Err(format!("unknown easing: {}", other)),
        }
    }
}

/// Opacity tween over a set of primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub targets: Vec<PrimitiveId>,
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub easing: Easing,
}

/// Handle of a started tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// Animation collaborator.
///
/// Completion is reported through [`Animator::advance`]; every started tween is
/// reported exactly once unless cancelled.
pub trait Animator {
    /// Start a tween, applying its `from` value to the targets immediately.
    fn start(&mut self, surface: &mut dyn Surface, tween: Tween) -> TweenId;

    /// Advance the clock, update target opacities and return the tweens that finished.
    fn advance(&mut self, surface: &mut dyn Surface, elapsed: Duration) -> Vec<TweenId>;

    /// Drop a tween without reporting it.
    fn cancel(&mut self, id: TweenId);

    /// Number of tweens still running.
    fn in_flight(&self) -> usize;
}

/// Creates a fresh animator timeline per drawn diagram.
pub type AnimatorFactory = Box<dyn Fn() -> Box<dyn Animator>>;
