//! In-memory SVG surface
//!
//! Keeps a retained element tree and serializes it to SVG markup. Text width is an
//! average-glyph estimate derived from the font size.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, instrument};

use crate::domain::NodeId;
use crate::infrastructure::traits::{PrimitiveId, Renderer, Stroke, Surface};

/// Font metrics and family used for text primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgStyle {
    pub font_family: String,
    pub font_size: f64,
    /// Average glyph advance as a fraction of the font size
    pub char_width: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            char_width: 0.6,
        }
    }
}

impl SvgStyle {
    /// Estimated rendered width of `text`.
    pub fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * self.char_width
    }
}

#[derive(Debug, Clone)]
enum ElementKind {
    Text { content: String },
    Line { from: (f64, f64), to: (f64, f64), stroke: Stroke },
    Group { children: Vec<PrimitiveId> },
}

#[derive(Debug, Clone)]
struct Element {
    kind: ElementKind,
    parent: Option<PrimitiveId>,
    position: (f64, f64),
    visible: bool,
    opacity: f64,
    node: Option<NodeId>,
    tags: BTreeMap<String, String>,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            position: (0.0, 0.0),
            visible: true,
            opacity: 1.0,
            node: None,
            tags: BTreeMap::new(),
        }
    }
}

/// Retained SVG drawing surface.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    style: SvgStyle,
    elements: Vec<Option<Element>>,
    root: Vec<PrimitiveId>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64, style: SvgStyle) -> Self {
        Self {
            width,
            height,
            style,
            elements: Vec::new(),
            root: Vec::new(),
        }
    }

    /// Number of live primitives.
    pub fn len(&self) -> usize {
        self.elements.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text content of a text primitive.
    pub fn text_content(&self, id: PrimitiveId) -> Option<&str> {
        match self.get(id).map(|e| &e.kind) {
            Some(ElementKind::Text { content }) => Some(content),
            _ => None,
        }
    }

    /// Top-left position of a primitive.
    pub fn position(&self, id: PrimitiveId) -> Option<(f64, f64)> {
        self.get(id).map(|e| e.position)
    }

    /// Endpoints of a line primitive.
    pub fn line_endpoints(&self, id: PrimitiveId) -> Option<((f64, f64), (f64, f64))> {
        match self.get(id).map(|e| &e.kind) {
            Some(ElementKind::Line { from, to, .. }) => Some((*from, *to)),
            _ => None,
        }
    }

    /// Direct children of a group, in order.
    pub fn children(&self, id: PrimitiveId) -> &[PrimitiveId] {
        match self.get(id).map(|e| &e.kind) {
            Some(ElementKind::Group { children }) => children.as_slice(),
            _ => &[],
        }
    }

    fn get(&self, id: PrimitiveId) -> Option<&Element> {
        self.elements.get(id.0).and_then(|e| e.as_ref())
    }

    fn get_mut(&mut self, id: PrimitiveId) -> Option<&mut Element> {
        self.elements.get_mut(id.0).and_then(|e| e.as_mut())
    }

    fn push(&mut self, element: Element) -> PrimitiveId {
        let id = PrimitiveId(self.elements.len());
        self.elements.push(Some(element));
        self.root.push(id);
        id
    }

    fn detach(&mut self, id: PrimitiveId) {
        match self.get(id).and_then(|e| e.parent) {
            Some(parent) => {
                if let Some(Element {
                    kind: ElementKind::Group { children },
                    ..
                }) = self.get_mut(parent)
                {
                    children.retain(|&c| c != id);
                }
            }
            None => self.root.retain(|&c| c != id),
        }
        if let Some(element) = self.get_mut(id) {
            element.parent = None;
        }
    }

    fn write_element(&self, f: &mut fmt::Formatter<'_>, id: PrimitiveId, indent: usize) -> fmt::Result {
        let Some(element) = self.get(id) else {
            return Ok(());
        };
        let pad = "  ".repeat(indent);
        let mut attrs = String::new();
        if !element.visible {
            attrs.push_str(" display=\"none\"");
        }
        if element.opacity < 1.0 {
            attrs.push_str(&format!(" opacity=\"{}\"", element.opacity));
        }
        if let Some(node) = element.node {
            attrs.push_str(&format!(" data-toggle=\"{}\" style=\"cursor:pointer\"", node));
        }
        for (key, value) in &element.tags {
            attrs.push_str(&format!(" data-{}=\"{}\"", key, escape_xml(value)));
        }

        match &element.kind {
            ElementKind::Text { content } => writeln!(
                f,
                "{pad}<text x=\"{}\" y=\"{}\" dominant-baseline=\"hanging\"{attrs}>{}</text>",
                element.position.0,
                element.position.1,
                escape_xml(content)
            ),
            ElementKind::Line { from, to, stroke } => writeln!(
                f,
                "{pad}<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{attrs}/>",
                from.0,
                from.1,
                to.0,
                to.1,
                escape_xml(&stroke.color),
                stroke.width
            ),
            ElementKind::Group { children } => {
                writeln!(f, "{pad}<g{attrs}>")?;
                for &child in children {
                    self.write_element(f, child, indent + 1)?;
                }
                writeln!(f, "{pad}</g>")
            }
        }
    }
}

impl fmt::Display for SvgSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{}\" font-size=\"{}\">",
            escape_xml(&self.style.font_family),
            self.style.font_size,
            w = self.width,
            h = self.height,
        )?;
        for &id in &self.root {
            self.write_element(f, id, 1)?;
        }
        write!(f, "</svg>")
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn text(&mut self, content: &str) -> PrimitiveId {
        self.push(Element::new(ElementKind::Text {
            content: content.to_string(),
        }))
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &Stroke) -> PrimitiveId {
        let mut element = Element::new(ElementKind::Line {
            from,
            to,
            stroke: stroke.clone(),
        });
        element.position = (from.0.min(to.0), from.1.min(to.1));
        self.push(element)
    }

    fn group(&mut self) -> PrimitiveId {
        self.push(Element::new(ElementKind::Group {
            children: Vec::new(),
        }))
    }

    fn bbox_width(&self, id: PrimitiveId) -> f64 {
        match self.get(id).map(|e| &e.kind) {
            Some(ElementKind::Text { content }) => self.style.text_width(content),
            Some(ElementKind::Line { from, to, .. }) => (to.0 - from.0).abs(),
            _ => 0.0,
        }
    }

    fn move_to(&mut self, id: PrimitiveId, x: f64, y: f64) {
        if let Some(element) = self.get_mut(id) {
            if let ElementKind::Line { from, to, .. } = &mut element.kind {
                let (dx, dy) = (x - element.position.0, y - element.position.1);
                *from = (from.0 + dx, from.1 + dy);
                *to = (to.0 + dx, to.1 + dy);
            }
            element.position = (x, y);
        }
    }

    fn add(&mut self, group: PrimitiveId, child: PrimitiveId) {
        if group == child || self.get(child).is_none() {
            return;
        }
        if !matches!(self.get(group).map(|e| &e.kind), Some(ElementKind::Group { .. })) {
            debug!("add: {:?} is not a group", group);
            return;
        }
        self.detach(child);
        if let Some(Element {
            kind: ElementKind::Group { children },
            ..
        }) = self.get_mut(group)
        {
            children.push(child);
        }
        if let Some(element) = self.get_mut(child) {
            element.parent = Some(group);
        }
    }

    fn remove(&mut self, id: PrimitiveId) {
        if self.get(id).is_none() {
            return;
        }
        self.detach(id);
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(Some(element)) = self.elements.get_mut(current.0).map(Option::take) {
                if let ElementKind::Group { children } = element.kind {
                    pending.extend(children);
                }
            }
        }
    }

    fn parent(&self, id: PrimitiveId) -> Option<PrimitiveId> {
        self.get(id).and_then(|e| e.parent)
    }

    fn show(&mut self, id: PrimitiveId) {
        if let Some(element) = self.get_mut(id) {
            element.visible = true;
        }
    }

    fn hide(&mut self, id: PrimitiveId) {
        if let Some(element) = self.get_mut(id) {
            element.visible = false;
        }
    }

    fn is_visible(&self, id: PrimitiveId) -> bool {
        self.get(id).map(|e| e.visible).unwrap_or(false)
    }

    fn opacity(&self, id: PrimitiveId) -> f64 {
        self.get(id).map(|e| e.opacity).unwrap_or(0.0)
    }

    fn set_opacity(&mut self, id: PrimitiveId, opacity: f64) {
        if let Some(element) = self.get_mut(id) {
            element.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn set_interactive(&mut self, id: PrimitiveId, node: NodeId) {
        if let Some(element) = self.get_mut(id) {
            element.node = Some(node);
        }
    }

    fn hit(&self, id: PrimitiveId) -> Option<NodeId> {
        self.get(id).and_then(|e| e.node)
    }

    fn tag(&mut self, id: PrimitiveId, key: &str, value: &str) {
        if let Some(element) = self.get_mut(id) {
            element.tags.insert(key.to_string(), value.to_string());
        }
    }

    fn to_svg(&self) -> String {
        self.to_string()
    }
}

/// Host page with named containers; mounts [`SvgSurface`]s.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    containers: BTreeSet<String>,
    style: SvgStyle,
}

impl SvgRenderer {
    pub fn new(style: SvgStyle) -> Self {
        Self {
            containers: BTreeSet::new(),
            style,
        }
    }

    /// Register a mount point.
    pub fn with_container(mut self, id: impl Into<String>) -> Self {
        self.containers.insert(id.into());
        self
    }
}

impl Renderer for SvgRenderer {
    #[instrument(level = "debug", skip(self))]
    fn mount(&mut self, container: &str, width: f64, height: f64) -> Option<Box<dyn Surface>> {
        if !self.containers.contains(container) {
            return None;
        }
        Some(Box::new(SvgSurface::new(width, height, self.style.clone())))
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> SvgSurface {
        SvgSurface::new(100.0, 50.0, SvgStyle::default())
    }

    #[test]
    fn given_text_when_measuring_then_probe_is_removed() {
        let mut s = surface();
        let width = s.measure_text_width("abcd");
        assert_eq!(width, 4.0 * 16.0 * 0.6);
        assert!(s.is_empty());
    }

    #[test]
    fn given_group_when_adding_child_then_child_is_reparented() {
        let mut s = surface();
        let g = s.group();
        let t = s.text("x");
        s.add(g, t);
        assert_eq!(s.parent(t), Some(g));
        assert_eq!(s.children(g), &[t]);
        assert_eq!(s.root, vec![g]);
    }

    #[test]
    fn given_hidden_group_when_checking_child_then_not_rendered_but_still_visible() {
        let mut s = surface();
        let g = s.group();
        let t = s.text("x");
        s.add(g, t);
        s.hide(g);
        assert!(s.is_visible(t));
        assert!(!s.is_rendered(t));
    }

    #[test]
    fn given_removed_group_when_querying_then_descendants_are_gone() {
        let mut s = surface();
        let g = s.group();
        let t = s.text("x");
        s.add(g, t);
        s.remove(g);
        assert!(s.is_empty());
        assert!(!s.is_visible(t));
    }

    #[test]
    fn given_special_characters_when_serializing_then_escapes_markup() {
        let mut s = surface();
        let t = s.text("a<b & \"c\"");
        s.hide(t);
        let svg = s.to_svg();
        assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
        assert!(svg.contains("display=\"none\""));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn given_unknown_container_when_mounting_then_returns_none() {
        let mut renderer = SvgRenderer::new(SvgStyle::default()).with_container("tree");
        assert!(renderer.mount("missing", 10.0, 10.0).is_none());
        assert!(renderer.mount("tree", 10.0, 10.0).is_some());
    }
}
