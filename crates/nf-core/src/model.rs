//! Core entity model for design projects.
//!
//! A `Project` owns an ordered list of `Frame`s (artboards); each frame owns
//! an ordered list of `Element`s. List order is paint order: later elements
//! paint on top. Nesting is expressed through `parent` / `children` id
//! references inside a frame, never through ownership.

use crate::color::{Color, Fill};
use crate::geometry::{Point, Rect, Size, Vec2};
use crate::id::{ElementId, FrameId, ProjectId};
use chrono::{DateTime, Utc};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Smallest width/height an interactive resize may produce.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Frame size for new projects and frames.
pub const DEFAULT_FRAME_SIZE: Size = Size::new(1920.0, 1080.0);

/// Background for new frames.
pub const DEFAULT_FRAME_BACKGROUND: Color = Color::rgb(15, 15, 25);

// ─── Transform ───────────────────────────────────────────────────────────

/// Extra transform applied on top of an element's position and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    /// Degrees, clockwise in screen space.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Translate, then rotate about the origin, then scale.
    pub fn apply(&self, p: Point) -> Point {
        let mut x = p.x + self.x;
        let mut y = p.y + self.y;

        if self.rotation != 0.0 {
            let (sin, cos) = self.rotation.to_radians().sin_cos();
            let rx = x * cos - y * sin;
            let ry = x * sin + y * cos;
            x = rx;
            y = ry;
        }

        Point::new(x * self.scale_x, y * self.scale_y)
    }
}

// ─── Styling ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub style: BorderStyle,
    pub color: Color,
    /// Corner radius.
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub x: f64,
    pub y: f64,
    pub blur: f64,
    pub spread: f64,
    pub color: Color,
    #[serde(default)]
    pub inset: bool,
}

fn default_opacity() -> f32 {
    1.0
}

/// Visual style bag of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    /// Painted in order.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub shadows: SmallVec<[Shadow; 2]>,
    /// Always within `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: None,
            border: None,
            shadows: SmallVec::new(),
            opacity: 1.0,
            blur: None,
            blend_mode: None,
        }
    }
}

impl Style {
    /// Dark translucent panel with a faint cyan outline.
    pub fn panel() -> Self {
        Self {
            background: Some(Fill::Solid(Color::rgb(26, 26, 46))),
            border: Some(Border {
                width: 1.0,
                style: BorderStyle::Solid,
                color: Color::rgba(0, 255, 255, 0.3),
                radius: 8.0,
            }),
            ..Self::default()
        }
    }
}

// ─── Typography ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16, // 100..900
    pub line_height: f64,
    pub letter_spacing: f64,
    pub text_align: TextAlign,
    pub color: Color,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Orbitron".into(),
            font_size: 16.0,
            font_weight: 400,
            line_height: 1.5,
            letter_spacing: 0.0,
            text_align: TextAlign::Left,
            color: Color::WHITE,
        }
    }
}

// ─── Element kinds ───────────────────────────────────────────────────────

/// Discriminant of [`ElementKind`], used when creating elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    #[default]
    Container,
    Text,
    Image,
    Button,
    Input,
    Icon,
    Shape,
    Component,
}

impl ElementType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Button => "Button",
            Self::Input => "Input",
            Self::Icon => "Icon",
            Self::Shape => "Shape",
            Self::Component => "Component",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
}

/// Per-type payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Container,
    Text {
        content: String,
        typography: Typography,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
    },
    Button {
        #[serde(default)]
        label: String,
    },
    Input {
        #[serde(default)]
        placeholder: String,
    },
    Icon {
        #[serde(default)]
        glyph: String,
    },
    Shape {
        #[serde(default)]
        shape: ShapeKind,
    },
    /// Instance of a reusable component template from the project.
    Component {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<ElementId>,
    },
}

impl ElementKind {
    /// Default payload for a freshly created element of `ty`.
    pub fn default_for(ty: ElementType) -> Self {
        match ty {
            ElementType::Container => Self::Container,
            ElementType::Text => Self::Text {
                content: "Text".into(),
                typography: Typography::default(),
            },
            ElementType::Image => Self::Image { src: None },
            ElementType::Button => Self::Button {
                label: "Button".into(),
            },
            ElementType::Input => Self::Input {
                placeholder: String::new(),
            },
            ElementType::Icon => Self::Icon {
                glyph: String::new(),
            },
            ElementType::Shape => Self::Shape {
                shape: ShapeKind::Rectangle,
            },
            ElementType::Component => Self::Component { component: None },
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Container => ElementType::Container,
            Self::Text { .. } => ElementType::Text,
            Self::Image { .. } => ElementType::Image,
            Self::Button { .. } => ElementType::Button,
            Self::Input { .. } => ElementType::Input,
            Self::Icon { .. } => ElementType::Icon,
            Self::Shape { .. } => ElementType::Shape,
            Self::Component { .. } => ElementType::Component,
        }
    }

    /// The free-text slot of this kind, if it has one.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Text { content, .. } => Some(content),
            Self::Button { label } => Some(label),
            Self::Input { placeholder } => Some(placeholder),
            Self::Icon { glyph } => Some(glyph),
            _ => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Text { content, .. } => Some(content),
            Self::Button { label } => Some(label),
            Self::Input { placeholder } => Some(placeholder),
            Self::Icon { glyph } => Some(glyph),
            _ => None,
        }
    }

    pub fn typography(&self) -> Option<&Typography> {
        match self {
            Self::Text { typography, .. } => Some(typography),
            _ => None,
        }
    }

    pub fn typography_mut(&mut self) -> Option<&mut Typography> {
        match self {
            Self::Text { typography, .. } => Some(typography),
            _ => None,
        }
    }
}

// ─── Element ─────────────────────────────────────────────────────────────

/// Where an AI-generated or AI-edited element came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiProvenance {
    /// The prompt that last modified the element.
    pub prompt: String,
    #[serde(default)]
    pub ai_generated: bool,
    /// The prompt that first touched the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub kind: ElementKind,
    /// Frame-local top-left corner.
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub children: SmallVec<[ElementId; 4]>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiProvenance>,
}

fn default_true() -> bool {
    true
}

impl Element {
    /// A new element of `ty` with the canvas defaults: 200×100 at (100, 100),
    /// identity transform, and the panel style (text gets no panel).
    pub fn new(id: ElementId, ty: ElementType) -> Self {
        let style = match ty {
            ElementType::Text => Style::default(),
            _ => Style::panel(),
        };
        Self {
            id,
            name: format!("New {}", ty.label()),
            kind: ElementKind::default_for(ty),
            position: Point::new(100.0, 100.0),
            size: Size::new(200.0, 100.0),
            transform: Transform::IDENTITY,
            style,
            parent: None,
            children: SmallVec::new(),
            visible: true,
            locked: false,
            ai: None,
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Axis-aligned bounds from position and size (transform ignored).
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Visible and unlocked: eligible for hit testing and dragging.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────

/// A fixed-size artboard holding elements in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub name: String,
    pub size: Size,
    pub background: Fill,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Per-frame view hints; the editor's viewport state takes precedence.
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub pan: Vec2,
}

fn default_zoom() -> f64 {
    1.0
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FrameId::fresh(),
            name: name.into(),
            size: DEFAULT_FRAME_SIZE,
            background: Fill::Solid(DEFAULT_FRAME_BACKGROUND),
            elements: Vec::new(),
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Insert at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, element: Element) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
    }

    /// Replace the element with the same id in place. Returns the old value.
    pub fn replace(&mut self, element: Element) -> Option<Element> {
        let slot = self.get_mut(element.id)?;
        Some(std::mem::replace(slot, element))
    }

    /// Remove an element, detaching it from its parent and orphaning its
    /// children. Returns the removed element and its former index.
    pub fn remove(&mut self, id: ElementId) -> Option<(usize, Element)> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);

        if let Some(parent) = removed.parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        for child in &removed.children {
            if let Some(child) = self.get_mut(*child) {
                child.parent = None;
            }
        }
        Some((index, removed))
    }

    /// Move an element to `to` in paint order (clamped). Returns the
    /// previous index, or `None` if the element does not exist.
    pub fn move_element(&mut self, id: ElementId, to: usize) -> Option<usize> {
        let from = self.index_of(id)?;
        let to = to.min(self.elements.len() - 1);
        if from != to {
            let element = self.elements.remove(from);
            self.elements.insert(to, element);
        }
        Some(from)
    }

    /// Parent → child graph of the nesting references.
    fn hierarchy(&self) -> (DiGraph<ElementId, ()>, HashMap<ElementId, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::with_capacity(self.elements.len());
        for el in &self.elements {
            index.insert(el.id, graph.add_node(el.id));
        }
        for el in &self.elements {
            if let (Some(parent), Some(&child)) = (el.parent, index.get(&el.id))
                && let Some(&parent) = index.get(&parent)
            {
                graph.add_edge(parent, child, ());
            }
        }
        (graph, index)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let (graph, index) = self.hierarchy();
        match (index.get(&ancestor), index.get(&descendant)) {
            (Some(&a), Some(&d)) => has_path_connecting(&graph, a, d, None),
            _ => false,
        }
    }

    /// Nest `child` under `parent` (or un-nest with `None`), keeping both
    /// sides of the reference in sync. Rejects unknown ids and cycles.
    pub fn set_parent(&mut self, child: ElementId, parent: Option<ElementId>) -> bool {
        if !self.contains(child) {
            return false;
        }
        if let Some(p) = parent
            && (p == child || !self.contains(p) || self.is_ancestor_of(child, p))
        {
            return false;
        }

        let old_parent = self.get(child).and_then(|c| c.parent);
        if let Some(old) = old_parent.and_then(|p| self.get_mut(p)) {
            old.children.retain(|c| *c != child);
        }
        if let Some(new) = parent.and_then(|p| self.get_mut(p))
            && !new.children.contains(&child)
        {
            new.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = parent;
        }
        true
    }

    /// Layers-panel listing: topmost first, children under their parent,
    /// paired with nesting depth.
    pub fn layers(&self) -> Vec<(usize, ElementId)> {
        fn visit(frame: &Frame, id: ElementId, depth: usize, out: &mut Vec<(usize, ElementId)>) {
            out.push((depth, id));
            for el in frame.elements.iter().rev() {
                if el.parent == Some(id) {
                    visit(frame, el.id, depth + 1, out);
                }
            }
        }

        let mut out = Vec::with_capacity(self.elements.len());
        for el in self.elements.iter().rev() {
            let is_root = el.parent.is_none_or(|p| !self.contains(p));
            if is_root {
                visit(self, el.id, 0, &mut out);
            }
        }
        out
    }
}

// ─── Project ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub frames: Vec<Frame>,
    /// Always names an existing frame when `frames` is non-empty.
    pub active_frame: Option<FrameId>,
    /// Reusable component templates.
    #[serde(default)]
    pub components: Vec<Element>,
    #[serde(default)]
    pub color_palette: Vec<Color>,
    /// Shared typography presets.
    #[serde(default)]
    pub typography: Vec<Typography>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// A new project with a single empty "Frame 1", already active.
    pub fn new(name: impl Into<String>) -> Self {
        let frame = Frame::new("Frame 1");
        let now = Utc::now();
        Self {
            id: ProjectId::fresh(),
            name: name.into(),
            active_frame: Some(frame.id),
            frames: vec![frame],
            components: Vec::new(),
            color_palette: vec![
                Color::rgb(0, 255, 255),
                Color::rgb(255, 0, 255),
                Color::rgb(0, 255, 0),
                Color::rgb(139, 0, 255),
            ],
            typography: vec![Typography::default()],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|f| f.id == id)
    }

    pub fn active_frame(&self) -> Option<&Frame> {
        self.active_frame.and_then(|id| self.frame(id))
    }

    pub fn active_frame_mut(&mut self) -> Option<&mut Frame> {
        let id = self.active_frame?;
        self.frame_mut(id)
    }

    /// Append a frame and make it active.
    pub fn push_frame(&mut self, frame: Frame) -> FrameId {
        let id = frame.id;
        self.frames.push(frame);
        self.active_frame = Some(id);
        self.touch();
        id
    }

    /// Name for the next frame, e.g. "Frame 2".
    pub fn next_frame_name(&self) -> String {
        format!("Frame {}", self.frames.len() + 1)
    }

    /// Point `active_frame` at an existing frame if it dangles.
    /// Returns true when something changed.
    pub fn repair_active_frame(&mut self) -> bool {
        let valid = self.active_frame.is_some_and(|id| self.frame(id).is_some());
        if valid {
            return false;
        }
        let repaired = self.frames.first().map(|f| f.id);
        let changed = repaired != self.active_frame;
        self.active_frame = repaired;
        changed
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
