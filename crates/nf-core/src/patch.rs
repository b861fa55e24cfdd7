//! Typed partial updates.
//!
//! A patch names only the fields it changes. Nested groups (position, size,
//! transform, style, border, typography) merge field by field, so a patch
//! carrying only `style.border.color` leaves the border width alone.
//!
//! Applying a patch validates as it goes: non-finite numbers and unparseable
//! color strings are dropped with a warning (the previous value stays),
//! opacity is clamped into `[0, 1]` and sizes are clamped to be non-negative.

use crate::color::{Color, Fill};
use crate::geometry::{Point, Size, Vec2};
use crate::model::{
    Border, BorderStyle, Element, ElementKind, Frame, Shadow, ShapeKind, TextAlign,
    Typography,
};
use serde::{Deserialize, Serialize};

// ─── Value inputs ────────────────────────────────────────────────────────

/// A color given either structurally or as text (`#hex`, `rgb()`, `rgba()`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorInput {
    Rgba(Color),
    Text(#[serde(with = "color_text")] Option<Color>),
}

impl ColorInput {
    pub fn resolve(&self) -> Option<Color> {
        match *self {
            Self::Rgba(c) => Some(c),
            Self::Text(c) => c,
        }
    }
}

impl From<Color> for ColorInput {
    fn from(c: Color) -> Self {
        Self::Rgba(c)
    }
}

/// A background given as a fill or as a color string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillInput {
    Fill(Fill),
    Text(#[serde(with = "color_text")] Option<Color>),
}

impl FillInput {
    pub fn resolve(&self) -> Option<Fill> {
        match self {
            Self::Fill(f) => Some(f.clone()),
            Self::Text(c) => c.map(Fill::Solid),
        }
    }
}

impl From<Color> for FillInput {
    fn from(c: Color) -> Self {
        Self::Fill(Fill::Solid(c))
    }
}

impl From<Fill> for FillInput {
    fn from(f: Fill) -> Self {
        Self::Fill(f)
    }
}

/// Color strings read leniently: a bad string becomes `None` rather than a
/// deserialization error, so one bad field never sinks the whole patch.
mod color_text {
    use crate::color::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(c: &Option<Color>, s: S) -> Result<S::Ok, S::Error> {
        match c {
            Some(c) => s.serialize_str(&c.to_hex()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Color>, D::Error> {
        let text = String::deserialize(d)?;
        Ok(Color::parse(&text))
    }
}

// ─── Patch groups ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl From<Point> for PointPatch {
    fn from(p: Point) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl From<Size> for SizePatch {
    fn from(s: Size) -> Self {
        Self {
            width: Some(s.width),
            height: Some(s.height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<BorderStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<FillInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderPatch>,
    /// Replaces the whole shadow list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadows: Option<Vec<Shadow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorInput>,
}

// ─── Element patch ───────────────────────────────────────────────────────

/// Partial update of an [`Element`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PointPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StylePatch>,
    /// Ignored for non-text elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographyPatch>,
    /// Text content, button label, input placeholder or icon glyph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Image source; ignored for non-image elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Ignored for non-shape elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

fn finite(value: Option<f64>, field: &str) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            log::warn!("rejecting non-finite {field}: {v}");
            None
        }
        None => None,
    }
}

fn finite32(value: Option<f32>, field: &str) -> Option<f32> {
    finite(value.map(f64::from), field).map(|v| v as f32)
}

fn color(input: Option<ColorInput>, field: &str) -> Option<Color> {
    let input = input?;
    let resolved = input.resolve();
    if resolved.is_none() {
        log::warn!("rejecting unparseable {field} color");
    }
    resolved
}

impl ElementPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Some(Point::new(x, y).into()),
            ..Self::default()
        }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            size: Some(Size::new(width, height).into()),
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_position(mut self, p: Point) -> Self {
        self.position = Some(p.into());
        self
    }

    pub fn with_size(mut self, s: Size) -> Self {
        self.size = Some(s.into());
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.transform.get_or_insert_with(TransformPatch::default).rotation = Some(degrees);
        self
    }

    pub fn with_background(mut self, fill: impl Into<FillInput>) -> Self {
        self.style.get_or_insert_with(StylePatch::default).background = Some(fill.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.style.get_or_insert_with(StylePatch::default).opacity = Some(opacity);
        self
    }

    /// Merge into `el`, validating every field on the way.
    pub fn apply(&self, el: &mut Element) {
        if let Some(name) = &self.name {
            el.name.clone_from(name);
        }

        if let Some(p) = &self.position {
            if let Some(x) = finite(p.x, "position.x") {
                el.position.x = x;
            }
            if let Some(y) = finite(p.y, "position.y") {
                el.position.y = y;
            }
        }

        if let Some(s) = &self.size {
            if let Some(w) = finite(s.width, "size.width") {
                el.size.width = w.max(0.0);
            }
            if let Some(h) = finite(s.height, "size.height") {
                el.size.height = h.max(0.0);
            }
        }

        if let Some(t) = &self.transform {
            let tr = &mut el.transform;
            if let Some(v) = finite(t.x, "transform.x") {
                tr.x = v;
            }
            if let Some(v) = finite(t.y, "transform.y") {
                tr.y = v;
            }
            if let Some(v) = finite(t.rotation, "transform.rotation") {
                tr.rotation = v;
            }
            if let Some(v) = finite(t.scale_x, "transform.scale_x") {
                tr.scale_x = v;
            }
            if let Some(v) = finite(t.scale_y, "transform.scale_y") {
                tr.scale_y = v;
            }
        }

        if let Some(style) = &self.style {
            apply_style(style, el);
        }

        if let Some(typo) = &self.typography {
            match el.kind.typography_mut() {
                Some(t) => apply_typography(typo, t),
                None => log::debug!("typography ignored for {:?} element {}", el.element_type(), el.id),
            }
        }

        if let Some(content) = &self.content {
            match el.kind.content_mut() {
                Some(slot) => slot.clone_from(content),
                None => log::debug!("content ignored for {:?} element {}", el.element_type(), el.id),
            }
        }

        if let Some(src) = &self.src {
            if let ElementKind::Image { src: slot } = &mut el.kind {
                *slot = Some(src.clone());
            } else {
                log::debug!("src ignored for {:?} element {}", el.element_type(), el.id);
            }
        }

        if let Some(shape) = self.shape {
            if let ElementKind::Shape { shape: slot } = &mut el.kind {
                *slot = shape;
            } else {
                log::debug!("shape ignored for {:?} element {}", el.element_type(), el.id);
            }
        }

        if let Some(visible) = self.visible {
            el.visible = visible;
        }
        if let Some(locked) = self.locked {
            el.locked = locked;
        }
    }
}

fn apply_style(patch: &StylePatch, el: &mut Element) {
    let style = &mut el.style;

    if let Some(bg) = &patch.background {
        match bg.resolve() {
            Some(fill) => style.background = Some(fill),
            None => log::warn!("rejecting unparseable background color"),
        }
    }

    if let Some(b) = &patch.border {
        let border = style.border.get_or_insert(Border {
            width: 0.0,
            style: BorderStyle::Solid,
            color: Color::TRANSPARENT,
            radius: 0.0,
        });
        if let Some(w) = finite(b.width, "border.width") {
            border.width = w.max(0.0);
        }
        if let Some(s) = b.style {
            border.style = s;
        }
        if let Some(c) = color(b.color, "border") {
            border.color = c;
        }
        if let Some(r) = finite(b.radius, "border.radius") {
            border.radius = r.max(0.0);
        }
    }

    if let Some(shadows) = &patch.shadows {
        style.shadows = shadows.iter().copied().collect();
    }

    if let Some(o) = finite32(patch.opacity, "opacity") {
        style.opacity = o.clamp(0.0, 1.0);
    }

    if let Some(b) = finite32(patch.blur, "blur") {
        style.blur = Some(b.max(0.0));
    }
}

fn apply_typography(patch: &TypographyPatch, t: &mut Typography) {
    if let Some(family) = &patch.font_family {
        t.font_family.clone_from(family);
    }
    if let Some(size) = finite(patch.font_size, "font_size") {
        t.font_size = size.max(0.0);
    }
    if let Some(weight) = patch.font_weight {
        t.font_weight = weight.clamp(100, 900);
    }
    if let Some(lh) = finite(patch.line_height, "line_height") {
        t.line_height = lh;
    }
    if let Some(ls) = finite(patch.letter_spacing, "letter_spacing") {
        t.letter_spacing = ls;
    }
    if let Some(align) = patch.text_align {
        t.text_align = align;
    }
    if let Some(c) = color(patch.color, "text") {
        t.color = c;
    }
}

// ─── Frame patch ─────────────────────────────────────────────────────────

/// Partial update of a [`Frame`]'s own properties (not its elements).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<SizePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<FillInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan: Option<Vec2>,
}

impl FramePatch {
    pub fn apply(&self, frame: &mut Frame) {
        if let Some(name) = &self.name {
            frame.name.clone_from(name);
        }
        if let Some(s) = &self.size {
            if let Some(w) = finite(s.width, "frame.width") {
                frame.size.width = w.max(0.0);
            }
            if let Some(h) = finite(s.height, "frame.height") {
                frame.size.height = h.max(0.0);
            }
        }
        if let Some(bg) = &self.background {
            match bg.resolve() {
                Some(fill) => frame.background = fill,
                None => log::warn!("rejecting unparseable frame background"),
            }
        }
        if let Some(z) = finite(self.zoom, "frame.zoom")
            && z > 0.0
        {
            frame.zoom = z;
        }
        if let Some(pan) = self.pan
            && pan.is_finite()
        {
            frame.pan = pan;
        }
    }
}
