//! Canvas tools.
//!
//! The select tool drives the interaction state machine; every other tool
//! creates an element from a preset where the pointer goes down.

use nf_core::color::Color;
use nf_core::geometry::{Point, Size};
use nf_core::model::{BorderStyle, ElementType, ShapeKind, TextAlign};
use nf_core::patch::{BorderPatch, ElementPatch, StylePatch, TypographyPatch};

/// The active tool determines how pointer-down is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Rectangle,
    Circle,
    Image,
    Component,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        Self::Select,
        Self::Text,
        Self::Rectangle,
        Self::Circle,
        Self::Image,
        Self::Component,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Text => "text",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Image => "image",
            Self::Component => "component",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Element created by this tool at canvas point `at`, or `None` for the
    /// select tool.
    pub fn preset(self, at: Point) -> Option<(ElementType, ElementPatch)> {
        let outline = |color: Color, radius: f64| StylePatch {
            background: Some(color.with_alpha(0.1).into()),
            border: Some(BorderPatch {
                width: Some(2.0),
                style: Some(BorderStyle::Solid),
                color: Some(color.into()),
                radius: Some(radius),
            }),
            ..StylePatch::default()
        };

        let preset = match self {
            Self::Select => return None,
            Self::Rectangle => (
                ElementType::Container,
                ElementPatch {
                    name: Some("Rectangle".into()),
                    style: Some(outline(Color::rgb(0, 255, 255), 8.0)),
                    ..ElementPatch::sized(100.0, 100.0)
                },
            ),
            Self::Circle => (
                ElementType::Shape,
                ElementPatch {
                    name: Some("Circle".into()),
                    shape: Some(ShapeKind::Ellipse),
                    style: Some(outline(Color::rgb(255, 0, 255), 50.0)),
                    ..ElementPatch::sized(100.0, 100.0)
                },
            ),
            Self::Text => (
                ElementType::Text,
                ElementPatch {
                    name: Some("Text".into()),
                    content: Some("Click to edit".into()),
                    typography: Some(TypographyPatch {
                        font_family: Some("Orbitron".into()),
                        font_size: Some(16.0),
                        font_weight: Some(400),
                        line_height: Some(1.5),
                        letter_spacing: Some(0.0),
                        text_align: Some(TextAlign::Left),
                        color: Some(Color::rgb(0, 255, 255).into()),
                    }),
                    ..ElementPatch::sized(200.0, 50.0)
                },
            ),
            Self::Image => (
                ElementType::Image,
                ElementPatch {
                    name: Some("Image".into()),
                    ..ElementPatch::sized(200.0, 150.0)
                },
            ),
            Self::Component => (
                ElementType::Component,
                ElementPatch::named("Component").with_size(Size::new(200.0, 100.0)),
            ),
        };
        let (ty, patch) = preset;
        Some((ty, patch.with_position(at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::id::ElementId;
    use nf_core::model::{Element, ElementKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn names_roundtrip() {
        for tool in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(tool.name()), Some(tool));
        }
        assert_eq!(ToolKind::from_name("lasso"), None);
    }

    #[test]
    fn select_has_no_preset() {
        assert!(ToolKind::Select.preset(Point::ZERO).is_none());
    }

    #[test]
    fn circle_preset_builds_ellipse_at_pointer() {
        let (ty, patch) = ToolKind::Circle.preset(Point::new(40.0, 60.0)).unwrap();
        let mut el = Element::new(ElementId::fresh(), ty);
        patch.apply(&mut el);

        assert_eq!(el.kind, ElementKind::Shape { shape: ShapeKind::Ellipse });
        assert_eq!(el.position, Point::new(40.0, 60.0));
        assert_eq!(el.size, Size::new(100.0, 100.0));
        assert_eq!(el.style.border.unwrap().radius, 50.0);
    }

    #[test]
    fn text_preset_is_cyan_orbitron() {
        let (ty, patch) = ToolKind::Text.preset(Point::ZERO).unwrap();
        let mut el = Element::new(ElementId::fresh(), ty);
        patch.apply(&mut el);

        assert_eq!(el.kind.content(), Some("Click to edit"));
        let t = el.kind.typography().unwrap();
        assert_eq!(t.color, Color::rgb(0, 255, 255));
        assert_eq!(el.size, Size::new(200.0, 50.0));
    }
}
