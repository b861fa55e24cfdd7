//! Colors and fills.
//!
//! Channels are stored the way the canvas UI edits them: 8-bit RGB plus a
//! floating-point alpha in `[0, 1]`. Text parsing (hex and `rgb()/rgba()`)
//! is built on `winnow`.

use serde::{Deserialize, Serialize};
use winnow::ascii::{digit0, digit1, space0};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// RGBA color: 8-bit channels, alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 1.0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with a different alpha, clamped into `[0, 1]`.
    /// A non-finite alpha keeps the current one.
    pub fn with_alpha(self, a: f32) -> Self {
        if !a.is_finite() {
            return self;
        }
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };
        let short = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? * 17) };

        match bytes.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self::rgba(
                short(0)?,
                short(1)?,
                short(2)?,
                short(3)? as f32 / 255.0,
            )),
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self::rgba(
                pair(0)?,
                pair(2)?,
                pair(4)?,
                pair(6)? as f32 / 255.0,
            )),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        if a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, a)
        }
    }

    /// CSS `rgba()` notation.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    /// Parse either hex notation or CSS `rgb()` / `rgba()` notation.
    ///
    /// Returns `None` for anything malformed or out of range; callers keep
    /// their previous value in that case.
    pub fn parse(input: &str) -> Option<Self> {
        let mut rest = input.trim();
        let color = alt((parse_hex_color, parse_css_color))
            .parse_next(&mut rest)
            .ok()?;
        rest.trim().is_empty().then_some(color)
    }
}

// ─── Parsers ────────────────────────────────────────────────────────────

fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

fn skip_space(input: &mut &str) -> ModalResult<()> {
    space0.void().parse_next(input)
}

fn parse_hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let hex_digits: &str = take_while(1..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    match Color::from_hex(hex_digits) {
        Some(color) => Ok(color),
        None => backtrack(),
    }
}

fn parse_number(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    let _ = opt('-').parse_next(input)?;
    let _ = digit1.parse_next(input)?;
    let _ = opt(('.', digit0)).parse_next(input)?;
    let matched = &start[..start.len() - input.len()];
    match matched.parse::<f32>() {
        Ok(n) => Ok(n),
        Err(_) => backtrack(),
    }
}

fn parse_channel(input: &mut &str) -> ModalResult<u8> {
    skip_space(input)?;
    let n = parse_number(input)?;
    skip_space(input)?;
    if (0.0..=255.0).contains(&n) {
        Ok(n.round() as u8)
    } else {
        backtrack()
    }
}

fn parse_comma(input: &mut &str) -> ModalResult<()> {
    ','.void().parse_next(input)
}

fn parse_css_color(input: &mut &str) -> ModalResult<Color> {
    let _ = alt(("rgba", "rgb")).parse_next(input)?;
    skip_space(input)?;
    let _ = '('.parse_next(input)?;
    let r = parse_channel(input)?;
    parse_comma(input)?;
    let g = parse_channel(input)?;
    parse_comma(input)?;
    let b = parse_channel(input)?;
    let a = opt(preceded(parse_comma, preceded(skip_space, parse_number))).parse_next(input)?;
    skip_space(input)?;
    let _ = ')'.parse_next(input)?;

    let a = a.unwrap_or(1.0);
    if !(0.0..=1.0).contains(&a) {
        return backtrack();
    }
    Ok(Color::rgba(r, g, b, a))
}

// ─── Gradients & fills ──────────────────────────────────────────────────

/// A gradient stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32, // 0.0 .. 1.0
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    /// Degrees; only meaningful for linear gradients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
}

/// Background paint: a solid color or a gradient.
///
/// Untagged so that a bare `{r, g, b, a}` object reads as a solid fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Solid(Color),
    Gradient(Gradient),
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let c = Color::from_hex("#00FFFF").unwrap();
        assert_eq!(c, Color::rgb(0, 255, 255));
        assert_eq!(c.to_hex(), "#00FFFF");

        let c2 = Color::from_hex("#FF000080").unwrap();
        assert!((c2.a - 128.0 / 255.0).abs() < 0.01);
        assert_eq!(c2.to_hex().len(), 9);
    }

    #[test]
    fn short_hex_expands() {
        assert_eq!(Color::from_hex("0f0"), Some(Color::rgb(0, 255, 0)));
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::parse("#zz0000"), None);
    }

    #[test]
    fn parses_css_notation() {
        assert_eq!(
            Color::parse("rgba(0, 255, 255, 0.3)"),
            Some(Color::rgba(0, 255, 255, 0.3))
        );
        assert_eq!(Color::parse("rgb(26,26,46)"), Some(Color::rgb(26, 26, 46)));
        assert_eq!(Color::parse("  #1A1A2E "), Some(Color::rgb(26, 26, 46)));
    }

    #[test]
    fn css_out_of_range_is_rejected() {
        assert_eq!(Color::parse("rgb(256, 0, 0)"), None);
        assert_eq!(Color::parse("rgba(0, 0, 0, 1.5)"), None);
        assert_eq!(Color::parse("rgb(0, 0, 0) trailing"), None);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Color::WHITE.with_alpha(-1.0).a, 0.0);
        assert_eq!(Color::WHITE.with_alpha(f32::NAN).a, 1.0);
    }

    #[test]
    fn fill_reads_bare_color_as_solid() {
        let fill: Fill = serde_json::from_str(r#"{"r":15,"g":15,"b":25,"a":1}"#).unwrap();
        assert_eq!(fill, Fill::Solid(Color::rgb(15, 15, 25)));

        let gradient: Fill = serde_json::from_str(
            r#"{"kind":"linear","angle":90,"stops":[{"position":0,"color":{"r":0,"g":0,"b":0,"a":1}}]}"#,
        )
        .unwrap();
        assert!(matches!(gradient, Fill::Gradient(_)));
    }
}
