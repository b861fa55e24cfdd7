//! Pure geometry helpers for the canvas.
//!
//! Canvas space is frame-local units; viewport space is screen pixels
//! relative to the canvas widget. `canvas = (viewport - pan) / zoom`.

pub use kurbo::{Point, Rect, Size, Vec2};

/// Convert a viewport (screen) point into canvas coordinates.
pub fn viewport_to_canvas(p: Point, pan: Vec2, zoom: f64) -> Point {
    ((p.to_vec2() - pan) / zoom).to_point()
}

/// Convert a canvas point into viewport (screen) coordinates.
pub fn canvas_to_viewport(p: Point, pan: Vec2, zoom: f64) -> Point {
    (p.to_vec2() * zoom + pan).to_point()
}

/// Inclusive point-in-rectangle test (edges count as inside).
pub fn contains(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Two rectangles intersect unless one lies strictly to one side of the
/// other on some axis. Touching edges intersect.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || b.x1 < a.x0 || a.y1 < b.y0 || b.y1 < a.y0)
}

/// Bounding box covering every rectangle; `Rect::ZERO` for no input.
pub fn bounds_of<I>(rects: I) -> Rect
where
    I: IntoIterator<Item = Rect>,
{
    rects
        .into_iter()
        .reduce(|acc, r| acc.union(r))
        .unwrap_or(Rect::ZERO)
}

/// Round each axis to the nearest multiple of `grid`.
/// A non-positive or non-finite grid leaves the point untouched.
pub fn snap(p: Point, grid: f64) -> Point {
    if !(grid.is_finite() && grid > 0.0) {
        return p;
    }
    Point::new((p.x / grid).round() * grid, (p.y / grid).round() * grid)
}

/// Normalized rectangle spanned by two corner points.
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Angle of `point` around `center`, in degrees.
pub fn rotation_angle(center: Point, point: Point) -> f64 {
    (point - center).atan2().to_degrees()
}

/// Fit `proposed` to the aspect ratio of `current`, keeping whichever
/// dimension needs the smaller correction.
pub fn resize_keep_aspect(current: Size, proposed: Size) -> Size {
    if current.height == 0.0 || current.width == 0.0 {
        return proposed;
    }
    let ratio = current.width / current.height;
    let width_based_height = proposed.width / ratio;
    let height_based_width = proposed.height * ratio;

    if (proposed.height - width_based_height).abs() < (proposed.width - height_based_width).abs() {
        Size::new(proposed.width, width_based_height)
    } else {
        Size::new(height_based_width, proposed.height)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}
