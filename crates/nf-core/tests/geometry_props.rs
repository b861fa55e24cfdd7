//! Property tests for the coordinate and rectangle helpers.

use nf_core::geometry::{
    Point, Rect, Vec2, bounds_of, canvas_to_viewport, contains, rects_intersect, snap,
    viewport_to_canvas,
};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -10_000.0..10_000.0f64
}

fn zoom() -> impl Strategy<Value = f64> {
    1e-3..1e3f64
}

fn rect() -> impl Strategy<Value = Rect> {
    (coord(), coord(), 0.0..2_000.0f64, 0.0..2_000.0f64)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
}

proptest! {
    #[test]
    fn viewport_canvas_roundtrip(
        px in coord(), py in coord(), panx in coord(), pany in coord(), z in zoom()
    ) {
        let p = Point::new(px, py);
        let pan = Vec2::new(panx, pany);

        let back = canvas_to_viewport(viewport_to_canvas(p, pan, z), pan, z);
        prop_assert!((back.x - p.x).abs() < 1e-9, "x drifted to {}", back.x);
        prop_assert!((back.y - p.y).abs() < 1e-9, "y drifted to {}", back.y);

        let forth = viewport_to_canvas(canvas_to_viewport(p, pan, z), pan, z);
        prop_assert!((forth.x - p.x).abs() < 1e-9, "x drifted to {}", forth.x);
        prop_assert!((forth.y - p.y).abs() < 1e-9, "y drifted to {}", forth.y);
    }

    #[test]
    fn bounds_cover_every_input(rects in prop::collection::vec(rect(), 1..8)) {
        let b = bounds_of(rects.iter().copied());
        for r in &rects {
            prop_assert!(b.x0 <= r.x0 && b.y0 <= r.y0);
            prop_assert!(b.x1 >= r.x1 && b.y1 >= r.y1);
        }
    }

    #[test]
    fn intersection_is_symmetric(a in rect(), b in rect()) {
        prop_assert_eq!(rects_intersect(a, b), rects_intersect(b, a));
    }

    #[test]
    fn contained_point_means_intersection(r in rect(), fx in 0.0..=1.0f64, fy in 0.0..=1.0f64) {
        let p = Point::new(
            (r.x0 + r.width() * fx).min(r.x1),
            (r.y0 + r.height() * fy).min(r.y1),
        );
        prop_assert!(contains(r, p));
        let dot = Rect::from_points(p, p);
        prop_assert!(rects_intersect(r, dot));
    }

    #[test]
    fn snapped_points_sit_on_the_grid(x in coord(), y in coord(), grid in 1.0..100.0f64) {
        let s = snap(Point::new(x, y), grid);
        prop_assert!((s.x - x).abs() <= grid / 2.0 + 1e-9);
        prop_assert!((s.y - y).abs() <= grid / 2.0 + 1e-9);
        let steps = s.x / grid;
        prop_assert!((steps - steps.round()).abs() < 1e-6);
    }
}
