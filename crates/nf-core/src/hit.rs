//! Hit testing: point / rectangle → element lookup.
//!
//! Elements are tested by their axis-aligned bounds (position + size); the
//! extra transform is ignored. Hidden and locked elements never hit.

use crate::geometry::{Point, Rect, contains, rects_intersect};
use crate::id::ElementId;
use crate::model::Element;

/// All interactive elements under `p`, topmost first.
pub fn hit_test(p: Point, elements: &[Element]) -> Vec<ElementId> {
    // Walk in reverse paint order (last painted = topmost)
    elements
        .iter()
        .rev()
        .filter(|el| el.is_interactive() && contains(el.bounds(), p))
        .map(|el| el.id)
        .collect()
}

/// Topmost interactive element under `p`, or `None` for background.
pub fn hit_test_top(p: Point, elements: &[Element]) -> Option<ElementId> {
    elements
        .iter()
        .rev()
        .find(|el| el.is_interactive() && contains(el.bounds(), p))
        .map(|el| el.id)
}

/// Interactive elements whose bounds intersect `rect`, in paint order.
/// Used for box (marquee) selection.
pub fn hit_test_rect(rect: Rect, elements: &[Element]) -> Vec<ElementId> {
    elements
        .iter()
        .filter(|el| el.is_interactive() && rects_intersect(el.bounds(), rect))
        .map(|el| el.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::model::ElementType;
    use pretty_assertions::assert_eq;

    fn rect_el(x: f64, y: f64, w: f64, h: f64) -> Element {
        let mut el = Element::new(ElementId::fresh(), ElementType::Shape);
        el.position = Point::new(x, y);
        el.size = Size::new(w, h);
        el
    }

    #[test]
    fn topmost_first() {
        let a = rect_el(0.0, 0.0, 100.0, 100.0);
        let b = rect_el(50.0, 50.0, 100.0, 100.0);
        let (a_id, b_id) = (a.id, b.id);
        let els = vec![a, b];

        assert_eq!(hit_test(Point::new(75.0, 75.0), &els), vec![b_id, a_id]);
        assert_eq!(hit_test_top(Point::new(10.0, 10.0), &els), Some(a_id));
        assert_eq!(hit_test_top(Point::new(500.0, 500.0), &els), None);
    }

    #[test]
    fn edges_hit() {
        let a = rect_el(10.0, 10.0, 50.0, 50.0);
        let id = a.id;
        let els = vec![a];
        assert_eq!(hit_test(Point::new(60.0, 60.0), &els), vec![id]);
        assert!(hit_test(Point::new(60.5, 60.0), &els).is_empty());
    }

    #[test]
    fn hidden_and_locked_are_skipped() {
        let mut hidden = rect_el(0.0, 0.0, 100.0, 100.0);
        hidden.visible = false;
        let mut locked = rect_el(0.0, 0.0, 100.0, 100.0);
        locked.locked = true;
        let els = vec![hidden, locked];

        assert!(hit_test(Point::new(50.0, 50.0), &els).is_empty());
        assert!(hit_test_rect(Rect::new(0.0, 0.0, 200.0, 200.0), &els).is_empty());
    }

    #[test]
    fn rect_hits_in_paint_order() {
        let a = rect_el(0.0, 0.0, 40.0, 40.0);
        let b = rect_el(100.0, 100.0, 40.0, 40.0);
        let c = rect_el(300.0, 300.0, 40.0, 40.0);
        let (a_id, b_id) = (a.id, b.id);
        let els = vec![a, b, c];

        assert_eq!(
            hit_test_rect(Rect::new(0.0, 0.0, 150.0, 150.0), &els),
            vec![a_id, b_id]
        );
    }
}
