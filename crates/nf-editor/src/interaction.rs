//! Drag / pan interaction state machine.
//!
//! ```text
//!            start_drag                 end_drag / cancel
//!   Idle ──────────────────▶ Dragging ───────────────────▶ Idle
//!    │  begin_pan                          end_pan
//!    └──────────────────────▶ Panning ────────────────────▶ Idle
//! ```
//!
//! Updates while dragging only move the preview. The model is touched once,
//! by the store, when the drag ends.

use nf_core::geometry::{self, Point, Rect, Size, Vec2};
use nf_core::id::ElementId;
use nf_core::model::{Element, MIN_ELEMENT_SIZE};
use serde::{Deserialize, Serialize};

/// Rotation step used while the constrain modifier is held.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

// ─── Resize handles ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::NW,
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
    ];

    fn moves_left(self) -> bool {
        matches!(self, Self::NW | Self::W | Self::SW)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::NE | Self::E | Self::SE)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::NW | Self::N | Self::NE)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::SW | Self::S | Self::SE)
    }

    /// Where the handle sits on `bounds`.
    pub fn anchor(self, bounds: Rect) -> Point {
        let c = bounds.center();
        let x = if self.moves_left() {
            bounds.x0
        } else if self.moves_right() {
            bounds.x1
        } else {
            c.x
        };
        let y = if self.moves_top() {
            bounds.y0
        } else if self.moves_bottom() {
            bounds.y1
        } else {
            c.y
        };
        Point::new(x, y)
    }

    /// CSS cursor name for hosts that show one.
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N => "n-resize",
            Self::NE => "ne-resize",
            Self::E => "e-resize",
            Self::SE => "se-resize",
            Self::S => "s-resize",
            Self::SW => "sw-resize",
            Self::W => "w-resize",
            Self::NW => "nw-resize",
        }
    }
}

/// Resize `origin` by dragging `handle` by `delta`.
///
/// The edges opposite the handle stay fixed. Width and height never drop
/// below [`MIN_ELEMENT_SIZE`]; with `keep_aspect` the original ratio holds.
pub fn resize_rect(origin: Rect, handle: ResizeHandle, delta: Vec2, keep_aspect: bool) -> Rect {
    let mut width = origin.width();
    let mut height = origin.height();
    if handle.moves_left() {
        width -= delta.x;
    }
    if handle.moves_right() {
        width += delta.x;
    }
    if handle.moves_top() {
        height -= delta.y;
    }
    if handle.moves_bottom() {
        height += delta.y;
    }

    let mut size = Size::new(width, height);
    if keep_aspect {
        size = geometry::resize_keep_aspect(origin.size(), size);
    }
    size.width = size.width.max(MIN_ELEMENT_SIZE);
    size.height = size.height.max(MIN_ELEMENT_SIZE);

    let x = if handle.moves_left() {
        origin.x1 - size.width
    } else {
        origin.x0
    };
    let y = if handle.moves_top() {
        origin.y1 - size.height
    } else {
        origin.y0
    };
    Rect::from_origin_size((x, y), size)
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragOperation {
    Move,
    Resize(ResizeHandle),
    Rotate,
    BoxSelect,
}

/// Display-only result of an in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPreview {
    /// Where the target would land.
    Ghost {
        id: ElementId,
        bounds: Rect,
        rotation: f64,
    },
    /// Normalized box-select rectangle.
    Marquee(Rect),
}

/// An in-progress drag, in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub operation: DragOperation,
    pub target: Option<ElementId>,
    /// Target as it was when the drag started.
    pub origin: Option<Element>,
    pub start: Point,
    pub current: Point,
    /// Shift held: axis-lock moves, keep aspect on resize, step rotation,
    /// add to the selection on box select.
    pub constrain: bool,
}

impl Drag {
    pub fn new(operation: DragOperation, origin: Option<Element>, start: Point) -> Self {
        Self {
            operation,
            target: origin.as_ref().map(|e| e.id),
            origin,
            start,
            current: start,
            constrain: false,
        }
    }

    /// Pointer travel since the drag started. Moves are locked to the
    /// dominant axis while constrained.
    pub fn delta(&self) -> Vec2 {
        let mut d = self.current - self.start;
        if self.constrain && self.operation == DragOperation::Move {
            if d.x.abs() > d.y.abs() {
                d.y = 0.0;
            } else {
                d.x = 0.0;
            }
        }
        d
    }

    pub fn marquee(&self) -> Rect {
        geometry::normalize_rect(self.start, self.current)
    }

    /// Target position after a move (before grid snapping).
    pub fn moved_position(&self) -> Option<Point> {
        let origin = self.origin.as_ref()?;
        Some(origin.position + self.delta())
    }

    pub fn resized_bounds(&self, handle: ResizeHandle) -> Option<Rect> {
        let origin = self.origin.as_ref()?;
        Some(resize_rect(origin.bounds(), handle, self.delta(), self.constrain))
    }

    /// Target rotation in degrees: the original rotation plus the angle
    /// swept around the element's center.
    pub fn rotation(&self) -> Option<f64> {
        let origin = self.origin.as_ref()?;
        let center = origin.center();
        let swept = geometry::rotation_angle(center, self.current)
            - geometry::rotation_angle(center, self.start);
        let mut degrees = origin.transform.rotation + swept;
        if self.constrain {
            degrees = (degrees / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES;
        }
        Some(degrees)
    }

    pub fn preview(&self) -> Option<DragPreview> {
        if self.operation == DragOperation::BoxSelect {
            return Some(DragPreview::Marquee(self.marquee()));
        }
        let origin = self.origin.as_ref()?;
        let (bounds, rotation) = match self.operation {
            DragOperation::Move => (
                Rect::from_origin_size(self.moved_position()?, origin.size),
                origin.transform.rotation,
            ),
            DragOperation::Resize(handle) => {
                (self.resized_bounds(handle)?, origin.transform.rotation)
            }
            DragOperation::Rotate => (origin.bounds(), self.rotation()?),
            DragOperation::BoxSelect => return None,
        };
        Some(DragPreview::Ghost {
            id: origin.id,
            bounds,
            rotation,
        })
    }
}

// ─── State machine ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// `last` is in viewport coordinates.
    Panning { last: Point },
    Dragging(Drag),
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    pub fn drag(&self) -> Option<&Drag> {
        match self {
            Self::Dragging(d) => Some(d),
            _ => None,
        }
    }

    pub fn preview(&self) -> Option<DragPreview> {
        self.drag().and_then(Drag::preview)
    }

    /// Enter `Dragging`. Refused unless idle.
    pub fn start_drag(&mut self, drag: Drag) -> bool {
        if !self.is_idle() {
            log::debug!("start_drag ignored: not idle ({self:?})");
            return false;
        }
        log::debug!("drag start: {:?} on {:?}", drag.operation, drag.target);
        *self = Self::Dragging(drag);
        true
    }

    pub fn update_drag(&mut self, current: Point) -> bool {
        match self {
            Self::Dragging(drag) => {
                log::trace!("drag update: {current:?}");
                drag.current = current;
                true
            }
            _ => false,
        }
    }

    pub fn set_constrain(&mut self, constrain: bool) {
        if let Self::Dragging(drag) = self {
            drag.constrain = constrain;
        }
    }

    /// Leave `Dragging`, handing back the finished drag.
    pub fn finish_drag(&mut self) -> Option<Drag> {
        match std::mem::take(self) {
            Self::Dragging(drag) => Some(drag),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Abandon a drag or pan without committing anything.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.is_idle();
        *self = Self::Idle;
        was_active
    }

    /// Enter `Panning` at viewport point `p`. Refused unless idle.
    pub fn begin_pan(&mut self, p: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = Self::Panning { last: p };
        true
    }

    /// Pointer delta since the last pan update, if panning.
    pub fn pan_to(&mut self, p: Point) -> Option<Vec2> {
        match self {
            Self::Panning { last } => {
                let delta = p - *last;
                *last = p;
                Some(delta)
            }
            _ => None,
        }
    }

    pub fn end_pan(&mut self) -> bool {
        if self.is_panning() {
            *self = Self::Idle;
            true
        } else {
            false
        }
    }
}
