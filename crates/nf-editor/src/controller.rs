//! Canvas controller.
//!
//! Holds the design store and the active tool. All host input goes through
//! [`CanvasController::handle`]: pointer events drive the interaction state
//! machine, the wheel drives the viewport, and keys resolve to shortcut
//! actions. Pointer positions arrive in viewport coordinates and are
//! converted to canvas coordinates here.

use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers, PointerThrottle};
use crate::interaction::{DragOperation, ResizeHandle};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::DesignStore;
use crate::tools::ToolKind;
use nf_core::geometry::{self, Point, Size};
use nf_core::hit;
use nf_core::id::ElementId;

/// Grab radius of selection handles, in screen pixels.
pub const HANDLE_RADIUS: f64 = 6.0;
/// Distance of the rotate handle above the top edge, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;
/// Padding used by zoom-to-fit, in screen pixels.
pub const FIT_PADDING: f64 = 50.0;

/// What handling one event did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Something visible changed and the host should re-render.
    pub changed: bool,
    pub tool_switched: bool,
    pub action: Option<ShortcutAction>,
}

impl EventOutcome {
    fn changed(changed: bool) -> Self {
        Self {
            changed,
            ..Self::default()
        }
    }
}

pub struct CanvasController {
    store: DesignStore,
    active_tool: ToolKind,
    throttle: PointerThrottle,
    viewport_size: Size,
    /// Space held: pointer-down pans instead of using the tool.
    space_held: bool,
}

impl CanvasController {
    pub fn new(config: &EditorConfig, viewport_size: Size) -> Self {
        Self {
            store: DesignStore::new(config),
            active_tool: ToolKind::Select,
            throttle: PointerThrottle::new(config.input.pointer_throttle_ms),
            viewport_size,
            space_held: false,
        }
    }

    pub fn store(&self) -> &DesignStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DesignStore {
        &mut self.store
    }

    pub fn into_store(self) -> DesignStore {
        self.store
    }

    pub fn tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.active_tool {
            log::debug!("tool: {} -> {}", self.active_tool.name(), tool.name());
            self.active_tool = tool;
        }
    }

    /// Host canvas resized.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    pub fn handle(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::PointerDown {
                position,
                modifiers,
            } => self.pointer_down(*position, *modifiers),
            InputEvent::PointerMove {
                position,
                modifiers,
                time_ms,
            } => self.pointer_move(*position, *modifiers, *time_ms),
            InputEvent::PointerUp {
                position,
                modifiers,
            } => self.pointer_up(*position, *modifiers),
            InputEvent::Wheel { delta, modifiers } => {
                self.store.viewport_mut().wheel(*delta, modifiers.command());
                EventOutcome::changed(true)
            }
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, *modifiers),
            InputEvent::KeyUp { key, .. } => self.key_up(key),
        }
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    fn pointer_down(&mut self, position: Point, modifiers: Modifiers) -> EventOutcome {
        self.throttle.reset();
        if self.space_held {
            return EventOutcome::changed(self.store.begin_pan(position));
        }

        let p = self.store.viewport().to_canvas(position);
        if let Some((ty, patch)) = self.active_tool.preset(p) {
            let created = self.store.add_element(ty, &patch, None).is_some();
            self.set_tool(ToolKind::Select);
            return EventOutcome {
                changed: created,
                tool_switched: true,
                action: None,
            };
        }

        if let Some((id, operation)) = self.handle_at(p) {
            let started = self.store.start_drag(Some(id), p, operation);
            return EventOutcome::changed(started);
        }

        match self.top_hit(p) {
            Some(id) => {
                if modifiers.shift {
                    self.store.select(id, true);
                } else if !self.store.selection().contains(id) {
                    self.store.select(id, false);
                }
                if self.store.selection().contains(id) {
                    self.store.start_drag(Some(id), p, DragOperation::Move);
                }
            }
            None => {
                if !modifiers.shift {
                    self.store.clear_selection();
                }
                self.store.start_drag(None, p, DragOperation::BoxSelect);
                self.store.constrain_drag(modifiers.shift);
            }
        }
        EventOutcome::changed(true)
    }

    fn pointer_move(&mut self, position: Point, modifiers: Modifiers, time_ms: u64) -> EventOutcome {
        if !self.throttle.admit(time_ms) {
            log::trace!("pointer move at {time_ms}ms throttled");
            return EventOutcome::default();
        }
        if self.store.interaction().is_panning() {
            return EventOutcome::changed(self.store.pan_to(position));
        }

        let p = self.store.viewport().to_canvas(position);
        if self.store.interaction().is_dragging() {
            self.store.constrain_drag(modifiers.shift);
            return EventOutcome::changed(self.store.update_drag(p));
        }

        let hovered = self.top_hit(p);
        if hovered == self.store.selection().hovered() {
            return EventOutcome::default();
        }
        log::trace!("hover: {hovered:?}");
        self.store.set_hovered(hovered);
        EventOutcome::changed(true)
    }

    fn pointer_up(&mut self, position: Point, modifiers: Modifiers) -> EventOutcome {
        self.throttle.reset();
        if self.store.interaction().is_panning() {
            self.store.pan_to(position);
            return EventOutcome::changed(self.store.end_pan());
        }
        if !self.store.interaction().is_dragging() {
            return EventOutcome::default();
        }
        let p = self.store.viewport().to_canvas(position);
        self.store.update_drag(p);
        self.store.constrain_drag(modifiers.shift);
        EventOutcome::changed(self.store.end_drag())
    }

    /// Resize or rotate handle of the single selected element under `p`.
    fn handle_at(&self, p: Point) -> Option<(ElementId, DragOperation)> {
        let selection = self.store.selection();
        if selection.len() != 1 {
            return None;
        }
        let id = selection.first()?;
        let el = self.store.active_frame()?.get(id)?;
        if el.locked {
            return None;
        }
        let zoom = self.store.viewport().zoom();
        let radius = HANDLE_RADIUS / zoom;
        let bounds = el.bounds();

        let rotate = Point::new(bounds.center().x, bounds.y0 - ROTATE_HANDLE_OFFSET / zoom);
        if geometry::distance(rotate, p) <= radius {
            return Some((id, DragOperation::Rotate));
        }
        ResizeHandle::ALL
            .into_iter()
            .find(|h| geometry::distance(h.anchor(bounds), p) <= radius)
            .map(|h| (id, DragOperation::Resize(h)))
    }

    fn top_hit(&self, p: Point) -> Option<ElementId> {
        let frame = self.store.active_frame()?;
        hit::hit_test_top(p, &frame.elements)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    fn key_down(&mut self, key: &str, modifiers: Modifiers) -> EventOutcome {
        if key == "Shift" {
            self.store.constrain_drag(true);
            return EventOutcome::changed(self.store.interaction().is_dragging());
        }
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return EventOutcome::default();
        };
        log::debug!("shortcut {key:?} -> {action:?}");
        let (changed, tool_switched) = self.dispatch_action(action);
        EventOutcome {
            changed,
            tool_switched,
            action: Some(action),
        }
    }

    fn key_up(&mut self, key: &str) -> EventOutcome {
        match key {
            " " => {
                self.space_held = false;
                EventOutcome::changed(self.store.end_pan())
            }
            "Shift" => {
                self.store.constrain_drag(false);
                EventOutcome::changed(self.store.interaction().is_dragging())
            }
            _ => EventOutcome::default(),
        }
    }

    /// Run a shortcut action directly. Returns (changed, tool_switched).
    pub fn dispatch_action(&mut self, action: ShortcutAction) -> (bool, bool) {
        let primary = self.store.selection().first();
        match action {
            ShortcutAction::Tool(tool) => {
                self.set_tool(tool);
                (false, true)
            }

            ShortcutAction::Undo => (self.store.undo().is_some(), false),
            ShortcutAction::Redo => (self.store.redo().is_some(), false),
            ShortcutAction::Delete => (self.store.delete_selected() > 0, false),
            ShortcutAction::Duplicate => (!self.store.duplicate_selected().is_empty(), false),
            ShortcutAction::SelectAll => {
                self.store.select_all();
                (true, false)
            }

            ShortcutAction::ZoomIn => {
                self.store.viewport_mut().zoom_in();
                (true, false)
            }
            ShortcutAction::ZoomOut => {
                self.store.viewport_mut().zoom_out();
                (true, false)
            }
            ShortcutAction::ZoomToFit => {
                self.store.zoom_to_fit(self.viewport_size, FIT_PADDING);
                (true, false)
            }
            ShortcutAction::ResetView => {
                self.store.viewport_mut().reset();
                (true, false)
            }
            ShortcutAction::PanStart => {
                self.space_held = true;
                (false, false)
            }

            ShortcutAction::SendBackward
            | ShortcutAction::BringForward
            | ShortcutAction::SendToBack
            | ShortcutAction::BringToFront => (self.reorder(primary, action), false),

            ShortcutAction::Cancel => {
                if self.store.cancel_drag() {
                    return (true, false);
                }
                let had_selection = !self.store.selection().is_empty();
                self.store.clear_selection();
                (had_selection, false)
            }
        }
    }

    /// Z-order change for the primary selected element.
    fn reorder(&mut self, primary: Option<ElementId>, action: ShortcutAction) -> bool {
        let Some(id) = primary else {
            return false;
        };
        match action {
            ShortcutAction::SendBackward => self.store.send_backward(id),
            ShortcutAction::BringForward => self.store.bring_forward(id),
            ShortcutAction::SendToBack => self.store.send_to_back(id),
            ShortcutAction::BringToFront => self.store.bring_to_front(id),
            _ => false,
        }
    }
}
