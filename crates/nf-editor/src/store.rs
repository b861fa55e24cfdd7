//! Design store: the single owned state object of an editing session.
//!
//! The store holds the open [`Project`] together with the session state
//! around it (selection, viewport, interaction, history, AI edit status)
//! and is the only place the model is mutated from. Every mutation that
//! changes the model pushes exactly one history entry before returning;
//! lookups that miss are silent no-ops reported through `bool`/`Option`
//! and a `log::debug!`.

use crate::ai::{AiEditError, AiEditRequest, AiEditResponse, CollaboratorError, TextGenerator};
use crate::config::EditorConfig;
use crate::history::{FrameProps, History, HistoryRecord};
use crate::interaction::{Drag, DragOperation, DragPreview, Interaction};
use crate::selection::Selection;
use crate::viewport::ViewportState;
use nf_core::geometry::{self, Point, Rect, Size, Vec2};
use nf_core::hit;
use nf_core::id::{ElementId, FrameId, ProjectId};
use nf_core::model::{AiProvenance, Element, ElementType, Frame, Project};
use nf_core::patch::{ElementPatch, FramePatch};

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// An AI edit in flight. Handed out by [`DesignStore::begin_ai_edit`] and
/// redeemed by [`DesignStore::complete_ai_edit`].
#[derive(Debug, Clone, PartialEq)]
pub struct AiTicket {
    pub id: u64,
    pub element_id: ElementId,
    pub frame_id: FrameId,
    pub prompt: String,
    pub request: AiEditRequest,
}

#[derive(Debug, Default)]
struct AiState {
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl AiState {
    /// Free the slot if `ticket` holds it.
    fn release(&mut self, ticket: u64) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        true
    }
}

/// Holds the AI slot for the duration of a generator call and frees it if
/// the call is abandoned before the answer is applied.
struct AiSlot<'a> {
    store: &'a mut DesignStore,
    ticket: Option<u64>,
}

impl Drop for AiSlot<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take()
            && self.store.ai.release(ticket)
        {
            log::warn!("AI edit #{ticket} abandoned");
        }
    }
}

pub struct DesignStore {
    project: Option<Project>,
    selection: Selection,
    viewport: ViewportState,
    interaction: Interaction,
    history: History,
    ai: AiState,
}

impl Default for DesignStore {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

/// Frame holding `id`, preferring the active frame.
fn locate(project: &Project, id: ElementId) -> Option<FrameId> {
    project
        .active_frame()
        .filter(|f| f.contains(id))
        .or_else(|| project.frames.iter().find(|f| f.contains(id)))
        .map(|f| f.id)
}

/// Snapshots of the elements linked to `id` (its parent and children).
fn linked_snapshots(frame: &Frame, id: ElementId) -> Vec<Element> {
    let Some(el) = frame.get(id) else {
        return Vec::new();
    };
    el.parent
        .iter()
        .chain(el.children.iter())
        .filter_map(|linked| frame.get(*linked))
        .cloned()
        .collect()
}

fn snapshots(frame: &Frame, ids: &[ElementId]) -> Vec<Element> {
    ids.iter().filter_map(|id| frame.get(*id)).cloned().collect()
}

impl DesignStore {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            project: None,
            selection: Selection::new(),
            viewport: ViewportState::from_config(&config.canvas),
            interaction: Interaction::Idle,
            history: History::new(config.history.capacity),
            ai: AiState::default(),
        }
    }

    // ─── Project ─────────────────────────────────────────────────────────

    /// Open a fresh project with one empty frame. Replaces any open project
    /// and resets the session state.
    pub fn create_project(&mut self, name: &str) -> ProjectId {
        let project = Project::new(name);
        let id = project.id;
        log::info!("created project {name:?} ({id})");
        self.open(project);
        id
    }

    /// Open an existing project (e.g. one read by `nf_core::persist`).
    pub fn load_project(&mut self, mut project: Project) -> ProjectId {
        if project.repair_active_frame() {
            log::warn!("load_project: active frame repaired");
        }
        let id = project.id;
        log::info!(
            "loaded project {:?} ({} frames)",
            project.name,
            project.frames.len()
        );
        self.open(project);
        id
    }

    fn open(&mut self, project: Project) {
        self.project = Some(project);
        self.ai.in_flight = None;
        self.selection.reset();
        self.interaction.cancel();
        self.history.clear();
        self.viewport.reset();
    }

    /// Close the open project and hand it back.
    pub fn close_project(&mut self) -> Option<Project> {
        self.ai.in_flight = None;
        self.selection.reset();
        self.interaction.cancel();
        self.history.clear();
        self.project.take()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn active_frame(&self) -> Option<&Frame> {
        self.project.as_ref()?.active_frame()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        let project = self.project.as_ref()?;
        project.frame(locate(project, id)?)?.get(id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn in_active_frame(&self, id: ElementId) -> bool {
        self.active_frame().is_some_and(|f| f.contains(id))
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Create an element of `ty` from its defaults merged with `patch`,
    /// appended on top of `frame` (the active frame when `None`). The new
    /// element becomes the selection when it lands in the active frame.
    pub fn add_element(
        &mut self,
        ty: ElementType,
        patch: &ElementPatch,
        frame: Option<FrameId>,
    ) -> Option<ElementId> {
        let Some(frame_id) = frame.or_else(|| self.project.as_ref()?.active_frame) else {
            log::debug!("add_element: no project or frame");
            return None;
        };
        let mut element = Element::new(ElementId::fresh(), ty);
        patch.apply(&mut element);
        self.append(frame_id, element, "Add Element")
    }

    fn append(&mut self, frame_id: FrameId, element: Element, label: &str) -> Option<ElementId> {
        let project = self.project.as_mut()?;
        let Some(frame) = project.frame_mut(frame_id) else {
            log::debug!("{label}: frame {frame_id} not found");
            return None;
        };
        let id = element.id;
        let index = frame.elements.len();
        frame.elements.push(element.clone());
        let active = project.active_frame == Some(frame_id);
        project.touch();

        self.history.push(
            label,
            HistoryRecord::Add {
                frame: frame_id,
                index,
                element,
            },
        );
        if active {
            self.selection.select(id, false);
        }
        Some(id)
    }

    /// Merge `patch` into the element. Returns false when `id` is unknown.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.modify_element(id, "Update Element", |el| patch.apply(el))
    }

    /// Run `edit` on the element and record the change. An edit that leaves
    /// the element as it was records nothing.
    fn modify_element(
        &mut self,
        id: ElementId,
        label: &str,
        edit: impl FnOnce(&mut Element),
    ) -> bool {
        let Some(project) = self.project.as_mut() else {
            log::debug!("{label}: no project");
            return false;
        };
        let Some(frame_id) = locate(project, id) else {
            log::debug!("{label}: {id} not found");
            return false;
        };
        let Some(el) = project.frame_mut(frame_id).and_then(|f| f.get_mut(id)) else {
            return false;
        };

        let before = el.clone();
        edit(el);
        if *el == before {
            log::debug!("{label}: {id} unchanged");
            return true;
        }
        let after = el.clone();
        project.touch();
        self.history.push(
            label,
            HistoryRecord::Update {
                frame: frame_id,
                before,
                after,
            },
        );
        true
    }

    /// Remove an element. Its parent forgets it and its children become
    /// top-level; selection and hover drop it.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let Some(project) = self.project.as_mut() else {
            return false;
        };
        let Some(frame_id) = locate(project, id) else {
            log::debug!("delete_element: {id} not found");
            return false;
        };
        let Some(frame) = project.frame_mut(frame_id) else {
            return false;
        };
        let related = linked_snapshots(frame, id);
        let Some((index, element)) = frame.remove(id) else {
            return false;
        };
        project.touch();

        self.selection.purge(id);
        if self.interaction.drag().and_then(|d| d.target) == Some(id) {
            self.interaction.cancel();
        }
        self.history.push(
            "Delete Element",
            HistoryRecord::Delete {
                frame: frame_id,
                index,
                element,
                related,
            },
        );
        true
    }

    /// Delete every selected element as one history entry. Returns the
    /// number removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            return 0;
        }
        self.history.begin_batch();
        let removed = ids
            .into_iter()
            .filter(|id| self.delete_element(*id))
            .count();
        self.history.end_batch("Delete Elements");
        removed
    }

    /// Copy an element on top of its frame, offset by 20 px and renamed
    /// "<name> Copy". The copy is not nested.
    pub fn duplicate_element(&mut self, id: ElementId) -> Option<ElementId> {
        let project = self.project.as_ref()?;
        let Some(frame_id) = locate(project, id) else {
            log::debug!("duplicate_element: {id} not found");
            return None;
        };
        let mut copy = project.frame(frame_id)?.get(id)?.clone();
        copy.id = ElementId::fresh();
        copy.name = format!("{} Copy", copy.name);
        copy.position += DUPLICATE_OFFSET;
        copy.parent = None;
        copy.children.clear();
        self.append(frame_id, copy, "Duplicate Element")
    }

    /// Duplicate every selected element as one history entry and select
    /// the copies.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let ids = self.selection.ids().to_vec();
        if ids.is_empty() {
            return Vec::new();
        }
        self.history.begin_batch();
        let copies: Vec<ElementId> = ids
            .into_iter()
            .filter_map(|id| self.duplicate_element(id))
            .collect();
        self.history.end_batch("Duplicate Elements");
        self.select_many(copies.iter().copied());
        copies
    }

    /// Move an element to `index` in paint order (clamped to the top).
    pub fn move_element(&mut self, id: ElementId, index: usize) -> bool {
        let Some(project) = self.project.as_mut() else {
            return false;
        };
        let Some(frame_id) = locate(project, id) else {
            log::debug!("move_element: {id} not found");
            return false;
        };
        let Some(frame) = project.frame_mut(frame_id) else {
            return false;
        };
        let Some(from) = frame.move_element(id, index) else {
            return false;
        };
        let to = frame.index_of(id).unwrap_or(from);
        if from == to {
            return true;
        }
        project.touch();
        self.history.push(
            "Reorder Element",
            HistoryRecord::Reorder {
                frame: frame_id,
                id,
                from,
                to,
            },
        );
        true
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        let project = self.project.as_ref()?;
        project.frame(locate(project, id)?)?.index_of(id)
    }

    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        match self.index_of(id) {
            Some(i) => self.move_element(id, i + 1),
            None => false,
        }
    }

    pub fn send_backward(&mut self, id: ElementId) -> bool {
        match self.index_of(id) {
            Some(i) => self.move_element(id, i.saturating_sub(1)),
            None => false,
        }
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.move_element(id, usize::MAX)
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.move_element(id, 0)
    }

    /// Nest `child` under `parent`, or lift it to the top level with `None`.
    /// Cycles and cross-frame nesting are refused.
    pub fn set_parent(&mut self, child: ElementId, parent: Option<ElementId>) -> bool {
        let Some(project) = self.project.as_mut() else {
            return false;
        };
        let Some(frame_id) = locate(project, child) else {
            log::debug!("set_parent: {child} not found");
            return false;
        };
        let Some(frame) = project.frame_mut(frame_id) else {
            return false;
        };

        let old_parent = frame.get(child).and_then(|c| c.parent);
        let touched: Vec<ElementId> = [Some(child), old_parent, parent]
            .into_iter()
            .flatten()
            .collect();
        let before = snapshots(frame, &touched);
        if !frame.set_parent(child, parent) {
            log::debug!("set_parent: refused {child} -> {parent:?}");
            return false;
        }
        let after = snapshots(frame, &touched);
        if before == after {
            return true;
        }
        project.touch();
        self.history.push(
            "Set Parent",
            HistoryRecord::Reparent {
                frame: frame_id,
                before,
                after,
            },
        );
        true
    }

    // ─── Frames ──────────────────────────────────────────────────────────

    /// Append a new frame ("Frame N" unless the patch names it) and make it
    /// active.
    pub fn add_frame(&mut self, patch: &FramePatch) -> Option<FrameId> {
        let Some(project) = self.project.as_mut() else {
            log::debug!("add_frame: no project");
            return None;
        };
        let mut frame = Frame::new(project.next_frame_name());
        patch.apply(&mut frame);
        let previous_active = project.active_frame;
        let index = project.frames.len();
        let id = project.push_frame(frame.clone());

        self.selection.reset();
        self.interaction.cancel();
        self.history.push(
            "Add Frame",
            HistoryRecord::AddFrame {
                index,
                frame,
                previous_active,
            },
        );
        Some(id)
    }

    /// Switch the active frame. Selection and hover are cleared.
    pub fn set_active_frame(&mut self, id: FrameId) -> bool {
        let Some(project) = self.project.as_mut() else {
            return false;
        };
        if project.frame(id).is_none() {
            log::debug!("set_active_frame: {id} not found");
            return false;
        }
        if project.active_frame != Some(id) {
            project.active_frame = Some(id);
            self.selection.reset();
            self.interaction.cancel();
        }
        true
    }

    pub fn update_frame(&mut self, id: FrameId, patch: &FramePatch) -> bool {
        let Some(project) = self.project.as_mut() else {
            return false;
        };
        let Some(frame) = project.frame_mut(id) else {
            log::debug!("update_frame: {id} not found");
            return false;
        };
        let before = FrameProps::of(frame);
        patch.apply(frame);
        let after = FrameProps::of(frame);
        if before == after {
            return true;
        }
        project.touch();
        self.history.push(
            "Update Frame",
            HistoryRecord::UpdateFrame {
                frame: id,
                before,
                after,
            },
        );
        true
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id` (toggle when `additive`). Ids outside the active frame
    /// are ignored.
    pub fn select(&mut self, id: ElementId, additive: bool) -> bool {
        if !self.in_active_frame(id) {
            log::debug!("select: {id} not in active frame");
            return false;
        }
        self.selection.select(id, additive);
        true
    }

    pub fn select_many(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        let ids: Vec<ElementId> = ids
            .into_iter()
            .filter(|id| self.in_active_frame(*id))
            .collect();
        self.selection.select_many(ids);
    }

    pub fn select_all(&mut self) {
        let ids: Vec<ElementId> = self
            .active_frame()
            .map(|f| f.elements.iter().map(|e| e.id).collect())
            .unwrap_or_default();
        self.selection.select_many(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_hovered(&mut self, id: Option<ElementId>) {
        match id {
            Some(id) if !self.in_active_frame(id) => self.selection.set_hovered(None),
            _ => self.selection.set_hovered(id),
        }
    }

    /// Drop selected/hovered ids that no longer exist in the active frame.
    fn prune_selection(&mut self) {
        let Some(frame) = self.project.as_ref().and_then(|p| p.active_frame()) else {
            self.selection.reset();
            return;
        };
        self.selection.retain(|id| frame.contains(id));
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Begin a drag at canvas point `start`. Every operation except box
    /// select needs an unlocked target in the active frame.
    pub fn start_drag(
        &mut self,
        target: Option<ElementId>,
        start: Point,
        operation: DragOperation,
    ) -> bool {
        let origin = match target {
            Some(id) => match self.active_frame().and_then(|f| f.get(id)) {
                Some(el) if el.locked => {
                    log::debug!("start_drag: {id} is locked");
                    return false;
                }
                Some(el) => Some(el.clone()),
                None => {
                    log::debug!("start_drag: {id} not in active frame");
                    return false;
                }
            },
            None => None,
        };
        if origin.is_none() && operation != DragOperation::BoxSelect {
            log::debug!("start_drag: {operation:?} needs a target");
            return false;
        }
        self.interaction
            .start_drag(Drag::new(operation, origin, start))
    }

    pub fn update_drag(&mut self, current: Point) -> bool {
        self.interaction.update_drag(current)
    }

    /// Shift state for the drag in progress.
    pub fn constrain_drag(&mut self, constrain: bool) {
        self.interaction.set_constrain(constrain);
    }

    pub fn drag_preview(&self) -> Option<DragPreview> {
        self.interaction.preview()
    }

    /// Commit the drag in progress and return to idle. Returns false when
    /// nothing was being dragged.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.interaction.finish_drag() else {
            log::debug!("end_drag: not dragging");
            return false;
        };
        log::debug!("drag end: {:?} on {:?}", drag.operation, drag.target);
        match drag.operation {
            DragOperation::Move => self.commit_move(&drag),
            DragOperation::Resize(handle) => {
                let (Some(id), Some(bounds)) = (drag.target, drag.resized_bounds(handle)) else {
                    return false;
                };
                self.modify_element(id, "Resize Element", |el| {
                    el.position = bounds.origin();
                    el.size = bounds.size();
                })
            }
            DragOperation::Rotate => {
                let (Some(id), Some(degrees)) = (drag.target, drag.rotation()) else {
                    return false;
                };
                self.modify_element(id, "Rotate Element", |el| {
                    el.transform.rotation = degrees;
                })
            }
            DragOperation::BoxSelect => {
                self.commit_box_select(drag.marquee(), drag.constrain);
                true
            }
        }
    }

    fn commit_move(&mut self, drag: &Drag) -> bool {
        let (Some(id), Some(origin)) = (drag.target, drag.origin.as_ref()) else {
            return false;
        };
        let landed = self.viewport.snap(origin.position + drag.delta());
        if !(self.selection.contains(id) && self.selection.len() > 1) {
            return self.modify_element(id, "Move Element", |el| el.position = landed);
        }

        let offset = landed - origin.position;
        let group = self.selection.ids().to_vec();
        self.history.begin_batch();
        for member in group {
            self.modify_element(member, "Move Element", |el| {
                if !el.locked {
                    el.position += offset;
                }
            });
        }
        self.history.end_batch("Move Elements");
        true
    }

    fn commit_box_select(&mut self, rect: Rect, additive: bool) {
        let hits = self
            .active_frame()
            .map(|f| hit::hit_test_rect(rect, &f.elements))
            .unwrap_or_default();
        log::debug!("box select {rect:?}: {} hit", hits.len());
        if additive {
            self.selection.extend(hits);
        } else {
            self.selection.select_many(hits);
        }
    }

    /// Abandon the drag or pan in progress. Nothing is committed.
    pub fn cancel_drag(&mut self) -> bool {
        self.interaction.cancel()
    }

    /// Start panning at viewport point `p`.
    pub fn begin_pan(&mut self, p: Point) -> bool {
        self.interaction.begin_pan(p)
    }

    pub fn pan_to(&mut self, p: Point) -> bool {
        match self.interaction.pan_to(p) {
            Some(delta) => {
                self.viewport.pan_by(delta);
                true
            }
            None => false,
        }
    }

    pub fn end_pan(&mut self) -> bool {
        self.interaction.end_pan()
    }

    /// Fit the active frame's content (or the frame itself when empty) into
    /// a viewport of `viewport_size`.
    pub fn zoom_to_fit(&mut self, viewport_size: Size, padding: f64) {
        let Some(frame) = self.project.as_ref().and_then(|p| p.active_frame()) else {
            self.viewport.reset();
            return;
        };
        let content = if frame.elements.is_empty() {
            Rect::from_origin_size(Point::ZERO, frame.size)
        } else {
            geometry::bounds_of(frame.elements.iter().map(Element::bounds))
        };
        self.viewport.zoom_to_fit(content, viewport_size, padding);
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the last applied entry. Returns its label.
    pub fn undo(&mut self) -> Option<String> {
        let project = self.project.as_mut()?;
        let label = self.history.undo(project)?;
        project.touch();
        self.interaction.cancel();
        self.prune_selection();
        Some(label)
    }

    /// Re-apply the next entry of the redo branch. Returns its label.
    pub fn redo(&mut self) -> Option<String> {
        let project = self.project.as_mut()?;
        let label = self.history.redo(project)?;
        project.touch();
        self.interaction.cancel();
        self.prune_selection();
        Some(label)
    }

    // ─── AI edits ────────────────────────────────────────────────────────

    pub fn is_ai_processing(&self) -> bool {
        self.ai.in_flight.is_some()
    }

    /// Claim the AI slot for an edit of `id`. Only one edit may be in
    /// flight; a second request is refused with [`AiEditError::Busy`].
    pub fn begin_ai_edit(&mut self, id: ElementId, prompt: &str) -> Result<AiTicket, AiEditError> {
        if self.ai.in_flight.is_some() {
            return Err(AiEditError::Busy);
        }
        let project = self.project.as_ref().ok_or(AiEditError::NoProject)?;
        let frame_id = locate(project, id).ok_or(AiEditError::ElementNotFound(id))?;
        let request = project
            .frame(frame_id)
            .and_then(|f| AiEditRequest::build(f, id, prompt))
            .ok_or(AiEditError::ElementNotFound(id))?;

        let ticket = self.ai.next_ticket;
        self.ai.next_ticket += 1;
        self.ai.in_flight = Some(ticket);
        log::info!("AI edit #{ticket} on {id}: {prompt:?}");
        Ok(AiTicket {
            id: ticket,
            element_id: id,
            frame_id,
            prompt: prompt.to_string(),
            request,
        })
    }

    /// Give up on `ticket` without applying anything. Returns false when
    /// the ticket no longer holds the slot.
    pub fn cancel_ai_edit(&mut self, ticket: AiTicket) -> bool {
        let released = self.ai.release(ticket.id);
        if released {
            log::info!("AI edit #{} cancelled", ticket.id);
        }
        released
    }

    /// Release the AI slot and apply the collaborator's answer through the
    /// regular update path, stamping AI provenance on the element.
    pub fn complete_ai_edit(
        &mut self,
        ticket: AiTicket,
        result: Result<AiEditResponse, CollaboratorError>,
    ) -> Result<AiEditResponse, AiEditError> {
        if !self.ai.release(ticket.id) {
            return Err(AiEditError::StaleTicket(ticket.id));
        }

        let response = result.inspect_err(|e| log::warn!("AI edit #{} failed: {e}", ticket.id))?;
        if !response.success {
            log::warn!("AI edit #{} declined: {}", ticket.id, response.explanation);
            return Err(AiEditError::Rejected(response.explanation));
        }
        if response.changes.is_empty() {
            log::info!("AI edit #{}: nothing to apply", ticket.id);
            return Ok(response);
        }

        let prompt = ticket.prompt;
        let applied = self.modify_element(ticket.element_id, "AI Edit", |el| {
            response.changes.apply(el);
            let original_prompt = el
                .ai
                .as_ref()
                .and_then(|a| a.original_prompt.clone().or_else(|| Some(a.prompt.clone())))
                .or_else(|| Some(prompt.clone()));
            el.ai = Some(AiProvenance {
                prompt,
                ai_generated: true,
                original_prompt,
            });
        });
        if !applied {
            return Err(AiEditError::ElementNotFound(ticket.element_id));
        }
        Ok(response)
    }

    /// Run a whole AI edit: claim the slot, ask `generator`, apply the
    /// answer. The processing flag is clear again whatever the outcome,
    /// including when the returned future is dropped mid-call.
    pub async fn process_ai_edit<G: TextGenerator>(
        &mut self,
        generator: &G,
        id: ElementId,
        prompt: &str,
    ) -> Result<AiEditResponse, AiEditError> {
        let ticket = self.begin_ai_edit(id, prompt)?;
        let mut slot = AiSlot {
            ticket: Some(ticket.id),
            store: self,
        };
        let result = generator.generate(&ticket.request).await;
        slot.ticket = None;
        slot.store.complete_ai_edit(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ResizeHandle;
    use nf_core::model::MIN_ELEMENT_SIZE;
    use pretty_assertions::assert_eq;

    fn store() -> DesignStore {
        let mut s = DesignStore::default();
        s.create_project("Test");
        s
    }

    fn add(s: &mut DesignStore, x: f64, y: f64) -> ElementId {
        s.add_element(ElementType::Container, &ElementPatch::at(x, y), None)
            .unwrap()
    }

    #[test]
    fn add_without_project_is_none() {
        let mut s = DesignStore::default();
        assert_eq!(
            s.add_element(ElementType::Text, &ElementPatch::default(), None),
            None
        );
        assert!(s.history().is_empty());
    }

    #[test]
    fn add_merges_defaults_and_selects() {
        let mut s = store();
        let id = s
            .add_element(ElementType::Text, &ElementPatch::at(5.0, 6.0), None)
            .unwrap();
        let el = s.element(id).unwrap();
        assert_eq!(el.position, Point::new(5.0, 6.0));
        assert_eq!(el.size, Size::new(200.0, 100.0));
        assert_eq!(el.kind.content(), Some("Text"));
        assert_eq!(s.selection().ids(), &[id]);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn update_unknown_is_noop() {
        let mut s = store();
        assert!(!s.update_element(ElementId::fresh(), &ElementPatch::named("x")));
        assert!(s.history().is_empty());
    }

    #[test]
    fn unchanged_update_records_nothing() {
        let mut s = store();
        let id = add(&mut s, 0.0, 0.0);
        assert!(s.update_element(id, &ElementPatch::at(0.0, 0.0)));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn duplicate_offsets_and_renames() {
        let mut s = store();
        let id = add(&mut s, 10.0, 10.0);
        let copy = s.duplicate_element(id).unwrap();
        let el = s.element(copy).unwrap();
        assert_eq!(el.name, "New Container Copy");
        assert_eq!(el.position, Point::new(30.0, 30.0));
        assert_eq!(s.selection().ids(), &[copy]);
    }

    #[test]
    fn delete_orphans_children_and_undo_relinks() {
        let mut s = store();
        let parent = add(&mut s, 0.0, 0.0);
        let child = add(&mut s, 10.0, 10.0);
        assert!(s.set_parent(child, Some(parent)));

        assert!(s.delete_element(parent));
        assert_eq!(s.element(child).unwrap().parent, None);

        s.undo();
        assert_eq!(s.element(child).unwrap().parent, Some(parent));
        assert_eq!(s.element(parent).unwrap().children.as_slice(), &[child]);
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut s = store();
        let a = add(&mut s, 0.0, 0.0);
        let b = add(&mut s, 0.0, 0.0);
        assert!(s.set_parent(b, Some(a)));
        assert!(!s.set_parent(a, Some(b)));
    }

    #[test]
    fn z_order_helpers() {
        let mut s = store();
        let a = add(&mut s, 0.0, 0.0);
        let b = add(&mut s, 0.0, 0.0);
        let c = add(&mut s, 0.0, 0.0);
        assert!(s.bring_to_front(a));
        let order: Vec<_> = s.active_frame().unwrap().elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, c, a]);

        assert!(s.send_backward(a));
        assert!(s.send_to_back(c));
        let order: Vec<_> = s.active_frame().unwrap().elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![c, b, a]);

        s.undo();
        s.undo();
        let order: Vec<_> = s.active_frame().unwrap().elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, c, a]);
    }

    #[test]
    fn add_frame_activates_and_clears_selection() {
        let mut s = store();
        add(&mut s, 0.0, 0.0);
        let frame = s.add_frame(&FramePatch::default()).unwrap();
        assert_eq!(s.project().unwrap().active_frame, Some(frame));
        assert_eq!(s.active_frame().unwrap().name, "Frame 2");
        assert!(s.selection().is_empty());
    }

    #[test]
    fn resize_drag_clamps_to_minimum() {
        let mut s = store();
        let id = add(&mut s, 100.0, 100.0);
        assert!(s.start_drag(
            Some(id),
            Point::new(300.0, 200.0),
            DragOperation::Resize(ResizeHandle::SE)
        ));
        s.update_drag(Point::new(0.0, 0.0));
        assert!(s.end_drag());
        let el = s.element(id).unwrap();
        assert_eq!(el.size, Size::new(MIN_ELEMENT_SIZE, MIN_ELEMENT_SIZE));
        assert_eq!(el.position, Point::new(100.0, 100.0));
    }

    #[test]
    fn move_snaps_when_enabled() {
        let mut s = store();
        let id = add(&mut s, 0.0, 0.0);
        s.viewport_mut().snap_to_grid = true;
        s.start_drag(Some(id), Point::ZERO, DragOperation::Move);
        s.update_drag(Point::new(13.0, 26.0));
        s.end_drag();
        assert_eq!(s.element(id).unwrap().position, Point::new(10.0, 30.0));
    }

    #[test]
    fn cancel_drag_commits_nothing() {
        let mut s = store();
        let id = add(&mut s, 0.0, 0.0);
        s.start_drag(Some(id), Point::ZERO, DragOperation::Move);
        s.update_drag(Point::new(50.0, 50.0));
        assert!(s.cancel_drag());
        assert!(!s.end_drag());
        assert_eq!(s.element(id).unwrap().position, Point::ZERO);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn locked_elements_do_not_drag() {
        let mut s = store();
        let id = add(&mut s, 0.0, 0.0);
        s.update_element(
            id,
            &ElementPatch {
                locked: Some(true),
                ..ElementPatch::default()
            },
        );
        assert!(!s.start_drag(Some(id), Point::ZERO, DragOperation::Move));
        assert!(s.interaction().is_idle());
    }

    #[test]
    fn pan_moves_viewport_only() {
        let mut s = store();
        assert!(s.begin_pan(Point::new(10.0, 10.0)));
        assert!(s.pan_to(Point::new(30.0, 5.0)));
        assert!(s.end_pan());
        assert_eq!(s.viewport().pan(), Vec2::new(20.0, -5.0));
        assert!(s.history().is_empty());
    }

    #[test]
    fn second_ai_edit_is_busy() {
        let mut s = store();
        let id = add(&mut s, 0.0, 0.0);
        let ticket = s.begin_ai_edit(id, "make it blue").unwrap();
        assert!(s.is_ai_processing());
        assert_eq!(s.begin_ai_edit(id, "again"), Err(AiEditError::Busy));

        let err = s
            .complete_ai_edit(ticket, Err(CollaboratorError::Transport("offline".into())))
            .unwrap_err();
        assert!(matches!(err, AiEditError::Collaborator(_)));
        assert!(!s.is_ai_processing());
    }
}
