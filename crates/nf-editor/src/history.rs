//! Undo/redo history.
//!
//! A linear log of typed records with a cursor. Entries up to and including
//! the cursor are applied; entries after it form the redo branch, which is
//! discarded by the next push. Every record carries enough element
//! snapshots to be reverted and re-applied by id.
//!
//! Multi-step gestures (moving a multi-selection, bulk delete) use
//! `begin_batch` / `end_batch`: records pushed in between are collected and
//! land as a single entry.

use chrono::{DateTime, Utc};
use nf_core::color::Fill;
use nf_core::geometry::{Size, Vec2};
use nf_core::id::{ElementId, FrameId};
use nf_core::model::{Element, Frame, Project};
use serde::{Deserialize, Serialize};

/// Default maximum number of entries kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// A frame's own properties, without its elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameProps {
    pub name: String,
    pub size: Size,
    pub background: Fill,
    pub zoom: f64,
    pub pan: Vec2,
}

impl FrameProps {
    pub fn of(frame: &Frame) -> Self {
        Self {
            name: frame.name.clone(),
            size: frame.size,
            background: frame.background.clone(),
            zoom: frame.zoom,
            pan: frame.pan,
        }
    }

    fn restore(&self, frame: &mut Frame) {
        frame.name.clone_from(&self.name);
        frame.size = self.size;
        frame.background = self.background.clone();
        frame.zoom = self.zoom;
        frame.pan = self.pan;
    }
}

/// One reversible model change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryRecord {
    Add {
        frame: FrameId,
        index: usize,
        element: Element,
    },
    /// `related` holds the parent and children of `element` as they were
    /// before the delete detached them.
    Delete {
        frame: FrameId,
        index: usize,
        element: Element,
        related: Vec<Element>,
    },
    Update {
        frame: FrameId,
        before: Element,
        after: Element,
    },
    Reorder {
        frame: FrameId,
        id: ElementId,
        from: usize,
        to: usize,
    },
    /// Snapshots of every element whose nesting links changed.
    Reparent {
        frame: FrameId,
        before: Vec<Element>,
        after: Vec<Element>,
    },
    AddFrame {
        index: usize,
        frame: Frame,
        previous_active: Option<FrameId>,
    },
    UpdateFrame {
        frame: FrameId,
        before: FrameProps,
        after: FrameProps,
    },
    Batch(Vec<HistoryRecord>),
}

fn replace_all(frame: &mut Frame, snapshots: &[Element]) {
    for el in snapshots {
        if frame.replace(el.clone()).is_none() {
            log::debug!("history: {} no longer in frame {}", el.id, frame.id);
        }
    }
}

impl HistoryRecord {
    /// Undo this record against `project`.
    fn revert(&self, project: &mut Project) {
        match self {
            Self::Add { frame, element, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    f.remove(element.id);
                }
            }
            Self::Delete {
                frame,
                index,
                element,
                related,
            } => {
                if let Some(f) = project.frame_mut(*frame) {
                    f.insert(*index, element.clone());
                    replace_all(f, related);
                }
            }
            Self::Update { frame, before, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    replace_all(f, std::slice::from_ref(before));
                }
            }
            Self::Reorder { frame, id, from, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    f.move_element(*id, *from);
                }
            }
            Self::Reparent { frame, before, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    replace_all(f, before);
                }
            }
            Self::AddFrame {
                frame,
                previous_active,
                ..
            } => {
                project.frames.retain(|f| f.id != frame.id);
                project.active_frame = *previous_active;
                project.repair_active_frame();
            }
            Self::UpdateFrame { frame, before, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    before.restore(f);
                }
            }
            Self::Batch(records) => {
                for r in records.iter().rev() {
                    r.revert(project);
                }
            }
        }
    }

    /// Redo this record against `project`.
    fn reapply(&self, project: &mut Project) {
        match self {
            Self::Add {
                frame,
                index,
                element,
            } => {
                if let Some(f) = project.frame_mut(*frame) {
                    f.insert(*index, element.clone());
                }
            }
            Self::Delete { frame, element, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    f.remove(element.id);
                }
            }
            Self::Update { frame, after, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    replace_all(f, std::slice::from_ref(after));
                }
            }
            Self::Reorder { frame, id, to, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    f.move_element(*id, *to);
                }
            }
            Self::Reparent { frame, after, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    replace_all(f, after);
                }
            }
            Self::AddFrame { index, frame, .. } => {
                let index = (*index).min(project.frames.len());
                project.frames.insert(index, frame.clone());
                project.active_frame = Some(frame.id);
            }
            Self::UpdateFrame { frame, after, .. } => {
                if let Some(f) = project.frame_mut(*frame) {
                    after.restore(f);
                }
            }
            Self::Batch(records) => {
                for r in records {
                    r.reapply(project);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub label: String,
    pub record: HistoryRecord,
    pub timestamp: DateTime<Utc>,
}

/// Bounded undo/redo log.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Index of the last applied entry; -1 when none is applied.
    cursor: isize,
    capacity: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    pending: Vec<HistoryRecord>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            cursor: -1,
            capacity,
            batch_depth: 0,
            pending: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len() as isize
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Record an applied change. Inside a batch the record is held until
    /// the outermost `end_batch`.
    pub fn push(&mut self, label: impl Into<String>, record: HistoryRecord) {
        if self.batch_depth > 0 {
            self.pending.push(record);
            return;
        }
        self.append(label.into(), record);
    }

    fn append(&mut self, label: String, record: HistoryRecord) {
        // Clear redo branch on new action
        self.entries.truncate((self.cursor + 1) as usize);
        log::debug!("history push: {label}");
        self.entries.push(HistoryEntry {
            label,
            record,
            timestamp: Utc::now(),
        });
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() as isize - 1;
    }

    /// Start collecting records into one entry.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.pending.clear();
        }
        self.batch_depth += 1;
    }

    /// Close a batch. When the outermost batch closes and something was
    /// recorded, push a single entry labelled `label`.
    pub fn end_batch(&mut self, label: impl Into<String>) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && !self.pending.is_empty() {
            let records = std::mem::take(&mut self.pending);
            self.append(label.into(), HistoryRecord::Batch(records));
        }
    }

    /// Revert the entry at the cursor. Returns its label.
    pub fn undo(&mut self, project: &mut Project) -> Option<String> {
        if self.cursor < 0 {
            return None;
        }
        let entry = &self.entries[self.cursor as usize];
        entry.record.revert(project);
        self.cursor -= 1;
        log::debug!("undo: {}", entry.label);
        Some(entry.label.clone())
    }

    /// Re-apply the entry after the cursor. Returns its label.
    pub fn redo(&mut self, project: &mut Project) -> Option<String> {
        let next = self.cursor + 1;
        let entry = self.entries.get(next as usize)?;
        entry.record.reapply(project);
        self.cursor = next;
        log::debug!("redo: {}", entry.label);
        Some(entry.label.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
        self.batch_depth = 0;
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::model::ElementType;
    use pretty_assertions::assert_eq;

    fn project_with_frame() -> (Project, FrameId) {
        let p = Project::new("History");
        let id = p.frames[0].id;
        (p, id)
    }

    fn add(project: &mut Project, frame: FrameId, history: &mut History) -> ElementId {
        let el = Element::new(ElementId::fresh(), ElementType::Container);
        let id = el.id;
        let f = project.frame_mut(frame).unwrap();
        let index = f.elements.len();
        f.elements.push(el.clone());
        history.push(
            "Add Element",
            HistoryRecord::Add {
                frame,
                index,
                element: el,
            },
        );
        id
    }

    #[test]
    fn undo_redo_add() {
        let (mut p, frame) = project_with_frame();
        let mut h = History::default();
        let id = add(&mut p, frame, &mut h);

        assert_eq!(h.undo(&mut p).as_deref(), Some("Add Element"));
        assert!(p.frames[0].get(id).is_none());
        assert_eq!(h.cursor(), -1);
        assert_eq!(h.undo(&mut p), None);

        assert_eq!(h.redo(&mut p).as_deref(), Some("Add Element"));
        assert!(p.frames[0].get(id).is_some());
        assert_eq!(h.redo(&mut p), None);
    }

    #[test]
    fn push_truncates_redo_branch() {
        let (mut p, frame) = project_with_frame();
        let mut h = History::default();
        add(&mut p, frame, &mut h);
        add(&mut p, frame, &mut h);
        h.undo(&mut p);
        assert!(h.can_redo());

        add(&mut p, frame, &mut h);
        assert!(!h.can_redo());
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let (mut p, frame) = project_with_frame();
        let mut h = History::new(3);
        for _ in 0..5 {
            add(&mut p, frame, &mut h);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 2);
        for _ in 0..3 {
            assert!(h.undo(&mut p).is_some());
        }
        assert!(h.undo(&mut p).is_none());
        assert_eq!(p.frames[0].elements.len(), 2);
    }

    #[test]
    fn batch_lands_as_one_entry() {
        let (mut p, frame) = project_with_frame();
        let mut h = History::default();
        h.begin_batch();
        add(&mut p, frame, &mut h);
        add(&mut p, frame, &mut h);
        assert!(h.is_empty());
        h.end_batch("Add two");

        assert_eq!(h.len(), 1);
        assert_eq!(h.undo(&mut p).as_deref(), Some("Add two"));
        assert!(p.frames[0].elements.is_empty());
    }

    #[test]
    fn empty_batch_records_nothing() {
        let mut h = History::default();
        h.begin_batch();
        h.end_batch("Nothing");
        assert!(h.is_empty());
        h.end_batch("Unbalanced");
        assert!(h.is_empty());
    }

    #[test]
    fn reorder_reverts_to_original_index() {
        let (mut p, frame) = project_with_frame();
        let mut h = History::default();
        let a = add(&mut p, frame, &mut h);
        add(&mut p, frame, &mut h);

        p.frames[0].move_element(a, 1);
        h.push(
            "Reorder Element",
            HistoryRecord::Reorder {
                frame,
                id: a,
                from: 0,
                to: 1,
            },
        );
        h.undo(&mut p);
        assert_eq!(p.frames[0].index_of(a), Some(0));
        h.redo(&mut p);
        assert_eq!(p.frames[0].index_of(a), Some(1));
    }
}
