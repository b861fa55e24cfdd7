//! Selection and hover tracking.
//!
//! Holds ids only. The store keeps it consistent with the active frame by
//! calling [`Selection::purge`] / [`Selection::retain`] on every removal.

use nf_core::id::ElementId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    selected: Vec<ElementId>,
    hovered: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn first(&self) -> Option<ElementId> {
        self.selected.first().copied()
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Replace the selection with `id`, or toggle `id` when `additive`.
    pub fn select(&mut self, id: ElementId, additive: bool) {
        if !additive {
            self.selected.clear();
            self.selected.push(id);
            return;
        }
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
    }

    /// Replace the selection wholesale. Duplicates are dropped.
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selected.clear();
        self.extend(ids);
    }

    /// Add ids that are not already selected.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        for id in ids {
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn set_hovered(&mut self, id: Option<ElementId>) {
        self.hovered = id;
    }

    /// Forget `id` everywhere.
    pub fn purge(&mut self, id: ElementId) {
        self.selected.retain(|s| *s != id);
        if self.hovered == Some(id) {
            self.hovered = None;
        }
    }

    /// Keep only ids for which `keep` holds, in selection and hover alike.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementId) -> bool) {
        self.selected.retain(|id| keep(*id));
        if let Some(h) = self.hovered
            && !keep(h)
        {
            self.hovered = None;
        }
    }

    /// Drop selection and hover.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.hovered = None;
    }
}
