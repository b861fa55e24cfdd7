//! Session scripts.
//!
//! A script is a JSON array of [`Step`]s replayed in order against a
//! [`CanvasController`]. Steps name elements through [`ElementRef`] so a
//! script can address elements it created itself without knowing their
//! generated ids.

use nf_core::geometry::{Point, Vec2};
use nf_core::id::{ElementId, FrameId};
use nf_core::model::ElementType;
use nf_core::patch::{ElementPatch, FramePatch};
use nf_editor::ai::TextGenerator;
use nf_editor::controller::CanvasController;
use nf_editor::input::InputEvent;
use nf_editor::interaction::DragOperation;
use nf_editor::shortcuts::ShortcutAction;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid element reference {0:?}")]
    BadRef(String),

    #[error("Step {step}: no element matches {reference}")]
    UnresolvedRef { step: usize, reference: String },
}

/// How a step names an element.
///
/// - `"@last"`: the element most recently added or duplicated by the script
/// - `"#N"`: the element at paint-order index `N` of the active frame
/// - anything else: a literal element id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ElementRef {
    Last,
    Index(usize),
    Id(ElementId),
}

impl TryFrom<String> for ElementRef {
    type Error = ScriptError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "@last" {
            return Ok(Self::Last);
        }
        if let Some(n) = s.strip_prefix('#') {
            return n
                .parse()
                .map(Self::Index)
                .map_err(|_| ScriptError::BadRef(s.clone()));
        }
        if s.is_empty() || s.starts_with('@') {
            return Err(ScriptError::BadRef(s));
        }
        Ok(Self::Id(ElementId::intern(&s)))
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Last => f.write_str("@last"),
            Self::Index(n) => write!(f, "#{n}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// One scripted editing action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        #[serde(rename = "type")]
        ty: ElementType,
        #[serde(default)]
        patch: ElementPatch,
        #[serde(default)]
        frame: Option<FrameId>,
    },
    Update {
        target: ElementRef,
        patch: ElementPatch,
    },
    Delete {
        target: ElementRef,
    },
    DeleteSelected,
    Duplicate {
        target: ElementRef,
    },
    Select {
        targets: Vec<ElementRef>,
        #[serde(default)]
        additive: bool,
    },
    SelectAll,
    ClearSelection,
    /// A complete drag gesture in canvas coordinates.
    Drag {
        #[serde(default)]
        target: Option<ElementRef>,
        operation: DragOperation,
        from: Point,
        to: Point,
        #[serde(default)]
        shift: bool,
    },
    Reorder {
        target: ElementRef,
        index: usize,
    },
    SetParent {
        child: ElementRef,
        #[serde(default)]
        parent: Option<ElementRef>,
    },
    AddFrame {
        #[serde(default)]
        patch: FramePatch,
    },
    Pan {
        delta: Vec2,
    },
    Zoom {
        level: f64,
    },
    /// Scroll wheel; `zoom` stands for the held zoom modifier.
    Wheel {
        delta: Vec2,
        #[serde(default)]
        zoom: bool,
    },
    ZoomToFit,
    Undo,
    Redo,
    AiEdit {
        target: ElementRef,
        prompt: String,
    },
    /// Raw input routed through the controller, shortcuts included.
    Input {
        event: InputEvent,
    },
}

/// Parse a script from its JSON text.
pub fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(text)?)
}

/// Tally of a replayed session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub steps: usize,
    /// Steps that changed nothing (unknown targets, empty gestures, ...).
    pub no_ops: usize,
    pub ai_edits: usize,
    pub ai_failures: usize,
}

struct Replay<'a, G> {
    canvas: &'a mut CanvasController,
    generator: &'a G,
    last: Option<ElementId>,
    report: SessionReport,
}

/// Replay `steps` against `canvas`, asking `generator` for AI edits.
///
/// A failed AI edit is logged and counted but does not stop the session.
///
/// # Errors
///
/// Returns [`ScriptError::UnresolvedRef`] when a step names an element
/// that does not exist at that point of the session.
pub async fn run_script<G: TextGenerator>(
    canvas: &mut CanvasController,
    steps: &[Step],
    generator: &G,
) -> Result<SessionReport, ScriptError> {
    let mut replay = Replay {
        canvas,
        generator,
        last: None,
        report: SessionReport::default(),
    };
    for (n, step) in steps.iter().enumerate() {
        log::debug!("step {n}: {step:?}");
        let changed = replay.step(n, step).await?;
        replay.report.steps += 1;
        if !changed {
            log::debug!("step {n} changed nothing");
            replay.report.no_ops += 1;
        }
    }
    Ok(replay.report)
}

impl<G: TextGenerator> Replay<'_, G> {
    fn resolve(&self, step: usize, r: &ElementRef) -> Result<ElementId, ScriptError> {
        let store = self.canvas.store();
        let found = match r {
            ElementRef::Last => self.last.filter(|id| store.element(*id).is_some()),
            ElementRef::Index(i) => store
                .active_frame()
                .and_then(|f| f.elements.get(*i))
                .map(|el| el.id),
            ElementRef::Id(id) => store.element(*id).map(|el| el.id),
        };
        found.ok_or_else(|| ScriptError::UnresolvedRef {
            step,
            reference: r.to_string(),
        })
    }

    async fn step(&mut self, n: usize, step: &Step) -> Result<bool, ScriptError> {
        let changed = match step {
            Step::Add { ty, patch, frame } => {
                let id = self.canvas.store_mut().add_element(*ty, patch, *frame);
                if id.is_some() {
                    self.last = id;
                }
                id.is_some()
            }
            Step::Update { target, patch } => {
                let id = self.resolve(n, target)?;
                self.canvas.store_mut().update_element(id, patch)
            }
            Step::Delete { target } => {
                let id = self.resolve(n, target)?;
                self.canvas.store_mut().delete_element(id)
            }
            Step::DeleteSelected => self.canvas.store_mut().delete_selected() > 0,
            Step::Duplicate { target } => {
                let id = self.resolve(n, target)?;
                let copy = self.canvas.store_mut().duplicate_element(id);
                if copy.is_some() {
                    self.last = copy;
                }
                copy.is_some()
            }
            Step::Select { targets, additive } => {
                let ids = targets
                    .iter()
                    .map(|t| self.resolve(n, t))
                    .collect::<Result<Vec<_>, _>>()?;
                let store = self.canvas.store_mut();
                if *additive {
                    ids.into_iter().fold(false, |acc, id| store.select(id, true) || acc)
                } else {
                    store.select_many(ids);
                    true
                }
            }
            Step::SelectAll => {
                self.canvas.store_mut().select_all();
                true
            }
            Step::ClearSelection => {
                self.canvas.store_mut().clear_selection();
                true
            }
            Step::Drag {
                target,
                operation,
                from,
                to,
                shift,
            } => {
                let target = target.as_ref().map(|t| self.resolve(n, t)).transpose()?;
                let store = self.canvas.store_mut();
                if !store.start_drag(target, *from, *operation) {
                    return Ok(false);
                }
                store.constrain_drag(*shift);
                store.update_drag(*to);
                store.end_drag()
            }
            Step::Reorder { target, index } => {
                let id = self.resolve(n, target)?;
                self.canvas.store_mut().move_element(id, *index)
            }
            Step::SetParent { child, parent } => {
                let child = self.resolve(n, child)?;
                let parent = parent.as_ref().map(|p| self.resolve(n, p)).transpose()?;
                self.canvas.store_mut().set_parent(child, parent)
            }
            Step::AddFrame { patch } => self.canvas.store_mut().add_frame(patch).is_some(),
            Step::Pan { delta } => {
                self.canvas.store_mut().viewport_mut().pan_by(*delta);
                true
            }
            Step::Zoom { level } => {
                self.canvas.store_mut().viewport_mut().set_zoom(*level);
                true
            }
            Step::Wheel { delta, zoom } => {
                self.canvas.store_mut().viewport_mut().wheel(*delta, *zoom);
                true
            }
            Step::ZoomToFit => self.canvas.dispatch_action(ShortcutAction::ZoomToFit).0,
            Step::Undo => self.canvas.store_mut().undo().is_some(),
            Step::Redo => self.canvas.store_mut().redo().is_some(),
            Step::AiEdit { target, prompt } => {
                let id = self.resolve(n, target)?;
                self.ai_edit(n, id, prompt).await
            }
            Step::Input { event } => self.canvas.handle(event).changed,
        };
        Ok(changed)
    }

    async fn ai_edit(&mut self, n: usize, id: ElementId, prompt: &str) -> bool {
        let result = self
            .canvas
            .store_mut()
            .process_ai_edit(self.generator, id, prompt)
            .await;
        match result {
            Ok(response) => {
                log::info!("step {n}: AI edit on {id}: {}", response.explanation);
                self.report.ai_edits += 1;
                !response.changes.is_empty()
            }
            Err(err) => {
                log::warn!("step {n}: AI edit on {id} failed: {err}");
                self.report.ai_failures += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn refs_parse() {
        let r: ElementRef = serde_json::from_str(r#""@last""#).unwrap();
        assert_eq!(r, ElementRef::Last);
        let r: ElementRef = serde_json::from_str(r##""#2""##).unwrap();
        assert_eq!(r, ElementRef::Index(2));
        let r: ElementRef = serde_json::from_str(r#""el_hero""#).unwrap();
        assert_eq!(r, ElementRef::Id(ElementId::intern("el_hero")));
    }

    #[test]
    fn bad_refs_are_rejected() {
        assert!(serde_json::from_str::<ElementRef>(r##""#x""##).is_err());
        assert!(serde_json::from_str::<ElementRef>(r#""@first""#).is_err());
        assert!(serde_json::from_str::<ElementRef>(r#""""#).is_err());
    }

    #[test]
    fn steps_parse_from_tagged_json() {
        let steps = parse_script(
            r#"[
                {"op": "add", "type": "text", "patch": {"content": "Hi"}},
                {"op": "drag", "target": "@last", "operation": {"resize": "se"},
                 "from": {"x": 0, "y": 0}, "to": {"x": 10, "y": 10}},
                {"op": "undo"},
                {"op": "input", "event": {"event": "key_down", "key": "z",
                                          "modifiers": {"ctrl": true}}}
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 4);
        assert!(matches!(steps[0], Step::Add { ty: ElementType::Text, .. }));
        assert!(matches!(
            steps[1],
            Step::Drag {
                operation: DragOperation::Resize(nf_editor::interaction::ResizeHandle::SE),
                shift: false,
                ..
            }
        ));
        assert_eq!(steps[2], Step::Undo);
    }

    #[test]
    fn unknown_op_is_a_json_error() {
        let err = parse_script(r#"[{"op": "explode"}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Json(_)));
    }
}
