//! AI-edit adapter.
//!
//! An edit request carries the target element, its siblings and a frame
//! summary to an external text-generation collaborator ([`TextGenerator`]).
//! The collaborator answers with an [`ElementPatch`] that the store applies
//! through the same entrypoint as manual edits. The store side of the flow
//! (`begin_ai_edit` / `complete_ai_edit` / `process_ai_edit`) lives in
//! [`crate::store`].

use nf_core::color::Color;
use nf_core::geometry::Size;
use nf_core::id::{ElementId, FrameId};
use nf_core::model::{Element, Frame, Shadow};
use nf_core::patch::{BorderPatch, ElementPatch, SizePatch, StylePatch};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Failure reported by a text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiEditError {
    #[error("an AI edit is already in progress")]
    Busy,

    #[error("no project is open")]
    NoProject,

    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("AI edit ticket {0} is not the one in flight")]
    StaleTicket(u64),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("AI declined the edit: {0}")]
    Rejected(String),
}

// ─── Request / response ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub id: FrameId,
    pub name: String,
    pub size: Size,
    pub element_count: usize,
}

impl FrameSummary {
    pub fn of(frame: &Frame) -> Self {
        Self {
            id: frame.id,
            name: frame.name.clone(),
            size: frame.size,
            element_count: frame.elements.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiEditContext {
    pub element: Element,
    pub sibling_elements: Vec<Element>,
    pub frame: FrameSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiEditRequest {
    pub element_id: ElementId,
    pub prompt: String,
    pub context: AiEditContext,
}

impl AiEditRequest {
    /// Build a request for `element_id` in `frame`. Siblings are the other
    /// elements of the frame, in paint order.
    pub fn build(frame: &Frame, element_id: ElementId, prompt: &str) -> Option<Self> {
        let element = frame.get(element_id)?.clone();
        let sibling_elements = frame
            .elements
            .iter()
            .filter(|e| e.id != element_id)
            .cloned()
            .collect();
        Some(Self {
            element_id,
            prompt: prompt.to_string(),
            context: AiEditContext {
                element,
                sibling_elements,
                frame: FrameSummary::of(frame),
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiEditResponse {
    pub success: bool,
    pub changes: ElementPatch,
    pub explanation: String,
    pub suggestions: Vec<String>,
}

/// Pull the first balanced JSON object out of free-form model output and
/// decode it as a response.
pub fn parse_response(text: &str) -> Result<AiEditResponse, CollaboratorError> {
    let json = first_json_object(text)
        .ok_or_else(|| CollaboratorError::Malformed("no JSON object in response".into()))?;
    serde_json::from_str(json).map_err(|e| CollaboratorError::Malformed(e.to_string()))
}

fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

// ─── Collaborators ───────────────────────────────────────────────────────

/// External text-generation service that turns an edit request into a patch.
pub trait TextGenerator {
    fn generate(
        &self,
        request: &AiEditRequest,
    ) -> impl Future<Output = Result<AiEditResponse, CollaboratorError>> + Send;
}

/// Offline generator that maps prompt keywords to patches.
///
/// | Keyword             | Change                         |
/// |---------------------|--------------------------------|
/// | cyan, blue          | cyan background                |
/// | pink, magenta       | magenta background             |
/// | bigger, larger      | size × 1.2                     |
/// | smaller             | size × 0.8                     |
/// | round               | corner radius 16               |
/// | glow, shadow        | cyan glow shadow               |
/// | fade, transparent   | half the current opacity       |
/// | hide                | hidden                         |
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordGenerator;

impl KeywordGenerator {
    pub fn respond(&self, request: &AiEditRequest) -> AiEditResponse {
        let prompt = request.prompt.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| prompt.contains(w));
        let element = &request.context.element;
        let mut style = StylePatch::default();
        let mut changes = ElementPatch::default();

        if has(&["cyan", "blue"]) {
            style.background = Some(Color::rgb(0, 255, 255).into());
        } else if has(&["pink", "magenta"]) {
            style.background = Some(Color::rgb(255, 0, 255).into());
        }

        if has(&["bigger", "larger"]) {
            changes.size = Some(SizePatch::from(scaled(element.size, 1.2)));
        } else if has(&["smaller"]) {
            changes.size = Some(SizePatch::from(scaled(element.size, 0.8)));
        }

        if has(&["round"]) {
            style.border = Some(BorderPatch {
                radius: Some(16.0),
                ..BorderPatch::default()
            });
        }

        if has(&["glow", "shadow"]) {
            style.shadows = Some(vec![Shadow {
                x: 0.0,
                y: 0.0,
                blur: 20.0,
                spread: 0.0,
                color: Color::rgba(0, 255, 255, 0.6),
                inset: false,
            }]);
        }

        if has(&["fade", "transparent"]) {
            style.opacity = Some(element.style.opacity * 0.5);
        }

        if has(&["hide"]) {
            changes.visible = Some(false);
        }

        if style != StylePatch::default() {
            changes.style = Some(style);
        }

        let explanation = if changes.is_empty() {
            format!("No recognizable edit in prompt: \"{}\"", request.prompt)
        } else {
            format!("Applied changes based on prompt: \"{}\"", request.prompt)
        };
        AiEditResponse {
            success: true,
            changes,
            explanation,
            suggestions: vec![
                "Try \"make it glow\"".into(),
                "Try \"add shadow\"".into(),
                "Try \"make it round\"".into(),
            ],
        }
    }
}

fn scaled(size: Size, factor: f64) -> Size {
    Size::new(size.width * factor, size.height * factor)
}

impl TextGenerator for KeywordGenerator {
    async fn generate(&self, request: &AiEditRequest) -> Result<AiEditResponse, CollaboratorError> {
        Ok(self.respond(request))
    }
}
