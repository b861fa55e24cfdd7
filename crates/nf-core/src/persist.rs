//! Project persistence: JSON and MessagePack snapshots.
//!
//! Both formats carry the full Project → Frame → Element tree with every
//! field. Loading runs [`validate`] before handing the project out.
//! Deserializing interns every id it reads, which reserves those ids
//! against freshly minted ones.

use crate::id::{ElementId, FrameId};
use crate::model::Project;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Duplicate frame id {0}")]
    DuplicateFrame(FrameId),

    #[error("Duplicate element id {element} in frame {frame}")]
    DuplicateElement { frame: FrameId, element: ElementId },
}

pub type Result<T> = std::result::Result<T, PersistError>;

pub fn to_json(project: &Project) -> Result<String> {
    Ok(serde_json::to_string(project)?)
}

pub fn to_json_pretty(project: &Project) -> Result<String> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn from_json(input: &str) -> Result<Project> {
    let mut project: Project = serde_json::from_str(input)?;
    validate(&mut project)?;
    Ok(project)
}

/// Compact binary snapshot. Struct fields are written by name so the
/// snapshot survives field reordering.
pub fn to_msgpack(project: &Project) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(project)?)
}

pub fn from_msgpack(bytes: &[u8]) -> Result<Project> {
    let mut project: Project = rmp_serde::from_slice(bytes)?;
    validate(&mut project)?;
    Ok(project)
}

/// Check and repair a freshly loaded project.
///
/// Duplicate frame or element ids are fatal. Everything else is repaired in
/// place: dangling or cyclic parent links are cut, child lists are rebuilt
/// to mirror parent links, and a missing active frame falls back to the
/// first frame. Returns the number of repairs made.
pub fn validate(project: &mut Project) -> Result<usize> {
    let mut repairs = 0;

    let mut frame_ids = HashSet::with_capacity(project.frames.len());
    for frame in &project.frames {
        if !frame_ids.insert(frame.id) {
            return Err(PersistError::DuplicateFrame(frame.id));
        }
        let mut seen = HashSet::with_capacity(frame.elements.len());
        for el in &frame.elements {
            if !seen.insert(el.id) {
                return Err(PersistError::DuplicateElement {
                    frame: frame.id,
                    element: el.id,
                });
            }
        }
    }

    for frame in &mut project.frames {
        let ids: HashSet<ElementId> = frame.elements.iter().map(|e| e.id).collect();

        // Cut parent links that point nowhere or at the element itself.
        for el in &mut frame.elements {
            if let Some(p) = el.parent
                && (p == el.id || !ids.contains(&p))
            {
                log::warn!("{}: dropping dangling parent {p} of {}", frame.id, el.id);
                el.parent = None;
                repairs += 1;
            }
        }

        // Cut one link per cycle until none remain.
        let ordered: Vec<ElementId> = frame.elements.iter().map(|e| e.id).collect();
        for id in ordered {
            let Some(parent) = frame.get(id).and_then(|e| e.parent) else {
                continue;
            };
            if frame.is_ancestor_of(id, parent) {
                log::warn!("{}: breaking parent cycle at {id}", frame.id);
                if let Some(el) = frame.get_mut(id) {
                    el.parent = None;
                }
                repairs += 1;
            }
        }

        // Rebuild child lists from parent links, keeping the stored order
        // for children that were already listed.
        let links: Vec<(ElementId, ElementId)> = frame
            .elements
            .iter()
            .filter_map(|e| e.parent.map(|p| (p, e.id)))
            .collect();
        for el in &mut frame.elements {
            let expected: Vec<ElementId> = links
                .iter()
                .filter(|(p, _)| *p == el.id)
                .map(|(_, c)| *c)
                .collect();
            let before = el.children.clone();
            el.children.retain(|c| expected.contains(c));
            for c in &expected {
                if !el.children.contains(c) {
                    el.children.push(*c);
                }
            }
            if el.children != before {
                repairs += 1;
            }
        }
    }

    if project.repair_active_frame() {
        log::warn!("active frame repaired to {:?}", project.active_frame);
        repairs += 1;
    }

    if repairs > 0 {
        log::info!("loaded project {} with {repairs} repair(s)", project.name);
    }
    Ok(repairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, ElementType, Frame};
    use pretty_assertions::assert_eq;

    fn project_with(elements: Vec<Element>) -> Project {
        let mut p = Project::new("Test");
        p.frames[0].elements = elements;
        p
    }

    #[test]
    fn json_roundtrip_preserves_everything() {
        let mut p = Project::new("Demo");
        let mut text = Element::new(ElementId::fresh(), ElementType::Text);
        text.style.opacity = 0.5;
        p.frames[0].elements.push(text);

        let json = to_json(&p).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn msgpack_roundtrip_preserves_everything() {
        let mut p = Project::new("Demo");
        let a = Element::new(ElementId::fresh(), ElementType::Container);
        let b = Element::new(ElementId::fresh(), ElementType::Image);
        let (a_id, b_id) = (a.id, b.id);
        p.frames[0].elements.extend([a, b]);
        p.frames[0].set_parent(b_id, Some(a_id));

        let bytes = to_msgpack(&p).unwrap();
        let back = from_msgpack(&bytes).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn duplicate_element_ids_are_rejected() {
        let id = ElementId::fresh();
        let mut p = project_with(vec![
            Element::new(id, ElementType::Container),
            Element::new(id, ElementType::Shape),
        ]);
        assert!(matches!(
            validate(&mut p),
            Err(PersistError::DuplicateElement { element, .. }) if element == id
        ));
    }

    #[test]
    fn dangling_references_are_dropped() {
        let mut orphan = Element::new(ElementId::fresh(), ElementType::Container);
        orphan.parent = Some(ElementId::fresh());
        orphan.children.push(ElementId::fresh());
        let id = orphan.id;
        let mut p = project_with(vec![orphan]);

        assert_eq!(validate(&mut p).unwrap(), 2);
        let el = p.frames[0].get(id).unwrap();
        assert_eq!(el.parent, None);
        assert!(el.children.is_empty());
    }

    #[test]
    fn parent_cycles_are_broken() {
        let mut a = Element::new(ElementId::fresh(), ElementType::Container);
        let mut b = Element::new(ElementId::fresh(), ElementType::Container);
        a.parent = Some(b.id);
        b.parent = Some(a.id);
        let mut p = project_with(vec![a, b]);

        assert!(validate(&mut p).unwrap() > 0);
        let frame = &p.frames[0];
        let linked = frame.elements.iter().filter(|e| e.parent.is_some()).count();
        assert_eq!(linked, 1);
    }

    #[test]
    fn missing_active_frame_is_repaired() {
        let mut p = Project::new("P");
        p.frames.push(Frame::new("Frame 2"));
        p.active_frame = None;
        validate(&mut p).unwrap();
        assert_eq!(p.active_frame, Some(p.frames[0].id));
    }

    #[test]
    fn fresh_ids_never_collide_with_loaded_ones() {
        let json = r#"{
            "id": "project_900000", "name": "Loaded",
            "frames": [{
                "id": "frame_900000", "name": "Frame 1",
                "size": {"width": 100.0, "height": 100.0},
                "background": {"r": 0, "g": 0, "b": 0, "a": 1.0},
                "elements": [{
                    "id": "el_900000", "name": "Box",
                    "kind": {"type": "container"},
                    "position": {"x": 0.0, "y": 0.0},
                    "size": {"width": 10.0, "height": 10.0}
                }]
            }],
            "active_frame": "frame_900000",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let p = from_json(json).unwrap();
        let loaded = p.frames[0].elements[0].id;
        for _ in 0..16 {
            assert_ne!(ElementId::fresh(), loaded);
        }
    }
}
