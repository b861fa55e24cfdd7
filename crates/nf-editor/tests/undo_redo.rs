//! Integration tests: undo/redo history (nf-editor).
//!
//! Drives the `DesignStore` mutation entrypoints and checks that every
//! recorded change can be reverted and re-applied by element id.

use nf_core::geometry::{Point, Size};
use nf_core::id::ElementId;
use nf_core::model::*;
use nf_core::patch::{ElementPatch, FramePatch};
use nf_editor::config::{EditorConfig, HistoryConfig};
use nf_editor::history::HistoryRecord;
use nf_editor::store::DesignStore;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn make_store() -> DesignStore {
    let mut store = DesignStore::default();
    store.create_project("History");
    store
}

fn add_box(store: &mut DesignStore) -> ElementId {
    store
        .add_element(ElementType::Container, &ElementPatch::default(), None)
        .unwrap()
}

fn frame_elements(store: &DesignStore) -> Vec<Element> {
    store.active_frame().unwrap().elements.clone()
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_restores_previous_state() {
    let mut store = make_store();
    let id = add_box(&mut store);
    store.update_element(id, &ElementPatch::sized(300.0, 40.0));
    assert_eq!(store.element(id).unwrap().size, Size::new(300.0, 40.0));

    let label = store.undo();
    assert_eq!(label.as_deref(), Some("Update Element"));
    assert_eq!(
        store.element(id).unwrap().size,
        Size::new(200.0, 100.0),
        "size not restored after undo"
    );
}

#[test]
fn redo_reapplies_undone_action() {
    let mut store = make_store();
    let id = add_box(&mut store);
    store.update_element(id, &ElementPatch::at(7.0, 9.0));

    store.undo();
    let label = store.redo();
    assert_eq!(label.as_deref(), Some("Update Element"));
    assert_eq!(store.element(id).unwrap().position, Point::new(7.0, 9.0));
}

#[test]
fn undo_on_empty_history_is_noop() {
    let mut store = make_store();
    assert_eq!(store.undo(), None);
    assert_eq!(store.redo(), None);
    assert_eq!(store.history().cursor(), -1);
}

#[test]
fn new_mutation_discards_redo_branch() {
    let mut store = make_store();
    let id = add_box(&mut store);
    store.update_element(id, &ElementPatch::named("first"));
    store.undo();
    assert!(store.can_redo());

    store.update_element(id, &ElementPatch::named("second"));
    assert!(!store.can_redo());
    assert_eq!(store.history().len(), 2);
    assert_eq!(store.element(id).unwrap().name, "second");
}

#[test]
fn undo_add_removes_and_deselects() {
    let mut store = make_store();
    let id = add_box(&mut store);
    assert_eq!(store.selection().ids(), &[id]);

    store.undo();
    assert!(store.element(id).is_none());
    assert!(store.selection().is_empty());

    store.redo();
    assert!(store.element(id).is_some());
}

#[test]
fn undo_delete_restores_at_original_index() {
    let mut store = make_store();
    let a = add_box(&mut store);
    let b = add_box(&mut store);
    let c = add_box(&mut store);

    store.delete_element(b);
    store.undo();
    let order: Vec<ElementId> = frame_elements(&store).iter().map(|e| e.id).collect();
    assert_eq!(order, vec![a, b, c]);
}

#[test]
fn bulk_delete_is_one_entry() {
    let mut store = make_store();
    let a = add_box(&mut store);
    let b = add_box(&mut store);
    store.select_many([a, b]);

    assert_eq!(store.delete_selected(), 2);
    assert!(frame_elements(&store).is_empty());
    assert_eq!(store.history().len(), 3);
    assert!(matches!(
        store.history().entries()[2].record,
        HistoryRecord::Batch(ref records) if records.len() == 2
    ));

    assert_eq!(store.undo().as_deref(), Some("Delete Elements"));
    assert_eq!(frame_elements(&store).len(), 2);
}

#[test]
fn frame_add_and_update_are_undoable() {
    let mut store = make_store();
    let first = store.project().unwrap().frames[0].id;

    let second = store.add_frame(&FramePatch::default()).unwrap();
    store.update_frame(
        second,
        &FramePatch {
            name: Some("Landing".into()),
            ..FramePatch::default()
        },
    );
    assert_eq!(store.active_frame().unwrap().name, "Landing");

    store.undo();
    assert_eq!(store.active_frame().unwrap().name, "Frame 2");
    store.undo();
    assert_eq!(store.project().unwrap().frames.len(), 1);
    assert_eq!(store.project().unwrap().active_frame, Some(first));
}

// ─── Capacity ───────────────────────────────────────────────────────────

#[test]
fn history_keeps_the_last_fifty() {
    let mut store = make_store();
    let id = add_box(&mut store);
    // Mutation 1 is the add; mutations 2..=60 rename.
    for n in 2..=60 {
        store.update_element(id, &ElementPatch::named(format!("step {n}")));
    }

    let entries = store.history().entries();
    assert_eq!(entries.len(), 50);
    match &entries[0].record {
        HistoryRecord::Update { after, .. } => assert_eq!(after.name, "step 11"),
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(store.history().cursor(), 49);
}

#[test]
fn capacity_comes_from_config() {
    let config = EditorConfig {
        history: HistoryConfig { capacity: 3 },
        ..EditorConfig::default()
    };
    let mut store = DesignStore::new(&config);
    store.create_project("Small");
    for _ in 0..5 {
        add_box(&mut store);
    }
    assert_eq!(store.history().len(), 3);

    while store.undo().is_some() {}
    assert_eq!(frame_elements(&store).len(), 2);
}

// ─── Symmetry ───────────────────────────────────────────────────────────

fn arb_patch() -> impl Strategy<Value = ElementPatch> {
    (
        -500.0f64..500.0,
        -500.0f64..500.0,
        0.0f64..800.0,
        0.0f64..800.0,
        -1.0f32..2.0,
        -360.0f64..360.0,
    )
        .prop_map(|(x, y, w, h, opacity, rotation)| {
            ElementPatch::at(x, y)
                .with_size(Size::new(w, h))
                .with_opacity(opacity)
                .with_rotation(rotation)
        })
}

proptest! {
    #[test]
    fn undo_then_redo_equals_direct_apply(patch in arb_patch()) {
        let mut store = make_store();
        let id = add_box(&mut store);
        add_box(&mut store);

        store.update_element(id, &patch);
        let direct = frame_elements(&store);

        store.undo();
        store.redo();
        prop_assert_eq!(frame_elements(&store), direct);
    }

    #[test]
    fn opacity_is_always_clamped(opacity in -10.0f32..10.0) {
        let mut store = make_store();
        let id = add_box(&mut store);
        store.update_element(id, &ElementPatch::default().with_opacity(opacity));
        let o = store.element(id).unwrap().style.opacity;
        prop_assert!((0.0..=1.0).contains(&o));
    }
}
