//! Integration tests: end-to-end editing sessions (nf-editor).
//!
//! Short sessions driven through the store and the canvas controller, then
//! checked against the resulting project and its saved form.

use nf_core::color::{Color, Fill};
use nf_core::geometry::{Point, Size};
use nf_core::model::*;
use nf_core::patch::ElementPatch;
use nf_core::persist;
use nf_editor::config::EditorConfig;
use nf_editor::controller::CanvasController;
use nf_editor::input::{InputEvent, Modifiers};
use nf_editor::store::DesignStore;
use nf_editor::tools::ToolKind;
use pretty_assertions::assert_eq;

// ─── Project lifecycle ──────────────────────────────────────────────────

#[test]
fn demo_project_and_first_text() {
    let mut store = DesignStore::default();
    store.create_project("Demo");

    let frame = store.active_frame().unwrap();
    assert_eq!(frame.name, "Frame 1");
    assert!(frame.elements.is_empty());
    assert_eq!(frame.size, Size::new(1920.0, 1080.0));
    assert_eq!(frame.background, Fill::Solid(Color::rgba(15, 15, 25, 1.0)));

    let id = store
        .add_element(
            ElementType::Text,
            &ElementPatch {
                content: Some("Hi".into()),
                ..ElementPatch::default()
            },
            None,
        )
        .unwrap();

    let frame = store.active_frame().unwrap();
    assert_eq!(frame.elements.len(), 1);
    assert_eq!(store.selection().ids(), &[id]);
    let el = &frame.elements[0];
    assert_eq!(el.position, Point::new(100.0, 100.0));
    assert_eq!(el.size, Size::new(200.0, 100.0));
    assert_eq!(el.kind.content(), Some("Hi"));
    assert_eq!(el.kind.typography(), Some(&Typography::default()));
}

#[test]
fn delete_first_of_two_keeps_second() {
    let mut store = DesignStore::default();
    store.create_project("Two");
    let first = store
        .add_element(ElementType::Container, &ElementPatch::default(), None)
        .unwrap();
    let second = store
        .add_element(ElementType::Button, &ElementPatch::default(), None)
        .unwrap();

    assert!(store.delete_element(first));
    let frame = store.active_frame().unwrap();
    assert_eq!(frame.elements.len(), 1);
    assert_eq!(frame.elements[0].id, second);
    assert_eq!(frame.index_of(second), Some(0));
}

#[test]
fn loading_a_project_resets_session_state() {
    let mut store = DesignStore::default();
    store.create_project("Old");
    store.add_element(ElementType::Container, &ElementPatch::default(), None);
    assert!(store.can_undo());

    let mut project = Project::new("New");
    project.active_frame = None;
    store.load_project(project);

    assert!(!store.can_undo());
    assert!(store.selection().is_empty());
    assert_eq!(store.active_frame().unwrap().name, "Frame 1");
}

// ─── Controller sessions ────────────────────────────────────────────────

#[test]
fn draw_move_undo_session_survives_save() {
    let mut canvas = CanvasController::new(&EditorConfig::default(), Size::new(1280.0, 800.0));
    canvas.store_mut().create_project("Session");

    let none = Modifiers::NONE;
    let cmd = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    // Draw a rectangle, then a circle beside it.
    canvas.handle(&InputEvent::key("r", none));
    assert_eq!(canvas.tool(), ToolKind::Rectangle);
    canvas.handle(&InputEvent::pointer_down(100.0, 100.0, none));
    canvas.handle(&InputEvent::pointer_up(100.0, 100.0, none));
    canvas.handle(&InputEvent::key("o", none));
    canvas.handle(&InputEvent::pointer_down(400.0, 100.0, none));
    canvas.handle(&InputEvent::pointer_up(400.0, 100.0, none));

    let circle = canvas.store().selection().first().unwrap();
    assert_eq!(
        canvas.store().element(circle).unwrap().kind,
        ElementKind::Shape {
            shape: ShapeKind::Ellipse
        }
    );

    // Drag the circle down by 50.
    canvas.handle(&InputEvent::pointer_down(450.0, 150.0, none));
    canvas.handle(&InputEvent::pointer_move(450.0, 180.0, none, 100));
    canvas.handle(&InputEvent::pointer_up(450.0, 200.0, none));
    assert_eq!(
        canvas.store().element(circle).unwrap().position,
        Point::new(400.0, 150.0)
    );

    // Undo the move, then bring the rectangle to front.
    canvas.handle(&InputEvent::key("z", cmd));
    assert_eq!(
        canvas.store().element(circle).unwrap().position,
        Point::new(400.0, 100.0)
    );
    canvas.handle(&InputEvent::pointer_down(150.0, 150.0, none));
    canvas.handle(&InputEvent::pointer_up(150.0, 150.0, none));
    canvas.handle(&InputEvent::key("]", Modifiers { shift: true, ..cmd }));

    let project = canvas.store().project().unwrap().clone();
    let frame = project.active_frame().unwrap();
    assert_eq!(frame.elements[0].id, circle);
    assert_eq!(frame.elements[1].name, "Rectangle");

    let json = persist::to_json(&project).unwrap();
    let reloaded = persist::from_json(&json).unwrap();
    assert_eq!(reloaded, project);
}

#[test]
fn select_all_then_delete_clears_frame() {
    let mut canvas = CanvasController::new(&EditorConfig::default(), Size::new(800.0, 600.0));
    canvas.store_mut().create_project("Wipe");
    for tool in ["r", "t", "i"] {
        canvas.handle(&InputEvent::key(tool, Modifiers::NONE));
        canvas.handle(&InputEvent::pointer_down(10.0, 10.0, Modifiers::NONE));
    }
    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    canvas.handle(&InputEvent::key("a", cmd));
    assert_eq!(canvas.store().selection().len(), 3);

    let out = canvas.handle(&InputEvent::key("Backspace", Modifiers::NONE));
    assert!(out.changed);
    assert!(canvas.store().active_frame().unwrap().elements.is_empty());

    canvas.handle(&InputEvent::key("z", cmd));
    assert_eq!(canvas.store().active_frame().unwrap().elements.len(), 3);
}
