pub mod ai;
pub mod config;
pub mod controller;
pub mod history;
pub mod input;
pub mod interaction;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod tools;
pub mod viewport;

pub use ai::{AiEditError, AiEditRequest, AiEditResponse, KeywordGenerator, TextGenerator};
pub use config::EditorConfig;
pub use controller::{CanvasController, EventOutcome};
pub use history::{History, HistoryEntry, HistoryRecord};
pub use input::{InputEvent, Modifiers};
pub use interaction::{DragOperation, DragPreview, Interaction, ResizeHandle};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{AiTicket, DesignStore};
pub use tools::ToolKind;
pub use viewport::ViewportState;
