pub mod color;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod model;
pub mod patch;
pub mod persist;

pub use color::{Color, Fill, Gradient, GradientKind, GradientStop};
pub use geometry::{Point, Rect, Size, Vec2};
pub use hit::{hit_test, hit_test_rect, hit_test_top};
pub use id::{ElementId, FrameId, ProjectId};
pub use model::*;
pub use patch::{ElementPatch, FramePatch};
pub use persist::PersistError;
