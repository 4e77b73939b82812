pub mod graph;
pub mod traverse;
pub mod types;

pub use graph::SceneError;
pub use traverse::{DrawItem, FrameContext, FrameSnapshot, Polyline, TraverseError};
pub use types::{GroupId, GroupNode, SceneGraph, TransformStep, World};
