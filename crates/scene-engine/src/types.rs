use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use orrery_types::{Camera, Light, Window};
use scene_kernel::geometry::Vec3;
use scene_kernel::spline::CatmullRom;
use scene_kernel::Mesh;

new_key_type! {
    /// Stable arena key for a scene graph group.
    pub struct GroupId;
}

/// One transform operation in a group's ordered list.
///
/// Operations are applied in insertion order; the order changes the composed
/// matrix and is preserved from the source scene description. A closed
/// tagged union rather than string dispatch, so an unrecognized kind is a
/// deserialization error instead of a silent no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransformStep {
    Translate {
        x: f32,
        y: f32,
        z: f32,
    },
    /// Translate to the current point of a closed Catmull-Rom path, looping
    /// every `period` seconds (held at the curve start when `period <= 0`).
    /// With `align`, the local frame is reoriented so its forward axis
    /// tracks the curve tangent. `visible` requests a trajectory polyline.
    TranslateAlongCurve {
        curve: CatmullRom,
        period: f32,
        align: bool,
        visible: bool,
    },
    /// Fixed rotation; a zero angle is a no-op.
    Rotate {
        angle_degrees: f32,
        axis: Vec3,
    },
    /// Full revolution every `period` seconds (held at zero when
    /// `period <= 0`, like the curve hold).
    RotateOverTime {
        period: f32,
        axis: Vec3,
    },
    Scale {
        x: f32,
        y: f32,
        z: f32,
    },
}

/// A scene graph node: an ordered transform list, owned meshes, and child
/// group ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupNode {
    pub transforms: Vec<TransformStep>,
    pub meshes: Vec<Mesh>,
    pub children: Vec<GroupId>,
}

/// A tree of groups stored in an arena of stable keys.
///
/// Ownership is strictly tree-shaped: each node is reachable from exactly
/// one parent's child list, and nothing holds a parent back-pointer.
/// Groups are created and populated during scene construction and read-only
/// afterwards; traversal takes `&self`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<GroupId, GroupNode>,
    pub(crate) root: GroupId,
}

/// The aggregate root materialized from the scene description by the
/// external configuration loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub window: Window,
    pub camera: Camera,
    pub lights: Vec<Light>,
    pub graph: SceneGraph,
}

impl World {
    pub fn new(graph: SceneGraph) -> Self {
        Self {
            window: Window::default(),
            camera: Camera::default(),
            lights: Vec::new(),
            graph,
        }
    }
}
