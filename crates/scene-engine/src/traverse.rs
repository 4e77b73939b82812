//! Per-tick traversal: composes transforms down the tree and emits draw
//! items to the rendering boundary.

use serde::{Deserialize, Serialize};

use scene_kernel::geometry::{Mat4, Point3, Vec3};
use scene_kernel::spline::SplineError;
use scene_kernel::Mesh;

use crate::types::{GroupId, SceneGraph, TransformStep};

/// Samples used when emitting a curve trajectory polyline.
const TRAJECTORY_SAMPLES: usize = 100;

/// Per-frame state threaded through the traversal instead of process-wide
/// globals. The elapsed time comes from the external animation clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameContext {
    /// Monotonic seconds since startup.
    pub elapsed_seconds: f32,
}

impl FrameContext {
    pub fn at(elapsed_seconds: f32) -> Self {
        Self { elapsed_seconds }
    }
}

/// One mesh to draw with its composed world transform.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub mesh: &'a Mesh,
    pub world: Mat4,
}

/// A world-space line loop visualizing a curve trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point3>,
}

/// Everything one traversal hands to the rendering boundary, in traversal
/// (declaration) order.
#[derive(Debug, Default)]
pub struct FrameSnapshot<'a> {
    pub items: Vec<DrawItem<'a>>,
    pub trajectories: Vec<Polyline>,
}

/// Errors surfaced at traversal time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraverseError {
    #[error(transparent)]
    Spline(#[from] SplineError),

    #[error("group {0:?} referenced by the tree does not exist")]
    MissingGroup(GroupId),
}

impl SceneGraph {
    /// Walk the tree depth-first, composing each group's transforms onto its
    /// parent's world matrix, and collect (mesh, world) pairs plus trajectory
    /// polylines. Sibling order is declaration order; the parent matrix is
    /// passed by value, so transform state is scoped to each subtree.
    pub fn traverse(&self, frame: &FrameContext) -> Result<FrameSnapshot<'_>, TraverseError> {
        let mut snapshot = FrameSnapshot::default();
        self.visit(self.root, Mat4::identity(), frame, &mut snapshot)?;
        Ok(snapshot)
    }

    fn visit<'a>(
        &'a self,
        id: GroupId,
        parent_world: Mat4,
        frame: &FrameContext,
        out: &mut FrameSnapshot<'a>,
    ) -> Result<(), TraverseError> {
        let node = self.nodes.get(id).ok_or(TraverseError::MissingGroup(id))?;

        // Trajectory polylines visualize the path of this group's origin, so
        // they live in the parent frame, before this group's own transforms.
        for step in &node.transforms {
            if let TransformStep::TranslateAlongCurve {
                curve,
                visible: true,
                ..
            } = step
            {
                let points = curve
                    .sample_polyline(TRAJECTORY_SAMPLES)?
                    .iter()
                    .map(|p| parent_world.transform_point(p))
                    .collect();
                out.trajectories.push(Polyline { points });
            }
        }

        let mut local = Mat4::identity();
        for step in &node.transforms {
            match step {
                TransformStep::Translate { x, y, z } => {
                    local = local.then(&Mat4::translation(*x, *y, *z));
                }
                TransformStep::TranslateAlongCurve {
                    curve,
                    period,
                    align,
                    ..
                } => {
                    let t = if *period > 0.0 {
                        (frame.elapsed_seconds % period) / period
                    } else {
                        0.0
                    };
                    let (pos, tangent) = curve.evaluate(t)?;
                    local = local.then(&Mat4::translation(pos.x, pos.y, pos.z));
                    if *align {
                        if let Some(rotation) = align_to_tangent(tangent) {
                            local = local.then(&rotation);
                        }
                    }
                }
                TransformStep::Rotate {
                    angle_degrees,
                    axis,
                } => {
                    if *angle_degrees != 0.0 {
                        local = local
                            .then(&Mat4::rotation_axis_angle(*axis, angle_degrees.to_radians()));
                    }
                }
                TransformStep::RotateOverTime { period, axis } => {
                    let angle = if *period > 0.0 {
                        (frame.elapsed_seconds % period) / period * 360.0
                    } else {
                        0.0
                    };
                    local = local.then(&Mat4::rotation_axis_angle(*axis, angle.to_radians()));
                }
                TransformStep::Scale { x, y, z } => {
                    local = local.then(&Mat4::scaling(*x, *y, *z));
                }
            }
        }

        let world = parent_world.then(&local);

        for mesh in &node.meshes {
            out.items.push(DrawItem { mesh, world });
        }

        for &child in &node.children {
            self.visit(child, world, frame, out)?;
        }
        Ok(())
    }
}

/// Rotation carrying the local X axis onto the curve tangent, built from the
/// tangent, a provisional (0,1,0) up, and their re-orthonormalized cross
/// products. `None` when the tangent is degenerate or parallel to the
/// provisional up, in which case the frame is undefined and the translation
/// stands alone.
fn align_to_tangent(tangent: Vec3) -> Option<Mat4> {
    let side = tangent.cross(&Vec3::Y).normalized()?;
    let forward = tangent.normalized()?;
    let up = side.cross(&forward);
    Some(Mat4::from_axes(forward, up, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::World;
    use scene_kernel::primitives::plane;
    use scene_kernel::spline::CatmullRom;

    fn unit_square_curve() -> CatmullRom {
        CatmullRom::new(vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, -2.0),
        ])
    }

    fn single_mesh_graph(transforms: Vec<TransformStep>) -> SceneGraph {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        for step in transforms {
            graph.push_transform(root, step).unwrap();
        }
        graph.push_mesh(root, plane(1.0, 1).unwrap()).unwrap();
        graph
    }

    fn origin_after(transforms: Vec<TransformStep>) -> Point3 {
        let graph = single_mesh_graph(transforms);
        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        snapshot.items[0].world.transform_point(&Point3::ORIGIN)
    }

    #[test]
    fn test_transform_order_is_significant() {
        let translate = TransformStep::Translate {
            x: 1.0,
            y: 0.0,
            z: 0.0,
        };
        let rotate = TransformStep::Rotate {
            angle_degrees: 90.0,
            axis: Vec3::Y,
        };

        let a = origin_after(vec![translate.clone(), rotate.clone()]);
        let b = origin_after(vec![rotate, translate]);

        // Translate-then-rotate leaves the origin at (1,0,0); rotating first
        // carries the subsequent translation onto another axis.
        assert!(a.distance_to(&Point3::new(1.0, 0.0, 0.0)) < 1e-5);
        assert!(a.distance_to(&b) > 0.5);
    }

    #[test]
    fn test_zero_angle_rotation_is_noop() {
        let p = origin_after(vec![
            TransformStep::Translate {
                x: 2.0,
                y: 0.0,
                z: 0.0,
            },
            TransformStep::Rotate {
                angle_degrees: 0.0,
                axis: Vec3::ZERO,
            },
        ]);
        assert!(p.distance_to(&Point3::new(2.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_scale_applies_componentwise() {
        let graph = single_mesh_graph(vec![TransformStep::Scale {
            x: 2.0,
            y: 3.0,
            z: 4.0,
        }]);
        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        let p = snapshot.items[0]
            .world
            .transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!(p.distance_to(&Point3::new(2.0, 3.0, 4.0)) < 1e-5);
    }

    #[test]
    fn test_rotate_over_time_quarter_period() {
        let graph = single_mesh_graph(vec![
            TransformStep::RotateOverTime {
                period: 4.0,
                axis: Vec3::Y,
            },
            TransformStep::Translate {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        ]);
        // A quarter of the period is a 90 degree turn about Y.
        let snapshot = graph.traverse(&FrameContext::at(1.0)).unwrap();
        let p = snapshot.items[0].world.transform_point(&Point3::ORIGIN);
        assert!(p.x.abs() < 1e-5, "{p:?}");
        assert!((p.z + 1.0).abs() < 1e-5, "{p:?}");
    }

    #[test]
    fn test_rotate_over_time_holds_without_period() {
        let graph = single_mesh_graph(vec![
            TransformStep::RotateOverTime {
                period: 0.0,
                axis: Vec3::Y,
            },
            TransformStep::Translate {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        ]);
        let snapshot = graph.traverse(&FrameContext::at(7.5)).unwrap();
        let p = snapshot.items[0].world.transform_point(&Point3::ORIGIN);
        assert!(p.distance_to(&Point3::new(1.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_curve_translation_follows_path() {
        let graph = single_mesh_graph(vec![TransformStep::TranslateAlongCurve {
            curve: unit_square_curve(),
            period: 8.0,
            align: false,
            visible: false,
        }]);
        // At t=0 the curve passes through its second control point pattern:
        // gt=0 evaluates segment 0 at u=0, which is control point 0.
        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        let p = snapshot.items[0].world.transform_point(&Point3::ORIGIN);
        assert!(p.distance_to(&Point3::new(2.0, 0.0, 0.0)) < 1e-4);

        // A full period later the position repeats.
        let again = graph.traverse(&FrameContext::at(8.0)).unwrap();
        let q = again.items[0].world.transform_point(&Point3::ORIGIN);
        assert!(p.distance_to(&q) < 1e-4);
    }

    #[test]
    fn test_curve_with_too_few_points_fails_loudly() {
        let graph = single_mesh_graph(vec![TransformStep::TranslateAlongCurve {
            curve: CatmullRom::new(vec![Point3::ORIGIN; 3]),
            period: 5.0,
            align: false,
            visible: false,
        }]);
        let err = graph.traverse(&FrameContext::at(1.0)).unwrap_err();
        assert_eq!(
            err,
            TraverseError::Spline(SplineError::InsufficientControlPoints { got: 3 })
        );
    }

    #[test]
    fn test_visible_curve_emits_parent_frame_trajectory() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph
            .push_transform(
                root,
                TransformStep::Translate {
                    x: 10.0,
                    y: 0.0,
                    z: 0.0,
                },
            )
            .unwrap();

        let child = graph.add_group(root).unwrap();
        graph
            .push_transform(
                child,
                TransformStep::TranslateAlongCurve {
                    curve: unit_square_curve(),
                    period: 8.0,
                    align: false,
                    visible: true,
                },
            )
            .unwrap();

        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        assert_eq!(snapshot.trajectories.len(), 1);
        let poly = &snapshot.trajectories[0];
        assert_eq!(poly.points.len(), 100);

        // The polyline is carried by the parent's translation, not the
        // child's curve position: its centroid sits near (10, 0, 0).
        let n = poly.points.len() as f32;
        let cx = poly.points.iter().map(|p| p.x).sum::<f32>() / n;
        let cz = poly.points.iter().map(|p| p.z).sum::<f32>() / n;
        assert!((cx - 10.0).abs() < 0.1, "centroid x {cx}");
        assert!(cz.abs() < 0.1, "centroid z {cz}");
    }

    #[test]
    fn test_hidden_curve_emits_no_trajectory() {
        let graph = single_mesh_graph(vec![TransformStep::TranslateAlongCurve {
            curve: unit_square_curve(),
            period: 8.0,
            align: false,
            visible: false,
        }]);
        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        assert!(snapshot.trajectories.is_empty());
    }

    #[test]
    fn test_align_orients_forward_axis_to_tangent() {
        let graph = single_mesh_graph(vec![TransformStep::TranslateAlongCurve {
            curve: unit_square_curve(),
            period: 1.0,
            align: true,
            visible: false,
        }]);
        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        let world = snapshot.items[0].world;

        // The tangent at gt=0 on this loop points along -X/+Z symmetric to
        // the control layout; whatever its direction, the carried local X
        // axis must be parallel to it.
        let (_, tangent) = unit_square_curve().evaluate(0.0).unwrap();
        let carried = world.transform_vector(&Vec3::X);
        let t = tangent.normalized().unwrap();
        let c = carried.normalized().unwrap();
        assert!(t.dot(&c) > 0.999, "forward axis {c:?} vs tangent {t:?}");
    }

    #[test]
    fn test_siblings_do_not_inherit_each_other() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_group(root).unwrap();
        let b = graph.add_group(root).unwrap();
        graph
            .push_transform(
                a,
                TransformStep::Translate {
                    x: 5.0,
                    y: 0.0,
                    z: 0.0,
                },
            )
            .unwrap();
        graph.push_mesh(a, plane(1.0, 1).unwrap()).unwrap();
        graph.push_mesh(b, plane(1.0, 1).unwrap()).unwrap();

        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        assert_eq!(snapshot.items.len(), 2);
        let pa = snapshot.items[0].world.transform_point(&Point3::ORIGIN);
        let pb = snapshot.items[1].world.transform_point(&Point3::ORIGIN);
        assert!((pa.x - 5.0).abs() < 1e-5);
        assert!(pb.x.abs() < 1e-5, "sibling leaked its sibling's transform");
    }

    #[test]
    fn test_children_compose_with_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph
            .push_transform(
                root,
                TransformStep::Translate {
                    x: 0.0,
                    y: 3.0,
                    z: 0.0,
                },
            )
            .unwrap();
        let child = graph.add_group(root).unwrap();
        graph
            .push_transform(
                child,
                TransformStep::Translate {
                    x: 2.0,
                    y: 0.0,
                    z: 0.0,
                },
            )
            .unwrap();
        graph.push_mesh(child, plane(1.0, 1).unwrap()).unwrap();

        let snapshot = graph.traverse(&FrameContext::at(0.0)).unwrap();
        let p = snapshot.items[0].world.transform_point(&Point3::ORIGIN);
        assert!(p.distance_to(&Point3::new(2.0, 3.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_world_serde_round_trip() {
        // The World is the hand-off interface from the excluded config
        // loader; it must survive a serde round trip intact.
        let graph = single_mesh_graph(vec![
            TransformStep::Rotate {
                angle_degrees: 45.0,
                axis: Vec3::Y,
            },
            TransformStep::TranslateAlongCurve {
                curve: unit_square_curve(),
                period: 10.0,
                align: true,
                visible: true,
            },
        ]);
        let world = World::new(graph);
        let json = serde_json::to_string(&world).unwrap();
        let back: World = serde_json::from_str(&json).unwrap();

        assert_eq!(back.graph.count_meshes(), 1);
        let before = world.graph.traverse(&FrameContext::at(2.0)).unwrap();
        let after = back.graph.traverse(&FrameContext::at(2.0)).unwrap();
        let pa = before.items[0].world.transform_point(&Point3::ORIGIN);
        let pb = after.items[0].world.transform_point(&Point3::ORIGIN);
        assert!(pa.distance_to(&pb) < 1e-6);
    }
}
