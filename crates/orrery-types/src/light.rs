use serde::{Deserialize, Serialize};

/// A light source in the world.
///
/// Pure data; position/direction fields are plain coordinate triples so the
/// configuration loader can materialize lights without depending on the
/// geometry kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Light {
    Point {
        position: [f32; 3],
        intensity: f32,
    },
    Directional {
        direction: [f32; 3],
        intensity: f32,
    },
    Spotlight {
        position: [f32; 3],
        direction: [f32; 3],
        /// Cone half-angle in degrees.
        cutoff_degrees: f32,
        intensity: f32,
    },
}

impl Light {
    pub fn intensity(&self) -> f32 {
        match self {
            Light::Point { intensity, .. }
            | Light::Directional { intensity, .. }
            | Light::Spotlight { intensity, .. } => *intensity,
        }
    }
}
