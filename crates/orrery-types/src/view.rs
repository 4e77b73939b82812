use serde::{Deserialize, Serialize};

/// Perspective camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            look_at: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov: 60.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

/// Output window dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub width: u32,
    pub height: u32,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Window {
    pub fn aspect_ratio(&self) -> f32 {
        // Guard the degenerate zero-height window the same way the resize
        // handler does.
        let h = self.height.max(1);
        self.width as f32 / h as f32
    }
}
