use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

use super::LayerUsage;

/// Look direction and up vector of each face, in +X, -X, +Y, -Y, +Z, -Z order.
const FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// Omnidirectional capture around the viewpoint. One capture serves every
/// viewport, so a cube map always uses a single shared layer.
#[derive(Debug, Clone, Default)]
pub struct CubeMap {
    projection: Option<Mat4>,
    layers: usize,
}

impl CubeMap {
    pub const NUM_FACES: u16 = 6;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    pub(super) fn ensure_layers(&mut self) -> LayerUsage {
        self.layers = 1;
        LayerUsage::Shared
    }

    pub(super) fn invalidate_projection(&mut self) {
        self.projection = None;
    }

    /// Square 90 degree projection, recomputed only after the clip range
    /// changed.
    pub(super) fn projection_matrix(&mut self, clip_start: f32, clip_end: f32) -> Mat4 {
        *self
            .projection
            .get_or_insert_with(|| Mat4::perspective_rh(FRAC_PI_2, 1.0, clip_start, clip_end))
    }

    /// Camera-to-world transform of `face` placed at `position`.
    pub fn face_transform(position: Vec3, face: u16) -> Mat4 {
        let (dir, up) = FACES[face as usize % FACES.len()];
        Mat4::look_to_rh(position, dir, up).inverse()
    }
}
