use glam::{Mat4, Vec3, Vec4};
use renderplan_assets::PlanarMode;
use renderplan_common::Transform;

use super::LayerUsage;
use crate::ops::{Rasterizer, TextureTarget};

#[derive(Debug, Clone, Copy, Default)]
struct PlanarLayer {
    clip_plane: Vec4,
    mirrored: bool,
}

/// Mirror or see-through capture of the plane through the viewpoint object,
/// oriented by its local +Z axis. The image depends on where the camera is,
/// so every viewport gets its own layer.
#[derive(Debug, Clone)]
pub struct PlanarMap {
    mode: PlanarMode,
    layers: Vec<PlanarLayer>,
}

impl PlanarMap {
    pub fn new(mode: PlanarMode) -> Self {
        Self {
            mode,
            layers: Vec::new(),
        }
    }

    pub fn mode(&self) -> PlanarMode {
        self.mode
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub(super) fn ensure_layers(&mut self, viewports: usize) -> LayerUsage {
        self.layers.resize(viewports, PlanarLayer::default());
        LayerUsage::PerViewport
    }

    pub(super) fn num_faces(&self, layer: u16) -> u16 {
        if (layer as usize) < self.layers.len() { 1 } else { 0 }
    }

    /// World-space clip plane stored for `layer` by the last prepared face.
    pub fn clip_plane(&self, layer: u16) -> Option<Vec4> {
        self.layers.get(layer as usize).map(|l| l.clip_plane)
    }

    pub(super) fn prepare_face(
        &mut self,
        viewpoint: &Transform,
        camera_view: Mat4,
        layer: u16,
    ) -> Option<Mat4> {
        let slot = self.layers.get_mut(layer as usize)?;

        let camera_world = camera_view.inverse();
        let camera_pos = camera_world.transform_point3(Vec3::ZERO);
        let normal = viewpoint.local_z().normalize_or_zero();
        if normal == Vec3::ZERO {
            return None;
        }
        let offset = normal.dot(viewpoint.position);

        // Camera behind the plane sees nothing of this surface.
        if normal.dot(camera_pos) - offset < 0.0 {
            return None;
        }

        let cam_trans = match self.mode {
            PlanarMode::Reflection => {
                slot.clip_plane = normal.extend(-offset);
                slot.mirrored = true;
                reflection_matrix(normal, offset) * camera_world
            }
            PlanarMode::Refraction => {
                slot.clip_plane = (-normal).extend(offset);
                slot.mirrored = false;
                camera_world
            }
        };
        Some(cam_trans)
    }

    pub(super) fn begin_render_face<R: Rasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        target: TextureTarget,
    ) {
        rasterizer.bind_texture_target(target);
        if let Some(layer) = self.layers.get(target.layer as usize) {
            rasterizer.set_clip_plane(Some(layer.clip_plane));
            if layer.mirrored {
                rasterizer.set_front_face_inverted(true);
            }
        }
    }

    pub(super) fn end_render_face<R: Rasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        target: TextureTarget,
    ) {
        if let Some(layer) = self.layers.get(target.layer as usize) {
            if layer.mirrored {
                rasterizer.set_front_face_inverted(false);
            }
            rasterizer.set_clip_plane(None);
        }
        rasterizer.unbind_texture_target(target);
    }
}

/// Reflection about the plane `dot(normal, x) == offset`.
fn reflection_matrix(n: Vec3, offset: f32) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.y, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.z, -2.0 * n.y * n.z, 1.0 - 2.0 * n.z * n.z, 0.0),
        (2.0 * offset * n).extend(1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_mirror() -> Transform {
        Transform::from_position(Vec3::new(0.0, 0.0, 1.0))
    }

    fn view_from(eye: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
    }

    #[test]
    fn reflection_mirrors_camera_below_plane() {
        let mut planar = PlanarMap::new(PlanarMode::Reflection);
        planar.ensure_layers(1);

        let eye = Vec3::new(0.0, 2.0, 5.0);
        let trans = planar.prepare_face(&floor_mirror(), view_from(eye), 0).unwrap();
        let mirrored = trans.transform_point3(Vec3::ZERO);
        assert!(mirrored.abs_diff_eq(Vec3::new(0.0, 2.0, -3.0), 1e-4));
        assert!(trans.determinant() < 0.0);

        let plane = planar.clip_plane(0).unwrap();
        assert!(plane.abs_diff_eq(Vec4::new(0.0, 0.0, 1.0, -1.0), 1e-6));
    }

    #[test]
    fn camera_behind_plane_skips_face() {
        let mut planar = PlanarMap::new(PlanarMode::Reflection);
        planar.ensure_layers(1);
        let view = view_from(Vec3::new(0.0, 2.0, -5.0));
        assert!(planar.prepare_face(&floor_mirror(), view, 0).is_none());
    }

    #[test]
    fn refraction_keeps_camera_transform() {
        let mut planar = PlanarMap::new(PlanarMode::Refraction);
        planar.ensure_layers(1);
        let view = view_from(Vec3::new(1.0, 2.0, 5.0));
        let trans = planar.prepare_face(&floor_mirror(), view, 0).unwrap();
        assert!(trans.abs_diff_eq(view.inverse(), 1e-5));
        let plane = planar.clip_plane(0).unwrap();
        assert!(plane.abs_diff_eq(Vec4::new(0.0, 0.0, -1.0, 1.0), 1e-6));
    }

    #[test]
    fn unprovisioned_layer_has_no_face() {
        let mut planar = PlanarMap::new(PlanarMode::Reflection);
        assert_eq!(planar.num_faces(0), 0);
        assert!(
            planar
                .prepare_face(&floor_mirror(), view_from(Vec3::Z * 5.0), 0)
                .is_none()
        );
    }
}
