//! Per-frame schedule records.
//!
//! A [`FrameSchedule`] is built fresh every frame and consumed by the draw
//! pass. Nothing in it is mutated after construction.

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use renderplan_common::{
    EntityId, FrameFrustum, FrameSettings, Frustum, OffScreenType, Rect, SceneId, StereoEye,
    StereoMode,
};
use std::fmt;

use crate::ops::TextureRenderOp;

bitflags! {
    /// Rendering and update options of a texture capture.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureRenderMode: u32 {
        /// Render the world background.
        const RENDER_WORLD = 1 << 0;
        /// Update object level of detail from the capture viewpoint.
        const UPDATE_LOD = 1 << 1;
    }
}

bitflags! {
    /// Buffers cleared before a capture starts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearBuffers: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// Drawing mode selector passed to the draw executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawingMode {
    Wireframe,
    Solid,
    Textured,
    Renderer,
    Shadow,
}

/// Everything needed to draw a scene from one camera for one eye.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRenderSchedule {
    /// Camera object this entry was built from.
    pub camera: EntityId,
    pub view: Mat4,
    pub projection: Mat4,
    /// Camera-to-world transform, eye offset included.
    pub cam_trans: Mat4,
    pub position: Vec3,
    pub negative_scale: bool,
    pub perspective: bool,
    pub frame_frustum: FrameFrustum,
    pub frustum: Frustum,
    /// True if objects should be frustum culled.
    pub culling: bool,
    /// Display area.
    pub area: Rect,
    pub viewport: Rect,
    pub lod_factor: f32,
    pub stereo_mode: StereoMode,
    pub eye: StereoEye,
    pub focal_length: f32,
    /// Position among all cameras rendered for the scene, both eyes included.
    pub index: u16,
}

/// One face of one layer of a dynamic texture to render before the main pass.
#[derive(Debug)]
pub struct TextureRenderSchedule {
    pub mode: TextureRenderMode,
    pub clear: ClearBuffers,
    pub drawing_mode: DrawingMode,
    pub view: Mat4,
    pub projection: Mat4,
    pub cam_trans: Mat4,
    pub position: Vec3,
    pub frustum: Frustum,
    pub visible_layers: u32,
    pub lod_factor: f32,
    pub eye: StereoEye,
    /// Storage layer written by this entry.
    pub index: u16,
    pub face: u16,
    /// Run immediately before drawing.
    pub bind: TextureRenderOp,
    /// Run immediately after drawing.
    pub unbind: TextureRenderOp,
}

/// Textures and cameras of one scene.
#[derive(Debug)]
pub struct SceneSchedule {
    pub scene: SceneId,
    pub textures: Vec<TextureRenderSchedule>,
    /// Cameras per eye, indexed by [`StereoEye::index`].
    pub cameras: [Vec<CameraRenderSchedule>; 2],
}

impl SceneSchedule {
    pub fn new(scene: SceneId) -> Self {
        Self {
            scene,
            textures: Vec::new(),
            cameras: [Vec::new(), Vec::new()],
        }
    }

    pub fn cameras(&self, eye: StereoEye) -> &[CameraRenderSchedule] {
        &self.cameras[eye.index()]
    }

    /// Number of camera entries over both eyes.
    pub fn camera_count(&self) -> usize {
        self.cameras.iter().map(Vec::len).sum()
    }

    /// Camera entries of both eyes ordered by their index, so that the
    /// position in the returned list is the viewport position.
    pub fn cameras_by_index(&self) -> Vec<&CameraRenderSchedule> {
        let mut slots: Vec<Option<&CameraRenderSchedule>> = vec![None; self.camera_count()];
        for camera in self.cameras.iter().flatten() {
            if let Some(slot) = slots.get_mut(camera.index as usize) {
                *slot = Some(camera);
            }
        }
        slots.into_iter().flatten().collect()
    }
}

/// One offscreen target and the eyes drawn into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRenderSchedule {
    pub target: OffScreenType,
    pub eyes: Vec<StereoEye>,
}

/// Root of a frame's schedule.
#[derive(Debug)]
pub struct FrameSchedule {
    pub frame_settings: FrameSettings,
    pub stereo_mode: StereoMode,
    /// True if each eye renders into its own offscreen surface.
    pub render_per_eye: bool,
    pub scenes: Vec<SceneSchedule>,
    pub frames: Vec<FrameRenderSchedule>,
}

impl FrameSchedule {
    pub fn texture_count(&self) -> usize {
        self.scenes.iter().map(|s| s.textures.len()).sum()
    }

    pub fn camera_count(&self) -> usize {
        self.scenes.iter().map(SceneSchedule::camera_count).sum()
    }
}

impl fmt::Display for FrameSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Frame (stereo={:?}, per_eye={}) ===",
            self.stereo_mode, self.render_per_eye
        )?;
        for frame in &self.frames {
            writeln!(f, "Target {:?}: eyes={:?}", frame.target, frame.eyes)?;
        }
        for scene in &self.scenes {
            writeln!(
                f,
                "Scene [{}] textures={} cameras={}",
                &scene.scene.0.to_string()[..8],
                scene.textures.len(),
                scene.camera_count()
            )?;
            for texture in &scene.textures {
                let p = texture.position;
                writeln!(
                    f,
                    "  texture layer={} face={} eye={:?} pos=({:.2}, {:.2}, {:.2})",
                    texture.index, texture.face, texture.eye, p.x, p.y, p.z
                )?;
            }
            for camera in scene.cameras.iter().flatten() {
                let v = camera.viewport;
                writeln!(
                    f,
                    "  camera index={} eye={:?} viewport=({}, {}, {}, {}) culling={}",
                    camera.index, camera.eye, v.left, v.bottom, v.right, v.top, camera.culling
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_frames_and_short_scene_id() {
        let scene = SceneId::new();
        let schedule = FrameSchedule {
            frame_settings: FrameSettings::default(),
            stereo_mode: StereoMode::Mono,
            render_per_eye: false,
            scenes: vec![SceneSchedule::new(scene)],
            frames: vec![FrameRenderSchedule {
                target: OffScreenType::EyeLeft0,
                eyes: vec![StereoEye::Left],
            }],
        };
        let text = schedule.to_string();
        let short = &scene.0.to_string()[..8];
        assert!(text.contains("Target EyeLeft0: eyes=[Left]"));
        assert!(text.contains(&format!("Scene [{short}] textures=0 cameras=0\n")));
    }
}
