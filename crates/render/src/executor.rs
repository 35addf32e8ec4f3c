//! Frame execution: walks a [`FrameSchedule`] and hands every entry to a
//! [`DrawExecutor`], running texture bind/unbind ops around each capture.

use glam::Vec4;
use renderplan_common::{FrameSettings, OffScreenType, StereoEye};
use renderplan_kernel::Scene;

use crate::ops::{Rasterizer, TargetKind, TextureTarget};
use crate::pipeline::RenderPipeline;
use crate::schedule::{CameraRenderSchedule, FrameSchedule, TextureRenderSchedule};

/// Backend that issues the actual draws. Never mutates scene state.
pub trait DrawExecutor {
    /// Draw `scene` into the currently bound texture target.
    fn draw_texture(&mut self, scene: &Scene, texture: &TextureRenderSchedule);
    fn begin_frame(&mut self, target: OffScreenType, settings: &FrameSettings);
    fn draw_camera(&mut self, scene: &Scene, camera: &CameraRenderSchedule);
    fn end_frame(&mut self, target: OffScreenType);
}

/// Run one frame. Texture captures of every scene come first, then each
/// frame target draws the cameras of its eyes. The schedule is consumed:
/// bind/unbind ops fire exactly once.
pub fn execute_frame<R, E>(
    schedule: FrameSchedule,
    scenes: &mut [Scene],
    pipeline: &RenderPipeline,
    rasterizer: &mut R,
    executor: &mut E,
) where
    R: Rasterizer + ?Sized,
    E: DrawExecutor + ?Sized,
{
    for scene_schedule in &schedule.scenes {
        if scene_schedule.textures.is_empty() {
            continue;
        }
        let Some(scene) = scenes.iter_mut().find(|s| s.id() == scene_schedule.scene) else {
            tracing::warn!(scene = %scene_schedule.scene.0, "scheduled scene not found");
            continue;
        };
        let Some(manager) = pipeline.manager(scene_schedule.scene) else {
            continue;
        };
        for texture in &scene_schedule.textures {
            texture.bind.apply(scene, manager, rasterizer);
            executor.draw_texture(scene, texture);
            texture.unbind.apply(scene, manager, rasterizer);
        }
    }

    for frame in &schedule.frames {
        executor.begin_frame(frame.target, &schedule.frame_settings);
        for scene_schedule in &schedule.scenes {
            let Some(scene) = scenes.iter().find(|s| s.id() == scene_schedule.scene) else {
                continue;
            };
            for eye in &frame.eyes {
                for camera in scene_schedule.cameras(*eye) {
                    executor.draw_camera(scene, camera);
                }
            }
        }
        executor.end_frame(frame.target);
    }
}

/// Executor that records one line per call.
#[derive(Debug, Default)]
pub struct TraceExecutor {
    lines: Vec<String>,
}

impl TraceExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_text(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

impl DrawExecutor for TraceExecutor {
    fn draw_texture(&mut self, scene: &Scene, texture: &TextureRenderSchedule) {
        let hidden = scene.objects().values().filter(|o| !o.visible).count();
        self.lines.push(format!(
            "  texture {} layer={} face={} eye={} hidden={}",
            scene.name(),
            texture.index,
            texture.face,
            eye_name(texture.eye),
            hidden
        ));
    }

    fn begin_frame(&mut self, target: OffScreenType, settings: &FrameSettings) {
        self.lines
            .push(format!("frame {target:?} framing={:?}", settings.frame_type));
    }

    fn draw_camera(&mut self, scene: &Scene, camera: &CameraRenderSchedule) {
        let v = camera.viewport;
        self.lines.push(format!(
            "  camera {}/{} #{} eye={} viewport=[{}, {}, {}, {}] culling={}",
            scene.name(),
            scene.object_name(camera.camera).unwrap_or("?"),
            camera.index,
            eye_name(camera.eye),
            v.left,
            v.bottom,
            v.right,
            v.top,
            camera.culling
        ));
    }

    fn end_frame(&mut self, target: OffScreenType) {
        self.lines.push(format!("end {target:?}"));
    }
}

/// Rasterizer that records the state changes it receives.
#[derive(Debug, Default)]
pub struct TraceRasterizer {
    calls: Vec<String>,
}

impl TraceRasterizer {
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn record_target(&mut self, verb: &str, target: TextureTarget) {
        let kind = match target.kind {
            TargetKind::CubeFace => "cube_face",
            TargetKind::Planar => "planar",
        };
        self.calls
            .push(format!("{verb} {kind} {}/{}", target.layer, target.face));
    }
}

impl Rasterizer for TraceRasterizer {
    fn bind_texture_target(&mut self, target: TextureTarget) {
        self.record_target("bind", target);
    }

    fn unbind_texture_target(&mut self, target: TextureTarget) {
        self.record_target("unbind", target);
    }

    fn set_clip_plane(&mut self, plane: Option<Vec4>) {
        match plane {
            Some(p) => self.calls.push(format!(
                "clip ({:.2}, {:.2}, {:.2}, {:.2})",
                p.x, p.y, p.z, p.w
            )),
            None => self.calls.push("clip off".to_string()),
        }
    }

    fn set_front_face_inverted(&mut self, inverted: bool) {
        self.calls.push(format!("front_face_inverted {inverted}"));
    }
}

fn eye_name(eye: StereoEye) -> &'static str {
    match eye {
        StereoEye::Left => "left",
        StereoEye::Right => "right",
    }
}
