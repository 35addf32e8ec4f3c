//! Schedule builder: turns scenes, cameras and the stereo mode into the
//! frame's [`FrameSchedule`]. Reads scene state only.

use glam::Mat4;
use renderplan_common::{
    EntityId, FrameFrustum, Frustum, OffScreenType, StereoEye, StereoMode, Transform,
};
use renderplan_kernel::{Camera, Scene};

use crate::config::ScheduleConfig;
use crate::schedule::{CameraRenderSchedule, FrameRenderSchedule, FrameSchedule, SceneSchedule};

#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    config: ScheduleConfig,
}

impl ScheduleBuilder {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn set_stereo_mode(&mut self, mode: StereoMode) {
        self.config.stereo_mode = mode;
    }

    /// Build the frame schedule for `scenes`, in the given order. Texture
    /// lists are left empty.
    pub fn build<'a>(&self, scenes: impl IntoIterator<Item = &'a Scene>) -> FrameSchedule {
        let mode = self.config.stereo_mode;
        FrameSchedule {
            frame_settings: self.config.frame_settings,
            stereo_mode: mode,
            render_per_eye: mode.render_per_eye(),
            scenes: scenes.into_iter().map(|s| self.scene_schedule(s)).collect(),
            frames: self.frames(),
        }
    }

    /// Offscreen targets of the frame and the eyes drawn into each.
    pub fn frames(&self) -> Vec<FrameRenderSchedule> {
        let mode = self.config.stereo_mode;
        if mode.render_per_eye() {
            StereoEye::ALL
                .iter()
                .map(|eye| FrameRenderSchedule {
                    target: OffScreenType::for_eye(*eye),
                    eyes: vec![*eye],
                })
                .collect()
        } else {
            vec![FrameRenderSchedule {
                target: OffScreenType::EyeLeft0,
                eyes: mode.eyes().to_vec(),
            }]
        }
    }

    /// Camera schedules of one scene. Eyes are the outer loop so left-eye
    /// cameras take the low index range.
    pub fn scene_schedule(&self, scene: &Scene) -> SceneSchedule {
        let mut schedule = SceneSchedule::new(scene.id());
        let mut index: u16 = 0;
        for eye in self.config.stereo_mode.eyes() {
            for (id, camera, transform) in scene.rendered_cameras() {
                schedule.cameras[eye.index()]
                    .push(self.camera_schedule(id, camera, transform, *eye, index));
                index += 1;
            }
        }
        tracing::trace!(
            scene = scene.name(),
            cameras = schedule.camera_count(),
            "scene scheduled"
        );
        schedule
    }

    fn camera_schedule(
        &self,
        id: EntityId,
        camera: &Camera,
        transform: &Transform,
        eye: StereoEye,
        index: u16,
    ) -> CameraRenderSchedule {
        let mode = self.config.stereo_mode;
        let display = mode.eye_area(self.config.canvas(), eye);
        let (area, viewport) = match camera.viewport {
            Some(custom) => (custom, custom),
            None => (display, self.config.frame_settings.compute_viewport(display)),
        };

        let mut cam_trans = transform.rigid_matrix();
        let mut frame_frustum =
            camera
                .lens
                .frame_frustum(viewport, camera.shift, camera.clip_start, camera.clip_end);

        if mode.is_stereo() {
            let half_sep = 0.5 * camera.stereo.eye_separation;
            let sign = match eye {
                StereoEye::Left => -1.0,
                StereoEye::Right => 1.0,
            };
            cam_trans = Mat4::from_translation(transform.local_x() * sign * half_sep) * cam_trans;
            if camera.lens.is_perspective() && camera.stereo.focal_length > 0.0 {
                let shift = half_sep * camera.clip_start / camera.stereo.focal_length;
                frame_frustum = frame_frustum.shifted(-sign * shift);
            }
        }

        let view = cam_trans.inverse();
        let projection = camera
            .custom_projection
            .unwrap_or_else(|| lens_projection(camera, &frame_frustum));

        CameraRenderSchedule {
            camera: id,
            view,
            projection,
            cam_trans,
            position: cam_trans.w_axis.truncate(),
            negative_scale: transform.is_negative_scale(),
            perspective: camera.lens.is_perspective(),
            frame_frustum,
            frustum: Frustum::from_matrix(projection * view),
            culling: camera.frustum_culling && camera.custom_projection.is_none(),
            area,
            viewport,
            lod_factor: camera.lod_factor,
            stereo_mode: mode,
            eye,
            focal_length: camera.stereo.focal_length,
            index,
        }
    }
}

fn lens_projection(camera: &Camera, frame: &FrameFrustum) -> Mat4 {
    if camera.lens.is_perspective() {
        frame.perspective_matrix()
    } else {
        frame.orthographic_matrix()
    }
}
