use glam::{Mat4, Vec2};
use renderplan_common::{FrameFrustum, Rect};
use serde::{Deserialize, Serialize};

/// Which sensor dimension the focal length refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorFit {
    /// Horizontal for landscape viewports, vertical otherwise.
    #[default]
    Auto,
    Horizontal,
    Vertical,
}

/// Camera lens parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    Perspective {
        /// Focal length in millimeters.
        focal_length: f32,
        /// Sensor size in millimeters.
        sensor_width: f32,
        sensor_height: f32,
        sensor_fit: SensorFit,
    },
    Orthographic {
        /// Width (or height, depending on the fit) of the view volume.
        scale: f32,
        sensor_fit: SensorFit,
    },
}

impl Default for Lens {
    fn default() -> Self {
        Self::Perspective {
            focal_length: 50.0,
            sensor_width: 32.0,
            sensor_height: 18.0,
            sensor_fit: SensorFit::Auto,
        }
    }
}

impl Lens {
    pub fn is_perspective(&self) -> bool {
        matches!(self, Self::Perspective { .. })
    }

    /// Near-plane extents for a viewport of the given size.
    pub fn frame_frustum(&self, viewport: Rect, shift: Vec2, near: f32, far: f32) -> FrameFrustum {
        let width = viewport.width().max(1) as f32;
        let height = viewport.height().max(1) as f32;

        let (half_size, fit) = match *self {
            Self::Perspective {
                focal_length,
                sensor_width,
                sensor_height,
                sensor_fit,
            } => {
                let sensor = match sensor_fit {
                    SensorFit::Vertical => sensor_height,
                    _ => sensor_width,
                };
                (0.5 * sensor * near / focal_length, sensor_fit)
            }
            Self::Orthographic { scale, sensor_fit } => (0.5 * scale, sensor_fit),
        };

        let horizontal = match fit {
            SensorFit::Auto => width >= height,
            SensorFit::Horizontal => true,
            SensorFit::Vertical => false,
        };

        let (half_x, half_y) = if horizontal {
            (half_size, half_size * height / width)
        } else {
            (half_size * width / height, half_size)
        };

        let major = 2.0 * half_size;
        FrameFrustum {
            left: -half_x + shift.x * major,
            right: half_x + shift.x * major,
            bottom: -half_y + shift.y * major,
            top: half_y + shift.y * major,
            near,
            far,
        }
    }
}

/// Stereo parameters of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoSettings {
    /// Distance at which both eyes converge.
    pub focal_length: f32,
    pub eye_separation: f32,
}

impl Default for StereoSettings {
    fn default() -> Self {
        Self {
            focal_length: 10.0,
            eye_separation: 0.1,
        }
    }
}

/// Camera component attached to a game object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub lens: Lens,
    /// Lens shift as a fraction of the major sensor dimension.
    pub shift: Vec2,
    pub clip_start: f32,
    pub clip_end: f32,
    /// Custom viewport in canvas pixels. Cameras with a viewport render even
    /// when they are not the active camera.
    pub viewport: Option<Rect>,
    pub frustum_culling: bool,
    pub lod_factor: f32,
    pub stereo: StereoSettings,
    /// Replaces the lens projection. Disables frustum culling.
    pub custom_projection: Option<Mat4>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            lens: Lens::default(),
            shift: Vec2::ZERO,
            clip_start: 0.1,
            clip_end: 100.0,
            viewport: None,
            frustum_culling: true,
            lod_factor: 1.0,
            stereo: StereoSettings::default(),
            custom_projection: None,
        }
    }
}

impl Camera {
    pub fn with_viewport(mut self, viewport: Rect) -> Self {
        self.viewport = Some(viewport);
        self
    }
}
