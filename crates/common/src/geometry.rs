use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Screen-space rectangle in canvas pixels. `right` and `top` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl Rect {
    pub fn new(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.top - self.bottom
    }

    /// Width over height, 1.0 for degenerate rectangles.
    pub fn aspect(&self) -> f32 {
        if self.height() <= 0 {
            return 1.0;
        }
        self.width() as f32 / self.height() as f32
    }
}

/// Lens frustum extents at the near plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameFrustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl FrameFrustum {
    /// Shift the frustum horizontally, used for off-axis stereo.
    pub fn shifted(mut self, dx: f32) -> Self {
        self.left += dx;
        self.right += dx;
        self
    }

    /// Right-handed perspective projection with a [0, 1] depth range.
    pub fn perspective_matrix(&self) -> Mat4 {
        let (l, r, b, t, n, f) = (
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        );
        let depth = f / (n - f);
        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new((r + l) / (r - l), (t + b) / (t - b), depth, -1.0),
            Vec4::new(0.0, 0.0, depth * n, 0.0),
        )
    }

    pub fn orthographic_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

/// Six clipping planes extracted from a view-projection matrix.
///
/// Planes are stored as `(normal, d)` with normals pointing inward, in the
/// order left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Default for Frustum {
    fn default() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }
}

impl Frustum {
    /// Extract planes from `projection * view` (depth range [0, 1]).
    pub fn from_matrix(m: Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(normalize_plane);
        Self { planes }
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(point) + p.w >= 0.0)
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.truncate().dot(center) + p.w >= -radius)
    }
}

fn normalize_plane(plane: Vec4) -> Vec4 {
    let len = plane.truncate().length();
    if len > f32::EPSILON { plane / len } else { plane }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_dimensions() {
        let r = Rect::new(10, 20, 110, 70);
        assert_eq!(r.width(), 100);
        assert_eq!(r.height(), 50);
        assert_eq!(r.aspect(), 2.0);
        assert_eq!(Rect::default().aspect(), 1.0);
    }

    #[test]
    fn symmetric_frustum_matches_glam_perspective() {
        let near = 0.1;
        let far = 100.0;
        let half = near * (45.0_f32.to_radians()).tan();
        let frame = FrameFrustum {
            left: -half,
            right: half,
            bottom: -half,
            top: half,
            near,
            far,
        };
        let expected = Mat4::perspective_rh(90.0_f32.to_radians(), 1.0, near, far);
        assert!(frame.perspective_matrix().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn shifted_frustum_moves_both_edges() {
        let frame = FrameFrustum {
            left: -1.0,
            right: 1.0,
            ..FrameFrustum::default()
        }
        .shifted(0.25);
        assert_eq!(frame.left, -0.75);
        assert_eq!(frame.right, 1.25);
    }

    #[test]
    fn frustum_culls_points_behind_camera() {
        let proj = Mat4::perspective_rh(60.0_f32.to_radians(), 1.0, 0.1, 50.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let frustum = Frustum::from_matrix(proj * view);

        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -60.0)));
        assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, 0.5), 1.0));
        assert!(!frustum.intersects_sphere(Vec3::new(100.0, 0.0, -10.0), 1.0));
    }
}
