use serde::{Deserialize, Serialize};

use crate::Rect;

/// Stereo eye selector. Mono rendering only ever uses `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StereoEye {
    Left = 0,
    Right = 1,
}

impl StereoEye {
    pub const ALL: [StereoEye; 2] = [StereoEye::Left, StereoEye::Right];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Offscreen surface a frame renders into before the final composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffScreenType {
    EyeLeft0,
    EyeRight0,
}

impl OffScreenType {
    pub fn for_eye(eye: StereoEye) -> Self {
        match eye {
            StereoEye::Left => Self::EyeLeft0,
            StereoEye::Right => Self::EyeRight0,
        }
    }
}

/// Stereo output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoMode {
    #[default]
    Mono,
    /// Page-flipped output: eyes alternate on the same surface.
    QuadBuffered,
    AboveBelow,
    SideBySide,
    #[serde(rename = "top_bottom_3dtv")]
    TopBottom3DTv,
    Interlaced,
    VInterlace,
    Anaglyph,
}

impl StereoMode {
    pub fn is_stereo(self) -> bool {
        self != Self::Mono
    }

    /// Modes whose eyes are combined from two independent offscreen surfaces.
    pub fn render_per_eye(self) -> bool {
        matches!(self, Self::Interlaced | Self::VInterlace | Self::Anaglyph)
    }

    /// Eyes rendered each frame.
    pub fn eyes(self) -> &'static [StereoEye] {
        if self.is_stereo() {
            &StereoEye::ALL
        } else {
            &StereoEye::ALL[..1]
        }
    }

    /// Canvas region an eye draws into.
    pub fn eye_area(self, canvas: Rect, eye: StereoEye) -> Rect {
        let mid_x = canvas.left + canvas.width() / 2;
        let mid_y = canvas.bottom + canvas.height() / 2;
        match (self, eye) {
            (Self::SideBySide, StereoEye::Left) => Rect { right: mid_x, ..canvas },
            (Self::SideBySide, StereoEye::Right) => Rect { left: mid_x, ..canvas },
            (Self::AboveBelow | Self::TopBottom3DTv, StereoEye::Left) => {
                Rect { bottom: mid_y, ..canvas }
            }
            (Self::AboveBelow | Self::TopBottom3DTv, StereoEye::Right) => {
                Rect { top: mid_y, ..canvas }
            }
            _ => canvas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_eye_modes() {
        assert!(StereoMode::Anaglyph.render_per_eye());
        assert!(StereoMode::Interlaced.render_per_eye());
        assert!(StereoMode::VInterlace.render_per_eye());
        assert!(!StereoMode::SideBySide.render_per_eye());
        assert!(!StereoMode::QuadBuffered.render_per_eye());
        assert!(!StereoMode::Mono.render_per_eye());
    }

    #[test]
    fn eyes_per_mode() {
        assert_eq!(StereoMode::Mono.eyes(), &[StereoEye::Left]);
        assert_eq!(
            StereoMode::QuadBuffered.eyes(),
            &[StereoEye::Left, StereoEye::Right]
        );
    }

    #[test]
    fn side_by_side_splits_horizontally() {
        let canvas = Rect::from_size(1920, 1080);
        let left = StereoMode::SideBySide.eye_area(canvas, StereoEye::Left);
        let right = StereoMode::SideBySide.eye_area(canvas, StereoEye::Right);
        assert_eq!(left, Rect::new(0, 0, 960, 1080));
        assert_eq!(right, Rect::new(960, 0, 1920, 1080));
    }

    #[test]
    fn above_below_puts_left_eye_on_top() {
        let canvas = Rect::from_size(800, 600);
        let left = StereoMode::AboveBelow.eye_area(canvas, StereoEye::Left);
        let right = StereoMode::AboveBelow.eye_area(canvas, StereoEye::Right);
        assert_eq!(left, Rect::new(0, 300, 800, 600));
        assert_eq!(right, Rect::new(0, 0, 800, 300));
    }

    #[test]
    fn full_canvas_for_other_modes() {
        let canvas = Rect::from_size(640, 480);
        for eye in StereoEye::ALL {
            assert_eq!(StereoMode::Anaglyph.eye_area(canvas, eye), canvas);
            assert_eq!(StereoMode::Mono.eye_area(canvas, eye), canvas);
        }
    }

    #[test]
    fn stereo_mode_serde_names() {
        let mode: StereoMode = serde_json::from_str("\"side_by_side\"").unwrap();
        assert_eq!(mode, StereoMode::SideBySide);
    }
}
