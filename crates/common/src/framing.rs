use serde::{Deserialize, Serialize};

use crate::Rect;

/// How the design resolution is fitted into the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    /// Keep the design aspect ratio and fill the rest with bars.
    Bars,
    /// Use the whole area and widen the field of view.
    Extend,
    /// Use the whole area and stretch the image.
    #[default]
    Scale,
}

/// Global frame border and framing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub frame_type: FrameType,
    /// Color of the border bars, RGB.
    pub bar_color: [f32; 3],
    pub design_width: u32,
    pub design_height: u32,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            frame_type: FrameType::Scale,
            bar_color: [0.0, 0.0, 0.0],
            design_width: 1920,
            design_height: 1080,
        }
    }
}

impl FrameSettings {
    pub fn design_aspect(&self) -> f32 {
        if self.design_height == 0 {
            return 1.0;
        }
        self.design_width as f32 / self.design_height as f32
    }

    /// Viewport inside `area` for a camera without a custom viewport.
    pub fn compute_viewport(&self, area: Rect) -> Rect {
        match self.frame_type {
            FrameType::Extend | FrameType::Scale => area,
            FrameType::Bars => {
                let design = self.design_aspect();
                if area.aspect() > design {
                    // Pillarbox.
                    let width = (area.height() as f32 * design).round() as i32;
                    let left = area.left + (area.width() - width) / 2;
                    Rect {
                        left,
                        right: left + width,
                        ..area
                    }
                } else {
                    // Letterbox.
                    let height = (area.width() as f32 / design).round() as i32;
                    let bottom = area.bottom + (area.height() - height) / 2;
                    Rect {
                        bottom,
                        top: bottom + height,
                        ..area
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_uses_whole_area() {
        let settings = FrameSettings::default();
        let area = Rect::from_size(800, 800);
        assert_eq!(settings.compute_viewport(area), area);
    }

    #[test]
    fn bars_letterbox_tall_area() {
        let settings = FrameSettings {
            frame_type: FrameType::Bars,
            design_width: 16,
            design_height: 9,
            ..FrameSettings::default()
        };
        let viewport = settings.compute_viewport(Rect::from_size(1600, 1600));
        assert_eq!(viewport.width(), 1600);
        assert_eq!(viewport.height(), 900);
        assert_eq!(viewport.bottom, 350);
    }

    #[test]
    fn bars_pillarbox_wide_area() {
        let settings = FrameSettings {
            frame_type: FrameType::Bars,
            design_width: 4,
            design_height: 3,
            ..FrameSettings::default()
        };
        let viewport = settings.compute_viewport(Rect::new(100, 0, 2020, 1080));
        assert_eq!(viewport.height(), 1080);
        assert_eq!(viewport.width(), 1440);
        assert_eq!(viewport.left, 100 + 240);
    }
}
