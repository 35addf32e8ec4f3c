//! Shared value types for the renderplan scheduler.
//!
//! Everything here is plain data: handles, transforms, screen rectangles,
//! frusta and the stereo/framing settings that both the scene kernel and the
//! schedule builder agree on.

mod framing;
mod geometry;
mod stereo;
mod types;

pub use framing::{FrameSettings, FrameType};
pub use geometry::{FrameFrustum, Frustum, Rect};
pub use stereo::{OffScreenType, StereoEye, StereoMode};
pub use types::{EntityId, RendererId, SceneId, Transform};

pub fn crate_info() -> &'static str {
    "renderplan-common v0.1.0"
}
