//! Render scheduling: per-frame render schedules and the dynamic texture
//! renderers that feed them.
//!
//! Each frame, [`RenderPipeline::schedule_frame`] asks the
//! [`ScheduleBuilder`] for the camera passes of every scene, then lets each
//! scene's [`TextureRendererManager`] add the texture captures (cube maps,
//! planar reflections) that must run before them. [`execute_frame`] hands the
//! result to a [`DrawExecutor`].
//!
//! # Invariants
//! - Camera indices of a scene are dense and unique across both eyes.
//! - At most one texture renderer per underlying texture source.
//! - Texture bind/unbind ops run once each, in schedule order.
//! - Building a schedule never mutates scene state.

mod builder;
mod config;
mod error;
mod executor;
mod manager;
mod ops;
mod pipeline;
mod renderer;
mod schedule;

pub use builder::ScheduleBuilder;
pub use config::ScheduleConfig;
pub use error::{ConfigError, RenderError};
pub use executor::{DrawExecutor, TraceExecutor, TraceRasterizer, execute_frame};
pub use manager::{RendererRemap, TextureRendererManager};
pub use ops::{Rasterizer, TargetKind, TextureRenderOp, TextureTarget};
pub use pipeline::RenderPipeline;
pub use renderer::{
    CubeMap, LayerUsage, PlanarMap, RendererKind, RendererState, TextureRenderer,
};
pub use schedule::{
    CameraRenderSchedule, ClearBuffers, DrawingMode, FrameRenderSchedule, FrameSchedule,
    SceneSchedule, TextureRenderMode, TextureRenderSchedule,
};

pub fn crate_info() -> &'static str {
    "renderplan-render v0.1.0"
}
