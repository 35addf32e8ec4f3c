//! Scene Kernel: authoritative scene state read by the schedule builder.
//!
//! # Invariants
//! - All state mutations flow through explicit operations and are logged.
//! - Iteration over objects is deterministic (BTreeMap).
//! - Cameras are rendered in registration order.

pub mod camera;
pub mod scene;

pub use camera::{Camera, Lens, SensorFit, StereoSettings};
pub use scene::{ObjectData, Scene, SceneEvent};
