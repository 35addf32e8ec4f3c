//! Bind/unbind operations of texture captures and the GPU seam they drive.
//!
//! Texture schedule entries carry their side effects as plain data. The draw
//! pass runs `bind`, draws, then runs `unbind`, in emission order, once per
//! entry.

use glam::Vec4;
use renderplan_assets::TextureSourceId;
use renderplan_common::{EntityId, RendererId};
use renderplan_kernel::Scene;

use crate::manager::TextureRendererManager;

/// Kind of storage a capture writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    CubeFace,
    Planar,
}

/// Addressable slice of a dynamic texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureTarget {
    pub renderer: RendererId,
    pub texture: TextureSourceId,
    pub kind: TargetKind,
    pub layer: u16,
    pub face: u16,
}

/// GPU-side state changes needed by texture captures. Implemented by the
/// rasterizer backend.
pub trait Rasterizer {
    /// Redirect drawing into `target`.
    fn bind_texture_target(&mut self, target: TextureTarget);
    /// Finish drawing into `target` and restore the previous surface.
    fn unbind_texture_target(&mut self, target: TextureTarget);
    /// User clip plane in world space, `None` to disable.
    fn set_clip_plane(&mut self, plane: Option<Vec4>);
    fn set_front_face_inverted(&mut self, inverted: bool);
}

/// Deferred side effect of a texture schedule entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureRenderOp {
    /// Hide the viewpoint object (children untouched, no scene event) and
    /// start the face.
    BeginFace {
        renderer: RendererId,
        layer: u16,
        face: u16,
        viewpoint: EntityId,
    },
    /// End the face and restore the viewpoint visibility captured when the
    /// renderer was scheduled.
    EndFace {
        renderer: RendererId,
        layer: u16,
        face: u16,
        viewpoint: EntityId,
        restore_visible: bool,
    },
}

impl TextureRenderOp {
    /// Execute the operation.
    pub fn apply<R: Rasterizer + ?Sized>(
        self,
        scene: &mut Scene,
        manager: &TextureRendererManager,
        rasterizer: &mut R,
    ) {
        match self {
            Self::BeginFace {
                renderer: id,
                layer,
                face,
                viewpoint,
            } => {
                scene.set_visible_transient(viewpoint, false);
                if let Some(renderer) = manager.get(id) {
                    renderer.begin_render_face(rasterizer, id, layer, face);
                }
            }
            Self::EndFace {
                renderer: id,
                layer,
                face,
                viewpoint,
                restore_visible,
            } => {
                if let Some(renderer) = manager.get(id) {
                    renderer.end_render_face(rasterizer, id, layer, face);
                }
                scene.set_visible_transient(viewpoint, restore_visible);
            }
        }
    }
}
