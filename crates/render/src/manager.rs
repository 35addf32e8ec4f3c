//! Texture renderer manager: owns the dynamic texture renderers of a scene
//! and turns them into texture schedule entries each frame.
//!
//! # Invariants
//! - At most one renderer per underlying texture source (merge excepted).
//! - Schedule output follows renderer registration order.
//! - A renderer provisions either one shared layer or one layer per viewport.

use glam::Mat4;
use renderplan_assets::{MaterialTextureId, TextureStore};
use renderplan_common::{EntityId, Frustum, RendererId};
use renderplan_kernel::Scene;
use slotmap::SlotMap;
use std::collections::BTreeMap;

use crate::error::RenderError;
use crate::ops::TextureRenderOp;
use crate::renderer::{LayerUsage, RendererKind, TextureRenderer};
use crate::schedule::{
    CameraRenderSchedule, ClearBuffers, DrawingMode, SceneSchedule, TextureRenderMode,
    TextureRenderSchedule,
};

/// Old handle to new handle, returned by [`TextureRendererManager::merge`].
pub type RendererRemap = BTreeMap<RendererId, RendererId>;

#[derive(Debug, Default)]
pub struct TextureRendererManager {
    renderers: SlotMap<RendererId, TextureRenderer>,
    /// Registration order.
    order: Vec<RendererId>,
}

impl TextureRendererManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: RendererId) -> Option<&TextureRenderer> {
        self.renderers.get(id)
    }

    pub fn get_mut(&mut self, id: RendererId) -> Option<&mut TextureRenderer> {
        self.renderers.get_mut(id)
    }

    /// Renderers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RendererId, &TextureRenderer)> {
        self.order
            .iter()
            .filter_map(|id| self.renderers.get(*id).map(|r| (*id, r)))
    }

    /// Attach the material texture `texture` to a renderer, creating one of
    /// `kind` if no renderer wraps the same texture source yet.
    ///
    /// A shared renderer keeps the viewpoint it was created with; a
    /// different requested viewpoint only produces a warning.
    pub fn add_renderer(
        &mut self,
        kind: RendererKind,
        scene: &Scene,
        textures: &mut TextureStore,
        texture: MaterialTextureId,
        viewpoint: Option<EntityId>,
    ) -> Result<RendererId, RenderError> {
        let material = textures
            .material_texture(texture)
            .ok_or(RenderError::UnknownMaterialTexture(texture))?;
        let source_id = material.source;

        let shared = self
            .iter()
            .find(|(_, r)| r.texture() == source_id)
            .map(|(id, r)| (id, r.viewpoint()));

        if let Some((id, original)) = shared {
            if original != viewpoint {
                tracing::warn!(
                    texture = %material.name,
                    original = viewpoint_name(scene, original),
                    requested = viewpoint_name(scene, viewpoint),
                    "texture renderer uses different viewpoint objects, keeping the original"
                );
            }
            if let Some(renderer) = self.renderers.get_mut(id) {
                renderer.add_user(texture);
            }
            textures.set_renderer(texture, id);
            return Ok(id);
        }

        let source = textures
            .source(source_id)
            .ok_or(RenderError::UnknownTextureSource(source_id))?;
        let mut renderer = TextureRenderer::new(kind, source_id, source, viewpoint);
        renderer.add_user(texture);
        tracing::debug!(name = renderer.name(), ?kind, "registering texture renderer");

        let id = self.renderers.insert(renderer);
        self.order.push(id);
        textures.set_renderer(texture, id);
        Ok(id)
    }

    /// Schedule entries of one renderer for the given viewports.
    ///
    /// `cameras` must be ordered by viewport index. Returns nothing when the
    /// renderer is disabled, has no (resolvable) viewpoint, has no pending
    /// update, or when there is no viewport.
    pub fn schedule_renderer(
        &mut self,
        id: RendererId,
        scene: &Scene,
        cameras: &[&CameraRenderSchedule],
    ) -> Vec<TextureRenderSchedule> {
        let Some(renderer) = self.renderers.get_mut(id) else {
            return Vec::new();
        };
        let Some(viewpoint) = renderer.viewpoint().filter(|_| renderer.enabled()) else {
            tracing::trace!(name = renderer.name(), "renderer disabled or without viewpoint");
            return Vec::new();
        };
        let (Some(viewpoint_trans), Some(visible)) =
            (scene.transform(viewpoint).copied(), scene.visible(viewpoint))
        else {
            tracing::trace!(name = renderer.name(), "viewpoint not in scene");
            return Vec::new();
        };
        if cameras.is_empty() || !renderer.need_update() {
            return Vec::new();
        }

        let visible_layers = !renderer.ignore_layers();
        let lod_factor = renderer.lod_factor();

        let layer_count = match renderer.ensure_layers(cameras.len()) {
            LayerUsage::Shared => 1,
            LayerUsage::PerViewport => cameras.len(),
        };

        let mut textures = Vec::new();
        for (layer, camera) in cameras.iter().take(layer_count).enumerate() {
            let layer = layer as u16;
            let projection = renderer.projection_matrix(camera);

            for face in 0..renderer.num_faces(layer) {
                let Some(cam_trans) =
                    renderer.prepare_face(&viewpoint_trans, camera.view, layer, face)
                else {
                    tracing::trace!(name = renderer.name(), layer, face, "face skipped");
                    continue;
                };
                textures.push(texture_schedule(
                    id,
                    viewpoint,
                    visible,
                    camera,
                    projection,
                    cam_trans,
                    visible_layers,
                    lod_factor,
                    layer,
                    face,
                ));
            }
        }
        textures
    }

    /// Schedule entries of every renderer for a scene, in registration order.
    pub fn schedule_render(
        &mut self,
        scene: &Scene,
        schedule: &SceneSchedule,
    ) -> Vec<TextureRenderSchedule> {
        if self.order.is_empty() {
            return Vec::new();
        }

        let cameras = schedule.cameras_by_index();
        let order = self.order.clone();
        let mut all = Vec::new();
        for id in order {
            all.extend(self.schedule_renderer(id, scene, &cameras));
        }
        all
    }

    /// Move every renderer of `other` into this manager. Renderers are not
    /// deduplicated. Returns the handle remap for the moved renderers; their
    /// material texture users must be re-pointed by the caller.
    pub fn merge(&mut self, other: &mut TextureRendererManager) -> RendererRemap {
        let mut remap = RendererRemap::new();
        for old in std::mem::take(&mut other.order) {
            if let Some(renderer) = other.renderers.remove(old) {
                let new = self.renderers.insert(renderer);
                self.order.push(new);
                remap.insert(old, new);
            }
        }
        other.renderers.clear();
        tracing::debug!(moved = remap.len(), total = self.len(), "merged texture renderers");
        remap
    }

    /// Forget `object` as viewpoint, typically because it left the scene.
    pub fn invalidate_viewpoint(&mut self, object: EntityId) {
        for renderer in self.renderers.values_mut() {
            if renderer.viewpoint() == Some(object) {
                renderer.set_viewpoint(None);
            }
        }
    }

    pub fn reload_textures(&mut self) {
        for renderer in self.renderers.values_mut() {
            renderer.reload_texture();
        }
    }

    /// Renderers whose texture must be reloaded, clearing the requests.
    pub fn take_reload_requests(&mut self) -> Vec<RendererId> {
        self.order
            .iter()
            .copied()
            .filter(|id| {
                self.renderers
                    .get_mut(*id)
                    .is_some_and(TextureRenderer::take_reload_request)
            })
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn texture_schedule(
    renderer: RendererId,
    viewpoint: EntityId,
    visible: bool,
    camera: &CameraRenderSchedule,
    projection: Mat4,
    cam_trans: Mat4,
    visible_layers: u32,
    lod_factor: f32,
    layer: u16,
    face: u16,
) -> TextureRenderSchedule {
    let view = cam_trans.inverse();
    TextureRenderSchedule {
        mode: TextureRenderMode::RENDER_WORLD | TextureRenderMode::UPDATE_LOD,
        clear: ClearBuffers::COLOR | ClearBuffers::DEPTH,
        drawing_mode: DrawingMode::Renderer,
        view,
        projection,
        cam_trans,
        position: cam_trans.w_axis.truncate(),
        frustum: Frustum::from_matrix(projection * view),
        visible_layers,
        lod_factor,
        eye: camera.eye,
        index: layer,
        face,
        bind: TextureRenderOp::BeginFace {
            renderer,
            layer,
            face,
            viewpoint,
        },
        unbind: TextureRenderOp::EndFace {
            renderer,
            layer,
            face,
            viewpoint,
            restore_visible: visible,
        },
    }
}

fn viewpoint_name(scene: &Scene, viewpoint: Option<EntityId>) -> &str {
    viewpoint
        .and_then(|id| scene.object_name(id))
        .unwrap_or("<None>")
}
