//! Dynamic texture renderers.
//!
//! A renderer wraps one dynamic texture (a cube map or a planar map) and the
//! viewpoint object it captures around. The set of kinds is closed; kind
//! specific behavior is dispatched with a `match` on [`RendererState`].

mod cube;
mod planar;

use glam::Mat4;
use renderplan_assets::{MaterialTextureId, TextureSource, TextureSourceId};
use renderplan_common::{EntityId, RendererId, Transform};
use serde::{Deserialize, Serialize};

use crate::ops::{Rasterizer, TargetKind, TextureTarget};
use crate::schedule::CameraRenderSchedule;

pub use cube::CubeMap;
pub use planar::PlanarMap;

/// Renderer kind requested when a material uses a dynamic texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    Cube,
    Planar,
}

/// How a renderer's storage layers relate to viewports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerUsage {
    /// One layer serves every viewport.
    Shared,
    /// One layer per viewport, layer index == viewport index.
    PerViewport,
}

/// Kind specific state.
#[derive(Debug, Clone)]
pub enum RendererState {
    Cube(CubeMap),
    Planar(PlanarMap),
}

/// A dynamic texture renderer owned by a [`crate::TextureRendererManager`].
#[derive(Debug, Clone)]
pub struct TextureRenderer {
    state: RendererState,
    texture: TextureSourceId,
    name: String,
    viewpoint: Option<EntityId>,
    ignore_layers: u32,
    lod_factor: f32,
    enabled: bool,
    auto_update: bool,
    force_update: bool,
    clip_start: f32,
    clip_end: f32,
    reload_requested: bool,
    /// Material textures sampling this renderer.
    users: Vec<MaterialTextureId>,
}

impl TextureRenderer {
    /// Create a renderer for `texture` using the capture settings of its
    /// source.
    pub fn new(
        kind: RendererKind,
        texture: TextureSourceId,
        source: &TextureSource,
        viewpoint: Option<EntityId>,
    ) -> Self {
        let settings = source.settings;
        let state = match kind {
            RendererKind::Cube => RendererState::Cube(CubeMap::new()),
            RendererKind::Planar => RendererState::Planar(PlanarMap::new(settings.planar_mode)),
        };
        Self {
            state,
            texture,
            name: source.name.clone(),
            viewpoint,
            ignore_layers: settings.ignore_layers,
            lod_factor: settings.lod_factor,
            enabled: true,
            auto_update: settings.auto_update,
            force_update: true,
            clip_start: settings.clip_start,
            clip_end: settings.clip_end,
            reload_requested: false,
            users: Vec::new(),
        }
    }

    pub fn kind(&self) -> RendererKind {
        match self.state {
            RendererState::Cube(_) => RendererKind::Cube,
            RendererState::Planar(_) => RendererKind::Planar,
        }
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    /// Identity of the underlying texture resource.
    pub fn texture(&self) -> TextureSourceId {
        self.texture
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn users(&self) -> &[MaterialTextureId] {
        &self.users
    }

    pub(crate) fn add_user(&mut self, texture: MaterialTextureId) {
        if !self.users.contains(&texture) {
            self.users.push(texture);
        }
    }

    pub fn viewpoint(&self) -> Option<EntityId> {
        self.viewpoint
    }

    pub fn set_viewpoint(&mut self, viewpoint: Option<EntityId>) {
        self.viewpoint = viewpoint;
    }

    pub fn ignore_layers(&self) -> u32 {
        self.ignore_layers
    }

    pub fn set_ignore_layers(&mut self, layers: u32) {
        self.ignore_layers = layers;
    }

    pub fn lod_factor(&self) -> f32 {
        self.lod_factor
    }

    pub fn set_lod_factor(&mut self, factor: f32) {
        self.lod_factor = factor;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn auto_update(&self) -> bool {
        self.auto_update
    }

    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.auto_update = auto_update;
    }

    /// Request a capture on the next scheduled frame.
    pub fn update(&mut self) {
        self.force_update = true;
    }

    /// True if the texture must be captured this frame. Consumes a pending
    /// update request.
    pub fn need_update(&mut self) -> bool {
        let result = self.auto_update || self.force_update;
        self.force_update = false;
        result
    }

    pub fn clip_start(&self) -> f32 {
        self.clip_start
    }

    pub fn clip_end(&self) -> f32 {
        self.clip_end
    }

    pub fn set_clip_range(&mut self, start: f32, end: f32) {
        self.clip_start = start;
        self.clip_end = end;
        if let RendererState::Cube(cube) = &mut self.state {
            cube.invalidate_projection();
        }
    }

    /// Number of storage layers currently provisioned.
    pub fn layer_count(&self) -> usize {
        match &self.state {
            RendererState::Cube(cube) => cube.layer_count(),
            RendererState::Planar(planar) => planar.layer_count(),
        }
    }

    /// Provision layers for `viewports` viewports.
    pub fn ensure_layers(&mut self, viewports: usize) -> LayerUsage {
        match &mut self.state {
            RendererState::Cube(cube) => cube.ensure_layers(),
            RendererState::Planar(planar) => planar.ensure_layers(viewports),
        }
    }

    pub fn num_faces(&self, layer: u16) -> u16 {
        match &self.state {
            RendererState::Cube(_) => CubeMap::NUM_FACES,
            RendererState::Planar(planar) => planar.num_faces(layer),
        }
    }

    /// Projection used to capture a layer seen from `camera`.
    pub fn projection_matrix(&mut self, camera: &CameraRenderSchedule) -> Mat4 {
        let (start, end) = (self.clip_start, self.clip_end);
        match &mut self.state {
            RendererState::Cube(cube) => cube.projection_matrix(start, end),
            RendererState::Planar(_) => camera.projection,
        }
    }

    /// Camera-to-world transform of a face, or `None` if the face must not
    /// be rendered for this camera.
    pub fn prepare_face(
        &mut self,
        viewpoint: &Transform,
        camera_view: Mat4,
        layer: u16,
        face: u16,
    ) -> Option<Mat4> {
        match &mut self.state {
            RendererState::Cube(_) => Some(CubeMap::face_transform(viewpoint.position, face)),
            RendererState::Planar(planar) => planar.prepare_face(viewpoint, camera_view, layer),
        }
    }

    pub fn begin_render_face<R: Rasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        id: RendererId,
        layer: u16,
        face: u16,
    ) {
        let target = self.target(id, layer, face);
        match &self.state {
            RendererState::Cube(_) => rasterizer.bind_texture_target(target),
            RendererState::Planar(planar) => planar.begin_render_face(rasterizer, target),
        }
    }

    pub fn end_render_face<R: Rasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        id: RendererId,
        layer: u16,
        face: u16,
    ) {
        let target = self.target(id, layer, face);
        match &self.state {
            RendererState::Cube(_) => rasterizer.unbind_texture_target(target),
            RendererState::Planar(planar) => planar.end_render_face(rasterizer, target),
        }
    }

    /// Mark the backing texture for reload.
    pub fn reload_texture(&mut self) {
        self.reload_requested = true;
    }

    pub fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    /// Return and clear the pending reload request.
    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    fn target(&self, id: RendererId, layer: u16, face: u16) -> TextureTarget {
        TextureTarget {
            renderer: id,
            texture: self.texture,
            kind: match self.state {
                RendererState::Cube(_) => TargetKind::CubeFace,
                RendererState::Planar(_) => TargetKind::Planar,
            },
            layer,
            face,
        }
    }
}
