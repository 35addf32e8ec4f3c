//! Texture assets: content-addressed texture sources and the material
//! texture slots that sample them.
//!
//! Several materials may sample the same texture source. Dynamic texture
//! renderers are keyed by the source, so every material texture sharing a
//! source ends up pointing at the same renderer.

use renderplan_common::RendererId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Content-addressed identity of an underlying texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureSourceId(pub u64);

/// Handle to a material texture slot in a [`TextureStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialTextureId(pub u32);

/// Which side of a planar map's plane is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanarMode {
    #[default]
    Reflection,
    Refraction,
}

/// Capture settings stored with a texture source, read when a dynamic
/// renderer is created for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTextureSettings {
    pub clip_start: f32,
    pub clip_end: f32,
    pub lod_factor: f32,
    /// Object layers hidden from the capture.
    pub ignore_layers: u32,
    /// Re-render every frame instead of on request.
    pub auto_update: bool,
    pub planar_mode: PlanarMode,
}

impl Default for RenderTextureSettings {
    fn default() -> Self {
        Self {
            clip_start: 0.1,
            clip_end: 100.0,
            lod_factor: 1.0,
            ignore_layers: 0,
            auto_update: true,
            planar_mode: PlanarMode::Reflection,
        }
    }
}

/// An underlying texture resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureSource {
    pub name: String,
    pub settings: RenderTextureSettings,
}

/// A material's use of a texture source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialTexture {
    pub name: String,
    pub source: TextureSourceId,
    /// Renderer producing this texture, assigned at scene setup.
    #[serde(skip)]
    pub renderer: Option<RendererId>,
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("texture source not found: {0:?}")]
    SourceNotFound(TextureSourceId),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Registry of texture sources and material texture slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureStore {
    sources: BTreeMap<TextureSourceId, TextureSource>,
    material_textures: Vec<MaterialTexture>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture source and return its id. Registering the same
    /// name twice yields the same id and keeps the first settings.
    pub fn register_source(
        &mut self,
        name: impl Into<String>,
        settings: RenderTextureSettings,
    ) -> TextureSourceId {
        let name = name.into();
        let id = content_hash(&name);
        self.sources.entry(id).or_insert_with(|| {
            tracing::debug!(%name, "registered texture source");
            TextureSource { name, settings }
        });
        id
    }

    pub fn source(&self, id: TextureSourceId) -> Option<&TextureSource> {
        self.sources.get(&id)
    }

    /// Add a material texture slot sampling `source`.
    pub fn add_material_texture(
        &mut self,
        name: impl Into<String>,
        source: TextureSourceId,
    ) -> Result<MaterialTextureId, AssetError> {
        if !self.sources.contains_key(&source) {
            return Err(AssetError::SourceNotFound(source));
        }
        let id = MaterialTextureId(self.material_textures.len() as u32);
        self.material_textures.push(MaterialTexture {
            name: name.into(),
            source,
            renderer: None,
        });
        Ok(id)
    }

    pub fn material_texture(&self, id: MaterialTextureId) -> Option<&MaterialTexture> {
        self.material_textures.get(id.0 as usize)
    }

    /// Point a material texture at a renderer. Returns false for unknown ids.
    pub fn set_renderer(&mut self, id: MaterialTextureId, renderer: RendererId) -> bool {
        match self.material_textures.get_mut(id.0 as usize) {
            Some(texture) => {
                texture.renderer = Some(renderer);
                true
            }
            None => false,
        }
    }

    pub fn material_textures(&self) -> impl Iterator<Item = (MaterialTextureId, &MaterialTexture)> {
        self.material_textures
            .iter()
            .enumerate()
            .map(|(i, t)| (MaterialTextureId(i as u32), t))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Save the store to a JSON file. Renderer assignments are not saved.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let store: Self = serde_json::from_reader(file)?;
        Ok(store)
    }
}

fn content_hash(name: &str) -> TextureSourceId {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    TextureSourceId(u64::from_le_bytes(bytes))
}

pub fn crate_info() -> &'static str {
    "renderplan-assets v0.1.0"
}
