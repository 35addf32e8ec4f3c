use renderplan_assets::{MaterialTextureId, TextureSourceId};

/// Errors from renderer registration. Scheduling itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("material texture not found: {0:?}")]
    UnknownMaterialTexture(MaterialTextureId),
    #[error("texture source not found: {0:?}")]
    UnknownTextureSource(TextureSourceId),
}

/// Errors from loading or saving a [`crate::ScheduleConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
