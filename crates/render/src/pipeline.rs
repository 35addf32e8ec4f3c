//! Per-frame entry point tying the schedule builder to the texture renderer
//! managers of each scene.

use renderplan_assets::{MaterialTextureId, TextureStore};
use renderplan_common::{EntityId, RendererId, SceneId};
use renderplan_kernel::Scene;
use std::collections::BTreeMap;

use crate::builder::ScheduleBuilder;
use crate::config::ScheduleConfig;
use crate::error::RenderError;
use crate::manager::{RendererRemap, TextureRendererManager};
use crate::renderer::{RendererKind, TextureRenderer};
use crate::schedule::FrameSchedule;

#[derive(Debug, Default)]
pub struct RenderPipeline {
    builder: ScheduleBuilder,
    managers: BTreeMap<SceneId, TextureRendererManager>,
}

impl RenderPipeline {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            builder: ScheduleBuilder::new(config),
            managers: BTreeMap::new(),
        }
    }

    pub fn builder(&self) -> &ScheduleBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut ScheduleBuilder {
        &mut self.builder
    }

    pub fn manager(&self, scene: SceneId) -> Option<&TextureRendererManager> {
        self.managers.get(&scene)
    }

    pub fn manager_mut(&mut self, scene: SceneId) -> Option<&mut TextureRendererManager> {
        self.managers.get_mut(&scene)
    }

    /// Register a texture renderer in the manager of `scene`, creating the
    /// manager on first use.
    pub fn add_renderer(
        &mut self,
        kind: RendererKind,
        scene: &Scene,
        textures: &mut TextureStore,
        texture: MaterialTextureId,
        viewpoint: Option<EntityId>,
    ) -> Result<RendererId, RenderError> {
        self.managers
            .entry(scene.id())
            .or_default()
            .add_renderer(kind, scene, textures, texture, viewpoint)
    }

    /// Build the frame schedule of `scenes` and fill in each scene's texture
    /// captures.
    pub fn schedule_frame(&mut self, scenes: &[Scene]) -> FrameSchedule {
        let _span = tracing::info_span!("schedule_frame", scenes = scenes.len()).entered();

        let mut schedule = self.builder.build(scenes);
        for (scene_schedule, scene) in schedule.scenes.iter_mut().zip(scenes) {
            if let Some(manager) = self.managers.get_mut(&scene.id()) {
                let textures = manager.schedule_render(scene, scene_schedule);
                scene_schedule.textures = textures;
            }
        }

        tracing::debug!(
            frames = schedule.frames.len(),
            cameras = schedule.camera_count(),
            textures = schedule.texture_count(),
            "frame scheduled"
        );
        schedule
    }

    /// Move `from` into `into`, texture renderers included, and re-point the
    /// material textures of `textures` at the moved renderers.
    pub fn merge_scenes(
        &mut self,
        into: &mut Scene,
        from: Scene,
        textures: &mut TextureStore,
    ) -> RendererRemap {
        let remap = match self.managers.remove(&from.id()) {
            Some(mut other) => self
                .managers
                .entry(into.id())
                .or_default()
                .merge(&mut other),
            None => RendererRemap::new(),
        };
        if let Some(manager) = self.managers.get(&into.id()) {
            for new in remap.values() {
                let users = manager.get(*new).map(TextureRenderer::users).unwrap_or_default();
                for user in users {
                    textures.set_renderer(*user, *new);
                }
            }
        }
        into.merge(from);
        remap
    }

    /// Detach `object` from every renderer of `scene` that uses it as
    /// viewpoint.
    pub fn invalidate_viewpoint(&mut self, scene: SceneId, object: EntityId) {
        if let Some(manager) = self.managers.get_mut(&scene) {
            manager.invalidate_viewpoint(object);
        }
    }

    pub fn reload_textures(&mut self) {
        for manager in self.managers.values_mut() {
            manager.reload_textures();
        }
    }

    /// Drop the manager of a scene that is no longer rendered.
    pub fn remove_scene(&mut self, scene: SceneId) -> Option<TextureRendererManager> {
        self.managers.remove(&scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use renderplan_assets::RenderTextureSettings;
    use renderplan_common::{StereoMode, Transform};
    use renderplan_kernel::Camera;

    fn scene(name: &str) -> (Scene, EntityId) {
        let mut scene = Scene::new(name);
        scene.add_camera(
            "cam",
            Transform::from_position(Vec3::new(0.0, 0.0, 5.0)),
            Camera::default(),
        );
        let probe = scene.spawn("probe", Transform::default());
        (scene, probe)
    }

    fn texture(store: &mut TextureStore, name: &str) -> MaterialTextureId {
        let source = store.register_source(name, RenderTextureSettings::default());
        store.add_material_texture(name, source).expect("source")
    }

    #[test]
    fn scenes_without_renderers_have_no_textures() {
        let (a, _) = scene("a");
        let (b, _) = scene("b");
        let mut pipeline = RenderPipeline::default();
        let schedule = pipeline.schedule_frame(&[a, b]);
        assert_eq!(schedule.scenes.len(), 2);
        assert_eq!(schedule.texture_count(), 0);
        assert_eq!(schedule.camera_count(), 2);
    }

    #[test]
    fn textures_land_in_their_scene() {
        let (a, probe) = scene("a");
        let (b, _) = scene("b");
        let mut store = TextureStore::new();
        let env = texture(&mut store, "env");

        let mut pipeline = RenderPipeline::new(ScheduleConfig {
            stereo_mode: StereoMode::QuadBuffered,
            ..ScheduleConfig::default()
        });
        pipeline
            .add_renderer(RendererKind::Planar, &a, &mut store, env, Some(probe))
            .expect("texture");

        let schedule = pipeline.schedule_frame(&[a, b]);
        // One layer per eye camera.
        assert_eq!(schedule.scenes[0].textures.len(), 2);
        assert!(schedule.scenes[1].textures.is_empty());
        assert_eq!(schedule.camera_count(), 4);
    }

    #[test]
    fn merge_scenes_moves_renderers_and_objects() {
        let (mut a, probe_a) = scene("a");
        let (b, probe_b) = scene("b");
        let mut store = TextureStore::new();
        let env = texture(&mut store, "env");
        let water = texture(&mut store, "water");

        let mut pipeline = RenderPipeline::default();
        pipeline
            .add_renderer(RendererKind::Cube, &a, &mut store, env, Some(probe_a))
            .expect("texture");
        let old = pipeline
            .add_renderer(RendererKind::Planar, &b, &mut store, water, Some(probe_b))
            .expect("texture");
        let b_id = b.id();

        let remap = pipeline.merge_scenes(&mut a, b, &mut store);
        assert_eq!(remap.len(), 1);
        assert!(pipeline.manager(b_id).is_none());
        assert_eq!(pipeline.manager(a.id()).map(TextureRendererManager::len), Some(2));
        assert!(a.contains(probe_b));

        let new = remap[&old];
        let slot = store.material_texture(water).and_then(|t| t.renderer);
        assert_eq!(slot, Some(new));
        // Slots of the destination scene keep their renderer even when the
        // moved renderer's old handle collides with theirs.
        let env_renderer = store.material_texture(env).and_then(|t| t.renderer);
        assert_ne!(env_renderer, Some(new));
        let env_kind = env_renderer
            .and_then(|id| pipeline.manager(a.id())?.get(id))
            .map(TextureRenderer::kind);
        assert_eq!(env_kind, Some(RendererKind::Cube));

        // The merged probe resolves in the destination scene.
        let schedule = pipeline.schedule_frame(std::slice::from_ref(&a));
        assert_eq!(schedule.texture_count(), 6 + 1);
    }

    #[test]
    fn invalidate_and_reload_forward_to_managers() {
        let (a, probe) = scene("a");
        let mut store = TextureStore::new();
        let env = texture(&mut store, "env");
        let mut pipeline = RenderPipeline::default();
        let id = pipeline
            .add_renderer(RendererKind::Cube, &a, &mut store, env, Some(probe))
            .expect("texture");

        pipeline.invalidate_viewpoint(a.id(), probe);
        let viewpoint = pipeline
            .manager(a.id())
            .and_then(|m| m.get(id))
            .and_then(|r| r.viewpoint());
        assert_eq!(viewpoint, None);

        pipeline.reload_textures();
        let requests = pipeline
            .manager_mut(a.id())
            .map(TextureRendererManager::take_reload_requests);
        assert_eq!(requests, Some(vec![id]));
    }
}
