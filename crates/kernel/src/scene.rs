use renderplan_common::{EntityId, SceneId, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::camera::Camera;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Object was spawned with the given transform.
    Spawned { id: EntityId, transform: Transform },
    /// Object was despawned.
    Despawned { id: EntityId },
    TransformUpdated {
        id: EntityId,
        old: Transform,
        new: Transform,
    },
    /// Object visibility flag changed.
    VisibilityChanged { id: EntityId, visible: bool },
    CameraAdded { id: EntityId },
    ActiveCameraChanged { id: EntityId },
}

/// Per-object data stored in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectData {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
}

/// The authoritative state of one scene.
///
/// Game objects live in a BTreeMap for deterministic iteration. Cameras are
/// game objects with a [`Camera`] component and keep their registration
/// order, which is the order they are scheduled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    id: SceneId,
    name: String,
    objects: BTreeMap<EntityId, ObjectData>,
    cameras: BTreeMap<EntityId, Camera>,
    camera_order: Vec<EntityId>,
    active_camera: Option<EntityId>,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SceneId::new(),
            name: name.into(),
            objects: BTreeMap::new(),
            cameras: BTreeMap::new(),
            camera_order: Vec::new(),
            active_camera: None,
            event_log: Vec::new(),
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn objects(&self) -> &BTreeMap<EntityId, ObjectData> {
        &self.objects
    }

    /// Spawn a new visible root object. Returns its id.
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        let id = EntityId::new();
        self.objects.insert(
            id,
            ObjectData {
                name: name.into(),
                transform,
                visible: true,
                parent: None,
                children: Vec::new(),
            },
        );
        self.event_log.push(SceneEvent::Spawned { id, transform });
        id
    }

    /// Spawn an object parented to `parent`. Returns `None` if the parent
    /// does not exist.
    pub fn spawn_child(
        &mut self,
        parent: EntityId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Option<EntityId> {
        if !self.objects.contains_key(&parent) {
            return None;
        }
        let id = self.spawn(name, transform);
        if let Some(data) = self.objects.get_mut(&id) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.objects.get_mut(&parent) {
            data.children.push(id);
        }
        Some(id)
    }

    /// Remove an object. Its children become root objects. Returns the data
    /// if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<ObjectData> {
        let data = self.objects.remove(&id)?;
        if let Some(parent) = data.parent.and_then(|p| self.objects.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        for child in &data.children {
            if let Some(c) = self.objects.get_mut(child) {
                c.parent = None;
            }
        }
        if self.cameras.remove(&id).is_some() {
            self.camera_order.retain(|c| *c != id);
            if self.active_camera == Some(id) {
                self.active_camera = None;
            }
        }
        self.event_log.push(SceneEvent::Despawned { id });
        Some(data)
    }

    pub fn get(&self, id: EntityId) -> Option<&ObjectData> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Name of an object, used in diagnostics.
    pub fn object_name(&self, id: EntityId) -> Option<&str> {
        self.objects.get(&id).map(|d| d.name.as_str())
    }

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.objects.get(&id).map(|d| &d.transform)
    }

    /// Update an object's transform and log the change.
    pub fn set_transform(&mut self, id: EntityId, new: Transform) -> bool {
        if let Some(data) = self.objects.get_mut(&id) {
            let old = data.transform;
            data.transform = new;
            self.event_log
                .push(SceneEvent::TransformUpdated { id, old, new });
            true
        } else {
            false
        }
    }

    pub fn visible(&self, id: EntityId) -> Option<bool> {
        self.objects.get(&id).map(|d| d.visible)
    }

    /// Set the visibility of an object, and of all its descendants when
    /// `recursive` is set. Returns false if the object does not exist.
    pub fn set_visible(&mut self, id: EntityId, visible: bool, recursive: bool) -> bool {
        let Some(data) = self.objects.get_mut(&id) else {
            return false;
        };
        data.visible = visible;
        let children = if recursive {
            data.children.clone()
        } else {
            Vec::new()
        };
        self.event_log
            .push(SceneEvent::VisibilityChanged { id, visible });

        for child in children {
            self.set_visible(child, visible, true);
        }
        true
    }

    /// Set the visibility of a single object without recording an event.
    /// Used for transient toggles that are undone within the same frame.
    pub fn set_visible_transient(&mut self, id: EntityId, visible: bool) -> bool {
        match self.objects.get_mut(&id) {
            Some(data) => {
                data.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Spawn a camera object. The first camera added becomes active.
    pub fn add_camera(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        camera: Camera,
    ) -> EntityId {
        let id = self.spawn(name, transform);
        self.cameras.insert(id, camera);
        self.camera_order.push(id);
        self.event_log.push(SceneEvent::CameraAdded { id });
        if self.active_camera.is_none() {
            self.set_active_camera(id);
        }
        id
    }

    pub fn camera(&self, id: EntityId) -> Option<&Camera> {
        self.cameras.get(&id)
    }

    pub fn camera_mut(&mut self, id: EntityId) -> Option<&mut Camera> {
        self.cameras.get_mut(&id)
    }

    /// All camera ids in registration order.
    pub fn cameras(&self) -> &[EntityId] {
        &self.camera_order
    }

    pub fn active_camera(&self) -> Option<EntityId> {
        self.active_camera
    }

    pub fn set_active_camera(&mut self, id: EntityId) -> bool {
        if !self.cameras.contains_key(&id) {
            return false;
        }
        self.active_camera = Some(id);
        self.event_log.push(SceneEvent::ActiveCameraChanged { id });
        true
    }

    /// Cameras drawn this frame: the active camera plus every camera with a
    /// custom viewport, in registration order.
    pub fn rendered_cameras(&self) -> impl Iterator<Item = (EntityId, &Camera, &Transform)> + '_ {
        self.camera_order.iter().filter_map(move |id| {
            let camera = self.cameras.get(id)?;
            if Some(*id) != self.active_camera && camera.viewport.is_none() {
                return None;
            }
            let transform = self.transform(*id)?;
            Some((*id, camera, transform))
        })
    }

    /// Move every object and camera of `other` into this scene. The active
    /// camera of this scene is kept.
    pub fn merge(&mut self, mut other: Scene) {
        tracing::debug!(
            into = %self.name,
            from = %other.name,
            objects = other.objects.len(),
            "merging scene"
        );
        self.objects.append(&mut other.objects);
        self.cameras.append(&mut other.cameras);
        self.camera_order.append(&mut other.camera_order);
        if self.active_camera.is_none() {
            self.active_camera = other.active_camera;
        }
        self.event_log.append(&mut other.event_log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderplan_common::Rect;

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new("empty");
        assert_eq!(s.object_count(), 0);
        assert!(s.active_camera().is_none());
        assert_eq!(s.name(), "empty");
    }

    #[test]
    fn spawn_and_despawn() {
        let mut s = Scene::new("s");
        let id = s.spawn("cube", Transform::default());
        assert_eq!(s.object_count(), 1);
        assert_eq!(s.object_name(id), Some("cube"));
        assert_eq!(s.visible(id), Some(true));

        assert!(s.despawn(id).is_some());
        assert_eq!(s.object_count(), 0);
        assert!(s.despawn(id).is_none());
    }

    #[test]
    fn non_recursive_visibility_leaves_children() {
        let mut s = Scene::new("s");
        let parent = s.spawn("mirror", Transform::default());
        let child = s.spawn_child(parent, "frame", Transform::default()).unwrap();

        s.set_visible(parent, false, false);
        assert_eq!(s.visible(parent), Some(false));
        assert_eq!(s.visible(child), Some(true));

        s.set_visible(parent, false, true);
        assert_eq!(s.visible(child), Some(false));
    }

    #[test]
    fn despawn_detaches_hierarchy() {
        let mut s = Scene::new("s");
        let parent = s.spawn("parent", Transform::default());
        let child = s.spawn_child(parent, "child", Transform::default()).unwrap();
        s.despawn(parent);
        assert!(s.get(child).unwrap().parent.is_none());
        assert!(s.spawn_child(parent, "orphan", Transform::default()).is_none());
    }

    #[test]
    fn first_camera_becomes_active() {
        let mut s = Scene::new("s");
        let a = s.add_camera("a", Transform::default(), Camera::default());
        let b = s.add_camera("b", Transform::default(), Camera::default());
        assert_eq!(s.active_camera(), Some(a));
        assert_eq!(s.cameras(), &[a, b]);
        assert!(s.set_active_camera(b));
        assert!(!s.set_active_camera(EntityId::new()));
    }

    #[test]
    fn rendered_cameras_are_active_or_viewport() {
        let mut s = Scene::new("s");
        let main = s.add_camera("main", Transform::default(), Camera::default());
        let _hidden = s.add_camera("hidden", Transform::default(), Camera::default());
        let minimap = s.add_camera(
            "minimap",
            Transform::default(),
            Camera::default().with_viewport(Rect::new(0, 0, 100, 100)),
        );

        let ids: Vec<EntityId> = s.rendered_cameras().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec![main, minimap]);
    }

    #[test]
    fn despawning_active_camera_clears_it() {
        let mut s = Scene::new("s");
        let cam = s.add_camera("cam", Transform::default(), Camera::default());
        s.despawn(cam);
        assert!(s.active_camera().is_none());
        assert!(s.cameras().is_empty());
    }

    #[test]
    fn events_are_recorded() {
        let mut s = Scene::new("s");
        let id = s.spawn("obj", Transform::default());
        s.set_visible(id, false, false);
        s.set_transform(id, Transform::from_position(glam::Vec3::X));
        s.despawn(id);
        assert_eq!(s.events().len(), 4);
        assert_eq!(
            s.events()[1],
            SceneEvent::VisibilityChanged { id, visible: false }
        );
        assert_eq!(s.drain_events().len(), 4);
        assert!(s.events().is_empty());
    }

    #[test]
    fn transient_visibility_is_not_logged() {
        let mut s = Scene::new("s");
        let parent = s.spawn("probe", Transform::default());
        let child = s.spawn_child(parent, "halo", Transform::default()).unwrap();
        s.drain_events();

        assert!(s.set_visible_transient(parent, false));
        assert_eq!(s.visible(parent), Some(false));
        assert_eq!(s.visible(child), Some(true));
        assert!(s.set_visible_transient(parent, true));
        assert!(s.events().is_empty());
        assert!(!s.set_visible_transient(EntityId::new(), false));
    }

    #[test]
    fn merge_moves_objects_and_cameras() {
        let mut a = Scene::new("a");
        let cam_a = a.add_camera("cam_a", Transform::default(), Camera::default());
        let mut b = Scene::new("b");
        b.spawn("obj", Transform::default());
        let cam_b = b.add_camera("cam_b", Transform::default(), Camera::default());

        a.merge(b);
        assert_eq!(a.object_count(), 3);
        assert_eq!(a.cameras(), &[cam_a, cam_b]);
        assert_eq!(a.active_camera(), Some(cam_a));
    }
}
