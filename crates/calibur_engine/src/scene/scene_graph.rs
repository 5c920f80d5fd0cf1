//! Scene contents
//!
//! A flat list of entities stored in a slot map. Each entity has a transform
//! and optionally a mesh and a light. The renderer reads shadow casters from
//! here; layers collect lights from here to submit each frame.

use std::cell::RefCell;

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Mat4, Transform};
use crate::foundation::memory::Ref;
use crate::render::api::Mesh;
use crate::render::lighting::SceneLightData;

new_key_type! {
    /// Stable handle to an entity in a [`Scene`]
    pub struct EntityId;
}

/// Mesh attached to an entity
#[derive(Debug, Clone)]
pub struct MeshComponent {
    /// Shared mesh
    pub mesh: Ref<dyn Mesh>,
    /// Whether the mesh is drawn into shadow maps
    pub cast_shadows: bool,
}

/// One entity in a scene
#[derive(Debug, Clone)]
pub struct SceneEntity {
    /// Debug name
    pub name: String,
    /// World transform
    pub transform: Transform,
    /// Mesh, if the entity is drawable
    pub mesh: Option<MeshComponent>,
    /// Light, if the entity emits one
    pub light: Option<SceneLightData>,
    /// Hidden entities are skipped by every pass
    pub visible: bool,
}

impl SceneEntity {
    /// Empty visible entity at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            mesh: None,
            light: None,
            visible: true,
        }
    }

    /// Builder-style transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder-style mesh; the mesh casts shadows
    pub fn with_mesh(mut self, mesh: Ref<dyn Mesh>) -> Self {
        self.mesh = Some(MeshComponent { mesh, cast_shadows: true });
        self
    }

    /// Builder-style mesh that does not cast shadows
    pub fn with_mesh_no_shadows(mut self, mesh: Ref<dyn Mesh>) -> Self {
        self.mesh = Some(MeshComponent { mesh, cast_shadows: false });
        self
    }

    /// Builder-style light
    pub fn with_light(mut self, light: impl Into<SceneLightData>) -> Self {
        self.light = Some(light.into());
        self
    }
}

/// Collection of entities rendered together
#[derive(Debug, Default)]
pub struct Scene {
    name: String,
    entities: SlotMap<EntityId, SceneEntity>,
}

/// Scene handle shared between a layer and its renderer
pub type SceneRef = Ref<RefCell<Scene>>;

impl Scene {
    /// Empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: SlotMap::with_key(),
        }
    }

    /// Wrap the scene in a shared handle
    pub fn into_ref(self) -> SceneRef {
        Ref::new(RefCell::new(self))
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an entity
    pub fn spawn(&mut self, entity: SceneEntity) -> EntityId {
        log::trace!("Spawning entity '{}' in scene '{}'", entity.name, self.name);
        self.entities.insert(entity)
    }

    /// Remove an entity, returning it if it existed
    pub fn despawn(&mut self, id: EntityId) -> Option<SceneEntity> {
        self.entities.remove(id)
    }

    /// Look up an entity
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(id)
    }

    /// Look up an entity mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(id)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities with their ids
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &SceneEntity)> {
        self.entities.iter()
    }

    /// Model matrix and mesh of every visible shadow-casting mesh instance
    pub fn shadow_casters(&self) -> impl Iterator<Item = (Mat4, &Ref<dyn Mesh>)> {
        self.entities
            .values()
            .filter(|entity| entity.visible)
            .filter_map(|entity| {
                let component = entity.mesh.as_ref()?;
                component
                    .cast_shadows
                    .then(|| (entity.transform.to_matrix(), &component.mesh))
            })
    }

    /// Lights of visible entities
    ///
    /// Point light positions are taken from the owning entity's transform.
    pub fn lights(&self) -> Vec<SceneLightData> {
        self.entities
            .values()
            .filter(|entity| entity.visible)
            .filter_map(|entity| {
                let light = entity.light.as_ref()?;
                Some(match light {
                    SceneLightData::Point(point) => {
                        let mut point = point.clone();
                        point.position = entity.transform.position;
                        SceneLightData::Point(point)
                    }
                    SceneLightData::Directional(_) => light.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::headless::HeadlessMesh;
    use crate::render::lighting::{DirectionalLight, PointLight};

    fn cube() -> Ref<dyn Mesh> {
        Ref::new(HeadlessMesh::new("cube", 1))
    }

    #[test]
    fn test_shadow_casters_skip_hidden_and_non_casting_meshes() {
        let mut scene = Scene::new("test");
        scene.spawn(SceneEntity::new("a").with_mesh(cube()));
        scene.spawn(SceneEntity::new("b").with_mesh_no_shadows(cube()));
        let hidden = scene.spawn(SceneEntity::new("c").with_mesh(cube()));
        scene.spawn(SceneEntity::new("empty"));
        scene.get_mut(hidden).unwrap().visible = false;

        assert_eq!(scene.shadow_casters().count(), 1);
    }

    #[test]
    fn test_point_lights_follow_entity_transform() {
        let mut scene = Scene::new("test");
        scene.spawn(
            SceneEntity::new("lamp")
                .with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0)))
                .with_light(PointLight::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0, 5.0)),
        );
        scene.spawn(SceneEntity::new("sun").with_light(DirectionalLight::new(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            1.0,
        )));

        let lights = scene.lights();
        assert_eq!(lights.len(), 2);
        let point = lights
            .iter()
            .find_map(|light| match light {
                SceneLightData::Point(point) => Some(point),
                SceneLightData::Directional(_) => None,
            })
            .unwrap();
        assert_eq!(point.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_despawn_invalidates_id() {
        let mut scene = Scene::new("test");
        let id = scene.spawn(SceneEntity::new("a"));
        assert!(scene.despawn(id).is_some());
        assert!(scene.get(id).is_none());
        assert!(scene.is_empty());
    }
}
