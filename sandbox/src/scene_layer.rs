//! Demo scene: a ground plane, a few cubes, a sun and colored lamps

use calibur_engine::events::{EventDispatcher, KeyPressedEvent};
use calibur_engine::input::KeyCode;
use calibur_engine::prelude::*;
use calibur_engine::scene::EntityId;
use nalgebra::{UnitQuaternion, Vector3};

/// Draws the demo scene through a [`SceneRenderer`]
pub struct SceneLayer {
    scene: SceneRef,
    config: SceneRendererConfig,
    renderer: Option<SceneRenderer>,
    spinner: Option<EntityId>,
    lamps: Vec<EntityId>,
    elapsed: f32,
    paused: bool,
}

impl SceneLayer {
    pub fn new(config: SceneRendererConfig) -> Self {
        Self {
            scene: Scene::new("Sandbox").into_ref(),
            config,
            renderer: None,
            spinner: None,
            lamps: Vec::new(),
            elapsed: 0.0,
            paused: false,
        }
    }

    fn build_scene(&mut self) {
        let plane: Ref<dyn Mesh> = Ref::new(HeadlessMesh::new("plane", 1));
        let cube: Ref<dyn Mesh> = Ref::new(HeadlessMesh::new("cube", 1));

        let mut scene = self.scene.borrow_mut();
        scene.spawn(
            SceneEntity::new("Ground")
                .with_transform(Transform::identity().with_scale(Vec3::new(20.0, 1.0, 20.0)))
                .with_mesh_no_shadows(plane),
        );

        for (i, x) in [-3.0f32, 0.0, 3.0].into_iter().enumerate() {
            let id = scene.spawn(
                SceneEntity::new(format!("Cube {i}"))
                    .with_transform(Transform::from_position(Vec3::new(x, 0.5, 0.0)))
                    .with_mesh(Ref::clone(&cube)),
            );
            if i == 1 {
                self.spinner = Some(id);
            }
        }

        scene.spawn(SceneEntity::new("Sun").with_light(DirectionalLight::new(
            Vec3::new(-0.4, -1.0, -0.3),
            Vec3::new(1.0, 0.95, 0.85),
            2.0,
        )));

        let colors = [
            Vec3::new(1.0, 0.2, 0.2),
            Vec3::new(0.2, 1.0, 0.2),
            Vec3::new(0.2, 0.2, 1.0),
        ];
        for (i, color) in colors.into_iter().enumerate() {
            let id = scene.spawn(
                SceneEntity::new(format!("Lamp {i}"))
                    .with_light(PointLight::new(Vec3::zeros(), color, 3.0, 6.0)),
            );
            self.lamps.push(id);
        }
        log::info!("Built scene with {} entities", scene.len());
    }

    fn camera(&self, aspect_ratio: f32) -> SceneRenderCamera {
        SceneRenderCamera::look_at(
            Vec3::new(0.0, 6.0, 12.0),
            Vec3::zeros(),
            45f32.to_radians(),
            aspect_ratio,
            0.1,
            200.0,
        )
    }
}

impl Layer for SceneLayer {
    fn name(&self) -> &str {
        "SceneLayer"
    }

    fn on_attach(&mut self, ctx: &mut FrameContext<'_>) -> LayerResult {
        self.build_scene();
        let renderer =
            SceneRenderer::new(Ref::clone(&self.scene), ctx.commands, self.config.clone())?;
        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_detach(&mut self) {
        log::info!("SceneLayer detached after {:.1}s", self.elapsed);
    }

    fn on_update(&mut self, _ctx: &mut FrameContext<'_>, ts: TimeStep) -> LayerResult {
        if self.paused {
            return Ok(());
        }
        self.elapsed += ts.seconds();

        let mut scene = self.scene.borrow_mut();
        if let Some(entity) = self.spinner.and_then(|id| scene.get_mut(id)) {
            entity.transform.rotation =
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.elapsed);
        }

        let count = self.lamps.len() as f32;
        for (i, id) in self.lamps.iter().enumerate() {
            if let Some(entity) = scene.get_mut(*id) {
                let angle = self.elapsed + i as f32 * std::f32::consts::TAU / count;
                entity.transform.position = Vec3::new(5.0 * angle.cos(), 2.0, 5.0 * angle.sin());
            }
        }
        Ok(())
    }

    fn on_render(&mut self, ctx: &mut FrameContext<'_>) -> LayerResult {
        let camera = self.camera(ctx.aspect_ratio());
        let Some(renderer) = self.renderer.as_mut() else {
            return Err(LayerError::Custom("rendered before attach".to_string()));
        };

        let lights = renderer.scene().borrow().lights();

        renderer.begin_scene(camera)?;
        for light in &lights {
            renderer.submit_light(light)?;
        }
        for light in &lights {
            if let SceneLightData::Directional(sun) = light {
                if sun.cast_shadows {
                    renderer.generate_shadow_map(light, ctx.commands)?;
                }
            }
        }
        renderer.end_scene()?;

        ctx.commands.clear();
        Ok(())
    }

    fn on_event(&mut self, event: &mut Event) {
        let mut dispatcher = EventDispatcher::new(event);
        dispatcher.dispatch::<KeyPressedEvent, _>(|key| {
            if key.key == KeyCode::P && key.repeat_count == 0 {
                self.paused = !self.paused;
                log::info!("Animation {}", if self.paused { "paused" } else { "resumed" });
                return true;
            }
            false
        });
    }
}
