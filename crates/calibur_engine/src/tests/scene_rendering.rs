//! Scene renderer bracket, light staging and shadow pass against the
//! recording backend

use crate::foundation::math::{Transform, Vec3};
use crate::foundation::memory::Ref;
use crate::render::api::Mesh;
use crate::render::lighting::{
    DirectionalLight, DirectionalLightBlock, PointLight, PointLightBlock, SceneLightData,
    MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS,
};
use crate::render::uniforms::{bindings, CameraUniformData, LightMatricesUniformData};
use crate::render::{
    HeadlessMesh, HeadlessProbe, HeadlessRendererApi, LightKind, RecordedCommand, RenderCommand,
    SceneRenderCamera, Viewport,
};
use crate::scene::{
    LightOverflowPolicy, Scene, SceneEntity, SceneRef, SceneRenderer, SceneRendererConfig,
    SceneRendererError,
};

struct Fixture {
    renderer: SceneRenderer,
    commands: RenderCommand,
    probe: HeadlessProbe,
    scene: SceneRef,
}

fn relaxed_config() -> SceneRendererConfig {
    SceneRendererConfig {
        shadow_map_resolution: 512,
        cascade_count: 3,
        strict_contracts: false,
        ..SceneRendererConfig::default()
    }
}

fn fixture(config: SceneRendererConfig) -> Fixture {
    let api = HeadlessRendererApi::new();
    let probe = api.probe();
    let mut commands = RenderCommand::new(Box::new(api));

    let ground: Ref<dyn Mesh> = Ref::new(HeadlessMesh::new("ground", 1));
    let cube: Ref<dyn Mesh> = Ref::new(HeadlessMesh::new("cube", 2));
    let glass: Ref<dyn Mesh> = Ref::new(HeadlessMesh::new("glass", 1));

    let mut scene = Scene::new("test scene");
    scene.spawn(SceneEntity::new("ground").with_mesh(ground));
    scene.spawn(
        SceneEntity::new("cube")
            .with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
            .with_mesh(cube),
    );
    scene.spawn(SceneEntity::new("glass").with_mesh_no_shadows(glass));
    let scene = scene.into_ref();

    let renderer = SceneRenderer::new(Ref::clone(&scene), &mut commands, config).unwrap();
    probe.clear();
    Fixture {
        renderer,
        commands,
        probe,
        scene,
    }
}

fn camera() -> SceneRenderCamera {
    SceneRenderCamera::look_at(
        Vec3::new(0.0, 4.0, 8.0),
        Vec3::zeros(),
        45f32.to_radians(),
        16.0 / 9.0,
        0.1,
        100.0,
    )
}

fn sun(x: f32) -> SceneLightData {
    DirectionalLight::new(Vec3::new(x, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0).into()
}

fn lamp(i: usize) -> SceneLightData {
    PointLight::new(Vec3::new(i as f32, 1.0, 0.0), Vec3::new(1.0, 0.5, 0.2), 2.0, 5.0).into()
}

#[test]
fn test_directional_lights_uploaded_in_submission_order() {
    let mut f = fixture(relaxed_config());

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer.submit_light(&sun(0.0)).unwrap();
    f.renderer.submit_light(&sun(1.0)).unwrap();
    f.renderer.end_scene().unwrap();

    let bytes = f.probe.uniform_data(bindings::DIRECTIONAL_LIGHTS).unwrap();
    assert_eq!(bytes.len(), DirectionalLightBlock::GPU_SIZE);
    assert_eq!(DirectionalLightBlock::count_from_bytes(&bytes), Some(2));

    let first = DirectionalLightBlock::entry_from_bytes(&bytes, 0).unwrap();
    let second = DirectionalLightBlock::entry_from_bytes(&bytes, 1).unwrap();
    assert_eq!(first.direction[0], 0.0);
    assert!(second.direction[0] > 0.0);
    assert_eq!(f.probe.upload_count(bindings::DIRECTIONAL_LIGHTS), 1);
    assert_eq!(f.probe.upload_count(bindings::POINT_LIGHTS), 1);
}

#[test]
fn test_end_scene_uploads_camera_block() {
    let mut f = fixture(relaxed_config());
    let cam = camera();

    f.renderer.begin_scene(cam.clone()).unwrap();
    f.renderer.end_scene().unwrap();

    let bytes = f.probe.uniform_data(bindings::CAMERA).unwrap();
    let data: CameraUniformData = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(data.clip, [0.1, 100.0, cam.fov, cam.aspect_ratio]);
    assert_eq!(data.position, [0.0, 4.0, 8.0, 1.0]);
    assert!(!f.renderer.is_in_scene());
}

#[test]
fn test_overflow_with_drop_policy_is_clamped() {
    let mut f = fixture(SceneRendererConfig {
        light_overflow: LightOverflowPolicy::Drop,
        ..relaxed_config()
    });

    f.renderer.begin_scene(camera()).unwrap();
    for i in 0..MAX_POINT_LIGHTS + 3 {
        f.renderer.submit_light(&lamp(i)).unwrap();
    }
    for i in 0..MAX_DIRECTIONAL_LIGHTS + 2 {
        f.renderer.submit_light(&sun(i as f32)).unwrap();
    }
    assert_eq!(f.renderer.point_light_count(), MAX_POINT_LIGHTS);
    assert_eq!(f.renderer.directional_light_count(), MAX_DIRECTIONAL_LIGHTS);
    f.renderer.end_scene().unwrap();

    let bytes = f.probe.uniform_data(bindings::POINT_LIGHTS).unwrap();
    assert_eq!(bytes.len(), PointLightBlock::GPU_SIZE);
    assert_eq!(PointLightBlock::count_from_bytes(&bytes), Some(MAX_POINT_LIGHTS as u32));
    let last = PointLightBlock::entry_from_bytes(&bytes, MAX_POINT_LIGHTS - 1).unwrap();
    assert_eq!(last.position[0], (MAX_POINT_LIGHTS - 1) as f32);
}

#[test]
fn test_overflow_with_reject_policy_errors_and_keeps_count() {
    let mut f = fixture(relaxed_config());

    f.renderer.begin_scene(camera()).unwrap();
    for i in 0..MAX_DIRECTIONAL_LIGHTS {
        f.renderer.submit_light(&sun(i as f32)).unwrap();
    }
    let error = f.renderer.submit_light(&sun(9.0)).unwrap_err();

    assert_eq!(
        error,
        SceneRendererError::LightCapacityExceeded {
            kind: LightKind::Directional,
            capacity: MAX_DIRECTIONAL_LIGHTS,
        }
    );
    assert_eq!(f.renderer.directional_light_count(), MAX_DIRECTIONAL_LIGHTS);
    assert!(f.renderer.is_in_scene());
}

#[test]
fn test_submit_outside_bracket_is_rejected() {
    let mut f = fixture(relaxed_config());

    assert_eq!(
        f.renderer.submit_light(&sun(0.0)),
        Err(SceneRendererError::SceneNotBegun { operation: "submit_light" })
    );

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer.end_scene().unwrap();

    assert!(matches!(
        f.renderer.submit_light(&lamp(0)),
        Err(SceneRendererError::SceneNotBegun { .. })
    ));
    assert!(matches!(
        f.renderer.generate_shadow_map(&sun(0.0), &mut f.commands),
        Err(SceneRendererError::SceneNotBegun { operation: "generate_shadow_map" })
    ));
    assert_eq!(f.renderer.point_light_count(), 0);
}

#[test]
fn test_bracket_must_alternate() {
    let mut f = fixture(relaxed_config());

    assert_eq!(
        f.renderer.end_scene(),
        Err(SceneRendererError::SceneNotBegun { operation: "end_scene" })
    );
    f.renderer.begin_scene(camera()).unwrap();
    assert_eq!(
        f.renderer.begin_scene(camera()),
        Err(SceneRendererError::SceneAlreadyBegun)
    );
    // The original bracket is still open
    assert!(f.renderer.end_scene().is_ok());
}

#[test]
fn test_begin_scene_resets_staged_lights() {
    let mut f = fixture(relaxed_config());

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer.submit_light(&lamp(0)).unwrap();
    f.renderer.end_scene().unwrap();

    f.renderer.begin_scene(camera()).unwrap();
    assert_eq!(f.renderer.point_light_count(), 0);
    f.renderer.end_scene().unwrap();

    let bytes = f.probe.uniform_data(bindings::POINT_LIGHTS).unwrap();
    assert_eq!(PointLightBlock::count_from_bytes(&bytes), Some(0));
}

#[test]
#[should_panic(expected = "submit_light called outside begin_scene/end_scene")]
fn test_strict_contracts_panic() {
    let mut f = fixture(SceneRendererConfig {
        strict_contracts: true,
        ..relaxed_config()
    });
    let _ = f.renderer.submit_light(&sun(0.0));
}

#[test]
fn test_shadow_pass_restores_framebuffer_and_viewport() {
    let mut f = fixture(relaxed_config());
    f.commands.set_viewport(0, 0, 1280, 720);
    f.commands.set_depth_test(false);
    f.probe.clear();

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer
        .generate_shadow_map(&sun(0.3), &mut f.commands)
        .unwrap();
    f.renderer.end_scene().unwrap();

    assert_eq!(f.commands.viewport(), Viewport::from_size(1280, 720));
    assert!(!f.commands.depth_test());

    let shadow_pass: Vec<RecordedCommand> = f
        .probe
        .commands()
        .into_iter()
        .filter(|command| !matches!(command, RecordedCommand::UploadUniform { .. }))
        .take(10)
        .collect();
    assert_eq!(
        shadow_pass,
        vec![
            RecordedCommand::BindFramebuffer(1),
            RecordedCommand::SetViewport(Viewport::from_size(512, 512)),
            RecordedCommand::SetDepthTest(true),
            RecordedCommand::Clear,
            RecordedCommand::RenderMesh { mesh: "ground".to_string(), submesh: 0 },
            RecordedCommand::RenderMesh { mesh: "cube".to_string(), submesh: 0 },
            RecordedCommand::RenderMesh { mesh: "cube".to_string(), submesh: 1 },
            RecordedCommand::UnbindFramebuffer(1),
            RecordedCommand::SetViewport(Viewport::from_size(1280, 720)),
            RecordedCommand::SetDepthTest(false),
        ]
    );
    // One model matrix per shadow-casting instance
    assert_eq!(f.probe.upload_count(bindings::TRANSFORM), 2);
}

#[test]
fn test_shadow_pass_uploads_cascades() {
    let mut f = fixture(relaxed_config());

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer
        .generate_shadow_map(&sun(-0.5), &mut f.commands)
        .unwrap();
    f.renderer.end_scene().unwrap();

    let bytes = f.probe.uniform_data(bindings::LIGHT_MATRICES).unwrap();
    let data: LightMatricesUniformData = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(data.cascade_count, 3);
    assert_eq!(data.cascade_splits[2], 100.0);
    assert_eq!(data.cascade_splits[3], 0.0);
    assert!(data.cascade_splits[0] < data.cascade_splits[1]);
    assert_eq!(f.renderer.cascade_splits(), &data.cascade_splits[..3]);
    assert_eq!(f.renderer.shadow_map().spec().layers, 3);
}

#[test]
fn test_point_lights_cannot_cast_shadows() {
    let mut f = fixture(relaxed_config());

    f.renderer.begin_scene(camera()).unwrap();
    assert_eq!(
        f.renderer.generate_shadow_map(&lamp(0), &mut f.commands),
        Err(SceneRendererError::UnsupportedShadowCaster(LightKind::Point))
    );
    assert!(f.probe.commands().is_empty());
}

#[test]
fn test_non_casting_light_skips_shadow_pass() {
    let mut f = fixture(relaxed_config());
    let light: SceneLightData = DirectionalLight::new(Vec3::new(0.0, -1.0, 0.0), Vec3::zeros(), 1.0)
        .with_shadows(false)
        .into();

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer.generate_shadow_map(&light, &mut f.commands).unwrap();

    assert!(f.probe.commands().is_empty());
}

#[test]
fn test_borrowed_scene_reports_busy() {
    let mut f = fixture(relaxed_config());

    f.renderer.begin_scene(camera()).unwrap();
    let _guard = f.scene.borrow_mut();
    assert_eq!(
        f.renderer.generate_shadow_map(&sun(0.0), &mut f.commands),
        Err(SceneRendererError::SceneBusy)
    );
    // Nothing from the aborted pass reaches the GPU
    assert_eq!(f.probe.upload_count(bindings::LIGHT_MATRICES), 0);
    assert!(f.renderer.cascade_splits().is_empty());
    assert!(f.probe.commands().is_empty());
}

#[test]
fn test_zero_direction_light_is_rejected() {
    let mut f = fixture(relaxed_config());
    let light: SceneLightData =
        DirectionalLight::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0).into();
    let SceneLightData::Directional(directional) = &light else {
        unreachable!()
    };
    assert!(directional.direction.iter().all(|c| c.is_finite()));

    f.renderer.begin_scene(camera()).unwrap();
    assert!(matches!(
        f.renderer.submit_light(&light),
        Err(SceneRendererError::InvalidLight { kind: LightKind::Directional, .. })
    ));
    assert_eq!(f.renderer.directional_light_count(), 0);

    assert!(matches!(
        f.renderer.generate_shadow_map(&light, &mut f.commands),
        Err(SceneRendererError::InvalidLight { kind: LightKind::Directional, .. })
    ));
    assert_eq!(f.probe.upload_count(bindings::LIGHT_MATRICES), 0);
    assert!(f.probe.commands().is_empty());
    f.renderer.end_scene().unwrap();
}

#[test]
fn test_point_light_without_radius_is_rejected() {
    let mut f = fixture(relaxed_config());
    let light: SceneLightData =
        PointLight::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0, 0.0).into();

    f.renderer.begin_scene(camera()).unwrap();
    assert!(matches!(
        f.renderer.submit_light(&light),
        Err(SceneRendererError::InvalidLight { kind: LightKind::Point, .. })
    ));
    assert_eq!(f.renderer.point_light_count(), 0);
}

#[test]
fn test_scene_lights_are_submitted_from_entities() {
    let mut f = fixture(relaxed_config());
    f.scene
        .borrow_mut()
        .spawn(SceneEntity::new("lamp").with_light(lamp(3)));

    f.renderer.begin_scene(camera()).unwrap();
    f.renderer.submit_scene_lights().unwrap();
    assert_eq!(f.renderer.point_light_count(), 1);
    f.renderer.end_scene().unwrap();
}

#[test]
fn test_invalid_config_is_rejected() {
    let api = HeadlessRendererApi::new();
    let mut commands = RenderCommand::new(Box::new(api));
    let result = SceneRenderer::new(
        Scene::new("empty").into_ref(),
        &mut commands,
        SceneRendererConfig {
            cascade_count: 0,
            ..relaxed_config()
        },
    );
    assert!(matches!(result, Err(SceneRendererError::InvalidConfig(_))));
}
