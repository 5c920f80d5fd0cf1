//! Scene Renderer - per-frame camera, light and shadow uniform orchestration
//!
//! A frame is bracketed by [`SceneRenderer::begin_scene`] and
//! [`SceneRenderer::end_scene`]. Inside the bracket, lights are staged into
//! fixed-capacity blocks and shadow maps may be rendered; `end_scene`
//! uploads everything staged to the GPU in full-block writes.
//!
//! ```text
//! begin_scene(camera) ── submit_light(..)* ── generate_shadow_map(..)* ── end_scene()
//! ```
//!
//! Calls outside the bracket are contract violations. They are always logged
//! and returned as errors; with `strict_contracts` enabled (the default in
//! debug builds) they panic as well.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::memory::Ref;
use crate::render::api::{
    Framebuffer, FramebufferSpec, TextureArray, TextureArraySpec, TextureFormat, UniformBuffer,
};
use crate::render::camera::SceneRenderCamera;
use crate::render::lighting::{
    DirectionalLight, DirectionalLightBlock, DirectionalLightData, LightKind, PointLightBlock,
    PointLightData, SceneLightData,
};
use crate::render::shadow::{cascade_splits, light_space_matrix, MAX_CASCADES};
use crate::render::uniforms::{
    bindings, CameraUniformData, LightMatricesUniformData, TransformUniformData,
};
use crate::render::{RenderCommand, RenderError};
use crate::scene::SceneRef;

/// What to do with lights submitted beyond a block's capacity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightOverflowPolicy {
    /// Treat the extra light as a contract violation
    #[default]
    Reject,
    /// Log a warning and ignore the extra light
    Drop,
}

fn default_strict_contracts() -> bool {
    cfg!(debug_assertions)
}

/// Scene renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRendererConfig {
    /// Width and height of each shadow cascade in texels
    pub shadow_map_resolution: u32,

    /// Number of shadow cascades (1..=4)
    pub cascade_count: usize,

    /// Blend between uniform (0.0) and logarithmic (1.0) cascade splits
    pub cascade_split_lambda: f32,

    /// Behaviour when a light block is full
    pub light_overflow: LightOverflowPolicy,

    /// Extra depth range behind each cascade for off-screen casters
    pub shadow_depth_padding: f32,

    /// Panic on contract violations in addition to returning an error
    #[serde(default = "default_strict_contracts")]
    pub strict_contracts: bool,
}

impl Default for SceneRendererConfig {
    fn default() -> Self {
        Self {
            shadow_map_resolution: 2048,
            cascade_count: MAX_CASCADES,
            cascade_split_lambda: 0.75,
            light_overflow: LightOverflowPolicy::default(),
            shadow_depth_padding: 10.0,
            strict_contracts: default_strict_contracts(),
        }
    }
}

impl SceneRendererConfig {
    /// Check the values are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.shadow_map_resolution == 0 || self.shadow_map_resolution > 16384 {
            return Err(format!(
                "shadow_map_resolution must be in 1..=16384, got {}",
                self.shadow_map_resolution
            ));
        }
        if !(1..=MAX_CASCADES).contains(&self.cascade_count) {
            return Err(format!(
                "cascade_count must be in 1..={MAX_CASCADES}, got {}",
                self.cascade_count
            ));
        }
        if !(0.0..=1.0).contains(&self.cascade_split_lambda) {
            return Err(format!(
                "cascade_split_lambda must be in [0, 1], got {}",
                self.cascade_split_lambda
            ));
        }
        if !(self.shadow_depth_padding >= 0.0) {
            return Err(format!(
                "shadow_depth_padding must not be negative, got {}",
                self.shadow_depth_padding
            ));
        }
        Ok(())
    }
}

/// Scene renderer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneRendererError {
    /// `begin_scene` while a scene is already open
    #[error("begin_scene called while a scene is already in progress")]
    SceneAlreadyBegun,

    /// Operation that requires an open scene
    #[error("{operation} called outside begin_scene/end_scene")]
    SceneNotBegun {
        /// Offending operation
        operation: &'static str,
    },

    /// Light block is full and the overflow policy rejects
    #[error("Too many {kind} lights (capacity {capacity})")]
    LightCapacityExceeded {
        /// Light kind
        kind: LightKind,
        /// Block capacity
        capacity: usize,
    },

    /// Light parameters that would stage NaN or degenerate data
    #[error("Invalid {kind} light: {reason}")]
    InvalidLight {
        /// Light kind
        kind: LightKind,
        /// What is wrong with it
        reason: String,
    },

    /// Light kind without shadow support
    #[error("{0} lights cannot cast shadows")]
    UnsupportedShadowCaster(LightKind),

    /// Camera parameters cannot produce a frustum
    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    /// Unusable configuration
    #[error("Invalid scene renderer configuration: {0}")]
    InvalidConfig(String),

    /// The scene is mutably borrowed elsewhere
    #[error("Scene is already borrowed")]
    SceneBusy,

    /// Backend failure
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for scene renderer operations
pub type SceneRendererResult<T> = Result<T, SceneRendererError>;

/// Per-frame uniform orchestration for one scene
pub struct SceneRenderer {
    scene: SceneRef,
    config: SceneRendererConfig,

    camera_ub: Ref<dyn UniformBuffer>,
    transform_ub: Ref<dyn UniformBuffer>,
    light_matrices_ub: Ref<dyn UniformBuffer>,
    directional_lights_ub: Ref<dyn UniformBuffer>,
    point_lights_ub: Ref<dyn UniformBuffer>,

    shadow_map: Ref<dyn TextureArray>,
    shadow_framebuffer: Ref<dyn Framebuffer>,

    // Some(..) while a scene is open
    scene_camera: Option<SceneRenderCamera>,
    directional_lights: DirectionalLightBlock,
    point_lights: PointLightBlock,
    cascade_splits: Vec<f32>,
}

impl SceneRenderer {
    /// Create the renderer and its GPU resources
    pub fn new(
        scene: SceneRef,
        commands: &mut RenderCommand,
        config: SceneRendererConfig,
    ) -> SceneRendererResult<Self> {
        config.validate().map_err(SceneRendererError::InvalidConfig)?;

        let camera_ub = commands
            .create_uniform_buffer(std::mem::size_of::<CameraUniformData>(), bindings::CAMERA)?;
        let transform_ub = commands.create_uniform_buffer(
            std::mem::size_of::<TransformUniformData>(),
            bindings::TRANSFORM,
        )?;
        let light_matrices_ub = commands.create_uniform_buffer(
            std::mem::size_of::<LightMatricesUniformData>(),
            bindings::LIGHT_MATRICES,
        )?;
        let directional_lights_ub = commands
            .create_uniform_buffer(DirectionalLightBlock::GPU_SIZE, bindings::DIRECTIONAL_LIGHTS)?;
        let point_lights_ub =
            commands.create_uniform_buffer(PointLightBlock::GPU_SIZE, bindings::POINT_LIGHTS)?;

        let resolution = config.shadow_map_resolution;
        let shadow_map = commands.create_texture_array(&TextureArraySpec {
            width: resolution,
            height: resolution,
            layers: config.cascade_count as u32,
            format: TextureFormat::Depth32F,
        })?;
        let shadow_framebuffer = commands.create_framebuffer(&FramebufferSpec {
            width: resolution,
            height: resolution,
            depth_array: Some(Ref::clone(&shadow_map)),
            color_attachment: false,
        })?;

        log::info!(
            "Scene renderer created for '{}' ({} cascades at {resolution}x{resolution})",
            scene.borrow().name(),
            config.cascade_count
        );

        Ok(Self {
            scene,
            config,
            camera_ub,
            transform_ub,
            light_matrices_ub,
            directional_lights_ub,
            point_lights_ub,
            shadow_map,
            shadow_framebuffer,
            scene_camera: None,
            directional_lights: DirectionalLightBlock::new(),
            point_lights: PointLightBlock::new(),
            cascade_splits: Vec::new(),
        })
    }

    /// Open a scene with this frame's camera
    pub fn begin_scene(&mut self, camera: SceneRenderCamera) -> SceneRendererResult<()> {
        if self.scene_camera.is_some() {
            return Err(self.contract_violation(SceneRendererError::SceneAlreadyBegun));
        }
        if let Err(reason) = camera.validate() {
            return Err(self.contract_violation(SceneRendererError::InvalidCamera(reason)));
        }

        log::trace!("begin_scene at {:?}", camera.position);
        self.directional_lights.clear();
        self.point_lights.clear();
        self.cascade_splits.clear();
        self.scene_camera = Some(camera);
        Ok(())
    }

    /// Stage one light for this frame
    pub fn submit_light(&mut self, light: &SceneLightData) -> SceneRendererResult<()> {
        if self.scene_camera.is_none() {
            return Err(self.contract_violation(SceneRendererError::SceneNotBegun {
                operation: "submit_light",
            }));
        }
        if let Err(reason) = light.validate() {
            return Err(self.contract_violation(SceneRendererError::InvalidLight {
                kind: light.kind(),
                reason,
            }));
        }

        let pushed = match light {
            SceneLightData::Directional(light) => self
                .directional_lights
                .push(DirectionalLightData::from(light)),
            SceneLightData::Point(light) => self.point_lights.push(PointLightData::from(light)),
        };

        match pushed {
            Ok(()) => Ok(()),
            Err(full) => {
                let error = SceneRendererError::LightCapacityExceeded {
                    kind: light.kind(),
                    capacity: full.capacity,
                };
                match self.config.light_overflow {
                    LightOverflowPolicy::Drop => {
                        log::warn!("Dropping light: {error}");
                        Ok(())
                    }
                    LightOverflowPolicy::Reject => Err(self.contract_violation(error)),
                }
            }
        }
    }

    /// Stage every light in the scene
    pub fn submit_scene_lights(&mut self) -> SceneRendererResult<()> {
        let lights = self
            .scene
            .try_borrow()
            .map_err(|_| SceneRendererError::SceneBusy)?
            .lights();
        for light in &lights {
            self.submit_light(light)?;
        }
        Ok(())
    }

    /// Render the scene's shadow casters into the cascaded shadow map
    ///
    /// Only directional lights are supported. The framebuffer, viewport and
    /// depth-test state in effect before the call are restored afterwards,
    /// also when drawing fails.
    pub fn generate_shadow_map(
        &mut self,
        light: &SceneLightData,
        commands: &mut RenderCommand,
    ) -> SceneRendererResult<()> {
        let Some(camera) = self.scene_camera.as_ref() else {
            return Err(self.contract_violation(SceneRendererError::SceneNotBegun {
                operation: "generate_shadow_map",
            }));
        };

        let directional = match light {
            SceneLightData::Directional(directional) => directional,
            SceneLightData::Point(_) => {
                let error = SceneRendererError::UnsupportedShadowCaster(LightKind::Point);
                log::error!("{error}");
                return Err(error);
            }
        };
        if !directional.cast_shadows {
            log::trace!("Skipping shadow map for non-casting light");
            return Ok(());
        }
        if let Err(reason) = directional.validate() {
            return Err(self.contract_violation(SceneRendererError::InvalidLight {
                kind: LightKind::Directional,
                reason,
            }));
        }

        let scene = Ref::clone(&self.scene);
        let scene = scene.try_borrow().map_err(|_| SceneRendererError::SceneBusy)?;

        let light_matrices = self.compute_light_matrices(camera, directional)?;
        self.light_matrices_ub
            .set_data(bytemuck::bytes_of(&light_matrices), 0)?;
        self.cascade_splits =
            light_matrices.cascade_splits[..light_matrices.cascade_count as usize].to_vec();

        let previous_viewport = commands.viewport();
        let previous_depth_test = commands.depth_test();
        let resolution = self.config.shadow_map_resolution;

        self.shadow_framebuffer.bind();
        commands.set_viewport(0, 0, resolution, resolution);
        commands.set_depth_test(true);
        commands.clear();

        let mut drawn = 0usize;
        let result = scene.shadow_casters().try_for_each(|(model, mesh)| {
            self.transform_ub
                .set_data(bytemuck::bytes_of(&TransformUniformData::from(&model)), 0)?;
            for submesh in 0..mesh.submesh_count() {
                commands.render_mesh(mesh, submesh);
            }
            drawn += 1;
            Ok::<(), RenderError>(())
        });

        self.shadow_framebuffer.unbind();
        commands.restore_viewport(previous_viewport);
        commands.set_depth_test(previous_depth_test);

        log::trace!("Shadow pass drew {drawn} mesh instances");
        result.map_err(SceneRendererError::from)
    }

    /// Upload staged data and close the scene
    pub fn end_scene(&mut self) -> SceneRendererResult<()> {
        let Some(camera) = self.scene_camera.take() else {
            return Err(self.contract_violation(SceneRendererError::SceneNotBegun {
                operation: "end_scene",
            }));
        };

        let camera_data = CameraUniformData::from(&camera);
        self.camera_ub.set_data(bytemuck::bytes_of(&camera_data), 0)?;
        self.directional_lights_ub
            .set_data(&self.directional_lights.to_bytes(), 0)?;
        self.point_lights_ub.set_data(&self.point_lights.to_bytes(), 0)?;

        log::trace!(
            "end_scene: {} directional, {} point lights",
            self.directional_lights.len(),
            self.point_lights.len()
        );
        Ok(())
    }

    /// Replace the scene drawn by shadow passes
    pub fn set_scene(&mut self, scene: SceneRef) {
        log::debug!("Scene renderer switched to '{}'", scene.borrow().name());
        self.scene = scene;
    }

    /// Scene drawn by shadow passes
    pub fn scene(&self) -> &SceneRef {
        &self.scene
    }

    /// Model matrix block; bound by callers for their own geometry passes
    pub fn transform_ub(&self) -> &Ref<dyn UniformBuffer> {
        &self.transform_ub
    }

    /// Camera block
    pub fn camera_ub(&self) -> &Ref<dyn UniformBuffer> {
        &self.camera_ub
    }

    /// Cascaded shadow map depth texture
    pub fn shadow_map(&self) -> &Ref<dyn TextureArray> {
        &self.shadow_map
    }

    /// Framebuffer the shadow pass renders into
    pub fn shadow_framebuffer(&self) -> &Ref<dyn Framebuffer> {
        &self.shadow_framebuffer
    }

    /// Directional lights staged this frame
    pub fn directional_light_count(&self) -> usize {
        self.directional_lights.len()
    }

    /// Point lights staged this frame
    pub fn point_light_count(&self) -> usize {
        self.point_lights.len()
    }

    /// True between `begin_scene` and `end_scene`
    pub fn is_in_scene(&self) -> bool {
        self.scene_camera.is_some()
    }

    /// Cascade far distances from the last shadow pass
    pub fn cascade_splits(&self) -> &[f32] {
        &self.cascade_splits
    }

    /// Active configuration
    pub fn config(&self) -> &SceneRendererConfig {
        &self.config
    }

    fn compute_light_matrices(
        &self,
        camera: &SceneRenderCamera,
        light: &DirectionalLight,
    ) -> SceneRendererResult<LightMatricesUniformData> {
        let splits = cascade_splits(
            camera.near,
            camera.far,
            self.config.cascade_count,
            self.config.cascade_split_lambda,
        );

        let mut data = LightMatricesUniformData::default();
        let mut cascade_near = camera.near;
        for (index, &cascade_far) in splits.iter().enumerate() {
            let matrix = light_space_matrix(
                camera,
                cascade_near,
                cascade_far,
                &light.direction,
                self.config.shadow_depth_padding,
            )
            .ok_or_else(|| {
                SceneRendererError::InvalidCamera(format!(
                    "cascade {index} ({cascade_near}..{cascade_far}) has a degenerate frustum"
                ))
            })?;
            data.matrices[index] = matrix.into();
            data.cascade_splits[index] = cascade_far;
            cascade_near = cascade_far;
        }
        data.cascade_count = splits.len() as u32;
        Ok(data)
    }

    fn contract_violation(&self, error: SceneRendererError) -> SceneRendererError {
        log::error!("Scene renderer contract violation: {error}");
        assert!(!self.config.strict_contracts, "{error}");
        error
    }
}
