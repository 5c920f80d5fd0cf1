//! Scene management
//!
//! [`Scene`] holds the entities of a level; [`SceneRenderer`] turns one frame
//! of that scene (camera, lights, shadow casters) into uniform data.
//!
//! ## Frame flow
//!
//! ```text
//! Layer::on_render
//!      ↓
//! SceneRenderer::begin_scene(camera)
//!      ↓
//! submit_light / generate_shadow_map
//!      ↓
//! SceneRenderer::end_scene  → camera + light blocks uploaded
//! ```

mod scene_graph;
mod scene_renderer;

pub use scene_graph::{EntityId, MeshComponent, Scene, SceneEntity, SceneRef};
pub use scene_renderer::{
    LightOverflowPolicy, SceneRenderer, SceneRendererConfig, SceneRendererError,
    SceneRendererResult,
};
