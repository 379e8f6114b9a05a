//! Render module
//!
//! Per-frame orchestration that turns a scene into ordered draw calls:
//! traversal and culling, instruction ordering, the shadow atlas, the
//! shared lighting contract with its multipass and singlepass strategies,
//! and the forward and deferred pipelines. `SceneRenderer` ties them
//! together.

mod config;
mod deferred;
mod forward;
mod instruction;
mod lighting;
mod mesh_renderer;
pub mod programs;
mod scene_renderer;
mod shadow_atlas;
mod stats;
mod traversal;

pub use config::{LightingMode, PipelineMode, RendererConfig};
pub use deferred::{DeferredPipeline, GBUFFER_COLOR_ATTACHMENTS};
pub use forward::{ForwardPipeline, RenderPipeline};
pub use instruction::{order_instructions, RenderInstruction, SortPolicy, MIN_SORT_DISTANCE};
pub use lighting::{LightArrays, LightParams, LightingStrategy, MultipassLighting, SinglepassLighting};
pub use mesh_renderer::{draw_with_material, slots, DrawContext};
pub use scene_renderer::SceneRenderer;
pub use shadow_atlas::{AtlasRegion, ShadowAtlas, ShadowAtlasLayout, ShadowAtlasReport};
pub use stats::{FrameStats, PassStats};
pub use traversal::{collect_instructions, collect_lights, FrameState};
