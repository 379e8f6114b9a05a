/// Forward pipeline: shade every ordered instruction directly.

use crate::device::Device;
use crate::error::Result;
use super::config::{LightingMode, RendererConfig};
use super::instruction::RenderInstruction;
use super::lighting::{LightParams, LightingStrategy, MultipassLighting, SinglepassLighting};
use super::mesh_renderer::{draw_with_material, DrawContext};
use super::stats::PassStats;

/// A way of turning the frame's ordered instructions into a lit image
pub trait RenderPipeline {
    fn render(
        &mut self,
        device: &mut dyn Device,
        ctx: &DrawContext<'_>,
        instructions: &[RenderInstruction],
        lights: &[LightParams],
        config: &RendererConfig,
    ) -> Result<PassStats>;
}

#[derive(Debug, Default)]
pub struct ForwardPipeline;

impl ForwardPipeline {
    pub fn new() -> Self {
        Self
    }
}

impl RenderPipeline for ForwardPipeline {
    /// Instructions are culled again against `ctx.camera`, which need not
    /// be the camera traversal used.
    fn render(
        &mut self,
        device: &mut dyn Device,
        ctx: &DrawContext<'_>,
        instructions: &[RenderInstruction],
        lights: &[LightParams],
        config: &RendererConfig,
    ) -> Result<PassStats> {
        let mut stats = PassStats::default();

        let singlepass;
        let multipass;
        let strategy: &dyn LightingStrategy = match config.lighting {
            LightingMode::Multipass => {
                multipass = MultipassLighting::new(lights);
                &multipass
            }
            LightingMode::Singlepass => {
                singlepass = SinglepassLighting::new(lights, config.max_lights);
                stats.clamped_lights = singlepass.clamped();
                &singlepass
            }
        };

        for instruction in instructions {
            if !ctx.camera.test_box_in_frustum(&instruction.world_bounds) {
                stats.forward_culled += 1;
                continue;
            }
            let outcome = draw_with_material(device, ctx, instruction, strategy.program_name(), |device, mesh| {
                strategy.draw_lit(device, mesh)
            })?;
            stats.record(outcome);
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
