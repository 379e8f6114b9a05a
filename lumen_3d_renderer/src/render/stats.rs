/// Per-frame counters reported by `SceneRenderer::render_scene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Render instructions built by traversal
    pub instructions: usize,
    /// Lights that survived light culling
    pub active_lights: usize,
    /// Mesh nodes rejected by the view frustum during traversal
    pub culled_nodes: usize,
    /// Lights dropped during traversal (unknown type or culled point lights)
    pub dropped_lights: usize,
    /// Instructions rejected by the forward pipeline's second frustum test
    pub forward_culled: usize,
    /// Lights that received an atlas region
    pub shadow_regions: usize,
    /// Shadow casters left without a region
    pub dropped_shadow_casters: usize,
    /// Lights left out of the fixed-capacity light arrays
    pub clamped_lights: usize,
    /// Draw calls issued, shadow and debug passes included
    pub draw_calls: usize,
    /// Draws skipped for a missing program or empty mesh
    pub skipped_draws: usize,
}

/// Counters produced by one pipeline pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    pub draw_calls: usize,
    pub skipped_draws: usize,
    pub forward_culled: usize,
    pub clamped_lights: usize,
}

impl PassStats {
    /// Count the outcome of one `draw_with_material` call.
    pub fn record(&mut self, outcome: Option<usize>) {
        match outcome {
            Some(draw_calls) => self.draw_calls += draw_calls,
            None => self.skipped_draws += 1,
        }
    }
}

impl FrameStats {
    pub fn add_pass(&mut self, pass: &PassStats) {
        self.draw_calls += pass.draw_calls;
        self.skipped_draws += pass.skipped_draws;
        self.forward_culled += pass.forward_culled;
        self.clamped_lights += pass.clamped_lights;
    }
}
