/// Per-frame material binding
///
/// Pipelines are only rebound when the material's pipeline differs from the
/// last one bound in the current frame. Descriptor sets are bound for every
/// draw since each material has its own set.

use crate::device::{
    CommandBufferHandle, CommandRecorder, DescriptorSetHandle, Extent2D, PipelineHandle, Rect2D,
    Viewport,
};
use super::material::Material;

#[derive(Debug, Default)]
pub struct MaterialBindingCache {
    last_bound_pipeline: Option<PipelineHandle>,
    pipeline_binds: u32,
    set_binds: u32,
}

impl MaterialBindingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the bound pipeline (a new command buffer starts unbound)
    pub fn reset(&mut self) {
        self.last_bound_pipeline = None;
    }

    /// Bind `material` (and the global set) for the next draw
    pub fn bind<R: CommandRecorder + ?Sized>(
        &mut self,
        recorder: &mut R,
        cmd: CommandBufferHandle,
        material: &Material,
        global_set: DescriptorSetHandle,
        extent: Extent2D,
    ) {
        if self.last_bound_pipeline != Some(material.pipeline) {
            recorder.bind_pipeline(cmd, material.pipeline);
            // Viewport and scissor are dynamic state
            recorder.set_viewport(cmd, Viewport::from_extent(extent));
            recorder.set_scissor(cmd, Rect2D::from_extent(extent));
            self.last_bound_pipeline = Some(material.pipeline);
            self.pipeline_binds += 1;
        }

        recorder.bind_descriptor_sets(cmd, material.layout, 0, &[global_set, material.descriptor_set]);
        self.set_binds += 1;
    }

    pub fn last_bound_pipeline(&self) -> Option<PipelineHandle> {
        self.last_bound_pipeline
    }

    /// Pipeline binds since creation
    pub fn pipeline_binds(&self) -> u32 {
        self.pipeline_binds
    }

    pub fn set_binds(&self) -> u32 {
        self.set_binds
    }
}

#[cfg(test)]
#[path = "binding_cache_tests.rs"]
mod tests;
