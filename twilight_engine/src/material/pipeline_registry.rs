/// Pipelines keyed by material archetype
///
/// An archetype is a shader family (e.g. lit textured). Every material of that
/// archetype shares the same pipeline, pipeline layout and material descriptor
/// set layout. The registry owns all three; materials only hold copies of the
/// handles.

use rustc_hash::FxHashMap;
use crate::device::{DescriptorSetLayoutHandle, GpuDevice, PipelineHandle, PipelineLayoutHandle};
use crate::engine_warn;

/// Identifier of a material archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchetypeId(pub u32);

impl ArchetypeId {
    /// Lit textured archetype registered at renderer init
    pub const DEFAULT: ArchetypeId = ArchetypeId(0);
}

/// GPU objects owned by one archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineEntry {
    pub pipeline: PipelineHandle,
    pub layout: PipelineLayoutHandle,
    /// Layout of set 1 (material constants and textures)
    pub material_set_layout: DescriptorSetLayoutHandle,
}

#[derive(Debug, Default)]
pub struct PipelineRegistry {
    entries: FxHashMap<ArchetypeId, PipelineEntry>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archetype, returning the entry it replaced (the caller
    /// destroys it once no frame references it)
    pub fn register(&mut self, id: ArchetypeId, entry: PipelineEntry) -> Option<PipelineEntry> {
        let previous = self.entries.insert(id, entry);
        if previous.is_some() {
            engine_warn!("twilight::PipelineRegistry", "Archetype {} re-registered", id.0);
        }
        previous
    }

    pub fn get(&self, id: ArchetypeId) -> Option<&PipelineEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ArchetypeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destroy every pipeline and layout (the device must be idle)
    pub fn destroy<D: GpuDevice + ?Sized>(&mut self, device: &mut D) {
        for (_, entry) in self.entries.drain() {
            destroy_entry(device, &entry);
        }
    }
}

/// Destroy the objects of one entry
pub fn destroy_entry<D: GpuDevice + ?Sized>(device: &mut D, entry: &PipelineEntry) {
    device.destroy_pipeline(entry.pipeline, entry.layout);
    device.destroy_descriptor_set_layout(entry.material_set_layout);
}

#[cfg(test)]
#[path = "pipeline_registry_tests.rs"]
mod tests;
