//! Materials, their pipelines and per-frame binding

mod binding_cache;
mod material;
mod pipeline_registry;

pub use binding_cache::MaterialBindingCache;
pub use material::{
    Material, MaterialConstantBinding, MaterialConstantType, MaterialConstants, MaterialId,
    MaterialTextureBinding, MaterialTextureType,
};
pub use pipeline_registry::{destroy_entry, ArchetypeId, PipelineEntry, PipelineRegistry};
