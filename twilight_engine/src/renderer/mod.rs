//! Renderer facade, shader loading and GPU-visible uniform layouts

mod global_uniforms;
mod renderer;
pub mod shader;

pub use global_uniforms::{projection, GlobalUniforms, Light, LightData, PushConstants, MAX_LIGHTS};
pub use renderer::{Renderer, RendererStats};
pub use shader::{load_spirv, SPIRV_MAGIC};
