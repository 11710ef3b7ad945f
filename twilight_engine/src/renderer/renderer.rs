/// Renderer facade
///
/// Owns every engine-side GPU object and drives one backend through the
/// device traits. All calls come from a single thread; `present()` is the
/// frame boundary.
///
/// # Example
///
/// ```ignore
/// let mut renderer = Renderer::init(backend, RendererConfig::default())?;
/// let mesh = renderer.create_mesh(&vertices, &indices, MaterialId::DEFAULT)?;
/// let node = scene.create_node(Mat4::IDENTITY);
/// scene.attach_mesh(node, mesh)?;
///
/// loop {
///     renderer.draw(&scene, node);
///     renderer.present()?;
/// }
/// ```

use std::path::Path;
use glam::Mat4;
use slotmap::SlotMap;
use crate::config::RendererConfig;
use crate::descriptor::DescriptorPoolAllocator;
use crate::device::{
    BufferDesc, BufferUsage, DescriptorBinding, DescriptorSetHandle, DescriptorSetLayoutHandle,
    DescriptorType, DescriptorWrite, Extent2D, Extent3D, Filter, Format, GpuBuffer, GpuImage,
    GraphicsPipelineDesc, ImageUsage, IndexType, MemoryLocation, PipelineHandle,
    PushConstantRange, RenderBackend, SamplerDesc, SamplerHandle, ShaderStages,
};
use crate::error::{Error, Result};
use crate::frame::{FrameOutcome, FrameScheduler, FRAME_FLIGHT_COUNT};
use crate::material::{
    ArchetypeId, Material, MaterialBindingCache, MaterialConstantBinding, MaterialConstants,
    MaterialId, MaterialTextureBinding, MaterialTextureType, PipelineEntry, PipelineRegistry,
};
use crate::scene::{DrawListAccumulator, Mesh, MeshKey, NodeId, SceneGraph, Vertex};
use crate::upload::StagedUploadEngine;
use crate::{engine_error, engine_info, engine_warn};
use super::global_uniforms::{projection, GlobalUniforms, Light, PushConstants};
use super::shader::load_spirv;

/// Magenta placeholder texel (RGBA8)
const PLACEHOLDER_TEXEL: [u8; 4] = [255, 0, 255, 255];

/// No upper clamp on sampled mip levels
const LOD_CLAMP_NONE: f32 = 1000.0;

/// Counters since `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererStats {
    /// Frames submitted (skipped frames excluded)
    pub frames_presented: u64,
    pub draw_calls: u64,
    pub triangles: u64,
    pub pipeline_binds: u64,
    pub swapchain_recreations: u32,
    /// Live descriptor pools across all allocators
    pub descriptor_pools: usize,
}

pub struct Renderer<B: RenderBackend> {
    backend: B,
    config: RendererConfig,

    uploads: StagedUploadEngine,
    material_sets: DescriptorPoolAllocator,
    general_sets: DescriptorPoolAllocator,
    frames: FrameScheduler,

    pipelines: PipelineRegistry,
    binding_cache: MaterialBindingCache,

    // ===== GLOBAL SET (one per frame slot) =====
    global_set_layout: DescriptorSetLayoutHandle,
    global_buffers: Vec<GpuBuffer>,
    global_sets: Vec<DescriptorSetHandle>,
    global_uniforms: GlobalUniforms,
    custom_projection: bool,

    // ===== MATERIALS =====
    placeholder_texture: GpuImage,
    nearest_sampler: SamplerHandle,
    linear_sampler: SamplerHandle,
    materials: Vec<Material>,

    meshes: SlotMap<MeshKey, Mesh>,
    draw_list: DrawListAccumulator,
    stats: RendererStats,
}

impl<B: RenderBackend> Renderer<B> {
    /// Build every engine object on top of `backend`
    ///
    /// Creates the transfer context, the descriptor allocators, the frame
    /// slots, the global uniform sets, the default archetype pipeline (from
    /// the configured shader paths) and the magenta default material.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal (including `AssetLoadFailed` for the default
    /// shaders).
    pub fn init(mut backend: B, config: RendererConfig) -> Result<Self> {
        let uploads = StagedUploadEngine::new(&mut backend)?;
        let material_sets =
            DescriptorPoolAllocator::init(&mut backend, "material", config.material_pool.clone())?;
        let mut general_sets =
            DescriptorPoolAllocator::init(&mut backend, "general", config.general_pool.clone())?;
        let frames = FrameScheduler::new(&mut backend, &config)?;

        // Set 0: global uniforms
        let global_set_layout = backend.create_descriptor_set_layout(&[DescriptorBinding {
            binding: 0,
            ty: DescriptorType::UniformBuffer,
            stages: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        }])?;
        let global_uniforms = GlobalUniforms::from_camera(&config.camera, frames.extent());
        let global_size = std::mem::size_of::<GlobalUniforms>() as u64;
        let mut global_buffers = Vec::with_capacity(FRAME_FLIGHT_COUNT);
        let mut global_sets = Vec::with_capacity(FRAME_FLIGHT_COUNT);
        for _ in 0..FRAME_FLIGHT_COUNT {
            let buffer = backend.create_buffer(&BufferDesc {
                size: global_size,
                usage: BufferUsage::UNIFORM,
                location: MemoryLocation::CpuToGpu,
            })?;
            backend.write_buffer(&buffer, 0, bytemuck::bytes_of(&global_uniforms))?;
            let set = general_sets.allocate(&mut backend, global_set_layout)?;
            backend.write_descriptor_set(
                set,
                &[DescriptorWrite::UniformBuffer { binding: 0, buffer: buffer.handle, range: global_size }],
            );
            global_buffers.push(buffer);
            global_sets.push(set);
        }

        let nearest_sampler = backend.create_sampler(&SamplerDesc { filter: Filter::Nearest, max_lod: 0.0 })?;
        let linear_sampler =
            backend.create_sampler(&SamplerDesc { filter: Filter::Linear, max_lod: LOD_CLAMP_NONE })?;

        let mut renderer = Self {
            backend,
            config,
            uploads,
            material_sets,
            general_sets,
            frames,
            pipelines: PipelineRegistry::new(),
            binding_cache: MaterialBindingCache::new(),
            global_set_layout,
            global_buffers,
            global_sets,
            global_uniforms,
            custom_projection: false,
            placeholder_texture: GpuImage {
                handle: Default::default(),
                view: Default::default(),
                format: Format::R8G8B8A8_SRGB,
                extent: Extent3D::flat(0, 0),
                mip_levels: 0,
            },
            nearest_sampler,
            linear_sampler,
            materials: Vec::new(),
            meshes: SlotMap::with_key(),
            draw_list: DrawListAccumulator::new(),
            stats: RendererStats::default(),
        };

        let vertex_path = renderer.config.vertex_shader_path.clone();
        let fragment_path = renderer.config.fragment_shader_path.clone();
        renderer.register_archetype(ArchetypeId::DEFAULT, &vertex_path, &fragment_path)?;

        let placeholder = PLACEHOLDER_TEXEL.repeat(4);
        renderer.placeholder_texture = renderer.uploads.create_image(
            &mut renderer.backend,
            &placeholder,
            Extent3D::flat(2, 2),
            Format::R8G8B8A8_SRGB,
            ImageUsage::SAMPLED,
            false,
        )?;
        let default_material = renderer.build_material(ArchetypeId::DEFAULT, &[], Vec::new())?;
        renderer.materials.push(default_material);

        let extent = renderer.frames.extent();
        engine_info!(
            "twilight::Renderer",
            "Renderer initialized ({}x{}, {} frames in flight)",
            extent.width,
            extent.height,
            FRAME_FLIGHT_COUNT
        );
        Ok(renderer)
    }

    /// Wait for the GPU, destroy every engine object and hand the backend back
    pub fn deinit(mut self) -> B {
        if let Err(e) = self.backend.wait_idle() {
            engine_error!("twilight::Renderer", "wait_idle failed during shutdown: {}", e);
        }

        for (_, mesh) in self.meshes.drain() {
            self.backend.destroy_buffer(&mesh.vertex_buffer);
            self.backend.destroy_buffer(&mesh.index_buffer);
        }
        for material in self.materials.drain(..) {
            for image in &material.images {
                self.backend.destroy_image(image);
            }
            self.backend.destroy_buffer(&material.constants);
        }
        self.backend.destroy_image(&self.placeholder_texture);
        self.backend.destroy_sampler(self.nearest_sampler);
        self.backend.destroy_sampler(self.linear_sampler);

        self.pipelines.destroy(&mut self.backend);
        for buffer in self.global_buffers.drain(..) {
            self.backend.destroy_buffer(&buffer);
        }
        self.backend.destroy_descriptor_set_layout(self.global_set_layout);
        self.material_sets.destroy(&mut self.backend);
        self.general_sets.destroy(&mut self.backend);

        self.frames.destroy(&mut self.backend);
        self.uploads.destroy(&mut self.backend);

        engine_info!("twilight::Renderer", "Renderer destroyed");
        self.backend
    }

    /// Block until the GPU is idle
    pub fn wait(&mut self) -> Result<()> {
        self.backend.wait_idle()
    }

    // ===== BUFFERS & IMAGES =====

    /// Upload `data` into a new GPU-only buffer
    pub fn create_buffer(&mut self, data: &[u8], usage: BufferUsage) -> Result<GpuBuffer> {
        self.uploads.create_buffer(&mut self.backend, data, usage)
    }

    /// Copy a GPU buffer back to the CPU (blocking)
    pub fn read_buffer(&mut self, buffer: &GpuBuffer) -> Result<Vec<u8>> {
        self.uploads.read_buffer(&mut self.backend, buffer)
    }

    /// Destroy `buffer` and null its handle (no-op on a null handle)
    ///
    /// The GPU must no longer use it (see `wait`).
    pub fn destroy_buffer(&mut self, buffer: &mut GpuBuffer) {
        if buffer.handle.is_null() {
            return;
        }
        self.backend.destroy_buffer(buffer);
        buffer.handle = Default::default();
    }

    pub fn create_image(
        &mut self,
        data: &[u8],
        extent: Extent3D,
        format: Format,
        usage: ImageUsage,
        mip_mapped: bool,
    ) -> Result<GpuImage> {
        self.uploads.create_image(&mut self.backend, data, extent, format, usage, mip_mapped)
    }

    /// Destroy `image` and null its handles (no-op on a null handle)
    pub fn destroy_image(&mut self, image: &mut GpuImage) {
        if image.handle.is_null() {
            return;
        }
        self.backend.destroy_image(image);
        image.handle = Default::default();
        image.view = Default::default();
    }

    // ===== MESHES =====

    /// Upload a mesh; an unknown material falls back to the default one
    pub fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32], material: MaterialId) -> Result<MeshKey> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(Error::InvalidResource(format!(
                "mesh needs vertices and indices ({} vertices, {} indices)",
                vertices.len(),
                indices.len()
            )));
        }
        let material = if (material.0 as usize) < self.materials.len() {
            material
        } else {
            engine_warn!("twilight::Renderer", "Unknown material {}, mesh uses the default", material.0);
            MaterialId::DEFAULT
        };

        let vertex_buffer =
            self.uploads.create_buffer(&mut self.backend, bytemuck::cast_slice(vertices), BufferUsage::VERTEX)?;
        let index_buffer =
            match self.uploads.create_buffer(&mut self.backend, bytemuck::cast_slice(indices), BufferUsage::INDEX) {
                Ok(buffer) => buffer,
                Err(e) => {
                    self.backend.destroy_buffer(&vertex_buffer);
                    return Err(e);
                }
            };

        Ok(self.meshes.insert(Mesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            material,
        }))
    }

    /// Destroy a mesh's buffers (the GPU must no longer use them)
    pub fn destroy_mesh(&mut self, key: MeshKey) -> Result<()> {
        let mesh = self
            .meshes
            .remove(key)
            .ok_or_else(|| Error::InvalidResource(format!("unknown mesh {:?}", key)))?;
        self.backend.destroy_buffer(&mesh.vertex_buffer);
        self.backend.destroy_buffer(&mesh.index_buffer);
        Ok(())
    }

    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    // ===== MATERIALS =====

    /// Register a pipeline archetype built from two SPIR-V files
    ///
    /// # Errors
    ///
    /// `AssetLoadFailed` for unreadable or invalid shaders, `InvalidResource`
    /// if `id` is already registered.
    pub fn register_archetype(&mut self, id: ArchetypeId, vertex_path: &Path, fragment_path: &Path) -> Result<()> {
        if self.pipelines.contains(id) {
            return Err(Error::InvalidResource(format!("archetype {} already registered", id.0)));
        }
        let vertex_code = load_spirv(vertex_path)?;
        let fragment_code = load_spirv(fragment_path)?;

        // Set 1: constants + one sampler per texture slot
        let mut bindings = vec![DescriptorBinding {
            binding: 0,
            ty: DescriptorType::UniformBuffer,
            stages: ShaderStages::FRAGMENT,
        }];
        bindings.extend(MaterialTextureType::ALL.iter().map(|ty| DescriptorBinding {
            binding: ty.binding(),
            ty: DescriptorType::CombinedImageSampler,
            stages: ShaderStages::FRAGMENT,
        }));
        let material_set_layout = self.backend.create_descriptor_set_layout(&bindings)?;

        let desc = GraphicsPipelineDesc {
            vertex_code,
            fragment_code,
            vertex_path: vertex_path.to_path_buf(),
            fragment_path: fragment_path.to_path_buf(),
            vertex_stride: Vertex::STRIDE,
            vertex_attributes: Vertex::attributes(),
            set_layouts: vec![self.global_set_layout, material_set_layout],
            push_constants: vec![PushConstantRange {
                stages: ShaderStages::VERTEX,
                offset: 0,
                size: PushConstants::SIZE,
            }],
            color_format: self.backend.swapchain_format(),
            depth_format: self.config.depth_format,
        };
        let (pipeline, layout) = match self.backend.create_graphics_pipeline(&desc) {
            Ok(created) => created,
            Err(e) => {
                self.backend.destroy_descriptor_set_layout(material_set_layout);
                return Err(e);
            }
        };

        self.pipelines.register(id, PipelineEntry { pipeline, layout, material_set_layout });
        engine_info!(
            "twilight::Renderer",
            "Archetype {} registered ({}, {})",
            id.0,
            vertex_path.display(),
            fragment_path.display()
        );
        Ok(())
    }

    /// Build a material of the default archetype
    ///
    /// `textures[0]` must be the base color. Otherwise the problem is logged,
    /// the textures are destroyed and `MaterialId::DEFAULT` is returned.
    /// Missing texture slots sample the magenta placeholder.
    ///
    /// # Errors
    ///
    /// Only fatal backend failures.
    pub fn load_material(
        &mut self,
        constants: &[MaterialConstantBinding],
        textures: Vec<MaterialTextureBinding>,
    ) -> Result<MaterialId> {
        self.load_material_with_archetype(ArchetypeId::DEFAULT, constants, textures)
    }

    pub fn load_material_with_archetype(
        &mut self,
        archetype: ArchetypeId,
        constants: &[MaterialConstantBinding],
        textures: Vec<MaterialTextureBinding>,
    ) -> Result<MaterialId> {
        if textures.first().map(|t| t.ty) != Some(MaterialTextureType::BaseColor) {
            engine_warn!(
                "twilight::Renderer",
                "First material texture must be the base color (got {:?}), using the default material",
                textures.first().map(|t| t.ty)
            );
            self.discard_textures(textures);
            return Ok(MaterialId::DEFAULT);
        }
        if !self.pipelines.contains(archetype) {
            engine_warn!("twilight::Renderer", "Unknown archetype {}, using the default material", archetype.0);
            self.discard_textures(textures);
            return Ok(MaterialId::DEFAULT);
        }

        let material = self.build_material(archetype, constants, textures)?;
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        Ok(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    fn discard_textures(&mut self, textures: Vec<MaterialTextureBinding>) {
        for texture in textures {
            self.backend.destroy_image(&texture.image);
        }
    }

    fn build_material(
        &mut self,
        archetype: ArchetypeId,
        constants: &[MaterialConstantBinding],
        textures: Vec<MaterialTextureBinding>,
    ) -> Result<Material> {
        let entry = *self
            .pipelines
            .get(archetype)
            .ok_or_else(|| Error::InvalidResource(format!("unknown archetype {}", archetype.0)))?;

        let descriptor_set = self.material_sets.allocate(&mut self.backend, entry.material_set_layout)?;

        let values = MaterialConstants::from_bindings(constants);
        let constants_buffer = self.backend.create_buffer(&BufferDesc {
            size: std::mem::size_of::<MaterialConstants>() as u64,
            usage: BufferUsage::UNIFORM,
            location: MemoryLocation::CpuToGpu,
        })?;
        self.backend.write_buffer(&constants_buffer, 0, bytemuck::bytes_of(&values))?;

        let mut writes = vec![DescriptorWrite::UniformBuffer {
            binding: 0,
            buffer: constants_buffer.handle,
            range: constants_buffer.size,
        }];
        for ty in MaterialTextureType::ALL {
            let (view, sampler) = match textures.iter().find(|t| t.ty == ty) {
                Some(texture) => (texture.image.view, self.linear_sampler),
                None => (self.placeholder_texture.view, self.nearest_sampler),
            };
            writes.push(DescriptorWrite::CombinedImageSampler { binding: ty.binding(), view, sampler });
        }
        self.backend.write_descriptor_set(descriptor_set, &writes);

        Ok(Material {
            archetype,
            pipeline: entry.pipeline,
            layout: entry.layout,
            descriptor_set,
            images: textures.into_iter().map(|t| t.image).collect(),
            constants: constants_buffer,
        })
    }

    // ===== FRAME =====

    /// Queue every mesh of `node` and its descendants for the next `present()`
    pub fn draw(&mut self, scene: &SceneGraph, node: NodeId) {
        self.draw_list.draw(scene, node);
    }

    /// Record, submit and present the queued draws
    ///
    /// The draw list is empty afterwards, whatever the outcome.
    pub fn present(&mut self) -> Result<FrameOutcome> {
        let result = self.render_frame();
        self.draw_list.clear();

        let outcome = result?;
        match outcome {
            FrameOutcome::Presented => self.stats.frames_presented += 1,
            FrameOutcome::Recreated(extent) => {
                self.stats.frames_presented += 1;
                if !self.custom_projection {
                    self.global_uniforms.projection = projection(&self.config.camera, extent).to_cols_array_2d();
                }
            }
            FrameOutcome::Skipped => {}
        }
        Ok(outcome)
    }

    fn render_frame(&mut self) -> Result<FrameOutcome> {
        // Minimized: nothing to present until the window has an area again
        if self.frames.requested_extent().is_empty() {
            return Ok(FrameOutcome::Skipped);
        }

        self.binding_cache.reset();
        let extent_before = self.frames.extent();
        let frame = self.frames.begin_frame(&mut self.backend)?;

        // The acquire may have rebuilt the swapchain at another size
        if frame.extent != extent_before && !self.custom_projection {
            self.global_uniforms.projection = projection(&self.config.camera, frame.extent).to_cols_array_2d();
        }

        // The slot's fence was waited on, so its uniform buffer is free
        self.backend
            .write_buffer(&self.global_buffers[frame.slot], 0, bytemuck::bytes_of(&self.global_uniforms))?;

        let binds_before = self.binding_cache.pipeline_binds();
        let Self { backend, draw_list, meshes, materials, binding_cache, global_sets, stats, .. } = self;
        let global_set = global_sets[frame.slot];
        let cmd = frame.command_buffer;
        draw_list.flush(|command| {
            let Some(mesh) = meshes.get(command.mesh) else {
                engine_warn!("twilight::Renderer", "Skipping draw of destroyed mesh {:?}", command.mesh);
                return Ok(());
            };
            let Some(material) = materials.get(mesh.material.0 as usize).or_else(|| materials.first()) else {
                return Ok(());
            };

            binding_cache.bind(&mut *backend, cmd, material, global_set, frame.extent);
            let push = PushConstants::new(command.transform);
            backend.push_constants(cmd, material.layout, ShaderStages::VERTEX, 0, bytemuck::bytes_of(&push));
            backend.bind_vertex_buffer(cmd, mesh.vertex_buffer.handle, 0);
            backend.bind_index_buffer(cmd, mesh.index_buffer.handle, 0, IndexType::U32);
            backend.draw_indexed(cmd, mesh.index_count, 1, 0, 0, 0);

            stats.draw_calls += 1;
            stats.triangles += mesh.triangle_count() as u64;
            Ok(())
        })?;
        self.stats.pipeline_binds += (self.binding_cache.pipeline_binds() - binds_before) as u64;

        self.frames.end_frame(&mut self.backend)
    }

    /// Request a swapchain of the given size, applied after the next present
    pub fn resize(&mut self, width: u32, height: u32) {
        self.frames.resize(width, height);
    }

    /// Override the camera (`projection` is used as given, in Vulkan clip space)
    pub fn set_camera(&mut self, view: Mat4, projection: Mat4) {
        self.global_uniforms.view = view.to_cols_array_2d();
        self.global_uniforms.projection = projection.to_cols_array_2d();
        self.custom_projection = true;
    }

    /// Add a point light to the global uniforms
    ///
    /// # Errors
    ///
    /// `InvalidResource` once `MAX_LIGHTS` lights exist.
    pub fn add_light(&mut self, light: Light) -> Result<()> {
        if self.global_uniforms.push_light(light) {
            Ok(())
        } else {
            engine_warn!("twilight::Renderer", "Light limit reached, light ignored");
            Err(Error::InvalidResource("light limit reached".to_string()))
        }
    }

    // ===== INTROSPECTION =====

    pub fn stats(&self) -> RendererStats {
        RendererStats {
            swapchain_recreations: self.frames.swapchain_recreations(),
            descriptor_pools: self.material_sets.pool_count() + self.general_sets.pool_count(),
            ..self.stats
        }
    }

    pub fn draw_list_len(&self) -> usize {
        self.draw_list.len()
    }

    /// Pipeline bound last in the most recent frame
    pub fn last_bound_pipeline(&self) -> Option<PipelineHandle> {
        self.binding_cache.last_bound_pipeline()
    }

    pub fn extent(&self) -> Extent2D {
        self.frames.extent()
    }

    pub fn global_uniforms(&self) -> &GlobalUniforms {
        &self.global_uniforms
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
