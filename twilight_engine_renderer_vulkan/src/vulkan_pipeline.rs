/// Graphics pipeline creation for dynamic rendering
///
/// Before anything is created, both SPIR-V modules are reflected with spirq
/// and their interface is checked against the layout the caller asked for:
/// every descriptor the shaders use must live in a provided set, and the
/// push constant block of each stage must fit in the ranges visible to it.
/// A mismatch fails pipeline creation with the offending shader path.

use ash::vk;
use ash::vk::Handle;
use std::path::Path;
use twilight_engine::twilight::device::{
    GraphicsPipelineDesc, PipelineHandle, PipelineLayoutHandle, PushConstantRange, ShaderStages,
};
use twilight_engine::twilight::{Error, Result};
use twilight_engine::{engine_debug, engine_err, engine_error};

use crate::vulkan_format::{format_to_vk, shader_stages_to_vk, vertex_format_to_vk};

/// Resources a shader stage declares
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ShaderInterface {
    /// (set, binding) pairs
    pub bindings: Vec<(u32, u32)>,
    /// Size in bytes of the push constant block, if the stage has one
    pub push_constant_size: Option<u32>,
}

/// Reflect a SPIR-V module
pub(crate) fn reflect_shader(code: &[u32], path: &Path) -> Result<ShaderInterface> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| {
            engine_error!("twilight::vulkan", "SPIR-V reflection of {} failed: {:?}", path.display(), e);
            Error::InitializationFailed(format!("SPIR-V reflection of {} failed: {:?}", path.display(), e))
        })?;

    let mut interface = ShaderInterface::default();
    for entry_point in &entry_points {
        for var in entry_point.vars.iter() {
            match var {
                spirq::var::Variable::Descriptor { desc_bind, .. } => {
                    let slot = (desc_bind.set(), desc_bind.bind());
                    if !interface.bindings.contains(&slot) {
                        interface.bindings.push(slot);
                    }
                }
                spirq::var::Variable::PushConstant { ty, .. } => {
                    let size = ty.nbyte().unwrap_or(0) as u32;
                    interface.push_constant_size =
                        Some(interface.push_constant_size.map_or(size, |s| s.max(size)));
                }
                _ => {}
            }
        }
    }
    Ok(interface)
}

/// Check a stage's interface against the pipeline layout
///
/// Returns a description of the first mismatch.
pub(crate) fn check_interface(
    interface: &ShaderInterface,
    stage: ShaderStages,
    set_count: usize,
    push_constants: &[PushConstantRange],
) -> std::result::Result<(), String> {
    if let Some(&(set, binding)) = interface.bindings.iter().find(|(set, _)| *set as usize >= set_count) {
        return Err(format!(
            "descriptor (set {}, binding {}) is outside the {} set layout(s) of the pipeline",
            set, binding, set_count
        ));
    }

    if let Some(size) = interface.push_constant_size {
        let visible = push_constants
            .iter()
            .filter(|range| range.stages.contains(stage))
            .map(|range| range.offset + range.size)
            .max()
            .unwrap_or(0);
        if size > visible {
            return Err(format!(
                "push constant block is {} bytes but only {} bytes are visible to the stage",
                size, visible
            ));
        }
    }
    Ok(())
}

fn reflect_and_check(
    code: &[u32],
    path: &Path,
    stage: ShaderStages,
    desc: &GraphicsPipelineDesc,
) -> Result<()> {
    let interface = reflect_shader(code, path)?;
    check_interface(&interface, stage, desc.set_layouts.len(), &desc.push_constants).map_err(|reason| {
        engine_error!("twilight::vulkan", "Shader {} does not match its pipeline layout: {}", path.display(), reason);
        Error::InitializationFailed(format!("{}: {}", path.display(), reason))
    })?;
    engine_debug!(
        "twilight::vulkan",
        "Shader {} reflected: {} binding(s), push constants {:?}",
        path.display(),
        interface.bindings.len(),
        interface.push_constant_size
    );
    Ok(())
}

fn create_shader_module(device: &ash::Device, code: &[u32], path: &Path) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    unsafe { device.create_shader_module(&create_info, None) }
        .map_err(|e| engine_err!("twilight::vulkan", "vkCreateShaderModule failed for {}: {:?}", path.display(), e))
}

/// Build the pipeline layout and a pipeline rendering into `desc.color_format`
/// and `desc.depth_format` with dynamic viewport and scissor
pub(crate) fn create_graphics_pipeline(
    device: &ash::Device,
    desc: &GraphicsPipelineDesc,
) -> Result<(PipelineHandle, PipelineLayoutHandle)> {
    reflect_and_check(&desc.vertex_code, &desc.vertex_path, ShaderStages::VERTEX, desc)?;
    reflect_and_check(&desc.fragment_code, &desc.fragment_path, ShaderStages::FRAGMENT, desc)?;

    let set_layouts: Vec<vk::DescriptorSetLayout> = desc
        .set_layouts
        .iter()
        .map(|layout| vk::DescriptorSetLayout::from_raw(layout.0))
        .collect();
    let push_constant_ranges: Vec<vk::PushConstantRange> = desc
        .push_constants
        .iter()
        .map(|range| vk::PushConstantRange {
            stage_flags: shader_stages_to_vk(range.stages),
            offset: range.offset,
            size: range.size,
        })
        .collect();

    let layout_info = vk::PipelineLayoutCreateInfo::default()
        .set_layouts(&set_layouts)
        .push_constant_ranges(&push_constant_ranges);
    let layout = unsafe { device.create_pipeline_layout(&layout_info, None) }
        .map_err(|e| engine_err!("twilight::vulkan", "vkCreatePipelineLayout failed: {:?}", e))?;

    let pipeline = build_pipeline(device, desc, layout);
    match pipeline {
        Ok(pipeline) => Ok((PipelineHandle(pipeline.as_raw()), PipelineLayoutHandle(layout.as_raw()))),
        Err(e) => {
            unsafe { device.destroy_pipeline_layout(layout, None) };
            Err(e)
        }
    }
}

fn build_pipeline(
    device: &ash::Device,
    desc: &GraphicsPipelineDesc,
    layout: vk::PipelineLayout,
) -> Result<vk::Pipeline> {
    let vertex_module = create_shader_module(device, &desc.vertex_code, &desc.vertex_path)?;
    let fragment_module = match create_shader_module(device, &desc.fragment_code, &desc.fragment_path) {
        Ok(module) => module,
        Err(e) => {
            unsafe { device.destroy_shader_module(vertex_module, None) };
            return Err(e);
        }
    };

    let shader_stages = [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(vertex_module)
            .name(c"main"),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(fragment_module)
            .name(c"main"),
    ];

    let vertex_bindings = [vk::VertexInputBindingDescription {
        binding: 0,
        stride: desc.vertex_stride,
        input_rate: vk::VertexInputRate::VERTEX,
    }];
    let vertex_attributes: Vec<vk::VertexInputAttributeDescription> = desc
        .vertex_attributes
        .iter()
        .map(|attribute| vk::VertexInputAttributeDescription {
            location: attribute.location,
            binding: 0,
            format: vertex_format_to_vk(attribute.format),
            offset: attribute.offset,
        })
        .collect();
    let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
        .vertex_binding_descriptions(&vertex_bindings)
        .vertex_attribute_descriptions(&vertex_attributes);

    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    // Viewport and scissor are dynamic; only the counts matter here
    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(1)
        .scissor_count(1);

    let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(vk::CullModeFlags::BACK)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .depth_bias_enable(false);

    let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::TYPE_1);

    let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
        .depth_test_enable(true)
        .depth_write_enable(true)
        .depth_compare_op(vk::CompareOp::LESS)
        .depth_bounds_test_enable(false)
        .stencil_test_enable(false);

    let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
        .color_write_mask(vk::ColorComponentFlags::RGBA)
        .blend_enable(false)];
    let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
        .logic_op_enable(false)
        .attachments(&color_blend_attachments);

    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

    let color_formats = [format_to_vk(desc.color_format)];
    let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
        .color_attachment_formats(&color_formats)
        .depth_attachment_format(format_to_vk(desc.depth_format));

    let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&shader_stages)
        .vertex_input_state(&vertex_input_state)
        .input_assembly_state(&input_assembly_state)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization_state)
        .multisample_state(&multisample_state)
        .depth_stencil_state(&depth_stencil_state)
        .color_blend_state(&color_blend_state)
        .dynamic_state(&dynamic_state)
        .layout(layout)
        .push_next(&mut rendering_info);

    let result = unsafe {
        device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
    };

    unsafe {
        device.destroy_shader_module(vertex_module, None);
        device.destroy_shader_module(fragment_module, None);
    }

    let pipelines = result
        .map_err(|(_, e)| engine_err!("twilight::vulkan", "vkCreateGraphicsPipelines failed: {:?}", e))?;
    pipelines
        .into_iter()
        .next()
        .ok_or_else(|| engine_err!("twilight::vulkan", "vkCreateGraphicsPipelines returned no pipeline"))
}

#[cfg(test)]
#[path = "vulkan_pipeline_tests.rs"]
mod tests;
