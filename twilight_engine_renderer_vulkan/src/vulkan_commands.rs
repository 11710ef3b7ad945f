/// Command recording - Vulkan implementation of the `CommandRecorder` trait
///
/// Barriers go through `vkCmdPipelineBarrier2` and rendering through
/// `vkCmdBeginRendering` (no render pass or framebuffer objects).

use ash::vk;
use ash::vk::Handle;
use twilight_engine::twilight::device::{
    BufferHandle, CommandBufferHandle, CommandRecorder, DescriptorSetHandle, Extent3D,
    ImageBarrier, ImageHandle, IndexType, MipBlit, PipelineHandle, PipelineLayoutHandle, Rect2D,
    RenderingInfo, ShaderStages, Viewport,
};
use twilight_engine::twilight::Result;
use twilight_engine::engine_err;

use crate::vulkan_backend::VulkanBackend;
use crate::vulkan_format::{
    access_to_vk, filter_to_vk, image_layout_to_vk, index_type_to_vk, shader_stages_to_vk,
    stages_to_vk, subresource_range_to_vk,
};

fn raw_cmd(cmd: CommandBufferHandle) -> vk::CommandBuffer {
    vk::CommandBuffer::from_raw(cmd.0)
}

/// Far corner of a mip level, as a blit offset
fn extent_offset(extent: Extent3D) -> vk::Offset3D {
    vk::Offset3D {
        x: extent.width as i32,
        y: extent.height as i32,
        z: extent.depth as i32,
    }
}

fn color_layer(mip_level: u32) -> vk::ImageSubresourceLayers {
    vk::ImageSubresourceLayers {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        mip_level,
        base_array_layer: 0,
        layer_count: 1,
    }
}

impl CommandRecorder for VulkanBackend {
    // ===== LIFECYCLE =====

    fn begin_commands(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { self.device().begin_command_buffer(raw_cmd(cmd), &begin_info) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkBeginCommandBuffer failed: {:?}", e))
    }

    fn end_commands(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        unsafe { self.device().end_command_buffer(raw_cmd(cmd)) }
            .map_err(|e| engine_err!("twilight::vulkan", "vkEndCommandBuffer failed: {:?}", e))
    }

    fn reset_commands(&mut self, cmd: CommandBufferHandle) -> Result<()> {
        unsafe {
            self.device()
                .reset_command_buffer(raw_cmd(cmd), vk::CommandBufferResetFlags::empty())
        }
        .map_err(|e| engine_err!("twilight::vulkan", "vkResetCommandBuffer failed: {:?}", e))
    }

    // ===== TRANSFER =====

    fn pipeline_barrier(&mut self, cmd: CommandBufferHandle, barriers: &[ImageBarrier]) {
        let image_barriers: Vec<vk::ImageMemoryBarrier2> = barriers
            .iter()
            .map(|barrier| {
                vk::ImageMemoryBarrier2::default()
                    .src_stage_mask(stages_to_vk(barrier.src_stages))
                    .src_access_mask(access_to_vk(barrier.src_access))
                    .dst_stage_mask(stages_to_vk(barrier.dst_stages))
                    .dst_access_mask(access_to_vk(barrier.dst_access))
                    .old_layout(image_layout_to_vk(barrier.old_layout))
                    .new_layout(image_layout_to_vk(barrier.new_layout))
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(vk::Image::from_raw(barrier.image.0))
                    .subresource_range(subresource_range_to_vk(barrier.range))
            })
            .collect();
        let dependency_info = vk::DependencyInfo::default().image_memory_barriers(&image_barriers);

        unsafe { self.device().cmd_pipeline_barrier2(raw_cmd(cmd), &dependency_info) };
    }

    fn copy_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        src: BufferHandle,
        dst: BufferHandle,
        size: u64,
    ) {
        let region = vk::BufferCopy { src_offset: 0, dst_offset: 0, size };
        unsafe {
            self.device().cmd_copy_buffer(
                raw_cmd(cmd),
                vk::Buffer::from_raw(src.0),
                vk::Buffer::from_raw(dst.0),
                &[region],
            )
        };
    }

    fn copy_buffer_to_image(
        &mut self,
        cmd: CommandBufferHandle,
        src: BufferHandle,
        dst: ImageHandle,
        extent: Extent3D,
    ) {
        let region = vk::BufferImageCopy {
            buffer_offset: 0,
            buffer_row_length: 0,
            buffer_image_height: 0,
            image_subresource: color_layer(0),
            image_offset: vk::Offset3D::default(),
            image_extent: vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: extent.depth,
            },
        };
        unsafe {
            self.device().cmd_copy_buffer_to_image(
                raw_cmd(cmd),
                vk::Buffer::from_raw(src.0),
                vk::Image::from_raw(dst.0),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            )
        };
    }

    fn blit_mip(&mut self, cmd: CommandBufferHandle, blit: &MipBlit) {
        let region = vk::ImageBlit {
            src_subresource: color_layer(blit.src_level),
            src_offsets: [vk::Offset3D::default(), extent_offset(blit.src_extent)],
            dst_subresource: color_layer(blit.dst_level),
            dst_offsets: [vk::Offset3D::default(), extent_offset(blit.dst_extent)],
        };
        let image = vk::Image::from_raw(blit.image.0);
        unsafe {
            self.device().cmd_blit_image(
                raw_cmd(cmd),
                image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
                filter_to_vk(blit.filter),
            )
        };
    }

    // ===== RENDERING =====

    fn begin_rendering(&mut self, cmd: CommandBufferHandle, info: &RenderingInfo) {
        let color_attachments = [vk::RenderingAttachmentInfo::default()
            .image_view(vk::ImageView::from_raw(info.color_view.0))
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .clear_value(vk::ClearValue {
                color: vk::ClearColorValue { float32: info.clear_color },
            })];
        let depth_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(vk::ImageView::from_raw(info.depth_view.0))
            .image_layout(vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .clear_value(vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth: info.clear_depth, stencil: 0 },
            });

        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: vk::Extent2D { width: info.extent.width, height: info.extent.height },
        };
        let mut rendering_info = vk::RenderingInfo::default()
            .render_area(render_area)
            .layer_count(1)
            .color_attachments(&color_attachments);
        if !info.depth_view.is_null() {
            rendering_info = rendering_info.depth_attachment(&depth_attachment);
        }

        unsafe { self.device().cmd_begin_rendering(raw_cmd(cmd), &rendering_info) };
    }

    fn end_rendering(&mut self, cmd: CommandBufferHandle) {
        unsafe { self.device().cmd_end_rendering(raw_cmd(cmd)) };
    }

    fn bind_pipeline(&mut self, cmd: CommandBufferHandle, pipeline: PipelineHandle) {
        unsafe {
            self.device().cmd_bind_pipeline(
                raw_cmd(cmd),
                vk::PipelineBindPoint::GRAPHICS,
                vk::Pipeline::from_raw(pipeline.0),
            )
        };
    }

    fn set_viewport(&mut self, cmd: CommandBufferHandle, viewport: Viewport) {
        let vk_viewport = vk::Viewport {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        };
        unsafe { self.device().cmd_set_viewport(raw_cmd(cmd), 0, &[vk_viewport]) };
    }

    fn set_scissor(&mut self, cmd: CommandBufferHandle, scissor: Rect2D) {
        let vk_scissor = vk::Rect2D {
            offset: vk::Offset2D { x: scissor.x, y: scissor.y },
            extent: vk::Extent2D { width: scissor.width, height: scissor.height },
        };
        unsafe { self.device().cmd_set_scissor(raw_cmd(cmd), 0, &[vk_scissor]) };
    }

    fn bind_descriptor_sets(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        first_set: u32,
        sets: &[DescriptorSetHandle],
    ) {
        let vk_sets: Vec<vk::DescriptorSet> =
            sets.iter().map(|set| vk::DescriptorSet::from_raw(set.0)).collect();
        unsafe {
            self.device().cmd_bind_descriptor_sets(
                raw_cmd(cmd),
                vk::PipelineBindPoint::GRAPHICS,
                vk::PipelineLayout::from_raw(layout.0),
                first_set,
                &vk_sets,
                &[],
            )
        };
    }

    fn push_constants(
        &mut self,
        cmd: CommandBufferHandle,
        layout: PipelineLayoutHandle,
        stages: ShaderStages,
        offset: u32,
        data: &[u8],
    ) {
        unsafe {
            self.device().cmd_push_constants(
                raw_cmd(cmd),
                vk::PipelineLayout::from_raw(layout.0),
                shader_stages_to_vk(stages),
                offset,
                data,
            )
        };
    }

    fn bind_vertex_buffer(&mut self, cmd: CommandBufferHandle, buffer: BufferHandle, offset: u64) {
        unsafe {
            self.device().cmd_bind_vertex_buffers(
                raw_cmd(cmd),
                0,
                &[vk::Buffer::from_raw(buffer.0)],
                &[offset],
            )
        };
    }

    fn bind_index_buffer(
        &mut self,
        cmd: CommandBufferHandle,
        buffer: BufferHandle,
        offset: u64,
        index_type: IndexType,
    ) {
        unsafe {
            self.device().cmd_bind_index_buffer(
                raw_cmd(cmd),
                vk::Buffer::from_raw(buffer.0),
                offset,
                index_type_to_vk(index_type),
            )
        };
    }

    fn draw_indexed(
        &mut self,
        cmd: CommandBufferHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        unsafe {
            self.device().cmd_draw_indexed(
                raw_cmd(cmd),
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            )
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_offset_is_far_corner() {
        let offset = extent_offset(Extent3D::flat(64, 32));
        assert_eq!(offset, vk::Offset3D { x: 64, y: 32, z: 1 });
    }

    #[test]
    fn test_color_layer_targets_single_layer() {
        let layer = color_layer(5);
        assert_eq!(layer.aspect_mask, vk::ImageAspectFlags::COLOR);
        assert_eq!(layer.mip_level, 5);
        assert_eq!(layer.base_array_layer, 0);
        assert_eq!(layer.layer_count, 1);
    }

    #[test]
    fn test_raw_cmd_round_trips_handle() {
        let handle = CommandBufferHandle(0x1234_5678);
        assert_eq!(raw_cmd(handle).as_raw(), 0x1234_5678);
    }
}
