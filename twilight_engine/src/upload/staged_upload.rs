/// Synchronous CPU -> GPU uploads through a staging buffer
///
/// Every upload records into the single transfer command buffer, submits it and
/// blocks on the transfer fence before returning. Only one upload runs at a
/// time and none overlaps frame rendering; throughput is traded for simplicity.

use crate::device::{
    BufferDesc, BufferUsage, CommandBufferHandle, Extent3D, FenceHandle, Format, GpuBuffer,
    GpuDevice, GpuImage, ImageDesc, ImageUsage, MemoryLocation, SubmitInfo,
};
use crate::error::{Error, Result};
use crate::engine_trace;
use super::mip_chain::{image_upload_plan, mip_level_count, TransferOp};

/// The reusable {command buffer, fence} pair for immediate submissions
pub struct TransferContext {
    command_buffer: CommandBufferHandle,
    fence: FenceHandle,
}

impl TransferContext {
    pub fn new<D: GpuDevice + ?Sized>(device: &mut D) -> Result<Self> {
        let command_buffer = device.allocate_command_buffer()?;
        let fence = device.create_fence(false)?;
        Ok(Self { command_buffer, fence })
    }

    /// Record with `record`, submit, and wait for the GPU to finish
    pub fn immediate_submit<D, F>(&mut self, device: &mut D, record: F) -> Result<()>
    where
        D: GpuDevice + ?Sized,
        F: FnOnce(&mut D, CommandBufferHandle),
    {
        device.reset_fence(self.fence)?;
        device.reset_commands(self.command_buffer)?;
        device.begin_commands(self.command_buffer)?;

        record(device, self.command_buffer);

        device.end_commands(self.command_buffer)?;
        device.submit(&SubmitInfo {
            command_buffer: self.command_buffer,
            wait: None,
            signal: None,
            fence: self.fence,
        })?;
        device.wait_for_fence(self.fence)
    }

    pub fn destroy<D: GpuDevice + ?Sized>(&mut self, device: &mut D) {
        device.free_command_buffer(self.command_buffer);
        device.destroy_fence(self.fence);
    }
}

/// Staged buffer and image uploads
pub struct StagedUploadEngine {
    context: TransferContext,
}

impl StagedUploadEngine {
    pub fn new<D: GpuDevice + ?Sized>(device: &mut D) -> Result<Self> {
        Ok(Self { context: TransferContext::new(device)? })
    }

    /// Upload `data` into a new GPU-only buffer
    ///
    /// The returned buffer has `usage | TRANSFER_DST | TRANSFER_SRC` so it can
    /// also be read back.
    ///
    /// # Errors
    ///
    /// `InvalidResource` for empty data; any backend failure is fatal.
    pub fn create_buffer<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<GpuBuffer> {
        if data.is_empty() {
            return Err(Error::InvalidResource("cannot upload an empty buffer".to_string()));
        }
        let size = data.len() as u64;

        let staging = self.staging_buffer(device, data)?;
        let buffer = match device.create_buffer(&BufferDesc {
            size,
            usage: usage | BufferUsage::TRANSFER_DST | BufferUsage::TRANSFER_SRC,
            location: MemoryLocation::GpuOnly,
        }) {
            Ok(buffer) => buffer,
            Err(e) => {
                device.destroy_buffer(&staging);
                return Err(e);
            }
        };

        let (src, dst) = (staging.handle, buffer.handle);
        let result = self
            .context
            .immediate_submit(device, |device, cmd| device.copy_buffer(cmd, src, dst, size));
        device.destroy_buffer(&staging);
        result?;

        engine_trace!("twilight::StagedUploadEngine", "uploaded {} byte buffer {:?}", size, dst);
        Ok(buffer)
    }

    /// Upload tightly packed pixels into a new sampled image
    ///
    /// With `mip_mapped` the full chain is generated on the GPU by successive
    /// linear blits. The image ends in the shader-read-only layout.
    ///
    /// # Errors
    ///
    /// `InvalidResource` for a depth other than 1 (only 2D images), or if
    /// `data` is not exactly `width * height * bytes_per_pixel(format)` bytes.
    pub fn create_image<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        data: &[u8],
        extent: Extent3D,
        format: Format,
        usage: ImageUsage,
        mip_mapped: bool,
    ) -> Result<GpuImage> {
        if extent.depth != 1 {
            return Err(Error::InvalidResource(format!(
                "only 2D images can be uploaded, got depth {}",
                extent.depth
            )));
        }
        let expected = extent.texel_count() * format.bytes_per_pixel() as u64;
        if expected == 0 || data.len() as u64 != expected {
            return Err(Error::InvalidResource(format!(
                "pixel data is {} bytes, {}x{}x{} {:?} needs {}",
                data.len(),
                extent.width,
                extent.height,
                extent.depth,
                format,
                expected
            )));
        }

        let mip_levels = if mip_mapped { mip_level_count(extent.width, extent.height) } else { 1 };
        let mut usage = usage | ImageUsage::TRANSFER_DST;
        if mip_mapped {
            usage |= ImageUsage::TRANSFER_SRC;
        }

        let staging = self.staging_buffer(device, data)?;
        let image = match device.create_image(&ImageDesc { extent, format, usage, mip_levels }) {
            Ok(image) => image,
            Err(e) => {
                device.destroy_buffer(&staging);
                return Err(e);
            }
        };

        let plan = image_upload_plan(staging.handle, image.handle, extent, mip_levels, mip_mapped);
        let result = self.context.immediate_submit(device, |device, cmd| {
            for op in &plan {
                match op {
                    TransferOp::Barrier(barrier) => device.pipeline_barrier(cmd, std::slice::from_ref(barrier)),
                    TransferOp::CopyToImage { src, dst, extent } => {
                        device.copy_buffer_to_image(cmd, *src, *dst, *extent)
                    }
                    TransferOp::Blit(blit) => device.blit_mip(cmd, blit),
                }
            }
        });
        device.destroy_buffer(&staging);
        result?;

        engine_trace!(
            "twilight::StagedUploadEngine",
            "uploaded {}x{} image {:?} ({} mip levels)",
            extent.width,
            extent.height,
            image.handle,
            mip_levels
        );
        Ok(image)
    }

    /// Copy a GPU buffer back to the CPU through a readback staging buffer
    pub fn read_buffer<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        buffer: &GpuBuffer,
    ) -> Result<Vec<u8>> {
        let readback = device.create_buffer(&BufferDesc {
            size: buffer.size,
            usage: BufferUsage::TRANSFER_DST,
            location: MemoryLocation::GpuToCpu,
        })?;

        let (src, dst, size) = (buffer.handle, readback.handle, buffer.size);
        let result = self
            .context
            .immediate_submit(device, |device, cmd| device.copy_buffer(cmd, src, dst, size))
            .and_then(|_| {
                let mut bytes = vec![0u8; size as usize];
                device.read_buffer(&readback, 0, &mut bytes)?;
                Ok(bytes)
            });
        device.destroy_buffer(&readback);
        result
    }

    pub fn destroy<D: GpuDevice + ?Sized>(&mut self, device: &mut D) {
        self.context.destroy(device);
    }

    fn staging_buffer<D: GpuDevice + ?Sized>(&mut self, device: &mut D, data: &[u8]) -> Result<GpuBuffer> {
        let staging = device.create_buffer(&BufferDesc {
            size: data.len() as u64,
            usage: BufferUsage::TRANSFER_SRC,
            location: MemoryLocation::CpuToGpu,
        })?;
        if let Err(e) = device.write_buffer(&staging, 0, data) {
            device.destroy_buffer(&staging);
            return Err(e);
        }
        Ok(staging)
    }
}

#[cfg(test)]
#[path = "staged_upload_tests.rs"]
mod tests;
