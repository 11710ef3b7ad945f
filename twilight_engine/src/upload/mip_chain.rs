/// Mip chain math and the transfer plan for image uploads
///
/// The plan is the exact, ordered list of commands recorded into the transfer
/// command buffer for one image upload, including every layout transition.

use crate::device::{
    AccessFlags, BufferHandle, Extent3D, Filter, ImageBarrier, ImageHandle, ImageLayout, MipBlit,
    PipelineStages, SubresourceRange,
};

/// Number of levels in a full mip chain: floor(log2(max(w, h))) + 1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Dimensions of `level`, halving per level with a floor of 1
pub fn mip_extent(base: Extent3D, level: u32) -> Extent3D {
    let shrink = |d: u32| d.checked_shr(level).unwrap_or(0).max(1);
    Extent3D {
        width: shrink(base.width),
        height: shrink(base.height),
        depth: shrink(base.depth),
    }
}

/// One recorded step of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    Barrier(ImageBarrier),
    CopyToImage {
        src: BufferHandle,
        dst: ImageHandle,
        extent: Extent3D,
    },
    Blit(MipBlit),
}

/// Build the command sequence that fills `image` from `staging`
///
/// Level 0 receives the copy. With more than one level each level i is
/// produced by a linear blit from level i-1, and the whole chain ends in
/// ShaderReadOnly for fragment-shader sampling.
pub fn image_upload_plan(
    staging: BufferHandle,
    image: ImageHandle,
    extent: Extent3D,
    mip_levels: u32,
    mip_mapped: bool,
) -> Vec<TransferOp> {
    let level0 = SubresourceRange::color_level(0);
    let mut ops = Vec::with_capacity(3 + 3 * mip_levels as usize);

    ops.push(TransferOp::Barrier(
        ImageBarrier::new(image, level0)
            .layouts(ImageLayout::Undefined, ImageLayout::TransferDst)
            .src(PipelineStages::TOP_OF_PIPE, AccessFlags::empty())
            .dst(PipelineStages::TRANSFER, AccessFlags::TRANSFER_WRITE),
    ));
    ops.push(TransferOp::CopyToImage { src: staging, dst: image, extent });

    if !mip_mapped {
        ops.push(TransferOp::Barrier(
            ImageBarrier::new(image, SubresourceRange::color_levels(mip_levels))
                .layouts(ImageLayout::TransferDst, ImageLayout::ShaderReadOnly)
                .src(PipelineStages::TRANSFER, AccessFlags::TRANSFER_WRITE)
                .dst(PipelineStages::FRAGMENT_SHADER, AccessFlags::SHADER_READ),
        ));
        return ops;
    }

    // Level 0 becomes the first blit source
    ops.push(TransferOp::Barrier(to_blit_source(image, 0)));

    for level in 1..mip_levels {
        ops.push(TransferOp::Barrier(
            ImageBarrier::new(image, SubresourceRange::color_level(level))
                .layouts(ImageLayout::Undefined, ImageLayout::TransferDst)
                .src(PipelineStages::TOP_OF_PIPE, AccessFlags::empty())
                .dst(PipelineStages::TRANSFER, AccessFlags::TRANSFER_WRITE),
        ));
        ops.push(TransferOp::Blit(MipBlit {
            image,
            src_level: level - 1,
            src_extent: mip_extent(extent, level - 1),
            dst_level: level,
            dst_extent: mip_extent(extent, level),
            filter: Filter::Linear,
        }));
        ops.push(TransferOp::Barrier(to_blit_source(image, level)));
    }

    ops.push(TransferOp::Barrier(
        ImageBarrier::new(image, SubresourceRange::color_levels(mip_levels))
            .layouts(ImageLayout::TransferSrc, ImageLayout::ShaderReadOnly)
            .src(
                PipelineStages::TRANSFER,
                AccessFlags::TRANSFER_READ | AccessFlags::TRANSFER_WRITE,
            )
            .dst(PipelineStages::FRAGMENT_SHADER, AccessFlags::SHADER_READ),
    ));
    ops
}

/// Written level -> readable blit source (write-then-read)
fn to_blit_source(image: ImageHandle, level: u32) -> ImageBarrier {
    ImageBarrier::new(image, SubresourceRange::color_level(level))
        .layouts(ImageLayout::TransferDst, ImageLayout::TransferSrc)
        .src(PipelineStages::TRANSFER, AccessFlags::TRANSFER_WRITE)
        .dst(PipelineStages::TRANSFER, AccessFlags::TRANSFER_READ)
}

#[cfg(test)]
#[path = "mip_chain_tests.rs"]
mod tests;
