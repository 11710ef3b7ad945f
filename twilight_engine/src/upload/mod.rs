//! Synchronous staged uploads and mip chain generation

pub mod mip_chain;
mod staged_upload;

pub use mip_chain::{image_upload_plan, mip_extent, mip_level_count, TransferOp};
pub use staged_upload::{StagedUploadEngine, TransferContext};
