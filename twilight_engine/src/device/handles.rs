//! Opaque GPU object handles
//!
//! Each handle wraps the backend's raw 64-bit object id. Zero is the null
//! handle, matching `VK_NULL_HANDLE`.

macro_rules! define_handle {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name(pub u64);

            impl $name {
                pub const NULL: Self = Self(0);

                pub fn is_null(self) -> bool {
                    self.0 == 0
                }
            }
        )*
    };
}

define_handle!(
    BufferHandle,
    ImageHandle,
    ImageViewHandle,
    SamplerHandle,
    /// Graphics pipeline, owned by the pipeline registry
    PipelineHandle,
    PipelineLayoutHandle,
    DescriptorPoolHandle,
    DescriptorSetLayoutHandle,
    /// Descriptor set; stays valid until its pool is reset or destroyed
    DescriptorSetHandle,
    CommandBufferHandle,
    FenceHandle,
    SemaphoreHandle,
);
