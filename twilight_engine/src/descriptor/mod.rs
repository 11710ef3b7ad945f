//! Descriptor set allocation

mod pool_allocator;

pub use pool_allocator::DescriptorPoolAllocator;
