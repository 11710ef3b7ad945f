/// Descriptor pool allocator with automatic growth
///
/// Sets are never freed one by one. When the current pool runs dry it is
/// retired (its sets stay valid) and a fresh pool with the same quotas takes
/// its place. Retired pools are only recycled by `clear()`, which resets every
/// pool at once, and only released by `destroy()`. The pool list therefore
/// grows monotonically between clears; there is no compaction.

use crate::device::{
    DescriptorPoolHandle, DescriptorPoolQuotas, DescriptorSetHandle, DescriptorSetLayoutHandle,
    GpuDevice,
};
use crate::error::{Error, Result};
use crate::{engine_bail, engine_debug, engine_info};

pub struct DescriptorPoolAllocator {
    name: &'static str,
    quotas: DescriptorPoolQuotas,
    current: DescriptorPoolHandle,
    /// Full pools whose sets are still in use
    retired: Vec<DescriptorPoolHandle>,
    /// Pools emptied by `clear()`, consumed before creating new ones
    ready: Vec<DescriptorPoolHandle>,
}

impl DescriptorPoolAllocator {
    /// Create the allocator and its first pool
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in log messages ("material", "general", ...)
    /// * `quotas` - Capacity of every pool this allocator creates
    ///
    /// # Errors
    ///
    /// Fails if the quotas are empty or the backend cannot create the pool.
    pub fn init<D: GpuDevice + ?Sized>(
        device: &mut D,
        name: &'static str,
        quotas: DescriptorPoolQuotas,
    ) -> Result<Self> {
        if quotas.max_sets == 0 || quotas.sizes.iter().all(|s| s.count == 0) {
            return Err(Error::InitializationFailed(format!(
                "descriptor allocator '{}' has empty quotas",
                name
            )));
        }

        let current = device.create_descriptor_pool(&quotas)?;
        engine_debug!(
            "twilight::DescriptorPoolAllocator",
            "'{}' allocator created (max {} sets per pool)",
            name,
            quotas.max_sets
        );

        Ok(Self {
            name,
            quotas,
            current,
            retired: Vec::new(),
            ready: Vec::new(),
        })
    }

    /// Allocate one descriptor set, growing the pool list if needed
    ///
    /// # Errors
    ///
    /// Exhaustion never reaches the caller. An error means either a fatal
    /// backend failure or a layout that does not fit into an empty pool with
    /// these quotas (the retry on a fresh pool failed).
    pub fn allocate<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        layout: DescriptorSetLayoutHandle,
    ) -> Result<DescriptorSetHandle> {
        match device.allocate_descriptor_set(self.current, layout) {
            Ok(set) => return Ok(set),
            Err(Error::DescriptorPoolExhausted) => {}
            Err(e) => return Err(e),
        }

        self.grow(device)?;

        match device.allocate_descriptor_set(self.current, layout) {
            Ok(set) => Ok(set),
            Err(Error::DescriptorPoolExhausted) => engine_bail!(
                "twilight::DescriptorPoolAllocator",
                "'{}' layout {:?} does not fit in a fresh pool (max_sets {}, sizes {:?})",
                self.name,
                layout,
                self.quotas.max_sets,
                self.quotas.sizes
            ),
            Err(e) => Err(e),
        }
    }

    /// Retire the current pool and switch to an empty one
    fn grow<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        let next = match self.ready.pop() {
            Some(pool) => pool,
            None => device.create_descriptor_pool(&self.quotas)?,
        };
        let full = std::mem::replace(&mut self.current, next);
        self.retired.push(full);

        engine_info!(
            "twilight::DescriptorPoolAllocator",
            "'{}' pool exhausted, grown to {} pools",
            self.name,
            self.pool_count()
        );
        Ok(())
    }

    /// Reset every pool; all previously allocated sets become invalid
    ///
    /// A pool only moves to the ready list once its reset succeeded. On error
    /// the failing pool and those not reached yet stay retired, so `destroy()`
    /// still releases them.
    pub fn clear<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        device.reset_descriptor_pool(self.current)?;
        while let Some(pool) = self.retired.pop() {
            if let Err(e) = device.reset_descriptor_pool(pool) {
                self.retired.push(pool);
                return Err(e);
            }
            self.ready.push(pool);
        }
        Ok(())
    }

    /// Destroy every pool (the device must be idle)
    pub fn destroy<D: GpuDevice + ?Sized>(&mut self, device: &mut D) {
        for pool in self.retired.drain(..).chain(self.ready.drain(..)) {
            device.destroy_descriptor_pool(pool);
        }
        if !self.current.is_null() {
            device.destroy_descriptor_pool(self.current);
            self.current = DescriptorPoolHandle::NULL;
        }
    }

    /// Pools that filled up since the last `clear()`
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Every pool this allocator owns
    pub fn pool_count(&self) -> usize {
        let current = usize::from(!self.current.is_null());
        current + self.retired.len() + self.ready.len()
    }

    pub fn quotas(&self) -> &DescriptorPoolQuotas {
        &self.quotas
    }
}

#[cfg(test)]
#[path = "pool_allocator_tests.rs"]
mod tests;
