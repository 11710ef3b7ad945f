/// Frames in flight: per-slot synchronization and the acquire/present loop

mod frame_scheduler;
mod frame_slot;

pub use frame_scheduler::{FrameContext, FrameOutcome, FrameScheduler};
pub use frame_slot::{FrameSlot, FrameState, FRAME_FLIGHT_COUNT};
