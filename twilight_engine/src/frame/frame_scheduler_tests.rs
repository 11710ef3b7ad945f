//! Unit tests for FrameScheduler

use crate::config::RendererConfig;
use crate::device::mock_device::{MockCommand, MockDevice};
use crate::device::*;
use crate::error::Error;
use crate::frame::{FrameOutcome, FrameScheduler, FrameState, FRAME_FLIGHT_COUNT};

fn setup() -> (MockDevice, FrameScheduler) {
    let mut device = MockDevice::new(800, 600);
    let scheduler = FrameScheduler::new(&mut device, &RendererConfig::default()).unwrap();
    (device, scheduler)
}

fn run_frame(device: &mut MockDevice, scheduler: &mut FrameScheduler) -> FrameOutcome {
    scheduler.begin_frame(device).unwrap();
    scheduler.end_frame(device).unwrap()
}

// ============================================================================
// FRAME CYCLE
// ============================================================================

#[test]
fn test_first_frame_does_not_block() {
    let (mut device, mut scheduler) = setup();

    // Fences start signaled: waiting on a never-submitted, unsignaled fence
    // would be reported as a deadlock by the mock
    let context = scheduler.begin_frame(&mut device).unwrap();

    assert_eq!(context.slot, 0);
    assert_eq!(context.extent, Extent2D::new(800, 600));
    assert_eq!(scheduler.slot_state(0), Some(FrameState::Recording));
}

#[test]
fn test_slots_round_robin() {
    let (mut device, mut scheduler) = setup();

    for frame in 0..(FRAME_FLIGHT_COUNT * 3) {
        assert_eq!(scheduler.frame_index(), frame % FRAME_FLIGHT_COUNT);
        assert_eq!(run_frame(&mut device, &mut scheduler), FrameOutcome::Presented);
    }

    assert_eq!(device.presented.len(), FRAME_FLIGHT_COUNT * 3);
    assert!(device.violations.is_empty(), "{:?}", device.violations);
}

#[test]
fn test_fence_is_waited_before_reset() {
    let (mut device, mut scheduler) = setup();

    for _ in 0..4 {
        run_frame(&mut device, &mut scheduler);
    }

    let sync_calls: Vec<&str> = device
        .calls
        .iter()
        .map(String::as_str)
        .filter(|c| matches!(*c, "wait_for_fence" | "reset_fence" | "reset_commands"))
        .collect();
    for chunk in sync_calls.chunks(3) {
        assert_eq!(chunk, ["wait_for_fence", "reset_fence", "reset_commands"]);
    }
    assert!(device.violations.is_empty(), "{:?}", device.violations);
}

#[test]
fn test_submission_waits_on_acquire_and_signals_render() {
    let (mut device, mut scheduler) = setup();

    run_frame(&mut device, &mut scheduler);

    let (info, commands) = &device.submitted[0];
    let (wait, stage) = info.wait.unwrap();
    assert!(!wait.is_null());
    assert_eq!(stage, PipelineStages::COLOR_ATTACHMENT_OUTPUT);
    assert!(info.signal.is_some());
    assert_ne!(Some(wait), info.signal);

    assert!(matches!(commands.first(), Some(MockCommand::Barrier(_))));
    assert!(commands.iter().any(|c| matches!(c, MockCommand::BeginRendering(_))));
}

#[test]
fn test_frame_layout_transitions() {
    let (mut device, mut scheduler) = setup();

    run_frame(&mut device, &mut scheduler);

    let barriers: Vec<ImageBarrier> = device
        .submitted_commands()
        .into_iter()
        .filter_map(|c| match c {
            MockCommand::Barrier(b) => Some(b),
            _ => None,
        })
        .collect();
    assert_eq!(barriers.len(), 3);

    let color_in = barriers[0];
    assert_eq!(color_in.old_layout, ImageLayout::Undefined);
    assert_eq!(color_in.new_layout, ImageLayout::ColorAttachment);
    assert_eq!(color_in.dst_access, AccessFlags::COLOR_ATTACHMENT_WRITE);

    let depth_in = barriers[1];
    assert_eq!(depth_in.image, scheduler.depth_image().handle);
    assert_eq!(depth_in.new_layout, ImageLayout::DepthAttachment);
    assert_eq!(depth_in.range.aspect, ImageAspect::Depth);

    let color_out = barriers[2];
    assert_eq!(color_out.image, color_in.image);
    assert_eq!(color_out.old_layout, ImageLayout::ColorAttachment);
    assert_eq!(color_out.new_layout, ImageLayout::PresentSrc);
    assert_eq!(color_out.dst_stages, PipelineStages::BOTTOM_OF_PIPE);
}

#[test]
fn test_begin_twice_is_rejected() {
    let (mut device, mut scheduler) = setup();

    scheduler.begin_frame(&mut device).unwrap();
    let result = scheduler.begin_frame(&mut device);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(device.violations.is_empty(), "{:?}", device.violations);
}

#[test]
fn test_end_without_begin_is_rejected() {
    let (mut device, mut scheduler) = setup();

    let result = scheduler.end_frame(&mut device);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(device.call_count("submit"), 0);
}

#[test]
fn test_current_command_buffer_only_while_recording() {
    let (mut device, mut scheduler) = setup();
    assert!(scheduler.current_command_buffer().is_none());

    let context = scheduler.begin_frame(&mut device).unwrap();
    assert_eq!(scheduler.current_command_buffer(), Some(context.command_buffer));

    scheduler.end_frame(&mut device).unwrap();
    assert!(scheduler.current_command_buffer().is_none());
}

// ============================================================================
// SWAPCHAIN RECREATION
// ============================================================================

#[test]
fn test_out_of_date_present_recreates_once() {
    let (mut device, mut scheduler) = setup();
    device.surface_extent = Extent2D::new(1024, 768);
    device.out_of_date_presents = 1;

    let outcome = run_frame(&mut device, &mut scheduler);

    assert_eq!(outcome, FrameOutcome::Recreated(Extent2D::new(1024, 768)));
    assert_eq!(device.swapchain_recreations, 1);
    assert_eq!(scheduler.swapchain_recreations(), 1);
    assert_eq!(scheduler.extent(), Extent2D::new(1024, 768));
    assert_eq!(scheduler.depth_image().extent, Extent3D::flat(1024, 768));
    assert!(device.violations.is_empty(), "{:?}", device.violations);

    // Next frame renders at the new size
    assert_eq!(run_frame(&mut device, &mut scheduler), FrameOutcome::Presented);
}

#[test]
fn test_out_of_date_acquire_recovers_within_frame() {
    let (mut device, mut scheduler) = setup();
    device.out_of_date_acquires = 1;

    let context = scheduler.begin_frame(&mut device).unwrap();

    assert_eq!(device.swapchain_recreations, 1);
    assert_eq!(device.call_count("acquire_next_image"), 2);
    assert_eq!(context.image_index, 0);
    assert_eq!(
        scheduler.end_frame(&mut device).unwrap(),
        FrameOutcome::Recreated(Extent2D::new(800, 600))
    );
    assert!(device.violations.is_empty(), "{:?}", device.violations);
}

#[test]
fn test_out_of_date_acquire_reports_new_extent() {
    let (mut device, mut scheduler) = setup();
    device.surface_extent = Extent2D::new(1600, 400);
    device.out_of_date_acquires = 1;

    let context = scheduler.begin_frame(&mut device).unwrap();
    assert_eq!(context.extent, Extent2D::new(1600, 400));
    assert_eq!(
        scheduler.end_frame(&mut device).unwrap(),
        FrameOutcome::Recreated(Extent2D::new(1600, 400))
    );

    // Reported once, the following frame is a plain one
    assert_eq!(run_frame(&mut device, &mut scheduler), FrameOutcome::Presented);
    assert_eq!(device.swapchain_recreations, 1);
}

#[test]
fn test_resize_combined_with_out_of_date_recreates_once() {
    let (mut device, mut scheduler) = setup();
    device.surface_extent = Extent2D::new(640, 480);
    scheduler.resize(640, 480);
    device.out_of_date_presents = 1;

    let outcome = run_frame(&mut device, &mut scheduler);

    assert_eq!(outcome, FrameOutcome::Recreated(Extent2D::new(640, 480)));
    assert_eq!(device.swapchain_recreations, 1);
    assert_eq!(run_frame(&mut device, &mut scheduler), FrameOutcome::Presented);
    assert_eq!(device.swapchain_recreations, 1);
}

#[test]
fn test_resize_to_current_size_is_ignored() {
    let (mut device, mut scheduler) = setup();

    scheduler.resize(800, 600);

    assert_eq!(run_frame(&mut device, &mut scheduler), FrameOutcome::Presented);
    assert_eq!(device.swapchain_recreations, 0);
}

#[test]
fn test_recreation_idles_device_first() {
    let (mut device, mut scheduler) = setup();
    scheduler.resize(1280, 720);
    device.surface_extent = Extent2D::new(1280, 720);

    run_frame(&mut device, &mut scheduler);

    let idle = device.calls.iter().position(|c| c == "wait_idle").unwrap();
    let recreate = device.calls.iter().position(|c| c == "recreate_swapchain").unwrap();
    assert!(idle < recreate);
    assert!(device.violations.is_empty(), "{:?}", device.violations);
}

#[test]
fn test_fatal_fence_error_propagates() {
    let (mut device, mut scheduler) = setup();
    device.failing_fence_waits.push_back(Error::BackendError("ERROR_DEVICE_LOST".to_string()));

    let result = scheduler.begin_frame(&mut device);

    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(device.call_count("submit"), 0);
}

#[test]
fn test_destroy_releases_everything() {
    let (mut device, mut scheduler) = setup();
    run_frame(&mut device, &mut scheduler);
    device.wait_idle().unwrap();

    scheduler.destroy(&mut device);

    assert_eq!(device.live_objects(), 0);
}
