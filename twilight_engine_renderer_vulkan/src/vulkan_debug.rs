/// Vulkan debug messenger - routes validation layer messages into the engine logger
///
/// Only installed when the crate is built with the `vulkan-validation` feature
/// and `RendererConfig::enable_validation` is set. Messages keep their
/// severity: validation errors come out through `engine_error!`, warnings
/// through `engine_warn!`, and the chattier levels through debug/trace.
/// Counts per severity are kept for an end-of-run report.

use ash::vk;
use colored::*;
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use twilight_engine::twilight::{Error, Result};
use twilight_engine::{engine_debug, engine_error, engine_trace, engine_warn};

const SOURCE: &str = "twilight::vulkan::validation";

/// Global validation statistics (thread-safe atomic counters)
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Snapshot of the validation message counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn record(&self, severity: vk::DebugUtilsMessageSeverityFlagsEXT) {
        let counter = if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            &self.errors
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            &self.warnings
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            &self.info
        } else {
            &self.verbose
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

/// Current validation statistics
pub fn validation_stats() -> ValidationStats {
    VALIDATION_STATS.snapshot()
}

/// Print the validation statistics gathered since the messenger was created
pub fn print_validation_stats_report() {
    let stats = validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());
    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());
    println!("{}\n", "====================================".bright_blue().bold());
}

/// Severities forwarded by the messenger
///
/// Verbose loader chatter is left out; it drowns everything else.
pub(crate) fn severity_flags() -> vk::DebugUtilsMessageSeverityFlagsEXT {
    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
}

/// Human-readable name of a message type
pub(crate) fn message_type_label(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

/// Vulkan debug messenger callback
unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = *p_callback_data;
    let message_id_name = if callback_data.p_message_id_name.is_null() {
        "Unknown"
    } else {
        CStr::from_ptr(callback_data.p_message_id_name)
            .to_str()
            .unwrap_or("Invalid UTF-8")
    };
    let message = if callback_data.p_message.is_null() {
        "No message"
    } else {
        CStr::from_ptr(callback_data.p_message)
            .to_str()
            .unwrap_or("Invalid UTF-8")
    };

    VALIDATION_STATS.record(message_severity);
    let kind = message_type_label(message_type);

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        engine_error!(SOURCE, "[{}] {}: {}", kind, message_id_name, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        engine_warn!(SOURCE, "[{}] {}: {}", kind, message_id_name, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        engine_debug!(SOURCE, "[{}] {}: {}", kind, message_id_name, message);
    } else {
        engine_trace!(SOURCE, "[{}] {}: {}", kind, message_id_name, message);
    }

    // Never abort the Vulkan call that triggered the message
    vk::FALSE
}

/// Debug utils loader plus the messenger it created
pub(crate) struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    pub(crate) fn new(entry: &ash::Entry, instance: &ash::Instance) -> Result<Self> {
        VALIDATION_STATS.reset();

        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(severity_flags())
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback));

        let messenger = unsafe { loader.create_debug_utils_messenger(&info, None) }.map_err(|e| {
            engine_error!("twilight::vulkan", "vkCreateDebugUtilsMessengerEXT failed: {:?}", e);
            Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
        })?;

        Ok(Self { loader, messenger })
    }

    /// Destroy the messenger (before the instance)
    pub(crate) fn destroy(&self) {
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_labels() {
        assert_eq!(message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION), "Validation");
        assert_eq!(message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE), "Performance");
        assert_eq!(message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL), "General");
    }

    #[test]
    fn test_verbose_messages_not_requested() {
        let flags = severity_flags();
        assert!(flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
        assert!(flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(!flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
    }

    #[test]
    fn test_stats_tracker_counts_by_severity() {
        let tracker = ValidationStatsTracker::new();
        tracker.record(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR);
        tracker.record(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING);
        tracker.record(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING);
        tracker.record(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE);

        let stats = tracker.snapshot();
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.warnings, 2);
        assert_eq!(stats.info, 0);
        assert_eq!(stats.verbose, 1);
        assert_eq!(stats.total(), 4);

        tracker.reset();
        assert_eq!(tracker.snapshot(), ValidationStats::default());
    }
}
