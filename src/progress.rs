//! Progress reporting for archive operations.
//!
//! [`build_archive`](crate::build_archive) and
//! [`extract_archive`](crate::extract_archive) report through a
//! [`ProgressReporter`]. Every callback has a no-op default, so reporters
//! only implement what they display.
//!
//! # Example
//!
//! ```rust
//! use zpack::progress::{ProgressReporter, StatisticsProgress};
//!
//! let mut progress = StatisticsProgress::new();
//! progress.on_total(2);
//! progress.on_entry_start("manifest.cxml", 10);
//! progress.on_entry_complete("manifest.cxml", true);
//! assert_eq!(progress.entries_done, 1);
//! ```

/// IEC byte unit: 1 KiB = 1024 bytes.
pub const BYTES_KIB: u64 = 1024;
/// IEC byte unit: 1 MiB = 1024 KiB.
pub const BYTES_MIB: u64 = 1024 * BYTES_KIB;
/// IEC byte unit: 1 GiB = 1024 MiB.
pub const BYTES_GIB: u64 = 1024 * BYTES_MIB;

/// Callbacks invoked while packing or unpacking a container.
pub trait ProgressReporter: Send {
    /// Called once before work starts with the number of members.
    fn on_total(&mut self, total_members: u64) {
        let _ = total_members;
    }

    /// Called after each member with the running byte count.
    ///
    /// Returns `true` to continue or `false` to request cancellation.
    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        let _ = (bytes_processed, total_bytes);
        true
    }

    /// Called when a member is about to be processed.
    fn on_entry_start(&mut self, member_name: &str, size: u64) {
        let _ = (member_name, size);
    }

    /// Called when a member has been processed.
    fn on_entry_complete(&mut self, member_name: &str, success: bool) {
        let _ = (member_name, success);
    }

    /// Called for non-fatal problems, such as a temporary file that could
    /// not be removed.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }

    /// Checked before each member; `true` stops the operation.
    fn should_cancel(&self) -> bool {
        false
    }
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for &mut P {
    fn on_total(&mut self, total_members: u64) {
        (**self).on_total(total_members);
    }

    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        (**self).on_progress(bytes_processed, total_bytes)
    }

    fn on_entry_start(&mut self, member_name: &str, size: u64) {
        (**self).on_entry_start(member_name, size);
    }

    fn on_entry_complete(&mut self, member_name: &str, success: bool) {
        (**self).on_entry_complete(member_name, success);
    }

    fn on_warning(&mut self, message: &str) {
        (**self).on_warning(message);
    }

    fn should_cancel(&self) -> bool {
        (**self).should_cancel()
    }
}

/// A progress reporter that does nothing.
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// A progress reporter that records what it was told.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    /// Members announced by `on_total`.
    pub total_members: u64,
    /// Members completed, successfully or not.
    pub entries_done: u64,
    /// Members that failed.
    pub entries_failed: u64,
    /// Last reported byte count.
    pub bytes_processed: u64,
    /// Member currently in progress.
    pub current_entry: Option<String>,
    /// Warnings collected.
    pub warnings: Vec<String>,
    /// Set to stop the operation at the next member.
    pub cancelled: bool,
}

impl StatisticsProgress {
    /// Creates an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_total(&mut self, total_members: u64) {
        self.total_members = total_members;
    }

    fn on_progress(&mut self, bytes_processed: u64, _total_bytes: u64) -> bool {
        self.bytes_processed = bytes_processed;
        !self.cancelled
    }

    fn on_entry_start(&mut self, member_name: &str, _size: u64) {
        self.current_entry = Some(member_name.to_string());
    }

    fn on_entry_complete(&mut self, _member_name: &str, success: bool) {
        self.entries_done += 1;
        if !success {
            self.entries_failed += 1;
        }
        self.current_entry = None;
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

/// A progress reporter that forwards byte counts to a closure.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    /// Creates a reporter from a closure taking `(bytes_processed, total_bytes)`.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    fn on_progress(&mut self, bytes_processed: u64, total_bytes: u64) -> bool {
        (self.callback)(bytes_processed, total_bytes)
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(u64, u64) -> bool + Send,
{
    ClosureProgress::new(f)
}

/// Formats a byte count using IEC units (KiB, MiB, GiB).
///
/// # Examples
///
/// ```rust
/// use zpack::progress::format_bytes_iec;
///
/// assert_eq!(format_bytes_iec(512), "512 B");
/// assert_eq!(format_bytes_iec(1536), "1.5 KiB");
/// assert_eq!(format_bytes_iec(1048576), "1.0 MiB");
/// ```
pub fn format_bytes_iec(bytes: u64) -> String {
    let value = bytes as f64;
    if bytes < BYTES_KIB {
        format!("{} B", bytes)
    } else if bytes < BYTES_MIB {
        format!("{:.1} KiB", value / BYTES_KIB as f64)
    } else if bytes < BYTES_GIB {
        format!("{:.1} MiB", value / BYTES_MIB as f64)
    } else {
        format!("{:.1} GiB", value / BYTES_GIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_progress() {
        let mut progress = NoProgress;
        progress.on_total(3);
        assert!(progress.on_progress(10, 100));
        assert!(!progress.should_cancel());
    }

    #[test]
    fn test_statistics_progress() {
        let mut progress = StatisticsProgress::new();
        progress.on_total(2);
        progress.on_entry_start("a", 1);
        assert_eq!(progress.current_entry.as_deref(), Some("a"));
        progress.on_entry_complete("a", true);
        progress.on_entry_start("b", 1);
        progress.on_entry_complete("b", false);
        progress.on_warning("leftover temp file");

        assert_eq!(progress.total_members, 2);
        assert_eq!(progress.entries_done, 2);
        assert_eq!(progress.entries_failed, 1);
        assert!(progress.current_entry.is_none());
        assert_eq!(progress.warnings.len(), 1);
    }

    #[test]
    fn test_statistics_cancellation() {
        let mut progress = StatisticsProgress::new();
        assert!(progress.on_progress(1, 2));
        progress.cancelled = true;
        assert!(!progress.on_progress(2, 2));
        assert!(progress.should_cancel());
    }

    #[test]
    fn test_closure_progress() {
        let mut seen = Vec::new();
        {
            let mut progress = progress_fn(|done, total| {
                seen.push((done, total));
                done < total
            });
            assert!(progress.on_progress(1, 2));
            assert!(!progress.on_progress(2, 2));
        }
        assert_eq!(seen, [(1, 2), (2, 2)]);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut inner = StatisticsProgress::new();
        {
            let mut by_ref = &mut inner;
            <&mut StatisticsProgress as ProgressReporter>::on_warning(&mut by_ref, "w");
        }
        assert_eq!(inner.warnings, ["w"]);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes_iec(0), "0 B");
        assert_eq!(format_bytes_iec(1024), "1.0 KiB");
        assert_eq!(format_bytes_iec(5 * BYTES_GIB / 2), "2.5 GiB");
    }
}
