//! Progress bar implementation for CLI operations.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use zpack::progress::ProgressReporter;

/// Progress display for pack and unpack.
///
/// The overall bar counts members when the total is known (pack) and
/// falls back to a spinner otherwise (unpack, since containers carry no
/// member count).
pub struct CliProgress {
    multi: MultiProgress,
    overall: ProgressBar,
    current: Option<ProgressBar>,
    warnings: usize,
    quiet: bool,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool) -> Self {
        let multi = MultiProgress::new();
        let overall = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = multi.add(ProgressBar::new_spinner());
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} members {msg}")
            {
                pb.set_style(style);
            }
            pb
        };

        Self {
            multi,
            overall,
            current: None,
            warnings: 0,
            quiet,
        }
    }

    /// Sets a message on the overall progress bar
    pub fn set_message(&self, msg: impl Into<String>) {
        if !self.quiet {
            self.overall.set_message(msg.into());
        }
    }

    /// Number of warnings reported so far
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.overall.finish_and_clear();
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.overall.abandon_with_message(msg.into());
    }
}

impl ProgressReporter for CliProgress {
    fn on_total(&mut self, total_members: u64) {
        if self.quiet {
            return;
        }
        self.overall.set_length(total_members);
        let template =
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} members ({eta})";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            self.overall.set_style(style.progress_chars("#>-"));
        }
    }

    fn on_entry_start(&mut self, member_name: &str, size: u64) {
        if self.quiet {
            return;
        }

        let pb = self.multi.add(ProgressBar::new(size));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("  {spinner:.green} {wide_msg} {total_bytes}")
        {
            pb.set_style(style);
        }
        pb.set_message(member_name.to_string());
        self.current = Some(pb);
    }

    fn on_entry_complete(&mut self, _member_name: &str, success: bool) {
        if let Some(pb) = self.current.take() {
            if success {
                pb.finish_and_clear();
            } else {
                pb.abandon_with_message("Error");
            }
        }
        self.overall.inc(1);
    }

    // The library already logs the message at warn level.
    fn on_warning(&mut self, _message: &str) {
        self.warnings += 1;
    }
}
