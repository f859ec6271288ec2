use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;

/// Progress indication for the per-job collection loop.
pub struct JobProgress {
    pb: ProgressBar,
    total: usize,
}

impl JobProgress {
    /// Starts a bar over `total` jobs; a hidden bar when `visible` is false.
    pub fn start(total: usize, visible: bool) -> Self {
        let pb = if visible {
            let pb = ProgressBar::new(total as u64);
            pb.set_draw_target(ProgressDrawTarget::stderr());
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        Self { pb, total }
    }

    pub fn processing(&self, index: usize, job_name: &str) {
        debug!("[{index:3}/{}] Processing: {job_name}", self.total);
        self.pb.set_message(format!("Processing: {job_name}"));
    }

    pub fn advance(&self) {
        self.pb.inc(1);
    }

    pub fn finish(self, with_stats: usize) {
        self.pb.finish_with_message(format!(
            "✓ Collected statistics from {with_stats}/{} jobs",
            self.total
        ));
    }

    /// Leaves the bar where it stopped, for runs aborted by a fatal error.
    pub fn abandon(self) {
        self.pb.abandon();
    }
}
