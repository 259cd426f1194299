use indicatif::{ProgressBar, ProgressStyle};

use crate::core::batch::{BatchEvent, BatchListener};

/// Terminal progress bar for batch runs.
///
/// The bar is created on `Started`, once the file count is known.
pub struct ProgressListener {
    pb: Option<ProgressBar>,
    failed: usize,
}

impl ProgressListener {
    pub fn new() -> Self {
        Self { pb: None, failed: 0 }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressListener {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchListener for ProgressListener {
    fn on_event(&mut self, event: BatchEvent) {
        match event {
            BatchEvent::Started { total } => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::style());
                self.pb = Some(pb);
            }
            BatchEvent::ClipDone { clip_id, .. } => {
                if let Some(pb) = &self.pb {
                    pb.set_message(clip_id);
                    pb.inc(1);
                }
            }
            BatchEvent::ClipFailed { clip_id, message } => {
                self.failed += 1;
                if let Some(pb) = &self.pb {
                    pb.println(format!("  failed {}: {}", clip_id, message));
                    pb.inc(1);
                }
            }
            BatchEvent::Progress { .. } => {}
            BatchEvent::Finished(_) => {
                if let Some(pb) = self.pb.take() {
                    let msg = if self.failed == 0 {
                        "done".to_string()
                    } else {
                        format!("done ({} failed)", self.failed)
                    };
                    pb.finish_with_message(msg);
                }
            }
        }
    }
}
