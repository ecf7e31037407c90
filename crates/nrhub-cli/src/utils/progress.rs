use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use nrhub::engine::progress::{Progress, ProgressCallback};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const STAGE_TICK: Duration = Duration::from_millis(100);

/// Shows workflow progress on stderr: a spinner while a stage runs and a bar
/// while its structures or chains are worked through.
///
/// Per-item messages are printed above the bar and counted, so the stage
/// summary can say how many there were.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
    notes: Arc<AtomicUsize>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            bar: ProgressBar::with_draw_target(Some(0), target),
            notes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Messages received so far.
    pub fn notes(&self) -> usize {
        self.notes.load(Ordering::Relaxed)
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let handler = self.clone();
        Box::new(move |event| handler.handle(event))
    }

    fn handle(&self, event: Progress) {
        match event {
            Progress::StageStart { name } => {
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(stage_style());
                self.bar.set_prefix(name);
                self.bar.set_message("");
                self.bar.enable_steady_tick(STAGE_TICK);
            }
            Progress::BatchStart { total } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_length(total);
                self.bar.set_style(batch_style());
            }
            Progress::ItemDone => self.bar.inc(1),
            Progress::BatchFinish => {
                if let Some(total) = self.bar.length() {
                    self.bar.set_position(total);
                }
            }
            Progress::StageFinish => {
                self.bar.disable_steady_tick();
                let summary = match self.notes() {
                    0 => "done".to_string(),
                    n => format!("done, {n} message(s)"),
                };
                self.bar.finish_with_message(summary);
            }
            Progress::Message(msg) => {
                self.notes.fetch_add(1, Ordering::Relaxed);
                self.bar.println(format!("  {msg}"));
            }
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn batch_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<20} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}
