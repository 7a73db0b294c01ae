use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use pitchside::sync::{SyncKind, SyncProgress};

#[derive(Default)]
struct ProgressState {
    bars: HashMap<SyncKind, ProgressBar>,
    /// Jobs run one at a time; persisted items belong to this one.
    current: Option<SyncKind>,
    /// Bar for ingest, which has no job.
    ingest_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::JobStarted { kind } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_prefix(kind.to_string());
                pb.set_message("fetching...");
                pb.enable_steady_tick(std::time::Duration::from_millis(100));
                state.bars.insert(kind, pb);
                state.current = Some(kind);
            }

            SyncProgress::Fetched { kind, items } => {
                if let Some(pb) = state.bars.get(&kind) {
                    pb.disable_steady_tick();
                    pb.set_style(Self::bar_style());
                    pb.set_length(items as u64);
                    pb.set_position(0);
                    pb.set_message("saving");
                }
            }

            SyncProgress::Persisted { .. } | SyncProgress::ItemFailed { .. } => {
                let current = state.current;
                let bar = match current {
                    Some(kind) => state.bars.get(&kind).cloned(),
                    None => Some(
                        state
                            .ingest_bar
                            .get_or_insert_with(|| {
                                let pb = self.multi.add(ProgressBar::new_spinner());
                                pb.set_style(Self::counter_style());
                                pb.set_prefix("ingest");
                                pb
                            })
                            .clone(),
                    ),
                };
                if let Some(pb) = bar {
                    pb.inc(1);
                }
            }

            SyncProgress::RetryBackoff {
                retry_after_ms,
                attempt,
                ..
            } => {
                if let Some(pb) = state.current.and_then(|kind| state.bars.get(&kind)) {
                    pb.set_message(format!("retry {attempt} in {retry_after_ms}ms"));
                }
            }

            SyncProgress::JobSucceeded { kind, counts } => {
                if let Some(pb) = state.bars.get(&kind) {
                    let mut msg = format!(
                        "{} inserted, {} updated",
                        counts.inserted, counts.updated
                    );
                    if counts.failed > 0 {
                        msg.push_str(&format!(", {} failed", counts.failed));
                    }
                    pb.finish_with_message(msg);
                }
                state.current = None;
            }

            SyncProgress::JobFailed { kind, reason, .. } => {
                if let Some(pb) = state.bars.get(&kind) {
                    pb.abandon_with_message(format!("failed: {reason}"));
                }
                state.current = None;
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in state.bars.values().chain(state.ingest_bar.iter()) {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:>16.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:>16.bold.cyan} {spinner:.green} {pos:>4} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>16.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside::sync::JobCounts;

    #[test]
    fn test_job_lifecycle_finishes_bar() {
        let reporter = InteractiveReporter::new();
        reporter.handle(SyncProgress::JobStarted {
            kind: SyncKind::Teams,
        });
        reporter.handle(SyncProgress::Fetched {
            kind: SyncKind::Teams,
            items: 2,
        });
        reporter.handle(SyncProgress::JobSucceeded {
            kind: SyncKind::Teams,
            counts: JobCounts {
                fetched: 2,
                inserted: 2,
                ..JobCounts::default()
            },
        });

        let state = reporter.state.lock().unwrap();
        assert!(state.current.is_none());
        assert!(state.bars[&SyncKind::Teams].is_finished());
    }

    #[test]
    fn test_failed_job_abandons_bar() {
        let reporter = InteractiveReporter::new();
        reporter.handle(SyncProgress::JobStarted {
            kind: SyncKind::News,
        });
        reporter.handle(SyncProgress::JobFailed {
            kind: SyncKind::News,
            reason: "RateLimited",
            error: "429".to_string(),
        });
        let state = reporter.state.lock().unwrap();
        assert!(state.bars[&SyncKind::News].is_finished());
    }
}
