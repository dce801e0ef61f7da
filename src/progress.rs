//! Terminal feedback while a file is being ingested.

use splan_core::ingest::ProgressCallback;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Longest run of dots before the indicator wraps around.
pub const MAX_DOTS: usize = 5;
const TICK: Duration = Duration::from_millis(500);

/// Cycles `.` through `.....`.
#[derive(Debug, Default)]
pub struct DotIndicator {
    count: usize,
}

impl DotIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) -> String {
        self.count = self.count % MAX_DOTS + 1;
        ".".repeat(self.count)
    }
}

/// Redraws `<label> <pct>%<dots>` on stderr until [`ProgressDisplay::finish`].
pub struct ProgressDisplay {
    label: String,
    percent: Arc<AtomicU8>,
    task: Option<JoinHandle<()>>,
}

impl ProgressDisplay {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        let percent = Arc::new(AtomicU8::new(0));
        let task = std::io::stderr().is_terminal().then(|| {
            let label = label.clone();
            let percent = Arc::clone(&percent);
            tokio::spawn(async move {
                let mut dots = DotIndicator::new();
                let mut interval = tokio::time::interval(TICK);
                loop {
                    interval.tick().await;
                    let pct = percent.load(Ordering::Relaxed);
                    let mut err = std::io::stderr().lock();
                    let _ = write!(err, "\r{label} {pct:>3}%{:<width$}", dots.tick(), width = MAX_DOTS);
                    let _ = err.flush();
                }
            })
        });
        Self { label, percent, task }
    }

    /// Callback that feeds ingestion progress into this display.
    pub fn callback(&self) -> ProgressCallback {
        let percent = Arc::clone(&self.percent);
        Arc::new(move |pct| percent.store(pct, Ordering::Relaxed))
    }

    pub fn finish(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let pct = self.percent.load(Ordering::Relaxed);
            eprintln!("\r{} {:>3}%{}", self.label, pct, " ".repeat(MAX_DOTS));
        }
    }
}

impl Drop for ProgressDisplay {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
