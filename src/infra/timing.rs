// ============================================================
// Layer 6 - Stage Timer
// ============================================================
// Accumulates wall-clock time per named stage and logs a
// summary. Disabled timers still run the closures but record
// nothing, so call sites never branch on the --time flag.

use std::time::{Duration, Instant};

pub struct StageTimer {
    enabled: bool,
    stages:  Vec<(&'static str, Duration)>,
}

impl StageTimer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, stages: Vec::new() }
    }

    pub fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        if !self.enabled {
            return f();
        }
        let start = Instant::now();
        let out = f();
        self.add(stage, start.elapsed());
        out
    }

    fn add(&mut self, stage: &'static str, elapsed: Duration) {
        match self.stages.iter_mut().find(|(name, _)| *name == stage) {
            Some((_, total)) => *total += elapsed,
            None => self.stages.push((stage, elapsed)),
        }
    }

    pub fn total(&self, stage: &str) -> Option<Duration> {
        self.stages.iter().find(|(name, _)| *name == stage).map(|(_, d)| *d)
    }

    /// Log every stage in first-seen order.
    pub fn report(&self) {
        for (stage, elapsed) in &self.stages {
            tracing::info!("{:<12} {:>10.3} ms", stage, elapsed.as_secs_f64() * 1e3);
        }
    }
}
