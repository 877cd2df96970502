// ============================================================
// Layer 5 - One-Cycle Learning Rate Schedule
// ============================================================
// Warm up from max_lr / div_factor to max_lr over the first
// pct_start of all optimiser steps, then anneal down to
// max_lr / div_factor / final_div_factor. Both phases follow a
// half cosine.
//
//   lr
//   max ┤      ╭──╮
//       │    ╭╯    ╰╮
//       │  ╭╯        ╰──╮
//   init┤─╯              ╰───────
//   min ┤                        ─
//       └──────────────────────── step
//        0   pct_start·total   total-1

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct OneCycleSchedule {
    max_lr:      f64,
    initial_lr:  f64,
    min_lr:      f64,
    warmup_end:  f64,
    total_end:   f64,
}

impl OneCycleSchedule {
    pub const PCT_START:        f64 = 0.1;
    pub const DIV_FACTOR:       f64 = 25.0;
    pub const FINAL_DIV_FACTOR: f64 = 1e4;

    pub fn new(max_lr: f64, total_steps: usize) -> Self {
        Self::with_shape(max_lr, total_steps, Self::PCT_START, Self::DIV_FACTOR, Self::FINAL_DIV_FACTOR)
    }

    pub fn with_shape(
        max_lr:           f64,
        total_steps:      usize,
        pct_start:        f64,
        div_factor:       f64,
        final_div_factor: f64,
    ) -> Self {
        let initial_lr = max_lr / div_factor;
        Self {
            max_lr,
            initial_lr,
            min_lr:     initial_lr / final_div_factor,
            warmup_end: pct_start * total_steps as f64 - 1.0,
            total_end:  total_steps as f64 - 1.0,
        }
    }

    /// Learning rate for the 0-based optimiser step. Steps past the
    /// end hold the final value.
    pub fn lr_at(&self, step: usize) -> f64 {
        let step = (step as f64).min(self.total_end.max(0.0));

        if step <= self.warmup_end {
            let pct = if self.warmup_end > 0.0 { step / self.warmup_end } else { 1.0 };
            cosine(self.initial_lr, self.max_lr, pct)
        } else {
            let span = self.total_end - self.warmup_end.max(0.0);
            let pct  = if span > 0.0 { (step - self.warmup_end.max(0.0)) / span } else { 1.0 };
            cosine(self.max_lr, self.min_lr, pct)
        }
    }
}

fn cosine(start: f64, end: f64, pct: f64) -> f64 {
    end + (start - end) / 2.0 * ((PI * pct.clamp(0.0, 1.0)).cos() + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 + 1e-9 * b.abs()
    }

    #[test]
    fn test_endpoints() {
        let s = OneCycleSchedule::new(1e-3, 1000);
        assert!(close(s.lr_at(0), 1e-3 / 25.0));
        assert!(close(s.lr_at(99), 1e-3));
        assert!(close(s.lr_at(999), 1e-3 / 25.0 / 1e4));
        assert!(close(s.lr_at(5000), s.lr_at(999)));
    }

    #[test]
    fn test_rises_then_falls() {
        let s = OneCycleSchedule::new(1e-3, 200);
        assert!(s.lr_at(5) < s.lr_at(10));
        assert!(s.lr_at(50) > s.lr_at(150));
        let peak = (0..200).map(|i| s.lr_at(i)).fold(f64::MIN, f64::max);
        assert!(close(peak, 1e-3));
    }

    #[test]
    fn test_tiny_runs_stay_finite() {
        for total in [0, 1, 2, 5] {
            let s = OneCycleSchedule::new(1e-3, total);
            for step in 0..6 {
                let lr = s.lr_at(step);
                assert!(lr.is_finite() && lr > 0.0, "total={total} step={step}");
            }
        }
    }
}
