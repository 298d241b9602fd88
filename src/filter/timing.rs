//! Optional per-phase timing for filter passes.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Receives timings from a filter pass.
pub trait Instrumentation {
    /// When false, the pass never reads the clock.
    fn enabled(&self) -> bool {
        true
    }

    fn begin_pass(&mut self) {}

    fn record(&mut self, phase: &'static str, elapsed: Duration);

    fn end_pass(&mut self) {}
}

/// Instrumentation that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInstrumentation;

impl Instrumentation for NoInstrumentation {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&mut self, _phase: &'static str, _elapsed: Duration) {}
}

/// Run `f`, reporting its duration under `phase` when timing is enabled.
pub fn timed<I, T>(instrumentation: &mut I, phase: &'static str, f: impl FnOnce() -> T) -> T
where
    I: Instrumentation + ?Sized,
{
    if !instrumentation.enabled() {
        return f();
    }
    let start = Instant::now();
    let result = f();
    instrumentation.record(phase, start.elapsed());
    result
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTotal {
    pub elapsed: Duration,
    pub calls: u64,
}

/// Accumulates time per named phase over one pass. Totals reset when the
/// next pass begins.
#[derive(Debug, Clone, Default)]
pub struct PhaseTimer {
    totals: BTreeMap<&'static str, PhaseTotal>,
    passes: u64,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self, phase: &str) -> Option<PhaseTotal> {
        self.totals.get(phase).copied()
    }

    pub fn phases(&self) -> impl Iterator<Item = (&'static str, PhaseTotal)> + '_ {
        self.totals.iter().map(|(phase, total)| (*phase, *total))
    }

    /// Number of passes completed.
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl Instrumentation for PhaseTimer {
    fn begin_pass(&mut self) {
        self.totals.clear();
    }

    fn record(&mut self, phase: &'static str, elapsed: Duration) {
        let total = self.totals.entry(phase).or_default();
        total.elapsed += elapsed;
        total.calls += 1;
    }

    fn end_pass(&mut self) {
        self.passes += 1;
        for (phase, total) in &self.totals {
            tracing::debug!(
                "Timing: {} took {:.3}ms over {} calls",
                phase,
                total.elapsed.as_secs_f64() * 1000.0,
                total.calls
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_per_phase() {
        let mut timer = PhaseTimer::new();
        timer.begin_pass();
        timer.record("dates", Duration::from_millis(2));
        timer.record("dates", Duration::from_millis(3));
        timer.record("networks", Duration::from_millis(1));
        timer.end_pass();

        assert_eq!(
            timer.total("dates"),
            Some(PhaseTotal {
                elapsed: Duration::from_millis(5),
                calls: 2
            })
        );
        assert_eq!(timer.phases().count(), 2);
        assert_eq!(timer.passes(), 1);
    }

    #[test]
    fn resets_at_each_pass() {
        let mut timer = PhaseTimer::new();
        timer.begin_pass();
        timer.record("dates", Duration::from_millis(2));
        timer.end_pass();
        timer.begin_pass();
        timer.record("networks", Duration::from_millis(1));
        timer.end_pass();

        assert_eq!(timer.total("dates"), None);
        assert_eq!(timer.total("networks").map(|t| t.calls), Some(1));
        assert_eq!(timer.passes(), 2);
    }

    #[test]
    fn timed_skips_disabled_instrumentation() {
        let mut none = NoInstrumentation;
        assert_eq!(timed(&mut none, "x", || 42), 42);

        let mut timer = PhaseTimer::new();
        assert_eq!(timed(&mut timer, "x", || "done"), "done");
        assert_eq!(timer.total("x").map(|t| t.calls), Some(1));
    }
}
