//! Per-phase timing for the instrumented loop.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crate::core::TickPhase;

/// Samples kept per phase.
const PHASE_WINDOW: usize = 120;
/// Frame intervals kept for the fps estimate.
const FRAME_WINDOW: usize = 30;

/// Rolling window of phase durations and frame intervals.
#[derive(Debug, Clone)]
pub struct PerfProbe {
    phases: Vec<VecDeque<Duration>>,
    frames: VecDeque<Duration>,
}

impl Default for PerfProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl PerfProbe {
    pub fn new() -> Self {
        Self {
            phases: vec![VecDeque::with_capacity(PHASE_WINDOW); TickPhase::ALL.len()],
            frames: VecDeque::with_capacity(FRAME_WINDOW),
        }
    }

    pub fn record(&mut self, phase: TickPhase, elapsed: Duration) {
        let Some(idx) = TickPhase::ALL.iter().position(|p| *p == phase) else {
            return;
        };
        push_bounded(&mut self.phases[idx], elapsed, PHASE_WINDOW);
    }

    /// Wall time between the starts of two consecutive frames.
    pub fn record_frame(&mut self, interval: Duration) {
        push_bounded(&mut self.frames, interval, FRAME_WINDOW);
    }

    pub fn report(&self) -> PerfReport {
        let phases = TickPhase::ALL
            .iter()
            .zip(&self.phases)
            .map(|(phase, samples)| (phase.label(), average(samples)))
            .collect();
        let frame = average(&self.frames);
        let fps = if frame.is_zero() {
            0.0
        } else {
            1.0 / frame.as_secs_f64()
        };
        PerfReport { phases, fps }
    }
}

fn push_bounded(window: &mut VecDeque<Duration>, sample: Duration, cap: usize) {
    if window.len() == cap {
        window.pop_front();
    }
    window.push_back(sample);
}

fn average(samples: &VecDeque<Duration>) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    samples.iter().sum::<Duration>() / samples.len() as u32
}

/// Averages at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PerfReport {
    pub phases: Vec<(&'static str, Duration)>,
    pub fps: f64,
}

impl fmt::Display for PerfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fps {:5.1}", self.fps)?;
        for (label, avg) in &self.phases {
            write!(f, " {label} {}us", avg.as_micros())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_latest_samples() {
        let mut probe = PerfProbe::new();
        for _ in 0..PHASE_WINDOW {
            probe.record(TickPhase::Collisions, Duration::from_micros(100));
        }
        for _ in 0..PHASE_WINDOW {
            probe.record(TickPhase::Collisions, Duration::from_micros(10));
        }
        let report = probe.report();
        assert_eq!(report.phases[2], ("coll", Duration::from_micros(10)));
        assert_eq!(report.phases[0], ("clear", Duration::ZERO));
    }

    #[test]
    fn fps_from_frame_intervals() {
        let mut probe = PerfProbe::new();
        for _ in 0..10 {
            probe.record_frame(Duration::from_millis(40));
        }
        let report = probe.report();
        assert!((report.fps - 25.0).abs() < 1e-9);
        assert!(report.to_string().starts_with("fps  25.0 clear 0us"));
    }
}
