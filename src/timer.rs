use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Wall-clock timer for one distributed run.
///
/// Started right before the iteration loop, so argument parsing and setup are not
/// counted. Stopped on the coordinator once the gather has completed.
#[derive(Debug)]
pub struct RunTimer {
    started: Instant,
    started_at: DateTime<Utc>,
    loop_done: Option<Instant>,
}

/// Measured phases of a run, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elapsed {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_ms: f64,
    pub compute_ms: f64,
    pub gather_ms: f64,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            loop_done: None,
        }
    }

    /// Mark the end of the iteration loop; the rest of the run counts as gather time.
    pub fn loop_finished(&mut self) {
        self.loop_done = Some(Instant::now());
    }

    pub fn stop(self) -> Elapsed {
        let stopped = Instant::now();
        let loop_done = self.loop_done.unwrap_or(stopped);

        Elapsed {
            started_at: self.started_at,
            finished_at: Utc::now(),
            total_ms: millis(stopped - self.started),
            compute_ms: millis(loop_done - self.started),
            gather_ms: millis(stopped - loop_done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_phases_add_up() {
        let mut timer = RunTimer::start();
        thread::sleep(Duration::from_millis(5));
        timer.loop_finished();
        thread::sleep(Duration::from_millis(5));
        let elapsed = timer.stop();

        assert!(elapsed.compute_ms >= 5.0);
        assert!(elapsed.gather_ms >= 5.0);
        assert!(elapsed.total_ms >= elapsed.compute_ms);
        assert!((elapsed.compute_ms + elapsed.gather_ms - elapsed.total_ms).abs() < 1e-6);
        assert!(elapsed.finished_at >= elapsed.started_at);
    }

    #[test]
    fn test_unmarked_loop_counts_as_compute() {
        let elapsed = RunTimer::start().stop();
        assert_eq!(elapsed.gather_ms, 0.0);
        assert_eq!(elapsed.compute_ms, elapsed.total_ms);
    }
}
