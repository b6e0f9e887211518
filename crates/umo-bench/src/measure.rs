//! Stage timing and resident memory sampling.

use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resident set size of this process, or `None` when the platform cannot
/// report it.
pub fn resident_bytes(stage: &str) -> Option<u64> {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    let bytes = system.process(pid).map(|process| process.memory());
    if bytes.is_none() {
        tracing::debug!(
            component = "bench",
            operation = "resident_bytes",
            status = "unavailable",
            stage,
            pid = pid.as_u32(),
            "Process missing from sysinfo snapshot"
        );
    }
    bytes
}

/// Wall time and memory of one timed stage.
#[derive(Debug, Clone)]
pub struct Sample {
    pub stage: &'static str,
    pub elapsed: Duration,
    pub rss_before: Option<u64>,
    pub rss_after: Option<u64>,
}

impl Sample {
    /// Signed RSS growth across the stage; needs both samples.
    pub fn rss_growth(&self) -> Option<i64> {
        let before = i64::try_from(self.rss_before?).ok()?;
        let after = i64::try_from(self.rss_after?).ok()?;
        Some(after - before)
    }
}

/// Ordered log of stages, closed with a synthetic `total` sample.
#[derive(Debug)]
pub struct StageLog {
    opened: Instant,
    rss_at_open: Option<u64>,
    samples: Vec<Sample>,
}

impl StageLog {
    pub fn open() -> Self {
        let rss_at_open = resident_bytes("total");
        Self {
            opened: Instant::now(),
            rss_at_open,
            samples: Vec::new(),
        }
    }

    /// Run `work` as the stage `stage`. Failed stages are not recorded.
    pub fn time<T, E>(
        &mut self,
        stage: &'static str,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let rss_before = resident_bytes(stage);
        let clock = Instant::now();
        let output = work()?;
        let elapsed = clock.elapsed();
        self.samples.push(Sample {
            stage,
            elapsed,
            rss_before,
            rss_after: resident_bytes(stage),
        });
        Ok(output)
    }

    pub fn close(mut self) -> Vec<Sample> {
        self.samples.push(Sample {
            stage: "total",
            elapsed: self.opened.elapsed(),
            rss_before: self.rss_at_open,
            rss_after: resident_bytes("total"),
        });
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(rss_before: Option<u64>, rss_after: Option<u64>) -> Sample {
        Sample {
            stage: "build",
            elapsed: Duration::ZERO,
            rss_before,
            rss_after,
        }
    }

    #[test]
    fn growth_is_signed_and_needs_both_ends() {
        assert_eq!(sample(Some(4_096), Some(6_144)).rss_growth(), Some(2_048));
        assert_eq!(sample(Some(6_144), Some(4_096)).rss_growth(), Some(-2_048));
        assert_eq!(sample(Some(4_096), None).rss_growth(), None);
    }

    #[test]
    fn log_appends_total_after_stages() {
        let mut log = StageLog::open();
        let answer: Result<u8, ()> = log.time("build", || Ok(42));
        assert_eq!(answer, Ok(42));
        let failed: Result<(), &str> = log.time("evaluate", || Err("boom"));
        assert_eq!(failed, Err("boom"));

        let stages: Vec<_> = log.close().iter().map(|s| s.stage).collect();
        assert_eq!(stages, ["build", "total"]);
    }
}
