//! Phase timing for the CLI pipelines
//!
//! Timings go to the `debug` log level together with the process RSS, read
//! from /proc/self/status where available (0 elsewhere).

use std::fs;
use std::time::Instant;

/// Current RSS in megabytes
pub fn rss_mb() -> f64 {
    let Ok(status) = fs::read_to_string("/proc/self/status") else {
        return 0.0;
    };
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        // "VmRSS:    123456 kB"
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb as f64 / 1024.0)
        .unwrap_or(0.0)
}

/// Start a timed phase
pub fn time_start(label: &str) -> Instant {
    log::debug!("{} ...", label);
    Instant::now()
}

/// Log the time since `section_start` and since `start`; returns a new section start
pub fn time_delta(label: &str, start: Instant, section_start: Instant) -> Instant {
    log::debug!(
        "{} [+{:.3}s, total: {:.3}s, rss: {:.1} MB]",
        label,
        section_start.elapsed().as_secs_f64(),
        start.elapsed().as_secs_f64(),
        rss_mb()
    );
    Instant::now()
}
