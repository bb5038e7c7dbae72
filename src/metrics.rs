//! Phase timing and profiling utilities for `burpconv`.
//!
//! This module provides:
//! - [`PhaseTimer`] - A wrapper around `Instant` for timing conversion phases
//! - [`rss_after_phase`] - Optional memory usage tracking using `sysinfo`
//! - [`ProfileData`] - Structured data for performance metrics
//! - [`print_profile_summary`] - Terminal output for profiling results
//! - [`save_stats_json`] - JSON output for scripting integration
//!
//! # Usage
//!
//! ```rust
//! use burpconv::metrics::{PhaseTimer, ProfileData, rss_after_phase};
//!
//! let mut profile = ProfileData::new();
//! let timer = PhaseTimer::new("Parse");
//!
//! // ... do work ...
//!
//! profile.add_phase(timer.finish());
//! profile.memory_rss = rss_after_phase();
//! ```

use humansize::{DECIMAL, format_size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sysinfo::System;

/// A timer for measuring the duration of a named phase.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    /// The name of the phase being timed
    pub name: String,
    /// The start time of the phase
    pub start: Instant,
}

impl PhaseTimer {
    /// Creates a new timer and starts timing the specified phase.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Finishes timing the phase and returns the elapsed duration.
    pub fn finish(self) -> PhaseResult {
        PhaseResult {
            name: self.name,
            duration: self.start.elapsed(),
        }
    }
}

/// The result of a completed phase timing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub name: String,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Durations are stored as whole milliseconds in JSON.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Profiling data for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileData {
    /// Timing results for each phase
    pub phases: Vec<PhaseResult>,
    /// Resident set size in bytes, sampled once after the run (if available)
    pub memory_rss: Option<u64>,
    /// Number of history records converted
    pub records: usize,
    /// Size of the written report in bytes
    pub output_bytes: u64,
}

impl ProfileData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_phase(&mut self, phase: PhaseResult) {
        self.phases.push(phase);
    }

    /// Sum of all phase durations.
    pub fn total_duration(&self) -> Duration {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

/// Measures the current process's RSS (Resident Set Size) in bytes.
///
/// Returns `None` if the process cannot be found, e.g. in restricted
/// containers.
pub fn rss_after_phase() -> Option<u64> {
    let mut system = System::new();
    system.refresh_processes();

    let current_pid = std::process::id();
    system
        .processes()
        .iter()
        .find(|(pid, _)| pid.as_u32() == current_pid)
        .map(|(_, process)| process.memory())
}

/// Formats the profile summary shown by [`print_profile_summary`].
///
/// # Example Output
/// ```text
/// Conversion phase timings
///   Parse               12 ms
///   Render              48 ms
/// Records:          1520
/// Report size:      3.4 MB
/// Memory (RSS):     42.0 MB
/// ```
pub fn format_profile_summary(profile: &ProfileData) -> String {
    let mut out = String::from("\nConversion phase timings\n");

    for phase in &profile.phases {
        out.push_str(&format!(
            "  {:<15} {:>7} ms\n",
            phase.name,
            phase.duration.as_millis()
        ));
    }

    out.push_str(&format!("Records:          {}\n", profile.records));
    out.push_str(&format!(
        "Report size:      {}\n",
        format_size(profile.output_bytes, DECIMAL)
    ));

    if let Some(rss) = profile.memory_rss {
        let memory_mb = rss as f64 / (1024.0 * 1024.0);
        out.push_str(&format!("Memory (RSS):     {:.1} MB\n", memory_mb));
    }

    out
}

/// Prints the profile summary to stderr.
pub fn print_profile_summary(profile: &ProfileData) {
    eprintln!("{}", format_profile_summary(profile));
}

/// Path of the stats file written next to `output_path`.
pub fn stats_path(output_path: &Path) -> PathBuf {
    let mut name = output_path.file_name().unwrap_or_default().to_os_string();
    name.push(".stats.json");
    output_path.with_file_name(name)
}

/// Saves profiling statistics as `<report>.stats.json` next to the report.
///
/// Returns the path of the written file.
pub fn save_stats_json(output_path: &Path, profile: &ProfileData) -> anyhow::Result<PathBuf> {
    let path = stats_path(output_path);

    let stats = serde_json::json!({
        "phases": profile.phases,
        "total_duration_ms": profile.total_duration().as_millis(),
        "records": profile.records,
        "output_bytes": profile.output_bytes,
        "memory_rss_bytes": profile.memory_rss,
        "report": output_path.display().to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    std::fs::write(&path, serde_json::to_string_pretty(&stats)?)?;
    Ok(path)
}

/// Times a block of code.
///
/// Returns `(result, PhaseResult)`.
///
/// # Example
/// ```rust
/// use burpconv::time_phase;
///
/// let (result, timing) = time_phase!("Parse", {
///     // ... some expensive operation ...
///     42
/// });
/// assert_eq!(result, 42);
/// assert_eq!(timing.name, "Parse");
/// ```
#[macro_export]
macro_rules! time_phase {
    ($name:expr, $code:block) => {{
        let timer = $crate::metrics::PhaseTimer::new($name);
        let result = $code;
        let timing = timer.finish();
        (result, timing)
    }};
}
