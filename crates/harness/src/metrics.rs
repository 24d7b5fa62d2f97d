// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cycle measurement aggregation and reporting.

/// Running aggregate over one `run` invocation.
#[derive(Debug, Clone, Default)]
pub struct CycleMetrics {
    completed: u32,
    failed: u32,
    total: u64,
    min: Option<u64>,
    max: u64,
}

impl CycleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful measured iteration.
    pub fn record_cycles(&mut self, cycles: u64) {
        self.completed += 1;
        self.total += cycles;
        self.min = Some(self.min.map_or(cycles, |m| m.min(cycles)));
        self.max = self.max.max(cycles);
    }

    /// Records an iteration whose prologue or epilogue failed.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Folds the aggregate into a report for `case`.
    pub fn finalise(self, case: &str, repetitions: u32) -> CycleReport {
        let avg = if self.completed > 0 {
            self.total / u64::from(self.completed)
        } else {
            0
        };
        CycleReport {
            case: case.to_string(),
            repetitions,
            completed: self.completed,
            failed: self.failed,
            avg_cycles: avg,
            min_cycles: self.min.unwrap_or(0),
            max_cycles: self.max,
            total_cycles: self.total,
        }
    }
}

/// Aggregated result of running one case for N repetitions.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CycleReport {
    /// Case name.
    pub case: String,
    /// Requested repetitions.
    pub repetitions: u32,
    /// Iterations that completed and were measured.
    pub completed: u32,
    /// Iterations dropped by a failed prologue or epilogue.
    pub failed: u32,
    /// Average cost per iteration.
    pub avg_cycles: u64,
    /// Cheapest iteration.
    pub min_cycles: u64,
    /// Most expensive iteration.
    pub max_cycles: u64,
    /// Sum over all completed iterations.
    pub total_cycles: u64,
}

impl CycleReport {
    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{}: avg {} cycles over {}/{} iterations (min {}, max {}, {} failed)",
            self.case,
            self.avg_cycles,
            self.completed,
            self.repetitions,
            self.min_cycles,
            self.max_cycles,
            self.failed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let report = CycleMetrics::new().finalise("frag", 10);
        assert_eq!(report.completed, 0);
        assert_eq!(report.avg_cycles, 0);
        assert_eq!(report.min_cycles, 0);
    }

    #[test]
    fn test_record_and_finalise() {
        let mut m = CycleMetrics::new();
        m.record_cycles(10);
        m.record_cycles(30);
        m.record_failure();
        let report = m.finalise("msgq", 3);

        assert_eq!(report.completed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.avg_cycles, 20);
        assert_eq!(report.min_cycles, 10);
        assert_eq!(report.max_cycles, 30);
        assert_eq!(report.total_cycles, 40);
    }

    #[test]
    fn test_summary_format() {
        let mut m = CycleMetrics::new();
        m.record_cycles(42);
        let s = m.finalise("memcpy", 1).summary();
        assert!(s.contains("memcpy"));
        assert!(s.contains("avg 42"));
    }

    #[test]
    fn test_report_serialises() {
        let report = CycleMetrics::new().finalise("defrag", 5);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"case\":\"defrag\""));
    }
}
