// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The launcher: registers benchmark cases and drives their lifecycle.

use tracing::{info, warn};

use crate::{CycleCounter, CycleMetrics, CycleReport, HarnessConfig, HarnessError, WallClockCounter};

/// One benchmark case in the launcher's registry.
///
/// Lifecycle: `init` once at registration, then per measured iteration
/// `prologue` (setup, unmeasured), `execute` (measured), `epilogue`
/// (validation and recycling, unmeasured).
pub trait BenchCase {
    fn name(&self) -> &'static str;

    /// Short one-liner (`long == false`) or the full description.
    fn describe(&self, long: bool) -> &'static str;

    /// One-time setup from the harness configuration.
    fn init(&mut self, config: &HarnessConfig) -> Result<(), HarnessError>;

    /// Per-iteration setup. A failure skips the iteration.
    fn prologue(&mut self) -> Result<(), HarnessError>;

    /// The measured body. Must not allocate or validate; failures are
    /// deferred to `epilogue`.
    fn execute(&mut self);

    /// Per-iteration validation and recycling.
    fn epilogue(&mut self) -> Result<(), HarnessError>;
}

/// Registry and driver for benchmark cases.
///
/// # Example
///
/// ```
/// use harness::{HarnessConfig, Launcher};
///
/// let mut launcher = Launcher::with_default_cases(HarnessConfig::default()).unwrap();
/// let report = launcher.run("memcpy", Some(10)).unwrap();
/// assert_eq!(report.completed, 10);
/// ```
pub struct Launcher {
    config: HarnessConfig,
    counter: Box<dyn CycleCounter>,
    cases: Vec<Box<dyn BenchCase>>,
}

impl Launcher {
    /// Creates an empty launcher with the calibrated wall-clock counter.
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_counter(config, Box::new(WallClockCounter::calibrated()))
    }

    /// Creates an empty launcher over a caller-supplied time base.
    pub fn with_counter(config: HarnessConfig, counter: Box<dyn CycleCounter>) -> Self {
        Self {
            config,
            counter,
            cases: Vec::new(),
        }
    }

    /// Creates a launcher with the full bundled case set registered.
    pub fn with_default_cases(config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let mut launcher = Self::new(config);
        launcher.register(Box::new(crate::cases::MemcpyCase::new()))?;
        launcher.register(Box::new(crate::cases::MsgqCase::new()))?;
        launcher.register(Box::new(crate::cases::FragCase::new()))?;
        launcher.register(Box::new(crate::cases::DefragCase::new()))?;
        Ok(launcher)
    }

    /// Registers a case, running its one-time `init` against the
    /// launcher's configuration.
    pub fn register(&mut self, mut case: Box<dyn BenchCase>) -> Result<(), HarnessError> {
        case.init(&self.config)?;
        info!(case = case.name(), "benchmark case registered");
        self.cases.push(case);
        Ok(())
    }

    /// Registered case names with their short descriptions.
    pub fn cases(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.cases.iter().map(|c| (c.name(), c.describe(false)))
    }

    /// The long description of `name`.
    pub fn describe(&self, name: &str) -> Result<&'static str, HarnessError> {
        self.cases
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.describe(true))
            .ok_or_else(|| HarnessError::UnknownCase(name.to_string()))
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs `name` for `repetitions` iterations (configured default when
    /// `None`), measuring only the execute step of each.
    ///
    /// Iteration failures are soft: a failed prologue skips the iteration
    /// and a failed epilogue voids it, but the loop continues and the
    /// failures are counted in the report.
    pub fn run(&mut self, name: &str, repetitions: Option<u32>) -> Result<CycleReport, HarnessError> {
        let case = self
            .cases
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| HarnessError::UnknownCase(name.to_string()))?;

        let repetitions = repetitions.unwrap_or(self.config.repetitions).max(1);
        let mut metrics = CycleMetrics::new();

        for iteration in 0..repetitions {
            if let Err(e) = case.prologue() {
                warn!(case = name, iteration, error = %e, "prologue failed, iteration skipped");
                metrics.record_failure();
                continue;
            }

            let cycles = self.counter.measure(&mut || case.execute());

            match case.epilogue() {
                Ok(()) => metrics.record_cycles(cycles),
                Err(e) => {
                    warn!(case = name, iteration, error = %e, "epilogue failed, iteration voided");
                    metrics.record_failure();
                }
            }
        }

        let report = metrics.finalise(name, repetitions);
        info!(case = name, "{}", report.summary());
        Ok(report)
    }
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("cases", &self.cases.len())
            .field("overhead", &self.counter.overhead())
            .finish()
    }
}
