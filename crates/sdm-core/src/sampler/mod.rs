//! The sampling loop: tick, observe, sleep, repeat.
//!
//! Each tick runs locate, read, diff, classify, emit, store, strictly in
//! that order and on one thread; the previous-record map is touched by
//! nobody else. The inter-tick sleep is the only suspension point and is
//! woken early by the shutdown token, so interruption never leaves a tick
//! half done.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use crate::acf::{self, ManifestRecord};
use crate::config::MonitorConfig;
use crate::control::ShutdownToken;
use crate::diff::transfer_speed;
use crate::install::{LocatorError, SteamInstall};
use crate::locate::locate_active;
use crate::report::{Level, Observation, Reporter};

/// How a run ended. Both outcomes are clean exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The configured number of samples was taken.
    Completed,
    /// Shutdown was requested; the loop stopped between ticks.
    Interrupted,
}

/// Owns everything a run needs: the installation, the report sink, the
/// cadence, and the previous record per app id.
pub struct Sampler {
    install: SteamInstall,
    reporter: Reporter,
    interval: Duration,
    samples: u32,
    shutdown: ShutdownToken,
    previous: HashMap<u32, ManifestRecord>,
}

impl Sampler {
    pub fn new(
        install: SteamInstall,
        reporter: Reporter,
        config: &MonitorConfig,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            install,
            reporter,
            interval: config.interval,
            samples: config.samples,
            shutdown,
            previous: HashMap::new(),
        }
    }

    /// Runs until the configured sample count is reached (`Completed`) or
    /// shutdown is requested (`Interrupted`). A missing library directory
    /// at startup is fatal; mid-run it only costs the affected ticks.
    pub fn run(&mut self) -> Result<RunOutcome> {
        if !self.install.steamapps.is_dir() {
            let error = LocatorError::NotAnInstall {
                path: self.install.root.clone(),
            };
            self.reporter
                .emit(Utc::now(), Level::Error, &format!("Cannot monitor: {error}"))?;
            return Err(error.into());
        }

        tracing::info!(
            steamapps = %self.install.steamapps.display(),
            interval_secs = self.interval.as_secs(),
            samples = self.samples,
            "sampling started"
        );

        let mut taken: u32 = 0;
        loop {
            if self.shutdown.is_signaled() {
                tracing::info!("shutdown requested, stopping");
                return Ok(RunOutcome::Interrupted);
            }

            self.tick()?;

            if self.samples != 0 {
                taken += 1;
                if taken >= self.samples {
                    tracing::info!(taken, "sample count reached");
                    return Ok(RunOutcome::Completed);
                }
            }

            if self.shutdown.wait_timeout(self.interval) {
                tracing::info!("shutdown requested, stopping");
                return Ok(RunOutcome::Interrupted);
            }
        }
    }

    /// One sample: scan, then one observation per mid-transfer title. A
    /// clean scan with nothing active emits the idle observation; a failed
    /// scan or read is a warning on the report stream and nothing more.
    fn tick(&mut self) -> Result<()> {
        let paths = match locate_active(&self.install) {
            Ok(paths) => paths,
            Err(error) => {
                tracing::warn!(%error, "manifest scan failed, skipping tick");
                self.reporter.emit(
                    Utc::now(),
                    Level::Warning,
                    &format!("Manifest scan failed: {error}"),
                )?;
                return Ok(());
            }
        };

        if paths.is_empty() {
            self.reporter.observe(&Observation::idle(Utc::now()))?;
            return Ok(());
        }

        for path in paths {
            // The file can vanish or tear between the scan and this read;
            // Steam owns it.
            let current = match acf::read_manifest(&path) {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "manifest unreadable, skipping title");
                    self.reporter.emit(
                        Utc::now(),
                        Level::Warning,
                        &format!("Skipping {}: {error}", path.display()),
                    )?;
                    continue;
                }
            };

            let speed = transfer_speed(self.previous.get(&current.app_id), &current);
            let observation = Observation {
                timestamp: current.captured_at,
                name: current.name.clone(),
                status: current.status(),
                speed,
            };
            self.reporter.observe(&observation)?;
            self.previous.insert(current.app_id, current);
        }
        Ok(())
    }
}
