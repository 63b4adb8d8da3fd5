// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{any::Any, error::Error, panic::AssertUnwindSafe};

use clap::{ArgMatches, Command};
use colored::Colorize;
use duesync_core::{CalendarConnector, Config, CycleReport, SourceFetcher, SyncCycle};
use futures::FutureExt;

pub const DRY_RUN: &str = "dry-run";

/// Sync forever, sleeping a fixed interval between cycles.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmdRun {
    pub dry_run: bool,
}

impl CmdRun {
    pub const NAME: &str = "run";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Sync on a fixed interval until stopped (default)")
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            dry_run: matches.get_flag(DRY_RUN),
        }
    }

    pub async fn run(self, config: Config) -> Result<(), Box<dyn Error>> {
        let cycle = SyncCycle::from_config(&config)?.dry_run(self.dry_run);
        let interval = config.interval();
        tracing::info!(
            interval_secs = config.interval_secs,
            dry_run = self.dry_run,
            "starting sync loop"
        );

        loop {
            run_cycle(&cycle).await;
            tracing::debug!(?interval, "waiting for next cycle");
            tokio::time::sleep(interval).await;
        }
    }
}

/// Sync once and exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmdOnce {
    pub dry_run: bool,
}

impl CmdOnce {
    pub const NAME: &str = "once";

    pub fn command() -> Command {
        Command::new(Self::NAME).about("Run a single sync cycle and exit")
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            dry_run: matches.get_flag(DRY_RUN),
        }
    }

    pub async fn run(self, config: Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "running one sync cycle...");
        let cycle = SyncCycle::from_config(&config)?.dry_run(self.dry_run);
        let report = cycle.run().await?;

        let label = if self.dry_run { "Dry run:" } else { "Synced:" };
        println!("{} {report}", label.green().bold());
        Ok(())
    }
}

/// Runs one cycle, logging any failure instead of returning it.
///
/// Panics inside the cycle are caught too, so a loop calling this keeps going.
pub async fn run_cycle<F, C>(cycle: &SyncCycle<F, C>) -> Option<CycleReport>
where
    F: SourceFetcher,
    C: CalendarConnector,
{
    match AssertUnwindSafe(cycle.run()).catch_unwind().await {
        Ok(Ok(report)) => Some(report),
        Ok(Err(err)) => {
            tracing::error!(%err, "sync cycle skipped");
            None
        }
        Err(panic) => {
            tracing::error!(reason = panic_message(panic.as_ref()), "sync cycle panicked");
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
