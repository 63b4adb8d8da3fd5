// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface for duesync: configuration loading, logging setup
//! and the polling loop around [`duesync_core::SyncCycle`].

mod cli;
mod cmd_calendars;
mod cmd_sync;
mod config;

pub use crate::cli::{Cli, Commands, run};
pub use crate::cmd_calendars::CmdCalendars;
pub use crate::cmd_sync::{CmdOnce, CmdRun, run_cycle};
pub use crate::config::parse_config;
