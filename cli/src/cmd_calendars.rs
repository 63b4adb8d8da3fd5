// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use duesync_core::{CalendarUrl, Config, DavConnector, select_calendar};

#[derive(Debug, Default, Clone, Copy)]
pub struct CmdCalendars;

impl CmdCalendars {
    pub const NAME: &str = "calendars";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List the calendars on the CalDAV server, marking the selected one")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        CmdCalendars
    }

    pub async fn run(self, config: Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing calendars...");
        let connector = DavConnector::new(config.calendar.clone(), config.write_backend);
        let calendars = connector.list_calendars().await?;

        let url = CalendarUrl::parse(&config.calendar.url)?;
        let name = config.calendar.name.as_deref();
        let selected = select_calendar(&calendars, url.calendar_path.as_deref(), name)
            .map(|calendar| calendar.href.as_str());

        let rows = calendars.iter().map(|calendar| CalendarRow {
            selected: selected == Some(calendar.href.as_str()),
            name: calendar.display_name.as_deref(),
            href: calendar.href.as_str(),
        });
        for line in format_rows(rows) {
            println!("{line}");
        }
        if selected.is_none() {
            println!("No calendar matches the configured URL or name");
        }
        Ok(())
    }
}

#[derive(Debug)]
struct CalendarRow<'a> {
    selected: bool,
    name: Option<&'a str>,
    href: &'a str,
}

fn format_rows<'a>(rows: impl Iterator<Item = CalendarRow<'a>>) -> Vec<String> {
    let rows: Vec<_> = rows.collect();
    let width = rows
        .iter()
        .map(|row| row.name.unwrap_or("-").chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            let marker = if row.selected { '*' } else { ' ' };
            let name = row.name.unwrap_or("-");
            format!("{marker} {name:<width$}  {}", row.href)
        })
        .collect()
}
