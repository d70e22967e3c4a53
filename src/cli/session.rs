//! Browse session
//!
//! One view session: a pagination controller, the fetcher it talks to, and
//! the rendering of pages, errors and the loading indicator.

use crate::cli::commands::{parse_assignment, OutputFormat};
use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::fetch::RemoteFetcher;
use crate::pagination::{NavigationOutcome, PaginationController};
use crate::types::{FilterSet, JsonValue};
use serde_json::json;
use std::io::Write;
use std::str::FromStr;

/// A command typed at the browse prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    /// Step forward
    Next,
    /// Step backward
    Prev,
    /// Re-fetch the current page
    Refresh,
    /// Go to a page number (current or adjacent)
    Page(u32),
    /// Select a filter value (empty value clears it)
    Filter {
        /// Filter name
        name: String,
        /// Selected value
        value: String,
    },
    /// Clear every filter
    Clear,
    /// Reload from the first page under the same filters
    Restart,
    /// Print the pagination state
    State,
    /// Print the command list
    Help,
    /// End the session
    Quit,
}

impl FromStr for BrowseCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (head, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();

        let command = match head.to_ascii_lowercase().as_str() {
            "n" | "next" => Self::Next,
            "p" | "prev" | "previous" => Self::Prev,
            "r" | "refresh" => Self::Refresh,
            "page" => {
                let number = rest
                    .parse()
                    .map_err(|_| Error::Other(format!("'{rest}' is not a page number")))?;
                Self::Page(number)
            }
            "f" | "filter" => {
                let (name, value) = parse_assignment(rest)
                    .ok_or_else(|| Error::Other("usage: filter <name>=<value>".to_string()))?;
                Self::Filter { name, value }
            }
            "clear" => Self::Clear,
            "restart" => Self::Restart,
            "s" | "state" => Self::State,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => return Err(Error::Other(format!("unknown command '{other}'"))),
        };
        Ok(command)
    }
}

const HELP: &str = "commands: next|n, prev|p, refresh|r, page <n>, filter <name>=<value>, \
clear, restart, state, help, quit|q";

const NO_MORE_ITEMS: &str = "No more items";

/// Interactive paging over one fetcher
pub struct BrowseSession<'a> {
    controller: PaginationController,
    fetcher: &'a dyn RemoteFetcher,
    config: PagerConfig,
    format: OutputFormat,
}

impl<'a> BrowseSession<'a> {
    /// Create a session; nothing is fetched until [`open`](Self::open)
    pub fn new(
        config: PagerConfig,
        filters: FilterSet,
        fetcher: &'a dyn RemoteFetcher,
        format: OutputFormat,
    ) -> Self {
        Self {
            controller: PaginationController::new(config.page_size, filters),
            fetcher,
            config,
            format,
        }
    }

    /// The underlying controller
    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    /// Load the first page and render it
    pub async fn open(&mut self, out: &mut dyn Write) -> Result<()> {
        let outcome = self.controller.refresh(self.fetcher).await;
        self.render(&outcome, out)
    }

    /// Run one command; returns `false` when the session should end
    pub async fn execute(&mut self, command: BrowseCommand, out: &mut dyn Write) -> Result<bool> {
        // A short page is the last one; stepping past it would push an
        // empty boundary and replay page one
        let forward = match command {
            BrowseCommand::Next => true,
            BrowseCommand::Page(number) => number > self.controller.page_number(),
            _ => false,
        };
        if forward && !self.controller.can_advance() {
            self.notice(out, NO_MORE_ITEMS)?;
            return Ok(true);
        }

        let outcome = match command {
            BrowseCommand::Next => self.controller.advance(self.fetcher).await,
            BrowseCommand::Prev => self.controller.retreat(self.fetcher).await,
            BrowseCommand::Refresh => self.controller.refresh(self.fetcher).await,
            BrowseCommand::Page(number) => {
                match self.controller.request_page(number, self.fetcher).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        self.notice(out, &e.user_message())?;
                        return Ok(true);
                    }
                }
            }
            BrowseCommand::Filter { name, value } => {
                let mut filters = self.controller.filters().clone();
                if let Err(e) = self.config.check_filter(&name, &value) {
                    self.notice(out, &e.to_string())?;
                    return Ok(true);
                }
                filters.set(name, value);
                self.controller
                    .on_filter_change(filters, self.fetcher)
                    .await
            }
            BrowseCommand::Clear => {
                let mut filters = self.controller.filters().clone();
                filters.clear_values();
                self.controller
                    .on_filter_change(filters, self.fetcher)
                    .await
            }
            BrowseCommand::Restart => self.controller.restart(self.fetcher).await,
            BrowseCommand::State => {
                let state = serde_json::to_string_pretty(&self.controller.state())?;
                writeln!(out, "{state}")?;
                return Ok(true);
            }
            BrowseCommand::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(true);
            }
            BrowseCommand::Quit => return Ok(false),
        };

        self.render(&outcome, out)?;
        Ok(true)
    }

    /// Parse and run a line of input; parse errors are reported, not returned
    pub async fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }
        match line.parse::<BrowseCommand>() {
            Ok(command) => self.execute(command, out).await,
            Err(e) => {
                self.notice(out, &format!("{e} ({HELP})"))?;
                Ok(true)
            }
        }
    }

    /// Prompt showing the page number
    pub fn prompt(&self) -> String {
        format!("[page {}] > ", self.controller.page_number())
    }

    fn notice(&self, out: &mut dyn Write, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => writeln!(out, "{}", json!({ "notice": message }))?,
            OutputFormat::Pretty => writeln!(out, "! {message}")?,
        }
        Ok(())
    }

    /// Render the displayed page (and the error, if the last fetch failed)
    fn render(&self, outcome: &NavigationOutcome, out: &mut dyn Write) -> Result<()> {
        if outcome.is_stale() {
            return Ok(());
        }

        let controller = &self.controller;
        let page = controller.current_page();
        let cursor_field = self.config.cursor_field.as_str();

        match self.format {
            OutputFormat::Json => {
                let items: Vec<JsonValue> =
                    page.items.iter().map(|i| i.to_json(cursor_field)).collect();
                let line = json!({
                    "page": controller.page_number(),
                    "items": items,
                    "can_retreat": controller.can_retreat(),
                    "can_advance": controller.can_advance(),
                    "error": controller.last_error(),
                });
                writeln!(out, "{line}")?;
            }
            OutputFormat::Pretty => {
                if let Some(error) = controller.last_error() {
                    writeln!(out, "! {error}")?;
                }
                let active: Vec<String> = controller
                    .filters()
                    .active()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                writeln!(
                    out,
                    "Page {} ({} items){}{}{}",
                    controller.page_number(),
                    page.len(),
                    if active.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", active.join(", "))
                    },
                    if controller.can_retreat() { " <prev" } else { "" },
                    if controller.can_advance() { " next>" } else { "" },
                )?;
                if page.is_empty() {
                    writeln!(out, "  (no items)")?;
                }
                for item in &page.items {
                    let fields: Vec<String> = item
                        .fields
                        .iter()
                        .map(|(k, v)| match v {
                            JsonValue::String(s) => format!("{k}={s}"),
                            other => format!("{k}={other}"),
                        })
                        .collect();
                    writeln!(out, "  {}  {}", item.cursor, fields.join(" "))?;
                }
            }
        }
        Ok(())
    }
}
