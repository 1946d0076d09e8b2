//! `watch`: drive a simulated folder view from stdin.
//!
//! Each stdin line is one page action. The overlay is printed whenever the
//! page controller renders, exactly as an injected panel would be redrawn.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use driveplus_core::{Driveplus, LinkEntry, Overlay, PageController};
use driveplus_nav::{History, SimulatedPage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::args::WatchArgs;
use crate::links_cmd::print_links;
use crate::styled_output::{print_dim, print_error, print_info};

// Time for the last navigation to render before exiting on end of input.
const SETTLE: Duration = Duration::from_millis(500);

/// One line of `watch` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    Push(String),
    Replace(String),
    Back,
    Forward,
    Hash(String),
    /// Change the URL without any navigation event.
    Silent(String),
    Mutate,
    Add(String),
    Remove(usize),
    Quit,
}

impl PageCommand {
    /// Parse a line; blank lines and `#` comments yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };
        let required = |name: &str| {
            if arg.is_empty() {
                Err(format!("`{verb}` needs {name}"))
            } else {
                Ok(arg.to_string())
            }
        };

        let command = match verb {
            "push" => PageCommand::Push(required("a URL")?),
            "replace" => PageCommand::Replace(required("a URL")?),
            "back" => PageCommand::Back,
            "forward" => PageCommand::Forward,
            "hash" => PageCommand::Hash(required("a fragment")?),
            "silent" => PageCommand::Silent(required("a URL")?),
            "mutate" => PageCommand::Mutate,
            "add" => PageCommand::Add(required("a URL")?),
            "remove" => PageCommand::Remove(
                required("an index")?
                    .parse()
                    .map_err(|_| format!("Invalid index: {arg}"))?,
            ),
            "quit" | "exit" => PageCommand::Quit,
            other => return Err(format!("Unknown command: {other}")),
        };
        Ok(Some(command))
    }
}

/// Prints the panel to the terminal.
struct TerminalOverlay;

impl Overlay for TerminalOverlay {
    fn clear(&self) {
        debug!("Overlay cleared");
    }

    fn render(&self, folder_id: &str, links: &[LinkEntry]) {
        print_links(folder_id, links);
    }
}

pub async fn run_watch(app: Arc<Driveplus>, args: WatchArgs) -> Result<()> {
    let page = SimulatedPage::new(args.url);
    let controller = PageController::new(Arc::clone(&app), TerminalOverlay);

    let watcher = controller
        .start(page.clone())
        .await
        .context("Failed to start the navigation watcher")?;
    page.attach(&watcher);
    let history = watcher.hook_history(page.clone());

    print_dim(
        "Commands: push <url>, replace <url>, back, forward, hash <fragment>, silent <url>, \
         mutate, add <url>, remove <index>, quit",
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let command = match PageCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                print_error(&e);
                continue;
            }
        };
        debug!(?command, "Page command");

        match command {
            PageCommand::Push(url) => history.push_state(&url),
            PageCommand::Replace(url) => history.replace_state(&url),
            PageCommand::Back => {
                if !page.back() {
                    print_info("Already at the first history entry.");
                }
            }
            PageCommand::Forward => {
                if !page.forward() {
                    print_info("Already at the last history entry.");
                }
            }
            PageCommand::Hash(fragment) => page.set_hash(&fragment),
            PageCommand::Silent(url) => page.navigate_silently(&url),
            PageCommand::Mutate => page.mutate_dom(),
            PageCommand::Add(url) => {
                if controller.add_link(&url).await.is_none() {
                    print_error("Link not added.");
                }
            }
            PageCommand::Remove(index) => {
                if controller.remove_link(index).await.is_none() {
                    print_error("Link not removed.");
                }
            }
            PageCommand::Quit => break,
        }
    }

    tokio::time::sleep(Duration::from_millis(app.config().navigation_debounce_ms) + SETTLE).await;
    watcher.stop();
    Ok(())
}
