//! `links` subcommands.

use anyhow::{Context, Result, bail};
use driveplus_core::{Driveplus, LinkEntry, SetOutcome};

use crate::cli::args::LinksCommand;
use crate::styled_output::{print_dim, print_info, print_success, print_warning};

pub async fn run_links(app: &Driveplus, command: LinksCommand) -> Result<()> {
    if !app.is_authenticated().await {
        print_warning("Not logged in; links cannot be read or changed.");
    }

    match command {
        LinksCommand::List { folder, json } => {
            let folder_id = resolve_folder(app, &folder)?;
            let links = app.get_links(&folder_id).await;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&links).context("Failed to encode links")?
                );
            } else {
                print_links(&folder_id, &links);
            }
        }
        LinksCommand::Add { folder, url } => {
            let folder_id = resolve_folder(app, &folder)?;
            report(app.add_link(&folder_id, &url).await, "Link added.")?;
            print_links(&folder_id, &app.get_links(&folder_id).await);
        }
        LinksCommand::Remove { folder, index } => {
            let folder_id = resolve_folder(app, &folder)?;
            report(app.remove_link(&folder_id, index).await, "Link removed.")?;
            print_links(&folder_id, &app.get_links(&folder_id).await);
        }
    }
    Ok(())
}

/// Accept either a bare folder id or a folder-view URL.
pub fn resolve_folder(app: &Driveplus, folder: &str) -> Result<String> {
    if let Some(id) = app.folder_id(folder) {
        return Ok(id.to_string());
    }
    let folder = folder.trim();
    if folder.is_empty() || folder.contains("://") || folder.contains('/') {
        bail!("Not a folder id or folder-view URL: {folder}");
    }
    Ok(folder.to_string())
}

fn report(outcome: Option<SetOutcome>, done: &str) -> Result<()> {
    match outcome {
        Some(SetOutcome::Unchanged) => print_dim("Nothing to change."),
        Some(_) => print_success(done),
        None => bail!("Nothing was written (see the log for details)"),
    }
    Ok(())
}

pub fn print_links(folder_id: &str, links: &[LinkEntry]) {
    if links.is_empty() {
        print_info(&format!("No links in folder {folder_id}."));
        return;
    }
    print_info(&format!("{} link(s) in folder {folder_id}:", links.len()));
    for (index, link) in links.iter().enumerate() {
        println!("{index:>3}  {}", link.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driveplus_common::DriveplusConfig;
    use driveplus_login::{MemorySessionStore, Session};
    use std::sync::Arc;

    fn app() -> Driveplus {
        Driveplus::with_session_store(
            DriveplusConfig::default(),
            Arc::new(MemorySessionStore::with_session(&Session::default())),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_folder() {
        let app = app();
        assert_eq!(resolve_folder(&app, "abc123").unwrap(), "abc123");
        assert_eq!(
            resolve_folder(&app, "https://drive.google.com/drive/u/0/folders/xyz?usp=sharing")
                .unwrap(),
            "xyz"
        );
        assert!(resolve_folder(&app, "https://drive.google.com/drive/u/0/my-drive").is_err());
        assert!(resolve_folder(&app, "  ").is_err());
    }
}
