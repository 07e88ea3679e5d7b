// src/cli/bookmark_commands.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::display::{format_change, show_bookmarks, use_color, DisplayBookmark, ALL_FIELDS, DEFAULT_FIELDS};
use crate::cli::error::{CliError, CliResult};
use crate::domain::bookmark::{Bookmark, BookmarkId};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::repositories::sqlite::migration;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkStore;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const WATCH_TICK: Duration = Duration::from_secs(1);

fn get_ids(ids: &str) -> CliResult<Vec<BookmarkId>> {
    ids.split(',')
        .map(|s| s.trim().parse::<BookmarkId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CliError::InvalidIdFormat(format!("Invalid ID format: {}", ids)))
}

fn confirm(prompt: &str) -> bool {
    eprint!("{} (y/N): ", prompt);
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn to_display(bookmarks: &[Bookmark]) -> Vec<DisplayBookmark> {
    bookmarks.iter().map(DisplayBookmark::from_domain).collect()
}

#[instrument(skip(cli, services))]
pub fn add(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    if let Some(Commands::Add { url, title }) = cli.command {
        let bookmark = services
            .bookmark_service
            .add_bookmark(&url, title.as_deref())?;
        println!("Added bookmark: {}", bookmark);
    }
    Ok(())
}

#[instrument(skip(cli, services))]
pub fn list(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    if let Some(Commands::List { is_json, long }) = cli.command {
        let bookmarks = services.bookmark_service.list_bookmarks()?;
        debug!("Listing {} bookmarks", bookmarks.len());

        if is_json {
            let json = serde_json::to_string_pretty(&bookmarks)
                .map_err(|e| CliError::CommandFailed(format!("Cannot serialize bookmarks: {}", e)))?;
            println!("{}", json);
        } else {
            let fields = if long { ALL_FIELDS } else { DEFAULT_FIELDS };
            show_bookmarks(&to_display(&bookmarks), fields, use_color(cli.no_color));
        }
    }
    Ok(())
}

#[instrument(skip(cli, services))]
pub fn edit(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    if let Some(Commands::Edit { id, url, title }) = cli.command {
        if url.is_none() && title.is_none() {
            return Err(CliError::InvalidInput(
                "nothing to change, pass --url and/or --title".to_string(),
            ));
        }
        let id = id
            .trim()
            .parse::<BookmarkId>()
            .map_err(|_| CliError::InvalidIdFormat(format!("Invalid ID format: {}", id)))?;

        let bookmark = services
            .bookmark_service
            .update_bookmark(id, url.as_deref(), title.as_deref())?;
        println!("Updated bookmark: {}", bookmark);
    }
    Ok(())
}

#[instrument(skip(cli, services))]
pub fn delete(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    if let Some(Commands::Delete { ids, yes }) = cli.command {
        for id in get_ids(&ids)? {
            let Some(bookmark) = services.bookmark_service.get_bookmark(id)? else {
                eprintln!("Bookmark with ID {} not found", id);
                continue;
            };
            eprintln!("Deleting: {} ({})", bookmark.title, bookmark.url);

            if yes || confirm("Confirm delete?") {
                services.bookmark_service.delete_bookmark(id)?;
                println!("Deleted bookmark with ID {}", id);
            } else {
                eprintln!("Deletion cancelled");
            }
        }
    }
    Ok(())
}

#[instrument(skip(cli, services))]
pub fn open(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    if let Some(Commands::Open { ids }) = cli.command {
        for id in get_ids(&ids)? {
            match services.bookmark_service.get_bookmark(id)? {
                Some(bookmark) => {
                    open::that(&bookmark.url).map_err(|e| {
                        CliError::CommandFailed(format!("Cannot open {}: {}", bookmark.url, e))
                    })?;
                    println!("Opened: {}", bookmark.url);
                }
                None => eprintln!("Bookmark with ID {} not found", id),
            }
        }
    }
    Ok(())
}

/// Prints the live list, then every change other sessions make, until
/// `count` changes were seen (or forever).
#[instrument(skip(cli, services))]
pub fn watch(cli: Cli, services: &ServiceContainer) -> CliResult<()> {
    if let Some(Commands::Watch { count }) = cli.command {
        let color = use_color(cli.no_color);
        let mut view = services.open_view()?;
        let Some(owner) = view.owner().cloned() else {
            return Err(CliError::Application(
                crate::application::error::ApplicationError::NotAuthenticated,
            ));
        };

        redraw(&to_display(view.bookmarks()), color)?;
        eprintln!("Watching bookmarks of {} (Ctrl-C to stop)", owner);

        let mut seen = 0;
        while count.map_or(true, |limit| seen < limit) {
            let events = view.wait_for_events(WATCH_TICK)?;
            if events.is_empty() {
                continue;
            }
            seen += events.len();
            redraw(&to_display(view.bookmarks()), color)?;
            for event in &events {
                println!("{}", format_change(event, color));
            }
        }
        view.close();
    }
    Ok(())
}

fn redraw(bookmarks: &[DisplayBookmark], color: bool) -> CliResult<()> {
    let mut stderr = io::stderr();
    if color && stderr.is_terminal() {
        execute!(stderr, Clear(ClearType::All), MoveTo(0, 0))?;
    }
    show_bookmarks(bookmarks, DEFAULT_FIELDS, color);
    Ok(())
}

#[instrument(skip(cli))]
pub fn create_db(cli: Cli) -> CliResult<()> {
    if let Some(Commands::CreateDb { path }) = cli.command {
        let expanded = shellexpand::full(&path)
            .map_err(|e| CliError::InvalidInput(format!("Cannot expand {}: {}", path, e)))?
            .into_owned();

        if Path::new(&expanded).exists() {
            return Err(CliError::InvalidInput(format!(
                "Database already exists at: {}. Please choose a different path or delete the existing file.",
                expanded
            )));
        }

        eprintln!("Creating new database at: {}", expanded);

        // Create the store with the new path, parent directories included
        let store = SqliteBookmarkStore::from_url(&expanded)?;
        let mut conn = store.get_connection()?;
        migration::init_db(&mut conn)?;
        store.empty_bookmark_table()?;

        eprintln!("{}", format!("Database created successfully at: {}", expanded).green());
    }
    Ok(())
}
