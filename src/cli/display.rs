// src/cli/display.rs

use crate::domain::bookmark::Bookmark;
use crate::domain::event::ChangeEvent;
use chrono::{DateTime, Utc};
use crossterm::style::Stylize;
use std::fmt;
use std::io::{self, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayField {
    Id,
    Url,
    Title,
    CreatedAt,
}

impl fmt::Display for DisplayField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayField::Id => write!(f, "ID"),
            DisplayField::Url => write!(f, "URL"),
            DisplayField::Title => write!(f, "Title"),
            DisplayField::CreatedAt => write!(f, "Created"),
        }
    }
}

pub const DEFAULT_FIELDS: &[DisplayField] = &[DisplayField::Id, DisplayField::Url, DisplayField::Title];

pub const ALL_FIELDS: &[DisplayField] = &[
    DisplayField::Id,
    DisplayField::Url,
    DisplayField::Title,
    DisplayField::CreatedAt,
];

#[derive(Debug, Clone)]
pub struct DisplayBookmark {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl DisplayBookmark {
    pub fn from_domain(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id.value(),
            url: bookmark.url.clone(),
            title: bookmark.title.clone(),
            created_at: bookmark.created_at,
        }
    }

    pub fn get_value(&self, field: &DisplayField) -> String {
        match field {
            DisplayField::Id => self.id.to_string(),
            DisplayField::Url => self.url.clone(),
            DisplayField::Title => self.title.clone(),
            DisplayField::CreatedAt => self.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Whether human output on stderr should be colored
pub fn use_color(no_color: bool) -> bool {
    !no_color && io::stderr().is_terminal()
}

/// Writes bookmarks as numbered entries: title and id, then the indented URL
pub fn write_bookmarks<W: Write>(
    out: &mut W,
    bookmarks: &[DisplayBookmark],
    fields: &[DisplayField],
    color: bool,
) -> io::Result<()> {
    let first_col_width = bookmarks.len().to_string().len();

    for (i, bm) in bookmarks.iter().enumerate() {
        let mut head = format!("{:first_col_width$}.", i + 1);
        if fields.contains(&DisplayField::Title) {
            let title = if color {
                bm.title.clone().green().to_string()
            } else {
                bm.title.clone()
            };
            head.push(' ');
            head.push_str(&title);
        }
        if fields.contains(&DisplayField::Id) {
            head.push_str(&format!(" [{}]", bm.get_value(&DisplayField::Id)));
        }
        writeln!(out, "{}", head)?;

        if fields.contains(&DisplayField::Url) {
            let url = if color {
                bm.url.clone().yellow().to_string()
            } else {
                bm.url.clone()
            };
            writeln!(out, "{:first_col_width$}  {}", "", url)?;
        }

        if fields.contains(&DisplayField::CreatedAt) {
            writeln!(
                out,
                "{:first_col_width$}  {}",
                "",
                bm.get_value(&DisplayField::CreatedAt)
            )?;
        }

        writeln!(out)?;
    }
    Ok(())
}

/// Display bookmarks on stderr
pub fn show_bookmarks(bookmarks: &[DisplayBookmark], fields: &[DisplayField], color: bool) {
    if bookmarks.is_empty() {
        eprintln!("No bookmarks to display");
        return;
    }
    let mut stderr = io::stderr().lock();
    if let Err(e) = write_bookmarks(&mut stderr, bookmarks, fields, color) {
        eprintln!("Error writing to stderr: {}", e);
    }
}

/// One-line description of a change, as printed by `watch`
pub fn format_change(event: &ChangeEvent, color: bool) -> String {
    let (tag, detail) = match event {
        ChangeEvent::Inserted(b) => ("+", format!("[{}] {}: {}", b.id, b.title, b.url)),
        ChangeEvent::Updated(b) => ("~", format!("[{}] {}: {}", b.id, b.title, b.url)),
        ChangeEvent::Deleted(id) => ("-", format!("[{}]", id)),
    };
    if !color {
        return format!("{} {}", tag, detail);
    }
    let tag = match event {
        ChangeEvent::Inserted(_) => tag.green(),
        ChangeEvent::Updated(_) => tag.yellow(),
        ChangeEvent::Deleted(_) => tag.red(),
    };
    format!("{} {}", tag, detail)
}
