// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkstash", author, version, about, long_about = None)]
/// Personal bookmarks, kept in sync between sessions
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Act as this user (overrides LINKSTASH_USER and the config file)
    #[arg(short, long, value_name = "NAME")]
    pub user: Option<String>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long = "no-color", help = "disable colored output")]
    pub no_color: bool,

    #[arg(long = "generate-config", help = "print the default configuration")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a bookmark
    Add {
        /// URL; https:// is assumed when no scheme is given
        url: String,
        #[arg(short = 't', long = "title", help = "title, derived from the host when blank")]
        title: Option<String>,
    },
    /// List your bookmarks, newest first
    List {
        #[arg(long = "json", help = "output as json")]
        is_json: bool,

        #[arg(short = 'l', long = "long", help = "also show creation time")]
        long: bool,
    },
    /// Change the URL and/or title of a bookmark
    Edit {
        id: String,
        #[arg(long = "url", help = "new URL")]
        url: Option<String>,
        #[arg(short = 't', long = "title", help = "new title, blank derives it from the URL")]
        title: Option<String>,
    },
    /// Delete bookmarks
    Delete {
        /// list of ids, separated by comma, no blanks
        ids: String,
        #[arg(short = 'y', long = "yes", help = "do not ask for confirmation")]
        yes: bool,
    },
    /// Open bookmarks in the browser
    Open {
        /// list of ids, separated by comma, no blanks
        ids: String,
    },
    /// Show your bookmarks and keep the list current as other sessions change it
    Watch {
        #[arg(short = 'n', long = "count", help = "exit after this many changes")]
        count: Option<usize>,
    },
    /// Initialize bookmark database
    CreateDb {
        /// pathname to database file
        path: String,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}
