// src/main.rs
use clap::Parser;
use crossterm::style::Stylize;
use linkstash::application::error::ApplicationError;
use linkstash::cli::args::Cli;
use linkstash::cli::error::CliError;
use linkstash::config::load_settings;
use linkstash::exitcode;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::{self, format::FmtSpan},
    prelude::*,
};

#[instrument]
fn main() {
    let mut cli = Cli::parse();

    setup_logging(cli.debug, cli.no_color);

    let mut settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(exitcode::CONFIG);
        }
    };
    if let Some(user) = cli.user.take() {
        debug!("User from command line: {}", user);
        settings.user = Some(user);
    }

    if let Err(e) = linkstash::cli::execute_command(cli, &settings) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(exit_code_for(&e));
    }
}

fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::InvalidInput(_)
        | CliError::InvalidIdFormat(_)
        | CliError::Application(ApplicationError::Validation(_)) => exitcode::USAGE,
        CliError::Io(_) => exitcode::IOERR,
        _ => exitcode::FAILURE,
    }
}

fn setup_logging(verbosity: u8, no_color: bool) {
    debug!("INIT: Attempting logger init from main.rs");

    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // diesel and r2d2 are chatty at trace level
    let noisy_modules = ["r2d2", "diesel_migrations"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(!no_color)
        .with_thread_names(verbosity >= 3)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => info!("Debug mode: info"),
        LevelFilter::DEBUG => debug!("Debug mode: debug"),
        LevelFilter::TRACE => debug!("Debug mode: trace"),
        _ => {}
    }
}
