// todo CLI entry point

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, fmt, reload};

mod cli;

use cli::{Cli, Command};
use todostore::shell::{self, Outcome};
use todostore::{Config, Slot, TaskListStore, view};

type LevelHandle = reload::Handle<LevelFilter, Registry>;

// Installed before the config loads so its warnings reach stderr
fn setup_logging(verbose: bool) -> LevelHandle {
    let initial = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let (filter, handle) = reload::Layer::new(initial);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    handle
}

fn apply_config_level(handle: &LevelHandle, config: &Config) {
    let level = match config.log_level.parse::<LevelFilter>() {
        Ok(level) => level,
        Err(_) => {
            warn!(log_level = %config.log_level, "Unknown log level in config, keeping warn");
            return;
        }
    };

    if let Err(e) = handle.modify(|filter| *filter = level) {
        warn!(error = %e, "Failed to apply configured log level");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level_handle = setup_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_ref())?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }
    if !cli.verbose {
        apply_config_level(&level_handle, &config);
    }
    debug!(?config, "Starting todo");

    let slot = config.open_slot().context("Failed to open task storage")?;
    let mut store = TaskListStore::with_options(slot, config.store_options());
    store.set_filter(config.default_filter);

    match cli.command.unwrap_or(Command::List { filter: None }) {
        Command::Add { text } => {
            if !store.add_or_update(&text.join(" ")) {
                return Err(eyre!("Task text cannot be empty"));
            }
            println!("{}", view::render_list(&store));
        }
        Command::Edit { id, text } => {
            let id = shell::resolve_id(&store, &id)?;
            store.begin_edit(&id);
            if !store.add_or_update(&text.join(" ")) {
                return Err(eyre!("Task text cannot be empty"));
            }
            println!("{}", view::render_list(&store));
        }
        Command::Toggle { id } => {
            let id = shell::resolve_id(&store, &id)?;
            store.toggle_completed(&id);
            println!("{}", view::render_list(&store));
        }
        Command::Delete { id } => {
            let id = shell::resolve_id(&store, &id)?;
            store.delete(&id);
            println!("{}", view::render_list(&store));
        }
        Command::Clear => {
            let removed = store.clear_all();
            println!("{} {} tasks", "Removed".red(), removed);
        }
        Command::List { filter } => {
            if let Some(filter) = filter {
                store.set_filter(filter.as_str());
            }
            println!("{}", view::render_list(&store));
        }
        Command::Shell => run_shell(&mut store)?,
    }

    Ok(())
}

fn run_shell<S: Slot>(store: &mut TaskListStore<S>) -> Result<()> {
    println!("{}", view::render_list(store));
    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", view::render_prompt(store));
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read input")?;

        match shell::execute(store, &line) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Continue(Some(message))) => println!("{}", message),
            Ok(Outcome::Continue(None)) => {}
            Err(e) => eprintln!("{} {}", "error:".red(), e),
        }
    }

    Ok(())
}
