//! # Roster CLI (`roster`)
//!
//! Starts the interactive shell and the HTTP server over one shared
//! in-memory record store, or runs either on its own.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `roster run` | HTTP server in the background, shell in the foreground (default) |
//! | `roster shell` | Shell only |
//! | `roster serve` | HTTP server only |
//! | `roster list <profile> <file>...` | Ingest files and print one listing |
//! | `roster profiles` | Show the shell and HTTP sort profiles |
//!
//! ## Examples
//!
//! ```bash
//! roster --config ./config/roster.toml run
//! roster serve --bind 0.0.0.0:8080
//! roster list output2-birthdate-asc people.csv people.psv
//! echo "ingest people.csv" | roster shell
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use roster::config::{self, Config};
use roster::format::DelimiterTable;
use roster::logging;
use roster::parse;
use roster::server;
use roster::shell::{self, Shell};
use roster::sort::{sort_records, ShellProfile};
use roster::store::memory::InMemoryStore;
use roster::store::Store;

/// Roster: ingest delimited personal records and list them back sorted.
#[derive(Parser)]
#[command(
    name = "roster",
    about = "Ingest delimited personal records and query them by sort profile",
    version,
    long_about = "Roster reads .csv, .psv, and .ssv record files through an interactive shell \
    and single records through an HTTP API, keeps them in memory keyed by email, and lists \
    them in predefined sort orders."
)]
struct Cli {
    /// Path to a configuration file (TOML).
    ///
    /// When omitted, built-in defaults are used: bind 127.0.0.1:8080,
    /// prompt `prompt>`, log level `info`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the interactive shell together.
    ///
    /// Both share one record store. The process exits when the shell ends.
    Run {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Start only the interactive shell.
    ///
    /// Reads commands from stdin; the prompt is shown only on a terminal.
    Shell,

    /// Start only the HTTP server.
    Serve {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Ingest one or more files and print a single listing.
    ///
    /// Invalid lines are skipped with a warning; any other failure aborts.
    List {
        /// Shell sort profile, e.g. `output1-email-desc-lastname-asc`.
        profile: String,

        /// Record files (.csv, .psv, .ssv), ingested in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the sort profiles accepted by the shell and the HTTP API.
    Profiles,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::minimal(),
    };
    logging::init(&cfg.logging)?;

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let table = Arc::new(DelimiterTable::with_builtins());

    match cli.command.unwrap_or(Commands::Run { bind: None }) {
        Commands::Run { bind } => {
            let bind_addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
            let server_store = store.clone();
            let server_table = table.clone();
            let server = tokio::spawn(async move {
                server::run_server(&bind_addr, server_store, server_table).await
            });

            let shell = Shell::new(store, table, cfg.working_dir()?);
            let prompt = shell_prompt(&cfg);
            let (done_tx, done_rx) = tokio::sync::oneshot::channel();
            std::thread::Builder::new()
                .name("shell".to_string())
                .spawn(move || {
                    let _ = done_tx.send(run_stdin_shell(&shell, prompt.as_deref()));
                })
                .context("Failed to start shell thread")?;

            tokio::select! {
                finished = done_rx => {
                    finished.context("shell thread exited unexpectedly")??;
                }
                stopped = server => {
                    stopped??;
                    bail!("server stopped unexpectedly");
                }
            }
        }
        Commands::Shell => {
            let shell = Shell::new(store, table, cfg.working_dir()?);
            run_stdin_shell(&shell, shell_prompt(&cfg).as_deref())?;
        }
        Commands::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| cfg.server.bind.clone());
            server::run_server(&bind_addr, store, table).await?;
        }
        Commands::List { profile, files } => {
            let profile: ShellProfile = profile.parse()?;
            let base = cfg.working_dir()?;
            for file in files {
                let path = if file.is_absolute() { file } else { base.join(file) };
                let outcome = parse::ingest_file(&path, &table)?;
                let written = store.upsert_all(outcome.records);
                info!(
                    path = %path.display(),
                    written,
                    skipped = outcome.skipped.len(),
                    "ingested file"
                );
            }

            let records = sort_records(store.all_values(), profile);
            let mut stdout = io::stdout().lock();
            shell::write_listing(&mut stdout, &records)?;
            stdout.flush()?;
        }
        Commands::Profiles => {
            shell::write_profiles(&mut io::stdout().lock())?;
        }
    }

    Ok(())
}

/// The prompt is only shown when a person is typing.
fn shell_prompt(cfg: &Config) -> Option<String> {
    atty::is(atty::Stream::Stdin).then(|| cfg.shell.prompt.clone())
}

fn run_stdin_shell(shell: &Shell, prompt: Option<&str>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout, prompt)
}
