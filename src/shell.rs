//! Interactive command shell.
//!
//! Reads whitespace-tokenized commands line by line and writes results to
//! any [`Write`] sink. Errors from a command are rendered as one capitalized
//! line and never end the loop.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ingest <path>` | Batch-ingest a `.csv`, `.psv`, or `.ssv` file |
//! | `list <profile>` | Print stored records in a shell sort profile |
//! | `help` | Show commands and sort profiles |
//! | `exit`, `quit` | Leave the shell |

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Result, RosterError};
use crate::format::DelimiterTable;
use crate::models::Record;
use crate::parse::ingest_file;
use crate::sort::{sort_records, QueryProfile, ShellProfile, SortProfile};
use crate::store::Store;

const CMD_INGEST: &str = "ingest";
const CMD_LIST: &str = "list";
const CMD_HELP: &str = "help";
const CMD_EXIT: &str = "exit";
const CMD_QUIT: &str = "quit";

const LISTING_HEADER: &str = " ---------------- Listing entries -----------------";
const LISTING_FOOTER: &str = " --------------------------------------------------";

/// Whether the loop should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Command handler bound to a store and a delimiter table.
pub struct Shell {
    store: Arc<dyn Store>,
    table: Arc<DelimiterTable>,
    working_dir: PathBuf,
}

impl Shell {
    pub fn new(store: Arc<dyn Store>, table: Arc<DelimiterTable>, working_dir: PathBuf) -> Self {
        Self {
            store,
            table,
            working_dir,
        }
    }

    /// Runs the read-eval-print loop until `exit`, `quit`, or end of input.
    ///
    /// `prompt` is written before each read when given; pass `None` for
    /// piped input.
    pub fn run<R, W>(&self, input: R, out: &mut W, prompt: Option<&str>) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut lines = input.lines();
        loop {
            if let Some(prompt) = prompt {
                write!(out, "{}", prompt)?;
                out.flush()?;
            }

            let Some(line) = lines.next() else {
                info!("end of input, leaving shell");
                return Ok(());
            };
            let line = line?;
            debug!(input = %line, "received command");

            match self.handle_input(&line, out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(RosterError::Io(err)) if err.kind() == io::ErrorKind::BrokenPipe => {
                    return Err(err);
                }
                Err(err) => {
                    debug!(error = %err, "command failed");
                    writeln!(out, "{}", capitalize(&err.to_string()))?;
                }
            }
        }
    }

    /// Processes one line of input.
    pub fn handle_input<W: Write>(&self, line: &str, out: &mut W) -> Result<Flow> {
        let command: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = command.split_first() else {
            debug!("command was empty, no action taken");
            return Ok(Flow::Continue);
        };

        match name {
            CMD_INGEST => {
                let [target] = args else {
                    return Err(RosterError::InvalidArgument(
                        "expecting 1 argument for 'ingest' command".to_string(),
                    ));
                };
                let path = self.resolve(target);
                let outcome = ingest_file(&path, &self.table)?;
                let skipped = outcome.skipped.len();
                let written = self.store.upsert_all(outcome.records);
                info!(path = %path.display(), written, skipped, "ingested file");

                writeln!(out, "Successfully ingested '{}'", path.display())?;
                if skipped > 0 {
                    writeln!(out, "Skipped {} invalid line(s)", skipped)?;
                }
            }
            CMD_LIST => {
                let [token] = args else {
                    return Err(RosterError::InvalidArgument(
                        "expecting 1 argument for 'list' command".to_string(),
                    ));
                };
                let profile: ShellProfile = token.parse()?;
                let records = sort_records(self.store.all_values(), profile);
                write_listing(out, &records)?;
            }
            CMD_HELP => write_help(out)?,
            CMD_EXIT | CMD_QUIT => return Ok(Flow::Exit),
            _ => writeln!(out, "Unrecognized command")?,
        }

        Ok(Flow::Continue)
    }

    fn resolve(&self, target: &str) -> PathBuf {
        let path = Path::new(target);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// Writes records between the listing header and footer, one per line.
pub fn write_listing<W: Write>(out: &mut W, records: &[Record]) -> io::Result<()> {
    writeln!(out, "{}", LISTING_HEADER)?;
    for record in records {
        writeln!(out, "{}", record)?;
    }
    writeln!(out, "{}", LISTING_FOOTER)
}

/// Writes both sort-profile sets. They intentionally differ per surface.
pub fn write_profiles<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Shell profiles (list <profile>):")?;
    write_profile_set::<ShellProfile, W>(out)?;
    writeln!(out, "HTTP profiles (GET /records/<profile>):")?;
    write_profile_set::<QueryProfile, W>(out)?;
    writeln!(
        out,
        "Note: the two sets are independent; e.g. shell email order is descending, HTTP is ascending."
    )
}

fn write_profile_set<P: SortProfile, W: Write>(out: &mut W) -> io::Result<()> {
    for profile in P::ALL {
        writeln!(out, "  {:<34} {}", profile.token(), profile.description())?;
    }
    Ok(())
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  ingest <path>     load a .csv, .psv, or .ssv file")?;
    writeln!(out, "  list <profile>    print stored records")?;
    writeln!(out, "  help              show this message")?;
    writeln!(out, "  exit | quit       leave the shell")?;
    writeln!(out, "Profiles:")?;
    write_profile_set::<ShellProfile, W>(out)
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
