//! The Groove command-line tool.
//!
//! - `groove complete <file> --offset N` - List completion candidates at a byte offset
//! - `groove apply <file> --offset N --pick LOOKUP` - Insert a candidate and print the result
//! - `groove lsp` - Start the LSP server (communicates via stdin/stdout)
//!
//! `--config` reads a `groove.toml`; `--index` merges a JSON class index over
//! the bundled JDK and Groovy classes. Logging goes to stderr, filtered by
//! `GROOVE_LOG` (default `warn`).

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use groove_completion::{
    Candidate, ClassIndex, CompletionConfig, CompletionEngine, CompletionList, CompletionRequest,
    GrooveError,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "groove", version, about = "Context-sensitive completion for Groovy sources")]
struct Cli {
    /// Completion settings (groove.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Class index (JSON) merged over the bundled one
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List completion candidates at a position
    Complete {
        /// Groovy source file
        file: PathBuf,

        /// Byte offset of the caret
        #[arg(long)]
        offset: u32,

        /// Smart (type-matching) completion instead of basic
        #[arg(long)]
        smart: bool,

        /// Print the candidate list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Insert a candidate and print the edited source
    Apply {
        /// Groovy source file
        file: PathBuf,

        /// Byte offset of the caret
        #[arg(long)]
        offset: u32,

        /// Lookup string of the candidate to insert
        #[arg(long)]
        pick: String,

        /// Pick from smart completion instead of basic
        #[arg(long)]
        smart: bool,
    },
    /// Start the LSP server (communicates via stdin/stdout)
    Lsp,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Groove(#[from] GrooveError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no candidate `{lookup}` (available: {available})")]
    NoCandidate { lookup: String, available: String },

    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GROOVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => CompletionConfig::from_file(path)?,
        None => CompletionConfig::default(),
    };
    let index = Arc::new(load_index(cli.index.as_deref())?);

    match cli.command {
        Commands::Complete {
            file,
            offset,
            smart,
            json,
        } => {
            let source = read_source(&file)?;
            let engine = CompletionEngine::new(config, index);
            let list = engine.complete(&request(&source, offset, smart))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_list(&list);
            }
        }
        Commands::Apply {
            file,
            offset,
            pick,
            smart,
        } => {
            let source = read_source(&file)?;
            let engine = CompletionEngine::new(config, index);
            let list = engine.complete(&request(&source, offset, smart))?;
            let candidate = list.find(&pick).ok_or_else(|| CliError::NoCandidate {
                available: list.lookups().join(", "),
                lookup: pick,
            })?;
            let edit = engine.apply(candidate, &source, offset)?;
            debug!(caret = edit.caret, edits = edit.edits.len(), "applied candidate");
            print!("{}", edit.apply_to(&source));
        }
        Commands::Lsp => {
            let rt = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
            rt.block_on(groove_lsp::run_server(config, index));
        }
    }
    Ok(())
}

fn load_index(extra: Option<&Path>) -> Result<ClassIndex, GrooveError> {
    let mut index = ClassIndex::bundled();
    if let Some(path) = extra {
        let loaded = ClassIndex::from_file(path)?;
        debug!(path = %path.display(), classes = loaded.len(), "merging class index");
        index.merge(loaded);
    }
    Ok(index)
}

fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn request(source: &str, offset: u32, smart: bool) -> CompletionRequest {
    if smart {
        CompletionRequest::smart(source, offset)
    } else {
        CompletionRequest::basic(source, offset)
    }
}

fn print_list(list: &CompletionList) {
    for candidate in list {
        println!("{}", describe(candidate));
    }
}

/// One line per candidate: lookup string and tail, then the type.
fn describe(candidate: &Candidate) -> String {
    let label = format!(
        "{}{}",
        candidate.lookup,
        candidate.tail.as_deref().unwrap_or_default()
    );
    match &candidate.type_text {
        Some(ty) => format!("{label:<40} {ty}"),
        None => label,
    }
}
