//! # DocSense CLI
//!
//! Ask natural-language questions against uploaded documents or against
//! allow-listed local folders, answered by a local Ollama model grounded
//! strictly in retrieved text.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsense ask "<query>" --file <path>...` | Ingest the named files, answer from them |
//! | `docsense scout "<query>" --allow <dir>...` | Grant folders, answer from matching files |
//! | `docsense repl` | Interactive session keeping index and grants in memory |
//!
//! ## Examples
//!
//! ```bash
//! docsense ask "summarize the Q3 numbers" --file report.xlsx
//! docsense scout "what does the budget file say about rent?" --allow ~/Documents
//! docsense repl --config ./docsense.toml
//! ```
//!
//! Index and allow-list are in-memory only; nothing survives the process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use docsense::config::{load_config, Config};
use docsense::error::Error;
use docsense::models::{DiskAnswer, UploadAnswer};
use docsense::session::Session;

/// DocSense — local-first grounded document QA.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file falls back to built-in defaults (local Ollama,
/// `phi3` for QA, `llama3` for keyword extraction, `nomic-embed-text`).
#[derive(Parser)]
#[command(
    name = "docsense",
    about = "DocSense — ask questions against uploads or allow-listed local folders, grounded in retrieved text",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file uses defaults.
    #[arg(long, global = true, default_value = "./docsense.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest documents and answer a question from them.
    ///
    /// Supported formats: pdf, docx, xlsx, xls, csv, txt, md (plus
    /// script-like text files). The index is built fresh for this
    /// invocation and discarded afterward.
    Ask {
        /// The question to answer.
        query: String,
        /// Document(s) to ingest; repeatable. All files are indexed
        /// together for this invocation.
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },

    /// Grant folder access and answer a question from matching files.
    ///
    /// A keyword is extracted from the query, files matching it by name or
    /// content are read (capped), and the accessed files are listed with
    /// the answer.
    Scout {
        /// The question or instruction.
        query: String,
        /// Folder(s) to allow-list; repeatable.
        #[arg(long = "allow", required = true)]
        dirs: Vec<PathBuf>,
    },

    /// Interactive session: load files, grant folders, ask questions.
    ///
    /// Commands inside the REPL: `load <file>`, `grant <dir>`,
    /// `mode uploads|disk`, `forget`, `quit`. Anything else is a query in
    /// the current mode.
    Repl,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Ask { query, files } => run_ask(config, &query, &files).await,
        Commands::Scout { query, dirs } => run_scout(config, &query, &dirs).await,
        Commands::Repl => run_repl(config).await,
    }
}

async fn run_ask(config: Config, query: &str, files: &[PathBuf]) -> Result<()> {
    let mut session = Session::new(config);

    let mut uploads = Vec::with_capacity(files.len());
    for file in files {
        let bytes = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        uploads.push((bytes, name));
    }
    let count = session.ingest_batch(&uploads).await?;
    println!("indexed {} chunks from {} file(s)", count, uploads.len());

    match session.ask_uploads(query).await {
        Ok(answer) => print_upload_answer(&answer),
        Err(Error::EmptyResult(msg)) => println!("warning: {}", msg),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn run_scout(config: Config, query: &str, dirs: &[PathBuf]) -> Result<()> {
    let mut session = Session::new(config);

    for dir in dirs {
        let (ok, message) = session.grant(&dir.display().to_string());
        if ok {
            println!("{}", message);
        } else {
            println!("error: {}", message);
        }
    }

    match session.ask_disk(query).await {
        Ok(answer) => print_disk_answer(&answer),
        Err(Error::EmptyResult(msg)) => println!("warning: {}", msg),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn run_repl(config: Config) -> Result<()> {
    let mut session = Session::new(config);
    let mut disk_mode = false;

    println!("docsense repl — load <file>, grant <dir>, mode uploads|disk, forget, quit");
    loop {
        print!("{}> ", if disk_mode { "disk" } else { "uploads" });
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" => break,
            "forget" => {
                session.forget();
                println!("forgot index and granted paths");
            }
            "mode" => match rest {
                "uploads" => disk_mode = false,
                "disk" => disk_mode = true,
                _ => println!("usage: mode uploads|disk"),
            },
            "grant" => {
                let (_, message) = session.grant(rest);
                println!("{}", message);
            }
            "load" => {
                let path = PathBuf::from(rest);
                match std::fs::read(&path) {
                    Ok(bytes) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_else(|| rest.to_string());
                        match session.ingest(&bytes, &name).await {
                            Ok(count) => println!("indexed {} chunks from {}", count, name),
                            Err(e) => println!("error: {}", e),
                        }
                    }
                    Err(e) => println!("error: failed to read {}: {}", path.display(), e),
                }
            }
            _ => {
                // Anything else is a query in the current mode.
                if disk_mode {
                    match session.ask_disk(line).await {
                        Ok(answer) => print_disk_answer(&answer),
                        Err(Error::EmptyResult(msg)) => println!("warning: {}", msg),
                        Err(e) => println!("error: {}", e),
                    }
                } else {
                    match session.ask_uploads(line).await {
                        Ok(answer) => print_upload_answer(&answer),
                        Err(Error::EmptyResult(msg)) => println!("warning: {}", msg),
                        Err(e) => println!("error: {}", e),
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_upload_answer(answer: &UploadAnswer) {
    println!("{}", answer.answer);
    println!();
    println!("sources:");
    for retrieved in &answer.sources {
        let snippet: String = retrieved.chunk.text.chars().take(120).collect();
        println!(
            "  {} @ {} (score {:.3}): {}",
            retrieved.chunk.source,
            retrieved.chunk.start_offset,
            retrieved.score,
            snippet.replace('\n', " ")
        );
    }
}

fn print_disk_answer(answer: &DiskAnswer) {
    println!("searched for files matching: '{}'", answer.keyword);
    println!();
    println!("{}", answer.answer);
    println!();
    println!("files accessed:");
    for scout_match in &answer.accessed {
        println!("  {}", scout_match.path.display());
    }
}
