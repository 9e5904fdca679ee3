//! cintool: inspect, compile and try out CIN input method tables.
mod typing;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libcin_core::{parse_cin, Config, Table};

#[derive(Parser)]
#[command(name = "cintool", version, about = "CIN input method table tool")]
struct Cli {
    /// Log engine decisions to stderr (filter with RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and normalize a table, then print a summary
    Check { file: PathBuf },

    /// Print a table as JSON
    Dump {
        file: PathBuf,
        /// Skip dialect normalization
        #[arg(long)]
        raw: bool,
    },

    /// Write a binary snapshot of a normalized table
    Compile {
        file: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Feed keys through an input session and print what happens
    Type {
        file: PathBuf,
        /// Key names: `a`, `Space`, `Backspace`, `Ctrl+,`, ...
        #[arg(required = true)]
        keys: Vec<String>,
        /// TOML configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Related-text phrase book (JSON)
        #[arg(long)]
        phrases: Option<PathBuf>,
        /// Second table to look committed characters up in
        #[arg(long)]
        cross: Option<PathBuf>,
        /// Print one JSON object per key
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    if !verbose {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("cannot install log subscriber: {e}");
    }
}

fn read_table_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn load_table(path: &Path) -> Result<Table> {
    let text = read_table_text(path)?;
    Table::from_cin(&text).with_context(|| format!("{}: invalid table", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load_toml(path).with_context(|| format!("{}: invalid config", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn check(file: &Path) -> Result<()> {
    let table = load_table(file)?;
    println!("ename:      {}", table.ename);
    println!("cname:      {}", table.cname);
    println!("selkey:     {}", table.selkey);
    println!("keys:       {}", table.chardef.len());
    println!("candidates: {}", table.chardef.candidate_count());
    if !table.endkey().is_empty() {
        println!("endkey:     {}", table.endkey());
    }
    for (name, value) in &table.directives {
        println!("%{name} {value}");
    }
    Ok(())
}

fn dump(file: &Path, raw: bool) -> Result<()> {
    let text = read_table_text(file)?;
    let table = if raw {
        parse_cin(&text)
    } else {
        Table::from_cin(&text)
    }
    .with_context(|| format!("{}: invalid table", file.display()))?;
    println!("{}", table.to_json()?);
    Ok(())
}

fn compile(file: &Path, out: &Path) -> Result<()> {
    let table = load_table(file)?;
    table
        .save_snapshot(out)
        .with_context(|| format!("cannot write {}", out.display()))?;
    println!(
        "Wrote {} ({} keys, {} candidates)",
        out.display(),
        table.chardef.len(),
        table.chardef.candidate_count()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Check { file } => check(&file),
        Command::Dump { file, raw } => dump(&file, raw),
        Command::Compile { file, out } => compile(&file, &out),
        Command::Type {
            file,
            keys,
            config,
            phrases,
            cross,
            json,
        } => {
            let table = load_table(&file)?;
            let config = load_config(config.as_deref())?;
            let cross = cross.as_deref().map(load_table).transpose()?;
            typing::run(table, &config, phrases.as_deref(), cross, &keys, json)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
