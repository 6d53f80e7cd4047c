use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerline_core::{Bank, ParsedStatement};
use ledgerline_ingest::StatementParser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod export;
mod state;

use config::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "ledgerline",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LEDGERLINE_BUILD_SHA"), ")"),
    about = "Rebuild a balance-checked ledger from bank statement text"
)]
struct Cli {
    /// Config file (default: ~/.ledgerline/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr (LEDGERLINE_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse extracted statement text into a ledger
    Parse {
        /// Text file produced by a PDF-to-text extractor
        file: PathBuf,

        /// Skip detection and use this format (e.g. capitec, fnb)
        #[arg(long)]
        bank: Option<Bank>,

        /// Output format (default from config, else json)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Write here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Report which statement format a file matches
    Detect { file: PathBuf },

    /// List known formats in detection order
    Formats,

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg_path = cli.config.as_deref();
    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(cfg_path)?,
        },
        Command::Formats => {
            let parser = parser_for(&config::load_config(cfg_path)?)?;
            for g in parser.registry().iter() {
                println!(
                    "{:<12} {:<10} markers: {}",
                    g.bank().id(),
                    g.bank().display_name(),
                    g.descriptor().markers.join(", ")
                );
            }
        }
        Command::Detect { file } => {
            let cfg = config::load_config(cfg_path)?;
            let parser = parser_for(&cfg)?;
            let text = state::read_statement(&file, cfg.engine.max_input_bytes)?;
            let grammar = parser
                .detect(&text)
                .with_context(|| format!("detect format of {}", file.display()))?;
            println!("{}", grammar.bank());
        }
        Command::Parse { file, bank, format, out } => {
            let cfg = config::load_config(cfg_path)?;
            let parser = parser_for(&cfg)?;
            let text = state::read_statement(&file, cfg.engine.max_input_bytes)?;
            let parsed = parser
                .parse(&text, bank.as_ref())
                .with_context(|| format!("parse {}", file.display()))?;

            report_validation(&parsed);

            let rendered = match format.unwrap_or(cfg.output.format) {
                OutputFormat::Json => export::to_json(&parsed, cfg.output.pretty)?,
                OutputFormat::Csv => export::to_csv(&parsed)?,
            };
            state::write_output(out.as_deref(), &rendered)?;
        }
    }

    Ok(())
}

fn parser_for(cfg: &config::Config) -> Result<StatementParser> {
    Ok(StatementParser::new(config::build_registry(cfg)?))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("LEDGERLINE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Continuity warnings go to stderr so stdout stays machine-readable.
fn report_validation(parsed: &ParsedStatement) {
    let n = parsed.transactions.len();
    if parsed.validation.valid {
        eprintln!("{n} transactions, ledger balances");
        return;
    }
    eprintln!(
        "{n} transactions, {} warning(s):",
        parsed.validation.warnings.len()
    );
    for w in &parsed.validation.warnings {
        eprintln!("  - {w}");
    }
}
