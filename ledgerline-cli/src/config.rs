use anyhow::{Context, Result};
use clap::ValueEnum;
use ledgerline_ingest::{GrammarRegistry, LayoutGrammar};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_ledgerline_home;

pub const DEFAULT_MAX_INPUT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub output: OutputSection,
    /// Extra layout grammars, tried before the built-in ones
    #[serde(default)]
    pub grammars: Vec<LayoutGrammar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

fn default_max_input_bytes() -> u64 {
    DEFAULT_MAX_INPUT_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

fn default_pretty() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

pub fn config_path(custom: Option<&Path>) -> Result<PathBuf> {
    match custom {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(ensure_ledgerline_home()?.join("config.toml")),
    }
}

pub fn load_config(custom: Option<&Path>) -> Result<Config> {
    let p = config_path(custom)?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(custom: Option<&Path>) -> Result<()> {
    let p = config_path(custom)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// Built-in grammars plus any configured ones.
pub fn build_registry(cfg: &Config) -> Result<GrammarRegistry> {
    let mut registry = GrammarRegistry::builtin();
    // register() puts each new bank at the front; walk backwards so the
    // first configured grammar ends up tried first.
    for grammar in cfg.grammars.iter().rev() {
        let bank = grammar.bank.clone();
        registry
            .register(grammar.clone())
            .with_context(|| format!("configured grammar {bank}"))?;
    }
    Ok(registry)
}
