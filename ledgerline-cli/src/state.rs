use anyhow::{Context, Result, bail};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn ledgerline_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ledgerline"))
}

pub fn ensure_ledgerline_home() -> Result<PathBuf> {
    let dir = ledgerline_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Read extracted statement text, refusing files over `max_bytes`.
pub fn read_statement(path: &Path, max_bytes: u64) -> Result<String> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.len() > max_bytes {
        bail!(
            "{} is {} bytes, over the {} byte input limit (raise engine.max_input_bytes)",
            path.display(),
            meta.len(),
            max_bytes
        );
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Write rendered output to a file, or stdout when no path is given.
pub fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(p) => fs::write(p, content).with_context(|| format!("write {}", p.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ledgerline-state-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_read_statement_enforces_limit() {
        let path = scratch("big.txt");
        fs::write(&path, "x".repeat(64)).unwrap();
        assert!(read_statement(&path, 64).is_ok());
        let err = read_statement(&path, 63).unwrap_err();
        assert!(err.to_string().contains("input limit"));
    }

    #[test]
    fn test_write_output_to_file() {
        let path = scratch("out.csv");
        write_output(Some(&path), "a,b\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");
    }
}
