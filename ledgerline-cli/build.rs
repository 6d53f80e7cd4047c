use std::fs;
use std::path::{Path, PathBuf};

// Stamps the binary with the commit it was built from. Reads .git directly so
// builds outside a checkout (or without git installed) still work.
fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let git_dir = Path::new(&manifest_dir).join("..").join(".git");

    let sha = head_commit(&git_dir).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=LEDGERLINE_BUILD_SHA={sha}");
}

fn head_commit(git_dir: &Path) -> Option<String> {
    let head_path = git_dir.join("HEAD");
    if !head_path.exists() {
        return None;
    }
    println!("cargo:rerun-if-changed={}", head_path.display());

    let head = fs::read_to_string(&head_path).ok()?;
    let head = head.trim();
    let full = match head.strip_prefix("ref: ") {
        Some(reference) => {
            let ref_path: PathBuf = git_dir.join(reference);
            // Packed refs have no loose file; rerun when the pack changes instead.
            if ref_path.exists() {
                println!("cargo:rerun-if-changed={}", ref_path.display());
                fs::read_to_string(&ref_path).ok()?.trim().to_string()
            } else {
                let packed = git_dir.join("packed-refs");
                println!("cargo:rerun-if-changed={}", packed.display());
                packed_ref(&fs::read_to_string(packed).ok()?, reference)?
            }
        }
        None => head.to_string(),
    };

    let short: String = full.chars().take(7).collect();
    (short.len() == 7 && short.chars().all(|c| c.is_ascii_hexdigit())).then_some(short)
}

fn packed_ref(packed: &str, reference: &str) -> Option<String> {
    packed
        .lines()
        .filter(|l| !l.starts_with('#') && !l.starts_with('^'))
        .find_map(|l| {
            let (sha, name) = l.split_once(' ')?;
            (name.trim() == reference).then(|| sha.to_string())
        })
}
