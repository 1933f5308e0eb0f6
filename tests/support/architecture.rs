//! Source scanning for the layering contract tests.

use std::fs;
use std::path::{Path, PathBuf};

/// One source line that matched a forbidden pattern.
#[derive(Debug)]
pub struct LineHit {
    pub file: String,
    pub line: usize,
    pub text: String,
}

/// Every line under `relative_dir` (recursively, `.rs` files only) that
/// contains any of `patterns`, in path order.
pub fn find_lines_containing(relative_dir: &str, patterns: &[&str]) -> Vec<LineHit> {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut sources = Vec::new();
    rust_sources(&manifest.join(relative_dir), &mut sources);
    sources.sort();

    sources
        .iter()
        .flat_map(|path| {
            let body = fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
            let file = path
                .strip_prefix(manifest)
                .unwrap_or(path)
                .display()
                .to_string()
                .replace('\\', "/");
            body.lines()
                .enumerate()
                .filter(|(_, text)| patterns.iter().any(|p| text.contains(p)))
                .map(|(idx, text)| LineHit {
                    file: file.clone(),
                    line: idx + 1,
                    text: text.trim().to_owned(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let listing = fs::read_dir(dir).unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()));
    for entry in listing.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}
