#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// A glob utility function to find paths to files with a certain extension
/// directly inside `dir`, sorted for deterministic discovery order.
pub fn find_files(extension: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(format!("*.{extension}"));
    let pattern = pattern
        .to_str()
        .context("could not convert search directory to string")?
        .to_string();

    let mut files: Vec<PathBuf> = glob(&pattern)
        .context("could not create glob")?
        .filter_map(Result::ok)
        .collect();
    files.sort();
    Ok(files)
}

/// Escapes text for embedding in the HTML report.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
