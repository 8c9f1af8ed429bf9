//! `.env` file reader.
//!
//! One `KEY=VALUE` entry per line. Keys may contain `/` so that
//! `module/KEY` entries can be routed into entity scopes.

use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

/// Parses the entries of an environment file, in file order.
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is ignored,
/// and the first `=` separates key and value. Values wrapped in matching
/// single or double quotes are unquoted. Lines without `=` are skipped.
#[must_use]
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

/// Reads and parses the environment file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_env_file(path: &Path) -> io::Result<Vec<(String, String)>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_env(&content))
}

fn parse_line(number: usize, line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let Some((key, value)) = line.split_once('=') else {
        warn!(line = number, "skipping env entry without '='");
        return None;
    };

    let key = key.trim();
    if key.is_empty() {
        warn!(line = number, "skipping env entry with empty key");
        return None;
    }

    Some((key.to_string(), unquote(value.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| value.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(value)
}
