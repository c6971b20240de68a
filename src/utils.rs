use std::path::{Path, PathBuf};

pub mod nbt;

/// Sanitize a structure identifier into a filename: path separators and
/// anything outside `[A-Za-z0-9_\-. ]` become `_`, runs of whitespace
/// collapse to one space, and the result is capped at 150 characters.
pub fn safe_filename(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "unnamed".to_string();
    }

    let replaced: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let collapsed = replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    collapsed.chars().take(150).collect()
}

/// Convert `namespace:name` to `name`. Identifiers without a namespace pass
/// through unchanged.
pub fn strip_namespace(identifier: &str) -> &str {
    match identifier.split_once(':') {
        Some((_, name)) => name,
        None => identifier,
    }
}

/// Find a free path for `filename` inside `directory`, appending `_1`,
/// `_2`, ... before the extension until no file exists there.
pub fn unique_path(directory: &Path, filename: &str) -> PathBuf {
    let path = directory.join(filename);
    if !path.exists() {
        return path;
    }

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{}", ext)),
        None => (filename.to_string(), String::new()),
    };

    let mut i = 1;
    loop {
        let candidate = directory.join(format!("{}_{}{}", stem, i, ext));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

/// Split an export path prefix into (output directory, base name).
///
/// The prefix usually comes from a file picker, so it is treated as
/// `dirname(prefix)` + `basename(prefix)`. Empty input maps to the current
/// directory with base `"structure"`; a trailing slash means "directory
/// only".
pub fn split_export_prefix(prefix: &str) -> (PathBuf, String) {
    let prefix = prefix.trim().replace('\\', "/");
    if prefix.is_empty() {
        return (PathBuf::from("."), "structure".to_string());
    }

    if prefix.ends_with('/') {
        return (
            PathBuf::from(prefix.trim_end_matches('/')),
            "structure".to_string(),
        );
    }

    let path = Path::new(&prefix);
    let directory = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("structure")
        .to_string();

    (directory, base)
}

/// Parse a Bedrock platform version from free text. Accepts "1.21.132",
/// "1,21,132", "1 21 132" and similar: every non-digit is a separator and
/// the first three integer groups win.
pub fn parse_bedrock_version(s: &str) -> Option<(i32, i32, i32)> {
    let mut groups = Vec::new();
    let mut current = String::new();
    for c in s.trim().chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    if groups.len() < 3 {
        return None;
    }
    Some((
        groups[0].parse().ok()?,
        groups[1].parse().ok()?,
        groups[2].parse().ok()?,
    ))
}
