//! Numbered backups of the file about to be rewritten.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

/// Name for the next backup of `file_name`, given the names of the files
/// next to it.
///
/// Backups are named `<file>.bk<N>` with `N` one past the highest existing
/// backup number. Returns `None` if `file_name` itself is not among
/// `siblings`, since there is nothing to back up, or if the backup numbers
/// are exhausted.
pub fn next_backup_name<'a, I>(file_name: &str, siblings: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let pattern = Regex::new(&format!(r"^{}(?:\.bk(\d+))?$", regex::escape(file_name))).ok()?;

    let mut exists = false;
    let mut highest = 0u64;

    for name in siblings {
        let Some(caps) = pattern.captures(name) else {
            continue;
        };
        match caps.get(1) {
            Some(index) => {
                if let Ok(index) = index.as_str().parse::<u64>() {
                    highest = highest.max(index);
                }
            }
            None => exists = true,
        }
    }

    if !exists {
        return None;
    }
    let next = highest.checked_add(1)?;
    Some(format!("{file_name}.bk{next}"))
}

/// Copy `path` to its next numbered backup.
///
/// Returns the backup's path, or `None` if `path` does not exist yet.
pub fn backup_file(path: &Path) -> Result<Option<PathBuf>> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
        }
    };
    let names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();

    let Some(backup_name) = next_backup_name(file_name, names.iter().map(String::as_str)) else {
        return Ok(None);
    };

    let backup_path = dir.join(backup_name);
    fs::copy(path, &backup_path).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            path.display(),
            backup_path.display()
        )
    })?;

    Ok(Some(backup_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_first_backup() {
        let name = next_backup_name("README.md", ["README.md", "LICENSE"]);
        assert_eq!(name.as_deref(), Some("README.md.bk1"));
    }

    #[test]
    fn test_backup_after_highest() {
        let name = next_backup_name(
            "README.md",
            ["README.md.bk2", "README.md", "README.md.bk10", "README.md.bkx"],
        );
        assert_eq!(name.as_deref(), Some("README.md.bk11"));
    }

    #[test]
    fn test_nothing_to_back_up() {
        assert_eq!(next_backup_name("README.md", ["README.md.bk1", "README"]), None);
    }

    #[test]
    fn test_exhausted_backup_numbers() {
        let last = format!("README.md.bk{}", u64::MAX);
        assert_eq!(
            next_backup_name("README.md", ["README.md", last.as_str()]),
            None
        );
    }

    #[test]
    fn test_name_is_matched_literally() {
        // '.' must not match any character
        assert_eq!(next_backup_name("README.md", ["READMEXmd"]), None);
    }

    #[test]
    fn test_backup_file_copies_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, "original").unwrap();

        let first = backup_file(&path).unwrap().unwrap();
        assert_eq!(first.file_name().unwrap(), "notes.txt.bk1");
        assert_eq!(fs::read_to_string(&first).unwrap(), "original");

        let second = backup_file(&path).unwrap().unwrap();
        assert_eq!(second.file_name().unwrap(), "notes.txt.bk2");
    }

    #[test]
    fn test_backup_of_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(backup_file(&temp.path().join("absent.md")).unwrap().is_none());
    }
}
