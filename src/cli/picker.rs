//! Interactive CSV picker.
//!
//! This is kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker covers "run `dash` without `--data` and choose a sales CSV"
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Directory recursion depth for finding CSV files.
const SEARCH_DEPTH: usize = 4;

const HINT: &str = "Pass one with `--data <file.csv>` or set SALES_DASH_DATA.";

/// Prompt on stdin/stdout for a sales CSV found under the working directory.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = find_csv_files(Path::new("."), SEARCH_DEPTH);
    let stdin = io::stdin();
    prompt(&files, stdin.lock(), io::stdout())
}

/// Run the picker over `files`, reading choices from `input`.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
pub fn prompt<R: BufRead, W: Write>(files: &[PathBuf], mut input: R, mut out: W) -> Result<PathBuf, AppError> {
    if files.is_empty() {
        return Err(AppError::usage(format!("No .csv files found. {HINT}")));
    }
    let io_err = |e: io::Error| AppError::usage(format!("Picker I/O failed: {e}"));

    writeln!(out, "Found {} CSV file(s):", files.len()).map_err(io_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(io_err)?;
    }

    loop {
        write!(out, "Select a file by number (1-{}) or type a path (q to quit): ", files.len())
            .map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::usage(format!("No input received. {HINT}")));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(out, "Invalid choice: {choice}.").map_err(io_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}").map_err(io_err)?,
        }
    }
}

/// Check that `path` is an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::data_load(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::data_load(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::data_load(format!("Expected a .csv file, got: {}", path.display())));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted by display path.
pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn walk(dir: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                walk(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "id\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data").join("A.CSV"), "id\n").unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target").join("skip.csv"), "id\n").unwrap();
        dir
    }

    #[test]
    fn finds_csv_files_and_skips_build_dirs() {
        let dir = scratch();
        let files = find_csv_files(dir.path(), SEARCH_DEPTH);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"b.csv".to_string()));
        assert!(names.contains(&"A.CSV".to_string()));
    }

    #[test]
    fn prompt_accepts_a_number_after_a_bad_choice() {
        let dir = scratch();
        let files = find_csv_files(dir.path(), SEARCH_DEPTH);
        let mut out = Vec::new();
        let picked = prompt(&files, "9\n1\n".as_bytes(), &mut out).unwrap();
        assert_eq!(picked, files[0]);
        assert!(String::from_utf8(out).unwrap().contains("Invalid choice: 9."));
    }

    #[test]
    fn prompt_cancel_and_eof_are_errors() {
        let dir = scratch();
        let files = find_csv_files(dir.path(), SEARCH_DEPTH);
        assert!(prompt(&files, "q\n".as_bytes(), Vec::new()).is_err());
        assert!(prompt(&files, "".as_bytes(), Vec::new()).is_err());
        assert!(prompt(&[], "1\n".as_bytes(), Vec::new()).is_err());
    }

    #[test]
    fn validate_rejects_non_csv() {
        let dir = scratch();
        assert!(validate_csv_path(&dir.path().join("notes.txt")).is_err());
        assert!(validate_csv_path(&dir.path().join("missing.csv")).is_err());
        assert!(validate_csv_path(dir.path()).is_err());
        assert!(validate_csv_path(&dir.path().join("b.csv")).is_ok());
    }
}
