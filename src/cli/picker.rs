//! Interactive sales-table picker.
//!
//! Used when no sales table is configured and the default `train.csv` does
//! not exist. Lists `*.csv` files under the current directory, sales-looking
//! names (`train*`, `*sales*`) first.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select the sales table from the current directory tree.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
pub fn prompt_for_sales_csv() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found. Pass the sales table with `--sales <train.csv>` or run `salesdash demo`.",
        ));
    }

    let stdin = io::stdin();
    let mut out = io::stdout();
    pick_from(&files, &mut stdin.lock(), &mut out)
}

fn pick_from(files: &[PathBuf], input: &mut impl BufRead, out: &mut impl Write) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    loop {
        write!(
            out,
            "Select the sales table by number (1-{}) or type a path (q to quit): ",
            files.len()
        )
        .map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Pass the sales table with `--sales <train.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(write_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(out, "{err}").map_err(write_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory.
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| (!looks_like_sales(p), pretty_path(p)));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
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

fn looks_like_sales(path: &Path) -> bool {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    stem.starts_with("train") || stem.contains("sales")
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules" | "exports")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("salesdash-picker-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sales_tables_sort_first() {
        let dir = temp_dir("sort");
        for name in ["stores.csv", "holidays_events.csv", "train.csv", "notes.txt"] {
            std::fs::write(dir.join(name), "x\n").unwrap();
        }
        let files = find_csv_files(&dir, 1);
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].file_name().unwrap(), "train.csv");
    }

    #[test]
    fn validation_rejects_non_csv() {
        let dir = temp_dir("validate");
        let txt = dir.join("notes.txt");
        std::fs::write(&txt, "x\n").unwrap();
        assert_eq!(validate_csv_path(&txt).unwrap_err().exit_code(), 2);
        assert!(validate_csv_path(&dir).is_err());
        assert!(validate_csv_path(&dir.join("missing.csv")).is_err());
    }

    #[test]
    fn picker_retries_until_valid_choice() {
        let dir = temp_dir("pick");
        let a = dir.join("train.csv");
        let b = dir.join("stores.csv");
        std::fs::write(&a, "x\n").unwrap();
        std::fs::write(&b, "x\n").unwrap();
        let files = vec![a.clone(), b];

        let mut input = io::Cursor::new("7\n1\n");
        let mut out = Vec::<u8>::new();
        let picked = pick_from(&files, &mut input, &mut out).unwrap();
        assert_eq!(picked, a);
        assert!(String::from_utf8(out).unwrap().contains("Invalid choice: 7"));

        let mut input = io::Cursor::new("q\n");
        assert!(pick_from(&files, &mut input, &mut Vec::<u8>::new()).is_err());
    }
}
