//! Interactive choice of the records file.
//!
//! Runs only when neither `--file` nor `FINDASH_CSV` names one. Candidates
//! are the `*.csv` files in the working directory and in `./data`; each is
//! header-checked so files that would fail to load are marked and refused.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;
use crate::io::check_schema;

/// Subdirectory searched besides the working directory itself.
const DATA_DIR: &str = "data";

/// A `*.csv` file found next to the binary's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    /// Why the header does not fit the records schema, if it doesn't.
    pub problem: Option<String>,
}

impl Candidate {
    fn inspect(path: PathBuf) -> Self {
        let problem = check_schema(&path).err().map(|e| e.to_string());
        Self { path, problem }
    }

    pub fn loads(&self) -> bool {
        self.problem.is_none()
    }

    fn describe(&self) -> String {
        match &self.problem {
            None => "financial records".to_string(),
            Some(problem) => problem.clone(),
        }
    }
}

/// Ask on the terminal which records file to open.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let candidates = discover_candidates(Path::new("."));
    let stdin = io::stdin();
    choose(&candidates, stdin.lock(), io::stdout())
}

/// Validate that `path` names an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !path.is_file() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}). Use -f to pass a CSV path.", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Candidates under `root`, loadable files first, then by path.
pub fn discover_candidates(root: &Path) -> Vec<Candidate> {
    let mut found: Vec<Candidate> = [root.to_path_buf(), root.join(DATA_DIR)]
        .iter()
        .filter_map(|dir| fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_csv_extension(path))
        .map(Candidate::inspect)
        .collect();

    found.sort_by(|a, b| b.loads().cmp(&a.loads()).then_with(|| a.path.cmp(&b.path)));
    debug!(
        candidates = found.len(),
        loadable = found.iter().filter(|c| c.loads()).count(),
        "scanned for records files"
    );
    found
}

/// List `candidates` on `out` and read a choice from `input`.
///
/// Accepts a list number or a path; `q` cancels. Files whose header does not
/// match are refused with the reason and the question is asked again.
fn choose<R: BufRead, W: Write>(candidates: &[Candidate], mut input: R, mut out: W) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::new(2, format!("Terminal I/O failed: {e}"));

    if candidates.is_empty() {
        writeln!(out, "No .csv files in . or ./data.").map_err(io_err)?;
    } else {
        writeln!(out, "CSV files:").map_err(io_err)?;
        for (idx, candidate) in candidates.iter().enumerate() {
            writeln!(out, "{:>3}) {}  [{}]", idx + 1, display_path(&candidate.path), candidate.describe())
                .map_err(io_err)?;
        }
    }

    loop {
        write!(out, "Records file (number or path, q to quit): ").map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AppError::new(
                2,
                "No records file chosen. Pass one with `findash -f <file.csv>`.",
            ));
        }

        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        let candidate = match answer.parse::<usize>() {
            Ok(n) => match n.checked_sub(1).and_then(|idx| candidates.get(idx)) {
                Some(c) => c.clone(),
                None => {
                    writeln!(out, "No file numbered {n}.").map_err(io_err)?;
                    continue;
                }
            },
            Err(_) => match validate_csv_path(Path::new(answer)) {
                Ok(path) => Candidate::inspect(path),
                Err(err) => {
                    writeln!(out, "{err}").map_err(io_err)?;
                    continue;
                }
            },
        };

        match candidate.problem {
            None => return Ok(candidate.path),
            Some(problem) => writeln!(out, "{}: {problem}", display_path(&candidate.path)).map_err(io_err)?,
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn display_path(path: &Path) -> String {
    path.strip_prefix(".").unwrap_or(path).display().to_string()
}
