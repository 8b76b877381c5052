use thiserror::Error;

/// Top-level error surfaced by the `findash` binary.
///
/// Carries the process exit code alongside a human-readable message:
/// - `2`: input file / load failures
/// - `3`: invalid selection on the one-shot CLI
/// - `4`: terminal or output I/O failures
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures while loading and cleaning the financial records file.
///
/// Any of these aborts the load; there is no row-skipping mode.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: `{0}`")]
    MissingColumn(String),

    #[error("Unexpected column: `{0}`")]
    UnexpectedColumn(String),

    #[error("Column listed more than once: `{0}`")]
    DuplicateColumn(String),

    #[error("Malformed value '{value}' in column `{column}` (line {line})")]
    MalformedValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Malformed date '{value}' (line {line}). Expected MM/DD/YYYY, YYYY-MM-DD or DD-Mon-YY.")]
    MalformedDate { line: usize, value: String },

    #[error("No records found in input.")]
    Empty,
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::new(2, err.to_string())
    }
}
