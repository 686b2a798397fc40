//! Application error type.
//!
//! Every fallible stage returns `AppError`: a coarse `ErrorKind`, the process
//! exit code `main` should use, and a human-readable message.

/// Failure categories a run can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input CSV does not exist or cannot be opened.
    MissingInputFile,
    /// A required column (date or sales) could not be found.
    UnresolvableColumn,
    /// A row of a fixed-schema file failed to parse.
    InvalidRecord,
    /// No usable rows remain after cleaning.
    EmptyDataset,
    /// Plotters failed while drawing or encoding a chart.
    RenderFailure,
    /// Output directory / file I/O.
    Io,
    /// Bad CLI or configuration values.
    Usage,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::MissingInputFile
            | ErrorKind::UnresolvableColumn
            | ErrorKind::InvalidRecord
            | ErrorKind::Usage => 2,
            ErrorKind::EmptyDataset => 3,
            ErrorKind::RenderFailure | ErrorKind::Io => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code: kind.exit_code(),
            message: message.into(),
        }
    }

    pub fn missing_input(path: &std::path::Path) -> Self {
        Self::new(
            ErrorKind::MissingInputFile,
            format!("Input file not found: '{}'", path.display()),
        )
    }

    pub fn render(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::RenderFailure,
            format!("Failed to render chart '{}': {err}", path.display()),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
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
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::new(ErrorKind::UnresolvableColumn, "x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::EmptyDataset, "x").exit_code(), 3);
        assert_eq!(AppError::new(ErrorKind::RenderFailure, "x").exit_code(), 4);
    }

    #[test]
    fn render_error_mentions_path() {
        let err = AppError::render(std::path::Path::new("out/pie.png"), "boom");
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
        assert!(err.to_string().contains("out/pie.png"));
        assert!(err.to_string().contains("boom"));
    }
}
