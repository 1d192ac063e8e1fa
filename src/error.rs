use std::path::PathBuf;

/// Error type for label extraction, saving and printing.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to open PDF: {0}")]
    DocumentOpen(String),

    #[error("PDF has no pages")]
    EmptyDocument,

    #[error("Failed to render label region: {0}")]
    Render(String),

    #[error("Invalid rotation '{0}': expected 0, 90 or -90 degrees")]
    InvalidRotation(String),

    #[error("Failed to save {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },

    #[error("print tool '{program}' not found. Install it with: pip install brother_ql")]
    PrintToolNotFound { program: String },

    #[error("print tool failed with exit code {code}: {stderr}")]
    PrintFailed { code: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabelError {
    /// True for failures of the printer collaborator rather than of extraction.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LabelError::PrintToolNotFound { .. } | LabelError::PrintFailed { .. }
        )
    }
}
