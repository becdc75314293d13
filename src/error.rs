use thiserror::Error;

/// Errors that can stop a render.
///
/// `Cancelled` is a terminal outcome rather than a failure; front ends are
/// expected to present it as "stopped by user", not as an error dialog.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("FFT backend failure: {0}")]
    BackendFailure(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV encoding failure: {0}")]
    Wav(#[from] hound::Error),

    #[error("render cancelled")]
    Cancelled,
}

impl RenderError {
    /// True for the cancellation outcome, false for real failures.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RenderError::Cancelled)
    }
}
