use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the pipeline stages.
///
/// Everything except [`PipelineError::MissingNoteClip`] aborts the run.
/// A missing clip is caught by the resequencer, which skips the note and
/// keeps going.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load image {}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("frequency sequence is empty")]
    EmptyInput,

    #[error("waveform is silent and cannot be normalized")]
    Silence,

    #[error("no clip for note {note} at {}", .path.display())]
    MissingNoteClip { note: &'static str, path: PathBuf },

    #[error("frequency handoff {}: {reason}", .path.display())]
    HandoffIo { path: PathBuf, reason: String },

    #[error("note clip directory not found: {}", .0.display())]
    NoteDirectoryMissing(PathBuf),

    #[error("failed to decode note clip {}: {reason}", .path.display())]
    ClipDecode { path: PathBuf, reason: String },

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("failed to write {}", .path.display())]
    WavWrite {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

impl PipelineError {
    /// Short description without paths, safe to show to whoever supplied
    /// the input.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ImageLoad { .. } => "the image could not be read",
            Self::EmptyInput => "the image produced no frequencies",
            Self::Silence => "the rendered sound is silent",
            Self::MissingNoteClip { .. } => "a piano note recording is missing",
            Self::HandoffIo { .. } => "the frequency list could not be read or written",
            Self::NoteDirectoryMissing(_) => "the piano note recordings are not installed",
            Self::ClipDecode { .. } => "a piano note recording is damaged",
            Self::Resample(_) => "a piano note recording could not be converted",
            Self::WavWrite { .. } => "the sound file could not be written",
        }
    }

    pub(crate) fn handoff(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::HandoffIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn clip_decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ClipDecode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration values rejected before any stage runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be a positive number")]
    NotPositive(&'static str),

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
