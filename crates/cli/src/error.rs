//! Failures of the `raybend` commands and their process exit codes.
//!
//! | code | meaning |
//! |------|---------|
//! | 2    | bad arguments (reported by clap) |
//! | 10   | scene file is not a valid scene document |
//! | 11   | scene file or preview path could not be read or written |
//! | 12   | image size flags out of range |
//! | 13   | JSON output could not be encoded |
//! | 14   | scene parsed but a source, emitter or option is out of range |

use std::path::{Path, PathBuf};

use raybend_core::RayError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{}: not a scene document: {reason}", path.display())]
    SceneSyntax { path: PathBuf, reason: String },

    #[error("{}: {source}", path.display())]
    SceneRejected {
        path: PathBuf,
        #[source]
        source: RayError,
    },

    #[error("{0}")]
    Io(String),

    #[error("image size must be between 1 and {max} pixels per side, got {width}x{height}", max = u32::MAX)]
    ImageSize { width: usize, height: usize },

    #[error("cannot encode output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Classifies a failure from [`raybend_scene::Scene::load`].
    pub fn loading(path: &Path, err: RayError) -> Self {
        match err {
            RayError::InvalidScene(reason) => CliError::SceneSyntax {
                path: path.to_path_buf(),
                reason,
            },
            RayError::Io(msg) => CliError::Io(msg),
            other => CliError::SceneRejected {
                path: path.to_path_buf(),
                source: other,
            },
        }
    }

    /// Classifies a failure from the PNG writer for a `width` x `height` preview.
    pub fn writing(path: &Path, width: usize, height: usize, err: RayError) -> Self {
        match err {
            RayError::Io(msg) => CliError::Io(format!("{}: {msg}", path.display())),
            _ => CliError::ImageSize { width, height },
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SceneSyntax { .. } => 10,
            CliError::Io(_) => 11,
            CliError::ImageSize { .. } => 12,
            CliError::Serialization(_) => 13,
            CliError::SceneRejected { .. } => 14,
        }
    }
}
