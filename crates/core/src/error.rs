//! Error types for device access and configuration.
//!
//! Construction-time failures are fatal for the caller and are surfaced as
//! distinct variants so a frontend can print actionable remediation before
//! aborting startup. Drawing never fails; out-of-range geometry is clipped.

use std::io;
use std::path::{Path, PathBuf};

/// Remediation for a framebuffer the current user may not open.
pub const VIDEO_GROUP_HINT: &str = "add the user to the 'video' group: sudo usermod -aG video $USER";

/// Remediation for an input device the current user may not open.
pub const INPUT_GROUP_HINT: &str = "add the user to the 'input' group: sudo usermod -aG input $USER";

/// Failures opening, mapping or driving a device file.
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    #[error("device not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied opening {}; {hint}", path.display())]
    PermissionDenied { path: PathBuf, hint: &'static str },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to map {} ({len} bytes): {source}", path.display())]
    Map {
        path: PathBuf,
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error("unsupported color depth: {0}-bit (only 16-bit and 32-bit are supported)")]
    UnsupportedColorDepth(u32),

    #[error("invalid display geometry {width}x{height}")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("failed to commit frame: {0}")]
    Commit(#[source] io::Error),

    #[error("device {} has not been initialized", path.display())]
    NotInitialized { path: PathBuf },

    #[error("event loop for {} is already running", path.display())]
    AlreadyRunning { path: PathBuf },

    #[error("failed to spawn reader thread for {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeviceError {
    /// Classify an `open(2)` failure.
    ///
    /// `hint` is attached to permission failures so the caller can tell the
    /// user which group membership is missing.
    pub fn from_open(path: &Path, err: io::Error, hint: &'static str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => DeviceError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied {
                path: path.to_path_buf(),
                hint,
            },
            _ => DeviceError::Open {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Remediation text for the user, if this failure has one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DeviceError::PermissionDenied { hint, .. } => Some(hint),
            _ => None,
        }
    }
}

/// Failures loading or saving an engine configuration file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DeviceError),
}
