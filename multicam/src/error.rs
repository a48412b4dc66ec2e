//! Error types for capture operations.
//!
//! This module defines all possible errors that can occur while
//! configuring cameras, driving the capture driver, and converting frames.

use crate::convert::ConvertError;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Outcome of one capture cycle, as reported by a worker.
pub(crate) type CycleResult = std::result::Result<(), CycleError>;

/// Error type for capture operations
#[derive(Debug)]
pub enum CaptureError {
    /// Invalid configuration, rejected before any device is touched
    Config(String),
    /// Device lifecycle or driver I/O failure
    Device {
        /// What the core was doing when the driver call failed
        context: String,
        /// The driver's error, carrying the errno-equivalent
        source: io::Error,
    },
    /// A capture cycle failed on one camera
    Capture {
        /// Index of the failing camera in its array (0 for a lone camera)
        camera: usize,
        /// First stage of the cycle that failed
        source: CycleError,
    },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Config(msg) => write!(f, "Config error: {}", msg),
            CaptureError::Device { context, source } => write!(f, "{}: {}", context, source),
            CaptureError::Capture { camera, source } => {
                write!(f, "Reading image from camera {} failed: {}", camera, source)
            }
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Config(_) => None,
            CaptureError::Device { source, .. } => Some(source),
            CaptureError::Capture { source, .. } => Some(source),
        }
    }
}

/// First failing stage of a capture cycle
///
/// One cycle runs dequeue → ARGB conversion → requeue → RGB conversion.
/// The worker aborts the remaining conversion stages at the first failure
/// and reports it here; the raw buffer is still handed back to the pool
/// whenever the dequeue itself succeeded.
#[derive(Debug)]
pub enum CycleError {
    /// The blocking dequeue returned an error
    Dequeue(io::Error),
    /// Device-native bytes could not be decoded into packed ARGB
    ToArgb(ConvertError),
    /// The raw buffer could not be returned to the driver pool
    Requeue(io::Error),
    /// The ARGB intermediate could not be repacked as RGB
    ToRgb(ConvertError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Dequeue(err) => write!(f, "dequeue failed: {}", err),
            CycleError::ToArgb(err) => write!(f, "ARGB conversion failed: {}", err),
            CycleError::Requeue(err) => write!(f, "requeue failed: {}", err),
            CycleError::ToRgb(err) => write!(f, "RGB conversion failed: {}", err),
        }
    }
}

impl std::error::Error for CycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CycleError::Dequeue(err) | CycleError::Requeue(err) => Some(err),
            CycleError::ToArgb(err) | CycleError::ToRgb(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = CaptureError::Config("`RGB` is not a valid four-character code".to_string());
        assert_eq!(
            err.to_string(),
            "Config error: `RGB` is not a valid four-character code"
        );
    }

    #[test]
    fn test_error_display_device() {
        let err = CaptureError::Device {
            context: "Failed to open /dev/video0".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such device"),
        };
        let text = err.to_string();
        assert!(text.contains("Failed to open /dev/video0"));
        assert!(text.contains("no such device"));
    }

    #[test]
    fn test_error_display_capture() {
        let err = CaptureError::Capture {
            camera: 1,
            source: CycleError::Dequeue(io::Error::new(io::ErrorKind::TimedOut, "stalled")),
        };
        let text = err.to_string();
        assert!(text.contains("camera 1"));
        assert!(text.contains("dequeue failed"));
    }

    #[test]
    fn test_cycle_error_stages_are_distinct() {
        let stages = [
            CycleError::Dequeue(io::Error::other("x")).to_string(),
            CycleError::ToArgb(ConvertError::new(2)).to_string(),
            CycleError::Requeue(io::Error::other("x")).to_string(),
            CycleError::ToRgb(ConvertError::new(4)).to_string(),
        ];
        for (i, a) in stages.iter().enumerate() {
            for b in stages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_error_is_error_trait() {
        let err = CaptureError::Config("test".to_string());
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_capture_error_source_chain() {
        let err = CaptureError::Capture {
            camera: 0,
            source: CycleError::ToRgb(ConvertError::new(-7)),
        };
        let source = std::error::Error::source(&err).expect("cycle error is the source");
        assert!(source.to_string().contains("RGB conversion failed"));
    }
}
