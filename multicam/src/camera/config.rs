//! Camera configuration types.
//!
//! Configuration options for camera capture: device selection,
//! resolution, framerate, and device-native pixel format.

use crate::driver::FormatRequest;
use crate::error::{CaptureError, Result};
use crate::fourcc::FourCC;

/// Camera capture configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Device identifier or path (e.g. `/dev/video0`)
    pub device: String,
    /// Frame width in pixels (None = driver-negotiated)
    pub width: Option<u32>,
    /// Frame height in pixels (None = driver-negotiated)
    pub height: Option<u32>,
    /// Target frames per second (None = driver-negotiated)
    pub fps: Option<u32>,
    /// Device-native pixel format (None = driver-negotiated)
    pub format: Option<FourCC>,
}

impl CameraConfig {
    /// Minimum valid FPS value
    const MIN_FPS: u32 = 1;
    /// Maximum valid FPS value
    const MAX_FPS: u32 = 240;
    /// Minimum valid resolution dimension
    const MIN_DIMENSION: u32 = 1;
    /// Maximum valid resolution dimension (8K)
    const MAX_DIMENSION: u32 = 7680;

    /// Creates a configuration with every capture parameter left to the driver
    ///
    /// # Arguments
    /// * `device` - Device identifier or path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            width: None,
            height: None,
            fps: None,
            format: None,
        }
    }

    /// Sets a specific resolution with validation
    ///
    /// # Arguments
    /// * `width` - Frame width in pixels (1-7680)
    /// * `height` - Frame height in pixels (1-7680)
    ///
    /// # Returns
    /// * `Ok(CameraConfig)` - Successfully set resolution
    /// * `Err(CaptureError::Config)` - If a dimension is 0 or exceeds the maximum
    pub fn with_resolution(mut self, width: u32, height: u32) -> Result<Self> {
        if !(Self::MIN_DIMENSION..=Self::MAX_DIMENSION).contains(&width) {
            return Err(CaptureError::Config(format!(
                "Width must be between {} and {}, got {}",
                Self::MIN_DIMENSION,
                Self::MAX_DIMENSION,
                width
            )));
        }

        if !(Self::MIN_DIMENSION..=Self::MAX_DIMENSION).contains(&height) {
            return Err(CaptureError::Config(format!(
                "Height must be between {} and {}, got {}",
                Self::MIN_DIMENSION,
                Self::MAX_DIMENSION,
                height
            )));
        }

        self.width = Some(width);
        self.height = Some(height);
        Ok(self)
    }

    /// Sets the target frame rate, clamped into the valid range
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps.clamp(Self::MIN_FPS, Self::MAX_FPS));
        self
    }

    /// Sets the device-native pixel format from a four-character code
    ///
    /// # Arguments
    /// * `code` - Four characters, case-insensitive (e.g. "yuyv")
    ///
    /// # Returns
    /// * `Ok(CameraConfig)` - Successfully set format
    /// * `Err(CaptureError::Config)` - If the code is not exactly 4 characters
    pub fn with_format(mut self, code: &str) -> Result<Self> {
        self.format = Some(FourCC::new(code)?);
        Ok(self)
    }

    /// Returns the resolution as a tuple if configured
    pub fn resolution(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }

    /// Builds the negotiation request handed to the driver.
    pub(crate) fn format_request(&self) -> FormatRequest {
        FormatRequest {
            width: self.width,
            height: self.height,
            fps: self.fps,
            fourcc: self.format,
        }
    }
}
