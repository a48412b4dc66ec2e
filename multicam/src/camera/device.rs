//! Camera device management.
//!
//! Core capture functionality: opening and negotiating a device through
//! the driver backend, the streaming lifecycle, and the single-camera
//! capture cycle.

use crate::convert::PixelConverter;
use crate::driver::{CameraBackend, CaptureStream, StreamFormat};
use crate::error::{CaptureError, CycleError, CycleResult, Result};
use crate::frame::Frame;
use logging::Logger;
use std::io;
use std::thread;

use super::config::CameraConfig;
use super::join_worker;

/// Number of captured frames between progress log entries.
const FRAME_LOG_INTERVAL: u64 = 100;

/// Video capture device
///
/// Owns one opened driver stream and the conversion backend used to turn
/// its native frames into packed RGB. Dropping the camera stops streaming
/// and releases the device.
pub struct Camera {
    stream: Box<dyn CaptureStream>,
    converter: Box<dyn PixelConverter>,
    config: CameraConfig,
    logger: Logger,
    format: StreamFormat,
    streaming: bool,
    frame_count: u64,
}

impl Camera {
    /// Opens a camera and negotiates its capture format
    ///
    /// Requested parameters the driver cannot honor are logged as
    /// warnings; the negotiated values win.
    ///
    /// # Arguments
    /// * `config` - Device path and requested capture parameters
    /// * `backend` - Driver backend that owns device access
    /// * `converter` - Conversion backend for native → RGB transcoding
    /// * `logger` - Logger instance for monitoring
    ///
    /// # Returns
    /// * `Ok(Camera)` - Opened and negotiated, not yet streaming
    /// * `Err(CaptureError::Device)` - If the device cannot be opened or negotiated
    pub fn open(
        config: CameraConfig,
        backend: &dyn CameraBackend,
        converter: Box<dyn PixelConverter>,
        logger: Logger,
    ) -> Result<Self> {
        logger.info(&format!("Opening camera {}", config.device));

        let mut stream = backend
            .open(&config.device)
            .map_err(|e| CaptureError::Device {
                context: format!("Failed to open {}", config.device),
                source: e,
            })?;

        let format = stream
            .negotiate(&config.format_request())
            .map_err(|e| CaptureError::Device {
                context: format!("Failed to negotiate format on {}", config.device),
                source: e,
            })?;

        Self::log_negotiation(&format, &config, &logger);

        Ok(Camera {
            stream,
            converter,
            config,
            logger,
            format,
            streaming: false,
            frame_count: 0,
        })
    }

    /// Starts streaming
    ///
    /// # Returns
    /// * `Ok(())` - The device is capturing; `read` may be called
    /// * `Err(CaptureError::Device)` - If the driver refuses to start
    pub fn start(&mut self) -> Result<()> {
        self.stream.start().map_err(|e| CaptureError::Device {
            context: format!("Failed to start {}", self.config.device),
            source: e,
        })?;
        self.streaming = true;
        self.logger
            .info(&format!("Camera {} streaming", self.config.device));
        Ok(())
    }

    /// Stops streaming; in-flight pool buffers return to the driver
    pub fn stop(&mut self) -> Result<()> {
        self.stream.stop().map_err(|e| CaptureError::Device {
            context: format!("Failed to stop {}", self.config.device),
            source: e,
        })?;
        self.streaming = false;
        self.logger.info(&format!(
            "Camera {} stopped after {} frames",
            self.config.device, self.frame_count
        ));
        Ok(())
    }

    /// Captures a single frame
    ///
    /// Runs one capture cycle on a dedicated worker thread and blocks
    /// until it completes. The worker blocks on the driver's dequeue, not
    /// the calling thread.
    ///
    /// # Returns
    /// * `Ok(Frame)` - Packed RGB frame of shape `[height, width, 3]`
    /// * `Err(CaptureError)` - If the camera is not streaming or a cycle stage fails
    pub fn read(&mut self) -> Result<Frame> {
        if !self.streaming {
            return Err(self.not_streaming_error());
        }

        let format = self.format;
        let mut data = vec![0u8; format.rgb_frame_len()];

        let outcome = thread::scope(|scope| -> Result<CycleResult> {
            let worker = thread::Builder::new()
                .name("frame-worker".to_string())
                .spawn_scoped(scope, || self.capture_cycle(&mut data))
                .map_err(|e| CaptureError::Device {
                    context: "Failed to spawn frame worker".to_string(),
                    source: e,
                })?;
            Ok(join_worker(worker))
        })?;

        outcome.map_err(|source| CaptureError::Capture { camera: 0, source })?;
        Ok(Frame::new(data, format.width, format.height))
    }

    /// Runs one dequeue → convert → requeue → convert cycle
    ///
    /// Writes the finished RGB frame into `dst`, which must be exactly
    /// one output frame long. After a successful dequeue the raw buffer
    /// is handed back to the pool on every path, including conversion
    /// failure; when a conversion and the requeue both fail, the earlier
    /// stage is the one reported.
    pub(crate) fn capture_cycle(&mut self, dst: &mut [u8]) -> CycleResult {
        let StreamFormat {
            width,
            height,
            fourcc,
        } = self.format;
        let mut argb = vec![0u8; self.format.argb_frame_len()];

        let (index, raw) = self.stream.dequeue().map_err(CycleError::Dequeue)?;
        let decoded = self.converter.to_argb(raw, width, height, fourcc, &mut argb);
        let requeued = self.stream.requeue(index);

        decoded.map_err(CycleError::ToArgb)?;
        requeued.map_err(CycleError::Requeue)?;

        self.converter
            .argb_to_rgb(&argb, width, height, dst)
            .map_err(CycleError::ToRgb)?;

        self.frame_count += 1;
        if self.frame_count.is_multiple_of(FRAME_LOG_INTERVAL) {
            self.logger
                .debug(&format!("Frames captured: {}", self.frame_count));
        }
        Ok(())
    }

    /// Returns the total number of frames captured
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the camera configuration
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Returns the negotiated capture format
    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Returns the negotiated resolution
    pub fn resolution(&self) -> (u32, u32) {
        (self.format.width, self.format.height)
    }

    /// Returns whether the device is currently streaming
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub(crate) fn not_streaming_error(&self) -> CaptureError {
        CaptureError::Device {
            context: format!("Camera {} is not streaming", self.config.device),
            source: io::Error::new(io::ErrorKind::NotConnected, "start() has not been called"),
        }
    }

    /// Logs negotiation results and warnings for mismatches
    fn log_negotiation(format: &StreamFormat, config: &CameraConfig, logger: &Logger) {
        logger.info(&format!(
            "Camera negotiated: {}x{} {}",
            format.width, format.height, format.fourcc
        ));

        // Warn on resolution mismatch
        if let Some((req_w, req_h)) = config.resolution()
            && (format.width != req_w || format.height != req_h)
        {
            logger.warn(&format!(
                "Resolution mismatch (got: {}x{}, requested: {}x{})",
                format.width, format.height, req_w, req_h
            ));
        }

        // Warn on pixel-format mismatch
        if let Some(requested) = config.format
            && requested != format.fourcc
        {
            logger.warn(&format!(
                "Pixel format mismatch (got: {}, requested: {})",
                format.fourcc, requested
            ));
        }
    }
}

impl Drop for Camera {
    /// Stops streaming when dropped; dropping the stream closes the device
    fn drop(&mut self) {
        self.logger.info(&format!(
            "Closing camera {}. Total frames captured: {}",
            self.config.device, self.frame_count
        ));

        if self.streaming
            && let Err(e) = self.stream.stop()
        {
            self.logger.error(&format!(
                "Error stopping camera {}: {}",
                self.config.device, e
            ));
        }
    }
}
