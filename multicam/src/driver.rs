//! Video-capture driver boundary.
//!
//! The driver collaborator owns device nodes, format negotiation, and the
//! mapped buffer pool. The capture core drives it through these traits
//! and never manages device memory itself.

use crate::convert::ARGB_BYTES_PER_PIXEL;
use crate::fourcc::FourCC;
use crate::frame::RGB_BYTES_PER_PIXEL;
use std::io;

/// Capture parameters requested at negotiation time
///
/// Every field is optional; the driver substitutes its own defaults for
/// anything omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatRequest {
    /// Requested frame width in pixels
    pub width: Option<u32>,
    /// Requested frame height in pixels
    pub height: Option<u32>,
    /// Requested frames per second
    pub fps: Option<u32>,
    /// Requested device-native pixel format
    pub fourcc: Option<FourCC>,
}

/// Driver-confirmed capture parameters
///
/// What the device actually delivers, which may differ from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Confirmed frame width in pixels
    pub width: u32,
    /// Confirmed frame height in pixels
    pub height: u32,
    /// Confirmed device-native pixel format
    pub fourcc: FourCC,
}

impl StreamFormat {
    /// Size in bytes of one packed RGB output frame at this format.
    pub fn rgb_frame_len(&self) -> usize {
        self.width as usize * self.height as usize * RGB_BYTES_PER_PIXEL
    }

    /// Size in bytes of the packed ARGB intermediate at this format.
    pub fn argb_frame_len(&self) -> usize {
        self.width as usize * self.height as usize * ARGB_BYTES_PER_PIXEL
    }
}

/// Opens capture devices
pub trait CameraBackend {
    /// Opens a device node for streaming I/O
    ///
    /// # Arguments
    /// * `device` - Device identifier or path (e.g. `/dev/video0`)
    ///
    /// # Returns
    /// * `Ok(stream)` - An opened stream, not yet negotiated or started
    /// * `Err` - Driver error carrying the errno-equivalent
    fn open(&self, device: &str) -> io::Result<Box<dyn CaptureStream>>;
}

/// Streaming I/O on one opened capture device
///
/// Dropping the stream releases the device and its buffer pool, so the
/// device is closed on every exit path.
pub trait CaptureStream: Send {
    /// Negotiates capture parameters with the device
    ///
    /// # Returns
    /// * `Ok(StreamFormat)` - The confirmed width, height, and format
    /// * `Err` - Driver error carrying the errno-equivalent
    fn negotiate(&mut self, request: &FormatRequest) -> io::Result<StreamFormat>;

    /// Starts streaming; pool buffers begin filling.
    fn start(&mut self) -> io::Result<()>;

    /// Stops streaming and reclaims every in-flight pool buffer.
    fn stop(&mut self) -> io::Result<()>;

    /// Checks out the next filled buffer from the pool
    ///
    /// Blocks until the driver hands one out; the wait is unbounded. The
    /// buffer stays checked out, and the stream borrowed, until the index
    /// is passed back to [`CaptureStream::requeue`].
    ///
    /// # Returns
    /// * `Ok((index, bytes))` - Pool index and the mapped frame bytes
    /// * `Err` - Driver error carrying the errno-equivalent
    fn dequeue(&mut self) -> io::Result<(u32, &[u8])>;

    /// Returns a checked-out buffer to the pool
    ///
    /// # Arguments
    /// * `index` - Pool index previously returned by [`CaptureStream::dequeue`]
    fn requeue(&mut self, index: u32) -> io::Result<()>;
}
