//! Scripted collaborator mocks for exercising the capture core.
//!
//! The mock driver serves a one-byte-per-pixel native format: every raw
//! frame is filled with the backend's seed byte, and the mock converter
//! expands it so a finished RGB frame is solid seed-colored. That makes
//! per-camera slice ownership directly observable in batch results.

use crate::camera::{Camera, CameraConfig};
use crate::convert::{ARGB_BYTES_PER_PIXEL, ConvertError, ConvertResult, PixelConverter};
use crate::driver::{CameraBackend, CaptureStream, FormatRequest, StreamFormat};
use crate::fourcc::FourCC;
use logging::{LogLevel, Logger};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::tempdir;

/// Per-stream call counters shared with the test body.
#[derive(Debug, Default)]
pub struct CallLog {
    pub started: AtomicU32,
    pub stopped: AtomicU32,
    pub dequeued: AtomicU32,
    pub requeued: AtomicU32,
}

/// What a [`MockStream`] does at each cycle stage.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Succeed,
    FailDequeue,
    FailRequeue,
}

/// Backend handing out one scripted stream per open call.
pub struct MockBackend {
    pub width: u32,
    pub height: u32,
    pub seed: u8,
    pub script: Script,
    pub fail_open: bool,
    pub log: Arc<CallLog>,
}

impl MockBackend {
    pub fn succeeding(width: u32, height: u32, seed: u8) -> Self {
        Self {
            width,
            height,
            seed,
            script: Script::Succeed,
            fail_open: false,
            log: Arc::new(CallLog::default()),
        }
    }

    pub fn scripted(width: u32, height: u32, seed: u8, script: Script) -> Self {
        Self {
            script,
            ..Self::succeeding(width, height, seed)
        }
    }

    pub fn unopenable() -> Self {
        Self {
            fail_open: true,
            ..Self::succeeding(0, 0, 0)
        }
    }
}

impl CameraBackend for MockBackend {
    fn open(&self, device: &str) -> io::Result<Box<dyn CaptureStream>> {
        if self.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such device: {}", device),
            ));
        }
        Ok(Box::new(MockStream {
            width: self.width,
            height: self.height,
            seed: self.seed,
            script: self.script,
            log: Arc::clone(&self.log),
            raw: vec![self.seed; (self.width * self.height) as usize],
        }))
    }
}

/// One-byte-per-pixel scripted capture stream.
pub struct MockStream {
    width: u32,
    height: u32,
    seed: u8,
    script: Script,
    log: Arc<CallLog>,
    raw: Vec<u8>,
}

impl CaptureStream for MockStream {
    fn negotiate(&mut self, request: &FormatRequest) -> io::Result<StreamFormat> {
        self.width = request.width.unwrap_or(self.width);
        self.height = request.height.unwrap_or(self.height);
        self.raw = vec![self.seed; (self.width * self.height) as usize];

        Ok(StreamFormat {
            width: self.width,
            height: self.height,
            fourcc: request.fourcc.unwrap_or_else(|| FourCC::new("GREY").unwrap()),
        })
    }

    fn start(&mut self) -> io::Result<()> {
        self.log.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.log.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn dequeue(&mut self) -> io::Result<(u32, &[u8])> {
        self.log.dequeued.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::FailDequeue => Err(io::Error::new(io::ErrorKind::TimedOut, "dequeue stalled")),
            _ => Ok((0, &self.raw)),
        }
    }

    fn requeue(&mut self, index: u32) -> io::Result<()> {
        self.log.requeued.fetch_add(1, Ordering::SeqCst);
        assert_eq!(index, 0, "mock pool has a single buffer");
        match self.script {
            Script::FailRequeue => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "requeue rejected",
            )),
            _ => Ok(()),
        }
    }
}

/// Expands the one-byte-per-pixel mock format into ARGB, then RGB.
pub struct MockConverter;

impl PixelConverter for MockConverter {
    fn to_argb(
        &self,
        raw: &[u8],
        width: u32,
        height: u32,
        _format: FourCC,
        dst: &mut [u8],
    ) -> ConvertResult {
        let pixels = (width * height) as usize;
        assert_eq!(raw.len(), pixels);
        assert_eq!(dst.len(), pixels * ARGB_BYTES_PER_PIXEL);

        for (sample, argb) in raw.iter().zip(dst.chunks_exact_mut(ARGB_BYTES_PER_PIXEL)) {
            argb.copy_from_slice(&[*sample, *sample, *sample, 0xFF]);
        }
        Ok(())
    }

    fn argb_to_rgb(&self, argb: &[u8], width: u32, height: u32, dst: &mut [u8]) -> ConvertResult {
        let pixels = (width * height) as usize;
        assert_eq!(argb.len(), pixels * ARGB_BYTES_PER_PIXEL);
        assert_eq!(dst.len(), pixels * 3);

        for (src, rgb) in argb.chunks_exact(ARGB_BYTES_PER_PIXEL).zip(dst.chunks_exact_mut(3)) {
            rgb.copy_from_slice(&src[..3]);
        }
        Ok(())
    }
}

/// Converter failing at a chosen stage with a fixed status code.
pub struct FailingConverter {
    fail_argb: Option<i32>,
    fail_rgb: Option<i32>,
}

impl FailingConverter {
    pub fn at_argb(code: i32) -> Self {
        Self {
            fail_argb: Some(code),
            fail_rgb: None,
        }
    }

    pub fn at_rgb(code: i32) -> Self {
        Self {
            fail_argb: None,
            fail_rgb: Some(code),
        }
    }
}

impl PixelConverter for FailingConverter {
    fn to_argb(
        &self,
        raw: &[u8],
        width: u32,
        height: u32,
        format: FourCC,
        dst: &mut [u8],
    ) -> ConvertResult {
        if let Some(code) = self.fail_argb {
            return Err(ConvertError::new(code));
        }
        MockConverter.to_argb(raw, width, height, format, dst)
    }

    fn argb_to_rgb(&self, argb: &[u8], width: u32, height: u32, dst: &mut [u8]) -> ConvertResult {
        if let Some(code) = self.fail_rgb {
            return Err(ConvertError::new(code));
        }
        MockConverter.argb_to_rgb(argb, width, height, dst)
    }
}

/// Logger writing into a throwaway temp directory.
pub fn test_logger() -> Logger {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("test_capture.log");
    Logger::new(log_path, LogLevel::Debug).unwrap()
}

/// Opens a scripted camera without starting it.
pub fn opened_camera(
    device: &str,
    width: u32,
    height: u32,
    seed: u8,
    script: Script,
) -> (Camera, Arc<CallLog>) {
    let backend = MockBackend::scripted(width, height, seed, script);
    let log = Arc::clone(&backend.log);
    let camera = Camera::open(
        CameraConfig::new(device),
        &backend,
        Box::new(MockConverter),
        test_logger(),
    )
    .unwrap();
    (camera, log)
}

/// Opens a scripted camera and starts streaming.
pub fn streaming_camera(
    device: &str,
    width: u32,
    height: u32,
    seed: u8,
    script: Script,
) -> (Camera, Arc<CallLog>) {
    let (mut camera, log) = opened_camera(device, width, height, seed, script);
    camera.start().unwrap();
    (camera, log)
}
