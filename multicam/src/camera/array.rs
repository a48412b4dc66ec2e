//! Synchronized capture across a camera array.
//!
//! One worker thread per camera, spawned fresh for each read and joined
//! before the call returns. The shared result buffer is pre-partitioned
//! into per-camera slices, so workers never contend and no locking is
//! involved.

use crate::error::{CaptureError, CycleResult, Result};
use crate::frame::{FrameSet, RGB_BYTES_PER_PIXEL};
use std::thread;

use super::device::Camera;
use super::join_worker;

/// Ordered set of cameras read as one synchronized unit
///
/// All cameras share a common resolution. Each batch read captures one
/// frame per camera concurrently; total latency tracks the slowest
/// device's cycle, not the sum. The capture instants are concurrent but
/// carry no hardware-level timing guarantee.
pub struct CameraArray {
    cameras: Vec<Camera>,
    width: u32,
    height: u32,
}

impl CameraArray {
    /// Builds an array from opened cameras
    ///
    /// # Arguments
    /// * `cameras` - Cameras in capture order; a camera's position here is
    ///   its frame index in every [`FrameSet`]
    ///
    /// # Returns
    /// * `Ok(CameraArray)` - Non-empty array with a common resolution
    /// * `Err(CaptureError::Config)` - If `cameras` is empty or resolutions differ
    pub fn new(cameras: Vec<Camera>) -> Result<Self> {
        let Some(first) = cameras.first() else {
            return Err(CaptureError::Config(
                "Camera array contains no cameras".to_string(),
            ));
        };
        let (width, height) = first.resolution();

        for (index, camera) in cameras.iter().enumerate() {
            let (w, h) = camera.resolution();
            if (w, h) != (width, height) {
                return Err(CaptureError::Config(format!(
                    "Camera {} resolution {}x{} does not match camera 0 ({}x{})",
                    index, w, h, width, height
                )));
            }
        }

        Ok(Self {
            cameras,
            width,
            height,
        })
    }

    /// Captures one frame from every camera concurrently
    ///
    /// Spawns one worker per camera over disjoint slices of a single
    /// allocation, joins them all, then scans outcomes in camera order.
    /// The first non-success outcome fails the whole batch and the
    /// partially filled buffer is discarded; the error is surfaced only
    /// after every worker has finished, so no I/O is left in flight.
    ///
    /// # Returns
    /// * `Ok(FrameSet)` - Shape `[len, height, width, 3]`
    /// * `Err(CaptureError::Capture)` - First failing camera's index and outcome
    pub fn read(&mut self) -> Result<FrameSet> {
        if let Some(camera) = self.cameras.iter().find(|c| !c.is_streaming()) {
            return Err(camera.not_streaming_error());
        }

        let count = self.cameras.len();
        let frame_len = self.width as usize * self.height as usize * RGB_BYTES_PER_PIXEL;
        let mut data = vec![0u8; count * frame_len];

        let outcomes = thread::scope(|scope| -> Result<Vec<CycleResult>> {
            let mut workers = Vec::with_capacity(count);

            for (index, (camera, dst)) in self
                .cameras
                .iter_mut()
                .zip(data.chunks_exact_mut(frame_len))
                .enumerate()
            {
                let worker = thread::Builder::new()
                    .name(format!("frame-worker-{}", index))
                    .spawn_scoped(scope, move || camera.capture_cycle(dst))
                    .map_err(|e| CaptureError::Device {
                        context: format!("Failed to spawn worker for camera {}", index),
                        source: e,
                    })?;
                workers.push(worker);
            }

            Ok(workers.into_iter().map(join_worker).collect())
        })?;

        for (camera, outcome) in outcomes.into_iter().enumerate() {
            outcome.map_err(|source| CaptureError::Capture { camera, source })?;
        }

        Ok(FrameSet::new(data, count, self.width, self.height))
    }

    /// Starts streaming on every camera, in order
    ///
    /// Stops at the first driver refusal; cameras already started stay
    /// started.
    pub fn start_all(&mut self) -> Result<()> {
        for camera in &mut self.cameras {
            camera.start()?;
        }
        Ok(())
    }

    /// Stops streaming on every camera, in order
    pub fn stop_all(&mut self) -> Result<()> {
        for camera in &mut self.cameras {
            camera.stop()?;
        }
        Ok(())
    }

    /// Returns the number of cameras in the array
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Returns whether the array is empty (never true for a built array)
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Returns the common frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the common frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the cameras in capture order
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CycleError;
    use crate::mock::{Script, opened_camera, streaming_camera};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn streaming_array(scripts: &[Script]) -> (CameraArray, Vec<Arc<crate::mock::CallLog>>) {
        let mut cameras = Vec::new();
        let mut logs = Vec::new();
        for (i, &script) in scripts.iter().enumerate() {
            let (camera, log) =
                streaming_camera(&format!("/dev/video{}", i), 640, 480, i as u8, script);
            cameras.push(camera);
            logs.push(log);
        }
        (CameraArray::new(cameras).unwrap(), logs)
    }

    #[test]
    fn test_empty_array_rejected() {
        let result = CameraArray::new(Vec::new());
        assert!(matches!(result, Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_resolution_mismatch_rejected() {
        let (a, _) = streaming_camera("/dev/video0", 640, 480, 0, Script::Succeed);
        let (b, _) = streaming_camera("/dev/video2", 1280, 720, 1, Script::Succeed);

        let result = CameraArray::new(vec![a, b]);
        match result {
            Err(CaptureError::Config(msg)) => {
                assert!(msg.contains("Camera 1"));
                assert!(msg.contains("1280x720"));
            }
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_batch_read_shape_and_slices() {
        let (mut array, _logs) =
            streaming_array(&[Script::Succeed, Script::Succeed, Script::Succeed]);

        let set = array.read().unwrap();
        assert_eq!(set.shape(), [3, 480, 640, 3]);

        // Each camera's slice carries that camera's seed, so no worker
        // wrote outside its own range
        for (index, frame) in set.frames().enumerate() {
            assert_eq!(frame.len(), 640 * 480 * 3);
            assert!(frame.iter().all(|&b| b == index as u8));
        }
    }

    #[test]
    fn test_single_camera_batch() {
        let (mut array, _logs) = streaming_array(&[Script::Succeed]);
        let set = array.read().unwrap();
        assert_eq!(set.shape(), [1, 480, 640, 3]);
    }

    #[test]
    fn test_first_failure_wins_and_all_workers_finish() {
        let (mut array, logs) =
            streaming_array(&[Script::Succeed, Script::FailDequeue, Script::Succeed]);

        match array.read() {
            Err(CaptureError::Capture {
                camera: 1,
                source: CycleError::Dequeue(_),
            }) => {}
            other => panic!("Expected camera 1 dequeue failure, got {:?}", other.map(|_| ())),
        }

        // The join barrier is exhaustive: every worker ran its cycle even
        // though camera 1 failed
        for log in &logs {
            assert_eq!(log.dequeued.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_conversion_failure_names_camera_and_discards_batch() {
        use crate::camera::Camera;
        use crate::mock::{FailingConverter, MockBackend, test_logger};
        use crate::CameraConfig;

        let (a, _log_a) = streaming_camera("/dev/video0", 640, 480, 0, Script::Succeed);
        let (c, _log_c) = streaming_camera("/dev/video4", 640, 480, 2, Script::Succeed);

        let backend = MockBackend::succeeding(640, 480, 1);
        let log_b = Arc::clone(&backend.log);
        let mut b = Camera::open(
            CameraConfig::new("/dev/video2"),
            &backend,
            Box::new(FailingConverter::at_argb(2)),
            test_logger(),
        )
        .unwrap();
        b.start().unwrap();

        let mut array = CameraArray::new(vec![a, b, c]).unwrap();
        match array.read() {
            Err(CaptureError::Capture {
                camera: 1,
                source: CycleError::ToArgb(err),
            }) => assert_eq!(err.code(), 2),
            other => panic!(
                "Expected camera 1 conversion failure, got {:?}",
                other.map(|_| ())
            ),
        }

        // Camera 1's raw buffer still went back to the pool
        assert_eq!(log_b.dequeued.load(Ordering::SeqCst), 1);
        assert_eq!(log_b.requeued.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lowest_failing_index_reported() {
        let (mut array, _logs) =
            streaming_array(&[Script::Succeed, Script::FailDequeue, Script::FailRequeue]);

        match array.read() {
            Err(CaptureError::Capture { camera, .. }) => assert_eq!(camera, 1),
            other => panic!("Expected capture failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_successful_work_discarded_on_batch_failure() {
        let (mut array, logs) = streaming_array(&[Script::Succeed, Script::FailDequeue]);

        assert!(array.read().is_err());
        // Camera 0 completed a full cycle, but its frame is gone
        assert_eq!(logs[0].dequeued.load(Ordering::SeqCst), 1);
        assert_eq!(logs[0].requeued.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_requires_all_streaming() {
        let (a, _) = streaming_camera("/dev/video0", 640, 480, 0, Script::Succeed);
        let (b, _) = opened_camera("/dev/video2", 640, 480, 1, Script::Succeed);

        let mut array = CameraArray::new(vec![a, b]).unwrap();
        assert!(matches!(
            array.read(),
            Err(CaptureError::Device { .. })
        ));
    }

    #[test]
    fn test_start_all_and_stop_all() {
        let (a, log_a) = opened_camera("/dev/video0", 640, 480, 0, Script::Succeed);
        let (b, log_b) = opened_camera("/dev/video2", 640, 480, 1, Script::Succeed);

        let mut array = CameraArray::new(vec![a, b]).unwrap();
        array.start_all().unwrap();
        assert!(array.cameras().iter().all(|c| c.is_streaming()));

        array.read().unwrap();

        array.stop_all().unwrap();
        assert!(array.cameras().iter().all(|c| !c.is_streaming()));
        assert_eq!(log_a.started.load(Ordering::SeqCst), 1);
        assert_eq!(log_b.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_batches_accumulate_frame_counts() {
        let (mut array, logs) = streaming_array(&[Script::Succeed, Script::Succeed]);

        array.read().unwrap();
        array.read().unwrap();

        for (log, camera) in logs.iter().zip(array.cameras()) {
            assert_eq!(log.dequeued.load(Ordering::SeqCst), 2);
            assert_eq!(camera.frame_count(), 2);
        }
    }

    #[test]
    fn test_array_accessors() {
        let (array, _logs) = streaming_array(&[Script::Succeed, Script::Succeed]);
        assert_eq!(array.len(), 2);
        assert!(!array.is_empty());
        assert_eq!(array.width(), 640);
        assert_eq!(array.height(), 480);
    }
}
