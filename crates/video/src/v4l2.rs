use {
    crate::{CameraConstraints, CameraSource, CameraStream, Facing, VideoError, VideoFrame},
    base::Vec2,
    std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    tokio::{
        sync::{mpsc, oneshot},
        task::{JoinHandle, spawn_blocking},
    },
    v4l::{
        Device, Format, FourCC, buffer::Type, io::mmap::Stream as MmapStream,
        io::traits::CaptureStream, video::Capture,
    },
};

type FrameResult = Result<VideoFrame, VideoError>;

/// V4L2 camera source (MJPEG capture).
///
/// V4L2 has no notion of facing; `Facing::Environment` is logged and ignored.
#[derive(Debug, Default)]
pub struct V4l2Camera;

impl V4l2Camera {
    pub fn new() -> Self {
        Self
    }
}

impl CameraSource for V4l2Camera {
    type Stream = V4l2Stream;

    async fn open(&mut self, constraints: &CameraConstraints) -> Result<V4l2Stream, VideoError> {
        if constraints.facing() != Facing::User {
            log::warn!("V4L2 ignores facing {:?}", constraints.facing());
        }

        let buffer_count = constraints.buffer_count().max(1) as usize;
        let (tx, rx) = mpsc::channel(buffer_count);
        let (init_tx, init_rx) = oneshot::channel::<Result<Vec2<usize>, VideoError>>();
        let stop = Arc::new(AtomicBool::new(false));

        // the device is opened and read on the same blocking worker
        let join_handle = spawn_blocking({
            let constraints = constraints.clone();
            let stop = Arc::clone(&stop);
            move || {
                let device = match open_device(&constraints) {
                    Ok((device, size)) => {
                        let _ = init_tx.send(Ok(size));
                        device
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = capture_loop(device, tx, buffer_count, stop) {
                    log::error!("V4L2 capture worker error: {}", e);
                }
            }
        });

        let size = init_rx
            .await
            .map_err(|_| VideoError::Device("capture worker died during open".to_string()))??;
        log::info!(
            "V4L2 camera {} opened at {}x{} (ideal {}x{})",
            constraints.device(),
            size.x,
            size.y,
            constraints.width(),
            constraints.height()
        );

        Ok(V4l2Stream {
            size,
            receiver: Some(rx),
            stop,
            join_handle: Some(join_handle),
        })
    }
}

fn open_device(constraints: &CameraConstraints) -> Result<(Device, Vec2<usize>), VideoError> {
    let device = Device::with_path(constraints.device())?;

    // ask for the ideal size, the driver answers with what it can do
    let requested = Format::new(constraints.width(), constraints.height(), FourCC::new(b"MJPG"));
    let format = Capture::set_format(&device, &requested)?;
    if format.fourcc != FourCC::new(b"MJPG") {
        return Err(VideoError::Device(
            "MJPEG format not supported by device".to_string(),
        ));
    }

    Ok((device, Vec2::new(format.width as usize, format.height as usize)))
}

/// Background capture loop: reads MJPEG buffers, decodes to RGB8 and sends
/// frames until the stop flag is raised or the receiver goes away.
fn capture_loop(
    device: Device,
    tx: mpsc::Sender<FrameResult>,
    buffer_count: usize,
    stop: Arc<AtomicBool>,
) -> Result<(), VideoError> {
    let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count as u32)?;

    while !stop.load(Ordering::Relaxed) {
        let (jpeg, _metadata) = CaptureStream::next(&mut stream)?;

        let frame = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)
            .map_err(VideoError::from)
            .and_then(|decoded| {
                let rgb = decoded.to_rgb8();
                let size = Vec2::new(rgb.width() as usize, rgb.height() as usize);
                VideoFrame::new(size, rgb.into_raw())
            });

        if tx.blocking_send(frame).is_err() {
            // receiver dropped
            break;
        }
    }

    Ok(())
}

pub struct V4l2Stream {
    size: Vec2<usize>,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    stop: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Stream")
            .field("size", &self.size)
            .field("live", &self.receiver.is_some())
            .field("worker", &self.join_handle.is_some())
            .finish()
    }
}

impl CameraStream for V4l2Stream {
    fn size(&self) -> Vec2<usize> {
        self.size
    }

    async fn capture(&mut self) -> Result<VideoFrame, VideoError> {
        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| VideoError::Stream("stream was stopped".to_string()))?;

        receiver
            .recv()
            .await
            .ok_or_else(|| VideoError::Channel("capture worker terminated".to_string()))?
    }

    fn stop(&mut self) {
        // the worker notices on its next frame and exits
        self.stop.store(true, Ordering::Relaxed);
        drop(self.receiver.take());
    }

    fn is_live(&self) -> bool {
        self.receiver.is_some()
    }
}

impl Drop for V4l2Stream {
    fn drop(&mut self) {
        self.stop();
        // never wait on the worker here, it may be parked in the driver
        if let Some(handle) = self.join_handle.take() {
            handle.abort();
        }
    }
}
