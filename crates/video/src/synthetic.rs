use {
    crate::{CameraConstraints, CameraSource, CameraStream, VideoError, VideoFrame},
    base::Vec2,
    std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    },
};

/// Camera source that renders solid frames at the requested ideal size.
///
/// Clones share their track counters, so a test can keep a clone and watch
/// whether streams handed to a session were stopped.
#[derive(Clone, Debug)]
pub struct SyntheticCamera {
    color: [u8; 3],
    deny: bool,
    open_delay: Option<Duration>,
    active_tracks: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            color: [96, 96, 96],
            deny: false,
            open_delay: None,
            active_tracks: Arc::new(AtomicUsize::new(0)),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A camera whose permission request is always refused.
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new()
        }
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Simulate a slow permission prompt.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Streams opened and not yet stopped or dropped.
    pub fn active_tracks(&self) -> usize {
        self.active_tracks.load(Ordering::SeqCst)
    }

    /// Total successful opens.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl CameraSource for SyntheticCamera {
    type Stream = SyntheticStream;

    async fn open(&mut self, constraints: &CameraConstraints) -> Result<SyntheticStream, VideoError> {
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        if self.deny {
            return Err(VideoError::Permission(
                "camera access was refused".to_string(),
            ));
        }

        self.active_tracks.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "synthetic camera opened at {}x{} ({:?})",
            constraints.width(),
            constraints.height(),
            constraints.facing()
        );

        Ok(SyntheticStream {
            size: Vec2::new(constraints.width() as usize, constraints.height() as usize),
            color: self.color,
            live: true,
            active_tracks: Arc::clone(&self.active_tracks),
        })
    }
}

#[derive(Debug)]
pub struct SyntheticStream {
    size: Vec2<usize>,
    color: [u8; 3],
    live: bool,
    active_tracks: Arc<AtomicUsize>,
}

impl CameraStream for SyntheticStream {
    fn size(&self) -> Vec2<usize> {
        self.size
    }

    async fn capture(&mut self) -> Result<VideoFrame, VideoError> {
        if !self.live {
            return Err(VideoError::Stream("stream was stopped".to_string()));
        }
        Ok(VideoFrame::solid(self.size, self.color))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.active_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}
