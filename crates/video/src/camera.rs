use {
    crate::{CameraConstraints, VideoError, VideoFrame},
    base::Vec2,
    std::future::Future,
};

/// Something that can hand out a live camera stream.
///
/// Opening may wait on the user (permission prompt) or on the device, and
/// fails with `VideoError::Permission` or `VideoError::Device`.
pub trait CameraSource: Send {
    type Stream: CameraStream + 'static;

    fn open(
        &mut self,
        constraints: &CameraConstraints,
    ) -> impl Future<Output = Result<Self::Stream, VideoError>> + Send;
}

/// A live camera stream.
///
/// Implementations must release the device when `stop` is called and also
/// when the stream is dropped without being stopped.
pub trait CameraStream: Send {
    /// Actual frame size negotiated with the device.
    fn size(&self) -> Vec2<usize>;

    /// Wait for the next frame.
    fn capture(&mut self) -> impl Future<Output = Result<VideoFrame, VideoError>> + Send;

    /// Stop all tracks. Calling it again is a no-op.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}
