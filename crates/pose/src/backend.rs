use {
    crate::{InferError, PoseCandidate},
    std::future::Future,
    video::VideoFrame,
};

/// Factory for pose detectors (model loading).
///
/// Initialization is asynchronous and may take seconds (weights download,
/// warm-up). It fails with `InferError::Init`.
pub trait PoseBackend: Send {
    type Detector: PoseDetector + 'static;

    fn initialize(&mut self) -> impl Future<Output = Result<Self::Detector, InferError>> + Send;
}

/// An initialized single-pose model instance.
pub trait PoseDetector: Send {
    /// Run inference on one frame. Candidates are ordered by confidence, so
    /// the first one is the person to track.
    fn estimate(
        &mut self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<Vec<PoseCandidate>, InferError>> + Send;

    /// Release model resources. Calling it again is a no-op.
    fn dispose(&mut self);
}
