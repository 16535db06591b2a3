use {
    base::Vec2,
    fit::{BodyBounds, OverlayPlacement, SizeRecommendation},
    pose::PoseKeypoints,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Waiting for camera permission and the pose model.
    Starting,
    Tracking,
    Stopping,
    /// Start failed; a new start retries.
    Error,
}

/// What observers see after every state change and every accepted frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingSnapshot {
    pub state: SessionState,
    pub keypoints: Option<PoseKeypoints>,
    pub body_bounds: Option<BodyBounds>,
    pub size_recommendation: Option<SizeRecommendation>,
    pub is_tracking: bool,
    pub error: Option<String>,
    /// Size of the camera frames of the current run.
    pub frame_size: Option<Vec2<usize>>,
    /// Frames published in the current run.
    pub frame_count: u64,
}

impl TrackingSnapshot {
    /// Overlay position for a mirrored preview of the current frame.
    pub fn overlay(&self) -> Option<OverlayPlacement> {
        let bounds = self.body_bounds.as_ref()?;
        let frame_size = self.frame_size?;
        OverlayPlacement::mirrored(bounds, frame_size.as_f32())
    }
}
