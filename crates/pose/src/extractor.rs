use {
    crate::{KeypointName, Landmark, PoseCandidate, PoseDetector, PoseKeypoints},
    base::Vec2,
    video::VideoFrame,
};

/// Joints must be strictly more visible than this to accept a frame.
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.3;

/// Turns raw detector output into the four torso landmarks.
///
/// A frame produces keypoints only when every joint clears the visibility
/// gate; otherwise the frame counts as "no pose".
#[derive(Debug, Clone, Copy)]
pub struct KeypointExtractor {
    min_visibility: f32,
}

impl Default for KeypointExtractor {
    fn default() -> Self {
        Self {
            min_visibility: DEFAULT_MIN_VISIBILITY,
        }
    }
}

impl KeypointExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the visibility gate (builder pattern)
    pub fn with_min_visibility(mut self, min_visibility: f32) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }

    /// Run the detector on `frame` and extract gated keypoints.
    ///
    /// Detector failures are logged and reported as "no pose" so a single
    /// bad frame never ends a tracking run.
    pub async fn extract<D: PoseDetector>(
        &self,
        detector: &mut D,
        frame: &VideoFrame,
    ) -> Option<PoseKeypoints> {
        match detector.estimate(frame).await {
            Ok(candidates) => self.gate_candidates(&candidates, frame.dimensions()),
            Err(error) => {
                log::warn!("pose detection failed: {}", error);
                None
            }
        }
    }

    /// Gate the first candidate of a detector result.
    pub fn gate_candidates(
        &self,
        candidates: &[PoseCandidate],
        frame_size: Vec2<f32>,
    ) -> Option<PoseKeypoints> {
        if frame_size.x <= 0.0 || frame_size.y <= 0.0 {
            log::warn!(
                "cannot normalize keypoints for a {}x{} frame",
                frame_size.x,
                frame_size.y
            );
            return None;
        }

        let candidate = candidates.first()?;
        let keypoints = normalize(candidate, frame_size);

        if keypoints.all_visible_above(self.min_visibility) {
            Some(keypoints)
        } else {
            log::trace!(
                "pose below visibility gate ({} <= {})",
                keypoints.min_visibility(),
                self.min_visibility
            );
            None
        }
    }
}

/// Map a candidate's torso joints to normalized landmarks, without gating.
///
/// Joints the model did not report become `Landmark::UNKNOWN`.
pub fn normalize(candidate: &PoseCandidate, frame_size: Vec2<f32>) -> PoseKeypoints {
    let landmark = |name: KeypointName| {
        candidate
            .keypoint(name)
            .map(|kp| {
                Landmark::new(
                    kp.position.x / frame_size.x,
                    kp.position.y / frame_size.y,
                    kp.score.unwrap_or(0.0),
                )
            })
            .unwrap_or(Landmark::UNKNOWN)
    };

    PoseKeypoints {
        left_shoulder: landmark(KeypointName::LeftShoulder),
        right_shoulder: landmark(KeypointName::RightShoulder),
        left_hip: landmark(KeypointName::LeftHip),
        right_hip: landmark(KeypointName::RightHip),
    }
}
