/// Normalized image-space joint position with detector confidence.
///
/// `x` and `y` are fractions of the frame width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub visibility: f32,
}

impl Landmark {
    /// Placeholder for a joint the model did not report.
    pub const UNKNOWN: Landmark = Landmark {
        x: 0.5,
        y: 0.5,
        visibility: 0.0,
    };

    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }
}

/// The four torso joints used for fit estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseKeypoints {
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
}

impl PoseKeypoints {
    pub fn landmarks(&self) -> [Landmark; 4] {
        [
            self.left_shoulder,
            self.right_shoulder,
            self.left_hip,
            self.right_hip,
        ]
    }

    /// Lowest visibility among the four joints.
    pub fn min_visibility(&self) -> f32 {
        self.landmarks()
            .iter()
            .map(|landmark| landmark.visibility)
            .fold(f32::INFINITY, f32::min)
    }

    /// True when every joint is strictly more visible than `threshold`.
    pub fn all_visible_above(&self, threshold: f32) -> bool {
        self.landmarks()
            .iter()
            .all(|landmark| landmark.visibility > threshold)
    }
}
