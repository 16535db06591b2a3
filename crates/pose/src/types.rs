use {base::Vec2, std::str::FromStr};

/// Number of keypoints in COCO pose format
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// COCO keypoint names, in model output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypointName {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointName {
    pub const ALL: [KeypointName; COCO_KEYPOINT_COUNT] = [
        KeypointName::Nose,
        KeypointName::LeftEye,
        KeypointName::RightEye,
        KeypointName::LeftEar,
        KeypointName::RightEar,
        KeypointName::LeftShoulder,
        KeypointName::RightShoulder,
        KeypointName::LeftElbow,
        KeypointName::RightElbow,
        KeypointName::LeftWrist,
        KeypointName::RightWrist,
        KeypointName::LeftHip,
        KeypointName::RightHip,
        KeypointName::LeftKnee,
        KeypointName::RightKnee,
        KeypointName::LeftAnkle,
        KeypointName::RightAnkle,
    ];

    /// Snake-case name as pose models label their outputs (`"left_shoulder"`).
    pub fn as_str(self) -> &'static str {
        match self {
            KeypointName::Nose => "nose",
            KeypointName::LeftEye => "left_eye",
            KeypointName::RightEye => "right_eye",
            KeypointName::LeftEar => "left_ear",
            KeypointName::RightEar => "right_ear",
            KeypointName::LeftShoulder => "left_shoulder",
            KeypointName::RightShoulder => "right_shoulder",
            KeypointName::LeftElbow => "left_elbow",
            KeypointName::RightElbow => "right_elbow",
            KeypointName::LeftWrist => "left_wrist",
            KeypointName::RightWrist => "right_wrist",
            KeypointName::LeftHip => "left_hip",
            KeypointName::RightHip => "right_hip",
            KeypointName::LeftKnee => "left_knee",
            KeypointName::RightKnee => "right_knee",
            KeypointName::LeftAnkle => "left_ankle",
            KeypointName::RightAnkle => "right_ankle",
        }
    }
}

impl From<KeypointName> for usize {
    fn from(name: KeypointName) -> usize {
        name as usize
    }
}

impl TryFrom<usize> for KeypointName {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        KeypointName::ALL.get(value).copied().ok_or_else(|| {
            format!(
                "Invalid keypoint index: {}. Must be in range 0-{}.",
                value,
                COCO_KEYPOINT_COUNT - 1
            )
        })
    }
}

impl FromStr for KeypointName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeypointName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown keypoint name: {s:?}"))
    }
}

/// A single model keypoint in pixel coordinates of the analyzed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub name: KeypointName,
    pub position: Vec2<f32>,
    /// Confidence in [0.0, 1.0]; some models leave it out.
    pub score: Option<f32>,
}

impl Keypoint {
    pub fn new(name: KeypointName, position: Vec2<f32>, score: Option<f32>) -> Self {
        Self {
            name,
            position,
            score,
        }
    }
}

/// One detected person as reported by the pose model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseCandidate {
    pub keypoints: Vec<Keypoint>,
    /// Overall detection confidence, if the model reports one.
    pub score: Option<f32>,
}

impl PoseCandidate {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            score: None,
        }
    }

    /// Build a candidate from normalized `(name, x, y, score)` entries,
    /// scaling positions into a frame of `frame_size` pixels.
    pub fn from_normalized(frame_size: Vec2<f32>, points: &[(KeypointName, f32, f32, f32)]) -> Self {
        let keypoints = points
            .iter()
            .map(|&(name, x, y, score)| {
                Keypoint::new(name, Vec2::new(x * frame_size.x, y * frame_size.y), Some(score))
            })
            .collect();
        Self::new(keypoints)
    }

    /// First keypoint carrying `name`, if the model produced it.
    pub fn keypoint(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }
}
