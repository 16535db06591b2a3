use {base::Vec2, pose::PoseKeypoints};

/// Oriented garment box over the torso, in frame pixels.
///
/// The four anchors are the shoulder and hip points pushed outward along x;
/// they are only used for drawing the torso outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyBounds {
    pub left_shoulder: Vec2<f32>,
    pub right_shoulder: Vec2<f32>,
    pub left_hip: Vec2<f32>,
    pub right_hip: Vec2<f32>,
    pub center: Vec2<f32>,
    pub width: f32,
    pub height: f32,
    /// Radians, mean of the shoulder and hip line angles.
    pub rotation: f32,
}

/// Multipliers from raw torso span to garment box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementGeometry {
    width_scale: f32,
    height_scale: f32,
    anchor_expand: f32,
}

impl Default for PlacementGeometry {
    fn default() -> Self {
        Self {
            width_scale: 2.5,
            height_scale: 1.7,
            anchor_expand: 0.4,
        }
    }
}

impl PlacementGeometry {
    /// Garment width as a multiple of shoulder distance.
    pub fn with_width_scale(mut self, width_scale: f32) -> Self {
        self.width_scale = width_scale;
        self
    }

    /// Garment height as a multiple of shoulder-to-hip distance.
    pub fn with_height_scale(mut self, height_scale: f32) -> Self {
        self.height_scale = height_scale;
        self
    }

    /// Outward anchor shift as a fraction of each row's horizontal span.
    pub fn with_anchor_expand(mut self, anchor_expand: f32) -> Self {
        self.anchor_expand = anchor_expand;
        self
    }

    // Getters
    pub fn width_scale(&self) -> f32 {
        self.width_scale
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    pub fn anchor_expand(&self) -> f32 {
        self.anchor_expand
    }
}

/// Compute the raw (unsmoothed) garment box for one frame.
pub fn estimate_placement(
    keypoints: &PoseKeypoints,
    frame_size: Vec2<f32>,
    geometry: &PlacementGeometry,
) -> BodyBounds {
    let to_pixels = |x: f32, y: f32| Vec2::new(x * frame_size.x, y * frame_size.y);
    let ls = to_pixels(keypoints.left_shoulder.x, keypoints.left_shoulder.y);
    let rs = to_pixels(keypoints.right_shoulder.x, keypoints.right_shoulder.y);
    let lh = to_pixels(keypoints.left_hip.x, keypoints.left_hip.y);
    let rh = to_pixels(keypoints.right_hip.x, keypoints.right_hip.y);

    let shoulder_center = ls.midpoint(rs);
    let hip_center = lh.midpoint(rh);

    // arithmetic mean; both lines are near horizontal
    let rotation = (ls.angle_to(rs) + lh.angle_to(rh)) / 2.0;

    let (left_shoulder, right_shoulder) = expand_row(ls, rs, geometry.anchor_expand);
    let (left_hip, right_hip) = expand_row(lh, rh, geometry.anchor_expand);

    BodyBounds {
        left_shoulder,
        right_shoulder,
        left_hip,
        right_hip,
        center: shoulder_center.midpoint(hip_center),
        width: ls.distance_to(rs) * geometry.width_scale,
        height: shoulder_center.distance_to(hip_center) * geometry.height_scale,
        rotation,
    }
}

fn expand_row(left: Vec2<f32>, right: Vec2<f32>, expand: f32) -> (Vec2<f32>, Vec2<f32>) {
    let shift = (right.x - left.x) * expand;
    (
        Vec2::new(left.x - shift, left.y),
        Vec2::new(right.x + shift, right.y),
    )
}
