use {
    crate::BodyBounds,
    std::f32::consts::{PI, TAU},
};

/// Default exponential smoothing factor.
pub const DEFAULT_SMOOTHING: f32 = 0.25;

/// Low-pass filter one placement towards `target`.
///
/// The first sample of a run (`previous == None`) passes through unchanged.
/// Every scalar moves `alpha` of the way towards its target; rotation takes
/// the shorter way around the circle.
pub fn smooth(previous: Option<&BodyBounds>, target: &BodyBounds, alpha: f32) -> BodyBounds {
    let Some(current) = previous else {
        return *target;
    };

    let lerp = |c: f32, t: f32| c + (t - c) * alpha;

    BodyBounds {
        left_shoulder: current.left_shoulder.lerp(target.left_shoulder, alpha),
        right_shoulder: current.right_shoulder.lerp(target.right_shoulder, alpha),
        left_hip: current.left_hip.lerp(target.left_hip, alpha),
        right_hip: current.right_hip.lerp(target.right_hip, alpha),
        center: current.center.lerp(target.center, alpha),
        width: lerp(current.width, target.width),
        height: lerp(current.height, target.height),
        rotation: smooth_angle(current.rotation, target.rotation, alpha),
    }
}

/// Move angle `current` towards `target` along the shortest arc.
///
/// The result is not wrapped back into (-π, π]. A non-finite difference
/// leaves `current` unchanged.
pub fn smooth_angle(current: f32, target: f32, alpha: f32) -> f32 {
    let delta = target - current;
    if !delta.is_finite() {
        return current;
    }

    // wrap into (-PI, PI]
    let mut delta = (delta + PI).rem_euclid(TAU) - PI;
    if delta <= -PI {
        delta += TAU;
    }
    current + delta * alpha
}

/// The previous published placement of one tracking run.
#[derive(Debug, Clone, Copy)]
pub struct SmoothingState {
    previous: Option<BodyBounds>,
    alpha: f32,
}

impl Default for SmoothingState {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl SmoothingState {
    pub fn new(alpha: f32) -> Self {
        Self {
            previous: None,
            alpha,
        }
    }

    /// Smooth `target` against the previous output and remember the result.
    pub fn apply(&mut self, target: &BodyBounds) -> BodyBounds {
        let next = smooth(self.previous.as_ref(), target, self.alpha);
        self.previous = Some(next);
        next
    }

    /// Forget the previous output; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn current(&self) -> Option<&BodyBounds> {
        self.previous.as_ref()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}
