use {
    fit::{Calibration, DEFAULT_SMOOTHING, PlacementGeometry},
    pose::DEFAULT_MIN_VISIBILITY,
    video::CameraConstraints,
};

/// Tuning for one tracking session.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    smoothing: f32,
    min_visibility: f32,
    calibration: Calibration,
    geometry: PlacementGeometry,
    constraints: CameraConstraints,
    frame_rate: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
            min_visibility: DEFAULT_MIN_VISIBILITY,
            calibration: Calibration::default(),
            geometry: PlacementGeometry::default(),
            constraints: CameraConstraints::default(),
            frame_rate: 60,
        }
    }
}

impl TrackingConfig {
    /// Set the placement smoothing factor, 0 (frozen) to 1 (raw).
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Set the visibility every joint must exceed for a frame to count.
    pub fn with_min_visibility(mut self, min_visibility: f32) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_geometry(mut self, geometry: PlacementGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_constraints(mut self, constraints: CameraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set the frame loop rate used by `TrackingSession::spawn`.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    // Getters
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn geometry(&self) -> &PlacementGeometry {
        &self.geometry
    }

    pub fn constraints(&self) -> &CameraConstraints {
        &self.constraints
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }
}
