use {crate::BodyBounds, base::Vec2};

/// Garment overlay position in percent of a mirrored (selfie) video box.
///
/// `left` and `top` locate the overlay center. `rotation` is already flipped
/// for the mirrored view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

impl OverlayPlacement {
    /// Convert pixel bounds to percentages, flipping x for the mirrored view.
    ///
    /// Returns `None` for a zero-sized frame.
    pub fn mirrored(bounds: &BodyBounds, frame_size: Vec2<f32>) -> Option<Self> {
        if frame_size.x <= 0.0 || frame_size.y <= 0.0 {
            return None;
        }
        Some(Self {
            left: (frame_size.x - bounds.center.x) / frame_size.x * 100.0,
            top: bounds.center.y / frame_size.y * 100.0,
            width: bounds.width / frame_size.x * 100.0,
            height: bounds.height / frame_size.y * 100.0,
            rotation: -bounds.rotation,
        })
    }
}
