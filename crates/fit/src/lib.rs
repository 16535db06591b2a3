//! Garment fit math: size recommendation, placement and temporal smoothing.
//!
//! Everything here is a pure function of the landmarks of one frame, apart
//! from `SmoothingState`, which carries the previous placement forward.

pub mod error;
pub mod overlay;
pub mod placement;
pub mod size;
pub mod smooth;

pub use error::ChartError;
pub use overlay::OverlayPlacement;
pub use placement::{BodyBounds, PlacementGeometry, estimate_placement};
pub use size::{
    Calibration, Measurement, ProductSizing, SizeChart, SizeKey, SizeRecommendation, recommend,
};
pub use smooth::{DEFAULT_SMOOTHING, SmoothingState, smooth, smooth_angle};
