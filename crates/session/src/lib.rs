//! Tracking session: owns the camera and pose model for one try-on and
//! publishes smoothed garment placement and size recommendations.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod snapshot;

pub use clock::{FrameClock, IntervalClock};
pub use config::TrackingConfig;
pub use controller::TrackingSession;
pub use error::SessionError;
pub use snapshot::{SessionState, TrackingSnapshot};
