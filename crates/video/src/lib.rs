//! Camera capture abstraction for the try-on pipeline.
//!
//! A `CameraSource` is asked for a stream under `CameraConstraints`; the
//! resulting `CameraStream` yields RGB `VideoFrame`s until its tracks are
//! stopped.

pub mod camera;
pub mod config;
pub mod error;
pub mod synthetic;
pub mod videoframe;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use camera::{CameraSource, CameraStream};
pub use config::{CameraConstraints, Facing};
pub use error::VideoError;
pub use synthetic::{SyntheticCamera, SyntheticStream};
pub use videoframe::VideoFrame;

#[cfg(feature = "v4l2")]
pub use v4l2::{V4l2Camera, V4l2Stream};
