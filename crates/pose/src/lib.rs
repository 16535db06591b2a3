//! Pose estimation collaborator interface and keypoint extraction.

pub mod backend;
pub mod error;
pub mod extractor;
pub mod landmarks;
pub mod scripted;
pub mod types;
pub mod yolo;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use backend::{PoseBackend, PoseDetector};
pub use error::InferError;
pub use extractor::{DEFAULT_MIN_VISIBILITY, KeypointExtractor};
pub use landmarks::{Landmark, PoseKeypoints};
pub use scripted::{ScriptedBackend, ScriptedDetector};
pub use types::{COCO_KEYPOINT_COUNT, Keypoint, KeypointName, PoseCandidate};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxBackend, OnnxDetector};
