use std::fmt;

#[derive(Debug)]
pub enum VideoError {
    /// The user or the platform refused access to the camera.
    Permission(String),
    Device(String),
    Stream(String),
    Decode(String),
    Channel(String),
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::Permission(msg) => write!(f, "permission denied: {msg}"),
            VideoError::Device(msg) => write!(f, "device error: {msg}"),
            VideoError::Stream(msg) => write!(f, "stream error: {msg}"),
            VideoError::Decode(msg) => write!(f, "decode error: {msg}"),
            VideoError::Channel(msg) => write!(f, "channel error: {msg}"),
        }
    }
}

impl std::error::Error for VideoError {}

impl From<std::io::Error> for VideoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => VideoError::Permission(err.to_string()),
            _ => VideoError::Device(err.to_string()),
        }
    }
}

#[cfg(feature = "v4l2")]
impl From<image::ImageError> for VideoError {
    fn from(err: image::ImageError) -> Self {
        VideoError::Decode(err.to_string())
    }
}
