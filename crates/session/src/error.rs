use {pose::InferError, std::fmt, video::VideoError};

/// Shown to the user whenever tracking cannot start.
pub const START_FAILURE_MESSAGE: &str = "Unable to access camera or load pose detection model. \
     Please allow camera permissions and try again.";

#[derive(Debug)]
pub enum SessionError {
    /// Camera could not be opened (denied, missing, busy).
    Camera(VideoError),
    /// Pose model failed to initialize.
    Model(InferError),
    /// The session task is gone.
    Closed,
}

impl SessionError {
    /// Message for the shopper; the detailed error only goes to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::Camera(_) | SessionError::Model(_) => START_FAILURE_MESSAGE,
            SessionError::Closed => "The try-on session has ended.",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Camera(err) => write!(f, "camera error: {err}"),
            SessionError::Model(err) => write!(f, "pose model error: {err}"),
            SessionError::Closed => write!(f, "session closed"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Camera(err) => Some(err),
            SessionError::Model(err) => Some(err),
            SessionError::Closed => None,
        }
    }
}

impl From<VideoError> for SessionError {
    fn from(err: VideoError) -> Self {
        SessionError::Camera(err)
    }
}

impl From<InferError> for SessionError {
    fn from(err: InferError) -> Self {
        SessionError::Model(err)
    }
}
