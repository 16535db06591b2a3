/// Which way the camera should face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    /// Front camera, looking at the shopper.
    User,
    Environment,
}

/// Capture constraints passed to a `CameraSource`.
///
/// Width and height are ideals: a source picks the closest mode it supports
/// and reports the actual size through `CameraStream::size`.
#[derive(Clone, Debug)]
pub struct CameraConstraints {
    device: String,
    width: u32,
    height: u32,
    facing: Facing,
    buffer_count: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 1280,
            height: 720,
            facing: Facing::User,
            buffer_count: 4,
        }
    }
}

impl CameraConstraints {
    /// Set the device path (e.g., "/dev/video0"). Ignored by sources without device paths.
    pub fn with_device(mut self, device: String) -> Self {
        self.device = device;
        self
    }

    /// Set the ideal capture width in pixels.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the ideal capture height in pixels.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Set the number of frames buffered between capture and consumer.
    pub fn with_buffer_count(mut self, buffer_count: u32) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    // Getters
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn buffer_count(&self) -> u32 {
        self.buffer_count
    }
}
