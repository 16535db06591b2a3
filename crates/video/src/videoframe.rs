use {crate::VideoError, base::Vec2};

/// A captured frame: tightly packed RGB8 pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Wrap an RGB8 buffer, checking that it covers `size` exactly.
    pub fn new(size: Vec2<usize>, data: Vec<u8>) -> Result<Self, VideoError> {
        let expected = size.x * size.y * 3;
        if data.len() != expected {
            return Err(VideoError::Stream(format!(
                "frame buffer has {} bytes, expected {} for {}x{} RGB",
                data.len(),
                expected,
                size.x,
                size.y
            )));
        }
        Ok(Self { size, data })
    }

    /// A frame filled with one color.
    pub fn solid(size: Vec2<usize>, color: [u8; 3]) -> Self {
        let data = color
            .iter()
            .copied()
            .cycle()
            .take(size.x * size.y * 3)
            .collect();
        Self { size, data }
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    /// Width and height as floats, for normalizing pixel coordinates.
    pub fn dimensions(&self) -> Vec2<f32> {
        self.size.as_f32()
    }
}
