use {
    crate::{COCO_KEYPOINT_COUNT, InferError, Keypoint, KeypointName, PoseCandidate},
    base::Vec2,
    std::cmp::Ordering,
    video::VideoFrame,
};

/// Side of the square YOLO pose model input.
pub const INPUT_SIZE: usize = 640;

/// Values per detection: box (cx, cy, w, h), confidence, then x, y and
/// visibility for each COCO keypoint.
pub const DETECTION_LEN: usize = 5 + COCO_KEYPOINT_COUNT * 3;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

// gray padding, already in the normalized range
const PAD_VALUE: f32 = 114.0 / 255.0;

/// How a frame was scaled and padded into the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Fit a frame of `size` pixels into the input, keeping its aspect ratio.
    pub fn for_size(size: Vec2<usize>) -> Result<Self, InferError> {
        if size.x == 0 || size.y == 0 {
            return Err(InferError::Shape(format!(
                "cannot letterbox a {}x{} frame",
                size.x, size.y
            )));
        }

        let scale = (INPUT_SIZE as f32 / size.x as f32).min(INPUT_SIZE as f32 / size.y as f32);
        let (new_w, new_h) = scaled(size, scale);

        Ok(Self {
            scale,
            pad_x: ((INPUT_SIZE - new_w) / 2) as f32,
            pad_y: ((INPUT_SIZE - new_h) / 2) as f32,
        })
    }

    /// Map a point in model input space back to frame pixels.
    pub fn to_frame(&self, x: f32, y: f32) -> Vec2<f32> {
        Vec2::new((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

fn scaled(size: Vec2<usize>, scale: f32) -> (usize, usize) {
    let new_w = ((size.x as f32 * scale) as usize).min(INPUT_SIZE);
    let new_h = ((size.y as f32 * scale) as usize).min(INPUT_SIZE);
    (new_w, new_h)
}

/// Letterbox an RGB8 frame into a `[1, 3, 640, 640]` NCHW buffer in [0, 1].
///
/// Resizing is nearest-neighbor.
pub fn preprocess(frame: &VideoFrame) -> Result<(Vec<f32>, Letterbox), InferError> {
    let (w, h) = (frame.size.x, frame.size.y);
    if frame.data.len() != w * h * 3 {
        return Err(InferError::Shape(format!(
            "frame buffer has {} bytes, expected {} for {}x{} RGB",
            frame.data.len(),
            w * h * 3,
            w,
            h
        )));
    }

    let letterbox = Letterbox::for_size(frame.size)?;
    let (new_w, new_h) = scaled(frame.size, letterbox.scale);
    let (pad_x, pad_y) = (letterbox.pad_x as usize, letterbox.pad_y as usize);

    let plane = INPUT_SIZE * INPUT_SIZE;
    let mut input = vec![PAD_VALUE; 3 * plane];
    for y in 0..new_h {
        let src_y = ((y as f32 / letterbox.scale) as usize).min(h - 1);
        for x in 0..new_w {
            let src_x = ((x as f32 / letterbox.scale) as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            let dst = (y + pad_y) * INPUT_SIZE + x + pad_x;
            for ch in 0..3 {
                input[ch * plane + dst] = frame.data[src + ch] as f32 / 255.0;
            }
        }
    }

    Ok((input, letterbox))
}

/// Corners of a detection box in frame pixels: x0, y0, x1, y1.
type Corners = [f32; 4];

/// Intersection over union of two boxes. Zero for empty boxes.
fn iou(a: &Corners, b: &Corners) -> f32 {
    let area = |r: &Corners| (r[2] - r[0]).max(0.0) * (r[3] - r[1]).max(0.0);
    let (area_a, area_b) = (area(a), area(b));
    if area_a <= 0.0 || area_b <= 0.0 {
        return 0.0;
    }

    let inter = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    let inter_area = area(&inter);
    let union = area_a + area_b - inter_area;
    if union <= 0.0 {
        return 0.0;
    }
    inter_area / union
}

/// Decode a raw `[1, 56, N]` YOLO pose output into candidates in frame pixels.
///
/// Drops detections under `conf_threshold`, runs greedy NMS at
/// `iou_threshold` and returns the survivors by descending score. Keypoints
/// keep the COCO order of the model rows.
pub fn postprocess(
    output: &[f32],
    shape: &[usize],
    letterbox: &Letterbox,
    conf_threshold: f32,
    iou_threshold: f32,
) -> Result<Vec<PoseCandidate>, InferError> {
    if shape.len() != 3 || shape[0] != 1 || shape[1] != DETECTION_LEN {
        return Err(InferError::Shape(format!(
            "expected [1, {}, N] pose output, got {:?}",
            DETECTION_LEN, shape
        )));
    }
    let n = shape[2];
    if output.len() != DETECTION_LEN * n {
        return Err(InferError::Shape(format!(
            "pose output has {} values, expected {}",
            output.len(),
            DETECTION_LEN * n
        )));
    }

    // element [0, row, i] lives at row * n + i
    let at = |row: usize, i: usize| output[row * n + i];

    let mut detections: Vec<(Corners, PoseCandidate)> = Vec::new();
    for i in 0..n {
        let confidence = at(4, i);
        if confidence < conf_threshold {
            continue;
        }

        let center = letterbox.to_frame(at(0, i), at(1, i));
        let half_w = at(2, i) / letterbox.scale / 2.0;
        let half_h = at(3, i) / letterbox.scale / 2.0;
        let corners = [
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        ];

        let keypoints = KeypointName::ALL
            .iter()
            .enumerate()
            .map(|(k, &name)| {
                let row = 5 + k * 3;
                let position = letterbox.to_frame(at(row, i), at(row + 1, i));
                Keypoint::new(name, position, Some(at(row + 2, i)))
            })
            .collect();

        let mut candidate = PoseCandidate::new(keypoints);
        candidate.score = Some(confidence);
        detections.push((corners, candidate));
    }

    detections.sort_by(|a, b| {
        let score = |c: &PoseCandidate| c.score.unwrap_or(0.0);
        score(&b.1).partial_cmp(&score(&a.1)).unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<(Corners, PoseCandidate)> = Vec::with_capacity(detections.len());
    for (corners, candidate) in detections {
        if kept.iter().all(|(other, _)| iou(&corners, other) <= iou_threshold) {
            kept.push((corners, candidate));
        }
    }

    Ok(kept.into_iter().map(|(_, candidate)| candidate).collect())
}
