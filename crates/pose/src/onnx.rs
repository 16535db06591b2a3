use {
    crate::{
        InferError, PoseBackend, PoseCandidate, PoseDetector,
        yolo::{DEFAULT_CONF_THRESHOLD, DEFAULT_IOU_THRESHOLD, INPUT_SIZE, postprocess, preprocess},
    },
    ort::{session::Session, value::Tensor},
    std::{
        path::{Path, PathBuf},
        sync::{Arc, Mutex, PoisonError},
    },
    tokio::task::spawn_blocking,
    video::VideoFrame,
};

/// YOLO pose model (`[1, 3, 640, 640]` in, `[1, 56, N]` out) run through ONNX Runtime.
#[derive(Debug, Clone)]
pub struct OnnxBackend {
    model_path: PathBuf,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl OnnxBackend {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }

    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    // Getters
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }
}

fn load_session(path: &Path) -> Result<(Session, String, String), InferError> {
    let session = Session::builder()
        .map_err(|e| InferError::Init(format!("failed to create session builder: {}", e)))?
        .commit_from_file(path)
        .map_err(|e| InferError::Init(format!("failed to load {}: {}", path.display(), e)))?;

    let input = session
        .inputs()
        .first()
        .map(|input| input.name().to_string())
        .ok_or_else(|| InferError::Init("model has no inputs".to_string()))?;
    let output = session
        .outputs()
        .first()
        .map(|output| output.name().to_string())
        .ok_or_else(|| InferError::Init("model has no outputs".to_string()))?;

    Ok((session, input, output))
}

impl PoseBackend for OnnxBackend {
    type Detector = OnnxDetector;

    async fn initialize(&mut self) -> Result<OnnxDetector, InferError> {
        let path = self.model_path.clone();
        let (session, input_name, output_name) = spawn_blocking(move || load_session(&path))
            .await
            .map_err(|e| InferError::Init(format!("model loader failed: {}", e)))??;
        log::info!(
            "pose model {} loaded ({} -> {})",
            self.model_path.display(),
            input_name,
            output_name
        );

        Ok(OnnxDetector {
            session: Some(Arc::new(Mutex::new(session))),
            input_name,
            output_name,
            conf_threshold: self.conf_threshold,
            iou_threshold: self.iou_threshold,
        })
    }
}

/// Loaded ONNX pose session. Inference runs on the blocking pool.
pub struct OnnxDetector {
    // shared with an inference that may outlive a dropped estimate future
    session: Option<Arc<Mutex<Session>>>,
    input_name: String,
    output_name: String,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl std::fmt::Debug for OnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxDetector")
            .field("live", &self.session.is_some())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish()
    }
}

fn run_session(
    session: &Mutex<Session>,
    input_name: &str,
    output_name: &str,
    input: Vec<f32>,
) -> Result<(Vec<usize>, Vec<f32>), InferError> {
    let runtime = |e: ort::Error| InferError::Runtime(e.to_string());

    let tensor = Tensor::from_array(([1usize, 3, INPUT_SIZE, INPUT_SIZE], input)).map_err(runtime)?;
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    let outputs = session.run(ort::inputs![input_name => tensor]).map_err(runtime)?;

    let (shape, data) = outputs[output_name]
        .try_extract_tensor::<f32>()
        .map_err(runtime)?;
    let shape = shape
        .iter()
        .map(|&dim| {
            usize::try_from(dim)
                .map_err(|_| InferError::Shape(format!("dynamic output dimension {}", dim)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((shape, data.to_vec()))
}

impl PoseDetector for OnnxDetector {
    async fn estimate(&mut self, frame: &VideoFrame) -> Result<Vec<PoseCandidate>, InferError> {
        let session = self
            .session
            .clone()
            .ok_or_else(|| InferError::Runtime("detector was disposed".to_string()))?;

        let (input, letterbox) = preprocess(frame)?;
        let input_name = self.input_name.clone();
        let output_name = self.output_name.clone();
        let (shape, output) =
            spawn_blocking(move || run_session(&session, &input_name, &output_name, input))
                .await
                .map_err(|e| InferError::Runtime(format!("inference task failed: {}", e)))??;

        postprocess(
            &output,
            &shape,
            &letterbox,
            self.conf_threshold,
            self.iou_threshold,
        )
    }

    fn dispose(&mut self) {
        if self.session.take().is_some() {
            log::debug!("pose model released");
        }
    }
}
