use {
    crate::{InferError, PoseBackend, PoseCandidate, PoseDetector},
    std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    },
    video::VideoFrame,
};

type ScriptedResult = Result<Vec<PoseCandidate>, InferError>;

/// Stand-in pose model that replays a fixed list of per-frame results.
///
/// Each detector it creates starts from the top of the script. Once the
/// script runs out, detectors report no candidates unless looping is on.
/// Clones share their counters.
#[derive(Clone, Debug)]
pub struct ScriptedBackend {
    script: Arc<Vec<ScriptedResult>>,
    looping: bool,
    latency: Option<Duration>,
    init_delay: Option<Duration>,
    init_failure: Option<String>,
    live_detectors: Arc<AtomicUsize>,
    initialized: Arc<AtomicUsize>,
    estimates: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<ScriptedResult>) -> Self {
        Self {
            script: Arc::new(script),
            looping: false,
            latency: None,
            init_delay: None,
            init_failure: None,
            live_detectors: Arc::new(AtomicUsize::new(0)),
            initialized: Arc::new(AtomicUsize::new(0)),
            estimates: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script where every frame yields the same candidates.
    pub fn repeating(candidates: Vec<PoseCandidate>) -> Self {
        Self::new(vec![Ok(candidates)]).with_looping(true)
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Delay every inference by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay model initialization by `delay`.
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = Some(delay);
        self
    }

    /// Make every initialization fail with `message`.
    pub fn with_init_failure(mut self, message: impl Into<String>) -> Self {
        self.init_failure = Some(message.into());
        self
    }

    /// Detectors created and not yet disposed.
    pub fn live_detectors(&self) -> usize {
        self.live_detectors.load(Ordering::SeqCst)
    }

    /// Successful initializations so far.
    pub fn initialized(&self) -> usize {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Inferences that ran to completion.
    pub fn estimates(&self) -> usize {
        self.estimates.load(Ordering::SeqCst)
    }
}

impl PoseBackend for ScriptedBackend {
    type Detector = ScriptedDetector;

    async fn initialize(&mut self) -> Result<ScriptedDetector, InferError> {
        if let Some(delay) = self.init_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.init_failure {
            return Err(InferError::Init(message.clone()));
        }

        self.live_detectors.fetch_add(1, Ordering::SeqCst);
        self.initialized.fetch_add(1, Ordering::SeqCst);
        log::debug!("scripted pose detector ready ({} frames)", self.script.len());

        Ok(ScriptedDetector {
            script: Arc::clone(&self.script),
            cursor: 0,
            looping: self.looping,
            latency: self.latency,
            live: true,
            live_detectors: Arc::clone(&self.live_detectors),
            estimates: Arc::clone(&self.estimates),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedDetector {
    script: Arc<Vec<ScriptedResult>>,
    cursor: usize,
    looping: bool,
    latency: Option<Duration>,
    live: bool,
    live_detectors: Arc<AtomicUsize>,
    estimates: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    fn next_result(&mut self) -> ScriptedResult {
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        if self.cursor >= self.script.len() {
            if !self.looping {
                return Ok(Vec::new());
            }
            self.cursor = 0;
        }
        let result = self.script[self.cursor].clone();
        self.cursor += 1;
        result
    }
}

impl PoseDetector for ScriptedDetector {
    async fn estimate(&mut self, _frame: &VideoFrame) -> Result<Vec<PoseCandidate>, InferError> {
        if !self.live {
            return Err(InferError::Runtime("detector was disposed".to_string()));
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let result = self.next_result();
        self.estimates.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn dispose(&mut self) {
        if self.live {
            self.live = false;
            self.live_detectors.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ScriptedDetector {
    fn drop(&mut self) {
        self.dispose();
    }
}
