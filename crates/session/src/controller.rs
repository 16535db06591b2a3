use {
    crate::{FrameClock, IntervalClock, SessionError, SessionState, TrackingConfig, TrackingSnapshot},
    fit::{SizeChart, SmoothingState, estimate_placement, recommend},
    pose::{KeypointExtractor, PoseBackend, PoseDetector},
    std::collections::VecDeque,
    tokio::{
        sync::{mpsc, watch},
        task::JoinHandle,
    },
    video::{CameraSource, CameraStream},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Stop,
    Shutdown,
}

/// Handle to a tracking session running on its own tokio task.
///
/// Commands are fire-and-forget; the outcome shows up in the published
/// `TrackingSnapshot`. Dropping the handle shuts the session down and
/// releases the camera and the pose model.
pub struct TrackingSession {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<TrackingSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl TrackingSession {
    /// Spawn a session paced by an `IntervalClock` at the configured frame rate.
    pub fn spawn<C, B>(camera: C, backend: B, chart: SizeChart, config: TrackingConfig) -> Self
    where
        C: CameraSource + 'static,
        B: PoseBackend + 'static,
    {
        let clock = IntervalClock::from_fps(config.frame_rate());
        Self::spawn_with_clock(camera, backend, clock, chart, config)
    }

    pub fn spawn_with_clock<C, B, K>(
        camera: C,
        backend: B,
        clock: K,
        chart: SizeChart,
        config: TrackingConfig,
    ) -> Self
    where
        C: CameraSource + 'static,
        B: PoseBackend + 'static,
        K: FrameClock + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(TrackingSnapshot::default());

        let controller = Controller {
            camera,
            backend,
            commands: command_rx,
            backlog: VecDeque::new(),
            pipeline: Pipeline {
                clock,
                extractor: KeypointExtractor::new().with_min_visibility(config.min_visibility()),
                smoothing: SmoothingState::new(config.smoothing()),
                chart,
                config,
                publisher: snapshot_tx,
            },
        };
        let task = tokio::spawn(controller.run());

        Self {
            commands: command_tx,
            snapshots: snapshot_rx,
            task: Some(task),
        }
    }

    /// Ask for camera and model and begin tracking. Ignored while starting or tracking.
    pub fn start(&self) -> Result<(), SessionError> {
        self.send(Command::Start)
    }

    /// Stop tracking and release everything. Safe to call at any time, repeatedly.
    pub fn stop(&self) -> Result<(), SessionError> {
        self.send(Command::Stop)
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackingSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> TrackingSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop tracking and wait for the session task to finish.
    pub async fn shutdown(mut self) -> Result<(), SessionError> {
        let _ = self.commands.send(Command::Shutdown);
        match self.task.take() {
            Some(task) => task.await.map_err(|_| SessionError::Closed),
            None => Ok(()),
        }
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.send(Command::Shutdown);
        }
    }
}

/// Camera stream and detector owned by one tracking run.
struct ActiveRun<S, D> {
    stream: S,
    detector: D,
}

impl<S: CameraStream, D: PoseDetector> ActiveRun<S, D> {
    fn release(mut self) {
        self.stream.stop();
        self.detector.dispose();
    }
}

struct Controller<C, B, K> {
    camera: C,
    backend: B,
    commands: mpsc::UnboundedReceiver<Command>,
    /// Commands that arrived while starting, handled before reading the channel again.
    backlog: VecDeque<Command>,
    pipeline: Pipeline<K>,
}

impl<C, B, K> Controller<C, B, K>
where
    C: CameraSource,
    B: PoseBackend,
    K: FrameClock,
{
    async fn run(mut self) {
        let mut active: Option<ActiveRun<C::Stream, B::Detector>> = None;

        loop {
            let command = match self.backlog.pop_front() {
                Some(command) => command,
                None => match active.as_mut() {
                    None => self.commands.recv().await.unwrap_or(Command::Shutdown),
                    Some(run) => {
                        let step = self.pipeline.step(run);
                        tokio::pin!(step);

                        // stop and shutdown drop the in-flight step, late results included
                        let interrupt = loop {
                            tokio::select! {
                                biased;
                                command = self.commands.recv() => {
                                    match command.unwrap_or(Command::Shutdown) {
                                        Command::Start => log::debug!("start ignored, already tracking"),
                                        command => break Some(command),
                                    }
                                }
                                () = &mut step => break None,
                            }
                        };
                        match interrupt {
                            Some(command) => command,
                            None => continue,
                        }
                    }
                },
            };

            match command {
                Command::Start => {
                    if active.is_some() {
                        log::debug!("start ignored, already tracking");
                        continue;
                    }
                    active = self.start().await;
                }
                Command::Stop => self.stop(active.take()),
                Command::Shutdown => {
                    self.stop(active.take());
                    break;
                }
            }
        }

        log::debug!("tracking session task finished");
    }

    async fn start(&mut self) -> Option<ActiveRun<C::Stream, B::Detector>> {
        log::info!("starting pose tracking");
        self.pipeline.publish(|snapshot| {
            *snapshot = TrackingSnapshot {
                state: SessionState::Starting,
                ..TrackingSnapshot::default()
            };
        });

        let result = self.acquire().await;
        self.drain_while_starting();

        match result {
            Ok(run) => {
                let frame_size = run.stream.size();
                log::info!("pose tracking started at {}x{}", frame_size.x, frame_size.y);
                self.pipeline.publish(|snapshot| {
                    snapshot.state = SessionState::Tracking;
                    snapshot.is_tracking = true;
                    snapshot.frame_size = Some(frame_size);
                });
                Some(run)
            }
            Err(error) => {
                log::error!("pose tracking failed to start: {}", error);
                self.pipeline.publish(|snapshot| {
                    snapshot.state = SessionState::Error;
                    snapshot.is_tracking = false;
                    snapshot.error = Some(error.user_message().to_string());
                });
                None
            }
        }
    }

    /// Open the camera, then load the model. Nothing stays acquired on failure.
    async fn acquire(&mut self) -> Result<ActiveRun<C::Stream, B::Detector>, SessionError> {
        let mut stream = self.camera.open(self.pipeline.config.constraints()).await?;

        match self.backend.initialize().await {
            Ok(detector) => Ok(ActiveRun { stream, detector }),
            Err(error) => {
                stream.stop();
                Err(error.into())
            }
        }
    }

    /// Queue what arrived during start; further starts are ignored.
    fn drain_while_starting(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            if command == Command::Start {
                log::debug!("start ignored, already starting");
            } else {
                self.backlog.push_back(command);
            }
        }
    }

    fn stop(&mut self, active: Option<ActiveRun<C::Stream, B::Detector>>) {
        match active {
            Some(run) => {
                log::info!("stopping pose tracking");
                self.pipeline.publish(|snapshot| snapshot.state = SessionState::Stopping);
                run.release();
            }
            None if self.pipeline.state() == SessionState::Idle => return,
            None => {}
        }

        self.pipeline.smoothing.reset();
        self.pipeline.publish(|snapshot| *snapshot = TrackingSnapshot::default());
    }
}

/// Per-frame processing for the active run.
struct Pipeline<K> {
    clock: K,
    extractor: KeypointExtractor,
    smoothing: SmoothingState,
    chart: SizeChart,
    config: TrackingConfig,
    publisher: watch::Sender<TrackingSnapshot>,
}

impl<K: FrameClock> Pipeline<K> {
    /// Wait for the next frame tick, process one frame and publish it if a pose was found.
    async fn step<S: CameraStream, D: PoseDetector>(&mut self, run: &mut ActiveRun<S, D>) {
        self.clock.tick().await;

        let frame = match run.stream.capture().await {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!("frame capture failed: {}", error);
                return;
            }
        };

        let Some(keypoints) = self.extractor.extract(&mut run.detector, &frame).await else {
            return;
        };

        // no await from here on, so a cancelled step never publishes half a frame
        let recommendation = recommend(&keypoints, &self.chart, self.config.calibration());
        let raw = estimate_placement(&keypoints, frame.dimensions(), self.config.geometry());
        let bounds = self.smoothing.apply(&raw);

        self.publish(|snapshot| {
            snapshot.keypoints = Some(keypoints);
            snapshot.body_bounds = Some(bounds);
            snapshot.size_recommendation = Some(recommendation);
            snapshot.frame_count += 1;
        });
    }

    fn publish(&self, update: impl FnOnce(&mut TrackingSnapshot)) {
        self.publisher.send_modify(update);
    }

    fn state(&self) -> SessionState {
        self.publisher.borrow().state
    }
}
