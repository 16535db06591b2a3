use base::Vec2;
use fit::{PlacementGeometry, SizeChart, SizeKey, estimate_placement};
use pose::{InferError, KeypointExtractor, KeypointName, PoseCandidate, ScriptedBackend};
use session::{
    FrameClock, SessionState, TrackingConfig, TrackingSession, TrackingSnapshot,
    error::START_FAILURE_MESSAGE,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::sync::{Semaphore, watch};
use video::{
    CameraConstraints, CameraSource, CameraStream, SyntheticCamera, SyntheticStream, VideoError,
    VideoFrame,
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn frame_size() -> Vec2<f32> {
    Vec2::new(WIDTH as f32, HEIGHT as f32)
}

fn config() -> TrackingConfig {
    TrackingConfig::default()
        .with_constraints(CameraConstraints::default().with_width(WIDTH).with_height(HEIGHT))
        .with_frame_rate(100)
}

/// Person centered in frame with the given normalized shoulder span.
fn person(shoulder_span: f32, visibility: f32) -> PoseCandidate {
    let half = shoulder_span / 2.0;
    PoseCandidate::from_normalized(
        frame_size(),
        &[
            (KeypointName::Nose, 0.5, 0.15, 0.99),
            (KeypointName::LeftShoulder, 0.5 - half, 0.3, visibility),
            (KeypointName::RightShoulder, 0.5 + half, 0.3, visibility),
            (KeypointName::LeftHip, 0.5 - half * 0.8, 0.7, visibility),
            (KeypointName::RightHip, 0.5 + half * 0.8, 0.7, visibility),
        ],
    )
}

/// Frame clock that only ticks when the test hands out permits.
#[derive(Clone)]
struct GatedClock {
    permits: Arc<Semaphore>,
}

impl GatedClock {
    fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    fn allow(&self, ticks: usize) {
        self.permits.add_permits(ticks);
    }
}

impl FrameClock for GatedClock {
    async fn tick(&mut self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}

/// Camera refusing the first `failures` opens.
#[derive(Clone)]
struct FlakyCamera {
    inner: SyntheticCamera,
    failures: Arc<Semaphore>,
}

impl CameraSource for FlakyCamera {
    type Stream = SyntheticStream;

    async fn open(&mut self, constraints: &CameraConstraints) -> Result<SyntheticStream, VideoError> {
        if let Ok(permit) = self.failures.try_acquire() {
            permit.forget();
            return Err(VideoError::Permission("user dismissed the prompt".to_string()));
        }
        self.inner.open(constraints).await
    }
}

/// Camera whose streams drop the first `failures` frames with an error.
#[derive(Clone)]
struct GlitchyCamera {
    inner: SyntheticCamera,
    failures: Arc<Semaphore>,
}

impl CameraSource for GlitchyCamera {
    type Stream = GlitchyStream;

    async fn open(&mut self, constraints: &CameraConstraints) -> Result<GlitchyStream, VideoError> {
        Ok(GlitchyStream {
            inner: self.inner.open(constraints).await?,
            failures: Arc::clone(&self.failures),
        })
    }
}

struct GlitchyStream {
    inner: SyntheticStream,
    failures: Arc<Semaphore>,
}

impl CameraStream for GlitchyStream {
    fn size(&self) -> Vec2<usize> {
        self.inner.size()
    }

    async fn capture(&mut self) -> Result<VideoFrame, VideoError> {
        if let Ok(permit) = self.failures.try_acquire() {
            permit.forget();
            return Err(VideoError::Stream("buffer underrun".to_string()));
        }
        self.inner.capture().await
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn is_live(&self) -> bool {
        self.inner.is_live()
    }
}

async fn wait_until(
    snapshots: &mut watch::Receiver<TrackingSnapshot>,
    condition: impl FnMut(&TrackingSnapshot) -> bool,
) -> TrackingSnapshot {
    tokio::time::timeout(Duration::from_secs(30), snapshots.wait_for(condition))
        .await
        .expect("timed out waiting for snapshot")
        .expect("session closed")
        .clone()
}

#[tokio::test(start_paused = true)]
async fn test_start_tracks_and_publishes() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)]);
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    let snapshot = wait_until(&mut snapshots, |s| s.keypoints.is_some()).await;

    assert_eq!(snapshot.state, SessionState::Tracking);
    assert!(snapshot.is_tracking);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.frame_size, Some(Vec2::new(640, 480)));

    let recommendation = snapshot.size_recommendation.unwrap();
    assert_eq!(recommendation.shoulder_width, 30.0);
    assert_eq!(recommendation.chest_width, 66.0);
    assert_eq!(recommendation.recommended_size, SizeKey::S);
    assert_eq!(recommendation.match_percent(), 90);

    let bounds = snapshot.body_bounds.unwrap();
    assert!((bounds.center.x - 320.0).abs() < 0.5);
    assert!((bounds.center.y - 240.0).abs() < 0.5);

    let overlay = snapshot.overlay().unwrap();
    assert!((overlay.left - 50.0).abs() < 0.1);

    assert_eq!(camera.active_tracks(), 1);
    assert_eq!(backend.live_detectors(), 1);

    session.shutdown().await.unwrap();
    assert_eq!(camera.active_tracks(), 0);
    assert_eq!(backend.live_detectors(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_then_retry() {
    let camera = FlakyCamera {
        inner: SyntheticCamera::new(),
        failures: Arc::new(Semaphore::new(1)),
    };
    let synthetic = camera.inner.clone();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)]);
    let session = TrackingSession::spawn(camera, backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    let snapshot = wait_until(&mut snapshots, |s| s.state == SessionState::Error).await;
    assert_eq!(snapshot.error.as_deref(), Some(START_FAILURE_MESSAGE));
    assert!(!snapshot.is_tracking);
    assert_eq!(backend.initialized(), 0);
    assert_eq!(synthetic.active_tracks(), 0);

    // no automatic retry
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(session.snapshot().state, SessionState::Error);

    session.start().unwrap();
    let snapshot = wait_until(&mut snapshots, |s| s.keypoints.is_some()).await;
    assert!(snapshot.error.is_none());
    assert_eq!(synthetic.open_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_model_failure_releases_camera() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::new(Vec::new()).with_init_failure("weights unavailable");
    let session = TrackingSession::spawn(camera.clone(), backend, SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    let snapshot = wait_until(&mut snapshots, |s| s.state == SessionState::Error).await;

    assert_eq!(snapshot.error.as_deref(), Some(START_FAILURE_MESSAGE));
    assert_eq!(camera.open_count(), 1);
    assert_eq!(camera.active_tracks(), 0);

    // stop from the error state goes back to idle
    session.stop().unwrap();
    let snapshot = wait_until(&mut snapshots, |s| s.state == SessionState::Idle).await;
    assert!(snapshot.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stop_twice() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)]);
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.keypoints.is_some()).await;

    session.stop().unwrap();
    session.stop().unwrap();
    let snapshot = wait_until(&mut snapshots, |s| s.state == SessionState::Idle).await;

    assert_eq!(snapshot, TrackingSnapshot::default());
    assert_eq!(camera.active_tracks(), 0);
    assert_eq!(backend.live_detectors(), 0);

    // nothing is published after stop
    let estimates = backend.estimates();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.estimates(), estimates);
    assert_eq!(session.snapshot(), TrackingSnapshot::default());
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_start_completes() {
    let camera = SyntheticCamera::new().with_open_delay(Duration::from_secs(3));
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)])
        .with_init_delay(Duration::from_secs(2));
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.state == SessionState::Starting).await;
    session.stop().unwrap();
    // ignored while starting
    session.start().unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Idle);
    assert!(snapshot.keypoints.is_none());
    assert_eq!(camera.open_count(), 1);
    assert_eq!(camera.active_tracks(), 0);
    assert_eq!(backend.initialized(), 1);
    assert_eq!(backend.live_detectors(), 0);
    assert_eq!(backend.estimates(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_discards_inference_in_flight() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)])
        .with_latency(Duration::from_secs(10));
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.state == SessionState::Tracking).await;

    // first inference is now running
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.stop().unwrap();
    wait_until(&mut snapshots, |s| s.state == SessionState::Idle).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    let snapshot = session.snapshot();
    assert!(snapshot.keypoints.is_none());
    assert!(snapshot.body_bounds.is_none());
    assert_eq!(snapshot.frame_count, 0);
    assert_eq!(backend.estimates(), 0);
    assert_eq!(backend.live_detectors(), 0);
    assert_eq!(camera.active_tracks(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_low_visibility_publishes_nothing() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.3)]);
    let session = TrackingSession::spawn(camera, backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.state == SessionState::Tracking).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = session.snapshot();
    assert!(backend.estimates() > 0);
    assert_eq!(snapshot.state, SessionState::Tracking);
    assert!(snapshot.keypoints.is_none());
    assert!(snapshot.size_recommendation.is_none());
    assert_eq!(snapshot.frame_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_frames_keep_last_result() {
    let clock = GatedClock::new();
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::new(vec![
        Ok(vec![person(0.3, 0.9)]),
        Ok(vec![person(0.5, 0.1)]),
        Ok(Vec::new()),
    ]);
    let session = TrackingSession::spawn_with_clock(
        camera,
        backend.clone(),
        clock.clone(),
        SizeChart::default(),
        config(),
    );
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    clock.allow(1);
    let first = wait_until(&mut snapshots, |s| s.frame_count == 1).await;

    clock.allow(2);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.estimates(), 3);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.frame_count, 1);
    assert_eq!(snapshot.keypoints, first.keypoints);
    assert_eq!(snapshot.body_bounds, first.body_bounds);
}

#[tokio::test(start_paused = true)]
async fn test_restart_is_fresh() {
    let clock = GatedClock::new();
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::new(vec![
        Ok(vec![person(0.3, 0.9)]),
        Ok(vec![person(0.5, 0.9)]),
    ]);
    let session = TrackingSession::spawn_with_clock(
        camera.clone(),
        backend.clone(),
        clock.clone(),
        SizeChart::default(),
        config(),
    );
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    clock.allow(2);
    let second = wait_until(&mut snapshots, |s| s.frame_count == 2).await;

    let raw_first = {
        let keypoints = KeypointExtractor::new()
            .gate_candidates(&[person(0.3, 0.9)], frame_size())
            .unwrap();
        estimate_placement(&keypoints, frame_size(), &PlacementGeometry::default())
    };
    // second frame is smoothed towards the wider pose
    assert_ne!(second.body_bounds, Some(raw_first));

    session.stop().unwrap();
    let stopped = wait_until(&mut snapshots, |s| s.state == SessionState::Idle).await;
    assert!(stopped.keypoints.is_none());
    assert!(stopped.body_bounds.is_none());
    assert!(stopped.size_recommendation.is_none());

    session.start().unwrap();
    clock.allow(1);
    let restarted = wait_until(&mut snapshots, |s| s.frame_count == 1).await;
    assert_eq!(restarted.body_bounds, Some(raw_first));
    assert_eq!(camera.open_count(), 2);
    assert_eq!(backend.initialized(), 2);
    assert_eq!(backend.live_detectors(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_tracking_is_ignored() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)]);
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.keypoints.is_some()).await;
    session.start().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(camera.open_count(), 1);
    assert_eq!(backend.initialized(), 1);
    assert_eq!(session.snapshot().state, SessionState::Tracking);
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_everything() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)]);
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.keypoints.is_some()).await;
    drop(session);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(camera.active_tracks(), 0);
    assert_eq!(backend.live_detectors(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_during_inference_keeps_frames_flowing() {
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)])
        .with_latency(Duration::from_millis(50));
    let session = TrackingSession::spawn(camera.clone(), backend.clone(), SizeChart::default(), config());
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.state == SessionState::Tracking).await;

    // a start every 30 ms lands in the middle of almost every inference
    for _ in 0..20 {
        session.start().unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Tracking);
    assert!(snapshot.frame_count >= 5, "only {} frames", snapshot.frame_count);
    assert!(backend.estimates() >= 5);
    assert_eq!(camera.open_count(), 1);
    assert_eq!(backend.initialized(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_capture_error_skips_frame() {
    let clock = GatedClock::new();
    let camera = GlitchyCamera {
        inner: SyntheticCamera::new(),
        failures: Arc::new(Semaphore::new(1)),
    };
    let synthetic = camera.inner.clone();
    let backend = ScriptedBackend::repeating(vec![person(0.3, 0.9)]);
    let session = TrackingSession::spawn_with_clock(
        camera,
        backend.clone(),
        clock.clone(),
        SizeChart::default(),
        config(),
    );
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    wait_until(&mut snapshots, |s| s.state == SessionState::Tracking).await;

    clock.allow(1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.estimates(), 0);
    assert_eq!(session.snapshot().frame_count, 0);

    clock.allow(1);
    let snapshot = wait_until(&mut snapshots, |s| s.frame_count == 1).await;
    assert_eq!(snapshot.state, SessionState::Tracking);
    assert!(snapshot.error.is_none());
    assert_eq!(backend.estimates(), 1);
    assert_eq!(synthetic.active_tracks(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_inference_error_skips_frame() {
    let clock = GatedClock::new();
    let camera = SyntheticCamera::new();
    let backend = ScriptedBackend::new(vec![
        Err(InferError::Runtime("out of memory".to_string())),
        Ok(vec![person(0.3, 0.9)]),
    ]);
    let session = TrackingSession::spawn_with_clock(
        camera,
        backend.clone(),
        clock.clone(),
        SizeChart::default(),
        config(),
    );
    let mut snapshots = session.subscribe();

    session.start().unwrap();
    clock.allow(2);
    let snapshot = wait_until(&mut snapshots, |s| s.frame_count == 1).await;

    assert_eq!(backend.estimates(), 2);
    assert_eq!(snapshot.state, SessionState::Tracking);
    assert!(snapshot.error.is_none());
    assert!(snapshot.keypoints.is_some());
}
