mod draw;

use {
    anyhow::Context,
    base::Vec2,
    draw::{Canvas, draw_torso},
    fit::{ProductSizing, SizeChart},
    pose::{KeypointName, PoseBackend, PoseCandidate, ScriptedBackend},
    session::{SessionState, TrackingConfig, TrackingSession, TrackingSnapshot},
    std::{
        env,
        path::{Path, PathBuf},
        time::Duration,
    },
    video::{CameraConstraints, CameraSource, SyntheticCamera, VideoFrame},
};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FRAMES: u64 = 120;
const SCRIPT_LENGTH: usize = 90;

/// Scripted shopper swaying slightly in front of the camera.
///
/// Every 15th frame has a hidden hip so the visibility gate gets exercised.
fn swaying_shopper() -> Vec<Result<Vec<PoseCandidate>, pose::InferError>> {
    let frame_size = Vec2::new(WIDTH as f32, HEIGHT as f32);
    (0..SCRIPT_LENGTH)
        .map(|i| {
            let phase = i as f32 / SCRIPT_LENGTH as f32 * std::f32::consts::TAU;
            let sway = phase.sin() * 0.03;
            let tilt = phase.cos() * 0.02;
            let hip_visibility = if i % 15 == 14 { 0.2 } else { 0.85 };
            Ok(vec![PoseCandidate::from_normalized(
                frame_size,
                &[
                    (KeypointName::LeftShoulder, 0.28 + sway, 0.3 - tilt, 0.92),
                    (KeypointName::RightShoulder, 0.72 + sway, 0.3 + tilt, 0.9),
                    (KeypointName::LeftHip, 0.36 + sway, 0.72, hip_visibility),
                    (KeypointName::RightHip, 0.64 + sway, 0.72, 0.88),
                ],
            )])
        })
        .collect()
}

fn load_chart() -> anyhow::Result<SizeChart> {
    let Ok(path) = env::var("TRYON_PRODUCT") else {
        log::info!("TRYON_PRODUCT not set, using the default size chart");
        return Ok(SizeChart::default());
    };

    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let product = ProductSizing::from_json(&json).with_context(|| format!("parsing {path}"))?;
    log::info!("trying on {} ({})", product.name, product.id);
    Ok(product.size_chart_or_default())
}

fn log_snapshot(snapshot: &TrackingSnapshot) {
    let Some(recommendation) = snapshot.size_recommendation else {
        return;
    };
    log::info!(
        "frame {}: size {} ({}% match), shoulder {} cm, chest {} cm",
        snapshot.frame_count,
        recommendation.recommended_size,
        recommendation.match_percent(),
        recommendation.shoulder_width,
        recommendation.chest_width
    );
    if let Some(overlay) = snapshot.overlay() {
        log::debug!(
            "overlay at {:.1}% / {:.1}%, {:.1}% x {:.1}%, {:.3} rad",
            overlay.left,
            overlay.top,
            overlay.width,
            overlay.height,
            overlay.rotation
        );
    }
}

fn save_preview(snapshot: &TrackingSnapshot, path: &Path) -> anyhow::Result<()> {
    let size = snapshot
        .frame_size
        .unwrap_or(Vec2::new(WIDTH as usize, HEIGHT as usize));
    let mut frame = VideoFrame::solid(size, [40, 40, 48]);

    if let Some(bounds) = &snapshot.body_bounds {
        let mut canvas = Canvas::new(&mut frame.data, size);
        draw_torso(&mut canvas, bounds);
    }

    let image = image::RgbImage::from_raw(size.x as u32, size.y as u32, frame.data)
        .context("frame buffer does not match its size")?;
    image.save(path).with_context(|| format!("saving {}", path.display()))?;
    log::info!("preview written to {}", path.display());
    Ok(())
}

fn scripted_shopper() -> ScriptedBackend {
    ScriptedBackend::new(swaying_shopper())
        .with_looping(true)
        .with_init_delay(Duration::from_millis(300))
        .with_latency(Duration::from_millis(8))
}

async fn run<C, B>(
    camera: C,
    backend: B,
    constraints: CameraConstraints,
    chart: SizeChart,
    out: PathBuf,
) -> anyhow::Result<()>
where
    C: CameraSource + 'static,
    B: PoseBackend + 'static,
{
    let config = TrackingConfig::default()
        .with_constraints(constraints)
        .with_frame_rate(30);

    let session = TrackingSession::spawn(camera, backend, chart, config);
    let mut snapshots = session.subscribe();
    session.start()?;

    let mut last_logged = 0;
    loop {
        snapshots.changed().await?;
        let snapshot = snapshots.borrow_and_update().clone();

        match snapshot.state {
            SessionState::Error => {
                anyhow::bail!(
                    snapshot
                        .error
                        .unwrap_or_else(|| "tracking failed".to_string())
                );
            }
            SessionState::Tracking if snapshot.frame_count >= last_logged + 15 => {
                log_snapshot(&snapshot);
                last_logged = snapshot.frame_count;
            }
            _ => {}
        }

        if snapshot.frame_count >= FRAMES {
            save_preview(&snapshot, &out)?;
            break;
        }
    }

    session.shutdown().await?;
    Ok(())
}

/// Pick the pose model for `camera`: the ONNX model in `TRYON_MODEL` when
/// built with `onnx`, the scripted shopper otherwise.
async fn run_camera<C: CameraSource + 'static>(
    camera: C,
    constraints: CameraConstraints,
    chart: SizeChart,
    out: PathBuf,
) -> anyhow::Result<()> {
    #[cfg(feature = "onnx")]
    if let Ok(model) = env::var("TRYON_MODEL") {
        log::info!("running pose model {model}");
        let backend = pose::OnnxBackend::new(model);
        return run(camera, backend, constraints, chart, out).await;
    }

    run(camera, scripted_shopper(), constraints, chart, out).await
}

async fn try_main() -> anyhow::Result<()> {
    let out: PathBuf = env::var("TRYON_OUT")
        .unwrap_or_else(|_| "try-on.png".to_string())
        .into();
    let chart = load_chart()?;
    let constraints = CameraConstraints::default()
        .with_width(WIDTH)
        .with_height(HEIGHT);

    #[cfg(feature = "v4l2")]
    if let Ok(device) = env::var("TRYON_DEVICE") {
        log::info!("capturing from {device}");
        let constraints = constraints.with_device(device);
        return run_camera(video::V4l2Camera::new(), constraints, chart, out).await;
    }

    run_camera(SyntheticCamera::new(), constraints, chart, out).await
}

fn init_logging() {
    let Ok(dir) = env::var("TRYON_LOG_DIR") else {
        base::init_stdout_logger();
        return;
    };
    if let Err(e) = base::init_file_logger(dir.as_str()) {
        base::init_stdout_logger();
        log::warn!("cannot log to {dir}: {e}, using stdout");
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = try_main().await {
        base::log_fatal!("try-on failed: {:#}", e);
    }
}
