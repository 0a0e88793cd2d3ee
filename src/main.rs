use glam::{vec2, Vec2};
use stencil::geom::AABox;
use stencil::*;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
#[error("no global tracing subscriber set")]
struct NoTracingSubscriber;

fn configure_tracing() -> anyhow::Result<()> {
	let result = Err(NoTracingSubscriber);

	let result = result.or_else(|_| {
		let max_level = if cfg!(debug_assertions) {
			tracing::Level::TRACE
		} else {
			tracing::Level::INFO
		};
		tracing::subscriber::set_global_default(
			tracing_subscriber::FmtSubscriber::builder()
				.with_max_level(max_level)
				.finish(),
		)
	});

	Ok(result?)
}

fn configure_logging() -> anyhow::Result<()> {
	configure_tracing()?;

	// Redirect `log` to `tracing`. If setting the subscriber above failed, the "log" feature of
	// `tracing` sends events the other way instead.
	#[cfg(feature = "log")]
	tracing_log::LogTracer::init()?;

	Ok(())
}

const FRAME: Duration = Duration::from_millis(16);

/// Presses, traces a closed loop around `center` and releases. Returns the release time.
fn trace_loop(
	session: &mut impl FnMut(PointerSample) -> CaptureEvent,
	center: Vec2,
	radius: f32,
	jitter: f32,
	samples: u32,
) -> Duration {
	for i in 0..=samples {
		let angle = std::f32::consts::TAU * i as f32 / samples as f32;
		let noise = vec2(fastrand::f32() - 0.5, fastrand::f32() - 0.5) * 2.0 * jitter;
		session(PointerSample::pressed(
			center + radius * Vec2::from_angle(angle) + noise,
			FRAME * i,
		));
	}
	let released = FRAME * (samples + 1);
	session(PointerSample::released(released));
	released
}

fn render_reference(
	profile: Profile,
	rasterizer: &mut CpuRasterizer,
	brush: BrushConfig,
) -> anyhow::Result<PixelBuffer> {
	let mut capture = StrokeCapture::new(
		CaptureConfig::builder()
			.smoothing_factor(0.0)
			.brush(brush)
			.build(),
	);
	trace_loop(&mut |s| capture.handle(s), Vec2::ZERO, 3.0, 0.0, 360);

	let resolution = profile.texture_resolution();
	let mut reference = PixelBuffer::new(resolution, resolution)?;
	rasterizer.render(capture.drawing(), &mut reference)?;
	Ok(reference)
}

fn run(profile: Profile) -> anyhow::Result<()> {
	fastrand::seed(0x13371337);
	let viewport = AABox::new(vec2(-5.0, -5.0), vec2(5.0, 5.0));
	let brush = BrushConfig::sized(BrushSize::Large).with_color("#D03030")?;

	let mut rasterizer = CpuRasterizer::new(viewport);
	let reference = render_reference(profile, &mut rasterizer, brush)?;

	let mut session = TraceSession::new(
		StrokeCapture::new(CaptureConfig::for_profile(profile)),
		Validator::new(ValidatorConfig::for_profile(profile)),
		rasterizer,
	);
	session.set_reference(reference);
	session.set_brush(brush.with_color_or_white("#C83838"));
	session.subscribe(|result| {
		tracing::info!(
			score = format!("{:.1}%", result.final_score_percentage()),
			quality = %result.quality(),
			passing = result.is_passing(),
			"trace scored"
		);
	});

	let released = trace_loop(&mut |s| session.handle(s), Vec2::ZERO, 3.05, 0.08, 240);
	let mut now = released;
	while session.capture().validation_pending() {
		now += FRAME;
		session.tick(now);
	}

	let drawing = session.drawing();
	tracing::info!(
		strokes = drawing.stroke_count(),
		points = drawing.total_point_count(),
		result = %session.current_result(),
		"done"
	);
	Ok(())
}

fn main() {
	if let Err(error) = configure_logging() {
		// We can technically continue without logging.
		tracing::error!(error = error.to_string());
	}

	let profile = if std::env::args().any(|arg| arg == "--mobile") {
		Profile::Mobile
	} else {
		Profile::Desktop
	};

	if let Err(error) = run(profile) {
		tracing::error!(%error, "demo failed");
		std::process::exit(1);
	}
}
