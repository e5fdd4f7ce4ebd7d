use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fullbody_overlay::config::Config;
use fullbody_overlay::overlay::blank_canvas;
use fullbody_overlay::pipeline::FramePipeline;
use fullbody_overlay::replay::{annotate_all, play, Recording};
use fullbody_overlay::utils::{SharedState, State};

#[derive(Parser)]
#[command(
    name = "fullbody-overlay",
    version,
    about = "Full-body bounding box overlays from recorded detector output",
    long_about = None
)]
struct Cli {
    /// TOML config file; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the viewport boxes of every frame as JSON lines.
    Annotate {
        /// Recording (JSON)
        recording: PathBuf,
    },

    /// Draw one frame's overlays into a PNG.
    Render {
        /// Recording (JSON)
        recording: PathBuf,

        /// Frame index
        #[arg(short, long, default_value_t = 0)]
        frame: usize,

        /// Image to draw on; a blank viewport-sized canvas when omitted
        #[arg(short, long)]
        background: Option<PathBuf>,

        /// Output image path
        #[arg(short, long, default_value = "overlay.png")]
        output: PathBuf,
    },

    /// Replay the recording through a worker thread at a fixed frame rate.
    Play {
        /// Recording (JSON)
        recording: PathBuf,

        /// Frames per second
        #[arg(long, default_value_t = 30.0)]
        fps: f32,
    },
}

fn main() -> Result<()> {
    // Respect RUST_LOG; default to info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Annotate { recording } => cmd_annotate(&config, recording),
        Commands::Render {
            recording,
            frame,
            background,
            output,
        } => cmd_render(&config, recording, frame, background, output),
        Commands::Play { recording, fps } => cmd_play(&config, recording, fps),
    }
}

fn cmd_annotate(config: &Config, recording: PathBuf) -> Result<()> {
    let recording = Recording::load(&recording)?;
    let pipeline = FramePipeline::new(config);

    for output in annotate_all(&pipeline, &recording) {
        let line = serde_json::json!({
            "frame": output.frame_id,
            "annotations": output.annotations,
            "distances": output.distances,
        });
        println!("{}", line);
    }
    Ok(())
}

fn cmd_render(
    config: &Config,
    recording: PathBuf,
    frame: usize,
    background: Option<PathBuf>,
    output: PathBuf,
) -> Result<()> {
    let recording = Recording::load(&recording)?;
    let input = recording.frame(frame)?;
    let pipeline = FramePipeline::new(config);
    let result = pipeline.process(frame as u64, input);

    let mut canvas = match background {
        Some(path) => image::open(&path)
            .with_context(|| format!("opening background {}", path.display()))?
            .to_rgba8(),
        None => blank_canvas(input.viewport)?,
    };

    result.overlays.render(&mut canvas);
    canvas
        .save(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        "frame {}: {} shapes written to {}",
        frame,
        result.overlays.len(),
        output.display()
    );
    Ok(())
}

fn cmd_play(config: &Config, recording: PathBuf, fps: f32) -> Result<()> {
    let recording = Recording::load(&recording)?;
    let pipeline = Arc::new(FramePipeline::new(config));
    let state: SharedState = Arc::new(Mutex::new(State::new(config.distance.history_len)));

    let interval = Duration::from_secs_f32(1.0 / fps.max(1.0));
    play(pipeline, recording, Arc::clone(&state), interval)?;

    let guard = state
        .lock()
        .map_err(|_| anyhow::anyhow!("presentation state poisoned"))?;
    info!(
        "presented {} frames, dropped {}",
        guard.frames_presented, guard.frames_dropped
    );
    if let Some(mean) = guard.distance_ts.get_mean() {
        info!("mean distance to person: {:.2} meters", mean);
    }
    Ok(())
}
