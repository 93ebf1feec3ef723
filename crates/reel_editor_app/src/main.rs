// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reel Editor - headless scene player
//!
//! Loads a saved scene, plays it against an in-memory video clock and logs
//! the state every widget resolves to on each frame.
//!
//! ```text
//! reel_editor [--config <file.ron>] [--frames <n>] [--duration <seconds>] <scene.json>
//! ```

use reel_editor_app::config::CONFIG_FILE_NAME;
use reel_editor_app::{
    EditorConfig, EditorError, FsImageLoader, HeadlessVideo, SerializedData, WidgetManager,
};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Frames played when `--frames` is not given
const DEFAULT_FRAMES: u64 = 120;

/// Assumed video length when `--duration` is not given
const DEFAULT_DURATION: f64 = 60.0;

/// Log filter when `RUST_LOG` is unset: this binary and the editor library
const DEFAULT_LOG_FILTER: &str = "reel_editor=info,reel_editor_app=debug";

struct Args {
    config: Option<PathBuf>,
    frames: u64,
    duration: f64,
    scene: PathBuf,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    let config = args.opt_value_from_str("--config")?;
    let frames = args.opt_value_from_str("--frames")?.unwrap_or(DEFAULT_FRAMES);
    let duration = args.opt_value_from_str("--duration")?.unwrap_or(DEFAULT_DURATION);
    let scene = args.free_from_str()?;
    Ok(Args {
        config,
        frames,
        duration,
        scene,
    })
}

async fn play(args: Args) -> reel_editor_app::Result<()> {
    let scene_dir = args.scene.parent().unwrap_or(Path::new(".")).to_path_buf();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::load_or_default(&scene_dir.join(CONFIG_FILE_NAME))?,
    };
    let data = SerializedData::read_from(&args.scene)?;

    let [width, height] = config.fallback_video_size;
    let video = HeadlessVideo::new().with_metadata([width, height], args.duration);
    let mut manager = WidgetManager::new(video, FsImageLoader::new(&scene_dir), config);
    manager.load(data).await?;
    manager.on_video_ready();
    manager.video_mut().play();

    let mut frame = 0;
    let frames = args.frames;
    manager
        .run(|manager, delta| {
            let time = manager.timeline().time();
            for widget in manager.widgets() {
                let element = widget.element().read();
                tracing::info!(
                    frame,
                    time,
                    widget = widget.id(),
                    visibility = ?element.visibility,
                    "{}",
                    element.style_transform()
                );
            }
            frame += 1;
            if frame >= frames {
                return ControlFlow::Break(());
            }
            manager.video_mut().advance(delta);
            ControlFlow::Continue(())
        })
        .await;

    tracing::info!("Played {} frames", frame);
    Ok(())
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Reel Editor v{}", env!("CARGO_PKG_VERSION"));

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!(
                "usage: reel_editor [--config <file.ron>] [--frames <n>] [--duration <seconds>] <scene.json>"
            );
            std::process::exit(2);
        }
    };

    if let Err(e) = play(args).await {
        tracing::error!("Playback failed: {e}");
        if let EditorError::ImageLoad { .. } = e {
            tracing::error!("Image sources are resolved relative to the scene file");
        }
        std::process::exit(1);
    }
}
