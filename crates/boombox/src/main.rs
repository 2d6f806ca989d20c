mod audio;
mod renderer;
mod ui;
mod utils;

use audio::{list_devices, spawn_load, AudioInput, DecodedTrack, LiveInput, SourceError, TrackPlayer};
use boombox_api::{Bounds, NannouCanvas};
use clap::Parser;
use nannou::prelude::*;
use renderer::{Renderer, Resolution};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::OnceLock;
use std::time::Duration;
use ui::bindings::{parse_key, Action};
use utils::{Config, Settings, Tick};

#[derive(Parser, Debug)]
#[command(name = "boombox")]
#[command(about = "Audio-reactive boombox visualizer", long_about = None)]
struct Cli {
    /// Run in a window instead of fullscreen
    #[arg(short, long)]
    windowed: bool,

    /// WAV file to start playing
    #[arg(long, value_name = "PATH", conflicts_with = "mic")]
    file: Option<PathBuf>,

    /// Start reacting to the live input device
    #[arg(long)]
    mic: bool,

    /// Seed for effect randomness (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Print audio devices and exit
    #[arg(long)]
    list_devices: bool,
}

/// Parsed once in `main`, read by nannou's model function
struct Startup {
    cli: Cli,
    config: Config,
    settings: Settings,
}

static STARTUP: OnceLock<Startup> = OnceLock::new();

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if cli.list_devices {
        println!("\n=== Audio Devices ===");
        for (idx, name) in list_devices().iter().enumerate() {
            println!("  [{idx}] {name}");
        }
        return;
    }

    let config = Config::load();
    let mut settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }

    let _ = STARTUP.set(Startup {
        cli,
        config,
        settings,
    });
    nannou::app(model).update(update).run();
}

struct Model {
    renderer: Renderer,
    settings: Settings,
    tracks: Vec<PathBuf>,
    input_device: Option<String>,
    device_timeout: Duration,
    /// Track decoding in the background, if any
    pending: Option<Receiver<Result<DecodedTrack, SourceError>>>,
}

fn model(app: &App) -> Model {
    let Some(startup) = STARTUP.get() else {
        tracing::error!("Model built before startup");
        std::process::exit(1);
    };
    let resolution = Resolution::current(startup.cli.windowed);
    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("boombox")
        .view(view)
        .key_pressed(key_pressed)
        .dropped_file(dropped_file)
        .size(resolution.width, resolution.height)
        .min_size(400, 400);
    if resolution.fullscreen {
        win = win.fullscreen();
    }
    if let Err(e) = win.build() {
        tracing::error!("Failed to open window: {e:?}");
        std::process::exit(1);
    }

    let renderer = match Renderer::new(startup.settings.clone()) {
        Ok(renderer) => renderer,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let mut model = Model {
        renderer,
        settings: startup.settings.clone(),
        tracks: startup.config.tracks().to_vec(),
        input_device: startup.config.input_device.clone(),
        device_timeout: Duration::from_secs(startup.config.device_timeout_secs()),
        pending: None,
    };

    if let Some(path) = &startup.cli.file {
        load_track(&mut model, path.clone());
    } else if startup.cli.mic {
        start_live(&mut model);
    }

    model
}

fn start_live(model: &mut Model) {
    match LiveInput::open(model.input_device.as_deref(), model.device_timeout) {
        Ok(input) => {
            let feed = AudioInput::new(input, model.settings.analyzer);
            model.renderer.start_experience(Box::new(feed), None);
        }
        Err(e) => {
            tracing::warn!("Live input unavailable: {e}");
            model.renderer.notify("Live input unavailable");
        }
    }
}

fn load_track(model: &mut Model, path: PathBuf) {
    tracing::info!("Loading {}", path.display());
    model.pending = Some(spawn_load(path));
}

fn play_track(model: &mut Model, track: DecodedTrack) {
    let title = track.title.clone();
    match TrackPlayer::play(track, model.device_timeout) {
        Ok(player) => {
            let feed = AudioInput::new(player, model.settings.analyzer);
            model.renderer.start_experience(Box::new(feed), Some(&title));
        }
        Err(e) => {
            tracing::warn!("Cannot play {title}: {e}");
            model.renderer.notify(format!("Cannot play {title}"));
        }
    }
}

/// Finish a background load if it has reported back
fn poll_pending(model: &mut Model) {
    let Some(rx) = &model.pending else {
        return;
    };
    let result = match rx.try_recv() {
        Ok(result) => result,
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => Err(SourceError::LoaderGone),
    };
    model.pending = None;

    match result {
        Ok(track) => play_track(model, track),
        Err(e) => {
            tracing::warn!("Track failed to load: {e}");
            model.renderer.notify("Track failed to load");
        }
    }
}

fn update(app: &App, model: &mut Model, update: Update) {
    poll_pending(model);

    let tick = if model.settings.realtime {
        Tick::from_elapsed(update.since_last.as_secs_f32())
    } else {
        Tick::FRAME
    };
    model.renderer.update(Bounds::from(app.window_rect()), tick);
}

fn view(app: &App, model: &Model, frame: Frame) {
    // The wash only darkens, so start from black once
    if frame.nth() == 0 {
        frame.clear(BLACK);
    }

    let draw = app.draw();
    let mut canvas = NannouCanvas::new(&draw);
    model
        .renderer
        .draw(&mut canvas, Bounds::from(app.window_rect()));

    if let Err(e) = draw.to_frame(app, &frame) {
        tracing::warn!("Frame render failed: {e:?}");
    }
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    match parse_key(key) {
        Some(Action::Quit) => app.quit(),
        Some(Action::StartLive) => start_live(model),
        Some(Action::PlayPreset(slot)) => match model.tracks.get(slot).cloned() {
            Some(path) => load_track(model, path),
            None => {
                tracing::info!("No preset track in slot {}", slot + 1);
                model.renderer.notify(format!("No track in slot {}", slot + 1));
            }
        },
        Some(Action::Reset) => {
            model.pending = None;
            model.renderer.reset();
        }
        None => {}
    }
}

fn dropped_file(_app: &App, model: &mut Model, path: PathBuf) {
    load_track(model, path);
}
