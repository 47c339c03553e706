use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use flow_text_core::{
    AppConfig, Animator, ButtonLayout, CaptureQueue, CaptureRecorder, ControlSurface,
    FrameClock, FramePacer, GlyphRenderer, Phase, ProfileKind, RecordingSettings, Stage,
    TextLibrary, TraceRenderer, TransportBindings,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Seconds between reconnection attempts while the surface is missing.
const RECONNECT_INTERVAL_SECS: u64 = 5;

fn main() -> flow_text_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live(args) => run_live(args),
        Commands::Simulate(args) => run_simulate(args),
        Commands::Ports => run_ports(),
    }
}

fn run_live(args: LiveArgs) -> flow_text_core::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.surface.port = Some(port);
    }
    if let Some(layout) = args.layout {
        config.surface.layout = layout.into();
    }
    if let Some(profile) = args.profile {
        config.profile = profile.into();
    }
    if let Some(captures) = args.captures {
        config.capture.output = Some(captures);
    }
    config.validate()?;

    tracing::info!(
        profile = ?config.profile,
        layout = ?config.surface.layout,
        port = config.surface.port.as_deref(),
        "starting live mode"
    );

    let library = load_library(args.texts.as_deref())?;
    let mut surface = ControlSurface::new(config.surface.layout);
    surface.initialize(config.surface.port.as_deref());
    let handle = surface.handle();

    let (mut stage, queue) = build_stage(&config, library)?;

    let mut recorder = CaptureRecorder::new(RecordingSettings {
        output_path: config
            .capture
            .output
            .clone()
            .unwrap_or_else(|| RecordingSettings::default().output_path),
        user_id: config.capture.user_id.clone(),
    });
    recorder.start()?;
    let consumer = spawn_capture_consumer(queue, recorder);

    let mut clock = FrameClock::new(config.frame_rate);
    let mut pacer = FramePacer::new(&clock);
    let mut renderer = TraceRenderer::new();
    let poll_every = u64::from(clock.rate_hz());

    loop {
        let frame = clock.advance();

        if frame % poll_every == 0 && !surface.poll_connection() {
            let seconds = frame / poll_every;
            if seconds % RECONNECT_INTERVAL_SECS == 0 {
                surface.initialize(config.surface.port.as_deref());
            }
        }

        let output = stage.step_snapshot(frame, handle.snapshot());
        renderer.draw(&output)?;

        if args.frames.is_some_and(|limit| frame >= limit) {
            break;
        }
        pacer.wait();
    }

    // Dropping the stage closes the capture channel and ends the consumer.
    drop(stage);
    if consumer.join().is_err() {
        tracing::warn!("capture consumer thread panicked");
    }
    tracing::info!(frames = renderer.frames(), "live mode finished");
    Ok(())
}

fn run_simulate(args: SimulateArgs) -> flow_text_core::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(profile) = args.profile {
        config.profile = profile.into();
    }
    if let Some(layout) = args.layout {
        config.surface.layout = layout.into();
    }
    config.validate()?;

    let library = load_library(args.texts.as_deref())?;
    let mut script = match args.script.as_deref() {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };
    script.sort_by_key(|entry| entry.frame);

    let mut surface = ControlSurface::new(config.surface.layout);
    if args.script.is_some() {
        surface.attach_virtual("simulated")?;
    }
    let handle = surface.handle();

    let (mut stage, queue) = build_stage(&config, library)?;
    let mut clock = FrameClock::new(config.frame_rate);
    let mut summary = SimulationSummary::default();
    let mut previous_phase = stage.animator().phase();
    let mut entries = script.iter().peekable();

    for _ in 0..args.frames {
        let frame = clock.advance();
        while let Some(entry) = entries.next_if(|entry| entry.frame <= frame) {
            if surface.feed(&entry.bytes)?.is_none() {
                tracing::debug!(frame, bytes = ?entry.bytes, "scripted message ignored");
            }
        }

        let output = stage.step_snapshot(frame, handle.snapshot());
        summary.phases.count(output.phase);
        if previous_phase == Phase::Restarting && output.phase == Phase::Typing {
            summary.cycles += 1;
        }
        previous_phase = output.phase;

        while let Some(pending) = queue.try_next() {
            summary.captures.push(pending.complete());
        }
    }

    let animator = stage.animator();
    summary.frames = clock.frame();
    summary.final_index = animator.text_set_index();
    summary.final_title = animator.current_set().title.clone();
    summary.final_phase = Some(animator.phase());

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_ports() -> flow_text_core::Result<()> {
    let ports = ControlSurface::list_ports()?;
    if ports.is_empty() {
        println!("no MIDI input ports found");
    }
    for (index, name) in ports.iter().enumerate() {
        println!("{index}: {name}");
    }
    Ok(())
}

fn build_stage(
    config: &AppConfig,
    library: TextLibrary,
) -> flow_text_core::Result<(Stage, CaptureQueue)> {
    let animator = Animator::new(library, config.profile.timing(), config.viewport)?;
    let bindings = TransportBindings {
        capture: config.capture.control,
        ..TransportBindings::default()
    };
    Ok(Stage::new(animator, config.profile.mapping(), bindings))
}

fn spawn_capture_consumer(
    queue: CaptureQueue,
    mut recorder: CaptureRecorder,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for pending in queue.iter() {
            match recorder.record(&pending.event) {
                Ok(submission) => {
                    tracing::info!(name = %submission.name, "capture stored");
                }
                Err(err) => {
                    tracing::error!(%err, frame = pending.event.frame, "failed to store capture");
                }
            }
        }
        if let Err(err) = recorder.stop() {
            tracing::warn!(%err, "failed to close capture file");
        }
    })
}

fn load_config(path: Option<&Path>) -> flow_text_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::live_defaults()),
    }
}

fn load_library(path: Option<&Path>) -> flow_text_core::Result<TextLibrary> {
    match path {
        Some(path) => {
            let library = TextLibrary::load(path)?;
            tracing::info!(?path, sets = library.len(), "loaded text library");
            Ok(library)
        }
        None => Ok(TextLibrary::builtin()),
    }
}

fn load_script(path: &Path) -> flow_text_core::Result<Vec<ScriptEntry>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// One raw device message delivered at a given frame.
#[derive(Debug, Clone, Deserialize)]
struct ScriptEntry {
    frame: u64,
    bytes: Vec<u8>,
}

#[derive(Debug, Default, Serialize)]
struct PhaseCounts {
    typing: u64,
    waiting: u64,
    falling: u64,
    restarting: u64,
}

impl PhaseCounts {
    fn count(&mut self, phase: Phase) {
        match phase {
            Phase::Typing => self.typing += 1,
            Phase::Waiting => self.waiting += 1,
            Phase::Falling => self.falling += 1,
            Phase::Restarting => self.restarting += 1,
        }
    }
}

#[derive(Debug, Default, Serialize)]
struct SimulationSummary {
    frames: u64,
    phases: PhaseCounts,
    cycles: u64,
    final_index: usize,
    final_title: String,
    final_phase: Option<Phase>,
    captures: Vec<flow_text_core::CaptureEvent>,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "MIDI-driven kinetic typography", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to the control surface and run the animation.
    Live(LiveArgs),
    /// Run the animation headless and print a JSON summary.
    Simulate(SimulateArgs),
    /// List available MIDI input ports.
    Ports,
}

#[derive(clap::Args, Debug)]
struct LiveArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON file with the text sets to cycle through.
    #[arg(short, long)]
    texts: Option<PathBuf>,
    /// Substring of the MIDI input port name.
    #[arg(short, long)]
    port: Option<String>,
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,
    /// Where captures are appended as JSON lines.
    #[arg(long)]
    captures: Option<PathBuf>,
    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    texts: Option<PathBuf>,
    /// Number of frames to run.
    #[arg(long, default_value_t = 1_200)]
    frames: u64,
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,
    /// JSON list of `{ "frame": n, "bytes": [status, data1, data2] }`
    /// messages. Without a script the surface stays disconnected.
    #[arg(short, long)]
    script: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Note,
    Cc,
}

impl From<LayoutArg> for ButtonLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Note => ButtonLayout::Note,
            LayoutArg::Cc => ButtonLayout::Cc,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Classic,
    Extended,
}

impl From<ProfileArg> for ProfileKind {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Classic => ProfileKind::Classic,
            ProfileArg::Extended => ProfileKind::Extended,
        }
    }
}
