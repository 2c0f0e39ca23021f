use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dropnote::config::AppConfig;
use dropnote::engine::{CaptureState, NoteEngine};
use dropnote::geo::{GeoPoint, ProximityFilter};
use dropnote::motion::{Motion, Sample};
use dropnote::notes::{JsonNoteStore, NoteStore};
use dropnote::testing::FixtureLocationSource;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dropnote-sim error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dropnote-sim", about = "Synthetic sensor trace harness CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        match self.command {
            Command::Run(args) => run_command(args),
            Command::List(args) => list_command(args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the engine with a noisy synthetic trace containing one drop.
    Run(RunArgs),
    /// Print the stored notes near a reference point.
    List(ListArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Text captured by the simulated drop.
    #[arg(long, default_value = "hello from the sim")]
    note: String,
    /// Quiet ticks to feed before injecting the drop gesture.
    #[arg(long, default_value_t = 20)]
    warmup_ticks: usize,
    /// Peak-to-peak amplitude of the sensor noise.
    #[arg(long, default_value_t = 0.05)]
    noise: f32,
    /// RNG seed for a reproducible trace.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Latitude the fixture location source resolves to.
    #[arg(long, default_value_t = 48.137)]
    lat: f64,
    /// Longitude the fixture location source resolves to.
    #[arg(long, default_value_t = 11.575)]
    lon: f64,
    /// Note store file shared with the `list` command.
    #[arg(long, default_value = "notes.json")]
    notes_file: PathBuf,
    /// Optional JSON config file (defaults apply when missing).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
    #[arg(long, default_value_t = 48.137)]
    lat: f64,
    #[arg(long, default_value_t = 11.575)]
    lon: f64,
    #[arg(long, default_value = "notes.json")]
    notes_file: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    match path {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    }
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_ref());
    let buffer_size = config.gesture.buffer_size;
    let store = Arc::new(JsonNoteStore::new(&args.notes_file));
    let fix = GeoPoint::new(args.lat, args.lon);
    let location = Arc::new(FixtureLocationSource::resolving(fix));
    let engine = NoteEngine::new(config, store.clone(), location);

    engine.set_pending_text(&args.note);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut noisy = |base: Sample| -> Sample {
        let jitter = args.noise / 2.0;
        Sample::new(
            base.x + rng.gen_range(-jitter..=jitter),
            base.y + rng.gen_range(-jitter..=jitter),
            base.z + rng.gen_range(-jitter..=jitter),
        )
    };

    // Device at rest: gravity on Z plus sensor noise. The first tick
    // doubles as the calibration baseline.
    let rest = Sample::new(0.1, -0.2, 9.81);
    let mut detections = 0usize;
    let mut fed = 0usize;
    for _ in 0..args.warmup_ticks.max(1) {
        if engine.handle_sample(noisy(rest)) == Motion::Drop {
            detections += 1;
        }
        fed += 1;
    }

    // Keep the gesture off the wrap boundary: a triplet straddling the last
    // and first physical slots is invisible to the scan.
    while fed % buffer_size > buffer_size - 3 {
        engine.handle_sample(noisy(rest));
        fed += 1;
    }

    // The drop itself, expressed relative to the rest baseline: a lead-in,
    // the catch spike, then the rebound with the Y deflection.
    let gesture = [
        Sample::new(rest.x, rest.y, rest.z + 5.0),
        Sample::new(rest.x, rest.y - 7.0, rest.z + 20.0),
        Sample::new(rest.x, rest.y - 7.0, rest.z - 15.0),
    ];
    for raw in gesture {
        if engine.handle_sample(noisy(raw)) == Motion::Drop {
            detections += 1;
        }
    }

    if detections == 0 {
        bail!("synthetic trace produced no drop detection");
    }
    println!("drop detected ({} classification(s))", detections);

    // The capture resolves on a worker thread; give it a moment
    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.capture_state() != CaptureState::Idle {
        if Instant::now() > deadline {
            bail!("capture did not complete within 2s");
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    println!("stored notes: {}", store.load_all()?.len());
    if let Some(update) = engine.nearby_snapshot() {
        println!(
            "nearby at ({}, {}): {} note(s)",
            update.reference.latitude, update.reference.longitude, update.count
        );
        for note in &update.notes {
            println!("  {}", note);
        }
    }
    Ok(())
}

fn list_command(args: ListArgs) -> Result<()> {
    let config = load_config(args.config.as_ref());
    let store = JsonNoteStore::new(&args.notes_file);
    let filter = ProximityFilter::new(&config.proximity);

    let notes = store.load_all()?;
    let nearby = filter.notes_in_radius(GeoPoint::new(args.lat, args.lon), &notes);

    println!("{} of {} stored note(s) nearby", nearby.len(), notes.len());
    for note in &nearby {
        println!("  {}", note);
    }
    Ok(())
}
