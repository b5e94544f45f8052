//! EMG Gesture Agent CLI
//!
//! Classifies smoothed EMG readings and fires numbered actions on a
//! double clench.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emg_gesture_agent::{
    config::Config,
    core::{DetectorSnapshot, RawSample},
    sink::{ActionSink, CommandSink, LogSink},
    source::{ReplaySource, SampleTicker},
    stats::{create_shared_stats, SharedStats},
    Classifier, Pipeline, VERSION,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "emg-gesture")]
#[command(version = VERSION)]
#[command(about = "Threshold EMG classifier with double-clench gesture detection", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long = "config-file", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detector over a stream of raw readings
    Run {
        /// File with one raw reading per line (stdin if omitted)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Log actions instead of running scripts and notifications
        #[arg(long)]
        dry_run: bool,

        /// Directory holding the numbered action scripts
        #[arg(long)]
        script_dir: Option<PathBuf>,
    },

    /// Classify one or more amplitude values
    Classify {
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Show configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },

    /// Show threshold bands in the order they are checked
    Thresholds,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config_file.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            dry_run,
            script_dir,
        } => cmd_run(config, input, dry_run, script_dir),
        Commands::Classify { values } => cmd_classify(&config, &values),
        Commands::Config { save } => {
            let path = cli.config_file.unwrap_or_else(Config::config_path);
            cmd_config(&config, &path, save)
        }
        Commands::Thresholds => cmd_thresholds(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };
    config.detector.validate().context("invalid detector configuration")?;
    Ok(config)
}

fn cmd_run(
    mut config: Config,
    input: Option<PathBuf>,
    dry_run: bool,
    script_dir: Option<PathBuf>,
) -> Result<()> {
    if let Some(dir) = script_dir {
        config.actions.script_dir = dir;
    }

    println!("EMG Gesture Agent v{VERSION}");
    println!();
    println!(
        "  Sample interval: {}ms",
        config.detector.sample_interval.as_millis()
    );
    println!("  History length: {}", config.detector.history_length);
    println!(
        "  Double clench gap: {}ms..{}ms",
        config.detector.double_clench_min_gap.as_millis(),
        config.detector.double_clench_max_gap.as_millis()
    );
    println!("  Cooldown: {}ms", config.detector.cooldown.as_millis());
    if dry_run {
        println!("  Actions: dry run (logged only)");
    } else {
        println!("  Actions: {:?}", config.actions.script_dir);
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let reader: Box<dyn BufRead + Send> = match input {
        Some(ref path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };
    let mut source = ReplaySource::new(reader, config.source.channel_capacity)
        .with_rate(config.source.replay_rate_hz);
    source.start().context("starting sample source")?;

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    let stats = create_shared_stats();
    let snapshot = if dry_run {
        run_pipeline(&config, LogSink, &mut source, running, stats.clone())?
    } else {
        let sink = CommandSink::new(&config.actions);
        run_pipeline(&config, sink, &mut source, running, stats.clone())?
    };

    println!();
    println!("Stopping...");
    println!(
        "Final state: {:?}, trigger count {}, history [{}]",
        snapshot.phase, snapshot.trigger_count, snapshot.history
    );
    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn run_pipeline<S: ActionSink>(
    config: &Config,
    sink: S,
    source: &mut ReplaySource,
    running: Arc<AtomicBool>,
    stats: SharedStats,
) -> Result<DetectorSnapshot> {
    let pipeline = Pipeline::new(&config.detector, sink, stats.clone())?;

    let ticker = SampleTicker::new(&config.detector, &config.source);
    let readings = source.receiver().clone();
    let sender = pipeline.sender();
    let ticker_handle = thread::Builder::new()
        .name("sample-ticker".to_string())
        .spawn(move || ticker.run(readings, sender, running, stats))
        .context("starting sample ticker")?;

    let snapshot = pipeline.run();

    if ticker_handle.join().is_err() {
        tracing::warn!("sample ticker panicked");
    }
    source.stop();
    Ok(snapshot)
}

fn cmd_classify(config: &Config, values: &[f64]) -> Result<()> {
    let classifier = Classifier::new(&config.detector)?;
    for value in values {
        let event_type = classifier.classify(RawSample::new(*value));
        println!("{value:>10.2}  {event_type}");
    }
    Ok(())
}

fn cmd_config(config: &Config, path: &Path, save: bool) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).context("serializing configuration")?
    );

    if save {
        config
            .save_to(path)
            .with_context(|| format!("saving configuration to {}", path.display()))?;
        println!();
        println!("Saved to {path:?}");
    }
    Ok(())
}

fn cmd_thresholds(config: &Config) -> Result<()> {
    let classifier = Classifier::new(&config.detector)?;
    let range = classifier.signal_range();

    println!("Bands, checked in order (first match wins, bounds exclusive):");
    println!();
    println!(
        "  1. none            value > {} or value < {}",
        range.max, range.min
    );
    for (i, (event_type, band)) in classifier.bands().iter().enumerate() {
        println!(
            "  {}. {:<15} {} < value < {}",
            i + 2,
            event_type.to_string(),
            band.min,
            band.max
        );
    }
    println!();
    println!("Values on a band edge match nothing and classify as none.");
    println!("If retuned bands overlap, the earlier band in this list wins.");
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")
}
