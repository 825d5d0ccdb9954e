use std::path::PathBuf;

use clap::{Parser, Subcommand};

use skylark_flight::sources::{self, SOURCE_NAMES};
use skylark_flight::{analyzer, run_session};
use skylark_shared::*;

mod sweep;

#[derive(Parser)]
#[command(name = "skylark", about = "Skylark motion flight CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an offline session driven by a synthetic motion source
    Run {
        /// Motion source (standing, glider, flapper, climber, diver, weaver)
        #[arg(long, default_value = "flapper")]
        source: String,

        /// Session length in seconds
        #[arg(long, default_value_t = 30)]
        seconds: u32,

        /// Seed for frame dropout
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Fraction of detection cycles dropped, within [0,1)
        #[arg(long, default_value_t = 0.0)]
        dropout: f32,

        /// Path to a TOML flight config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path for session log JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Analyze a recorded session log
    Analyze {
        /// Path to a session log JSON file
        log: PathBuf,
    },

    /// Start the game server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 3001)]
        port: u16,

        /// Path to a TOML flight config
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Sweep physics parameters and score each value for flight feel
    Sweep {
        /// Sweep a single parameter instead of all of them
        #[arg(long)]
        param: Option<String>,

        /// Number of values per parameter
        #[arg(long, default_value_t = 5)]
        steps: usize,

        /// Seeds per source per value
        #[arg(long, default_value_t = 8)]
        seeds: u32,

        /// Comma-separated list of motion sources
        #[arg(long, default_value = "flapper,glider,diver,weaver")]
        sources: String,

        /// Fraction of detection cycles dropped in sweep sessions
        #[arg(long, default_value_t = 0.1)]
        dropout: f32,

        /// Output path for CSV results
        #[arg(long)]
        output: Option<PathBuf>,

        /// Re-score the best-per-param config against the default
        #[arg(long)]
        validate: bool,

        /// Greedy forward-selection over the best values
        #[arg(long)]
        optimize: bool,
    },
}

/// Load the flight config from a TOML file, or fall back to defaults.
fn load_flight_config(path: Option<&PathBuf>) -> FlightConfig {
    match path {
        Some(path) => match FlightConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FlightConfig::default(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            seconds,
            seed,
            dropout,
            config,
            output,
        } => cmd_run(&source, seconds, seed, dropout, config, output),

        Commands::Analyze { log } => cmd_analyze(&log),

        Commands::Serve { port, config } => cmd_serve(port, config),

        Commands::Sweep {
            param,
            steps,
            seeds,
            sources,
            dropout,
            output,
            validate,
            optimize,
        } => sweep::cmd_sweep(
            param.as_deref(),
            steps,
            seeds,
            &sources,
            dropout,
            output,
            validate,
            optimize,
        ),
    }
}

fn cmd_run(
    source_name: &str,
    seconds: u32,
    seed: u64,
    dropout: f32,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) {
    let flight = load_flight_config(config_path.as_ref());
    let config = SessionConfig {
        seed,
        source: source_name.to_string(),
        max_ticks: seconds.saturating_mul(TICK_RATE),
        detect_interval: DETECT_INTERVAL,
        dropout,
        flight,
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid session config: {}", e);
        std::process::exit(1);
    }

    let mut source = match sources::from_config(&config) {
        Some(source) => source,
        None => {
            eprintln!(
                "Unknown source '{}'. Valid options: {}.",
                config.source,
                SOURCE_NAMES.join(", ")
            );
            std::process::exit(1);
        }
    };

    println!(
        "Running session: {} for {}s (seed={}, dropout={:.0}%)",
        source.name(),
        seconds,
        seed,
        dropout * 100.0
    );

    let log = run_session(&config, source.as_mut());
    print_session_report(&log);

    if let Some(path) = output {
        match serde_json::to_string_pretty(&log) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => println!("\nSession log written to {}", path.display()),
                Err(e) => eprintln!("\nFailed to write log: {}", e),
            },
            Err(e) => eprintln!("\nFailed to serialize log: {}", e),
        }
    }
}

fn cmd_analyze(path: &PathBuf) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to read log {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    let log: SessionLog = match serde_json::from_str(&text) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to parse log {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    println!(
        "Session log: {} ({} frames, seed={})",
        log.config.source,
        log.frames.len(),
        log.config.seed
    );
    print_session_report(&log);
}

fn cmd_serve(port: u16, config_path: Option<PathBuf>) {
    let config = load_flight_config(config_path.as_ref());

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    rt.block_on(async {
        if let Err(e) = skylark_server::run_server(port, config).await {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
    });
}

fn print_session_report(log: &SessionLog) {
    let summary = &log.summary;
    let metrics = analyzer::analyze(log);

    println!();
    println!("=== Session Result ===");
    println!(
        "Final tick:   {} ({:.1}s)",
        summary.final_tick,
        summary.final_tick as f32 / TICK_RATE as f32
    );
    println!("Peak height:  {:.1} m", summary.peak_height);
    println!("Peak speed:   {:.1} m/s", summary.peak_speed);
    println!("Landings:     {}", summary.landings);
    println!("Dropped:      {} detection cycles", summary.dropped_frames);
    println!("Forced idles: {}", summary.forced_idles);
    println!();
    println!("--- Flight Feel ---");
    println!("  Airborne:    {:.0}%", metrics.airborne_fraction * 100.0);
    println!("  Altitude:    {:.1} m range", metrics.altitude_range);
    println!("  Mean speed:  {:.1} m/s", metrics.mean_speed);
    println!("  Switches:    {}", metrics.mode_switches);
    println!("  Smoothness:  {:.3} rad/s step", metrics.turn_smoothness);
    println!("  Flow score:  {:.1}", metrics.flow_score);
}
