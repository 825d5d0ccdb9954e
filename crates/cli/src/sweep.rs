use std::io::Write;
use std::path::PathBuf;

use rayon::prelude::*;

use skylark_flight::analyzer::{self, FlightMetrics};
use skylark_flight::{run_session, sources};
use skylark_shared::*;

/// Sweep sessions are scored on 30 seconds of flight.
const SWEEP_TICKS: u32 = 30 * TICK_RATE;

/// A sweepable physics parameter with its name, range, and accessor.
struct SweepParam {
    name: &'static str,
    min: f64,
    default: f64,
    max: f64,
    /// Apply this parameter value to a FlightConfig.
    apply: fn(&mut FlightConfig, f64),
}

const SWEEP_PARAMS: &[SweepParam] = &[
    SweepParam {
        name: "gravity",
        min: 4.0,
        default: 10.0,
        max: 18.0,
        apply: |c, v| c.gravity = v as f32,
    },
    SweepParam {
        name: "drag",
        min: 0.1,
        default: 0.4,
        max: 0.9,
        apply: |c, v| c.drag = v as f32,
    },
    SweepParam {
        name: "lift_factor",
        min: 0.05,
        default: 0.15,
        max: 0.3,
        apply: |c, v| c.lift_factor = v as f32,
    },
    SweepParam {
        name: "flap_strength",
        min: 10.0,
        default: 18.0,
        max: 28.0,
        apply: |c, v| c.flap_strength = v as f32,
    },
    SweepParam {
        name: "flap_thrust",
        min: 2.0,
        default: 6.0,
        max: 12.0,
        apply: |c, v| c.flap_thrust = v as f32,
    },
    SweepParam {
        name: "dive_accel",
        min: 6.0,
        default: 14.0,
        max: 24.0,
        apply: |c, v| c.dive_accel = v as f32,
    },
    SweepParam {
        name: "max_speed",
        min: 15.0,
        default: 30.0,
        max: 50.0,
        apply: |c, v| c.max_speed = v as f32,
    },
    SweepParam {
        name: "max_turn_rate",
        min: 0.8,
        default: 1.8,
        max: 3.0,
        apply: |c, v| c.max_turn_rate = v as f32,
    },
    SweepParam {
        name: "turn_bleed",
        min: 0.0,
        default: 0.12,
        max: 0.3,
        apply: |c, v| c.turn_bleed = v as f32,
    },
    SweepParam {
        name: "momentum_decay",
        min: 0.3,
        default: 0.8,
        max: 1.5,
        apply: |c, v| c.momentum_decay = v as f32,
    },
    SweepParam {
        name: "flap_energy_cost",
        min: 0.15,
        default: 0.35,
        max: 0.7,
        apply: |c, v| c.flap_energy_cost = v as f32,
    },
];

/// Aggregated metrics for one parameter value across all sources and seeds.
struct AggResult {
    value: f64,
    mean_flow: f32,
    mean_airborne: f32,
    mean_speed: f32,
    mean_switches: f32,
    mean_smoothness: f32,
    session_count: u32,
}

/// A single session job to be run in parallel.
struct SessionJob {
    source: String,
    seed: u64,
    dropout: f32,
    flight: FlightConfig,
}

fn run_job(job: &SessionJob) -> FlightMetrics {
    let config = SessionConfig {
        seed: job.seed,
        source: job.source.clone(),
        max_ticks: SWEEP_TICKS,
        detect_interval: DETECT_INTERVAL,
        dropout: job.dropout,
        flight: job.flight,
    };

    let mut source = match sources::from_config(&config) {
        Some(source) => source,
        None => {
            eprintln!(
                "Unknown source '{}' for sweep. Valid: {}",
                job.source,
                sources::SOURCE_NAMES.join(", ")
            );
            std::process::exit(1);
        }
    };

    let log = run_session(&config, source.as_mut());
    analyzer::analyze(&log)
}

fn sweep_param(
    param: &SweepParam,
    steps: usize,
    seeds: u32,
    sources: &[&str],
    dropout: f32,
) -> Vec<AggResult> {
    // Generate linearly-spaced values
    let values: Vec<f64> = if steps == 1 {
        vec![param.default]
    } else {
        (0..steps)
            .map(|i| param.min + (param.max - param.min) * i as f64 / (steps - 1) as f64)
            .collect()
    };

    values
        .iter()
        .map(|&val| {
            // Build all jobs for this value
            let jobs: Vec<SessionJob> = sources
                .iter()
                .flat_map(|source| {
                    (0..seeds).map(move |s| {
                        let mut flight = FlightConfig::default();
                        (param.apply)(&mut flight, val);
                        SessionJob {
                            source: source.to_string(),
                            seed: s as u64,
                            dropout,
                            flight,
                        }
                    })
                })
                .collect();

            let metrics: Vec<FlightMetrics> = jobs.par_iter().map(|job| run_job(job)).collect();

            let n = metrics.len() as f32;
            AggResult {
                value: val,
                mean_flow: metrics.iter().map(|m| m.flow_score).sum::<f32>() / n,
                mean_airborne: metrics.iter().map(|m| m.airborne_fraction).sum::<f32>() / n,
                mean_speed: metrics.iter().map(|m| m.mean_speed).sum::<f32>() / n,
                mean_switches: metrics.iter().map(|m| m.mode_switches as f32).sum::<f32>() / n,
                mean_smoothness: metrics.iter().map(|m| m.turn_smoothness).sum::<f32>() / n,
                session_count: metrics.len() as u32,
            }
        })
        .collect()
}

fn print_param_table(param_name: &str, results: &[AggResult]) {
    println!("\n--- {} ---", param_name);
    println!(
        "{:>12} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "value", "flow", "airborne", "speed", "switches", "smooth"
    );
    println!("{:-<60}", "");

    let best_idx = results
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.mean_flow.partial_cmp(&b.mean_flow).unwrap())
        .map(|(i, _)| i);

    for (i, r) in results.iter().enumerate() {
        let marker = if Some(i) == best_idx { " *" } else { "" };
        println!(
            "{:>12.3} {:>8.1} {:>8.2} {:>8.1} {:>8.1} {:>8.3}{}",
            r.value,
            r.mean_flow,
            r.mean_airborne,
            r.mean_speed,
            r.mean_switches,
            r.mean_smoothness,
            marker,
        );
    }
}

/// Evaluate a FlightConfig across all sources and seeds, returning mean flow score.
fn eval_config(flight: FlightConfig, sources: &[&str], seeds: u32, dropout: f32) -> f32 {
    let jobs: Vec<SessionJob> = sources
        .iter()
        .flat_map(|source| {
            (0..seeds).map(move |s| SessionJob {
                source: source.to_string(),
                seed: s as u64,
                dropout,
                flight,
            })
        })
        .collect();

    let metrics: Vec<FlightMetrics> = jobs.par_iter().map(|j| run_job(j)).collect();
    metrics.iter().map(|m| m.flow_score).sum::<f32>() / metrics.len() as f32
}

fn write_csv(path: &std::path::Path, all_results: &[(&str, Vec<AggResult>)]) {
    let mut file = std::fs::File::create(path).expect("Failed to create CSV file");
    writeln!(
        file,
        "parameter,value,flow,airborne,mean_speed,mode_switches,turn_smoothness,session_count"
    )
    .unwrap();

    for (param_name, results) in all_results {
        for r in results {
            writeln!(
                file,
                "{},{:.4},{:.2},{:.3},{:.2},{:.2},{:.4},{}",
                param_name,
                r.value,
                r.mean_flow,
                r.mean_airborne,
                r.mean_speed,
                r.mean_switches,
                r.mean_smoothness,
                r.session_count,
            )
            .unwrap();
        }
    }
    println!("\nCSV written to {}", path.display());
}

pub fn cmd_sweep(
    param_filter: Option<&str>,
    steps: usize,
    seeds: u32,
    sources_str: &str,
    dropout: f32,
    output: Option<PathBuf>,
    validate: bool,
    optimize: bool,
) {
    let sources: Vec<&str> = sources_str.split(',').map(|s| s.trim()).collect();

    if sources.is_empty() || sources.iter().any(|s| s.is_empty()) {
        eprintln!("Sweep requires at least one motion source.");
        std::process::exit(1);
    }

    let total_per_param = sources.len() * seeds as usize * steps;

    // Filter to requested parameter(s)
    let params_to_sweep: Vec<&SweepParam> = if let Some(name) = param_filter {
        let found = SWEEP_PARAMS.iter().find(|p| p.name == name);
        match found {
            Some(p) => vec![p],
            None => {
                eprintln!(
                    "Unknown parameter '{}'. Available: {}",
                    name,
                    SWEEP_PARAMS
                        .iter()
                        .map(|p| p.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                std::process::exit(1);
            }
        }
    } else {
        SWEEP_PARAMS.iter().collect()
    };

    let total_sessions = params_to_sweep.len() * total_per_param;
    println!(
        "=== Physics Sweep ===\nSources: {} | Steps: {} | Seeds: {} | Dropout: {:.0}%\nParams: {} | Total sessions: {}",
        sources.join(", "),
        steps,
        seeds,
        dropout * 100.0,
        params_to_sweep.len(),
        total_sessions,
    );

    let start = std::time::Instant::now();

    let mut all_results: Vec<(&str, Vec<AggResult>)> = Vec::new();
    let mut best_per_param: Vec<(&str, f64, f32)> = Vec::new();

    for param in &params_to_sweep {
        let results = sweep_param(param, steps, seeds, &sources, dropout);

        // Find best value
        let best = results
            .iter()
            .max_by(|a, b| a.mean_flow.partial_cmp(&b.mean_flow).unwrap())
            .unwrap();

        best_per_param.push((param.name, best.value, best.mean_flow));
        print_param_table(param.name, &results);
        all_results.push((param.name, results));
    }

    let elapsed = start.elapsed();
    println!("\n=== Summary ({:.1}s) ===", elapsed.as_secs_f32());
    println!("{:<20} {:>12} {:>10}", "Parameter", "Best Value", "Flow");
    println!("{:-<44}", "");
    for (name, value, score) in &best_per_param {
        println!("{:<20} {:>12.3} {:>10.1}", name, value, score);
    }

    // Write CSV if requested
    if let Some(path) = &output {
        write_csv(path, &all_results);
    }

    // Validate mode: assemble best-per-param config and compare to default
    if validate {
        println!("\n=== Validation: Best-per-param config vs Default ===");
        let mut best_config = FlightConfig::default();
        for (name, value, _) in &best_per_param {
            let param = SWEEP_PARAMS.iter().find(|p| p.name == *name).unwrap();
            (param.apply)(&mut best_config, *value);
        }

        let validation_seeds = 20u32;
        let default_flow = eval_config(FlightConfig::default(), &sources, validation_seeds, dropout);
        let best_flow = eval_config(best_config, &sources, validation_seeds, dropout);

        println!("Default physics:  flow = {:.1}", default_flow);
        println!("Best-per-param:   flow = {:.1}", best_flow);
        let delta = best_flow - default_flow;
        println!(
            "Delta:            {:+.1} ({:+.1}%)",
            delta,
            delta / default_flow * 100.0
        );
    }

    // Greedy forward-selection: add one param at a time, keep only if it improves score
    if optimize {
        println!("\n=== Greedy Forward-Selection Optimization ===");
        let opt_seeds = 20u32;

        let baseline = eval_config(FlightConfig::default(), &sources, opt_seeds, dropout);
        println!("Baseline (default physics): {:.1}", baseline);

        let mut current_config = FlightConfig::default();
        let mut current_score = baseline;
        let mut applied: Vec<(&str, f64)> = Vec::new();

        // Sort params by individual improvement (descending)
        let mut candidates: Vec<(&str, f64)> = best_per_param
            .iter()
            .filter(|(name, value, _)| {
                // Skip params where best == default
                let param = SWEEP_PARAMS.iter().find(|p| p.name == *name).unwrap();
                (*value - param.default).abs() > 1e-6
            })
            .map(|(name, value, _)| (*name, *value))
            .collect();

        candidates.sort_by(|a, b| {
            let a_score = best_per_param.iter().find(|(n, _, _)| *n == a.0).unwrap().2;
            let b_score = best_per_param.iter().find(|(n, _, _)| *n == b.0).unwrap().2;
            b_score.partial_cmp(&a_score).unwrap()
        });

        for (name, value) in &candidates {
            let param = SWEEP_PARAMS.iter().find(|p| p.name == *name).unwrap();
            let mut test_config = current_config;
            (param.apply)(&mut test_config, *value);

            let score = eval_config(test_config, &sources, opt_seeds, dropout);
            let delta = score - current_score;

            if delta > 0.5 {
                println!(
                    "  + {:<20} = {:>8.3}  flow: {:.1} ({:+.1}) KEPT",
                    name, value, score, delta
                );
                current_config = test_config;
                current_score = score;
                applied.push((name, *value));
            } else {
                println!(
                    "  - {:<20} = {:>8.3}  flow: {:.1} ({:+.1}) skipped",
                    name, value, score, delta
                );
            }
        }

        println!("\n=== Optimized Config ===");
        println!(
            "Flow: {:.1} (baseline: {:.1}, {:+.1}%)",
            current_score,
            baseline,
            (current_score - baseline) / baseline * 100.0,
        );
        if applied.is_empty() {
            println!("No improvements found, default physics already scores best.");
        } else {
            println!("Applied changes:");
            for (name, value) in &applied {
                let param = SWEEP_PARAMS.iter().find(|p| p.name == *name).unwrap();
                println!("  {:<20} {:>8.3} -> {:>8.3}", name, param.default, value);
            }
        }
    }
}
