use skylark_shared::*;

use skylark_flight::sources::{self, GliderSource, MotionSource, WeaverSource};
use skylark_flight::run_session;

fn session_config(source: &str, max_ticks: u32) -> SessionConfig {
    SessionConfig {
        source: source.into(),
        max_ticks,
        ..Default::default()
    }
}

fn run_named(source: &str, max_ticks: u32) -> SessionLog {
    let config = session_config(source, max_ticks);
    let mut src = sources::by_name(source).unwrap();
    run_session(&config, &mut *src)
}

fn mean_abs_turn(log: &SessionLog) -> f32 {
    log.frames.iter().map(|f| f.bird.turn_rate.abs()).sum::<f32>() / log.frames.len() as f32
}

#[test]
fn test_sessions_are_deterministic() {
    let config = SessionConfig {
        source: "flapper".into(),
        seed: 9,
        dropout: 0.2,
        max_ticks: 1200,
        ..Default::default()
    };

    let log1 = {
        let mut src = sources::from_config(&config).unwrap();
        run_session(&config, &mut *src)
    };
    let log2 = {
        let mut src = sources::from_config(&config).unwrap();
        run_session(&config, &mut *src)
    };

    assert_eq!(log1.frames, log2.frames, "same seed must replay bit-identically");
    assert_eq!(log1.summary.final_tick, log2.summary.final_tick);
    assert_eq!(log1.summary.dropped_frames, log2.summary.dropped_frames);
    assert_eq!(log1.summary.landings, log2.summary.landings);
}

#[test]
fn test_all_sources_stay_bounded() {
    let flight = FlightConfig::default();
    for name in sources::SOURCE_NAMES {
        let log = run_named(name, 600);
        assert_eq!(log.summary.final_tick, 600, "{name} session should complete");

        for frame in &log.frames {
            assert!(
                frame.bird.speed >= 0.0 && frame.bird.speed <= flight.max_speed,
                "{name} speed {} out of bounds at tick {}",
                frame.bird.speed,
                frame.tick
            );
            assert!(
                frame.bird.height >= 0.0,
                "{name} sank underground at tick {}",
                frame.tick
            );
            assert!(
                (0.0..=1.0).contains(&frame.bird.energy),
                "{name} energy {} out of bounds at tick {}",
                frame.bird.energy,
                frame.tick
            );
        }
    }
}

#[test]
fn test_glider_outlasts_standing() {
    let glider = run_named("glider", 120);
    let standing = run_named("standing", 120);

    // By tick 90 an idle bird has already hit the ground; a glider has not.
    let at_tick = |log: &SessionLog, tick: u32| {
        log.frames
            .iter()
            .find(|f| f.tick == tick)
            .map(|f| f.bird.height)
            .unwrap()
    };

    assert_eq!(at_tick(&standing, 90), 0.0, "idle bird should be grounded by tick 90");
    assert!(
        at_tick(&glider, 90) > 0.0,
        "gliding bird should still be aloft at tick 90"
    );
}

#[test]
fn test_flapper_climbs_and_builds_speed() {
    let log = run_named("flapper", 600);
    let start = log.frames.first().unwrap().bird;
    let end = log.frames.last().unwrap().bird;

    assert!(
        end.height > start.height,
        "sustained flapping should climb: {} -> {}",
        start.height,
        end.height
    );
    assert!(log.summary.peak_speed > 0.0);
    assert_eq!(log.summary.landings, 0, "the flapper should never touch down");
}

#[test]
fn test_climber_outclimbs_flapper() {
    let climber = run_named("climber", 600);
    let flapper = run_named("flapper", 600);

    let peak = |log: &SessionLog| log.summary.peak_height;
    assert!(
        peak(&climber) > peak(&flapper),
        "leaning back should climb higher: {} vs {}",
        peak(&climber),
        peak(&flapper)
    );
}

#[test]
fn test_wider_weave_turns_harder() {
    let config = session_config("weaver", 1200);

    let gentle = {
        let mut src = WeaverSource::with_weave(40, 0.15);
        run_session(&config, &mut src)
    };
    let sharp = {
        let mut src = WeaverSource::with_weave(40, 0.35);
        run_session(&config, &mut src)
    };

    let gentle_turn = mean_abs_turn(&gentle);
    let sharp_turn = mean_abs_turn(&sharp);
    assert!(gentle_turn > 0.0, "even a gentle weave should register");
    assert!(
        sharp_turn > gentle_turn * 2.0,
        "a wider weave should turn much harder: {sharp_turn} vs {gentle_turn}"
    );
}

#[test]
fn test_dropout_session_stays_sane() {
    let config = SessionConfig {
        source: "glider".into(),
        seed: 3,
        dropout: 0.5,
        max_ticks: 1800,
        ..Default::default()
    };
    let mut src = sources::from_config(&config).unwrap();
    let log = run_session(&config, &mut *src);

    let cycles = config.max_ticks / config.detect_interval;
    let dropped = log.summary.dropped_frames;
    assert!(
        dropped > cycles * 3 / 10 && dropped < cycles * 7 / 10,
        "half the cycles should drop, got {dropped} of {cycles}"
    );
    for frame in &log.frames {
        assert!(frame.bird.height.is_finite());
        assert!(frame.bird.speed.is_finite());
    }
}

/// Delivers a clean glide for a while, then goes dark for good.
struct DarkSource {
    inner: GliderSource,
    lit_cycles: u32,
}

impl MotionSource for DarkSource {
    fn name(&self) -> &str {
        "dark"
    }

    fn next_frame(&mut self, cycle: u32) -> Option<KeypointFrame> {
        if cycle < self.lit_cycles {
            self.inner.next_frame(cycle)
        } else {
            None
        }
    }
}

#[test]
fn test_dark_detector_forces_idle_and_lands() {
    let config = session_config("dark", 1800);
    let mut src = DarkSource {
        inner: GliderSource,
        lit_cycles: 50,
    };
    let log = run_session(&config, &mut src);

    assert_eq!(log.summary.forced_idles, 1, "silence should force idle exactly once");
    let end = log.frames.last().unwrap();
    assert_eq!(end.command.vertical, VerticalCommand::Idle);
    assert!(end.command.turn.is_none());
    assert_eq!(end.bird.height, 0.0, "an idle bird ends on the ground");
}

#[test]
fn test_log_serialization_round_trips() {
    let log = run_named("weaver", 240);

    let json = serde_json::to_string(&log).expect("log should serialize");
    assert!(json.len() > 100);

    let back: SessionLog = serde_json::from_str(&json).expect("log should deserialize");
    assert_eq!(back.summary.final_tick, log.summary.final_tick);
    assert_eq!(back.frames.len(), log.frames.len());
}

#[test]
fn test_summary_peaks_cover_frames() {
    let log = run_named("flapper", 600);

    let frame_peak_height = log
        .frames
        .iter()
        .map(|f| f.bird.height)
        .fold(f32::MIN, f32::max);
    let frame_peak_speed = log
        .frames
        .iter()
        .map(|f| f.bird.speed)
        .fold(f32::MIN, f32::max);

    assert!(log.summary.peak_height >= frame_peak_height);
    assert!(log.summary.peak_speed >= frame_peak_speed);
}
