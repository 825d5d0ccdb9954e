use skylark_shared::*;

/// Aggregate metrics quantifying how lively a recorded session was.
#[derive(Debug, Clone)]
pub struct FlightMetrics {
    /// Fraction of recorded frames spent off the ground.
    pub airborne_fraction: f32,
    /// Max height minus min height reached.
    pub altitude_range: f32,
    /// Mean speed across the session.
    pub mean_speed: f32,
    /// Fastest recorded speed.
    pub peak_speed: f32,
    /// Touchdowns counted by the session.
    pub landings: u32,
    /// Vertical command changes between recorded frames.
    pub mode_switches: u32,
    /// Mean absolute turn-rate step between frames; lower is smoother.
    pub turn_smoothness: f32,
    /// Largest single-frame height step, a teleport detector.
    pub max_height_step: f32,
    /// Weighted composite score 0-100.
    pub flow_score: f32,
}

/// Analyze a session log and compute flight metrics.
pub fn analyze(log: &SessionLog) -> FlightMetrics {
    let frames = &log.frames;
    if frames.is_empty() {
        return FlightMetrics {
            airborne_fraction: 0.0,
            altitude_range: 0.0,
            mean_speed: 0.0,
            peak_speed: 0.0,
            landings: 0,
            mode_switches: 0,
            turn_smoothness: 0.0,
            max_height_step: 0.0,
            flow_score: 0.0,
        };
    }

    // --- Airborne time and flight envelope ---
    let mut airborne = 0u32;
    let mut min_height = f32::MAX;
    let mut max_height = f32::MIN;
    let mut speed_sum = 0.0f32;
    let mut peak_speed = 0.0f32;

    for frame in frames {
        if frame.bird.height > 0.0 {
            airborne += 1;
        }
        min_height = min_height.min(frame.bird.height);
        max_height = max_height.max(frame.bird.height);
        speed_sum += frame.bird.speed;
        peak_speed = peak_speed.max(frame.bird.speed);
    }

    let airborne_fraction = airborne as f32 / frames.len() as f32;
    let altitude_range = max_height - min_height;
    let mean_speed = speed_sum / frames.len() as f32;

    // --- Mode switching ---
    // Intensity wiggle within one mode does not count as a switch.
    let mut mode_switches = 0u32;
    for pair in frames.windows(2) {
        let prev = std::mem::discriminant(&pair[0].command.vertical);
        let curr = std::mem::discriminant(&pair[1].command.vertical);
        if prev != curr {
            mode_switches += 1;
        }
    }

    // --- Turn smoothness and height continuity ---
    let mut turn_step_sum = 0.0f32;
    let mut max_height_step = 0.0f32;
    for pair in frames.windows(2) {
        turn_step_sum += (pair[1].bird.turn_rate - pair[0].bird.turn_rate).abs();
        max_height_step = max_height_step.max((pair[1].bird.height - pair[0].bird.height).abs());
    }
    let turn_smoothness = if frames.len() > 1 {
        turn_step_sum / (frames.len() - 1) as f32
    } else {
        0.0
    };

    // --- Flow score (weighted composite 0-100) ---
    // Staying airborne is the core skill
    let air_score = airborne_fraction * 35.0;
    // Using the vertical envelope = better (capped at 30 units)
    let alt_score = (altitude_range / 30.0).min(1.0) * 20.0;
    // Carrying speed = better (capped at 15 m/s mean)
    let speed_score = (mean_speed / 15.0).min(1.0) * 15.0;
    // Working the whole command set = better (capped at 20 switches)
    let switch_score = (mode_switches as f32 / 20.0).min(1.0) * 20.0;
    // Gentler turn steps = better (inverted, capped at 0.5 rad/s per frame)
    let smooth_score = (1.0 - (turn_smoothness / 0.5).min(1.0)) * 10.0;

    let flow_score = air_score + alt_score + speed_score + switch_score + smooth_score;

    FlightMetrics {
        airborne_fraction,
        altitude_range,
        mean_speed,
        peak_speed,
        landings: log.summary.landings,
        mode_switches,
        turn_smoothness,
        max_height_step,
        flow_score,
    }
}
