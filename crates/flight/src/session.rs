use skylark_shared::*;

use crate::classifier::CommandClassifier;
use crate::features::FeatureExtractor;
use crate::physics::FlightIntegrator;
use crate::sources::MotionSource;

/// One player's pipeline: keypoints in, bird state out. The detection side
/// (ingest) and the physics side (tick) advance independently, so a slow or
/// silent detector never stalls the simulation.
pub struct GameSession {
    extractor: FeatureExtractor,
    classifier: CommandClassifier,
    integrator: FlightIntegrator,
    bird: BirdState,
    command: FlightCommand,
    tick: u32,
    idle_timeout: f32,
    silent_for: f32,
    silenced: bool,
    landings: u32,
    dropped_frames: u32,
    forced_idles: u32,
    peak_height: f32,
    peak_speed: f32,
}

impl GameSession {
    pub fn new(config: FlightConfig) -> Self {
        let bird = BirdState::spawn(&config);
        Self {
            extractor: FeatureExtractor::new(config),
            classifier: CommandClassifier::new(config),
            integrator: FlightIntegrator::new(config),
            bird,
            command: FlightCommand::idle(),
            tick: 0,
            idle_timeout: config.idle_timeout_secs,
            silent_for: 0.0,
            silenced: false,
            landings: 0,
            dropped_frames: 0,
            forced_idles: 0,
            peak_height: bird.height,
            peak_speed: 0.0,
        }
    }

    /// Feed one detection cycle. `frame` is None when the detector produced
    /// nothing this cycle; `cycle_dt` is the real time covered since the
    /// previous delivered frame, so velocities stay honest across gaps.
    pub fn ingest(&mut self, frame: Option<&KeypointFrame>, cycle_dt: f32) -> FlightCommand {
        match frame {
            Some(_) => {
                self.silent_for = 0.0;
                self.silenced = false;
            }
            None => {
                self.dropped_frames += 1;
                self.silent_for += cycle_dt.max(0.0);
                if !self.silenced && self.silent_for >= self.idle_timeout {
                    self.classifier.force_idle();
                    self.command = FlightCommand::idle();
                    self.silenced = true;
                    self.forced_idles += 1;
                    tracing::info!(
                        silent_for = self.silent_for,
                        "pose stream went quiet, forcing idle"
                    );
                }
                // A silenced session holds idle until real frames return;
                // carried features must not re-earn a mode on their own.
                if self.silenced {
                    return self.command;
                }
            }
        }

        let features = self.extractor.extract(frame, cycle_dt);
        self.command = self.classifier.classify(&features);
        self.command
    }

    /// Advance physics one step using the latest held command.
    pub fn tick(&mut self, dt: f32) {
        let airborne_before = !self.bird.grounded();
        self.integrator.tick(&mut self.bird, &self.command, dt);
        if airborne_before && self.bird.grounded() {
            self.landings += 1;
        }
        self.peak_height = self.peak_height.max(self.bird.height);
        self.peak_speed = self.peak_speed.max(self.bird.speed);
        self.tick += 1;
    }

    pub fn bird(&self) -> &BirdState {
        &self.bird
    }

    pub fn command(&self) -> &FlightCommand {
        &self.command
    }

    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn snapshot(&self) -> LogFrame {
        LogFrame {
            tick: self.tick,
            bird: self.bird,
            command: self.command,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            final_tick: self.tick,
            landings: self.landings,
            dropped_frames: self.dropped_frames,
            forced_idles: self.forced_idles,
            peak_height: self.peak_height,
            peak_speed: self.peak_speed,
        }
    }
}

/// Run a deterministic offline session against a motion source.
pub fn run_session(config: &SessionConfig, source: &mut dyn MotionSource) -> SessionLog {
    let mut session = GameSession::new(config.flight);
    let mut frames = Vec::new();
    let detect_dt = DT * config.detect_interval as f32;
    let mut missed = 0u32;
    let mut cycle = 0u32;

    // Capture initial frame
    frames.push(session.snapshot());

    for tick in 0..config.max_ticks {
        // Poll the detector at its own fixed cadence
        if tick % config.detect_interval == 0 {
            match source.next_frame(cycle) {
                Some(frame) => {
                    // The step spans back to the last delivered frame
                    let span = detect_dt * (missed + 1) as f32;
                    session.ingest(Some(&frame), span);
                    missed = 0;
                }
                None => {
                    session.ingest(None, detect_dt);
                    missed += 1;
                }
            }
            cycle += 1;
        }

        session.tick(DT);

        // Record frame every FRAME_INTERVAL ticks
        if session.current_tick() % FRAME_INTERVAL == 0 {
            frames.push(session.snapshot());
        }
    }

    SessionLog {
        config: config.clone(),
        frames,
        summary: session.summary(),
    }
}
