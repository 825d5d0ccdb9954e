use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("{name} out of range: got {value}, expected {expected}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
    #[error("{name} = {rate} diverges at max_dt = {max_dt}: rate * max_dt must stay below 1")]
    UnstableRate {
        name: &'static str,
        rate: f32,
        max_dt: f32,
    },
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: u32,
        value: u32,
    },
}

/// Every tunable of the pipeline. Fixed for the lifetime of a session;
/// violations are fatal before any loop starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    // Feature extraction
    pub mirror_input: bool,
    pub min_confidence: f32,
    pub wingspan_ratio: f32,
    pub lean_neutral: f32,
    pub arm_level_max: f32,

    // Classification
    pub flap_window: u32,
    pub flap_noise_floor: f32,
    pub hysteresis_cycles: u32,
    pub glide_extension_min: f32,
    pub dive_lean_min: f32,
    pub dive_lean_full: f32,
    pub back_lean_max: f32,
    pub turn_deadzone: f32,
    pub turn_full_range: f32,
    pub turn_exponent: f32,
    pub smooth_flap: f32,
    pub smooth_turn: f32,
    pub smooth_dive: f32,

    // Flight physics
    pub gravity: f32,
    pub drag: f32,
    pub lift_factor: f32,
    pub glide_sink_floor: f32,
    pub flap_strength: f32,
    pub flap_thrust: f32,
    pub climb_bias: f32,
    pub climb_thrust_scale: f32,
    pub dive_accel: f32,
    pub dive_drop: f32,
    pub max_speed: f32,
    pub max_turn_rate: f32,
    pub turn_responsiveness: f32,
    pub turn_decay: f32,
    pub turn_bleed: f32,
    pub momentum_decay: f32,
    pub ground_friction: f32,
    pub bank_rate: f32,
    pub max_dt: f32,
    pub start_height: f32,

    // Energy
    pub flap_energy_cost: f32,
    pub energy_recovery: f32,
    pub min_flap_energy: f32,

    // Session
    pub idle_timeout_secs: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            mirror_input: true,
            min_confidence: MIN_CONFIDENCE,
            wingspan_ratio: WINGSPAN_RATIO,
            lean_neutral: LEAN_NEUTRAL,
            arm_level_max: ARM_LEVEL_MAX,
            flap_window: FLAP_WINDOW,
            flap_noise_floor: FLAP_NOISE_FLOOR,
            hysteresis_cycles: HYSTERESIS_CYCLES,
            glide_extension_min: GLIDE_EXTENSION_MIN,
            dive_lean_min: DIVE_LEAN_MIN,
            dive_lean_full: DIVE_LEAN_FULL,
            back_lean_max: BACK_LEAN_MAX,
            turn_deadzone: TURN_DEADZONE,
            turn_full_range: TURN_FULL_RANGE,
            turn_exponent: TURN_EXPONENT,
            smooth_flap: SMOOTH_FLAP,
            smooth_turn: SMOOTH_TURN,
            smooth_dive: SMOOTH_DIVE,
            gravity: GRAVITY,
            drag: DRAG,
            lift_factor: LIFT_FACTOR,
            glide_sink_floor: GLIDE_SINK_FLOOR,
            flap_strength: FLAP_STRENGTH,
            flap_thrust: FLAP_THRUST,
            climb_bias: CLIMB_BIAS,
            climb_thrust_scale: CLIMB_THRUST_SCALE,
            dive_accel: DIVE_ACCEL,
            dive_drop: DIVE_DROP,
            max_speed: MAX_SPEED,
            max_turn_rate: MAX_TURN_RATE,
            turn_responsiveness: TURN_RESPONSIVENESS,
            turn_decay: TURN_DECAY,
            turn_bleed: TURN_BLEED,
            momentum_decay: MOMENTUM_DECAY,
            ground_friction: GROUND_FRICTION,
            bank_rate: BANK_RATE,
            max_dt: MAX_DT,
            start_height: START_HEIGHT,
            flap_energy_cost: FLAP_ENERGY_COST,
            energy_recovery: ENERGY_RECOVERY,
            min_flap_energy: MIN_FLAP_ENERGY,
            idle_timeout_secs: IDLE_TIMEOUT_SECS,
        }
    }
}

impl FlightConfig {
    /// Load a config from a TOML file. Missing fields fall back to defaults;
    /// the result is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: FlightConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }

        let nonnegative = [
            ("flap_noise_floor", self.flap_noise_floor),
            ("turn_deadzone", self.turn_deadzone),
            ("gravity", self.gravity),
            ("drag", self.drag),
            ("lift_factor", self.lift_factor),
            ("flap_strength", self.flap_strength),
            ("flap_thrust", self.flap_thrust),
            ("dive_accel", self.dive_accel),
            ("dive_drop", self.dive_drop),
            ("turn_responsiveness", self.turn_responsiveness),
            ("turn_decay", self.turn_decay),
            ("turn_bleed", self.turn_bleed),
            ("momentum_decay", self.momentum_decay),
            ("start_height", self.start_height),
            ("flap_energy_cost", self.flap_energy_cost),
            ("energy_recovery", self.energy_recovery),
        ];
        for (name, value) in nonnegative {
            if value < 0.0 {
                return Err(self.out_of_range(name, value, ">= 0"));
            }
        }

        let positive = [
            ("wingspan_ratio", self.wingspan_ratio),
            ("arm_level_max", self.arm_level_max),
            ("max_speed", self.max_speed),
            ("max_turn_rate", self.max_turn_rate),
            ("bank_rate", self.bank_rate),
            ("max_dt", self.max_dt),
            ("idle_timeout_secs", self.idle_timeout_secs),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(self.out_of_range(name, value, "> 0"));
            }
        }

        let unit_interval = [
            ("ground_friction", self.ground_friction),
            ("climb_thrust_scale", self.climb_thrust_scale),
            ("min_flap_energy", self.min_flap_energy),
        ];
        for (name, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(self.out_of_range(name, value, "within [0,1]"));
            }
        }

        let smoothing = [
            ("smooth_flap", self.smooth_flap),
            ("smooth_turn", self.smooth_turn),
            ("smooth_dive", self.smooth_dive),
        ];
        for (name, value) in smoothing {
            if !(value > 0.0 && value <= 1.0) {
                return Err(self.out_of_range(name, value, "within (0,1]"));
            }
        }

        if !(self.min_confidence >= 0.0 && self.min_confidence < 1.0) {
            return Err(self.out_of_range("min_confidence", self.min_confidence, "within [0,1)"));
        }
        if !(self.glide_extension_min > 0.0 && self.glide_extension_min <= 1.0) {
            return Err(self.out_of_range(
                "glide_extension_min",
                self.glide_extension_min,
                "within (0,1]",
            ));
        }
        if self.glide_sink_floor > 0.0 {
            return Err(self.out_of_range("glide_sink_floor", self.glide_sink_floor, "<= 0"));
        }
        if self.climb_bias < 1.0 {
            return Err(self.out_of_range("climb_bias", self.climb_bias, ">= 1"));
        }
        if self.turn_exponent < 1.0 {
            return Err(self.out_of_range("turn_exponent", self.turn_exponent, ">= 1"));
        }
        if self.turn_full_range <= self.turn_deadzone {
            return Err(self.out_of_range(
                "turn_full_range",
                self.turn_full_range,
                "> turn_deadzone",
            ));
        }
        if self.dive_lean_full <= self.dive_lean_min {
            return Err(self.out_of_range(
                "dive_lean_full",
                self.dive_lean_full,
                "> dive_lean_min",
            ));
        }
        if self.back_lean_max >= self.dive_lean_min {
            return Err(self.out_of_range(
                "back_lean_max",
                self.back_lean_max,
                "< dive_lean_min",
            ));
        }

        if self.flap_window < 2 {
            return Err(ConfigError::TooSmall {
                name: "flap_window",
                min: 2,
                value: self.flap_window,
            });
        }
        if self.hysteresis_cycles < 1 {
            return Err(ConfigError::TooSmall {
                name: "hysteresis_cycles",
                min: 1,
                value: self.hysteresis_cycles,
            });
        }

        // Forward-Euler decay terms must not overshoot within one capped step.
        let decay_rates = [
            ("drag", self.drag),
            ("momentum_decay", self.momentum_decay),
            ("turn_decay", self.turn_decay),
            ("turn_bleed * max_turn_rate", self.turn_bleed * self.max_turn_rate),
        ];
        for (name, rate) in decay_rates {
            if rate * self.max_dt >= 1.0 {
                return Err(ConfigError::UnstableRate {
                    name,
                    rate,
                    max_dt: self.max_dt,
                });
            }
        }

        Ok(())
    }

    fn out_of_range(&self, name: &'static str, value: f32, expected: &'static str) -> ConfigError {
        ConfigError::OutOfRange {
            name,
            value,
            expected,
        }
    }

    fn named_values(&self) -> [(&'static str, f32); 39] {
        [
            ("min_confidence", self.min_confidence),
            ("wingspan_ratio", self.wingspan_ratio),
            ("lean_neutral", self.lean_neutral),
            ("arm_level_max", self.arm_level_max),
            ("flap_noise_floor", self.flap_noise_floor),
            ("glide_extension_min", self.glide_extension_min),
            ("dive_lean_min", self.dive_lean_min),
            ("dive_lean_full", self.dive_lean_full),
            ("back_lean_max", self.back_lean_max),
            ("turn_deadzone", self.turn_deadzone),
            ("turn_full_range", self.turn_full_range),
            ("turn_exponent", self.turn_exponent),
            ("smooth_flap", self.smooth_flap),
            ("smooth_turn", self.smooth_turn),
            ("smooth_dive", self.smooth_dive),
            ("gravity", self.gravity),
            ("drag", self.drag),
            ("lift_factor", self.lift_factor),
            ("glide_sink_floor", self.glide_sink_floor),
            ("flap_strength", self.flap_strength),
            ("flap_thrust", self.flap_thrust),
            ("climb_bias", self.climb_bias),
            ("climb_thrust_scale", self.climb_thrust_scale),
            ("dive_accel", self.dive_accel),
            ("dive_drop", self.dive_drop),
            ("max_speed", self.max_speed),
            ("max_turn_rate", self.max_turn_rate),
            ("turn_responsiveness", self.turn_responsiveness),
            ("turn_decay", self.turn_decay),
            ("turn_bleed", self.turn_bleed),
            ("momentum_decay", self.momentum_decay),
            ("ground_friction", self.ground_friction),
            ("bank_rate", self.bank_rate),
            ("max_dt", self.max_dt),
            ("start_height", self.start_height),
            ("flap_energy_cost", self.flap_energy_cost),
            ("energy_recovery", self.energy_recovery),
            ("min_flap_energy", self.min_flap_energy),
            ("idle_timeout_secs", self.idle_timeout_secs),
        ]
    }
}

/// Knobs for one offline session run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub seed: u64,
    pub source: String,
    pub max_ticks: u32,
    pub detect_interval: u32,
    pub dropout: f32,
    pub flight: FlightConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            source: "standing".into(),
            max_ticks: MAX_TICKS,
            detect_interval: DETECT_INTERVAL,
            dropout: 0.0,
            flight: FlightConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::OutOfRange {
                name: "dropout",
                value: self.dropout,
                expected: "within [0,1)",
            });
        }
        if self.detect_interval < 1 {
            return Err(ConfigError::TooSmall {
                name: "detect_interval",
                min: 1,
                value: self.detect_interval,
            });
        }
        if self.max_ticks < 1 {
            return Err(ConfigError::TooSmall {
                name: "max_ticks",
                min: 1,
                value: self.max_ticks,
            });
        }
        self.flight.validate()
    }
}
