pub mod presets;
pub mod standing;
pub mod glider;
pub mod flapper;
pub mod diver;
pub mod climber;
pub mod weaver;
pub mod dropout;

pub use standing::StandingSource;
pub use glider::GliderSource;
pub use flapper::FlapperSource;
pub use diver::DiverSource;
pub use climber::ClimberSource;
pub use weaver::WeaverSource;
pub use dropout::DropoutSource;

use skylark_shared::{KeypointFrame, SessionConfig};

pub trait MotionSource: Send {
    fn name(&self) -> &str;
    /// Produce the keypoint frame for one detection cycle, or None when the
    /// detector has nothing this cycle.
    fn next_frame(&mut self, cycle: u32) -> Option<KeypointFrame>;
}

pub const SOURCE_NAMES: &[&str] = &[
    "standing", "glider", "flapper", "diver", "climber", "weaver",
];

pub fn by_name(name: &str) -> Option<Box<dyn MotionSource>> {
    match name {
        "standing" => Some(Box::new(StandingSource)),
        "glider" => Some(Box::new(GliderSource)),
        "flapper" => Some(Box::new(FlapperSource::new())),
        "diver" => Some(Box::new(DiverSource)),
        "climber" => Some(Box::new(ClimberSource::new())),
        "weaver" => Some(Box::new(WeaverSource::new())),
        _ => None,
    }
}

/// Resolve the configured source, wrapped in dropout when requested.
pub fn from_config(config: &SessionConfig) -> Option<Box<dyn MotionSource>> {
    let inner = by_name(&config.source)?;
    if config.dropout > 0.0 {
        Some(Box::new(DropoutSource::new(inner, config.dropout, config.seed)))
    } else {
        Some(inner)
    }
}
