pub mod analyzer;
pub mod classifier;
pub mod features;
pub mod physics;
pub mod session;
pub mod smoothing;
pub mod sources;

pub use classifier::*;
pub use features::*;
pub use physics::*;
pub use session::*;
pub use smoothing::*;
pub use sources::MotionSource;
