// Tick rate
pub const TICK_RATE: u32 = 60;
pub const DT: f32 = 1.0 / TICK_RATE as f32;
pub const TICK_DURATION_US: u64 = 16_666;

// Session
pub const MAX_SESSION_SECS: u32 = 120;
pub const MAX_TICKS: u32 = TICK_RATE * MAX_SESSION_SECS; // 7200

// Cadences
pub const FRAME_INTERVAL: u32 = 2; // stream every 2nd tick = 30fps
pub const DETECT_INTERVAL: u32 = 4; // one detection cycle per 4 ticks = 15Hz
pub const IDLE_TIMEOUT_SECS: f32 = 1.0; // detector silence before the command is forced idle

// Feature extraction (image coordinates are normalized [0,1], y grows downward)
pub const MIN_CONFIDENCE: f32 = 0.5;
pub const WINGSPAN_RATIO: f32 = 3.2; // full wrist-to-wrist span in shoulder widths
pub const LEAN_NEUTRAL: f32 = 0.55; // nose sits this many shoulder widths above the shoulder line
pub const ARM_LEVEL_MAX: f32 = 0.05; // |shoulder.y - elbow.y| allowed for a level arm

// Classification
pub const FLAP_WINDOW: u32 = 6; // arm speed samples kept for reversal detection
pub const FLAP_NOISE_FLOOR: f32 = 0.25; // shoulder widths per second
pub const HYSTERESIS_CYCLES: u32 = 2;
pub const GLIDE_EXTENSION_MIN: f32 = 0.55;
pub const DIVE_LEAN_MIN: f32 = 0.35;
pub const DIVE_LEAN_FULL: f32 = 0.8; // lean at which dive intensity saturates
pub const BACK_LEAN_MAX: f32 = -0.15; // leaning back past this turns a flap into a climb
pub const TURN_DEADZONE: f32 = 0.08;
pub const TURN_FULL_RANGE: f32 = 0.5; // |torso yaw| at which turn intensity saturates
pub const TURN_EXPONENT: f32 = 1.6; // power curve, >1 softens small head movements

// Intensity smoothing (per detection cycle, in (0,1])
pub const SMOOTH_FLAP: f32 = 0.35;
pub const SMOOTH_TURN: f32 = 0.4;
pub const SMOOTH_DIVE: f32 = 0.6; // dive reacts fastest

// Flight physics (per-second rates, heights in meters)
pub const GRAVITY: f32 = 10.0;
pub const DRAG: f32 = 0.4;
pub const LIFT_FACTOR: f32 = 0.15; // upward momentum per unit speed while gliding
pub const GLIDE_SINK_FLOOR: f32 = -2.0; // slowest allowed sink rate while gliding
pub const FLAP_STRENGTH: f32 = 18.0; // vertical impulse at full flap intensity
pub const FLAP_THRUST: f32 = 6.0;
pub const CLIMB_BIAS: f32 = 1.5; // height-gain multiplier on the flap impulse
pub const CLIMB_THRUST_SCALE: f32 = 0.5; // forward share left when climbing
pub const DIVE_ACCEL: f32 = 14.0;
pub const DIVE_DROP: f32 = 12.0; // extra downward pull at full dive intensity
pub const MAX_SPEED: f32 = 30.0;
pub const MAX_TURN_RATE: f32 = 1.8; // rad/s
pub const TURN_RESPONSIVENESS: f32 = 4.0;
pub const TURN_DECAY: f32 = 2.5;
pub const TURN_BLEED: f32 = 0.12; // speed loss per rad/s of turn rate
pub const MOMENTUM_DECAY: f32 = 0.8;
pub const GROUND_FRICTION: f32 = 0.6; // one-time speed multiplier on touchdown
pub const BANK_RATE: f32 = 6.0; // cosmetic banking chase rate
pub const MAX_DT: f32 = 0.1; // integration step cap in seconds
pub const START_HEIGHT: f32 = 5.0;

// Energy
pub const FLAP_ENERGY_COST: f32 = 0.35; // per unit delivered impulse per second
pub const ENERGY_RECOVERY: f32 = 0.12; // per second, always on
pub const MIN_FLAP_ENERGY: f32 = 0.05; // below this a flap produces no impulse
