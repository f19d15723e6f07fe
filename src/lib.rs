//! Rising Targets - click the numbered circles before they escape
//!
//! Core modules:
//! - `sim`: Seeded simulation (physics, collisions, waves, session state)
//! - `tuning`: Per-session game balance
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Presentation preferences (mute, volume, flash)
//! - `audio`: Web Audio beeps (playback is wasm only)

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

/// Default game configuration constants
pub mod consts {
    /// Circles spawned per level
    pub const PER_LEVEL: u32 = 10;
    /// Total circles in a session
    pub const TOTAL_ELEMENTS: u32 = 150;

    /// Level 1 speed (pixels per frame)
    pub const BASE_SPEED: f32 = 0.60;
    /// Speed added per level
    pub const SPEED_INC: f32 = 0.22;

    /// Coefficient of restitution for circle-circle impulses
    pub const RESTITUTION: f32 = 0.9;
    /// Extra push applied when separating overlapping circles
    pub const SEPARATION_SLOP: f32 = 0.6;
    /// Hard cap on circle speed (pixels per frame)
    pub const MAX_SPEED: f32 = 7.0;

    /// Slowest upward speed a circle settles back to (pixels per frame)
    pub const MIN_RISE_SPEED: f32 = 0.3;
    /// Upward acceleration of circles slower than `MIN_RISE_SPEED`
    pub const RISE_ACCEL: f32 = 0.02;

    /// Alpha lost per frame once a circle is clicked
    pub const FADE_RATE: f32 = 0.035;

    /// Minimum time between two recorded collisions of the same pair
    pub const COLLISION_COOLDOWN_MS: f64 = 80.0;

    /// Spawn depth below the bottom edge
    pub const SPAWN_OFFSET_MIN: f32 = 0.0;
    pub const SPAWN_OFFSET_MAX: f32 = 18.0;

    /// Circle radius range
    pub const RADIUS_MIN: f32 = 20.0;
    pub const RADIUS_MAX: f32 = 45.0;

    /// Active count at which the next level is mixed in
    pub const MIX_AT: u32 = 2;

    /// Distance substituted for coincident centers
    pub const DIST_EPSILON: f32 = 0.0001;

    /// Level-up flash duration
    pub const FLASH_DURATION_MS: f64 = 420.0;
}
