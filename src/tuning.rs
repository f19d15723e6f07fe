//! Data-driven game balance
//!
//! A `Tuning` is fixed for the lifetime of a session. Every field falls back
//! to its `consts` default when missing from a JSON config.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Circles spawned per level
    pub batch_size: u32,
    /// Total circles in the session
    pub total_budget: u32,
    /// Level 1 speed
    pub base_speed: f32,
    /// Linear speed increment per level
    pub speed_inc: f32,
    /// Restitution for circle-circle impulses (1.0 = perfectly elastic)
    pub restitution: f32,
    /// Speed cap applied after every velocity change
    pub max_speed: f32,
    /// Upward speed stalled or sinking circles recover to
    pub min_rise_speed: f32,
    /// Per-frame recovery toward `min_rise_speed`
    pub rise_accel: f32,
    /// Alpha decrement per frame while fading
    pub fade_rate: f32,
    /// Cooldown window between recorded collisions of a pair (ms)
    pub cooldown_ms: f64,
    /// Extra separation distance added during positional correction
    pub separation_slop: f32,
    /// Active count at or below which the next level is mixed in
    pub mix_threshold: u32,
    pub spawn_offset_min: f32,
    pub spawn_offset_max: f32,
    pub radius_min: f32,
    pub radius_max: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            batch_size: PER_LEVEL,
            total_budget: TOTAL_ELEMENTS,
            base_speed: BASE_SPEED,
            speed_inc: SPEED_INC,
            restitution: RESTITUTION,
            max_speed: MAX_SPEED,
            min_rise_speed: MIN_RISE_SPEED,
            rise_accel: RISE_ACCEL,
            fade_rate: FADE_RATE,
            cooldown_ms: COLLISION_COOLDOWN_MS,
            separation_slop: SEPARATION_SLOP,
            mix_threshold: MIX_AT,
            spawn_offset_min: SPAWN_OFFSET_MIN,
            spawn_offset_max: SPAWN_OFFSET_MAX,
            radius_min: RADIUS_MIN,
            radius_max: RADIUS_MAX,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON object
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of levels derivable from budget and batch size
    pub fn total_levels(&self) -> u32 {
        self.total_budget.div_ceil(self.batch_size.max(1)).max(1)
    }

    /// Repair values the simulation cannot work with.
    ///
    /// Nothing here is fatal: each repair is logged and replaced with a
    /// usable value.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.batch_size == 0 {
            log::warn!("batch_size must be positive, using {}", defaults.batch_size);
            self.batch_size = defaults.batch_size;
        }
        if !(self.max_speed > 0.0) {
            log::warn!("max_speed must be positive, using {}", defaults.max_speed);
            self.max_speed = defaults.max_speed;
        }
        if !(self.fade_rate > 0.0) {
            log::warn!("fade_rate must be positive, using {}", defaults.fade_rate);
            self.fade_rate = defaults.fade_rate;
        }
        if !(self.base_speed >= 0.0) {
            log::warn!("base_speed must not be negative, using {}", defaults.base_speed);
            self.base_speed = defaults.base_speed;
        }
        if !(self.speed_inc > 0.0) {
            // Level speed has to be strictly increasing
            log::warn!("speed_inc must be positive, using {}", defaults.speed_inc);
            self.speed_inc = defaults.speed_inc;
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            log::warn!("restitution {} clamped to [0, 1]", self.restitution);
            self.restitution = self.restitution.clamp(0.0, 1.0);
            if self.restitution.is_nan() {
                self.restitution = defaults.restitution;
            }
        }
        if !(self.min_rise_speed > 0.0) {
            log::warn!("min_rise_speed must be positive, using {}", defaults.min_rise_speed);
            self.min_rise_speed = defaults.min_rise_speed;
        }
        if self.min_rise_speed > self.max_speed {
            log::warn!("min_rise_speed {} capped at max_speed", self.min_rise_speed);
            self.min_rise_speed = self.max_speed;
        }
        if !(self.rise_accel > 0.0) {
            log::warn!("rise_accel must be positive, using {}", defaults.rise_accel);
            self.rise_accel = defaults.rise_accel;
        }
        if !(self.cooldown_ms >= 0.0) {
            self.cooldown_ms = defaults.cooldown_ms;
        }
        if !(self.separation_slop >= 0.0) {
            self.separation_slop = defaults.separation_slop;
        }
        if !(self.radius_min > 0.0) || !(self.radius_max >= self.radius_min) {
            log::warn!(
                "invalid radius range {}..{}, using {}..{}",
                self.radius_min,
                self.radius_max,
                defaults.radius_min,
                defaults.radius_max
            );
            self.radius_min = defaults.radius_min;
            self.radius_max = defaults.radius_max;
        }
        if !(self.spawn_offset_max >= self.spawn_offset_min) {
            std::mem::swap(&mut self.spawn_offset_min, &mut self.spawn_offset_max);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels() {
        let tuning = Tuning::default();
        assert_eq!(tuning.total_levels(), 15);

        let tuning = Tuning {
            total_budget: 145,
            ..Default::default()
        };
        assert_eq!(tuning.total_levels(), 15);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let tuning = Tuning::from_json(r#"{ "batch_size": 4, "total_budget": 9 }"#).unwrap();
        assert_eq!(tuning.batch_size, 4);
        assert_eq!(tuning.total_budget, 9);
        assert_eq!(tuning.total_levels(), 3);
        assert_eq!(tuning.fade_rate, FADE_RATE);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ batch_size: }").is_err());
    }

    #[test]
    fn test_sanitize_repairs() {
        let tuning = Tuning {
            batch_size: 0,
            speed_inc: -1.0,
            restitution: 3.0,
            radius_min: 50.0,
            radius_max: 10.0,
            spawn_offset_min: 10.0,
            spawn_offset_max: 0.0,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(tuning.batch_size, PER_LEVEL);
        assert_eq!(tuning.speed_inc, SPEED_INC);
        assert_eq!(tuning.restitution, 1.0);
        assert_eq!(tuning.radius_min, RADIUS_MIN);
        assert_eq!(tuning.radius_max, RADIUS_MAX);
        assert_eq!(tuning.spawn_offset_min, 0.0);
        assert_eq!(tuning.spawn_offset_max, 10.0);
    }

    #[test]
    fn test_sanitize_caps_min_rise() {
        let tuning = Tuning {
            max_speed: 0.2,
            rise_accel: 0.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(tuning.min_rise_speed, 0.2);
        assert_eq!(tuning.rise_accel, RISE_ACCEL);
    }

    #[test]
    fn test_sanitize_keeps_valid() {
        assert_eq!(Tuning::default().sanitized(), Tuning::default());
    }
}
