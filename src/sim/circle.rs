//! The circle target entity
//!
//! A circle only ever mutates its own state. Interactions between circles
//! are handled by the collision resolver.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Lateral launch factor range (scaled by level speed)
const LAUNCH_DX: f32 = 1.15;
/// Vertical launch factor range (scaled by level speed, always upward)
const LAUNCH_DY_MIN: f32 = 0.70;
const LAUNCH_DY_MAX: f32 = 1.05;

/// Why a circle left the active set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Clicked and fully faded out
    Killed,
    /// Left through the top of the canvas
    Escaped,
}

/// Outcome of advancing a circle by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    None,
    Removed(RemovalCause),
}

impl Removal {
    pub fn cause(self) -> Option<RemovalCause> {
        match self {
            Removal::None => None,
            Removal::Removed(cause) => Some(cause),
        }
    }
}

/// A numbered, bouncing, fadeable target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    radius: f32,
    mass: f32,
    /// Opacity, 1 when spawned, 0 when killed
    pub alpha: f32,
    /// Set on click, triggers alpha decay
    pub fading: bool,
    /// Set when a collision was recorded this frame
    pub colliding: bool,
}

impl Circle {
    pub fn new(id: u32, pos: Vec2, radius: f32, vel: Vec2) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            mass: radius * radius,
            alpha: 1.0,
            fading: false,
            colliding: false,
        }
    }

    /// Create a circle with a random upward launch velocity scaled by `speed`
    pub fn spawn<R: Rng + ?Sized>(
        id: u32,
        pos: Vec2,
        radius: f32,
        speed: f32,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let vel = Vec2::new(
            rng.random_range(-LAUNCH_DX..=LAUNCH_DX) * speed,
            -rng.random_range(LAUNCH_DY_MIN..=LAUNCH_DY_MAX) * speed,
        );
        let mut circle = Self::new(id, pos, radius, vel);
        circle.clamp_speed(tuning.max_speed);
        circle
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Mass is radius squared and never changes after construction
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Point-in-circle test (no square root)
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius * self.radius
    }

    /// Start fading out. Idempotent.
    pub fn start_fade(&mut self) {
        self.fading = true;
    }

    /// Rescale velocity so its magnitude does not exceed `max_speed`
    pub fn clamp_speed(&mut self, max_speed: f32) {
        let speed = self.vel.length();
        if speed > max_speed {
            self.vel *= max_speed / speed;
        }
    }

    /// Integrate one frame, bounce off the side walls, then report removal.
    ///
    /// Circles are buoyant: anything rising slower than `min_rise_speed`
    /// (stalled or knocked downward by a collision) accelerates back up by
    /// `rise_accel` per frame. A circle that sank fully below the canvas is
    /// put back on the bottom edge moving up at no less than
    /// `min_rise_speed`, so every circle eventually leaves through the top.
    /// A fading circle is checked first, so `Killed` wins over `Escaped`.
    pub fn advance(&mut self, width: f32, height: f32, tuning: &Tuning) -> Removal {
        let min_rise = tuning.min_rise_speed;
        if self.vel.y > -min_rise {
            self.vel.y = (self.vel.y - tuning.rise_accel).max(-min_rise);
            self.clamp_speed(tuning.max_speed);
        }

        self.pos += self.vel;

        if self.pos.x + self.radius > width {
            self.pos.x = width - self.radius;
            self.vel.x = -self.vel.x;
        }
        if self.pos.x - self.radius < 0.0 {
            self.pos.x = self.radius;
            self.vel.x = -self.vel.x;
        }
        if self.pos.y - self.radius > height && self.vel.y > -min_rise {
            self.pos.y = height + self.radius;
            self.vel.y = -self.vel.y.abs().max(min_rise);
            self.clamp_speed(tuning.max_speed);
        }

        if self.fading {
            self.alpha -= tuning.fade_rate;
            if self.alpha <= 0.0 {
                self.alpha = 0.0;
                return Removal::Removed(RemovalCause::Killed);
            }
        }

        if self.pos.y + self.radius < 0.0 {
            return Removal::Removed(RemovalCause::Escaped);
        }

        Removal::None
    }
}
