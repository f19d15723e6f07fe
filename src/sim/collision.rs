//! Circle-circle collision detection and response
//!
//! A single all-pairs pass per frame. Overlapping pairs are always separated
//! and given an impulse; the per-pair cooldown only gates the `colliding`
//! flag and the recorded collision event.

use std::collections::HashMap;

use glam::Vec2;

use super::circle::Circle;
use crate::consts::DIST_EPSILON;
use crate::tuning::Tuning;

/// Unordered pair of circle ids, stored as (smaller, larger)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(u32, u32);

impl PairKey {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// Timestamp (ms) of the last recorded collision per pair
#[derive(Debug, Clone, Default)]
pub struct CooldownTable {
    last_hit: HashMap<PairKey, f64>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `now` if the pair's cooldown has elapsed.
    /// A pair never seen before always fires.
    pub fn try_record(&mut self, key: PairKey, now: f64, window: f64) -> bool {
        match self.last_hit.get(&key) {
            Some(&last) if now - last < window => false,
            _ => {
                self.last_hit.insert(key, now);
                true
            }
        }
    }

    pub fn last(&self, key: PairKey) -> Option<f64> {
        self.last_hit.get(&key).copied()
    }

    pub fn clear(&mut self) {
        self.last_hit.clear();
    }

    pub fn len(&self) -> usize {
        self.last_hit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_hit.is_empty()
    }
}

/// Run the collision pass over every pair `i < j` in slice order.
///
/// Returns how many collisions passed the cooldown gate this frame.
pub fn resolve_all(
    circles: &mut [Circle],
    cooldowns: &mut CooldownTable,
    now: f64,
    tuning: &Tuning,
) -> usize {
    let mut recorded = 0;

    for i in 0..circles.len() {
        for j in (i + 1)..circles.len() {
            let (head, tail) = circles.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            let dist = a.pos.distance(b.pos);
            if dist > a.radius() + b.radius() {
                continue;
            }

            if cooldowns.try_record(PairKey::new(a.id, b.id), now, tuning.cooldown_ms) {
                a.colliding = true;
                b.colliding = true;
                recorded += 1;
            }

            resolve_pair(a, b, tuning);
        }
    }

    recorded
}

/// Separate two touching circles and exchange momentum along the normal.
pub fn resolve_pair(a: &mut Circle, b: &mut Circle, tuning: &Tuning) {
    let delta = b.pos - a.pos;
    let mut dist = delta.length();
    if dist == 0.0 {
        dist = DIST_EPSILON;
    }

    let min_dist = a.radius() + b.radius();
    let normal = delta / dist;

    // Positional correction, heavier circle moves less
    if dist < min_dist {
        let overlap = (min_dist - dist) + tuning.separation_slop;
        let total_mass = a.mass() + b.mass();

        a.pos -= normal * (overlap * (b.mass() / total_mass));
        b.pos += normal * (overlap * (a.mass() / total_mass));
    }

    let vel_along_normal = (b.vel - a.vel).dot(normal);
    if vel_along_normal > 0.0 {
        return;
    }

    let inv_a = 1.0 / a.mass();
    let inv_b = 1.0 / b.mass();
    let j = -(1.0 + tuning.restitution) * vel_along_normal / (inv_a + inv_b);
    let impulse: Vec2 = normal * j;

    a.vel -= impulse * inv_a;
    b.vel += impulse * inv_b;

    a.clamp_speed(tuning.max_speed);
    b.clamp_speed(tuning.max_speed);
}
