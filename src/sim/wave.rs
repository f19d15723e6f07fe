//! Waves and levels
//!
//! Each level injects one batch of circles. The next batch is mixed in
//! while a few circles of the current one are still on screen, so the
//! canvas never goes empty between levels.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::circle::Circle;
use super::state::{GameEvent, GameState};
use crate::tuning::Tuning;

/// Level speed: base speed plus a linear per-level increment
pub fn level_speed(tuning: &Tuning, level: u32) -> f32 {
    tuning.base_speed + level.saturating_sub(1) as f32 * tuning.speed_inc
}

/// Session counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub spawned_total: u32,
    pub killed_total: u32,
    pub escaped_total: u32,
    pub current_level: u32,
    /// Highest level whose batch has been injected
    pub injected_level: u32,
    pub total_budget: u32,
    pub batch_size: u32,
    pub total_levels: u32,
}

impl Progress {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            spawned_total: 0,
            killed_total: 0,
            escaped_total: 0,
            current_level: 1,
            injected_level: 1,
            total_budget: tuning.total_budget,
            batch_size: tuning.batch_size.max(1),
            total_levels: tuning.total_levels(),
        }
    }

    pub fn remaining_budget(&self) -> u32 {
        self.total_budget.saturating_sub(self.spawned_total)
    }

    pub fn budget_exhausted(&self) -> bool {
        self.spawned_total >= self.total_budget
    }

    /// Size of the next batch, remainder aware
    pub fn next_batch_size(&self) -> u32 {
        self.batch_size.min(self.remaining_budget())
    }

    /// Mix the next level in once the active set is down to the threshold
    pub fn should_advance(&self, active: usize, mix_threshold: u32) -> bool {
        !self.budget_exhausted()
            && self.injected_level == self.current_level
            && active <= mix_threshold as usize
    }

    /// The active set emptied out before the mix check could refill it
    pub fn failsafe_needed(&self, active: usize) -> bool {
        active == 0 && !self.budget_exhausted()
    }

    pub fn is_complete(&self, active: usize) -> bool {
        active == 0 && self.budget_exhausted()
    }

    /// Next level, clamped to the last one
    pub fn next_level(&self) -> u32 {
        (self.current_level + 1).min(self.total_levels)
    }
}

/// Spawn the next batch at the bottom of the canvas.
///
/// Returns the number of circles spawned; 0 once the budget is spent.
pub fn spawn_batch(state: &mut GameState, level: u32) -> u32 {
    let count = state.progress.next_batch_size();
    if count == 0 {
        return 0;
    }

    let speed = level_speed(&state.tuning, level);
    let mut ids = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let radius = state
            .rng
            .random_range(state.tuning.radius_min..=state.tuning.radius_max);
        let x = if state.width > 2.0 * radius {
            state.rng.random_range(radius..=state.width - radius)
        } else {
            state.width / 2.0
        };
        let y = state.height
            + state
                .rng
                .random_range(state.tuning.spawn_offset_min..=state.tuning.spawn_offset_max);

        let id = state.next_entity_id();
        let circle = Circle::spawn(
            id,
            Vec2::new(x, y),
            radius,
            speed,
            &state.tuning,
            &mut state.rng,
        );
        state.circles.push(circle);
        ids.push(id);
    }

    state.progress.spawned_total += count;
    state.progress.injected_level = state.progress.injected_level.max(level);
    // Fresh ids: collision history from the previous batch is irrelevant
    state.cooldowns.clear();

    log::debug!(
        "Level {} batch: {} circles at speed {:.2} ({} / {} spawned)",
        level,
        count,
        speed,
        state.progress.spawned_total,
        state.progress.total_budget
    );

    state.events.push(GameEvent::BatchSpawned { level, ids });
    count
}

/// Move to the next level (clamped) and inject its batch.
///
/// Returns the new current level. Already on the last level with the
/// budget spent, nothing changes and no event is queued.
pub fn advance_level(state: &mut GameState) -> u32 {
    let level = state.progress.next_level();
    if level == state.progress.current_level && state.progress.budget_exhausted() {
        return level;
    }
    state.progress.current_level = level;
    state.progress.injected_level = level;

    spawn_batch(state, level);

    let speed = level_speed(&state.tuning, level);
    log::info!(
        "Level {} / {} started (speed {:.2})",
        level,
        state.progress.total_levels,
        speed
    );
    state.events.push(GameEvent::LevelAdvanced { level, speed });
    level
}

/// Force a level advance when nothing is left on screen but budget remains.
pub fn apply_failsafe(state: &mut GameState) -> bool {
    if !state.progress.failsafe_needed(state.circles.len()) {
        return false;
    }
    log::warn!(
        "Active set empty at level {} with {} circles left, forcing next level",
        state.progress.current_level,
        state.progress.remaining_budget()
    );
    advance_level(state);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BASE_SPEED;
    use proptest::prelude::*;

    fn state_with(total_budget: u32, batch_size: u32) -> GameState {
        let tuning = Tuning {
            total_budget,
            batch_size,
            ..Default::default()
        };
        GameState::new(tuning, 800.0, 400.0, 7)
    }

    #[test]
    fn test_level_speed_base() {
        let tuning = Tuning::default();
        assert_eq!(level_speed(&tuning, 1), BASE_SPEED);
        assert!((level_speed(&tuning, 2) - 0.82).abs() < 1e-6);
        assert!((level_speed(&tuning, 15) - (0.60 + 14.0 * 0.22)).abs() < 1e-5);
    }

    #[test]
    fn test_even_budget_spawns_15_batches() {
        let mut state = state_with(150, 10);
        // reset() already spawned the level 1 batch
        let mut sizes = vec![state.progress.spawned_total];
        loop {
            let n = spawn_batch(&mut state, 1);
            if n == 0 {
                break;
            }
            sizes.push(n);
        }
        assert_eq!(sizes.len(), 15);
        assert!(sizes.iter().all(|&n| n == 10));
        assert_eq!(state.progress.spawned_total, 150);
        assert_eq!(state.circles.len(), 150);
    }

    #[test]
    fn test_uneven_budget_last_batch_is_remainder() {
        let mut state = state_with(145, 10);
        let mut sizes = vec![state.progress.spawned_total];
        loop {
            let n = spawn_batch(&mut state, 1);
            if n == 0 {
                break;
            }
            sizes.push(n);
        }
        assert_eq!(sizes.len(), 15);
        assert_eq!(*sizes.last().unwrap(), 5);
        assert_eq!(state.progress.spawned_total, 145);
        assert_eq!(state.progress.total_levels, 15);
    }

    #[test]
    fn test_spawn_when_exhausted_is_noop() {
        let mut state = state_with(10, 10);
        assert!(state.progress.budget_exhausted());
        let events_before = state.events.len();
        assert_eq!(spawn_batch(&mut state, 2), 0);
        assert_eq!(state.circles.len(), 10);
        assert_eq!(state.events.len(), events_before);
    }

    #[test]
    fn test_spawn_positions_and_ids() {
        let state = state_with(150, 10);
        let ids: Vec<u32> = state.circles.iter().map(|c| c.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());

        for c in &state.circles {
            assert!(c.pos.x >= c.radius() && c.pos.x <= 800.0 - c.radius());
            assert!(c.pos.y >= 400.0 && c.pos.y <= 418.0);
            assert!(c.radius() >= 20.0 && c.radius() <= 45.0);
            assert!(c.vel.y < 0.0);
        }
    }

    #[test]
    fn test_spawn_clears_cooldowns() {
        let mut state = state_with(150, 10);
        state
            .cooldowns
            .try_record(crate::sim::PairKey::new(1, 2), 0.0, 80.0);
        assert_eq!(state.cooldowns.len(), 1);
        spawn_batch(&mut state, 1);
        assert!(state.cooldowns.is_empty());
    }

    #[test]
    fn test_should_advance() {
        let tuning = Tuning::default();
        let mut progress = Progress::new(&tuning);
        progress.spawned_total = 10;

        assert!(!progress.should_advance(3, 2));
        assert!(progress.should_advance(2, 2));
        assert!(progress.should_advance(0, 2));

        progress.injected_level = 2;
        assert!(!progress.should_advance(0, 2));

        progress.injected_level = 1;
        progress.spawned_total = 150;
        assert!(!progress.should_advance(0, 2));
    }

    #[test]
    fn test_advance_level_clamps_at_last_level() {
        let mut state = state_with(30, 10);
        assert_eq!(advance_level(&mut state), 2);
        assert_eq!(advance_level(&mut state), 3);
        state.drain_events();
        // Budget is spent; advancing further is clamped and silent
        assert_eq!(advance_level(&mut state), 3);
        assert_eq!(state.progress.spawned_total, 30);
        assert_eq!(state.progress.current_level, 3);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_advance_level_emits_event() {
        let mut state = state_with(150, 10);
        state.drain_events();
        advance_level(&mut state);
        let events = state.drain_events();

        assert!(matches!(
            events.as_slice(),
            [GameEvent::BatchSpawned { level: 2, ids }, GameEvent::LevelAdvanced { level: 2, .. }]
                if ids.len() == 10 && ids[0] == 11
        ));
    }

    #[test]
    fn test_failsafe_on_empty_set() {
        let mut state = state_with(150, 10);
        state.circles.clear();
        state.progress.escaped_total = 10;

        assert!(apply_failsafe(&mut state));
        assert_eq!(state.progress.current_level, 2);
        assert_eq!(state.progress.spawned_total, 20);
        assert_eq!(state.circles.len(), 10);

        // Not empty anymore: no-op
        assert!(!apply_failsafe(&mut state));
        assert_eq!(state.progress.current_level, 2);
    }

    #[test]
    fn test_failsafe_not_when_budget_spent() {
        let mut state = state_with(10, 10);
        state.circles.clear();
        assert!(!apply_failsafe(&mut state));
        assert!(state.progress.is_complete(0));
    }

    proptest! {
        #[test]
        fn prop_level_speed_strictly_increasing(level in 1u32..500) {
            let tuning = Tuning::default();
            prop_assert!(level_speed(&tuning, level + 1) > level_speed(&tuning, level));
        }

        #[test]
        fn prop_batches_sum_to_budget(budget in 1u32..400, batch in 1u32..40) {
            let mut state = state_with(budget, batch);
            let mut batches = 1;
            while spawn_batch(&mut state, 1) > 0 {
                batches += 1;
            }
            prop_assert_eq!(state.progress.spawned_total, budget);
            prop_assert_eq!(batches, budget.div_ceil(batch));
            prop_assert_eq!(state.progress.total_levels, budget.div_ceil(batch));
        }
    }
}
