//! Session state
//!
//! Everything a running game owns lives in `GameState`: the active circles,
//! the counters, the id allocator, the collision cooldowns and the queue of
//! events waiting for the presentation layer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::circle::{Circle, RemovalCause};
use super::collision::CooldownTable;
use super::wave::{Progress, level_speed, spawn_batch};
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// First batch issued, no frame simulated yet
    Spawning,
    /// Normal frames
    Playing,
    /// A new level's batch was mixed in this frame
    MixTransition,
    /// Budget spent and every circle resolved
    Completed,
}

/// Things the presentation layer reacts to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BatchSpawned { level: u32, ids: Vec<u32> },
    CircleRemoved { id: u32, cause: RemovalCause },
    LevelAdvanced { level: u32, speed: f32 },
    Completed { killed: u32, escaped: u32 },
}

/// Per-frame snapshot for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub level: u32,
    pub total_levels: u32,
    pub speed: f32,
    pub killed_total: u32,
    pub escaped_total: u32,
    pub spawned_total: u32,
    pub total_budget: u32,
    pub active: u32,
}

impl FrameStats {
    pub fn killed_pct(&self) -> f32 {
        percent(self.killed_total, self.total_budget)
    }

    pub fn escaped_pct(&self) -> f32 {
        percent(self.escaped_total, self.total_budget)
    }
}

fn percent(part: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32 * 100.0
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Fixed for the whole session
    pub tuning: Tuning,
    /// Canvas size in pixels
    pub width: f32,
    pub height: f32,
    pub rng: Pcg32,
    /// Active circles in spawn order
    pub circles: Vec<Circle>,
    pub progress: Progress,
    pub cooldowns: CooldownTable,
    pub phase: GamePhase,
    /// Circle under the pointer
    pub hover_id: Option<u32>,
    /// Events not yet drained by the presentation layer
    pub events: Vec<GameEvent>,
    /// Frames simulated since the last reset
    pub frame: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a new session
    pub fn new(tuning: Tuning, width: f32, height: f32, seed: u64) -> Self {
        let tuning = tuning.sanitized();
        let mut state = Self {
            progress: Progress::new(&tuning),
            tuning,
            width,
            height,
            rng: Pcg32::seed_from_u64(seed),
            circles: Vec::new(),
            cooldowns: CooldownTable::new(),
            phase: GamePhase::Spawning,
            hover_id: None,
            events: Vec::new(),
            frame: 0,
            next_id: 1,
        };
        state.reset();
        state
    }

    /// Throw the session away and start over at level 1.
    ///
    /// The RNG keeps running, so consecutive sessions differ.
    pub fn reset(&mut self) {
        self.circles.clear();
        self.progress = Progress::new(&self.tuning);
        self.cooldowns.clear();
        self.phase = GamePhase::Spawning;
        self.hover_id = None;
        self.events.clear();
        self.frame = 0;
        self.next_id = 1;

        spawn_batch(self, 1);
        log::info!(
            "New session: {} circles over {} levels",
            self.progress.total_budget,
            self.progress.total_levels
        );
    }

    /// Canvas resized. Circles keep their positions and get pushed back
    /// inside by the wall bounce on the next frame.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn find(&self, id: u32) -> Option<&Circle> {
        self.circles.iter().find(|c| c.id == id)
    }

    pub fn is_hovered(&self, id: u32) -> bool {
        self.hover_id == Some(id)
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn current_speed(&self) -> f32 {
        level_speed(&self.tuning, self.progress.current_level)
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            level: self.progress.current_level,
            total_levels: self.progress.total_levels,
            speed: self.current_speed(),
            killed_total: self.progress.killed_total,
            escaped_total: self.progress.escaped_total,
            spawned_total: self.progress.spawned_total,
            total_budget: self.progress.total_budget,
            active: self.circles.len() as u32,
        }
    }

    /// Update the hover target. The most recently spawned circle wins
    /// when several overlap the pointer.
    pub fn pointer_move(&mut self, pos: Vec2) -> Option<u32> {
        self.hover_id = self
            .circles
            .iter()
            .rev()
            .find(|c| c.alpha > 0.0 && c.contains(pos))
            .map(|c| c.id);
        self.hover_id
    }

    pub fn pointer_leave(&mut self) {
        self.hover_id = None;
    }

    /// Start fading the hovered circle. Returns its id, or `None` when
    /// nothing is hovered, the circle is gone, or it is already fading.
    pub fn pointer_click(&mut self) -> Option<u32> {
        let id = self.hover_id?;
        let circle = self.circles.iter_mut().find(|c| c.id == id)?;
        if circle.fading {
            return None;
        }
        circle.start_fade();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parked(id: u32, x: f32, y: f32, r: f32) -> Circle {
        Circle::new(id, Vec2::new(x, y), r, Vec2::ZERO)
    }

    fn empty_state() -> GameState {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 1);
        state.circles.clear();
        state
    }

    #[test]
    fn test_new_session() {
        let state = GameState::new(Tuning::default(), 800.0, 400.0, 42);
        assert_eq!(state.phase, GamePhase::Spawning);
        assert_eq!(state.circles.len(), 10);
        assert_eq!(state.progress.spawned_total, 10);
        assert_eq!(state.progress.current_level, 1);
        assert!(matches!(
            state.events.as_slice(),
            [GameEvent::BatchSpawned { level: 1, .. }]
        ));
    }

    #[test]
    fn test_same_seed_same_spawn() {
        let a = GameState::new(Tuning::default(), 800.0, 400.0, 99);
        let b = GameState::new(Tuning::default(), 800.0, 400.0, 99);
        for (ca, cb) in a.circles.iter().zip(&b.circles) {
            assert_eq!(ca.pos, cb.pos);
            assert_eq!(ca.vel, cb.vel);
            assert_eq!(ca.radius(), cb.radius());
        }
    }

    #[test]
    fn test_reset_restarts_counters_and_ids() {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 5);
        super::super::wave::advance_level(&mut state);
        state.progress.killed_total = 4;
        state.hover_id = Some(3);

        state.reset();

        assert_eq!(state.progress.current_level, 1);
        assert_eq!(state.progress.killed_total, 0);
        assert_eq!(state.progress.spawned_total, 10);
        assert_eq!(state.hover_id, None);
        assert_eq!(state.circles.first().map(|c| c.id), Some(1));
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_hover_prefers_latest() {
        let mut state = empty_state();
        state.circles.push(parked(1, 100.0, 100.0, 30.0));
        state.circles.push(parked(2, 120.0, 100.0, 30.0));

        assert_eq!(state.pointer_move(Vec2::new(110.0, 100.0)), Some(2));
        assert_eq!(state.pointer_move(Vec2::new(80.0, 100.0)), Some(1));
        assert_eq!(state.pointer_move(Vec2::new(500.0, 100.0)), None);
    }

    #[test]
    fn test_hover_is_idempotent() {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 3);
        let target = state.circles[4].pos;
        let first = state.pointer_move(target);
        let second = state.pointer_move(target);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_hover_skips_invisible() {
        let mut state = empty_state();
        state.circles.push(parked(1, 100.0, 100.0, 30.0));
        let mut ghost = parked(2, 100.0, 100.0, 30.0);
        ghost.alpha = 0.0;
        state.circles.push(ghost);

        assert_eq!(state.pointer_move(Vec2::new(100.0, 100.0)), Some(1));
    }

    #[test]
    fn test_click_starts_fade_once() {
        let mut state = empty_state();
        state.circles.push(parked(1, 100.0, 100.0, 30.0));

        assert_eq!(state.pointer_click(), None);

        state.pointer_move(Vec2::new(100.0, 100.0));
        assert_eq!(state.pointer_click(), Some(1));
        assert!(state.circles[0].fading);
        // Already fading
        assert_eq!(state.pointer_click(), None);
    }

    #[test]
    fn test_click_on_removed_circle_is_noop() {
        let mut state = empty_state();
        state.circles.push(parked(1, 100.0, 100.0, 30.0));
        state.pointer_move(Vec2::new(100.0, 100.0));
        state.circles.clear();
        assert_eq!(state.pointer_click(), None);
    }

    #[test]
    fn test_pointer_leave_clears_hover() {
        let mut state = empty_state();
        state.circles.push(parked(1, 100.0, 100.0, 30.0));
        state.pointer_move(Vec2::new(100.0, 100.0));
        state.pointer_leave();
        assert_eq!(state.pointer_click(), None);
    }

    #[test]
    fn test_stats_percentages() {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 1);
        state.progress.killed_total = 15;
        state.progress.escaped_total = 3;
        let stats = state.stats();
        assert_eq!(stats.level, 1);
        assert_eq!(stats.total_levels, 15);
        assert!((stats.killed_pct() - 10.0).abs() < 1e-4);
        assert!((stats.escaped_pct() - 2.0).abs() < 1e-4);
        assert_eq!(stats.active, 10);
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::CircleRemoved {
            id: 7,
            cause: RemovalCause::Escaped,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"CircleRemoved":{"id":7,"cause":"Escaped"}}"#);
    }
}
