//! Per-frame simulation step
//!
//! One call per animation frame. Pausing is the caller's business: a paused
//! game simply stops calling `tick`.

use super::circle::RemovalCause;
use super::collision::resolve_all;
use super::state::{FrameStats, GameEvent, GamePhase, GameState};
use super::wave::{advance_level, apply_failsafe};

/// Advance the game by one frame at timestamp `now` (ms)
pub fn tick(state: &mut GameState, now: f64) -> FrameStats {
    if state.phase == GamePhase::Completed {
        return state.stats();
    }
    state.phase = GamePhase::Playing;

    for circle in &mut state.circles {
        circle.colliding = false;
    }

    resolve_all(&mut state.circles, &mut state.cooldowns, now, &state.tuning);

    // Integrate and remove, back to front so removal keeps indices valid
    let (width, height) = (state.width, state.height);
    for i in (0..state.circles.len()).rev() {
        let Some(cause) = state.circles[i].advance(width, height, &state.tuning).cause() else {
            continue;
        };
        let circle = state.circles.remove(i);
        match cause {
            RemovalCause::Killed => state.progress.killed_total += 1,
            RemovalCause::Escaped => state.progress.escaped_total += 1,
        }
        state.events.push(GameEvent::CircleRemoved {
            id: circle.id,
            cause,
        });
    }

    if state
        .progress
        .should_advance(state.circles.len(), state.tuning.mix_threshold)
    {
        advance_level(state);
        state.phase = GamePhase::MixTransition;
    }

    if apply_failsafe(state) {
        state.phase = GamePhase::MixTransition;
    }

    if state.progress.is_complete(state.circles.len()) {
        state.phase = GamePhase::Completed;
        log::info!(
            "Session complete: {} killed, {} escaped of {}",
            state.progress.killed_total,
            state.progress.escaped_total,
            state.progress.total_budget
        );
        state.events.push(GameEvent::Completed {
            killed: state.progress.killed_total,
            escaped: state.progress.escaped_total,
        });
    }

    state.frame += 1;
    state.stats()
}
