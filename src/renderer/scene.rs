//! Turn a game snapshot into pixel-space triangles

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::FLASH_DURATION_MS;
use crate::sim::{Circle, GameState};

/// Outline thickness of a target, in pixels
const RING_WIDTH: f32 = 2.0;
/// Digit height of the target labels
const LABEL_HEIGHT: f32 = 14.0;
/// Peak opacity of the level-up flash
const FLASH_PEAK: f32 = 0.22;

const HUD_PAD: f32 = 12.0;
const HUD_SIZE: Vec2 = Vec2::new(160.0, 74.0);
const HUD_MARKER_RADIUS: f32 = 5.0;
const HUD_PANEL: [f32; 4] = [0.0, 0.0, 0.0, 0.25 * 0.92];
const HUD_DIGIT_HEIGHT: f32 = 12.0;

/// Full-canvas flash shown when a level starts
#[derive(Debug, Clone, Copy, Default)]
pub struct Flash {
    until: f64,
}

impl Flash {
    pub fn trigger(&mut self, now: f64) {
        self.until = now + FLASH_DURATION_MS;
    }

    /// Opacity at `now`: `FLASH_PEAK` when triggered, decaying linearly to 0
    pub fn alpha(&self, now: f64) -> f32 {
        if now >= self.until {
            return 0.0;
        }
        let remaining = ((self.until - now) / FLASH_DURATION_MS).clamp(0.0, 1.0);
        remaining as f32 * FLASH_PEAK
    }
}

/// Presentation state that is not part of the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneOptions {
    pub paused: bool,
    /// Current flash opacity, 0 when idle
    pub flash_alpha: f32,
}

/// Stroke color of a target: collision beats hover beats normal
pub fn circle_color(circle: &Circle, hovered: bool) -> [f32; 4] {
    let base = if circle.colliding {
        colors::CIRCLE_COLLIDE
    } else if hovered {
        colors::CIRCLE_HOVER
    } else {
        colors::CIRCLE_NORMAL
    };
    colors::faded(base, circle.alpha)
}

fn push_circle(vertices: &mut Vec<Vertex>, circle: &Circle, hovered: bool) {
    let r = circle.radius();
    vertices.extend(shapes::ring(
        circle.pos,
        (r - RING_WIDTH / 2.0).max(0.0),
        r + RING_WIDTH / 2.0,
        circle_color(circle, hovered),
        shapes::segments_for_radius(r),
    ));
    vertices.extend(shapes::number_label(
        circle.pos,
        circle.id,
        LABEL_HEIGHT,
        colors::faded(colors::LABEL, circle.alpha),
    ));
}

/// HUD rows as (marker color, text): level, killed, escaped
pub fn hud_rows(state: &GameState) -> [([f32; 4], String); 3] {
    let p = &state.progress;
    [
        (
            colors::CIRCLE_NORMAL,
            format!("{}/{}", p.current_level, p.total_levels),
        ),
        (
            colors::CIRCLE_HOVER,
            format!("{}/{}", p.killed_total, p.total_budget),
        ),
        (
            colors::CIRCLE_COLLIDE,
            format!("{}/{}", p.escaped_total, p.total_budget),
        ),
    ]
}

/// Level, killed and escaped counters in a corner panel, each row keyed
/// by a dot in the matching circle color
fn push_hud(vertices: &mut Vec<Vertex>, state: &GameState) {
    let min = Vec2::splat(HUD_PAD);
    vertices.extend_from_slice(&shapes::rect(min, min + HUD_SIZE, HUD_PANEL));

    let marker_x = HUD_PAD + 14.0;
    let text_center_x = HUD_PAD + 14.0 + (HUD_SIZE.x - 14.0) / 2.0;
    for (i, (marker, text)) in hud_rows(state).into_iter().enumerate() {
        let y = HUD_PAD + 16.0 + i as f32 * 21.0;
        vertices.extend(shapes::ring(
            Vec2::new(marker_x, y),
            0.0,
            HUD_MARKER_RADIUS,
            marker,
            16,
        ));
        vertices.extend(shapes::text_label(
            Vec2::new(text_center_x, y),
            &text,
            HUD_DIGIT_HEIGHT,
            colors::LABEL,
        ));
    }
}

/// Two vertical bars in the middle of the canvas
fn push_pause_glyph(vertices: &mut Vec<Vertex>, center: Vec2) {
    let bar = Vec2::new(10.0, 40.0);
    for dx in [-12.0, 12.0] {
        let c = center + Vec2::new(dx, 0.0);
        vertices.extend_from_slice(&shapes::rect(c - bar / 2.0, c + bar / 2.0, [1.0; 4]));
    }
}

/// Build the full frame: targets in spawn order, HUD, then overlays
pub fn build_scene(state: &GameState, options: &SceneOptions) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let canvas = Vec2::new(state.width, state.height);

    for circle in &state.circles {
        if circle.alpha <= 0.0 {
            continue;
        }
        push_circle(&mut vertices, circle, state.is_hovered(circle.id));
    }

    push_hud(&mut vertices, state);

    if options.paused {
        vertices.extend_from_slice(&shapes::rect(Vec2::ZERO, canvas, colors::PAUSE_DIM));
        push_pause_glyph(&mut vertices, canvas / 2.0);
    }

    if options.flash_alpha > 0.0 {
        vertices.extend_from_slice(&shapes::rect(
            Vec2::ZERO,
            canvas,
            colors::faded(colors::FLASH, options.flash_alpha),
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn parked(id: u32, x: f32) -> Circle {
        Circle::new(id, Vec2::new(x, 200.0), 30.0, Vec2::ZERO)
    }

    #[test]
    fn test_flash_decays() {
        let mut flash = Flash::default();
        assert_eq!(flash.alpha(0.0), 0.0);

        flash.trigger(1000.0);
        assert!((flash.alpha(1000.0) - FLASH_PEAK).abs() < 1e-6);
        assert!((flash.alpha(1210.0) - FLASH_PEAK / 2.0).abs() < 1e-6);
        assert_eq!(flash.alpha(1420.0), 0.0);
        assert_eq!(flash.alpha(5000.0), 0.0);
    }

    #[test]
    fn test_circle_color_priority() {
        let mut circle = parked(1, 100.0);
        assert_eq!(circle_color(&circle, false), colors::CIRCLE_NORMAL);
        assert_eq!(circle_color(&circle, true), colors::CIRCLE_HOVER);

        circle.colliding = true;
        assert_eq!(circle_color(&circle, true), colors::CIRCLE_COLLIDE);

        circle.alpha = 0.5;
        assert_eq!(circle_color(&circle, false)[3], 0.5);
    }

    #[test]
    fn test_overlays_add_vertices() {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 1);
        state.circles = vec![parked(1, 100.0), parked(2, 300.0)];

        let plain = build_scene(&state, &SceneOptions::default());
        let paused = build_scene(
            &state,
            &SceneOptions {
                paused: true,
                flash_alpha: 0.1,
            },
        );
        // Dim rect + two pause bars + flash rect
        assert_eq!(paused.len(), plain.len() + 4 * 6);
        assert_eq!(&paused[..plain.len()], plain.as_slice());
    }

    #[test]
    fn test_hud_rows_show_totals() {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 1);
        state.progress.killed_total = 12;
        state.progress.escaped_total = 3;

        let rows = hud_rows(&state);
        assert_eq!(rows[0], (colors::CIRCLE_NORMAL, "1/15".to_string()));
        assert_eq!(rows[1], (colors::CIRCLE_HOVER, "12/150".to_string()));
        assert_eq!(rows[2], (colors::CIRCLE_COLLIDE, "3/150".to_string()));
    }

    #[test]
    fn test_invisible_circles_are_skipped() {
        let mut state = GameState::new(Tuning::default(), 800.0, 400.0, 1);
        state.circles = vec![parked(1, 100.0)];
        let with_one = build_scene(&state, &SceneOptions::default()).len();

        state.circles[0].alpha = 0.0;
        let with_none = build_scene(&state, &SceneOptions::default()).len();
        assert!(with_none < with_one);
    }
}
