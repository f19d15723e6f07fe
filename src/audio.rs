//! Audio system using Web Audio API
//!
//! Every sound is one or more short sine beeps, no external files needed.
//! The beep tables are plain data; only `AudioManager` touches the browser.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// A circle was clicked
    Kill,
    /// A new level was mixed in
    LevelUp,
    /// A session started or was reset
    SessionStart,
    /// Every circle is resolved
    SessionComplete,
}

/// A single sine tone with a short linear attack and release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beep {
    pub freq: f32,
    /// Seconds from attack to silence
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
    /// Seconds after the effect is triggered
    pub delay: f64,
}

const fn beep(freq: f32, duration: f64, gain: f32, delay: f64) -> Beep {
    Beep {
        freq,
        duration,
        gain,
        delay,
    }
}

/// Attack time of every beep
pub const ATTACK: f64 = 0.01;
/// Oscillator keeps running this long after the release
const TAIL: f64 = 0.02;

static KILL: [Beep; 1] = [beep(520.0, 0.07, 0.05, 0.0)];
static LEVEL_UP: [Beep; 2] = [beep(740.0, 0.09, 0.05, 0.0), beep(980.0, 0.08, 0.04, 0.09)];
static SESSION_START: [Beep; 1] = [beep(330.0, 0.10, 0.05, 0.0)];
static SESSION_COMPLETE: [Beep; 3] = [
    beep(660.0, 0.10, 0.05, 0.0),
    beep(550.0, 0.10, 0.05, 0.12),
    beep(440.0, 0.18, 0.05, 0.24),
];

impl SoundEffect {
    pub fn beeps(self) -> &'static [Beep] {
        match self {
            SoundEffect::Kill => &KILL,
            SoundEffect::LevelUp => &LEVEL_UP,
            SoundEffect::SessionStart => &SESSION_START,
            SoundEffect::SessionComplete => &SESSION_COMPLETE,
        }
    }
}

/// Gain multiplier after mute and master volume
pub fn effective_volume(master_volume: f32, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        master_volume.clamp(0.0, 1.0)
    }
}

/// Audio manager for the game
#[cfg(target_arch = "wasm32")]
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    muted: bool,
}

#[cfg(target_arch = "wasm32")]
impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new() -> Self {
        // Context creation fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = effective_volume(self.master_volume, self.muted);
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let t = ctx.current_time();
        for b in effect.beeps() {
            Self::play_beep(ctx, b, t + b.delay, vol);
        }
    }

    fn play_beep(ctx: &AudioContext, beep: &Beep, start: f64, vol: f32) -> Option<()> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(beep.freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        let g = gain.gain();
        g.set_value_at_time(0.0, start).ok()?;
        g.linear_ramp_to_value_at_time(beep.gain * vol, start + ATTACK)
            .ok()?;
        g.linear_ramp_to_value_at_time(0.0, start + beep.duration)
            .ok()?;

        osc.start_with_when(start).ok()?;
        osc.stop_with_when(start + beep.duration + TAIL).ok()?;
        Some(())
    }
}
