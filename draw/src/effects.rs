//! Presentation effects the orchestrator triggers: sound cues and the
//! celebration burst. Every call is fire-and-forget; implementations swallow
//! their own failures.

use std::fmt;

/// Named sound cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Loops while the reels spin.
    Spin,
    /// One reel locked in.
    Tick,
    Win,
    /// Crowd noise held until the celebration is acknowledged.
    Cheer,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Spin, Cue::Tick, Cue::Win, Cue::Cheer];

    pub fn loops(self) -> bool {
        matches!(self, Cue::Spin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Cue::Spin => "spin",
            Cue::Tick => "tick",
            Cue::Win => "win",
            Cue::Cheer => "cheer",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Area the celebration effect is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelebrationSurface {
    pub width: u16,
    pub height: u16,
}

impl Default for CelebrationSurface {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

/// Audio and celebration capability handed to the orchestrator.
///
/// Lifecycle: `configure` once before use, `dispose` once at teardown.
pub trait Effects: Send + Sync {
    fn configure(&self, volume: f32);

    /// Restart `cue` from the beginning.
    fn play(&self, cue: Cue);

    fn stop(&self, cue: Cue);

    fn set_volume(&self, level: f32);

    /// Returns the new muted state.
    fn toggle_mute(&self) -> bool;

    fn launch_celebration(&self, surface: &CelebrationSurface);

    fn dispose(&self);
}

/// Does nothing. For headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffects;

impl Effects for NoopEffects {
    fn configure(&self, _volume: f32) {}
    fn play(&self, _cue: Cue) {}
    fn stop(&self, _cue: Cue) {}
    fn set_volume(&self, _level: f32) {}
    fn toggle_mute(&self) -> bool {
        false
    }
    fn launch_celebration(&self, _surface: &CelebrationSurface) {}
    fn dispose(&self) {}
}
