//! Terminal rendition of the draw effects: the bell stands in for sound and
//! a one-shot confetti burst for the celebration.

use std::io::{self, Write};

use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use draw::effects::{CelebrationSurface, Cue, Effects};

const CONFETTI: [char; 6] = ['*', '+', 'o', '.', '~', '^'];
const COLORS: [u8; 6] = [31, 32, 33, 34, 35, 36];
const PARTICLES: usize = 150;

#[derive(Debug)]
struct AudioState {
    volume: f32,
    muted: bool,
    looping: Option<Cue>,
    disposed: bool,
}

pub struct TerminalEffects {
    state: Mutex<AudioState>,
}

impl TerminalEffects {
    pub fn new(muted: bool) -> Self {
        Self {
            state: Mutex::new(AudioState {
                volume: 0.5,
                muted,
                looping: None,
                disposed: false,
            }),
        }
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    fn audible(&self) -> bool {
        let s = self.state.lock();
        !s.disposed && !s.muted && s.volume > 0.0
    }
}

impl Effects for TerminalEffects {
    fn configure(&self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn play(&self, cue: Cue) {
        if cue.loops() {
            self.state.lock().looping = Some(cue);
        }
        if !self.audible() {
            return;
        }

        debug!(%cue, "cue");
        // Only the reveal rings; a bell per tick would drown it out.
        if cue == Cue::Win {
            let mut out = io::stdout().lock();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }

    fn stop(&self, cue: Cue) {
        let mut s = self.state.lock();
        if s.looping == Some(cue) {
            s.looping = None;
        }
    }

    fn set_volume(&self, level: f32) {
        self.state.lock().volume = level.clamp(0.0, 1.0);
    }

    fn toggle_mute(&self) -> bool {
        let mut s = self.state.lock();
        s.muted = !s.muted;
        s.muted
    }

    fn launch_celebration(&self, surface: &CelebrationSurface) {
        if self.state.lock().disposed {
            return;
        }

        let burst = confetti(surface, &mut rand::thread_rng());
        let mut out = io::stdout().lock();
        let _ = writeln!(out);
        let _ = out.write_all(burst.as_bytes());
        let _ = out.flush();
    }

    fn dispose(&self) {
        let mut s = self.state.lock();
        if s.disposed {
            return;
        }
        if let Some(cue) = s.looping.take() {
            debug!(%cue, "stopping loop on dispose");
        }
        s.disposed = true;
    }
}

/// Scatter confetti over the top third of the surface.
fn confetti(surface: &CelebrationSurface, rng: &mut impl Rng) -> String {
    let width = usize::from(surface.width.max(1));
    let rows = usize::from((surface.height / 3).max(1));

    let mut grid = vec![vec![None; width]; rows];
    for _ in 0..PARTICLES {
        let row = rng.gen_range(0..rows);
        let col = rng.gen_range(0..width);
        let glyph = CONFETTI[rng.gen_range(0..CONFETTI.len())];
        let color = COLORS[rng.gen_range(0..COLORS.len())];
        grid[row][col] = Some((glyph, color));
    }

    let mut out = String::new();
    for row in grid {
        for cell in row {
            match cell {
                Some((glyph, color)) => out.push_str(&format!("\x1b[{color}m{glyph}\x1b[0m")),
                None => out.push(' '),
            }
        }
        out.push('\n');
    }
    out
}
