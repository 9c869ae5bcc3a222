//! Shared types used by the draw subsystem.

use std::time::Duration;

use roster::model::{ParticipantId, Prize};

use crate::effects::CelebrationSurface;
use crate::error::DrawError;

/// Configuration knobs for a draw.
///
/// All values are supplied from outside; nothing here is derived at runtime.
#[derive(Debug, Clone)]
pub struct DrawConfig {
    /// Fixed number of reels, i.e. the width of the displayed identifier.
    pub digit_count: usize,

    /// Time the first reel spins before locking in.
    pub spin_base: Duration,

    /// Extra spin time added per reel, left to right.
    pub stagger: Duration,

    /// How often a spinning reel shows a new random digit.
    pub flicker_every: Duration,

    /// Prize recorded on every result.
    pub prize: Prize,

    /// Initial effects volume in `0.0..=1.0`.
    pub volume: f32,

    pub surface: CelebrationSurface,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            digit_count: 6,
            spin_base: Duration::from_millis(2_000),
            stagger: Duration::from_millis(500),
            flicker_every: Duration::from_millis(50),
            prize: Prize::new("GRAND", "Grand Prize"),
            volume: 0.5,
            surface: CelebrationSurface::default(),
        }
    }
}

impl DrawConfig {
    /// Lock-in delay of reel `index`: `spin_base + index * stagger`.
    pub fn delay_for(&self, index: usize) -> Duration {
        self.spin_base + self.stagger * index as u32
    }

    pub fn validate(&self) -> Result<(), DrawError> {
        if self.digit_count == 0 {
            return Err(DrawError::Config("digit_count must be at least 1".into()));
        }
        if self.flicker_every.is_zero() {
            return Err(DrawError::Config("flicker interval must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(DrawError::Config(format!(
                "volume {} is outside 0.0..=1.0",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Reel targets for `id`: left-padded with `'0'` to `width`, or cut down to
/// its last `width` characters when longer. Display only; persistence and
/// dedup always use the full id.
pub fn display_digits(id: &ParticipantId, width: usize) -> Vec<char> {
    let chars: Vec<char> = id.normalized().chars().collect();

    if chars.len() >= width {
        return chars[chars.len() - width..].to_vec();
    }

    let mut out = vec!['0'; width - chars.len()];
    out.extend(chars);
    out
}
