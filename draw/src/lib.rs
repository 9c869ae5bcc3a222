//! Draw orchestration: who may win, who does win, and the timed reveal.

pub mod effects;
pub mod eligibility;
pub mod error;
pub mod orchestrator;
pub mod selector;
pub mod sequencer;
pub mod state;
pub mod types;

pub use effects::{CelebrationSurface, Cue, Effects, NoopEffects};
pub use error::{DrawError, DrawGate};
pub use orchestrator::{Celebration, CommitOutcome, DrawOrchestrator, Transition};
pub use selector::{RandomSource, SeededRandom, ThreadRandom};
pub use state::{DrawSession, DrawStatus};
pub use types::DrawConfig;
