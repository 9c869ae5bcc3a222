//! Digit sequencer: one reel of the slot display.
//!
//! A reel is a small state machine, `Idle -> Spinning -> Settled`. While
//! spinning, a background task flickers random digits on the reel's face
//! every `flicker_every`; once the reel's deadline passes, the face locks to
//! the target digit and exactly one [`ReelSettled`] is sent.
//!
//! `spin` and `cancel` both abort whatever task the reel owned before, and
//! so does `Drop`, so a superseded spin can never report.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelPhase {
    Idle,
    Spinning,
    Settled,
}

/// What a reel currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelFace {
    pub digit: char,
    pub phase: ReelPhase,
}

/// Completion notice. `epoch` identifies the draw the spin belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelSettled {
    pub index: usize,
    pub epoch: u64,
    pub digit: char,
}

/// Parameters of one spin activation.
#[derive(Debug, Clone, Copy)]
pub struct ReelSpin {
    pub target: char,
    pub delay: Duration,
    pub epoch: u64,
    pub seed: u64,
}

pub struct DigitSequencer {
    index: usize,
    flicker_every: Duration,
    face: Arc<watch::Sender<ReelFace>>,
    task: Option<JoinHandle<()>>,
}

impl DigitSequencer {
    pub fn new(index: usize, flicker_every: Duration) -> Self {
        let (face, _) = watch::channel(ReelFace {
            digit: '0',
            phase: ReelPhase::Idle,
        });

        Self {
            index,
            flicker_every,
            face: Arc::new(face),
            task: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn face(&self) -> ReelFace {
        *self.face.borrow()
    }

    pub fn phase(&self) -> ReelPhase {
        self.face.borrow().phase
    }

    /// Live view of the face for renderers.
    pub fn subscribe(&self) -> watch::Receiver<ReelFace> {
        self.face.subscribe()
    }

    /// True while a spin task is still scheduled.
    pub fn is_pending(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start a new spin. Any previous spin is cancelled first and the face
    /// goes back to an unsettled state. The deadline is measured from this call.
    pub fn spin(&mut self, spin: ReelSpin, done: mpsc::UnboundedSender<ReelSettled>) {
        self.cancel();

        self.face.send_modify(|f| f.phase = ReelPhase::Spinning);

        let deadline = Instant::now() + spin.delay;
        let task = run_reel(
            self.index,
            spin,
            deadline,
            self.flicker_every,
            Arc::clone(&self.face),
            done,
        );

        self.task = Some(tokio::spawn(task));
    }

    /// Abort a pending spin. A reel that already settled keeps its face.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.face.send_modify(|f| {
            if f.phase == ReelPhase::Spinning {
                f.phase = ReelPhase::Idle;
            }
        });
    }
}

impl Drop for DigitSequencer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_reel(
    index: usize,
    spin: ReelSpin,
    deadline: Instant,
    flicker_every: Duration,
    face: Arc<watch::Sender<ReelFace>>,
    done: mpsc::UnboundedSender<ReelSettled>,
) {
    let mut rng = StdRng::seed_from_u64(spin.seed);

    let stop = tokio::time::sleep_until(deadline);
    tokio::pin!(stop);

    let mut flicker = tokio::time::interval(flicker_every);
    flicker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => break,

            _ = flicker.tick() => {
                let digit = char::from(b'0' + rng.gen_range(0..10u8));
                face.send_modify(|f| f.digit = digit);
            }
        }
    }

    face.send_replace(ReelFace {
        digit: spin.target,
        phase: ReelPhase::Settled,
    });

    trace!(index, epoch = spin.epoch, digit = %spin.target, "reel settled");

    // Receiver gone means the orchestrator was torn down.
    let _ = done.send(ReelSettled {
        index,
        epoch: spin.epoch,
        digit: spin.target,
    });
}
