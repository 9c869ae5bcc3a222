//! The draw orchestrator.
//!
//! Drives one [`DrawSession`] through its lifecycle:
//!
//! ```text
//! Loading --loaded--> Idle --start_draw--> Spinning --last reel--> Celebrating
//!    |                 ^                                               |
//!    +--failure--> Error --retry--> Loading          Idle <--acknowledge-+
//! ```
//!
//! Per draw it:
//!   1. Picks a winner from the eligible pool.
//!   2. Starts every reel with its staggered lock-in delay.
//!   3. Counts reel completions (any order) until all have locked in.
//!   4. Fires the celebration effects and makes exactly one append attempt.
//!
//! Everything runs on the caller's task. Reels report through an mpsc
//! channel; completions carry the draw epoch, so anything left over from a
//! superseded draw is ignored.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{Instrument, Span, debug, error, info, instrument, warn};

use common::logger::{TraceId, child_span, draw_span};
use roster::model::{DrawResult, Participant};
use roster::store::ResultStore;

use crate::effects::{Cue, Effects};
use crate::eligibility::eligible_pool;
use crate::error::{DrawError, DrawGate};
use crate::selector::{RandomSource, select_winner};
use crate::sequencer::{DigitSequencer, ReelFace, ReelSettled, ReelSpin};
use crate::state::{DrawSession, DrawStatus};
use crate::types::{DrawConfig, display_digits};

/// What happened to the result of a completed draw.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// Stored remotely and added to the local result list.
    Persisted(DrawResult),
    /// The store refused it. The local list is unchanged, so the winner stays
    /// in the pool until the next reload.
    Failed { result: DrawResult, error: DrawError },
}

impl CommitOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, CommitOutcome::Persisted(_))
    }

    pub fn result(&self) -> &DrawResult {
        match self {
            CommitOutcome::Persisted(result) => result,
            CommitOutcome::Failed { result, .. } => result,
        }
    }
}

/// Payload of the `Spinning -> Celebrating` transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Celebration {
    pub winner: Participant,
    /// Reel digits as displayed, e.g. `"000042"`.
    pub display: String,
    pub commit: CommitOutcome,
}

/// Observable step of a running draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    DigitLocked { index: usize, digit: char },
    Celebrating(Celebration),
}

pub struct DrawOrchestrator<S: ResultStore + ?Sized> {
    cfg: DrawConfig,
    store: Arc<S>,
    effects: Arc<dyn Effects>,
    rng: Box<dyn RandomSource>,

    participants: Vec<Participant>,
    results: Vec<DrawResult>,
    pool: Vec<Participant>,

    session: DrawSession,
    reels: Vec<DigitSequencer>,
    settled_tx: mpsc::UnboundedSender<ReelSettled>,
    settled_rx: mpsc::UnboundedReceiver<ReelSettled>,

    last_error: Option<DrawError>,
    span: Span,
    spin_started: Option<Instant>,
}

impl<S: ResultStore + ?Sized> DrawOrchestrator<S> {
    pub fn new(
        cfg: DrawConfig,
        store: Arc<S>,
        effects: Arc<dyn Effects>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, DrawError> {
        cfg.validate()?;

        effects.configure(cfg.volume);

        let reels = (0..cfg.digit_count)
            .map(|i| DigitSequencer::new(i, cfg.flicker_every))
            .collect();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session: DrawSession::new(cfg.digit_count),
            cfg,
            store,
            effects,
            rng,
            participants: Vec::new(),
            results: Vec::new(),
            pool: Vec::new(),
            reels,
            settled_tx,
            settled_rx,
            last_error: None,
            span: Span::none(),
            spin_started: None,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &DrawConfig {
        &self.cfg
    }

    pub fn status(&self) -> DrawStatus {
        self.session.status()
    }

    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Newest first.
    pub fn results(&self) -> &[DrawResult] {
        &self.results
    }

    pub fn pool(&self) -> &[Participant] {
        &self.pool
    }

    pub fn last_error(&self) -> Option<&DrawError> {
        self.last_error.as_ref()
    }

    pub fn effects(&self) -> &Arc<dyn Effects> {
        &self.effects
    }

    /// Live reel faces, left to right.
    pub fn reel_faces(&self) -> Vec<watch::Receiver<ReelFace>> {
        self.reels.iter().map(DigitSequencer::subscribe).collect()
    }

    /// Current reel digits as a string.
    pub fn displayed_digits(&self) -> String {
        self.reels.iter().map(|r| r.face().digit).collect()
    }

    /// Number of reels with a spin still scheduled.
    pub fn pending_reels(&self) -> usize {
        self.reels.iter().filter(|r| r.is_pending()).count()
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Fetch roster and results. Roster failure puts the session in `Error`;
    /// result failure is absorbed by the store and reads as "no results".
    #[instrument(skip(self), fields(status = %self.session.status()))]
    pub async fn load(&mut self) -> Result<(), DrawError> {
        if matches!(
            self.session.status(),
            DrawStatus::Spinning | DrawStatus::Celebrating
        ) {
            return Err(DrawError::Precondition(DrawGate::Busy));
        }

        self.session.set_status(DrawStatus::Loading);
        self.last_error = None;

        let (participants, results) = tokio::join!(
            self.store.fetch_participants(),
            self.store.fetch_results()
        );

        match participants {
            Ok(participants) => {
                self.participants = participants;
                self.results = results;
                self.refresh_pool();
                self.session.set_status(DrawStatus::Idle);

                info!(
                    participants = self.participants.len(),
                    results = self.results.len(),
                    pool = self.pool.len(),
                    "draw data loaded"
                );
                Ok(())
            }
            Err(e) => {
                let err = DrawError::Connectivity(e.to_string());
                error!(error = %e, "could not load participants");

                self.session.set_status(DrawStatus::Error);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Leave `Error` by loading again. No-op in any other state.
    pub async fn retry(&mut self) -> Result<(), DrawError> {
        if self.session.status() != DrawStatus::Error {
            debug!(status = %self.session.status(), "retry ignored");
            return Ok(());
        }
        self.load().await
    }

    fn refresh_pool(&mut self) {
        self.pool = eligible_pool(&self.participants, &self.results);
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    pub fn draw_gate(&self) -> DrawGate {
        match self.session.status() {
            DrawStatus::Loading | DrawStatus::Error => DrawGate::NotReady,
            DrawStatus::Spinning | DrawStatus::Celebrating => DrawGate::Busy,
            DrawStatus::Idle if self.pool.is_empty() => DrawGate::EmptyPool,
            DrawStatus::Idle => DrawGate::Open,
        }
    }

    pub fn can_draw(&self) -> bool {
        self.draw_gate().is_open()
    }

    /// Start a draw if the gate is open; otherwise do nothing and return `None`.
    pub fn start_draw(&mut self) -> Option<Participant> {
        let gate = self.draw_gate();
        if !gate.is_open() {
            debug!(%gate, "draw request ignored");
            return None;
        }

        let winner = select_winner(&self.pool, self.rng.as_mut())?.clone();
        let targets = display_digits(&winner.id, self.cfg.digit_count);

        let epoch = self.session.begin(winner.clone(), targets.clone());

        self.span = draw_span(&TraceId::new(), epoch);
        self.span
            .record("participant_id", tracing::field::display(&winner.id));

        for (reel, target) in self.reels.iter_mut().zip(targets.iter().copied()) {
            let spin = ReelSpin {
                target,
                delay: self.cfg.delay_for(reel.index()),
                epoch,
                seed: self.rng.next_seed(),
            };
            reel.spin(spin, self.settled_tx.clone());
        }

        self.spin_started = Some(Instant::now());
        self.effects.play(Cue::Spin);

        self.span.in_scope(|| {
            info!(
                pool = self.pool.len(),
                digits = %targets.iter().collect::<String>(),
                "draw started"
            );
        });

        Some(winner)
    }

    /// Like [`start_draw`](Self::start_draw) but reports why a draw was refused.
    pub fn try_start_draw(&mut self) -> Result<Participant, DrawError> {
        let gate = self.draw_gate();
        if !gate.is_open() {
            return Err(DrawError::Precondition(gate));
        }
        self.start_draw()
            .ok_or(DrawError::Precondition(DrawGate::EmptyPool))
    }

    /// Apply one reel completion. Completions may arrive in any order; the
    /// celebration fires once, when the count reaches `digit_count`.
    /// Stale epochs and repeated indices are ignored.
    pub async fn on_reel_settled(&mut self, settled: ReelSettled) -> Option<Transition> {
        if self.session.status() != DrawStatus::Spinning || settled.epoch != self.session.epoch() {
            debug!(
                index = settled.index,
                epoch = settled.epoch,
                current_epoch = self.session.epoch(),
                "stale reel completion ignored"
            );
            return None;
        }

        if !self.session.record_lock(settled.index) {
            return None;
        }

        self.effects.play(Cue::Tick);

        self.span.in_scope(|| {
            debug!(
                index = settled.index,
                digit = %settled.digit,
                stopped = self.session.stopped_count(),
                "digit locked"
            );
        });

        if !self.session.all_locked() {
            return Some(Transition::DigitLocked {
                index: settled.index,
                digit: settled.digit,
            });
        }

        self.celebrate().await.map(Transition::Celebrating)
    }

    /// Wait for the next reel event of the running draw. `None` when no draw
    /// is spinning.
    ///
    /// Not cancel safe once a completion has been received: drive it to
    /// completion rather than racing it in a `select!`.
    pub async fn next_transition(&mut self) -> Option<Transition> {
        while self.session.status() == DrawStatus::Spinning {
            let settled = self.settled_rx.recv().await?;
            if let Some(transition) = self.on_reel_settled(settled).await {
                return Some(transition);
            }
        }
        None
    }

    /// Run the current draw until it celebrates.
    pub async fn run_until_celebrating(&mut self) -> Option<Celebration> {
        while let Some(transition) = self.next_transition().await {
            if let Transition::Celebrating(celebration) = transition {
                return Some(celebration);
            }
        }
        None
    }

    async fn celebrate(&mut self) -> Option<Celebration> {
        let winner = self.session.selected_winner()?.clone();
        self.session.set_status(DrawStatus::Celebrating);

        for reel in &mut self.reels {
            reel.cancel();
        }

        self.effects.stop(Cue::Spin);
        self.effects.play(Cue::Win);
        self.effects.play(Cue::Cheer);
        self.effects.launch_celebration(&self.cfg.surface);

        let elapsed_ms = self
            .spin_started
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or_default();
        self.span
            .in_scope(|| info!(elapsed_ms, name = %winner.name, "winner revealed"));

        let commit = self.commit_result(&winner).await?;

        Some(Celebration {
            display: self.session.digit_targets().iter().collect(),
            winner,
            commit,
        })
    }

    /// One append attempt per draw, never retried. The local list only changes
    /// after the store confirms.
    async fn commit_result(&mut self, winner: &Participant) -> Option<CommitOutcome> {
        if !self.session.claim_commit() {
            warn!("commit already attempted for this draw");
            return None;
        }

        let result = DrawResult::for_winner(winner, &self.cfg.prize, Utc::now());

        let persisted = self
            .store
            .append_result(&result)
            .instrument(child_span("commit").or_current())
            .await;

        let outcome = if persisted {
            self.results.insert(0, result.clone());
            self.refresh_pool();
            self.span.in_scope(|| {
                info!(pool = self.pool.len(), "result persisted");
            });
            CommitOutcome::Persisted(result)
        } else {
            let error = DrawError::Persistence(format!(
                "store rejected result for participant {}",
                result.participant_id
            ));
            self.span.in_scope(|| {
                warn!(
                    participant_id = %result.participant_id,
                    "result not persisted; winner stays drawable until the next reload"
                );
            });
            self.last_error = Some(error.clone());
            CommitOutcome::Failed { result, error }
        };

        Some(outcome)
    }

    /// Dismiss the celebration. Returns false (and does nothing) outside
    /// `Celebrating`.
    pub fn acknowledge(&mut self) -> bool {
        if self.session.status() != DrawStatus::Celebrating {
            return false;
        }

        self.session.clear();
        self.effects.stop(Cue::Cheer);
        self.span = Span::none();

        info!(pool = self.pool.len(), "celebration acknowledged");
        true
    }

    // ------------------------------------------------------------------
    // Administration and teardown
    // ------------------------------------------------------------------

    /// Wipe the stored result history. Only while `Idle`; the local list is
    /// cleared only if the store confirms.
    #[instrument(skip(self))]
    pub async fn reset_results(&mut self) -> Result<bool, DrawError> {
        match self.draw_gate() {
            DrawGate::Open | DrawGate::EmptyPool => {}
            gate => return Err(DrawError::Precondition(gate)),
        }

        if !self.store.reset_results().await {
            warn!("store refused to reset results");
            return Ok(false);
        }

        self.results.clear();
        self.refresh_pool();
        info!(pool = self.pool.len(), "results reset");
        Ok(true)
    }

    /// Cancel every reel, silence all cues and release the effects.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        for reel in &mut self.reels {
            reel.cancel();
        }

        if matches!(
            self.session.status(),
            DrawStatus::Spinning | DrawStatus::Celebrating
        ) {
            self.session.clear();
        }

        self.effects.stop(Cue::Spin);
        self.effects.stop(Cue::Cheer);
        self.effects.dispose();
        self.span = Span::none();

        debug!("draw orchestrator shut down");
    }
}
