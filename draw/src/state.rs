//! Per-session draw state.
//!
//! Only the orchestrator mutates a [`DrawSession`]; the methods here keep its
//! invariants local:
//!   - `stopped_count` only grows within a draw and never exceeds `digit_count`
//!   - `selected_winner` is set on entering `Spinning` and cleared on leaving
//!     `Celebrating`
//!   - `digit_targets` always has exactly `digit_count` entries

use std::fmt;

use roster::model::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    Loading,
    Idle,
    Spinning,
    Celebrating,
    Error,
}

impl fmt::Display for DrawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrawStatus::Loading => "Loading",
            DrawStatus::Idle => "Idle",
            DrawStatus::Spinning => "Spinning",
            DrawStatus::Celebrating => "Celebrating",
            DrawStatus::Error => "Error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct DrawSession {
    status: DrawStatus,
    selected_winner: Option<Participant>,
    digit_targets: Vec<char>,
    stopped_count: usize,
    locked: Vec<bool>,
    epoch: u64,
    committed: bool,
}

impl DrawSession {
    /// Fresh session in `Loading`, reels showing zeros.
    pub fn new(digit_count: usize) -> Self {
        Self {
            status: DrawStatus::Loading,
            selected_winner: None,
            digit_targets: vec!['0'; digit_count],
            stopped_count: 0,
            locked: vec![false; digit_count],
            epoch: 0,
            committed: false,
        }
    }

    pub fn status(&self) -> DrawStatus {
        self.status
    }

    pub fn selected_winner(&self) -> Option<&Participant> {
        self.selected_winner.as_ref()
    }

    pub fn digit_targets(&self) -> &[char] {
        &self.digit_targets
    }

    pub fn digit_count(&self) -> usize {
        self.digit_targets.len()
    }

    pub fn stopped_count(&self) -> usize {
        self.stopped_count
    }

    /// Identifies the current (or last) draw; bumped on every `begin`.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub(crate) fn set_status(&mut self, status: DrawStatus) {
        self.status = status;
    }

    /// Enter `Spinning` for `winner`. Returns the new epoch.
    pub(crate) fn begin(&mut self, winner: Participant, targets: Vec<char>) -> u64 {
        debug_assert_eq!(targets.len(), self.digit_targets.len());

        self.epoch += 1;
        self.status = DrawStatus::Spinning;
        self.selected_winner = Some(winner);
        self.digit_targets = targets;
        self.stopped_count = 0;
        self.locked.iter_mut().for_each(|l| *l = false);
        self.committed = false;
        self.epoch
    }

    /// Count reel `index` as locked. False if it was already counted or
    /// is out of range.
    pub(crate) fn record_lock(&mut self, index: usize) -> bool {
        match self.locked.get_mut(index) {
            Some(locked) if !*locked => {
                *locked = true;
                self.stopped_count += 1;
                true
            }
            _ => false,
        }
    }

    pub fn all_locked(&self) -> bool {
        self.stopped_count == self.digit_targets.len()
    }

    /// Claim the single commit of this draw. True the first time only.
    pub(crate) fn claim_commit(&mut self) -> bool {
        !std::mem::replace(&mut self.committed, true)
    }

    /// Leave `Celebrating` (or tear down) back to `Idle`.
    pub(crate) fn clear(&mut self) {
        self.status = DrawStatus::Idle;
        self.selected_winner = None;
    }
}
