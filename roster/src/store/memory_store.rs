use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ResultStore;
use crate::error::StoreError;
use crate::model::{DrawResult, Participant, ParticipantId};

const DEMO_TEAMS: [&str; 4] = ["Platform", "Mobile", "Data", "Design"];

/// In-process store. Backs the demo mode and the test suites.
///
/// `set_offline` makes the roster read fail and `set_fail_appends` makes
/// writes report failure, so both error paths can be driven on demand.
#[derive(Default)]
pub struct MemoryStore {
    participants: Mutex<Vec<Participant>>,
    results: Mutex<Vec<DrawResult>>,
    offline: AtomicBool,
    fail_appends: AtomicBool,
    append_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants(participants: Vec<Participant>) -> Self {
        Self {
            participants: Mutex::new(participants),
            ..Default::default()
        }
    }

    /// `size` eligible participants with ids `1..=size`, spread over a few teams.
    pub fn demo(size: usize) -> Self {
        let participants = (1..=size)
            .map(|i| Participant {
                id: ParticipantId::from(i as u64),
                name: format!("Participant {i:03}"),
                team: DEMO_TEAMS[i % DEMO_TEAMS.len()].to_string(),
                eligible: true.into(),
            })
            .collect();

        Self::with_participants(participants)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Number of append attempts seen, successful or not.
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    /// Test convenience
    pub async fn insert_result_direct(&self, result: DrawResult) {
        self.results.lock().await.insert(0, result);
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn fetch_participants(&self) -> Result<Vec<Participant>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unconfigured);
        }
        Ok(self.participants.lock().await.clone())
    }

    async fn fetch_results(&self) -> Vec<DrawResult> {
        if self.offline.load(Ordering::SeqCst) {
            return Vec::new();
        }
        self.results.lock().await.clone()
    }

    async fn append_result(&self, result: &DrawResult) -> bool {
        self.append_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_appends.load(Ordering::SeqCst) {
            return false;
        }

        self.results.lock().await.insert(0, result.clone());
        true
    }

    async fn reset_results(&self) -> bool {
        if self.fail_appends.load(Ordering::SeqCst) {
            return false;
        }
        self.results.lock().await.clear();
        true
    }
}
