pub mod memory_store;
pub mod sheet_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sheet_store::SheetStore;
pub use sqlite_store::SqliteStore;

use crate::error::StoreError;
use crate::model::{DrawResult, Participant};

/// Remote source of the roster and sink for draw results.
///
/// Only the roster read may fail. Result reads degrade to an empty list and
/// writes report success as a plain `bool`, so a flaky backend never takes
/// the presentation down.
#[async_trait::async_trait]
pub trait ResultStore: Send + Sync {
    async fn fetch_participants(&self) -> Result<Vec<Participant>, StoreError>;

    /// Newest first.
    async fn fetch_results(&self) -> Vec<DrawResult>;

    async fn append_result(&self, result: &DrawResult) -> bool;

    /// Wipe the stored result history.
    async fn reset_results(&self) -> bool;
}
