//! Participants, draw results and the stores that hold them.

pub mod error;
pub mod model;
pub mod store;

pub use error::StoreError;
pub use model::{DrawResult, EligibleFlag, Participant, ParticipantId, Prize};
pub use store::ResultStore;
