use std::fmt;

use thiserror::Error;

/// Whether a draw may start right now, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawGate {
    Open,
    /// Data is still loading or failed to load.
    NotReady,
    /// A draw is spinning or awaiting acknowledgement.
    Busy,
    /// Nobody left to draw.
    EmptyPool,
}

impl DrawGate {
    pub fn is_open(&self) -> bool {
        matches!(self, DrawGate::Open)
    }
}

impl fmt::Display for DrawGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrawGate::Open => "open",
            DrawGate::NotReady => "data not loaded",
            DrawGate::Busy => "a draw is already in progress",
            DrawGate::EmptyPool => "no eligible participants",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("could not load participants: {0}")]
    Connectivity(String),

    #[error("result was not persisted: {0}")]
    Persistence(String),

    #[error("draw unavailable: {0}")]
    Precondition(DrawGate),

    #[error("invalid draw configuration: {0}")]
    Config(String),
}
