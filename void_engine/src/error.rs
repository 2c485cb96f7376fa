//! Engine error taxonomy.
//!
//! Recoverable per-frame conditions (missing hands, malformed records,
//! single capture misses) never surface here; only conditions that end the
//! run do.

use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The output window could not be created or updated.
    #[error("window error: {0}")]
    Window(String),

    /// The landmark source is gone for good.
    #[error("landmark source error: {0}")]
    Source(#[from] SourceError),

    /// Too many consecutive frames without capture input.
    #[error("capture stalled: {frames} consecutive frames without input")]
    CaptureStalled { frames: u32 },
}
