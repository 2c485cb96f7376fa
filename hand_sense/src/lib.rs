//! # hand_sense
//!
//! Turns raw per-frame hand landmark data into stable, debounced gestures
//! and motion deltas for the cursed-energy void engine.
//!
//! ## Pipeline
//!
//! ```text
//! landmark provider ──► HandTracker ──► GestureClassifier ──► FrameGestures
//!   (0–2 HandRecords)    (persistent       (per-frame,
//!                         HandStates)       debounced)
//! ```
//!
//! ## Gesture vocabulary
//!
//! | Gesture | Detection | Debounce |
//! |---|---|---|
//! | `Fist` | all four non-thumb fingertips closer to the wrist than their knuckles | 3 consecutive frames |
//! | `CrossedFingers` | index/middle fingertips swap horizontal order vs their knuckles | none by default |
//! | `Open` | at least 3 of 5 fingers extended | none |
//!
//! Priority when several match: `Fist > CrossedFingers > Open > None` —
//! dismissal must win over spawn so a closing fist never spawns and
//! dismisses in the same frame.
//!
//! The provider's chirality label is computed on the raw, unflipped camera
//! frame and is applied here without further mirroring; any display-side
//! left/right swap belongs to the renderer.

pub mod landmarks;
pub mod tracker;
pub mod gesture;

pub use landmarks::{Chirality, FrameInput, HandRecord, LandmarkError, Point, LANDMARK_COUNT};
pub use tracker::{HandState, HandTracker, TrackerConfig};
pub use gesture::{FrameGestures, Gesture, GestureClassifier, GestureConfig};
