//! Landmark provider boundary — and the keyboard simulation source.
//!
//! The real detector is an external collaborator; the engine only sees the
//! [`LandmarkSource`] trait.  One synchronous poll per frame: no queue, no
//! backpressure, a slow frame simply delays the next capture.
//!
//! [`SimSource`] is the always-available stand-in, mirroring how the
//! hardware-free simulation mode works elsewhere in this workspace: the
//! visualizer's window sends [`SimInput`] events over an `mpsc` channel and
//! the source synthesizes two plausible hands from them.

use std::sync::mpsc::{Receiver, TryRecvError};

use thiserror::Error;

use hand_sense::landmarks::synth;
use hand_sense::{Chirality, FrameInput, Point};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("landmark source disconnected")]
    Disconnected,
}

/// Anything that can deliver one frame of hand records on demand.
pub trait LandmarkSource {
    /// Produce this frame's records.  `Ok(None)` signals a capture failure
    /// for this frame only — the engine holds the last canvas and retries.
    /// An empty `FrameInput` means no hands in view, which is normal.
    fn poll(&mut self) -> Result<Option<FrameInput>, SourceError>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimInput — events from the simulation window
// ════════════════════════════════════════════════════════════════════════════

/// Raw input events translated from the visualizer's keyboard state.
/// Movement is in screen-space normalized units.
#[derive(Debug, Clone, Copy)]
pub enum SimInput {
    MoveLeft(f32, f32),
    MoveRight(f32, f32),
    ToggleLeftFist,
    ToggleLeftCrossed,
    ToggleRightFist,
    ToggleRightCrossed,
    ToggleLeftVisible,
    ToggleRightVisible,
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimPose {
    Open,
    Fist,
    Crossed,
}

struct SimHand {
    chirality: Chirality,
    center: Point,
    pose: SimPose,
    visible: bool,
}

impl SimHand {
    fn record(&self) -> hand_sense::HandRecord {
        match self.pose {
            SimPose::Open => synth::open_hand(self.chirality, self.center),
            SimPose::Fist => synth::fist(self.chirality, self.center),
            SimPose::Crossed => synth::crossed_fingers(self.chirality, self.center),
        }
    }
}

/// Two keyboard-driven synthetic hands.
///
/// Coordinates are camera-space (unflipped); the display mirrors them, so a
/// "move left on screen" request decreases the displayed x, which means
/// increasing the camera-space x here.
pub struct SimSource {
    rx: Receiver<SimInput>,
    left: SimHand,
    right: SimHand,
}

impl SimSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimSource {
            rx,
            // Camera-space: the user's left hand sits at high x so it shows
            // on the left of the mirrored display.
            left: SimHand {
                chirality: Chirality::Left,
                center: Point::new(0.7, 0.55),
                pose: SimPose::Open,
                visible: true,
            },
            right: SimHand {
                chirality: Chirality::Right,
                center: Point::new(0.3, 0.55),
                pose: SimPose::Open,
                visible: true,
            },
        }
    }

    fn apply(&mut self, input: SimInput) {
        fn nudge(hand: &mut SimHand, dx_screen: f32, dy: f32) {
            hand.center.x = (hand.center.x - dx_screen).clamp(0.05, 0.95);
            hand.center.y = (hand.center.y + dy).clamp(0.05, 0.95);
        }
        fn toggle(pose: &mut SimPose, target: SimPose) {
            *pose = if *pose == target { SimPose::Open } else { target };
        }

        match input {
            SimInput::MoveLeft(dx, dy) => nudge(&mut self.left, dx, dy),
            SimInput::MoveRight(dx, dy) => nudge(&mut self.right, dx, dy),
            SimInput::ToggleLeftFist => toggle(&mut self.left.pose, SimPose::Fist),
            SimInput::ToggleLeftCrossed => toggle(&mut self.left.pose, SimPose::Crossed),
            SimInput::ToggleRightFist => toggle(&mut self.right.pose, SimPose::Fist),
            SimInput::ToggleRightCrossed => toggle(&mut self.right.pose, SimPose::Crossed),
            SimInput::ToggleLeftVisible => self.left.visible = !self.left.visible,
            SimInput::ToggleRightVisible => self.right.visible = !self.right.visible,
        }
    }
}

impl LandmarkSource for SimSource {
    fn poll(&mut self) -> Result<Option<FrameInput>, SourceError> {
        loop {
            match self.rx.try_recv() {
                Ok(input) => self.apply(input),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Err(SourceError::Disconnected),
            }
        }

        let mut hands = Vec::with_capacity(2);
        if self.left.visible {
            hands.push(self.left.record());
        }
        if self.right.visible {
            hands.push(self.right.record());
        }
        Ok(Some(FrameInput::of(hands)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_sense::{Gesture, GestureClassifier, GestureConfig, HandTracker, TrackerConfig};
    use std::sync::mpsc;

    fn rig() -> (mpsc::Sender<SimInput>, SimSource, HandTracker, GestureClassifier) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            SimSource::new(rx),
            HandTracker::new(TrackerConfig::default()),
            GestureClassifier::new(GestureConfig::default()),
        )
    }

    #[test]
    fn default_frame_has_two_open_hands() {
        let (_tx, mut src, mut tracker, classifier) = rig();
        let frame = src.poll().unwrap().unwrap();
        assert_eq!(frame.hands.len(), 2);
        tracker.update(&frame);
        let g = classifier.read_frame(&mut tracker, &frame);
        assert_eq!(g.left, Gesture::Open);
        assert_eq!(g.right, Gesture::Open);
    }

    #[test]
    fn fist_toggle_classifies_after_debounce() {
        let (tx, mut src, mut tracker, classifier) = rig();
        tx.send(SimInput::ToggleLeftFist).unwrap();
        let mut last = Gesture::None;
        for _ in 0..3 {
            let frame = src.poll().unwrap().unwrap();
            tracker.update(&frame);
            last = classifier.read_frame(&mut tracker, &frame).left;
        }
        assert_eq!(last, Gesture::Fist);
    }

    #[test]
    fn crossed_toggle_classifies() {
        let (tx, mut src, mut tracker, classifier) = rig();
        tx.send(SimInput::ToggleRightCrossed).unwrap();
        let frame = src.poll().unwrap().unwrap();
        tracker.update(&frame);
        let g = classifier.read_frame(&mut tracker, &frame);
        assert_eq!(g.right, Gesture::CrossedFingers);
        assert_eq!(g.left, Gesture::Open);
    }

    #[test]
    fn visibility_toggle_omits_hand() {
        let (tx, mut src, _, _) = rig();
        tx.send(SimInput::ToggleLeftVisible).unwrap();
        let frame = src.poll().unwrap().unwrap();
        assert_eq!(frame.hands.len(), 1);
        assert!(frame.hand(Chirality::Left).is_none());
    }

    #[test]
    fn movement_is_mirrored_into_camera_space() {
        let (tx, mut src, _, _) = rig();
        let before = src.left.center.x;
        // Move left on screen → camera-space x increases.
        tx.send(SimInput::MoveLeft(0.05, 0.0)).unwrap();
        src.poll().unwrap();
        assert!(src.left.center.x > before);
    }

    #[test]
    fn disconnected_channel_is_an_error() {
        let (tx, mut src, _, _) = rig();
        drop(tx);
        assert!(matches!(src.poll(), Err(SourceError::Disconnected)));
    }
}
