//! Gesture classification from landmark geometry.
//!
//! Pure geometry given the inputs, except the debounce counters, which live
//! in [`HandState`] and are updated here.  The raw fist signal must hold for
//! `fist_debounce_frames` consecutive frames before `Fist` is reported; a
//! single non-fist frame resets the counter.
//!
//! Priority when several gestures match in one frame:
//! `Fist > CrossedFingers > Open > None`.

use tracing::debug;

use crate::landmarks::{
    Chirality, FrameInput, HandRecord, ALL_FINGER_PAIRS, FINGER_PAIRS, INDEX_MCP, INDEX_TIP,
    MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP, WRIST,
};
use crate::tracker::{HandState, HandTracker};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Classified gesture for one hand in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    #[default]
    None,
    CrossedFingers,
    Fist,
    Open,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CrossedFingers => "crossed",
            Self::Fist => "fist",
            Self::Open => "open",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

/// Classification thresholds.  Defaults match the tuned values of the
/// capture rig this engine was built against.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Consecutive raw-fist frames required before `Fist` is reported.
    pub fist_debounce_frames: u32,
    /// Consecutive raw-crossed frames required before `CrossedFingers` is
    /// reported.  1 = fire on the frame the inversion appears.
    pub crossed_debounce_frames: u32,
    /// A fingertip counts as curled when its wrist distance is below this
    /// fraction of its knuckle's wrist distance.
    pub fist_curl_ratio: f32,
    /// Base unit for how close crossed fingertips must stay (normalized).
    pub crossed_tip_gap: f32,
    /// Minimum wrist-to-wrist distance for the hands-apart trigger.
    pub apart_threshold: f32,
    /// Wrist-to-wrist distance under which the hands count as joined.
    pub close_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            fist_debounce_frames: 3,
            crossed_debounce_frames: 1,
            fist_curl_ratio: 0.85,
            crossed_tip_gap: 0.04,
            apart_threshold: 0.45,
            close_threshold: 0.14,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameGestures
// ════════════════════════════════════════════════════════════════════════════

/// Classification result for one frame: both hands plus the inter-hand
/// measurements, computed once per frame (not per hand).
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameGestures {
    pub left: Gesture,
    pub right: Gesture,
    /// Wrist-to-wrist distance; `None` when either hand is absent, which
    /// downstream treats as "not apart enough to trigger".
    pub hand_distance: Option<f32>,
    pub hands_apart: bool,
    pub hands_close: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        GestureClassifier { config }
    }

    /// Classify both hands for a frame.  Call after `HandTracker::update`
    /// so presence reflects this frame's (validated) records.
    pub fn read_frame(&self, tracker: &mut HandTracker, frame: &FrameInput) -> FrameGestures {
        let mut out = FrameGestures::default();

        for chirality in [Chirality::Left, Chirality::Right] {
            let present = tracker.hand(chirality).present;
            let record = if present { frame.hand(chirality) } else { None };
            let gesture = self.classify(tracker.hand_mut(chirality), record);
            match chirality {
                Chirality::Left => out.left = gesture,
                Chirality::Right => out.right = gesture,
            }
        }

        if tracker.hand(Chirality::Left).present && tracker.hand(Chirality::Right).present {
            if let (Some(l), Some(r)) = (frame.hand(Chirality::Left), frame.hand(Chirality::Right)) {
                let dist = l.point(WRIST).dist(&r.point(WRIST));
                out.hand_distance = Some(dist);
                out.hands_apart = dist > self.config.apart_threshold;
                out.hands_close = dist < self.config.close_threshold;
            }
        }

        out
    }

    /// Classify one hand, updating its debounce counters.  `None` record
    /// means the hand is absent this frame; counters reset.
    pub fn classify(&self, hand: &mut HandState, record: Option<&HandRecord>) -> Gesture {
        let Some(rec) = record else {
            hand.fist_frames = 0;
            hand.crossed_frames = 0;
            return Gesture::None;
        };

        // Raw signals first; every counter updates every frame.
        let raw_fist = is_fist(rec, self.config.fist_curl_ratio);
        if raw_fist {
            hand.fist_frames += 1;
            if hand.fist_frames == self.config.fist_debounce_frames {
                debug!(hand = hand.chirality.as_str(), "fist debounce satisfied");
            }
        } else {
            hand.fist_frames = 0;
        }

        let raw_crossed = is_crossed_fingers(rec, &self.config);
        if raw_crossed {
            hand.crossed_frames += 1;
        } else {
            hand.crossed_frames = 0;
        }

        if hand.fist_frames >= self.config.fist_debounce_frames {
            Gesture::Fist
        } else if raw_crossed && hand.crossed_frames >= self.config.crossed_debounce_frames {
            Gesture::CrossedFingers
        } else if is_open_hand(rec) {
            Gesture::Open
        } else {
            Gesture::None
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Geometry predicates
// ════════════════════════════════════════════════════════════════════════════

/// Closed fist: all four non-thumb fingertips closer to the wrist than
/// their MCP knuckles (scaled by the curl ratio).
fn is_fist(rec: &HandRecord, curl_ratio: f32) -> bool {
    let wrist = rec.point(WRIST);
    FINGER_PAIRS.iter().all(|&(tip, mcp)| {
        rec.point(tip).dist(&wrist) < rec.point(mcp).dist(&wrist) * curl_ratio
    })
}

/// Open hand: at least 3 of 5 fingers extended (tip farther from the wrist
/// than its knuckle).
fn is_open_hand(rec: &HandRecord) -> bool {
    let wrist = rec.point(WRIST);
    let extended = ALL_FINGER_PAIRS
        .iter()
        .filter(|&&(tip, mcp)| rec.point(tip).dist(&wrist) > rec.point(mcp).dist(&wrist))
        .count();
    extended >= 3
}

/// Slack applied to the ring/pinky curl check; a proper crossed pose only
/// needs them roughly folded, not clenched.
const CURL_SLACK: f32 = 1.1;

/// Crossed fingers: index and middle extended, at least one of ring/pinky
/// curled, and the two tips have swapped horizontal order relative to
/// their knuckles.  An exact tie in tip x never counts as crossed.
fn is_crossed_fingers(rec: &HandRecord, cfg: &GestureConfig) -> bool {
    let wrist = rec.point(WRIST);

    let index_extended =
        rec.point(INDEX_TIP).dist(&wrist) > rec.point(INDEX_MCP).dist(&wrist);
    let middle_extended =
        rec.point(MIDDLE_TIP).dist(&wrist) > rec.point(MIDDLE_MCP).dist(&wrist);
    if !(index_extended && middle_extended) {
        return false;
    }

    let ring_curled = rec.point(RING_TIP).dist(&wrist)
        < rec.point(RING_MCP).dist(&wrist) * CURL_SLACK;
    let pinky_curled = rec.point(PINKY_TIP).dist(&wrist)
        < rec.point(PINKY_MCP).dist(&wrist) * CURL_SLACK;
    if !(ring_curled || pinky_curled) {
        return false;
    }

    // Natural left-to-right order is established by the knuckles; crossing
    // means the tips invert it.  The strict inequality makes a tie
    // (tip_gap == 0) not-crossed.
    let mcp_gap = rec.point(INDEX_MCP).x - rec.point(MIDDLE_MCP).x;
    let tip_gap = rec.point(INDEX_TIP).x - rec.point(MIDDLE_TIP).x;
    mcp_gap * tip_gap < 0.0 && tip_gap.abs() < cfg.crossed_tip_gap * 3.0
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{synth, FrameInput, Point};
    use crate::tracker::TrackerConfig;

    fn rig() -> (GestureClassifier, HandTracker) {
        (
            GestureClassifier::new(GestureConfig::default()),
            HandTracker::new(TrackerConfig::default()),
        )
    }

    fn feed(
        classifier: &GestureClassifier,
        tracker: &mut HandTracker,
        frame: &FrameInput,
    ) -> FrameGestures {
        tracker.update(frame);
        classifier.read_frame(tracker, frame)
    }

    fn left_frame(rec: HandRecord) -> FrameInput {
        FrameInput::of(vec![rec])
    }

    const CENTER: Point = Point { x: 0.5, y: 0.5, z: None };

    #[test]
    fn fist_two_frames_does_not_trigger() {
        let (c, mut t) = rig();
        let fist = synth::fist(Chirality::Left, CENTER);
        for _ in 0..2 {
            let g = feed(&c, &mut t, &left_frame(fist.clone()));
            assert_ne!(g.left, Gesture::Fist);
        }
        // A non-fist frame resets the counter; two more fist frames still
        // stay below the threshold.
        feed(&c, &mut t, &left_frame(synth::open_hand(Chirality::Left, CENTER)));
        for _ in 0..2 {
            let g = feed(&c, &mut t, &left_frame(fist.clone()));
            assert_ne!(g.left, Gesture::Fist);
        }
    }

    #[test]
    fn fist_triggers_on_third_consecutive_frame() {
        let (c, mut t) = rig();
        let fist = synth::fist(Chirality::Left, CENTER);
        let mut last = Gesture::None;
        for i in 0..3 {
            last = feed(&c, &mut t, &left_frame(fist.clone())).left;
            if i < 2 {
                assert_ne!(last, Gesture::Fist, "fired early on frame {}", i + 1);
            }
        }
        assert_eq!(last, Gesture::Fist);
    }

    #[test]
    fn fist_counter_resets_on_hand_loss() {
        let (c, mut t) = rig();
        let fist = synth::fist(Chirality::Left, CENTER);
        feed(&c, &mut t, &left_frame(fist.clone()));
        feed(&c, &mut t, &left_frame(fist.clone()));
        feed(&c, &mut t, &FrameInput::empty());
        let g = feed(&c, &mut t, &left_frame(fist.clone()));
        assert_ne!(g.left, Gesture::Fist);
    }

    #[test]
    fn crossed_fires_on_inversion() {
        let (c, mut t) = rig();
        let rec = synth::crossed_fingers(Chirality::Left, CENTER);
        let g = feed(&c, &mut t, &left_frame(rec));
        assert_eq!(g.left, Gesture::CrossedFingers);
    }

    #[test]
    fn crossed_tie_is_not_crossed() {
        let (c, mut t) = rig();
        let mut rec = synth::crossed_fingers(Chirality::Left, CENTER);
        // Force index and middle tips to the same x: exactly equal order.
        let x = rec.points[MIDDLE_TIP].x;
        rec.points[INDEX_TIP].x = x;
        let g = feed(&c, &mut t, &left_frame(rec));
        assert_ne!(g.left, Gesture::CrossedFingers);
    }

    #[test]
    fn crossed_requires_inversion_not_proximity() {
        let (c, mut t) = rig();
        // Open hand with index/middle in natural order but close together.
        let mut rec = synth::open_hand(Chirality::Left, CENTER);
        rec.points[INDEX_TIP].x = rec.points[MIDDLE_TIP].x + 0.005;
        let g = feed(&c, &mut t, &left_frame(rec));
        assert_ne!(g.left, Gesture::CrossedFingers);
    }

    #[test]
    fn crossed_evaluated_per_chirality() {
        let (c, mut t) = rig();
        let frame = FrameInput::of(vec![
            synth::crossed_fingers(Chirality::Left, Point::new(0.3, 0.5)),
            synth::open_hand(Chirality::Right, Point::new(0.7, 0.5)),
        ]);
        let g = feed(&c, &mut t, &frame);
        assert_eq!(g.left, Gesture::CrossedFingers);
        assert_eq!(g.right, Gesture::Open);
    }

    #[test]
    fn open_hand_classifies() {
        let (c, mut t) = rig();
        let g = feed(&c, &mut t, &left_frame(synth::open_hand(Chirality::Left, CENTER)));
        assert_eq!(g.left, Gesture::Open);
    }

    #[test]
    fn fist_pose_never_reports_crossed_or_open() {
        let (c, mut t) = rig();
        let fist = synth::fist(Chirality::Left, CENTER);
        for _ in 0..5 {
            let g = feed(&c, &mut t, &left_frame(fist.clone()));
            assert!(matches!(g.left, Gesture::None | Gesture::Fist));
        }
    }

    #[test]
    fn distance_requires_both_hands() {
        let (c, mut t) = rig();
        let g = feed(
            &c,
            &mut t,
            &left_frame(synth::open_hand(Chirality::Left, CENTER)),
        );
        assert_eq!(g.hand_distance, None);
        assert!(!g.hands_apart);

        let frame = FrameInput::of(vec![
            synth::open_hand(Chirality::Left, Point::new(0.1, 0.5)),
            synth::open_hand(Chirality::Right, Point::new(0.9, 0.5)),
        ]);
        let g = feed(&c, &mut t, &frame);
        let dist = g.hand_distance.expect("both hands present");
        assert!(dist > 0.45);
        assert!(g.hands_apart);
        assert!(!g.hands_close);
    }

    #[test]
    fn hands_close_flag() {
        let (c, mut t) = rig();
        let frame = FrameInput::of(vec![
            synth::open_hand(Chirality::Left, Point::new(0.48, 0.5)),
            synth::open_hand(Chirality::Right, Point::new(0.52, 0.5)),
        ]);
        let g = feed(&c, &mut t, &frame);
        assert!(g.hands_close);
        assert!(!g.hands_apart);
    }

    #[test]
    fn crossed_debounce_configurable() {
        let mut cfg = GestureConfig::default();
        cfg.crossed_debounce_frames = 3;
        let c = GestureClassifier::new(cfg);
        let mut t = HandTracker::new(TrackerConfig::default());
        let rec = synth::crossed_fingers(Chirality::Right, CENTER);
        let mut last = Gesture::None;
        for _ in 0..3 {
            last = feed(&c, &mut t, &FrameInput::of(vec![rec.clone()])).right;
        }
        assert_eq!(last, Gesture::CrossedFingers);
    }
}
