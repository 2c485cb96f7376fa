//! Persistent per-hand tracking state.
//!
//! One [`HandState`] per chirality, created at engine start and never
//! destroyed.  Each frame the tracker blends a stable tracking point from
//! palm and fingertip landmarks, derives a smoothed, clamped motion delta,
//! and freezes the position when the hand is lost (spatial memory) instead
//! of resetting or snapping toward origin.

use tracing::warn;

use crate::landmarks::{
    Chirality, FrameInput, HandRecord, Point, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, WRIST,
};

// ════════════════════════════════════════════════════════════════════════════
// TrackerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tuning for the tracking-point blend and delta conditioning.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Weight of the palm center in the blended tracking point; the finger
    /// center gets the remainder.  Palm-heavy so motion tracks the hand as
    /// a whole rather than fingertip jitter.
    pub palm_weight: f32,
    /// Exponential smoothing factor for deltas (0 = raw, 1 = frozen).
    pub delta_smoothing: f32,
    /// Per-axis clamp on a single frame's raw delta, in normalized units.
    /// Absorbs detection jumps and hand-swap spikes.
    pub max_delta: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            palm_weight: 0.6,
            delta_smoothing: 0.5,
            max_delta: 0.05,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandState
// ════════════════════════════════════════════════════════════════════════════

/// Persistent state for one hand.  Position and presence are written only
/// by [`HandTracker::update`]; the gesture debounce counters are written
/// only by the classifier.
#[derive(Debug, Clone)]
pub struct HandState {
    pub chirality: Chirality,
    /// Last blended tracking point.  Frozen at its last true value while
    /// the hand is absent.
    pub pos: Point,
    /// Smoothed frame-over-frame delta, zero while absent and on the first
    /// valid frame after a gap.
    pub dx: f32,
    pub dy: f32,
    /// Whether a valid record was seen this frame.
    pub present: bool,

    /// Consecutive raw-fist frames (classifier-owned).
    pub fist_frames: u32,
    /// Consecutive raw-crossed frames (classifier-owned).
    pub crossed_frames: u32,

    // Smoothing accumulators; reset across gaps so stale momentum never
    // leaks into a re-acquired hand.
    smooth_dx: f32,
    smooth_dy: f32,
    /// False until the first valid frame, and across gaps.
    seen: bool,
}

impl HandState {
    fn new(chirality: Chirality) -> Self {
        HandState {
            chirality,
            pos: Point::new(0.5, 0.5),
            dx: 0.0,
            dy: 0.0,
            present: false,
            fist_frames: 0,
            crossed_frames: 0,
            smooth_dx: 0.0,
            smooth_dy: 0.0,
            seen: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

/// Owns the two persistent [`HandState`]s and updates them once per frame.
#[derive(Debug)]
pub struct HandTracker {
    config: TrackerConfig,
    left: HandState,
    right: HandState,
}

impl HandTracker {
    pub fn new(config: TrackerConfig) -> Self {
        HandTracker {
            config,
            left: HandState::new(Chirality::Left),
            right: HandState::new(Chirality::Right),
        }
    }

    pub fn hand(&self, chirality: Chirality) -> &HandState {
        match chirality {
            Chirality::Left => &self.left,
            Chirality::Right => &self.right,
        }
    }

    pub(crate) fn hand_mut(&mut self, chirality: Chirality) -> &mut HandState {
        match chirality {
            Chirality::Left => &mut self.left,
            Chirality::Right => &mut self.right,
        }
    }

    /// Ingest one frame of landmark records.  Malformed records are skipped
    /// (that hand is treated as absent for the frame) and logged; the other
    /// hand still processes.
    pub fn update(&mut self, frame: &FrameInput) {
        for chirality in [Chirality::Left, Chirality::Right] {
            let record = frame.hand(chirality).and_then(|rec| match rec.validate() {
                Ok(()) => Some(rec),
                Err(e) => {
                    warn!(hand = chirality.as_str(), error = %e, "skipping malformed hand record");
                    None
                }
            });
            self.update_hand(chirality, record);
        }
    }

    fn update_hand(&mut self, chirality: Chirality, record: Option<&HandRecord>) {
        let cfg = self.config.clone();
        let hs = self.hand_mut(chirality);

        let Some(rec) = record else {
            // Spatial memory: freeze position, zero motion, drop momentum.
            hs.present = false;
            hs.dx = 0.0;
            hs.dy = 0.0;
            hs.smooth_dx = 0.0;
            hs.smooth_dy = 0.0;
            hs.seen = false;
            return;
        };

        let point = blended_point(rec, cfg.palm_weight);

        if hs.seen {
            let raw_dx = (point.x - hs.pos.x).clamp(-cfg.max_delta, cfg.max_delta);
            let raw_dy = (point.y - hs.pos.y).clamp(-cfg.max_delta, cfg.max_delta);
            hs.smooth_dx = cfg.delta_smoothing * hs.smooth_dx + (1.0 - cfg.delta_smoothing) * raw_dx;
            hs.smooth_dy = cfg.delta_smoothing * hs.smooth_dy + (1.0 - cfg.delta_smoothing) * raw_dy;
            hs.dx = hs.smooth_dx;
            hs.dy = hs.smooth_dy;
        } else {
            // First valid frame after a gap: no teleport jump.
            hs.dx = 0.0;
            hs.dy = 0.0;
        }

        hs.pos = point;
        hs.present = true;
        hs.seen = true;
    }
}

/// Fixed-weight blend of palm center and fingertip center.
///
/// Palm center = midpoint of wrist and middle-finger MCP; finger center =
/// midpoint of index and middle fingertips.  Weights sum to 1.
fn blended_point(rec: &HandRecord, palm_weight: f32) -> Point {
    let wrist = rec.point(WRIST);
    let mid_mcp = rec.point(MIDDLE_MCP);
    let index_tip = rec.point(INDEX_TIP);
    let middle_tip = rec.point(MIDDLE_TIP);

    let palm_x = (wrist.x + mid_mcp.x) / 2.0;
    let palm_y = (wrist.y + mid_mcp.y) / 2.0;
    let finger_x = (index_tip.x + middle_tip.x) / 2.0;
    let finger_y = (index_tip.y + middle_tip.y) / 2.0;

    let fw = 1.0 - palm_weight;
    Point::new(
        palm_weight * palm_x + fw * finger_x,
        palm_weight * palm_y + fw * finger_y,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{synth, LANDMARK_COUNT};

    fn open_at(chirality: Chirality, x: f32, y: f32) -> HandRecord {
        synth::open_hand(chirality, Point::new(x, y))
    }

    fn tracker() -> HandTracker {
        HandTracker::new(TrackerConfig::default())
    }

    #[test]
    fn presence_set_on_valid_record() {
        let mut t = tracker();
        t.update(&FrameInput::of(vec![open_at(Chirality::Left, 0.4, 0.5)]));
        assert!(t.hand(Chirality::Left).present);
        assert!(!t.hand(Chirality::Right).present);
    }

    #[test]
    fn position_frozen_while_absent() {
        let mut t = tracker();
        t.update(&FrameInput::of(vec![open_at(Chirality::Left, 0.4, 0.5)]));
        let before = t.hand(Chirality::Left).pos;

        for _ in 0..10 {
            t.update(&FrameInput::empty());
            let hs = t.hand(Chirality::Left);
            assert!(!hs.present);
            assert_eq!(hs.pos, before, "freeze invariant violated");
            assert_eq!((hs.dx, hs.dy), (0.0, 0.0));
        }
    }

    #[test]
    fn delta_zero_on_first_frame_after_gap() {
        let mut t = tracker();
        t.update(&FrameInput::of(vec![open_at(Chirality::Right, 0.2, 0.2)]));
        t.update(&FrameInput::empty());
        // Re-acquired far away: would be a huge delta if not zeroed.
        t.update(&FrameInput::of(vec![open_at(Chirality::Right, 0.8, 0.8)]));
        let hs = t.hand(Chirality::Right);
        assert!(hs.present);
        assert_eq!((hs.dx, hs.dy), (0.0, 0.0));
    }

    #[test]
    fn delta_follows_motion() {
        let mut t = tracker();
        t.update(&FrameInput::of(vec![open_at(Chirality::Left, 0.50, 0.50)]));
        t.update(&FrameInput::of(vec![open_at(Chirality::Left, 0.52, 0.50)]));
        let hs = t.hand(Chirality::Left);
        assert!(hs.dx > 0.0);
        assert!(hs.dy.abs() < 1e-4);
    }

    #[test]
    fn delta_clamped_against_jumps() {
        let mut t = tracker();
        t.update(&FrameInput::of(vec![open_at(Chirality::Left, 0.1, 0.5)]));
        t.update(&FrameInput::of(vec![open_at(Chirality::Left, 0.9, 0.5)]));
        let hs = t.hand(Chirality::Left);
        // Smoothed half of the clamped 0.05 maximum.
        assert!(hs.dx <= 0.05 * (1.0 - 0.5) + 1e-6);
    }

    #[test]
    fn malformed_record_skipped_other_hand_processes() {
        let mut t = tracker();
        let bad = HandRecord::new(Chirality::Left, vec![Point::new(0.5, 0.5); 3]);
        let good = open_at(Chirality::Right, 0.7, 0.4);
        t.update(&FrameInput::of(vec![bad, good]));
        assert!(!t.hand(Chirality::Left).present);
        assert!(t.hand(Chirality::Right).present);
    }

    #[test]
    fn blended_point_is_palm_heavy() {
        // Put the palm at origin-ish and the fingertips far away; the blend
        // must land closer to the palm than to the fingers.
        let mut pts = vec![Point::new(0.0, 0.0); LANDMARK_COUNT];
        pts[INDEX_TIP] = Point::new(1.0, 0.0);
        pts[MIDDLE_TIP] = Point::new(1.0, 0.0);
        let rec = HandRecord::new(Chirality::Left, pts);
        let p = blended_point(&rec, 0.6);
        assert!((p.x - 0.4).abs() < 1e-6);
    }
}
