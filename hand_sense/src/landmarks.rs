//! Landmark data model — the boundary with the external hand detector.
//!
//! The provider delivers, per frame, zero to two [`HandRecord`]s: 21 ordered
//! keypoints plus a chirality label computed on the raw, unflipped camera
//! frame.  Records are consumed read-only within one frame and never stored.

use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Keypoint topology
// ════════════════════════════════════════════════════════════════════════════

/// Number of keypoints in a hand record (MediaPipe hand topology).
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// The four non-thumb (tip, knuckle) pairs used by fist detection.
pub const FINGER_PAIRS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

/// All five (tip, knuckle) pairs used by open-hand detection.
pub const ALL_FINGER_PAIRS: [(usize, usize); 5] = [
    (THUMB_TIP, THUMB_MCP),
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Chirality
// ════════════════════════════════════════════════════════════════════════════

/// Anatomical hand identity, as labeled by the provider on the unflipped
/// camera frame.  Independent of any mirrored display convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chirality {
    Left,
    Right,
}

impl Chirality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2D keypoint in normalized coordinates (x, y roughly in [0, 1]),
/// with optional depth carried opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y, z: None }
    }

    /// Euclidean distance in the image plane.
    pub fn dist(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// A landmark record that cannot be used this frame.  The affected hand is
/// treated as absent; the other hand still processes normally.
#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("wrong keypoint count: expected {LANDMARK_COUNT}, got {0}")]
    WrongPointCount(usize),

    #[error("non-finite coordinate at keypoint {0}")]
    NonFiniteCoordinate(usize),

    #[error("coordinate far out of range at keypoint {index}: ({x}, {y})")]
    OutOfRange { index: usize, x: f32, y: f32 },
}

// ════════════════════════════════════════════════════════════════════════════
// HandRecord
// ════════════════════════════════════════════════════════════════════════════

/// One hand's keypoints for one frame, as delivered by the provider.
#[derive(Debug, Clone)]
pub struct HandRecord {
    pub chirality: Chirality,
    pub points: Vec<Point>,
}

/// Landmarks may land slightly outside the frame while a hand leaves the
/// view; anything beyond this is a detector glitch, not a hand.
const COORD_BOUND: f32 = 8.0;

impl HandRecord {
    pub fn new(chirality: Chirality, points: Vec<Point>) -> Self {
        HandRecord { chirality, points }
    }

    /// Check the record is usable: exactly [`LANDMARK_COUNT`] keypoints,
    /// every coordinate finite and within loose bounds.
    pub fn validate(&self) -> Result<(), LandmarkError> {
        if self.points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongPointCount(self.points.len()));
        }
        for (i, p) in self.points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(LandmarkError::NonFiniteCoordinate(i));
            }
            if p.x.abs() > COORD_BOUND || p.y.abs() > COORD_BOUND {
                return Err(LandmarkError::OutOfRange { index: i, x: p.x, y: p.y });
            }
        }
        Ok(())
    }

    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameInput
// ════════════════════════════════════════════════════════════════════════════

/// Everything the provider produced for one frame.  Absence of a hand is
/// signaled by omission, not an error.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub hands: Vec<HandRecord>,
}

impl FrameInput {
    pub fn empty() -> Self {
        FrameInput { hands: Vec::new() }
    }

    pub fn of(hands: Vec<HandRecord>) -> Self {
        FrameInput { hands }
    }

    /// First record matching `chirality`, if any.
    pub fn hand(&self, chirality: Chirality) -> Option<&HandRecord> {
        self.hands.iter().find(|h| h.chirality == chirality)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// synth — synthetic poses for the simulation source and tests
// ════════════════════════════════════════════════════════════════════════════

/// Builders for recognizable synthetic hand poses centered on a wrist
/// position.  Used by the keyboard simulation source and by tests; the
/// geometry is chosen so each pose classifies unambiguously.
pub mod synth {
    use super::*;

    /// Per-chirality natural horizontal ordering of index vs middle.
    /// On an unflipped frame a left palm facing the camera has its index
    /// finger to the right of the middle finger; a right palm the reverse.
    fn finger_dir(chirality: Chirality) -> f32 {
        match chirality {
            Chirality::Left => 1.0,
            Chirality::Right => -1.0,
        }
    }

    fn base_points(center: Point) -> Vec<Point> {
        // Neutral skeleton: everything collapsed near the wrist; the pose
        // builders then place the joints that matter.
        vec![Point::new(center.x, center.y); LANDMARK_COUNT]
    }

    fn place(points: &mut [Point], index: usize, center: Point, dx: f32, dy: f32) {
        points[index] = Point::new(center.x + dx, center.y + dy);
    }

    /// Open hand: all five fingers extended well past their knuckles.
    pub fn open_hand(chirality: Chirality, center: Point) -> HandRecord {
        let d = finger_dir(chirality);
        let mut pts = base_points(center);
        place(&mut pts, THUMB_MCP, center, d * 0.04, -0.02);
        place(&mut pts, THUMB_TIP, center, d * 0.10, -0.06);
        place(&mut pts, INDEX_MCP, center, d * 0.03, -0.08);
        place(&mut pts, INDEX_TIP, center, d * 0.04, -0.20);
        place(&mut pts, MIDDLE_MCP, center, d * 0.01, -0.08);
        place(&mut pts, MIDDLE_TIP, center, d * 0.01, -0.22);
        place(&mut pts, RING_MCP, center, d * -0.01, -0.08);
        place(&mut pts, RING_TIP, center, d * -0.02, -0.20);
        place(&mut pts, PINKY_MCP, center, d * -0.03, -0.07);
        place(&mut pts, PINKY_TIP, center, d * -0.05, -0.17);
        HandRecord::new(chirality, pts)
    }

    /// Closed fist: every non-thumb fingertip pulled in closer to the wrist
    /// than its knuckle.
    pub fn fist(chirality: Chirality, center: Point) -> HandRecord {
        let d = finger_dir(chirality);
        let mut pts = base_points(center);
        for (tip, mcp) in FINGER_PAIRS {
            place(&mut pts, mcp, center, d * 0.01, -0.08);
            place(&mut pts, tip, center, d * 0.01, -0.03);
        }
        place(&mut pts, THUMB_MCP, center, d * 0.04, -0.02);
        place(&mut pts, THUMB_TIP, center, d * 0.05, -0.04);
        HandRecord::new(chirality, pts)
    }

    /// Crossed fingers: index and middle extended with their tips swapped
    /// across the knuckle ordering, ring and pinky curled.
    pub fn crossed_fingers(chirality: Chirality, center: Point) -> HandRecord {
        let d = finger_dir(chirality);
        let mut pts = base_points(center);
        // Knuckles keep the natural order...
        place(&mut pts, INDEX_MCP, center, d * 0.03, -0.08);
        place(&mut pts, MIDDLE_MCP, center, d * 0.01, -0.08);
        // ...tips swap sides, staying close together.
        place(&mut pts, INDEX_TIP, center, d * -0.005, -0.20);
        place(&mut pts, MIDDLE_TIP, center, d * 0.005, -0.21);
        // Ring and pinky curled in.
        place(&mut pts, RING_MCP, center, d * -0.01, -0.08);
        place(&mut pts, RING_TIP, center, d * -0.01, -0.03);
        place(&mut pts, PINKY_MCP, center, d * -0.03, -0.07);
        place(&mut pts, PINKY_TIP, center, d * -0.02, -0.03);
        place(&mut pts, THUMB_MCP, center, d * 0.04, -0.02);
        place(&mut pts, THUMB_TIP, center, d * 0.09, -0.05);
        HandRecord::new(chirality, pts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_synth_poses() {
        let rec = synth::open_hand(Chirality::Left, Point::new(0.5, 0.5));
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn validate_rejects_wrong_count() {
        let rec = HandRecord::new(Chirality::Left, vec![Point::new(0.5, 0.5); 7]);
        assert!(matches!(rec.validate(), Err(LandmarkError::WrongPointCount(7))));
    }

    #[test]
    fn validate_rejects_non_finite() {
        let mut rec = synth::fist(Chirality::Right, Point::new(0.5, 0.5));
        rec.points[3] = Point::new(f32::NAN, 0.5);
        assert!(matches!(
            rec.validate(),
            Err(LandmarkError::NonFiniteCoordinate(3))
        ));
    }

    #[test]
    fn validate_rejects_far_out_of_range() {
        let mut rec = synth::fist(Chirality::Right, Point::new(0.5, 0.5));
        rec.points[0] = Point::new(500.0, 0.5);
        assert!(matches!(rec.validate(), Err(LandmarkError::OutOfRange { index: 0, .. })));
    }

    #[test]
    fn frame_input_finds_by_chirality() {
        let frame = FrameInput::of(vec![
            synth::open_hand(Chirality::Left, Point::new(0.3, 0.5)),
            synth::fist(Chirality::Right, Point::new(0.7, 0.5)),
        ]);
        assert!(frame.hand(Chirality::Left).is_some());
        assert!(frame.hand(Chirality::Right).is_some());
        assert_eq!(FrameInput::empty().hand(Chirality::Left).map(|_| ()), None);
    }

    #[test]
    fn point_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.dist(&b) - 5.0).abs() < 1e-6);
    }
}
