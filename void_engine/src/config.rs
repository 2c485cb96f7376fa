//! Engine configuration.
//!
//! Every recognized tunable in one place, defaulted to the values the
//! capture rig was tuned against.  Timing values are wall-clock durations;
//! animation speed never depends on frame rate.

use std::time::Duration;

use hand_sense::{GestureConfig, TrackerConfig};

/// Configuration for the full engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ── canvas ───────────────────────────────────────────────────────────
    pub canvas_width: usize,
    pub canvas_height: usize,
    /// Energies may not move closer than this to the canvas edge (px).
    pub clamp_margin: f32,

    // ── tracking / classification ────────────────────────────────────────
    pub tracker: TrackerConfig,
    pub gesture: GestureConfig,
    /// Movement amplification from normalized hand delta to canvas pixels.
    pub move_speed: f32,

    // ── energies ─────────────────────────────────────────────────────────
    /// Max radius of Blue/Red vortices (px).
    pub energy_max_radius: f32,
    /// Max radius of Purple (px) — larger than either source.
    pub purple_radius: f32,
    /// Orbiting particles per Blue/Red vortex.
    pub energy_particle_count: usize,
    /// Orbiting particles for Purple.
    pub purple_particle_count: usize,
    /// Concentric glow layers per vortex.
    pub glow_ring_count: usize,
    /// Spin rates in radians per second.  Negative = inward (attraction).
    pub spin_blue: f32,
    pub spin_red: f32,
    pub spin_purple: f32,
    /// Breathing pulse rate (rad/s) modulating glow radius and opacity.
    pub breath_rate: f32,

    // ── sequences (wall-clock) ───────────────────────────────────────────
    /// Spawn scale-up 0 → full size.
    pub spawn_duration: Duration,
    /// Blue+Red → Purple cinematic merge.
    pub blend_duration: Duration,
    /// Domain Expansion total length (shrink + rings + scatter).
    pub expansion_duration: Duration,

    // ── thresholds ───────────────────────────────────────────────────────
    /// Center distance (px) under which Blue and Red merge.
    pub collision_threshold: f32,

    // ── explosion ────────────────────────────────────────────────────────
    pub explosion_ring_count: usize,
    pub explosion_particle_count: usize,
    pub explosion_max_radius: f32,

    // ── runtime ──────────────────────────────────────────────────────────
    /// Consecutive capture failures tolerated before the engine stops.
    pub capture_stall_limit: u32,
    /// Seed for the merge/explosion RNG; fixed seeds reproduce the
    /// cinematics exactly.
    pub rng_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            canvas_width: 1280,
            canvas_height: 720,
            clamp_margin: 40.0,

            tracker: TrackerConfig::default(),
            gesture: GestureConfig::default(),
            move_speed: 2.5,

            energy_max_radius: 55.0,
            purple_radius: 80.0,
            energy_particle_count: 16,
            purple_particle_count: 24,
            glow_ring_count: 3,
            spin_blue: -2.4,
            spin_red: 1.8,
            spin_purple: 1.2,
            breath_rate: 3.0,

            spawn_duration: Duration::from_millis(800),
            blend_duration: Duration::from_secs(3),
            expansion_duration: Duration::from_secs(2),

            collision_threshold: 80.0,

            explosion_ring_count: 4,
            explosion_particle_count: 20,
            explosion_max_radius: 500.0,

            capture_stall_limit: 120,
            rng_seed: 0x4A4A_4B00,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.gesture.fist_debounce_frames, 3);
        assert!(cfg.purple_radius > cfg.energy_max_radius);
        assert!(cfg.spin_blue < 0.0, "Blue spins inward");
        assert!(cfg.spin_red > 0.0, "Red spins outward");
        assert_eq!(cfg.blend_duration, Duration::from_secs(3));
    }
}
