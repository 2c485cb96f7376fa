//! A single cursed-energy entity and its procedural vortex renderer.
//!
//! Each instance owns its position, scale, rotation phase and state.  All
//! animation advances on wall-clock time so spawn and spin speed are
//! independent of frame rate.

use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;

use crate::canvas::{argb, blend, Canvas};
use crate::config::EngineConfig;

// ════════════════════════════════════════════════════════════════════════════
// EnergyKind
// ════════════════════════════════════════════════════════════════════════════

/// Color identity of a technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnergyKind {
    /// Lapse — left hand, inward spin (attraction).
    Blue,
    /// Reversal — right hand, outward spin (repulsion).
    Red,
    /// Hollow — merge of Blue and Red, right hand.
    Purple,
}

/// Core / glow / particle colors for one kind.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub core: u32,
    pub glow: u32,
    pub particle: u32,
}

impl EnergyKind {
    pub fn palette(&self) -> Palette {
        match self {
            Self::Blue => Palette {
                core: argb(50, 180, 255),
                glow: argb(0, 100, 255),
                particle: argb(100, 220, 255),
            },
            Self::Red => Palette {
                core: argb(255, 80, 50),
                glow: argb(255, 30, 0),
                particle: argb(255, 120, 80),
            },
            Self::Purple => Palette {
                core: argb(200, 50, 200),
                glow: argb(180, 0, 180),
                particle: argb(255, 100, 220),
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
            Self::Purple => "PURPLE",
        }
    }

    pub fn spin_rate(&self, cfg: &EngineConfig) -> f32 {
        match self {
            Self::Blue => cfg.spin_blue,
            Self::Red => cfg.spin_red,
            Self::Purple => cfg.spin_purple,
        }
    }

    pub fn max_radius(&self, cfg: &EngineConfig) -> f32 {
        match self {
            Self::Purple => cfg.purple_radius,
            _ => cfg.energy_max_radius,
        }
    }

    pub fn particle_count(&self, cfg: &EngineConfig) -> usize {
        match self {
            Self::Purple => cfg.purple_particle_count,
            _ => cfg.energy_particle_count,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EnergyState
// ════════════════════════════════════════════════════════════════════════════

/// Lifecycle of one entity.  Purple's blending and expansion phases are
/// orchestrated by the technique manager on top of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyState {
    /// Not rendered; position undefined.
    Inactive,
    /// Scaling up at the spawn location.
    Spawning { since: Duration },
    /// Following its controlling hand.
    Active,
}

// ════════════════════════════════════════════════════════════════════════════
// CursedEnergy
// ════════════════════════════════════════════════════════════════════════════

/// One animated energy instance.  Written only by the technique manager;
/// read-only for the renderer.
#[derive(Debug, Clone)]
pub struct CursedEnergy {
    pub kind: EnergyKind,
    pub state: EnergyState,
    pub x: f32,
    pub y: f32,
    /// 0.0–1.0 of the kind's max radius.
    pub scale: f32,
    /// Monotonically advancing rotation phase (radians).
    pub rotation: f32,
    /// Phase of the breathing opacity pulse.
    pub breath_phase: f32,
}

impl CursedEnergy {
    pub fn new(kind: EnergyKind) -> Self {
        CursedEnergy {
            kind,
            state: EnergyState::Inactive,
            x: 0.0,
            y: 0.0,
            scale: 0.0,
            rotation: 0.0,
            breath_phase: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == EnergyState::Active
    }

    pub fn is_inactive(&self) -> bool {
        self.state == EnergyState::Inactive
    }

    /// Begin spawning at a position.
    pub fn spawn(&mut self, x: f32, y: f32, now: Duration) {
        self.state = EnergyState::Spawning { since: now };
        self.x = x;
        self.y = y;
        self.scale = 0.0;
        self.rotation = 0.0;
    }

    /// Promote to `Active` at full size.
    pub fn activate(&mut self) {
        self.state = EnergyState::Active;
        self.scale = 1.0;
    }

    /// Return to `Inactive`; position becomes meaningless.
    pub fn dismiss(&mut self) {
        self.state = EnergyState::Inactive;
        self.scale = 0.0;
    }

    /// Apply an already-amplified pixel delta, clamped to the canvas.
    /// Only an active energy follows its hand.
    pub fn apply_move(&mut self, dx: f32, dy: f32, cfg: &EngineConfig) {
        if self.state != EnergyState::Active {
            return;
        }
        let m = cfg.clamp_margin;
        self.x = (self.x + dx).clamp(m, cfg.canvas_width as f32 - m);
        self.y = (self.y + dy).clamp(m, cfg.canvas_height as f32 - m);
    }

    /// Advance rotation, breathing and (while spawning) scale.
    pub fn advance(&mut self, now: Duration, dt: f32, cfg: &EngineConfig) {
        if self.state == EnergyState::Inactive {
            return;
        }
        self.rotation += self.kind.spin_rate(cfg) * dt;
        self.breath_phase += cfg.breath_rate * dt;

        if let EnergyState::Spawning { since } = self.state {
            let elapsed = now.saturating_sub(since).as_secs_f32();
            self.scale = (elapsed / cfg.spawn_duration.as_secs_f32()).min(1.0);
            if self.scale >= 1.0 {
                self.activate();
            }
        }
    }

    /// Center distance to another energy (px).
    pub fn center_dist(&self, other: &CursedEnergy) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Render this instance: vortex into the scratch overlay, one composite,
    /// then the decorative label for active entities.
    pub fn render(&self, canvas: &mut Canvas, scratch: &mut Canvas, rng: &mut StdRng, cfg: &EngineConfig) {
        if self.state == EnergyState::Inactive {
            return;
        }
        draw_vortex(
            canvas,
            scratch,
            self.kind,
            self.x,
            self.y,
            self.scale,
            self.rotation,
            self.breath_phase,
            rng,
            cfg,
        );
        if self.state == EnergyState::Active {
            let r = self.kind.max_radius(cfg) * self.scale.max(0.05);
            canvas.draw_label(
                self.kind.label(),
                self.x as i32 - 8,
                (self.y - r * 1.2) as i32,
                1,
                self.kind.palette().core,
            );
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// draw_vortex — shared by live entities and the merge's ghost orbs
// ════════════════════════════════════════════════════════════════════════════

/// Draw one vortex into `scratch` and composite it onto `canvas` with a
/// single alpha blend.
#[allow(clippy::too_many_arguments)]
pub fn draw_vortex(
    canvas: &mut Canvas,
    scratch: &mut Canvas,
    kind: EnergyKind,
    cx: f32,
    cy: f32,
    scale: f32,
    rotation: f32,
    breath_phase: f32,
    rng: &mut StdRng,
    cfg: &EngineConfig,
) {
    let s = scale.max(0.05); // minimum visible scale
    let r = kind.max_radius(cfg) * s;
    let palette = kind.palette();
    let breath = 0.7 + 0.3 * breath_phase.sin();

    scratch.clear(0);

    // ── Outer glow layers — decreasing radius, rising brightness ──
    let rings = cfg.glow_ring_count.max(1);
    for i in 0..rings {
        let offset = 10.0 * (rings - 1 - i) as f32;
        let brightness = (i + 1) as f32 / rings as f32;
        let glow_radius = (r + offset) * breath;
        if glow_radius < 2.0 {
            continue;
        }
        let color = blend(argb(0, 0, 0), palette.glow, brightness);
        scratch.fill_circle(cx, cy, glow_radius, color);
    }

    // ── Orbiting particles ──
    let count = kind.particle_count(cfg);
    for i in 0..count {
        let angle = rotation + std::f32::consts::TAU * i as f32 / count as f32;

        // Banded orbit radii plus jitter for a chaotic feel
        let orbit_base = r * (0.5 + 0.5 * ((i % 3) as f32 / 2.0));
        let orbit_jitter = rng.random_range(-3.0..3.0) * s;
        let orbit_r = orbit_base + orbit_jitter;

        let px = cx + orbit_r * angle.cos();
        let py = cy + orbit_r * angle.sin();
        let p_size = ((2 + (i % 3)) as f32 * s).max(1.0);
        scratch.fill_circle(px, py, p_size, palette.particle);
    }

    // ── Inner core and bright center ──
    let core_r = (r * 0.35).max(2.0);
    scratch.fill_circle(cx, cy, core_r, palette.core);
    scratch.fill_circle(cx, cy, (core_r * 0.5).max(1.0), argb(255, 255, 255));

    canvas.composite(scratch, 0.35 * s * breath);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn spawn_reaches_active_after_duration() {
        let cfg = cfg();
        let mut e = CursedEnergy::new(EnergyKind::Blue);
        e.spawn(100.0, 100.0, secs(1.0));

        e.advance(secs(1.4), 1.0 / 30.0, &cfg);
        assert!(matches!(e.state, EnergyState::Spawning { .. }));
        assert!(e.scale > 0.0 && e.scale < 1.0);

        e.advance(secs(1.0) + cfg.spawn_duration, 1.0 / 30.0, &cfg);
        assert_eq!(e.state, EnergyState::Active);
        assert_eq!(e.scale, 1.0);
    }

    #[test]
    fn spawn_scale_is_wall_clock_not_frame_count() {
        let cfg = cfg();
        // 30 fps and 60 fps must read identical scale at the same instant.
        let mut slow = CursedEnergy::new(EnergyKind::Red);
        let mut fast = CursedEnergy::new(EnergyKind::Red);
        slow.spawn(0.0, 0.0, Duration::ZERO);
        fast.spawn(0.0, 0.0, Duration::ZERO);

        let target = secs(0.4);
        slow.advance(target, 1.0 / 30.0, &cfg);
        for i in 1..=24 {
            fast.advance(secs(0.4 * i as f32 / 24.0), 1.0 / 60.0, &cfg);
        }
        assert!((slow.scale - fast.scale).abs() < 1e-3);
    }

    #[test]
    fn rotation_sign_matches_kind() {
        let cfg = cfg();
        let mut blue = CursedEnergy::new(EnergyKind::Blue);
        let mut red = CursedEnergy::new(EnergyKind::Red);
        blue.spawn(0.0, 0.0, Duration::ZERO);
        red.spawn(0.0, 0.0, Duration::ZERO);
        blue.advance(secs(0.1), 0.1, &cfg);
        red.advance(secs(0.1), 0.1, &cfg);
        assert!(blue.rotation < 0.0, "Blue spins inward (negative)");
        assert!(red.rotation > 0.0, "Red spins outward (positive)");
    }

    #[test]
    fn move_only_while_active_and_clamped() {
        let cfg = cfg();
        let mut e = CursedEnergy::new(EnergyKind::Blue);
        e.spawn(100.0, 100.0, Duration::ZERO);
        e.apply_move(50.0, 0.0, &cfg);
        assert_eq!(e.x, 100.0, "spawning energy must not move");

        e.activate();
        e.apply_move(-10_000.0, 10_000.0, &cfg);
        assert_eq!(e.x, cfg.clamp_margin);
        assert_eq!(e.y, cfg.canvas_height as f32 - cfg.clamp_margin);
    }

    #[test]
    fn inactive_renders_nothing() {
        let cfg = cfg();
        let mut canvas = Canvas::new(64, 64);
        let mut scratch = Canvas::new(64, 64);
        let mut rng = StdRng::seed_from_u64(7);
        let e = CursedEnergy::new(EnergyKind::Purple);
        e.render(&mut canvas, &mut scratch, &mut rng, &cfg);
        assert!(canvas.buffer().iter().all(|&p| p == 0));
    }

    #[test]
    fn render_touches_canvas_when_active() {
        let cfg = cfg();
        let mut canvas = Canvas::new(256, 256);
        let mut scratch = Canvas::new(256, 256);
        let mut rng = StdRng::seed_from_u64(7);
        let mut e = CursedEnergy::new(EnergyKind::Blue);
        e.spawn(128.0, 128.0, Duration::ZERO);
        e.activate();
        e.render(&mut canvas, &mut scratch, &mut rng, &cfg);
        assert!(canvas.buffer().iter().any(|&p| p != 0));
    }

    #[test]
    fn seeded_render_is_reproducible() {
        let cfg = cfg();
        let mut e = CursedEnergy::new(EnergyKind::Red);
        e.spawn(128.0, 128.0, Duration::ZERO);
        e.activate();

        let render_once = |seed: u64| {
            let mut canvas = Canvas::new(256, 256);
            let mut scratch = Canvas::new(256, 256);
            let mut rng = StdRng::seed_from_u64(seed);
            e.render(&mut canvas, &mut scratch, &mut rng, &cfg);
            canvas.buffer().to_vec()
        };
        assert_eq!(render_once(42), render_once(42));
    }
}
