//! Technique orchestration — the per-frame state machine over Blue, Red
//! and Purple.
//!
//! `update` runs a strict precedence each frame: a running Domain Expansion
//! locks everything, then a running merge, then Blue, Red, the collision
//! check and Purple.  Spawn triggers fire on rising edges of the gesture
//! flags; the previous frame's flags are snapshotted at the end of every
//! update, including locked ones, so a pre-lock edge can never fire on the
//! first unlocked frame.
//!
//! All sequence timing is wall-clock (`now` injected by the caller).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::debug;

use hand_sense::{Chirality, FrameGestures, Gesture, HandState, HandTracker};

use crate::canvas::{argb, blend, Canvas};
use crate::config::EngineConfig;
use crate::energy::{draw_vortex, CursedEnergy, EnergyKind, EnergyState};

// ════════════════════════════════════════════════════════════════════════════
// TechniqueState
// ════════════════════════════════════════════════════════════════════════════

/// Externally visible lifecycle state of one technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechniqueState {
    Inactive,
    Spawning,
    Active,
    /// Purple only: Blue and Red converging.
    Blending,
    /// Purple only: Domain Expansion, vortex collapsing.
    Expanding,
    /// Purple only: shockwave rings and scatter fading out.
    Clearing,
}

impl TechniqueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "OFF",
            Self::Spawning => "SPAWN",
            Self::Active => "ACTIVE",
            Self::Blending => "BLENDING",
            Self::Expanding => "EXPANDING",
            Self::Clearing => "CLEARING",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Merge (Blend) animation
// ════════════════════════════════════════════════════════════════════════════

/// The cinematic Blue+Red → Purple convergence.  The source entities are
/// dismissed when the collision fires; their last positions animate here as
/// ghost orbs.
#[derive(Debug, Clone)]
struct Merge {
    started: Duration,
    src_blue: (f32, f32),
    src_red: (f32, f32),
    midpoint: (f32, f32),
    progress: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// Domain Expansion
// ════════════════════════════════════════════════════════════════════════════

/// One scatter particle, seeded at expansion start with a fixed outward
/// velocity so the burst is reproducible.
#[derive(Debug, Clone)]
struct Burst {
    vx: f32,
    vy: f32,
    size: f32,
    color: u32,
}

/// Purple collapses while shockwave rings and scatter particles expand.
#[derive(Debug, Clone)]
struct Expansion {
    started: Duration,
    center: (f32, f32),
    bursts: Vec<Burst>,
    progress: f32,
}

/// Fraction of the expansion spent collapsing Purple (the EXPANDING phase);
/// the remainder is CLEARING.
const COLLAPSE_FRACTION: f32 = 0.3;

/// Length of the opening full-canvas flash.
const FLASH_SECS: f32 = 0.12;

impl Expansion {
    fn new(started: Duration, center: (f32, f32), rng: &mut StdRng, cfg: &EngineConfig) -> Self {
        let total = cfg.expansion_duration.as_secs_f32().max(0.01);
        let palette = [
            argb(200, 50, 200),
            argb(255, 100, 255),
            argb(180, 0, 180),
            argb(255, 255, 255),
        ];
        let bursts = (0..cfg.explosion_particle_count)
            .map(|_| {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let speed = rng.random_range(0.15..1.0) * cfg.explosion_max_radius / total;
                Burst {
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    size: rng.random_range(1.0..3.0),
                    color: palette[rng.random_range(0..palette.len())],
                }
            })
            .collect();
        Expansion {
            started,
            center,
            bursts,
            progress: 0.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TechniqueManager
// ════════════════════════════════════════════════════════════════════════════

pub struct TechniqueManager {
    cfg: EngineConfig,

    blue: CursedEnergy,
    red: CursedEnergy,
    purple: CursedEnergy,

    merge: Option<Merge>,
    expansion: Option<Expansion>,

    // Previous-frame flags for rising-edge detection.
    prev_left_crossed: bool,
    prev_right_crossed: bool,
    prev_apart: bool,

    rng: StdRng,
    last_now: Option<Duration>,
}

impl TechniqueManager {
    pub fn new(cfg: EngineConfig) -> Self {
        let rng = StdRng::seed_from_u64(cfg.rng_seed);
        TechniqueManager {
            cfg,
            blue: CursedEnergy::new(EnergyKind::Blue),
            red: CursedEnergy::new(EnergyKind::Red),
            purple: CursedEnergy::new(EnergyKind::Purple),
            merge: None,
            expansion: None,
            prev_left_crossed: false,
            prev_right_crossed: false,
            prev_apart: false,
            rng,
            last_now: None,
        }
    }

    // ── state reporting ──────────────────────────────────────────────────

    pub fn blue_state(&self) -> TechniqueState {
        energy_state(&self.blue)
    }

    pub fn red_state(&self) -> TechniqueState {
        energy_state(&self.red)
    }

    pub fn purple_state(&self) -> TechniqueState {
        if let Some(ex) = &self.expansion {
            return if ex.progress < COLLAPSE_FRACTION {
                TechniqueState::Expanding
            } else {
                TechniqueState::Clearing
            };
        }
        if self.merge.is_some() {
            return TechniqueState::Blending;
        }
        energy_state(&self.purple)
    }

    pub fn purple_pos(&self) -> (f32, f32) {
        (self.purple.x, self.purple.y)
    }

    /// True while a merge or expansion sequence has the input locked.
    pub fn locked(&self) -> bool {
        self.merge.is_some() || self.expansion.is_some()
    }

    // ── per-frame update ─────────────────────────────────────────────────

    /// Evaluate one frame of gesture input in strict precedence order.
    pub fn update(&mut self, gestures: &FrameGestures, tracker: &HandTracker, now: Duration) {
        let dt = self
            .last_now
            .map(|prev| now.saturating_sub(prev).as_secs_f32())
            .unwrap_or(0.0);
        self.last_now = Some(now);

        // 1. Domain Expansion locks out everything.
        if self.expansion.is_some() {
            self.advance_expansion(now, dt);
            self.snapshot(gestures);
            return;
        }

        // 2. A running merge locks out everything.
        if self.merge.is_some() {
            self.advance_merge(now, dt);
            self.snapshot(gestures);
            return;
        }

        let left = tracker.hand(Chirality::Left);
        let right = tracker.hand(Chirality::Right);
        let left_crossed = gestures.left == Gesture::CrossedFingers;
        let right_crossed = gestures.right == Gesture::CrossedFingers;

        // 3. Blue (Lapse) — left hand.
        if self.blue.is_inactive()
            && left_crossed
            && !self.prev_left_crossed
            && !self.purple.is_active()
        {
            let (x, y) = self.hand_canvas_pos(left);
            debug!("spawning Blue at ({x:.0}, {y:.0})");
            self.blue.spawn(x, y, now);
        }
        if self.blue.is_active() {
            let (dx, dy) = self.hand_move(left);
            self.blue.apply_move(dx, dy, &self.cfg);
            if gestures.left == Gesture::Fist {
                debug!("left fist — dismissing Blue");
                self.blue.dismiss();
            }
        }

        // 4. Red (Reversal) — right hand, spawned by hands-apart.
        if self.red.is_inactive()
            && gestures.hands_apart
            && !self.prev_apart
            && !self.purple.is_active()
        {
            let (x, y) = self.hand_canvas_pos(right);
            debug!("spawning Red at ({x:.0}, {y:.0})");
            self.red.spawn(x, y, now);
        }
        if matches!(self.red.state, EnergyState::Spawning { .. }) && gestures.hands_close {
            // Hands rejoined mid-spawn: the reversal never forms.
            debug!("hands rejoined — cancelling Red spawn");
            self.red.dismiss();
        }
        if self.red.is_active() {
            let (dx, dy) = self.hand_move(right);
            self.red.apply_move(dx, dy, &self.cfg);
            if gestures.right == Gesture::Fist {
                debug!("right fist — dismissing Red");
                self.red.dismiss();
            }
        }

        // 5. Collision: Blue + Red within range → merge into Purple.
        if self.blue.is_active()
            && self.red.is_active()
            && self.purple.is_inactive()
            && self.blue.center_dist(&self.red) < self.cfg.collision_threshold
        {
            let src_blue = (self.blue.x, self.blue.y);
            let src_red = (self.red.x, self.red.y);
            let midpoint = (
                (src_blue.0 + src_red.0) / 2.0,
                (src_blue.1 + src_red.1) / 2.0,
            );
            debug!(
                "Blue and Red collided — blending into Purple at ({:.1}, {:.1})",
                midpoint.0, midpoint.1
            );
            self.blue.dismiss();
            self.red.dismiss();
            self.purple.x = midpoint.0;
            self.purple.y = midpoint.1;
            self.purple.scale = 0.0;
            self.merge = Some(Merge {
                started: now,
                src_blue,
                src_red,
                midpoint,
                progress: 0.0,
            });
            self.snapshot(gestures);
            return;
        }

        // 6. Purple (Hollow) — right hand; right crossed triggers the
        //    Domain Expansion.
        if self.purple.is_active() {
            let (dx, dy) = self.hand_move(right);
            self.purple.apply_move(dx, dy, &self.cfg);

            if right_crossed && !self.prev_right_crossed {
                debug!("DOMAIN EXPANSION");
                let center = (self.purple.x, self.purple.y);
                let ex = Expansion::new(now, center, &mut self.rng, &self.cfg);
                self.expansion = Some(ex);
            }
        }

        // Advance animation phases.
        self.blue.advance(now, dt, &self.cfg);
        self.red.advance(now, dt, &self.cfg);
        self.purple.advance(now, dt, &self.cfg);

        // Red's spawn scale chases the hand separation when measurable: the
        // further apart, the faster the reversal forms.
        if matches!(self.red.state, EnergyState::Spawning { .. }) {
            if let Some(dist) = gestures.hand_distance {
                let close = self.cfg.gesture.close_threshold;
                let apart = self.cfg.gesture.apart_threshold;
                let target = ((dist - close) / (apart - close)).clamp(0.0, 1.0);
                let chase = 1.0 - (-4.5 * dt).exp();
                self.red.scale += (target - self.red.scale) * chase;
                if self.red.scale >= 0.95 {
                    self.red.activate();
                }
            }
        }

        // 7. Snapshot this frame's flags for next frame's edge detection.
        self.snapshot(gestures);
    }

    fn snapshot(&mut self, gestures: &FrameGestures) {
        self.prev_left_crossed = gestures.left == Gesture::CrossedFingers;
        self.prev_right_crossed = gestures.right == Gesture::CrossedFingers;
        self.prev_apart = gestures.hands_apart;
    }

    // ── merge animation ──────────────────────────────────────────────────

    fn advance_merge(&mut self, now: Duration, dt: f32) {
        let Some(m) = &mut self.merge else { return };
        let total = self.cfg.blend_duration.as_secs_f32().max(0.01);
        let elapsed = now.saturating_sub(m.started).as_secs_f32();
        m.progress = (elapsed / total).clamp(0.0, 1.0);

        // Purple grows at the midpoint while the ghosts converge.
        self.purple.x = m.midpoint.0;
        self.purple.y = m.midpoint.1;
        self.purple.scale = m.progress;
        self.purple.rotation += self.cfg.spin_purple * dt;
        self.purple.breath_phase += self.cfg.breath_rate * dt;

        if m.progress >= 1.0 {
            debug!("merge complete — Purple active");
            self.purple.activate();
            self.merge = None;
        }
    }

    // ── Domain Expansion ─────────────────────────────────────────────────

    fn advance_expansion(&mut self, now: Duration, dt: f32) {
        let Some(ex) = &mut self.expansion else { return };
        let total = self.cfg.expansion_duration.as_secs_f32().max(0.01);
        let elapsed = now.saturating_sub(ex.started).as_secs_f32();
        ex.progress = (elapsed / total).clamp(0.0, 1.0);

        if ex.progress < COLLAPSE_FRACTION {
            // EXPANDING: the vortex collapses to nothing.
            self.purple.scale = 1.0 - ex.progress / COLLAPSE_FRACTION;
            self.purple.rotation += self.cfg.spin_purple * dt;
            self.purple.breath_phase += self.cfg.breath_rate * dt;
        } else if !self.purple.is_inactive() {
            self.purple.dismiss();
        }

        if ex.progress >= 1.0 {
            debug!("Domain Expansion complete — void is clear");
            self.expansion = None;
            self.blue.dismiss();
            self.red.dismiss();
            self.purple.dismiss();
        }
    }

    // ── coordinate mapping ───────────────────────────────────────────────

    /// Map a hand's normalized tracking point to canvas pixels through the
    /// mirrored display convention.
    fn hand_canvas_pos(&self, hand: &HandState) -> (f32, f32) {
        (
            (1.0 - hand.pos.x) * self.cfg.canvas_width as f32,
            hand.pos.y * self.cfg.canvas_height as f32,
        )
    }

    /// Amplified pixel delta for a hand; x negated for the mirror.
    fn hand_move(&self, hand: &HandState) -> (f32, f32) {
        (
            -hand.dx * self.cfg.canvas_width as f32 * self.cfg.move_speed,
            hand.dy * self.cfg.canvas_height as f32 * self.cfg.move_speed,
        )
    }

    // ── rendering ────────────────────────────────────────────────────────

    /// Draw every live effect for this frame.
    pub fn render(&mut self, canvas: &mut Canvas, scratch: &mut Canvas) {
        self.blue.render(canvas, scratch, &mut self.rng, &self.cfg);
        self.red.render(canvas, scratch, &mut self.rng, &self.cfg);
        self.purple.render(canvas, scratch, &mut self.rng, &self.cfg);

        if let Some(m) = self.merge.clone() {
            self.render_merge(&m, canvas, scratch);
        }
        if let Some(ex) = self.expansion.clone() {
            self.render_expansion(&ex, canvas, scratch);
        }

        // Void ambient text.
        let caption = "I N F I N I T Y   V O I D";
        let x = (canvas.width as i32 - Canvas::label_width(caption, 1)) / 2;
        canvas.draw_label(caption, x, canvas.height as i32 - 16, 1, argb(25, 25, 25));
    }

    fn render_merge(&mut self, m: &Merge, canvas: &mut Canvas, scratch: &mut Canvas) {
        let p = m.progress;
        let elapsed = p * self.cfg.blend_duration.as_secs_f32();
        // Vibrating convergence: jitter decays to zero as the orbs meet.
        let jitter_amp = 4.0 * (1.0 - p);
        let jitter = |rng: &mut StdRng| {
            (
                rng.random_range(-1.0..1.0) * jitter_amp,
                rng.random_range(-1.0..1.0) * jitter_amp,
            )
        };

        let ghost_scale = (1.0 - p).max(0.0);
        for (kind, src) in [
            (EnergyKind::Blue, m.src_blue),
            (EnergyKind::Red, m.src_red),
        ] {
            let (jx, jy) = jitter(&mut self.rng);
            let x = src.0 + (m.midpoint.0 - src.0) * p + jx;
            let y = src.1 + (m.midpoint.1 - src.1) * p + jy;
            if ghost_scale > 0.02 {
                draw_vortex(
                    canvas,
                    scratch,
                    kind,
                    x,
                    y,
                    ghost_scale,
                    elapsed * kind.spin_rate(&self.cfg),
                    elapsed * self.cfg.breath_rate,
                    &mut self.rng,
                    &self.cfg,
                );
            }
        }

        // The forming Purple at the midpoint.
        if self.purple.scale > 0.02 {
            draw_vortex(
                canvas,
                scratch,
                EnergyKind::Purple,
                m.midpoint.0,
                m.midpoint.1,
                self.purple.scale,
                self.purple.rotation,
                self.purple.breath_phase,
                &mut self.rng,
                &self.cfg,
            );
        }
    }

    fn render_expansion(&mut self, ex: &Expansion, canvas: &mut Canvas, scratch: &mut Canvas) {
        let progress = ex.progress;
        let total = self.cfg.expansion_duration.as_secs_f32();
        let elapsed = progress * total;
        let (cx, cy) = ex.center;

        // Opening full-canvas flash.
        if elapsed < FLASH_SECS {
            let a = 0.6 * (1.0 - elapsed / FLASH_SECS);
            canvas.flash(argb(255, 255, 255), a);
        }

        // Shockwave rings and scatter share one overlay, one composite.
        scratch.clear(0);

        for ring in 0..self.cfg.explosion_ring_count {
            let delay = ring as f32 * 0.15;
            if progress <= delay {
                continue;
            }
            let ring_progress = (progress - delay) / (1.0 - delay);
            let radius = self.cfg.explosion_max_radius * ring_progress;
            let thickness = (8.0 * (1.0 - ring_progress)).max(1.0);
            // Alternate purple and near-white rings, dimming as they grow.
            let base = if ring % 2 == 0 {
                argb(230, 60, 230)
            } else {
                argb(255, 220, 255)
            };
            let color = blend(argb(0, 0, 0), base, (1.0 - ring_progress).max(0.0));
            scratch.stroke_circle(cx, cy, radius, thickness, color);
        }

        if progress < 0.7 {
            let fade = 1.0 - progress / 0.7;
            for b in &ex.bursts {
                let px = cx + b.vx * elapsed;
                let py = cy + b.vy * elapsed;
                let color = blend(argb(0, 0, 0), b.color, fade);
                scratch.fill_circle(px, py, b.size, color);
            }
        }

        canvas.composite(scratch, 0.5);

        // Overlay caption for the whole sequence.
        let caption = "D O M A I N   E X P A N S I O N";
        let scale = 4;
        let x = (canvas.width as i32 - Canvas::label_width(caption, scale)) / 2;
        canvas.draw_label(
            caption,
            x,
            canvas.height as i32 / 2 - 10,
            scale,
            argb(220, 80, 255),
        );
    }
}

fn energy_state(e: &CursedEnergy) -> TechniqueState {
    match e.state {
        EnergyState::Inactive => TechniqueState::Inactive,
        EnergyState::Spawning { .. } => TechniqueState::Spawning,
        EnergyState::Active => TechniqueState::Active,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
