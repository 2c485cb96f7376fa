//! Engine context and the main loop.
//!
//! [`Engine`] is the single explicit owner of all persistent state — the
//! tracker, the classifier, the technique manager, the canvas and the
//! scratch overlay.  One call to [`Engine::step`] runs one synchronous
//! frame: track → classify → transition → render.  Nothing suspends
//! mid-frame and no background tasks exist.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use hand_sense::{Chirality, FrameGestures, FrameInput, GestureClassifier, HandTracker};

use crate::canvas::{argb, Canvas};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::source::{LandmarkSource, SimSource};
use crate::technique::TechniqueManager;
use crate::visualizer::Visualizer;

const BACKGROUND: u32 = argb(0, 0, 0);

// ════════════════════════════════════════════════════════════════════════════
// Engine
// ════════════════════════════════════════════════════════════════════════════

pub struct Engine {
    cfg: EngineConfig,
    tracker: HandTracker,
    classifier: GestureClassifier,
    manager: TechniqueManager,
    canvas: Canvas,
    scratch: Canvas,
    last_gestures: FrameGestures,
    capture_failures: u32,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        let tracker = HandTracker::new(cfg.tracker.clone());
        let classifier = GestureClassifier::new(cfg.gesture.clone());
        let manager = TechniqueManager::new(cfg.clone());
        let canvas = Canvas::new(cfg.canvas_width, cfg.canvas_height);
        let scratch = Canvas::new(cfg.canvas_width, cfg.canvas_height);
        Engine {
            cfg,
            tracker,
            classifier,
            manager,
            canvas,
            scratch,
            last_gestures: FrameGestures::default(),
            capture_failures: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn manager(&self) -> &TechniqueManager {
        &self.manager
    }

    pub fn gestures(&self) -> &FrameGestures {
        &self.last_gestures
    }

    /// Run one frame.  `None` input is a capture failure: the last rendered
    /// canvas is held and the engine retries next cycle, up to the
    /// configured stall limit.
    pub fn step(&mut self, frame: Option<FrameInput>, now: Duration) -> Result<(), EngineError> {
        let Some(frame) = frame else {
            self.capture_failures += 1;
            if self.capture_failures >= self.cfg.capture_stall_limit {
                return Err(EngineError::CaptureStalled {
                    frames: self.capture_failures,
                });
            }
            if self.capture_failures == 1 {
                warn!("no capture frame — holding last canvas");
            }
            return Ok(());
        };
        self.capture_failures = 0;

        self.tracker.update(&frame);
        let gestures = self.classifier.read_frame(&mut self.tracker, &frame);
        self.manager.update(&gestures, &self.tracker, now);

        self.canvas.clear(BACKGROUND);
        self.manager.render(&mut self.canvas, &mut self.scratch);

        self.last_gestures = gestures;
        Ok(())
    }

    /// Debug status column: FPS, hand distance, per-hand gesture and
    /// per-technique state.
    pub fn draw_status(&mut self, fps: f32) {
        let x = 12;
        let mut y = self.canvas.height as i32 - 120;
        let dim = argb(110, 110, 110);

        self.canvas
            .fill_rect(x - 4, y - 4, 140, 100, argb(10, 16, 28));

        let line = |canvas: &mut Canvas, text: &str, color: u32, y: &mut i32| {
            canvas.draw_label(text, x, *y, 1, color);
            *y += 12;
        };

        line(&mut self.canvas, &format!("FPS: {fps:.0}"), argb(0, 180, 180), &mut y);

        let dist_text = match self.last_gestures.hand_distance {
            Some(d) => format!("DIST: {d:.3}"),
            None => "DIST: ---".to_string(),
        };
        line(&mut self.canvas, &dist_text, dim, &mut y);

        let left = self.tracker.hand(Chirality::Left);
        let right = self.tracker.hand(Chirality::Right);
        let hand_line = |present: bool, gesture: hand_sense::Gesture, tag: &str| {
            if present {
                format!("{tag}: {}", gesture.as_str().to_uppercase())
            } else {
                format!("{tag}: ---")
            }
        };
        line(
            &mut self.canvas,
            &hand_line(left.present, self.last_gestures.left, "L"),
            argb(100, 180, 255),
            &mut y,
        );
        line(
            &mut self.canvas,
            &hand_line(right.present, self.last_gestures.right, "R"),
            argb(255, 120, 100),
            &mut y,
        );

        line(
            &mut self.canvas,
            &format!("BLUE: {}", self.manager.blue_state().as_str()),
            argb(50, 180, 255),
            &mut y,
        );
        line(
            &mut self.canvas,
            &format!("RED: {}", self.manager.red_state().as_str()),
            argb(255, 80, 50),
            &mut y,
        );
        line(
            &mut self.canvas,
            &format!("PURPLE: {}", self.manager.purple_state().as_str()),
            argb(220, 80, 255),
            &mut y,
        );
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the engine against the simulation source until the window closes.
pub fn run(cfg: EngineConfig) -> Result<(), EngineError> {
    let (sim_tx, sim_rx) = mpsc::channel();
    let mut vis = Visualizer::new(
        "VOID ENGINE — Cursed Energy",
        cfg.canvas_width,
        cfg.canvas_height,
        sim_tx,
    )?;
    let mut source = SimSource::new(sim_rx);
    let mut engine = Engine::new(cfg);

    info!("engine running — simulation input active");

    let start = Instant::now();
    let mut fps = 0.0_f32;
    let mut frame_count = 0_u32;
    let mut fps_timer = Instant::now();

    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        let frame = source.poll()?;
        engine.step(frame, start.elapsed())?;

        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            fps = frame_count as f32 / elapsed;
            frame_count = 0;
            fps_timer = Instant::now();
        }

        engine.draw_status(fps);
        vis.present(engine.canvas())?;
    }

    info!("engine stopped");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique::TechniqueState;
    use hand_sense::landmarks::synth;
    use hand_sense::Point;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn crossed_landmarks_spawn_blue_end_to_end() {
        let mut engine = Engine::new(EngineConfig::default());
        let frame = FrameInput::of(vec![synth::crossed_fingers(
            Chirality::Left,
            Point::new(0.5, 0.5),
        )]);
        engine.step(Some(frame), secs(0.0)).unwrap();
        assert_eq!(engine.manager().blue_state(), TechniqueState::Spawning);
    }

    #[test]
    fn apart_landmarks_spawn_red_end_to_end() {
        let mut engine = Engine::new(EngineConfig::default());
        let frame = FrameInput::of(vec![
            synth::open_hand(Chirality::Left, Point::new(0.05, 0.5)),
            synth::open_hand(Chirality::Right, Point::new(0.95, 0.5)),
        ]);
        engine.step(Some(frame), secs(0.0)).unwrap();
        assert_eq!(engine.manager().red_state(), TechniqueState::Spawning);
    }

    #[test]
    fn capture_failure_holds_canvas_then_stalls() {
        let mut cfg = EngineConfig::default();
        cfg.capture_stall_limit = 5;
        let mut engine = Engine::new(cfg);

        // Render one real frame with an active effect.
        let frame = FrameInput::of(vec![synth::crossed_fingers(
            Chirality::Left,
            Point::new(0.5, 0.5),
        )]);
        engine.step(Some(frame), secs(0.0)).unwrap();
        engine.step(Some(FrameInput::empty()), secs(0.5)).unwrap();
        let held: Vec<u32> = engine.canvas().buffer().to_vec();

        // Failures below the bound hold the canvas and succeed.
        for i in 1..5 {
            assert!(engine.step(None, secs(0.5 + i as f32 / 30.0)).is_ok());
            assert_eq!(engine.canvas().buffer(), &held[..], "canvas not held");
        }
        // The bound itself is fatal.
        let err = engine.step(None, secs(1.0)).unwrap_err();
        assert!(matches!(err, EngineError::CaptureStalled { frames: 5 }));
    }

    #[test]
    fn capture_recovery_resets_the_stall_counter() {
        let mut cfg = EngineConfig::default();
        cfg.capture_stall_limit = 3;
        let mut engine = Engine::new(cfg);

        for _ in 0..2 {
            engine.step(None, secs(0.0)).unwrap();
        }
        engine.step(Some(FrameInput::empty()), secs(0.1)).unwrap();
        for _ in 0..2 {
            assert!(engine.step(None, secs(0.2)).is_ok());
        }
    }

    #[test]
    fn missing_hands_are_not_an_error() {
        let mut engine = Engine::new(EngineConfig::default());
        for i in 0..10 {
            engine
                .step(Some(FrameInput::empty()), secs(i as f32 / 30.0))
                .unwrap();
        }
        assert_eq!(engine.manager().blue_state(), TechniqueState::Inactive);
    }

    #[test]
    fn status_column_draws_without_panicking() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.step(Some(FrameInput::empty()), secs(0.0)).unwrap();
        engine.draw_status(30.0);
        assert!(engine.canvas().buffer().iter().any(|&p| p != 0));
    }
}
