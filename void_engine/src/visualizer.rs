//! Software-rendered output window using `minifb`.
//!
//! Owns the window and the sender half of the simulation input channel.
//! Each frame the run loop polls keys here (translated to [`SimInput`])
//! and presents the engine's canvas buffer.

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::sync::mpsc::Sender;

use crate::canvas::Canvas;
use crate::error::EngineError;
use crate::source::SimInput;

/// Normalized movement per held-key repeat.
const MOVE_STEP: f32 = 0.012;

pub struct Visualizer {
    window: Window,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(
        title: &str,
        width: usize,
        height: usize,
        sim_tx: Sender<SimInput>,
    ) -> Result<Self, EngineError> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| EngineError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps cap

        Ok(Visualizer { window, sim_tx })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard inputs and translate to `SimInput` events.
    /// Returns false when the window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);
        let held = |w: &Window, k: Key| w.is_key_down(k);

        if one_shot(&self.window, Key::Q) {
            return false;
        }

        // Pose toggles
        if one_shot(&self.window, Key::F) {
            let _ = self.sim_tx.send(SimInput::ToggleLeftFist);
        }
        if one_shot(&self.window, Key::C) {
            let _ = self.sim_tx.send(SimInput::ToggleLeftCrossed);
        }
        if one_shot(&self.window, Key::K) {
            let _ = self.sim_tx.send(SimInput::ToggleRightFist);
        }
        if one_shot(&self.window, Key::M) {
            let _ = self.sim_tx.send(SimInput::ToggleRightCrossed);
        }
        if one_shot(&self.window, Key::Key1) {
            let _ = self.sim_tx.send(SimInput::ToggleLeftVisible);
        }
        if one_shot(&self.window, Key::Key2) {
            let _ = self.sim_tx.send(SimInput::ToggleRightVisible);
        }

        // Left hand movement (WASD, screen-space)
        let mut ldx = 0.0;
        let mut ldy = 0.0;
        if held(&self.window, Key::A) {
            ldx -= MOVE_STEP;
        }
        if held(&self.window, Key::D) {
            ldx += MOVE_STEP;
        }
        if held(&self.window, Key::W) {
            ldy -= MOVE_STEP;
        }
        if held(&self.window, Key::S) {
            ldy += MOVE_STEP;
        }
        if ldx != 0.0 || ldy != 0.0 {
            let _ = self.sim_tx.send(SimInput::MoveLeft(ldx, ldy));
        }

        // Right hand movement (arrows)
        let mut rdx = 0.0;
        let mut rdy = 0.0;
        if held(&self.window, Key::Left) {
            rdx -= MOVE_STEP;
        }
        if held(&self.window, Key::Right) {
            rdx += MOVE_STEP;
        }
        if held(&self.window, Key::Up) {
            rdy -= MOVE_STEP;
        }
        if held(&self.window, Key::Down) {
            rdy += MOVE_STEP;
        }
        if rdx != 0.0 || rdy != 0.0 {
            let _ = self.sim_tx.send(SimInput::MoveRight(rdx, rdy));
        }

        true
    }

    /// Present one canvas frame.
    pub fn present(&mut self, canvas: &Canvas) -> Result<(), EngineError> {
        self.window
            .update_with_buffer(canvas.buffer(), canvas.width, canvas.height)
            .map_err(|e| EngineError::Window(e.to_string()))
    }
}
