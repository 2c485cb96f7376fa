//! # void_engine
//!
//! Converts classified two-hand gestures into a small family of animated
//! "cursed energy" techniques and renders them procedurally onto a canvas.
//!
//! ## Gesture → Technique mapping
//!
//! | Gesture | Hand | Effect |
//! |---|---|---|
//! | Crossed fingers | Left | Spawn **Blue** at the left hand |
//! | Hands apart | Both | Spawn **Red** at the right hand |
//! | Fist | Left | Dismiss Blue |
//! | Fist | Right | Dismiss Red |
//! | Blue and Red collide | — | Cinematic merge into **Purple** |
//! | Crossed fingers | Right | **Domain Expansion** — destroys Purple |
//!
//! ## Technique lifecycle
//!
//! ```text
//! INACTIVE ──► SPAWNING ──► ACTIVE ──► INACTIVE
//!                              │
//!            Blue+Red collide  ▼
//!                  ┌──────► BLENDING ──► ACTIVE (Purple)
//!                  │                        │
//!                  │       right crossed    ▼
//!                  │                    EXPANDING ──► CLEARING ──► INACTIVE
//!                  └─── all input locked while blending/expanding ───┘
//! ```
//!
//! All sequence timing is wall-clock driven (`now` injected by the caller),
//! so blend and explosion durations are identical at any frame rate.  All
//! persistent state lives in one explicit [`app::Engine`] context; the
//! merge jitter and explosion scatter draw from a seeded RNG so the
//! cinematics are reproducible.
//!
//! ## Simulation mode
//!
//! Without a real landmark provider the engine runs against
//! [`source::SimSource`], two keyboard-driven synthetic hands:
//!
//! | Key | Action |
//! |---|---|
//! | `W`/`A`/`S`/`D` | Move the left hand |
//! | Arrow keys | Move the right hand |
//! | `F` / `C` | Left hand: toggle fist / crossed fingers |
//! | `K` / `M` | Right hand: toggle fist / crossed fingers |
//! | `1` / `2` | Toggle left / right hand visibility |
//! | `Q` | Quit |

pub mod config;
pub mod canvas;
pub mod energy;
pub mod technique;
pub mod source;
pub mod visualizer;
pub mod error;
pub mod app;

pub use app::{run, Engine};
pub use config::EngineConfig;
pub use error::EngineError;
