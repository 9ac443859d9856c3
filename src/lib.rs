// Crate-level lints: Allow common graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // Intentional f32->i32, u32->i32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u32/i32->f32 in graphics calculations
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for our value ranges
#![allow(clippy::cast_sign_loss)] // f32->u32 where values are clamped first
#![allow(clippy::struct_excessive_bools)] // ConnectionState flags
#![allow(clippy::module_name_repetitions)] // HudState in hud, SseDecoder in sse

//! Live motorsport HUD.
//!
//! A camera feed composited onto two surfaces (full-screen main and a
//! picture-in-picture inset) with smoothed telemetry gauges drawn on top,
//! fed by two independent links that keep reconnecting on their own:
//!
//! ```text
//!  overlay server                     shared state                render loop (60 Hz)
//!  ──────────────                     ────────────                ───────────────────
//!  camera (MJPEG / still) ─> CameraLink ──> frame ───────────┐   1. composite main
//!                                       └─> camera_connected ├─> 2. composite inset
//!  /api/telemetry/stream ──> TelemetryLink ─> latest ────────┤   3. smoothing + gauges
//!                                        └─> telemetry_conn. ┘   4. FPS + status line
//! ```
//!
//! Data flows one way, links to state to render loop. Nothing the links do
//! can stop the render loop; they only change what it draws.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`surface`] | bitmaps, framebuffers and the [`surface::Canvas`] draw abstraction |
//! | [`compositor`] | camera frame to surface: crop, gradient, NO SIGNAL |
//! | [`smoothing`] | per-frame exponential smoothing of noisy channels |
//! | [`widgets`] | the gauges |
//! | [`camera`] | Camera Link: fixed-interval retry, freshness parameter |
//! | [`telemetry`] | snapshot model, event-stream decoder, Telemetry Link |
//! | [`render`] | per-frame work, status line, render loop |
//! | [`bootstrap`] | startup config fetch |
//! | [`state`] | shared state and stop handle |
//!
//! # Runtime
//!
//! Everything runs as local tasks on one current-thread tokio runtime. The
//! shared state is an `Rc<RefCell<_>>`; image decoding is the only work that
//! leaves the thread (blocking pool).

pub mod bootstrap;
pub mod camera;
pub mod clock;
pub mod colors;
pub mod compositor;
pub mod config;
pub mod error;
pub mod format;
pub mod profiling;
pub mod render;
pub mod smoothing;
pub mod state;
pub mod styles;
pub mod surface;
pub mod telemetry;
pub mod widgets;

pub use error::HudError;
