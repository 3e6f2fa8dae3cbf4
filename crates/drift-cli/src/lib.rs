//! Native headless runner for Drift.
//!
//! Drives the same [`FrameLoop`](drift_core::FrameLoop) as the browser, with
//! a paced frame source standing in for `requestAnimationFrame` and SVG text
//! standing in for the canvas.

pub mod args;
pub mod clock;
pub mod headless;
pub mod logging;
pub mod run;

pub use args::{Args, Command, RunOptions};
pub use clock::{FrameClock, FrameTiming, PacedFrames};
pub use headless::{HeadlessDriven, HeadlessSurface};
pub use logging::{LoggingConfig, init_logging};
pub use run::{RunSummary, execute, run_simulation};
