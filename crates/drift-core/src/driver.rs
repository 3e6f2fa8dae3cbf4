//! Frame driver: owns the update/render cadence of one driven engine.
//!
//! The host initializes, builds one surface, constructs exactly one driven
//! instance bound to it, advances it once (priming) and then repeats
//! `evolve` → `draw` → wait for the next animation frame. `evolve` always
//! precedes `draw` within a frame, and a draw never races an evolve.
//!
//! The loop stops only when its [`CancelToken`] is cancelled (after a
//! complete evolve/draw pair), when the [`FrameSource`] reports that the
//! host went away, or on the first engine failure. Failures are fatal and
//! are never retried.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A replaceable backend advanced and rendered once per frame.
pub trait Driven: Sized {
    /// The drawing surface the engine binds to at construction.
    type Surface;

    fn construct(surface: Self::Surface) -> Result<Self, String>;

    /// Advance internal state by one discrete step.
    fn evolve(&mut self) -> Result<(), String>;

    /// Render current state to the bound surface.
    fn draw(&mut self) -> Result<(), String>;
}

/// Host pacing primitive: blocks or suspends until the next animation frame.
pub trait FrameSource {
    /// Returns `false` once the host has been torn down and no frame will follow.
    fn next_frame(&mut self) -> bool;
}

impl<F: FnMut() -> bool> FrameSource for F {
    fn next_frame(&mut self) -> bool {
        self()
    }
}

/// Fatal driver failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveError {
    /// Module initialization failed; nothing was constructed.
    Init(String),
    /// The surface could not be created or the engine refused it.
    Construct(String),
    /// `evolve` failed. Frame 0 is the priming step.
    Evolve { frame: u64, reason: String },
    /// `draw` failed on the given frame.
    Draw { frame: u64, reason: String },
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::Init(reason) => write!(f, "initialization failed: {reason}"),
            DriveError::Construct(reason) => write!(f, "construction failed: {reason}"),
            DriveError::Evolve { frame, reason } => {
                write!(f, "evolve failed on frame {frame}: {reason}")
            }
            DriveError::Draw { frame, reason } => {
                write!(f, "draw failed on frame {frame}: {reason}")
            }
        }
    }
}

impl std::error::Error for DriveError {}

/// Shared cancellation flag for a running loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome of one [`FrameLoop::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One evolve/draw pair completed.
    Continued,
    /// The token was cancelled; the engine was not touched.
    Cancelled,
}

/// Why [`FrameLoop::run`] returned normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    HostClosed,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Completed evolve/draw pairs, not counting the priming step.
    pub frames: u64,
    pub stop: StopReason,
}

/// Drives exactly one engine instance.
pub struct FrameLoop<D: Driven> {
    driven: D,
    frames: u64,
    cancel: CancelToken,
}

impl<D: Driven> FrameLoop<D> {
    /// Run module initialization, build the surface, then construct and prime.
    ///
    /// `make_surface` only runs after `init` succeeded, so a failed
    /// initialization never creates a surface.
    pub fn launch<M>(
        init: impl FnOnce() -> Result<M, String>,
        make_surface: impl FnOnce(M) -> Result<D::Surface, String>,
    ) -> Result<Self, DriveError> {
        let module = init().map_err(|reason| {
            log::error!("module initialization failed: {reason}");
            DriveError::Init(reason)
        })?;
        let surface = make_surface(module).map_err(DriveError::Construct)?;
        Self::prime(surface)
    }

    /// Construct the single driven instance and advance it once before any draw.
    pub fn prime(surface: D::Surface) -> Result<Self, DriveError> {
        let mut driven = D::construct(surface).map_err(DriveError::Construct)?;
        driven
            .evolve()
            .map_err(|reason| DriveError::Evolve { frame: 0, reason })?;
        log::debug!("driven instance constructed and primed");
        Ok(Self {
            driven,
            frames: 0,
            cancel: CancelToken::new(),
        })
    }

    /// Evolve then draw one frame, unless cancelled.
    pub fn step(&mut self) -> Result<Step, DriveError> {
        if self.cancel.is_cancelled() {
            return Ok(Step::Cancelled);
        }
        let frame = self.frames + 1;
        self.driven
            .evolve()
            .map_err(|reason| DriveError::Evolve { frame, reason })?;
        self.driven
            .draw()
            .map_err(|reason| DriveError::Draw { frame, reason })?;
        self.frames = frame;
        log::trace!("frame {frame} drawn");
        Ok(Step::Continued)
    }

    /// Loop `step` → `source.next_frame()` until cancelled, closed, or failed.
    pub fn run(&mut self, source: &mut impl FrameSource) -> Result<FrameReport, DriveError> {
        log::info!("frame loop started");
        loop {
            let step = self.step().inspect_err(|e| log::error!("frame loop stopped: {e}"))?;
            if step == Step::Cancelled {
                return Ok(self.report(StopReason::Cancelled));
            }
            if !source.next_frame() {
                return Ok(self.report(StopReason::HostClosed));
            }
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn driven(&self) -> &D {
        &self.driven
    }

    pub fn driven_mut(&mut self) -> &mut D {
        &mut self.driven
    }

    pub fn into_driven(self) -> D {
        self.driven
    }

    fn report(&self, stop: StopReason) -> FrameReport {
        log::info!("frame loop stopped after {} frames ({stop:?})", self.frames);
        FrameReport {
            frames: self.frames,
            stop,
        }
    }
}
