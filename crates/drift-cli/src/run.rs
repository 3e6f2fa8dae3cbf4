//! Command execution.

use crate::args::{Command, RunOptions, USAGE};
use crate::clock::{FrameTiming, PacedFrames};
use crate::headless::{HeadlessDriven, HeadlessSurface};
use drift_core::{FrameLoop, FrameReport, V2, WorldConfig};
use std::path::PathBuf;

/// What a finished `drift run` produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: FrameReport,
    /// Deltas between paced frames; empty when no waits happened.
    pub timing: FrameTiming,
    pub particles: usize,
    /// Last drawn frame.
    pub svg: String,
    pub written_to: Option<PathBuf>,
}

/// Execute a parsed command, printing its output to stdout.
pub fn execute(command: Command) -> Result<(), String> {
    match command {
        Command::Help => println!("{USAGE}"),
        Command::Version => println!("drift {}", env!("CARGO_PKG_VERSION")),
        Command::Config { browser } => {
            let config = if browser {
                WorldConfig::browser()
            } else {
                WorldConfig::default()
            };
            println!("{}", config.to_json());
        }
        Command::Run(options) => {
            let summary = run_simulation(&options)?;
            println!(
                "{} frames, {} particles ({:?})",
                summary.report.frames, summary.particles, summary.report.stop
            );
            if let Some(mean) = summary.timing.mean() {
                println!(
                    "frame delta mean {mean:?}, longest {:?}",
                    summary.timing.longest
                );
            }
            if let Some(path) = &summary.written_to {
                println!("wrote {}", path.display());
            }
        }
    }
    Ok(())
}

/// Load the world config for `options`: file first, then the `--index` override.
pub fn load_config(options: &RunOptions) -> Result<WorldConfig, String> {
    let mut config = match &options.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            WorldConfig::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => WorldConfig::default(),
    };
    if let Some(index) = options.index {
        config.index = index;
    }
    Ok(config)
}

/// Prime the headless engine and run `options.frames` evolve/draw pairs.
pub fn run_simulation(options: &RunOptions) -> Result<RunSummary, String> {
    let config = load_config(options)?;
    let layout = V2::new(options.width, options.height);
    let surface = HeadlessSurface {
        layout,
        device_pixel_ratio: options.dpr,
        config,
        seed: options.seed,
        overlay: options.overlay,
        hud: options.hud,
        pointer: options.overlay.then(|| layout.scale(0.5)),
    };

    let mut frame_loop = FrameLoop::<HeadlessDriven>::launch(|| Ok(()), |()| Ok(surface))
        .map_err(|e| e.to_string())?;

    let (report, timing) = if options.frames == 0 {
        log::info!("no frames requested, stopping after priming");
        let report = FrameReport {
            frames: 0,
            stop: drift_core::StopReason::HostClosed,
        };
        (report, FrameTiming::default())
    } else {
        // `run` draws once before its first wait, so the source yields one frame fewer.
        let mut source = PacedFrames::new(options.frames - 1, options.fps);
        let report = frame_loop.run(&mut source).map_err(|e| e.to_string())?;
        (report, source.timing())
    };

    let engine = frame_loop.into_driven();
    let written_to = match &options.svg {
        Some(path) if !engine.svg().is_empty() => {
            std::fs::write(path, engine.svg())
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            log::info!("snapshot written to {}", path.display());
            Some(path.clone())
        }
        _ => None,
    };

    Ok(RunSummary {
        report,
        timing,
        particles: engine.world().particles.len(),
        svg: engine.svg().to_string(),
        written_to,
    })
}
