//! CLI argument parsing.
//!
//! Accepts any iterator of strings so parsing is testable without
//! touching `std::env::args()`.

use drift_core::IndexKind;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage:
  drift run [options]       run the fluid headless and write an SVG snapshot
  drift config [--browser]  print a world config with every field filled in
  drift help                show this message
  drift version             show the version

Run options:
  --frames N     evolve/draw pairs to run (default 120)
  --fps N        pace frames at N per second, 0 runs unpaced (default 60)
  --seed N       random seed for the initial particles (default 0)
  --index KIND   quadtree | zorder | rtree
  --config FILE  world config JSON; omitted fields keep their defaults
  --svg FILE     write the last frame to FILE
  --width W      layout width in world units (default 320)
  --height H     layout height in world units (default 240)
  --dpr R        device pixel ratio of the snapshot (default 2)
  --overlay      draw the spatial index overlay
  --hud          draw the evolve timing line
  -v, --verbose  debug logging";

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub command: Command,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(RunOptions),
    /// Print the default (or browser) world config as JSON.
    Config { browser: bool },
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub frames: u64,
    /// `None` runs as fast as possible.
    pub fps: Option<f64>,
    pub seed: u64,
    pub index: Option<IndexKind>,
    pub config: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    pub overlay: bool,
    pub hud: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 120,
            fps: Some(60.0),
            seed: 0,
            index: None,
            config: None,
            svg: None,
            width: 320.0,
            height: 240.0,
            dpr: 2.0,
            overlay: false,
            hud: false,
        }
    }
}

impl Args {
    /// Parse arguments; the first item is the program name.
    ///
    /// # Errors
    /// Returns a message for unknown commands, unknown flags, missing
    /// values, and values that do not parse.
    pub fn parse_from<I, S>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        let rest = args.get(2..).unwrap_or_default();
        let verbose = rest.iter().any(|a| a == "-v" || a == "--verbose");

        let command = match args.get(1).map(String::as_str) {
            None | Some("-h" | "--help" | "help") => Command::Help,
            Some("-V" | "--version" | "version") => Command::Version,
            Some("run") => Command::Run(parse_run(rest)?),
            Some("config") => Command::Config {
                browser: parse_config(rest)?,
            },
            Some(unknown) => return Err(format!("unknown command: {unknown}")),
        };
        Ok(Self { command, verbose })
    }

    pub fn parse() -> Result<Self, String> {
        Self::parse_from(std::env::args())
    }
}

fn parse_run(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions::default();
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--frames" => options.frames = value(&mut it, flag)?,
            "--fps" => {
                let fps: f64 = value(&mut it, flag)?;
                if !(fps.is_finite() && fps >= 0.0) {
                    return Err(format!("--fps must be a non-negative number, got {fps}"));
                }
                options.fps = (fps > 0.0).then_some(fps);
            }
            "--seed" => options.seed = value(&mut it, flag)?,
            "--index" => options.index = Some(value(&mut it, flag)?),
            "--config" => options.config = Some(PathBuf::from(raw(&mut it, flag)?)),
            "--svg" => options.svg = Some(PathBuf::from(raw(&mut it, flag)?)),
            "--width" => options.width = positive(&mut it, flag)?,
            "--height" => options.height = positive(&mut it, flag)?,
            "--dpr" => options.dpr = positive(&mut it, flag)?,
            "--overlay" => options.overlay = true,
            "--hud" => options.hud = true,
            "-v" | "--verbose" => {}
            unknown => return Err(format!("unknown option for run: {unknown}")),
        }
    }
    Ok(options)
}

fn parse_config(args: &[String]) -> Result<bool, String> {
    let mut browser = false;
    for arg in args {
        match arg.as_str() {
            "--browser" => browser = true,
            "-v" | "--verbose" => {}
            unknown => return Err(format!("unknown option for config: {unknown}")),
        }
    }
    Ok(browser)
}

fn raw<'a>(it: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str, String> {
    it.next()
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} needs a value"))
}

fn value<'a, T>(it: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let text = raw(it, flag)?;
    text.parse()
        .map_err(|e| format!("invalid value for {flag}: {text} ({e})"))
}

fn positive<'a>(it: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<f64, String> {
    let v: f64 = value(it, flag)?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("{flag} must be a positive number, got {v}"))
    }
}
