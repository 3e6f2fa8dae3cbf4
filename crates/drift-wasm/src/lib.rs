//! WASM bridge for Drift: exposes the particle world to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. A page can either drive
//! [`CanvasDriven`] itself (see `web/index.js`) or call [`start`], which runs
//! the same frame driver on `requestAnimationFrame`.

mod logger;
mod render2d;

use drift_core::{
    CancelToken, DriveError, Driven, FrameLoop, SpatialIndex, Step, SurfaceSize, V2, World,
    WorldConfig,
};
use drift_render::{PaintOptions, Theme, paint_world, pick_particle};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

const CONSOLE_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// A particle world bound to one `<canvas>`.
#[wasm_bindgen]
pub struct CanvasDriven {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    world: World,
    hud: Hud,
}

/// The timing line drawn in the corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Hud {
    visible: bool,
    /// Duration of the last evolve, in milliseconds.
    last_evolve_ms: f64,
}

impl Hud {
    fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    fn line(&self) -> Option<String> {
        self.visible
            .then(|| format!("Evolve: {:.2}ms", self.last_evolve_ms))
    }
}

#[wasm_bindgen]
impl CanvasDriven {
    /// Bind a world to `canvas`, sized to its backing store.
    pub fn new(canvas: HtmlCanvasElement) -> Result<CanvasDriven, JsValue> {
        <Self as Driven>::construct(canvas).map_err(|e| JsValue::from_str(&e))
    }

    /// Like [`new`](Self::new) with a JSON world config; omitted fields keep the browser defaults.
    pub fn with_config(canvas: HtmlCanvasElement, json: &str) -> Result<CanvasDriven, JsValue> {
        let config = browser_config(json).map_err(|e| JsValue::from_str(&e))?;
        Self::bind(canvas, config).map_err(|e| JsValue::from_str(&e))
    }

    /// Advance the world one step.
    pub fn evolve(&mut self) {
        self.advance();
    }

    /// Clear the canvas and paint the current state.
    pub fn draw(&mut self) -> Result<(), JsValue> {
        self.render()
    }

    /// Pointer in canvas backing-store pixels. A pressed pointer attracts particles.
    pub fn set_pointer(&mut self, x: f64, y: f64, pressed: bool) {
        self.world.set_pointer(Some(V2::new(x, y)), pressed);
    }

    pub fn clear_pointer(&mut self) {
        self.world.set_pointer(None, false);
    }

    /// Flip the index overlay; returns the new state.
    pub fn toggle_overlay(&mut self) -> bool {
        let show = !self.world.show_overlay();
        self.world.set_show_overlay(show);
        show
    }

    pub fn set_hud(&mut self, show: bool) {
        self.hud.visible = show;
    }

    /// Flip the timing line; returns the new state.
    pub fn toggle_hud(&mut self) -> bool {
        self.hud.toggle()
    }

    /// Resize the backing store and the world to match.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.world.resize(V2::new(width as f64, height as f64));
    }

    /// Index of the particle nearest `(x, y)` within `radius`, or -1.
    pub fn pick(&self, x: f64, y: f64, radius: f64) -> i32 {
        pick_particle(&self.world, V2::new(x, y), radius)
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(-1)
    }

    /// World statistics as JSON.
    pub fn stats(&self) -> String {
        world_stats(&self.world, self.hud.last_evolve_ms).to_string()
    }
}

impl CanvasDriven {
    fn bind(canvas: HtmlCanvasElement, config: WorldConfig) -> Result<Self, String> {
        logger::init(CONSOLE_LEVEL);
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("canvas context lookup failed: {e:?}"))?
            .ok_or("canvas has no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "2d context has an unexpected type".to_string())?;

        let size = V2::new(canvas.width() as f64, canvas.height() as f64);
        let count = config.particle_count;
        let mut world = World::from_config(size, config);
        world.add_random_particles(count, js_sys::Math::random);
        log::info!(
            "canvas world {}x{} with {count} particles",
            canvas.width(),
            canvas.height()
        );

        Ok(Self {
            canvas,
            ctx,
            world,
            hud: Hud::default(),
        })
    }

    fn advance(&mut self) {
        let started = now_ms();
        self.world.step();
        if let (Some(start), Some(end)) = (started, now_ms()) {
            self.hud.last_evolve_ms = end - start;
        }
    }

    fn render(&mut self) -> Result<(), JsValue> {
        let options = PaintOptions {
            scale: 1.0,
            hud: self.hud.line(),
            theme: Theme::transparent(),
        };
        let list = paint_world(&self.world, &options);
        render2d::execute(
            &self.ctx,
            &list,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        )
    }
}

impl Driven for CanvasDriven {
    type Surface = HtmlCanvasElement;

    fn construct(canvas: HtmlCanvasElement) -> Result<Self, String> {
        Self::bind(canvas, WorldConfig::browser())
    }

    fn evolve(&mut self) -> Result<(), String> {
        self.advance();
        Ok(())
    }

    fn draw(&mut self) -> Result<(), String> {
        self.render().map_err(|e| format!("{e:?}"))
    }
}

// ─── Browser frame driver ────────────────────────────────────────────────

type BrowserLoop = Rc<RefCell<FrameLoop<CanvasDriven>>>;

/// Handle to a running [`start`] loop.
#[wasm_bindgen]
pub struct FrameHandle {
    cancel: CancelToken,
    frame_loop: BrowserLoop,
}

#[wasm_bindgen]
impl FrameHandle {
    /// Stop after the current evolve/draw pair.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Completed evolve/draw pairs.
    pub fn frames(&self) -> f64 {
        self.frame_loop
            .try_borrow()
            .map(|l| l.frames() as f64)
            .unwrap_or(0.0)
    }
}

/// Create a full-page canvas, bind a [`CanvasDriven`] to it and animate it.
#[wasm_bindgen]
pub fn start() -> Result<FrameHandle, JsValue> {
    let frame_loop = FrameLoop::<CanvasDriven>::launch(init_module, create_canvas)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let frame_loop: BrowserLoop = Rc::new(RefCell::new(frame_loop));

    // The first pair runs right after priming; later pairs wait for a frame.
    let first = frame_loop
        .borrow_mut()
        .step()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if first == Step::Continued {
        animate(Rc::clone(&frame_loop))?;
    }
    let cancel = frame_loop.borrow().cancel_token();
    Ok(FrameHandle { cancel, frame_loop })
}

fn init_module() -> Result<Window, String> {
    logger::init(CONSOLE_LEVEL);
    web_sys::window().ok_or_else(|| "no global window".to_string())
}

fn create_canvas(window: Window) -> Result<HtmlCanvasElement, String> {
    let document = window.document().ok_or("window has no document")?;
    let body = document.body().ok_or("document has no body")?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| format!("cannot create canvas: {e:?}"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| "created element is not a canvas".to_string())?;
    body.append_child(&canvas)
        .map_err(|e| format!("cannot attach canvas: {e:?}"))?;

    let size = SurfaceSize::from_layout(
        canvas.offset_width() as f64,
        canvas.offset_height() as f64,
        window.device_pixel_ratio(),
    );
    canvas.set_width(size.width);
    canvas.set_height(size.height);
    log::debug!("canvas backing store {}x{}", size.width, size.height);
    Ok(canvas)
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no global window"))?
        .request_animation_frame(f.as_ref().unchecked_ref())
}

fn animate(frame_loop: BrowserLoop) -> Result<(), JsValue> {
    #[allow(clippy::type_complexity)]
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = Rc::clone(&f);

    *g.borrow_mut() = Some(Closure::new(move || {
        let step = frame_loop.borrow_mut().step();
        let frames = frame_loop.borrow().frames();
        let scheduled = keeps_running(&step, frames)
            && matches!(
                f.borrow().as_ref().map(request_animation_frame),
                Some(Ok(_))
            );
        if !scheduled {
            if matches!(step, Ok(Step::Continued)) {
                log::info!("host closed after {frames} frames");
            }
            // Dropping the closure breaks the Rc cycle and frees the loop.
            let _ = f.borrow_mut().take();
        }
    }));

    match g.borrow().as_ref() {
        Some(closure) => request_animation_frame(closure).map(|_| ()),
        None => Ok(()),
    }
}

/// Whether the loop should ask for another frame after `step`.
fn keeps_running(step: &Result<Step, DriveError>, frames: u64) -> bool {
    match step {
        Ok(Step::Continued) => true,
        Ok(Step::Cancelled) => {
            log::info!("frame loop cancelled after {frames} frames");
            false
        }
        Err(e) => {
            log::error!("frame loop stopped: {e}");
            false
        }
    }
}

fn now_ms() -> Option<f64> {
    Some(web_sys::window()?.performance()?.now())
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Browser preset overridden by the fields present in `json`.
fn browser_config(json: &str) -> Result<WorldConfig, String> {
    let mut merged = serde_json::to_value(WorldConfig::browser())
        .map_err(|e| format!("cannot encode defaults: {e}"))?;
    let overrides: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("invalid world config: {e}"))?;
    match (&mut merged, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(fields)) => {
            base.extend(fields);
        }
        _ => return Err("world config must be a JSON object".to_string()),
    }
    WorldConfig::from_json(&merged.to_string())
}

fn world_stats(world: &World, last_evolve_ms: f64) -> serde_json::Value {
    let size = world.dimensions();
    serde_json::json!({
        "particles": world.particles.len(),
        "steps": world.steps(),
        "index": world.index().kind().as_str(),
        "width": size.x,
        "height": size.y,
        "overlay": world.show_overlay(),
        "kinetic_energy": world.kinetic_energy(),
        "last_evolve_ms": last_evolve_ms,
    })
}
