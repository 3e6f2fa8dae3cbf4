//! Headless driven engine: the particle world rendered to SVG text.

use drift_core::{Driven, SurfaceSize, V2, World, WorldConfig};
use drift_render::{PaintOptions, Theme, paint_world, to_svg};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Everything the engine needs at construction, the native stand-in for a canvas.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    /// Layout size in world units.
    pub layout: V2,
    pub device_pixel_ratio: f64,
    pub config: WorldConfig,
    pub seed: u64,
    pub overlay: bool,
    pub hud: bool,
    /// Optional fixed pointer, e.g. to show the overlay query circle.
    pub pointer: Option<V2>,
}

impl HeadlessSurface {
    /// Backing-store size in device pixels.
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::from_layout(self.layout.x, self.layout.y, self.device_pixel_ratio)
    }
}

pub struct HeadlessDriven {
    world: World,
    size: SurfaceSize,
    scale: f64,
    hud: bool,
    last_evolve: Duration,
    svg: String,
}

impl HeadlessDriven {
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// The most recent frame; empty until the first draw.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn last_evolve(&self) -> Duration {
        self.last_evolve
    }
}

impl Driven for HeadlessDriven {
    type Surface = HeadlessSurface;

    fn construct(surface: HeadlessSurface) -> Result<Self, String> {
        surface.config.validate()?;
        let size = surface.size();
        if size.is_empty() {
            return Err(format!(
                "surface {}x{} has no pixels",
                size.width, size.height
            ));
        }

        let count = surface.config.particle_count;
        let mut world = World::from_config(surface.layout, surface.config);
        let mut rng = StdRng::seed_from_u64(surface.seed);
        world.add_random_particles(count, || rng.r#gen::<f64>());
        world.set_show_overlay(surface.overlay);
        world.set_pointer(surface.pointer, false);
        log::info!(
            "headless world {}x{} ({}x{} px), {count} particles, {} index, seed {}",
            surface.layout.x,
            surface.layout.y,
            size.width,
            size.height,
            world.config().index,
            surface.seed
        );

        Ok(Self {
            world,
            size,
            scale: surface.device_pixel_ratio,
            hud: surface.hud,
            last_evolve: Duration::ZERO,
            svg: String::new(),
        })
    }

    fn evolve(&mut self) -> Result<(), String> {
        let started = Instant::now();
        self.world.step();
        self.last_evolve = started.elapsed();
        if self.world.particles.iter().any(|p| !p.position.is_finite()) {
            return Err("particle positions diverged".to_string());
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<(), String> {
        let options = PaintOptions {
            scale: self.scale,
            hud: self.hud.then(|| format!("Evolve: {:?}", self.last_evolve)),
            theme: Theme::dark(),
        };
        let list = paint_world(&self.world, &options);
        self.svg = to_svg(&list, self.size.width, self.size.height);
        Ok(())
    }
}
