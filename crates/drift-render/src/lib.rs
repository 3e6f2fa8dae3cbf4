pub mod hit;
pub mod paint;
pub mod scene;
pub mod svg;

pub use hit::pick_particle;
pub use paint::{IndexOverlay, PaintOptions, Theme, paint_world};
pub use scene::{Color, DisplayList, DrawCmd};
pub use svg::to_svg;
