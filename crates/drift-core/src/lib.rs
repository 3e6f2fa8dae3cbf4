pub mod config;
pub mod driver;
pub mod index;
pub mod math;
pub mod particle;
pub mod surface;
pub mod world;

pub use config::WorldConfig;
pub use driver::{
    CancelToken, DriveError, Driven, FrameLoop, FrameReport, FrameSource, Step, StopReason,
};
pub use index::{AnyIndex, IndexKind, QuadTree, RTreeIndex, SpatialIndex, ZOrderIndex};
pub use math::V2;
pub use particle::{Particle, Positioned};
pub use surface::SurfaceSize;
pub use world::{Neighbor, Pointer, World};
