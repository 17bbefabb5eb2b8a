mod collision;
mod motion;

pub use motion::MotionIntegrator;
pub use motion::MotionTuning;

pub use collision::Axis;
pub use collision::CapFace;
pub use collision::CollisionResolver;
pub use collision::Footprint;
pub use collision::Hull;
pub use collision::Voxel;
pub use collision::WallFace;
pub use collision::{cap_candidates, penetrates, wall_candidates};
