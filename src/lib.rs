use glam::{DVec3, IVec3};

pub mod physics;

pub mod actions;
mod actor;
pub mod config;
pub mod console;
pub mod error;
pub mod input;
pub mod orientation;
mod player;
mod time;
mod voxel;
mod world;

pub fn block(v: DVec3) -> IVec3 {
    v.floor().as_ivec3()
}

pub fn block_coord(n: f64) -> i32 {
    n.floor() as i32
}

pub use actions::{BlockEditSink, BlockPicker, GameMode};
pub use actor::{ActorState, Orientation, VerticalState};
pub use config::Tuning;
pub use input::{InputFrame, InputSource, Intent};
pub use player::{Player, PlayerSnapshot, SkipReason, StepOutcome};
pub use time::{DeltaTime, DeltaTimeMeter};
pub use voxel::BlockKind;
pub use world::VoxelWorld;
