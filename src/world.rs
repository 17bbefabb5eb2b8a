use std::collections::HashMap;

use glam::{DVec3, IVec3};
use parking_lot::RwLock;

use crate::{
    BlockKind,
    actions::BlockEditSink,
    physics::Voxel,
    voxel::{CHUNK_SIZE, VoxelData3D, fill},
};

const CHUNK: i32 = CHUNK_SIZE as i32;

/// Position of the chunk holding `pos`, in chunk units.
pub fn chunk_pos(pos: IVec3) -> IVec3 {
    IVec3::new(
        pos.x.div_euclid(CHUNK),
        pos.y.div_euclid(CHUNK),
        pos.z.div_euclid(CHUNK),
    )
}

fn local_pos(pos: IVec3) -> [usize; 3] {
    [
        pos.x.rem_euclid(CHUNK) as usize,
        pos.y.rem_euclid(CHUNK) as usize,
        pos.z.rem_euclid(CHUNK) as usize,
    ]
}

/// In-memory block grid made of 32^3 chunks. Chunks that were never written
/// are unloaded and answer `None`.
pub struct VoxelWorld {
    chunks: RwLock<HashMap<IVec3, Box<VoxelData3D>>>,
    spawn_point: DVec3,
}

impl VoxelWorld {
    pub fn new(spawn_point: DVec3) -> Self {
        Self {
            chunks: RwLock::new(HashMap::new()),
            spawn_point,
        }
    }

    pub fn spawn_point(&self) -> DVec3 {
        self.spawn_point
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_loaded(&self, pos: IVec3) -> bool {
        self.chunks.read().contains_key(&chunk_pos(pos))
    }

    /// Writes a block, loading its chunk as air first if needed.
    pub fn put(&self, pos: IVec3, kind: BlockKind) {
        let mut chunks = self.chunks.write();
        let chunk = chunks
            .entry(chunk_pos(pos))
            .or_insert_with(|| Box::new(fill(BlockKind::Air)));
        let [x, y, z] = local_pos(pos);
        chunk[x][y][z] = kind;
    }

    /// Fills the inclusive box `min..=max`.
    pub fn fill_box(&self, min: IVec3, max: IVec3, kind: BlockKind) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.put(IVec3::new(x, y, z), kind);
                }
            }
        }
    }
}

impl Voxel for VoxelWorld {
    fn block_at(&self, pos: IVec3) -> Option<BlockKind> {
        let chunks = self.chunks.read();
        let chunk = chunks.get(&chunk_pos(pos))?;
        let [x, y, z] = local_pos(pos);
        Some(chunk[x][y][z])
    }
}

impl BlockEditSink for VoxelWorld {
    fn set_block(&mut self, pos: IVec3, kind: BlockKind) {
        self.put(pos, kind);
    }
}
