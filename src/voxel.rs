use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Air,
    Dirt,
    Stone,
    CrackedStone,
    Wood,
    Glass,
    Bedrock,
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Air,
        BlockKind::Dirt,
        BlockKind::Stone,
        BlockKind::CrackedStone,
        BlockKind::Wood,
        BlockKind::Glass,
        BlockKind::Bedrock,
    ];

    pub fn is_physically_solid(self) -> bool {
        self != BlockKind::Air
    }

    /// Whether a player may place this block from the material palette.
    pub fn is_spawnable(self) -> bool {
        !matches!(self, BlockKind::Air | BlockKind::Bedrock)
    }

    /// Spawnable kinds in declaration order.
    pub fn spawnable() -> impl Iterator<Item = BlockKind> {
        Self::ALL.into_iter().filter(|kind| kind.is_spawnable())
    }
}

pub const CHUNK_SIZE: usize = 32;

pub type VoxelData3D = [[[BlockKind; CHUNK_SIZE]; CHUNK_SIZE]; CHUNK_SIZE];

pub fn fill(fill: BlockKind) -> VoxelData3D {
    [[[fill; CHUNK_SIZE]; CHUNK_SIZE]; CHUNK_SIZE]
}
