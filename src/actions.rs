//! Block editing glue: game modes, the material palette and dispatch of
//! break/place actions to an external picker and edit sink.

use std::fmt;

use glam::{DVec2, DVec3, IVec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BlockKind, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Build,
    Play,
    Tourney,
}

impl GameMode {
    pub fn allows(self, kind: ActionKind) -> bool {
        match self {
            GameMode::Build => true,
            GameMode::Play => kind == ActionKind::Break,
            GameMode::Tourney => false,
        }
    }

    /// The material selector is only shown while building.
    pub fn shows_palette(self) -> bool {
        self == GameMode::Build
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "build" => Some(GameMode::Build),
            "play" => Some(GameMode::Play),
            "tourney" => Some(GameMode::Tourney),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameMode::Build => "build",
            GameMode::Play => "play",
            GameMode::Tourney => "tourney",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Break,
    Place,
}

/// Where on screen the picker should look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickTarget {
    /// Centre of the viewport.
    Crosshair,
    Screen(DVec2),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockAction {
    pub kind: ActionKind,
    pub target: PickTarget,
}

/// Input for ray selection. `min..=max` bounds the blocks worth testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRequest {
    pub eye: DVec3,
    pub orientation: Orientation,
    pub target: PickTarget,
    pub min: IVec3,
    pub max: IVec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickedBlock {
    pub pos: IVec3,
    /// Normal of the face that was hit.
    pub normal: IVec3,
}

pub trait BlockPicker {
    fn pick(&self, request: &PickRequest) -> Option<PickedBlock>;
}

/// Receives block edits. Either the local world or a network client that
/// relays them.
pub trait BlockEditSink {
    fn set_block(&mut self, pos: IVec3, kind: BlockKind);
}

/// Ring of placeable materials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialPalette {
    materials: Vec<BlockKind>,
    index: usize,
}

impl MaterialPalette {
    /// Starts on `initial` if it is part of `materials`, on the first entry
    /// otherwise.
    pub fn new(materials: Vec<BlockKind>, initial: BlockKind) -> Self {
        let index = materials.iter().position(|m| *m == initial).unwrap_or(0);
        Self { materials, index }
    }

    pub fn materials(&self) -> &[BlockKind] {
        &self.materials
    }

    pub fn current(&self) -> Option<BlockKind> {
        self.materials.get(self.index).copied()
    }

    pub fn select(&mut self, kind: BlockKind) -> bool {
        match self.materials.iter().position(|m| *m == kind) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// Steps through the ring, wrapping at both ends.
    pub fn cycle(&mut self, direction: i32) -> Option<BlockKind> {
        let len = self.materials.len() as i64;
        if len == 0 {
            return None;
        }
        self.index = (self.index as i64 + direction as i64).rem_euclid(len) as usize;
        debug!(material = ?self.materials[self.index], "material selected");
        self.current()
    }
}

impl Default for MaterialPalette {
    fn default() -> Self {
        Self::new(BlockKind::spawnable().collect(), BlockKind::Dirt)
    }
}

/// Runs one block action. Returns the edited block position, or `None`
/// when the mode forbids the action or nothing was picked.
pub fn perform(
    action: &BlockAction,
    mode: GameMode,
    request: &PickRequest,
    material: Option<BlockKind>,
    picker: &impl BlockPicker,
    sink: &mut impl BlockEditSink,
) -> Option<IVec3> {
    if !mode.allows(action.kind) {
        debug!(?mode, kind = ?action.kind, "block action not allowed");
        return None;
    }
    let picked = picker.pick(request)?;

    let (pos, kind) = match action.kind {
        ActionKind::Break => (picked.pos, BlockKind::Air),
        ActionKind::Place => (picked.pos + picked.normal, material?),
    };
    debug!(?pos, ?kind, "block edit");
    sink.set_block(pos, kind);
    Some(pos)
}
