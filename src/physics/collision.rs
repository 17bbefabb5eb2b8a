use glam::{DVec2, DVec3, IVec3};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::{ActorState, BlockKind, VerticalState, block, block_coord};

/// Read-only access to the block grid.
pub trait Voxel {
    /// Returns `None` for coordinates the world cannot answer for
    /// (unloaded or out of range). The collision code treats those as air.
    fn block_at(&self, pos: IVec3) -> Option<BlockKind>;

    fn solid_at(&self, pos: IVec3) -> bool {
        self.block_at(pos)
            .is_some_and(BlockKind::is_physically_solid)
    }
}

/// Shape of the actor as seen by the collision passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hull {
    /// Side of the square used for the X/Y pass.
    pub footprint_size: f64,
    /// Half-width of the square used for the Z pass.
    pub face_half_width: f64,
    pub eye_height: f64,
    pub height: f64,
    /// Scales the vertical delta when probing for ceilings so they are hit
    /// slightly early.
    pub head_probe_scale: f64,
}

impl Default for Hull {
    fn default() -> Self {
        Self {
            footprint_size: 0.25,
            face_half_width: 0.125,
            eye_height: 1.7,
            height: 1.8,
            head_probe_scale: 1.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A vertical block face that may stop horizontal motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFace {
    pub axis: Axis,
    /// Position of the face along `axis`.
    pub coord: f64,
    /// Outward normal sign along `axis`.
    pub direction: f64,
    /// Extent along the other horizontal axis.
    pub span: (f64, f64),
}

/// A horizontal block face: a floor (`direction = 1`) or a ceiling
/// (`direction = -1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapFace {
    pub z: f64,
    pub direction: f64,
    pub x_span: (f64, f64),
    pub y_span: (f64, f64),
}

/// Axis aligned square on the X/Y plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: DVec2,
    pub half: f64,
}

impl Footprint {
    pub fn new(center: DVec2, half: f64) -> Self {
        Self { center, half }
    }

    fn min(&self) -> DVec2 {
        self.center - DVec2::splat(self.half)
    }

    fn max(&self) -> DVec2 {
        self.center + DVec2::splat(self.half)
    }

    /// Whether the face line crosses the square. Inclusive along the face
    /// normal, strict along the face, so a square flush with the end of a
    /// face does not touch it.
    pub fn touches(&self, wall: &WallFace) -> bool {
        let (min, max) = (self.min(), self.max());
        let (along_min, along_max, across_min, across_max) = match wall.axis {
            Axis::X => (min.x, max.x, min.y, max.y),
            Axis::Y => (min.y, max.y, min.x, max.x),
        };
        along_min <= wall.coord
            && along_max >= wall.coord
            && across_max > wall.span.0
            && across_min < wall.span.1
    }

    /// Strict overlap with the rectangle of a cap face.
    pub fn overlaps(&self, cap: &CapFace) -> bool {
        let (min, max) = (self.min(), self.max());
        min.x < cap.x_span.1 && cap.x_span.0 < max.x && min.y < cap.y_span.1 && cap.y_span.0 < max.y
    }
}

/// Collects the exposed vertical faces of every solid block in the 3x3x2
/// neighbourhood of `b_pos`. Faces between two solid blocks are culled.
pub fn wall_candidates(voxel: &impl Voxel, b_pos: IVec3) -> Vec<WallFace> {
    let mut candidates = Vec::new();

    for x in b_pos.x - 1..=b_pos.x + 1 {
        for y in b_pos.y - 1..=b_pos.y + 1 {
            for z in b_pos.z..=b_pos.z + 1 {
                let pos = IVec3::new(x, y, z);
                if !voxel.solid_at(pos) {
                    continue;
                }

                let faces = [
                    (IVec3::new(-1, 0, 0), Axis::X, x, -1.0),
                    (IVec3::new(1, 0, 0), Axis::X, x + 1, 1.0),
                    (IVec3::new(0, -1, 0), Axis::Y, y, -1.0),
                    (IVec3::new(0, 1, 0), Axis::Y, y + 1, 1.0),
                ];
                for (offset, axis, coord, direction) in faces {
                    if voxel.solid_at(pos + offset) {
                        continue;
                    }
                    let start = match axis {
                        Axis::X => y,
                        Axis::Y => x,
                    } as f64;
                    candidates.push(WallFace {
                        axis,
                        coord: coord as f64,
                        direction,
                        span: (start, start + 1.0),
                    });
                }
            }
        }
    }
    candidates
}

/// Collects floors on the `lower` layer and ceilings on the `upper` layer of
/// the 3x3 column around `b_pos`.
pub fn cap_candidates(voxel: &impl Voxel, b_pos: IVec3, lower: i32, upper: i32) -> Vec<CapFace> {
    let mut candidates = Vec::new();

    for x in b_pos.x - 1..=b_pos.x + 1 {
        for y in b_pos.y - 1..=b_pos.y + 1 {
            let x_span = (x as f64, x as f64 + 1.0);
            let y_span = (y as f64, y as f64 + 1.0);
            if voxel.solid_at(IVec3::new(x, y, lower)) {
                candidates.push(CapFace {
                    z: lower as f64 + 1.0,
                    direction: 1.0,
                    x_span,
                    y_span,
                });
            }
            if voxel.solid_at(IVec3::new(x, y, upper)) {
                candidates.push(CapFace {
                    z: upper as f64,
                    direction: -1.0,
                    x_span,
                    y_span,
                });
            }
        }
    }
    candidates
}

/// Whether the footprint at `position` reaches into a solid block of the
/// feet layer by more than a rounding error. Flush contact does not count.
pub fn penetrates(voxel: &impl Voxel, position: DVec3, half: f64) -> bool {
    const EPSILON: f64 = 1e-9;
    let footprint = Footprint::new(position.truncate(), half);
    let (min, max) = (footprint.min(), footprint.max());
    let z = block_coord(position.z);

    for x in block_coord(min.x + EPSILON)..=block_coord(max.x - EPSILON) {
        for y in block_coord(min.y + EPSILON)..=block_coord(max.y - EPSILON) {
            if voxel.solid_at(IVec3::new(x, y, z)) {
                return true;
            }
        }
    }
    false
}

/// Resolves a proposed displacement against the block grid in two passes,
/// horizontal first and vertical second.
///
/// Candidates are visited in grid scan order and the first one that blocks
/// an axis wins. This is not a swept test: a displacement that jumps over
/// the whole contact window of a face in one step is not caught.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver {
    pub hull: Hull,
}

impl CollisionResolver {
    pub fn new(hull: Hull) -> Self {
        Self { hull }
    }

    /// Moves `state` by `delta`, stopping at solid faces. Blocked components
    /// of both `delta` and `state.velocity` are zeroed and the vertical state
    /// is recomputed. Returns the new position.
    pub fn resolve_step(
        &self,
        voxel: &impl Voxel,
        state: &mut ActorState,
        mut delta: DVec3,
    ) -> DVec3 {
        let b_pos = block(state.position);
        let half = self.hull.footprint_size / 2.0;
        let started_inside = penetrates(voxel, state.position, half);

        self.resolve_walls(voxel, state, b_pos, &mut delta);
        self.resolve_caps(voxel, state, b_pos, &mut delta);

        state.position += delta;

        let penetrated = !started_inside && penetrates(voxel, state.position, half);
        if penetrated {
            error!(
                position = ?state.position,
                "actor ended a step inside solid geometry"
            );
        }
        debug_assert!(
            !penetrated,
            "actor at {} ended inside solid geometry",
            state.position
        );
        state.position
    }

    fn resolve_walls(
        &self,
        voxel: &impl Voxel,
        state: &mut ActorState,
        b_pos: IVec3,
        delta: &mut DVec3,
    ) {
        let half = self.hull.footprint_size / 2.0;
        let footprint = Footprint::new(state.position.truncate() + delta.truncate(), half);

        for wall in wall_candidates(voxel, b_pos) {
            if !footprint.touches(&wall) {
                continue;
            }
            match wall.axis {
                Axis::X if delta.x * wall.direction < 0.0 => {
                    trace!(x = wall.coord, "blocked on x");
                    state.position.x = wall.coord + half * wall.direction;
                    delta.x = 0.0;
                    state.velocity.x = 0.0;
                }
                Axis::Y if delta.y * wall.direction < 0.0 => {
                    trace!(y = wall.coord, "blocked on y");
                    state.position.y = wall.coord + half * wall.direction;
                    delta.y = 0.0;
                    state.velocity.y = 0.0;
                }
                _ => {}
            }
        }
    }

    fn resolve_caps(
        &self,
        voxel: &impl Voxel,
        state: &mut ActorState,
        b_pos: IVec3,
        delta: &mut DVec3,
    ) {
        let face = Footprint::new(
            state.position.truncate() + delta.truncate(),
            self.hull.face_half_width,
        );
        let lower = block_coord(state.position.z + delta.z);
        let upper = block_coord(
            state.position.z + self.hull.eye_height + delta.z * self.hull.head_probe_scale,
        );

        state.vertical = VerticalState::Falling;

        let hit = cap_candidates(voxel, b_pos, lower, upper)
            .into_iter()
            .find(|cap| face.overlaps(cap) && delta.z * cap.direction < 0.0);

        let Some(cap) = hit else {
            return;
        };

        if delta.z < 0.0 {
            trace!(z = cap.z, "landed");
            state.position.z = cap.z;
            state.vertical = VerticalState::Grounded;
        } else {
            trace!(z = cap.z, "hit ceiling");
            state.position.z = cap.z - self.hull.height;
        }
        delta.z = 0.0;
        state.velocity.z = 0.0;
    }
}
