use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// The two states of vertical motion. A jump is not a state of its own,
/// it is an upward kick while `Grounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalState {
    Grounded,
    #[default]
    Falling,
}

/// Facing angles in radians. Pitch is kept inside `[-π/2, π/2]`, yaw is
/// unbounded and only ever used through trigonometric functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    pub const SPAWN: Self = Self { pitch: 0.0, yaw: PI };

    pub fn new(pitch: f64, yaw: f64) -> Self {
        let mut orientation = Self { pitch, yaw };
        orientation.clamp_pitch();
        orientation
    }

    pub fn clamp_pitch(&mut self) {
        self.pitch = self.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Horizontal forward direction, independent of pitch.
    pub fn flat_forward(&self) -> DVec3 {
        DVec3::new(self.yaw.sin(), self.yaw.cos(), 0.0)
    }

    /// Full 3D view direction.
    pub fn forward(&self) -> DVec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        DVec3::new(
            self.yaw.sin() * cos_pitch,
            self.yaw.cos() * cos_pitch,
            sin_pitch,
        )
    }

    pub fn right(&self) -> DVec3 {
        DVec3::new(self.yaw.cos(), -self.yaw.sin(), 0.0)
    }

    pub fn left(&self) -> DVec3 {
        -self.right()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::SPAWN
    }
}

/// Everything the physics core mutates for a single actor.
///
/// `position` is the feet position; the eyes sit `eye_height` above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub orientation: Orientation,
    pub vertical: VerticalState,
    pub gravity_enabled: bool,
}

impl ActorState {
    pub fn spawn(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            orientation: Orientation::SPAWN,
            vertical: VerticalState::Falling,
            gravity_enabled: true,
        }
    }

    pub fn falling(&self) -> bool {
        self.vertical == VerticalState::Falling
    }

    pub fn grounded(&self) -> bool {
        self.vertical == VerticalState::Grounded
    }

    pub fn eye_position(&self, eye_height: f64) -> DVec3 {
        self.position + DVec3::Z * eye_height
    }

    /// Moves the actor without any collision handling.
    pub fn teleport(&mut self, position: DVec3) {
        self.position = position;
        self.velocity = DVec3::ZERO;
        self.vertical = VerticalState::Falling;
    }
}
