use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::{ActorState, Intent, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    pub walk_speed: f64,
    pub jump_velocity: f64,
    /// Subtracted from `velocity.z` on every step spent falling.
    pub gravity_kick: f64,
    /// Treat `gravity_kick` as an acceleration per second instead of a
    /// fixed per-step kick.
    pub scale_gravity_by_dt: bool,
    /// Per-step divisors applied to velocity when no key is held.
    pub ground_damping: f64,
    pub air_damping: f64,
    pub flight_damping: f64,
    /// Left stick impulse per second of full deflection.
    pub ground_stick_impulse: f64,
    pub flight_stick_impulse: f64,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            jump_velocity: 8.0,
            gravity_kick: 0.5,
            scale_gravity_by_dt: false,
            ground_damping: 1.5,
            air_damping: 1.01,
            flight_damping: 2.5,
            ground_stick_impulse: 120.0,
            flight_stick_impulse: 300.0,
        }
    }
}

/// Turns an [`Intent`] into velocity and a proposed displacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionIntegrator {
    pub tuning: MotionTuning,
}

impl MotionIntegrator {
    pub fn new(tuning: MotionTuning) -> Self {
        Self { tuning }
    }

    /// Updates `state.velocity` for one step and returns `velocity * dt`.
    /// A non-positive or non-finite `dt` leaves the state untouched.
    pub fn integrate(&self, state: &mut ActorState, intent: &Intent, dt: f64) -> DVec3 {
        if !(dt.is_finite() && dt > 0.0) {
            return DVec3::ZERO;
        }

        if state.gravity_enabled {
            self.walk(state, intent, dt);
        } else {
            self.fly(state, intent, dt);
        }
        self.apply_gravity(state, dt);
        self.apply_jump(state, intent);

        state.velocity * dt
    }

    fn walk(&self, state: &mut ActorState, intent: &Intent, dt: f64) {
        let falling = state.falling();
        let orientation = state.orientation;

        if !falling {
            if let Some(stick) = intent.move_stick {
                let impulse = stick_impulse(
                    &orientation,
                    orientation.flat_forward(),
                    stick,
                    dt * self.tuning.ground_stick_impulse,
                );
                state.velocity.x += impulse.x;
                state.velocity.y += impulse.y;
            }
        }

        let dir = if falling {
            DVec3::ZERO
        } else {
            intent.move_dir(&orientation, false)
        };

        if dir != DVec3::ZERO {
            state.velocity.x = dir.x * self.tuning.walk_speed;
            state.velocity.y = dir.y * self.tuning.walk_speed;
        } else {
            let damping = if falling {
                self.tuning.air_damping
            } else {
                self.tuning.ground_damping
            };
            state.velocity.x /= damping;
            state.velocity.y /= damping;
        }
    }

    fn fly(&self, state: &mut ActorState, intent: &Intent, dt: f64) {
        let orientation = state.orientation;

        if let Some(stick) = intent.move_stick {
            state.velocity += stick_impulse(
                &orientation,
                orientation.forward(),
                stick,
                dt * self.tuning.flight_stick_impulse,
            );
        }

        let dir = intent.move_dir(&orientation, true);
        if dir != DVec3::ZERO {
            state.velocity = dir * self.tuning.walk_speed;
        } else {
            state.velocity /= self.tuning.flight_damping;
        }
    }

    fn apply_gravity(&self, state: &mut ActorState, dt: f64) {
        if !(state.gravity_enabled && state.falling()) {
            return;
        }
        let kick = if self.tuning.scale_gravity_by_dt {
            self.tuning.gravity_kick * dt
        } else {
            self.tuning.gravity_kick
        };
        state.velocity.z -= kick;
    }

    fn apply_jump(&self, state: &mut ActorState, intent: &Intent) {
        if intent.jump && state.grounded() {
            state.velocity.z = self.tuning.jump_velocity;
        }
    }
}

/// Stick up (negative y) pushes forward, stick right pushes right.
fn stick_impulse(orientation: &Orientation, forward: DVec3, stick: DVec2, scale: f64) -> DVec3 {
    -forward * stick.y * scale - orientation.left() * stick.x * scale
}
