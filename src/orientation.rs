use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{Orientation, input::PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookTuning {
    /// Pointer travel in pixels per radian of rotation.
    pub drag_sensitivity: f64,
    /// Rate at which the facing approaches its target, per second.
    pub smoothing_rate: f64,
    /// Radians per second at full right stick deflection.
    pub stick_speed: f64,
    /// Pointer releases closer than this (Manhattan, pixels) to the press
    /// count as clicks.
    pub click_slop: f64,
    /// Cap the per-step smoothing factor at 1. Without it a step longer than
    /// `1 / smoothing_rate` overshoots the target.
    pub clamp_smoothing: bool,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            drag_sensitivity: 200.0,
            smoothing_rate: 30.0,
            stick_speed: 2.0,
            click_slop: 4.0,
            clamp_smoothing: false,
        }
    }
}

/// A pointer press and release that barely moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub position: DVec2,
    pub secondary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    start: DVec2,
    from: Orientation,
}

/// Drives the facing angles toward a target set by pointer drags or the
/// right stick.
#[derive(Debug, Clone, Default)]
pub struct OrientationController {
    tuning: LookTuning,
    drag: Option<Drag>,
    dragging: bool,
    stick_active: bool,
    target: Orientation,
}

impl OrientationController {
    pub fn new(tuning: LookTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    pub fn target(&self) -> Orientation {
        self.target
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// True while the facing is being pulled toward the target.
    pub fn steering(&self) -> bool {
        self.dragging || self.stick_active
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, current: Orientation) -> Option<Click> {
        match event {
            PointerEvent::Down { x, y, .. } => {
                if x.is_finite() && y.is_finite() {
                    self.begin_drag(DVec2::new(x, y), current);
                }
                None
            }
            PointerEvent::Move { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.drag_to(DVec2::new(x, y));
                }
                None
            }
            PointerEvent::Up { x, y, secondary } => self.end_drag(DVec2::new(x, y), secondary),
        }
    }

    pub fn begin_drag(&mut self, start: DVec2, current: Orientation) {
        self.drag = Some(Drag {
            start,
            from: current,
        });
        self.target = current;
    }

    pub fn drag_to(&mut self, pointer: DVec2) {
        let Some(drag) = self.drag else {
            return;
        };
        let moved = (pointer - drag.start) / self.tuning.drag_sensitivity;
        self.dragging = true;
        self.target = Orientation {
            pitch: drag.from.pitch - moved.y,
            yaw: drag.from.yaw + moved.x,
        };
    }

    pub fn end_drag(&mut self, pointer: DVec2, secondary: bool) -> Option<Click> {
        let drag = self.drag.take()?;
        self.dragging = false;

        let travel = (pointer - drag.start).abs();
        (travel.x + travel.y < self.tuning.click_slop).then_some(Click {
            position: pointer,
            secondary,
        })
    }

    /// Moves the target with the right stick. The target is re-synced to the
    /// current facing whenever the stick leaves the dead zone.
    pub fn steer(&mut self, look_stick: Option<DVec2>, current: Orientation, dt: f64) {
        let Some(stick) = look_stick else {
            self.stick_active = false;
            return;
        };
        if !self.stick_active {
            self.target = current;
            self.stick_active = true;
        }
        self.target.yaw += stick.x * dt * self.tuning.stick_speed;
        self.target.pitch -= stick.y * dt * self.tuning.stick_speed;
    }

    pub fn smooth(&self, orientation: &mut Orientation, dt: f64) {
        if !self.steering() {
            return;
        }
        let mut factor = self.tuning.smoothing_rate * dt;
        if self.tuning.clamp_smoothing {
            factor = factor.min(1.0);
        }
        orientation.pitch += (self.target.pitch - orientation.pitch) * factor;
        orientation.yaw += (self.target.yaw - orientation.yaw) * factor;
        orientation.clamp_pitch();
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::{FRAC_PI_2, PI};

    use glam::DVec2;

    use super::{LookTuning, OrientationController};
    use crate::{Orientation, input::PointerEvent};

    #[test]
    fn drag_sets_target_from_pointer_travel() {
        let mut view = OrientationController::default();
        let current = Orientation::SPAWN;
        view.handle_pointer(
            PointerEvent::Down {
                x: 10.0,
                y: 10.0,
                secondary: false,
            },
            current,
        );
        view.handle_pointer(PointerEvent::Move { x: 210.0, y: 110.0 }, current);

        assert!(view.dragging());
        assert!((view.target().yaw - (PI + 1.0)).abs() < 1e-12);
        assert!((view.target().pitch - -0.5).abs() < 1e-12);
    }

    #[test]
    fn move_without_press_is_ignored() {
        let mut view = OrientationController::default();
        view.handle_pointer(PointerEvent::Move { x: 500.0, y: 0.0 }, Orientation::SPAWN);
        assert!(!view.steering());
    }

    #[test]
    fn long_drag_is_not_a_click() {
        let mut view = OrientationController::default();
        view.begin_drag(DVec2::ZERO, Orientation::SPAWN);
        view.drag_to(DVec2::new(30.0, 0.0));
        assert_eq!(view.end_drag(DVec2::new(30.0, 0.0), false), None);
        assert!(!view.dragging());

        view.begin_drag(DVec2::ZERO, Orientation::SPAWN);
        assert!(view.end_drag(DVec2::new(2.0, 1.0), false).is_some());
    }

    #[test]
    fn smoothing_approaches_target_exponentially() {
        let mut view = OrientationController::default();
        let mut facing = Orientation::new(0.0, 0.0);
        view.begin_drag(DVec2::ZERO, facing);
        view.drag_to(DVec2::new(200.0, 0.0));

        view.smooth(&mut facing, 0.01);
        assert!((facing.yaw - 0.3).abs() < 1e-12);
        view.smooth(&mut facing, 0.01);
        assert!((facing.yaw - 0.51).abs() < 1e-12);
    }

    #[test]
    fn long_steps_overshoot_unless_clamped() {
        let mut view = OrientationController::default();
        let mut facing = Orientation::new(0.0, 0.0);
        view.begin_drag(DVec2::ZERO, facing);
        view.drag_to(DVec2::new(200.0, 0.0));

        view.smooth(&mut facing, 0.05);
        assert!((facing.yaw - 1.5).abs() < 1e-12);

        let mut view = OrientationController::new(LookTuning {
            clamp_smoothing: true,
            ..Default::default()
        });
        let mut facing = Orientation::new(0.0, 0.0);
        view.begin_drag(DVec2::ZERO, facing);
        view.drag_to(DVec2::new(200.0, 0.0));

        view.smooth(&mut facing, 0.05);
        assert_eq!(facing.yaw, 1.0);
    }

    #[test]
    fn pitch_stays_clamped_while_target_overshoots() {
        let mut view = OrientationController::default();
        let mut facing = Orientation::new(0.0, 0.0);
        view.begin_drag(DVec2::ZERO, facing);
        view.drag_to(DVec2::new(0.0, -2000.0));

        for _ in 0..100 {
            view.smooth(&mut facing, 1.0 / 60.0);
        }
        assert_eq!(facing.pitch, FRAC_PI_2);
    }

    #[test]
    fn stick_resyncs_target_on_activation() {
        let mut view = OrientationController::default();
        let facing = Orientation::new(0.2, 1.0);

        view.steer(Some(DVec2::new(1.0, 0.0)), facing, 0.5);
        assert!(view.steering());
        assert!((view.target().yaw - 2.0).abs() < 1e-12);
        assert!((view.target().pitch - 0.2).abs() < 1e-12);

        view.steer(None, facing, 0.5);
        assert!(!view.steering());
        let mut unchanged = facing;
        view.smooth(&mut unchanged, 0.1);
        assert_eq!(unchanged, facing);
    }
}
