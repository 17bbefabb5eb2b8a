//! Per-step input: the frame an [`InputSource`] hands over and the
//! [`InputAggregator`] that collapses it into an [`Intent`].

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    Orientation,
    actions::{ActionKind, BlockAction, PickTarget},
    orientation::OrientationController,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Chat,
}

impl Key {
    pub const COUNT: usize = 6;
}

/// Fixed set of key states indexed by [`Key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySet([bool; Key::COUNT]);

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: Key) -> Self {
        self.set(key, true);
        self
    }

    pub fn set(&mut self, key: Key, down: bool) {
        self.0[key as usize] = down;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.0[key as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Jump,
    LeftTrigger,
    RightTrigger,
    LeftBumper,
    RightBumper,
}

impl Button {
    pub const COUNT: usize = 5;
}

/// Snapshot of a connected gamepad. Stick axes are expected in `[-1, 1]`;
/// anything else is clamped and non-finite values read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadState {
    pub left_stick: DVec2,
    pub right_stick: DVec2,
    pub buttons: [bool; Button::COUNT],
}

impl GamepadState {
    pub fn pressed(&self, button: Button) -> bool {
        self.buttons[button as usize]
    }

    pub fn press(&mut self, button: Button) {
        self.buttons[button as usize] = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64, secondary: bool },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64, secondary: bool },
}

/// Everything the core reads from the outside world for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    pub held: KeySet,
    /// Keys that went up since the last frame.
    pub released: KeySet,
    pub pointer: Vec<PointerEvent>,
    /// `None` while no gamepad is connected.
    pub gamepad: Option<GamepadState>,
}

/// Caller-side input hook, polled once per [`Player::step`](crate::Player::step).
pub trait InputSource {
    fn poll(&mut self) -> InputFrame;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputTuning {
    pub dead_zone: f64,
}

impl Default for InputTuning {
    fn default() -> Self {
        Self { dead_zone: 0.1 }
    }
}

/// What the actor wants to do this step. Consumed once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intent {
    /// `(strafe, forward)` from held keys, each in `{-1, 0, 1}`.
    pub walk: DVec2,
    /// Left stick with each axis zeroed inside the dead zone.
    pub move_stick: Option<DVec2>,
    /// Right stick, present only while deflected past the dead zone.
    pub look_stick: Option<DVec2>,
    pub jump: bool,
    pub actions: Vec<BlockAction>,
    /// Material palette step, `-1` or `1`.
    pub cycle: Option<i32>,
    pub open_chat: bool,
}

impl Intent {
    /// Unit (or zero) world-space direction of the held movement keys.
    /// Walking ignores pitch; flying follows it for forward and back.
    pub fn move_dir(&self, orientation: &Orientation, flight: bool) -> DVec3 {
        let forward = if flight {
            orientation.forward()
        } else {
            orientation.flat_forward()
        };
        (forward * self.walk.y + orientation.right() * self.walk.x).normalize_or_zero()
    }
}

fn axis(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Turns raw frames into intents. Keeps the edge latches for triggers and
/// bumpers: a held trigger fires once and re-arms only after both triggers
/// are released.
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    tuning: InputTuning,
    trigger_latched: bool,
    bumper_latched: bool,
    gamepad_connected: bool,
}

impl InputAggregator {
    pub fn new(tuning: InputTuning) -> Self {
        Self {
            tuning,
            ..Default::default()
        }
    }

    pub fn aggregate(
        &mut self,
        frame: &InputFrame,
        view: &mut OrientationController,
        current: Orientation,
    ) -> Intent {
        let held = &frame.held;
        let mut intent = Intent {
            walk: DVec2::new(
                held.is_down(Key::Right) as i32 as f64 - held.is_down(Key::Left) as i32 as f64,
                held.is_down(Key::Forward) as i32 as f64 - held.is_down(Key::Back) as i32 as f64,
            ),
            jump: held.is_down(Key::Jump),
            open_chat: frame.released.is_down(Key::Chat),
            ..Default::default()
        };

        for event in &frame.pointer {
            if let Some(click) = view.handle_pointer(*event, current) {
                let kind = if click.secondary {
                    ActionKind::Place
                } else {
                    ActionKind::Break
                };
                intent.actions.push(BlockAction {
                    kind,
                    target: PickTarget::Screen(click.position),
                });
            }
        }

        self.track_connection(frame.gamepad.is_some());
        if let Some(gamepad) = &frame.gamepad {
            self.read_gamepad(gamepad, &mut intent);
        }
        intent
    }

    fn track_connection(&mut self, connected: bool) {
        if connected == self.gamepad_connected {
            return;
        }
        if connected {
            info!("gamepad connected");
        } else {
            info!("gamepad disconnected");
            self.trigger_latched = false;
            self.bumper_latched = false;
        }
        self.gamepad_connected = connected;
    }

    fn read_gamepad(&mut self, gamepad: &GamepadState, intent: &mut Intent) {
        let dead_zone = self.tuning.dead_zone;
        let outside = |v: f64| if v.abs() > dead_zone { v } else { 0.0 };

        let left = DVec2::new(axis(gamepad.left_stick.x), axis(gamepad.left_stick.y));
        intent.move_stick = Some(DVec2::new(outside(left.x), outside(left.y)));

        let right = DVec2::new(axis(gamepad.right_stick.x), axis(gamepad.right_stick.y));
        if right.x.abs() > dead_zone || right.y.abs() > dead_zone {
            intent.look_stick = Some(right);
        }

        intent.jump |= gamepad.pressed(Button::Jump);

        let (lt, rt) = (
            gamepad.pressed(Button::LeftTrigger),
            gamepad.pressed(Button::RightTrigger),
        );
        if rt && !self.trigger_latched {
            intent.actions.push(BlockAction {
                kind: ActionKind::Place,
                target: PickTarget::Crosshair,
            });
            self.trigger_latched = true;
        } else if lt && !self.trigger_latched {
            intent.actions.push(BlockAction {
                kind: ActionKind::Break,
                target: PickTarget::Crosshair,
            });
            self.trigger_latched = true;
        } else if !lt && !rt {
            self.trigger_latched = false;
        }

        let (lb, rb) = (
            gamepad.pressed(Button::LeftBumper),
            gamepad.pressed(Button::RightBumper),
        );
        if lb && !self.bumper_latched {
            intent.cycle = Some(-1);
            self.bumper_latched = true;
        } else if rb && !self.bumper_latched {
            intent.cycle = Some(1);
            self.bumper_latched = true;
        } else if !lb && !rb {
            self.bumper_latched = false;
        }
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use glam::{DVec2, DVec3};

    use super::{Button, GamepadState, InputAggregator, InputFrame, Key, KeySet, PointerEvent};
    use crate::{
        Orientation,
        actions::{ActionKind, PickTarget},
        orientation::OrientationController,
    };

    fn aggregate(agg: &mut InputAggregator, frame: &InputFrame) -> super::Intent {
        let mut view = OrientationController::default();
        agg.aggregate(frame, &mut view, Orientation::SPAWN)
    }

    fn pad(buttons: &[Button]) -> GamepadState {
        let mut state = GamepadState::default();
        for button in buttons {
            state.press(*button);
        }
        state
    }

    #[test]
    fn opposite_keys_cancel_exactly() {
        let frame = InputFrame {
            held: KeySet::new().with(Key::Forward).with(Key::Back),
            ..Default::default()
        };
        let intent = aggregate(&mut InputAggregator::default(), &frame);
        assert_eq!(intent.walk, DVec2::ZERO);
        assert_eq!(intent.move_dir(&Orientation::SPAWN, false), DVec3::ZERO);
    }

    #[test]
    fn diagonal_walk_is_normalized() {
        let frame = InputFrame {
            held: KeySet::new().with(Key::Forward).with(Key::Right),
            ..Default::default()
        };
        let intent = aggregate(&mut InputAggregator::default(), &frame);
        let dir = intent.move_dir(&Orientation::new(0.0, 0.0), false);
        assert!((dir.length() - 1.0).abs() < 1e-12);
        assert!((dir - DVec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn flight_direction_follows_pitch() {
        let frame = InputFrame {
            held: KeySet::new().with(Key::Forward),
            ..Default::default()
        };
        let intent = aggregate(&mut InputAggregator::default(), &frame);
        let dir = intent.move_dir(&Orientation::new(PI / 2.0, 0.0), true);
        assert!((dir - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn stick_axes_respect_dead_zone() {
        let mut gamepad = GamepadState::default();
        gamepad.left_stick = DVec2::new(0.05, -0.8);
        gamepad.right_stick = DVec2::new(0.09, f64::NAN);
        let frame = InputFrame {
            gamepad: Some(gamepad),
            ..Default::default()
        };
        let intent = aggregate(&mut InputAggregator::default(), &frame);
        assert_eq!(intent.move_stick, Some(DVec2::new(0.0, -0.8)));
        assert_eq!(intent.look_stick, None);
    }

    #[test]
    fn trigger_fires_once_until_released() {
        let mut agg = InputAggregator::default();
        let held = InputFrame {
            gamepad: Some(pad(&[Button::RightTrigger])),
            ..Default::default()
        };

        let first = aggregate(&mut agg, &held);
        assert_eq!(first.actions.len(), 1);
        assert_eq!(first.actions[0].kind, ActionKind::Place);
        assert_eq!(first.actions[0].target, PickTarget::Crosshair);

        // switching to the other trigger while one is held does not re-arm
        let other = InputFrame {
            gamepad: Some(pad(&[Button::LeftTrigger])),
            ..Default::default()
        };
        assert!(aggregate(&mut agg, &held).actions.is_empty());
        assert!(aggregate(&mut agg, &other).actions.is_empty());

        let released = InputFrame {
            gamepad: Some(pad(&[])),
            ..Default::default()
        };
        assert!(aggregate(&mut agg, &released).actions.is_empty());
        assert_eq!(aggregate(&mut agg, &other).actions[0].kind, ActionKind::Break);
    }

    #[test]
    fn bumpers_cycle_in_both_directions() {
        let mut agg = InputAggregator::default();
        let left = InputFrame {
            gamepad: Some(pad(&[Button::LeftBumper])),
            ..Default::default()
        };
        let none = InputFrame {
            gamepad: Some(pad(&[])),
            ..Default::default()
        };
        let right = InputFrame {
            gamepad: Some(pad(&[Button::RightBumper])),
            ..Default::default()
        };
        assert_eq!(aggregate(&mut agg, &left).cycle, Some(-1));
        assert_eq!(aggregate(&mut agg, &left).cycle, None);
        assert_eq!(aggregate(&mut agg, &none).cycle, None);
        assert_eq!(aggregate(&mut agg, &right).cycle, Some(1));
    }

    #[test]
    fn gamepad_jump_and_chat_release() {
        let mut released = KeySet::new();
        released.set(Key::Chat, true);
        let frame = InputFrame {
            released,
            gamepad: Some(pad(&[Button::Jump])),
            ..Default::default()
        };
        let intent = aggregate(&mut InputAggregator::default(), &frame);
        assert!(intent.jump);
        assert!(intent.open_chat);
    }

    #[test]
    fn short_click_becomes_block_action() {
        let frame = InputFrame {
            pointer: vec![
                PointerEvent::Down {
                    x: 100.0,
                    y: 100.0,
                    secondary: true,
                },
                PointerEvent::Up {
                    x: 101.0,
                    y: 102.0,
                    secondary: true,
                },
            ],
            ..Default::default()
        };
        let intent = aggregate(&mut InputAggregator::default(), &frame);
        assert_eq!(intent.actions.len(), 1);
        assert_eq!(intent.actions[0].kind, ActionKind::Place);
        assert_eq!(
            intent.actions[0].target,
            PickTarget::Screen(DVec2::new(101.0, 102.0))
        );
    }
}
