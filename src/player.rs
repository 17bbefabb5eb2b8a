use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    ActorState, BlockKind, Orientation, block,
    actions::{self, BlockAction, BlockEditSink, BlockPicker, GameMode, MaterialPalette, PickRequest},
    config::Tuning,
    input::{InputAggregator, InputFrame, InputSource},
    orientation::OrientationController,
    physics::{CollisionResolver, MotionIntegrator, Voxel},
};

/// Why a step did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NonFiniteDt,
    NonPositiveDt,
    NonFinitePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step ran. Carries the block actions and chat edge raised by this
    /// frame's input; the caller dispatches them.
    Resolved {
        actions: Vec<BlockAction>,
        open_chat: bool,
    },
    Skipped(SkipReason),
}

/// What an external save or sync layer keeps of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub mode: GameMode,
    pub actor: ActorState,
}

/// The local player: actor state plus everything that drives it.
pub struct Player {
    state: ActorState,
    view: OrientationController,
    input: InputAggregator,
    motion: MotionIntegrator,
    resolver: CollisionResolver,
    palette: MaterialPalette,
    mode: GameMode,
    tuning: Tuning,
}

impl Player {
    /// Binds a new player to a world at `spawn_point`.
    pub fn spawn(spawn_point: DVec3, tuning: Tuning) -> Self {
        info!(?spawn_point, "player spawned");
        Self {
            state: ActorState::spawn(spawn_point),
            view: OrientationController::new(tuning.look),
            input: InputAggregator::new(tuning.input),
            motion: MotionIntegrator::new(tuning.motion),
            resolver: CollisionResolver::new(tuning.hull),
            palette: MaterialPalette::default(),
            mode: GameMode::default(),
            tuning,
        }
    }

    pub fn state(&self) -> &ActorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn eye_position(&self) -> DVec3 {
        self.state.eye_position(self.tuning.hull.eye_height)
    }

    pub fn orientation(&self) -> Orientation {
        self.state.orientation
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        if mode != self.mode {
            info!(%mode, "game mode changed");
        }
        self.mode = mode;
    }

    pub fn gravity(&self) -> bool {
        self.state.gravity_enabled
    }

    pub fn set_gravity(&mut self, enabled: bool) {
        debug!(enabled, "gravity toggled");
        self.state.gravity_enabled = enabled;
    }

    pub fn palette(&self) -> &MaterialPalette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut MaterialPalette {
        &mut self.palette
    }

    pub fn build_material(&self) -> Option<BlockKind> {
        self.palette.current()
    }

    /// Advances the player by `dt` seconds against `voxel`.
    pub fn update(&mut self, voxel: &impl Voxel, frame: &InputFrame, dt: f64) -> StepOutcome {
        if !dt.is_finite() {
            warn!(dt, "skipping step with non-finite dt");
            return StepOutcome::Skipped(SkipReason::NonFiniteDt);
        }
        if dt <= 0.0 {
            warn!(dt, "skipping step with non-positive dt");
            return StepOutcome::Skipped(SkipReason::NonPositiveDt);
        }
        if !self.state.position.is_finite() {
            warn!(position = ?self.state.position, "skipping step with non-finite position");
            return StepOutcome::Skipped(SkipReason::NonFinitePosition);
        }
        if !self.state.velocity.is_finite() {
            warn!(velocity = ?self.state.velocity, "discarding non-finite velocity");
            self.state.velocity = DVec3::ZERO;
        }

        let current = self.state.orientation;
        let intent = self.input.aggregate(frame, &mut self.view, current);
        self.view.steer(intent.look_stick, current, dt);

        if let Some(direction) = intent.cycle {
            self.palette.cycle(direction);
        }

        let was_falling = self.state.falling();
        let delta = self.motion.integrate(&mut self.state, &intent, dt);
        self.view.smooth(&mut self.state.orientation, dt);
        self.resolver.resolve_step(voxel, &mut self.state, delta);

        if was_falling && self.state.grounded() {
            debug!(position = ?self.state.position, "landed");
        }

        StepOutcome::Resolved {
            actions: intent.actions,
            open_chat: intent.open_chat,
        }
    }

    /// Polls one frame from `source` and runs [`Player::update`] with it.
    pub fn step(
        &mut self,
        voxel: &impl Voxel,
        source: &mut impl InputSource,
        dt: f64,
    ) -> StepOutcome {
        let frame = source.poll();
        self.update(voxel, &frame, dt)
    }

    /// The request a picker needs to select the block under `action`.
    pub fn pick_request(&self, action: &BlockAction) -> PickRequest {
        let b_pos = block(self.state.position);
        let radius = IVec3::splat(self.tuning.pick_radius);
        PickRequest {
            eye: self.eye_position(),
            orientation: self.state.orientation,
            target: action.target,
            min: b_pos - radius,
            max: b_pos + radius,
        }
    }

    /// Dispatches a block action raised by [`Player::update`].
    pub fn perform_block_action(
        &self,
        action: &BlockAction,
        picker: &impl BlockPicker,
        sink: &mut impl BlockEditSink,
    ) -> Option<IVec3> {
        actions::perform(
            action,
            self.mode,
            &self.pick_request(action),
            self.build_material(),
            picker,
            sink,
        )
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            mode: self.mode,
            actor: self.state.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: PlayerSnapshot) {
        self.set_mode(snapshot.mode);
        self.state = snapshot.actor;
    }
}
