use tracing::{debug, trace};

use crate::config::{ManipulationConfig, OneHandRotation};
use crate::error::ConfigError;
use crate::logic::{Handlebar, MoveLogic, MoveReference, RotateLogic, ScaleLogic};
use crate::math::{DQuat, DVec3, Pose, Transform, constrain_rotation, lerp_factor};
use crate::pointer::{ManipulatorId, ManipulatorSource, PointerSet, Positions, centroid};
use crate::release::{ReleasePolicy, RigidBody};
use crate::state::ManipulationState;

/// Notifications for UI, audio or haptics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ManipulationEvent {
    /// The target started being manipulated.
    Started {
        /// Whether a near-field manipulator was grabbing when manipulation started.
        near_field: bool,
    },
    /// The target is no longer manipulated.
    Ended,
}

/// Everything an [`ObjectManipulator`] works on during a single call.
///
/// None of the references are retained past the call.
pub struct ManipulationContext<'a> {
    /// Lookup of the tracked manipulators.
    pub manipulators: &'a dyn ManipulatorSource,
    /// Transform of the manipulated object.
    pub transform: &'a mut Transform,
    /// Physics body of the manipulated object, if it has one.
    pub rigid_body: Option<&'a mut dyn RigidBody>,
}

impl<'a> ManipulationContext<'a> {
    pub fn new(manipulators: &'a dyn ManipulatorSource, transform: &'a mut Transform) -> Self {
        Self {
            manipulators,
            transform,
            rigid_body: None,
        }
    }

    pub fn with_rigid_body(mut self, rigid_body: &'a mut dyn RigidBody) -> Self {
        self.rigid_body = Some(rigid_body);
        self
    }

    fn position(&self) -> DVec3 {
        self.transform.translation.into()
    }

    fn rotation(&self) -> DQuat {
        self.transform.rotation.into()
    }

    fn scale(&self) -> DVec3 {
        self.transform.scale.into()
    }
}

/// What triggered a state evaluation.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Evaluation {
    /// Per-frame evaluation with the elapsed time in seconds.
    Tick(f64),
    /// A manipulator grabbed or let go of the target.
    PointersChanged,
}

/// State captured when a single manipulator starts driving the target.
#[derive(Debug, Copy, Clone, Default)]
struct OneHandSession {
    rotation: OneHandRotation,
    /// Target rotation at grab start, used for the rotation constraint.
    start_rotation: DQuat,
    /// Target rotation relative to the grip rotation.
    grip_to_target: Option<DQuat>,
    /// Target position relative to the grip, in target space.
    grip_offset: Option<DVec3>,
}

impl OneHandSession {
    fn capture(&mut self, pose: Pose, position: DVec3, rotation: DQuat) {
        self.grip_to_target = Some(pose.rotation.inverse() * rotation);
        self.grip_offset = Some(rotation.inverse() * (position - pose.position));
    }
}

/// Moves, rotates and scales a target object with one or more tracked manipulators.
///
/// Grab events are delivered with [`ObjectManipulator::on_grab_begin`] and
/// [`ObjectManipulator::on_grab_end`]. The host calls [`ObjectManipulator::tick`]
/// once per frame to update the target transform.
#[derive(Debug, Clone)]
pub struct ObjectManipulator {
    config: ManipulationConfig,
    state: ManipulationState,
    pointers: PointerSet,

    move_logic: MoveLogic,
    rotate_logic: RotateLogic,
    scale_logic: ScaleLogic,
    handlebar: Option<Handlebar>,

    one_hand: OneHandSession,
    /// Rotation accumulated by two-handed rotation.
    target_rotation: DQuat,

    release: ReleasePolicy,
    events: Vec<ManipulationEvent>,
}

impl Default for ObjectManipulator {
    fn default() -> Self {
        Self::with_config(ManipulationConfig::default())
    }
}

impl ObjectManipulator {
    /// Creates a new manipulator from given configuration.
    pub fn new(config: ManipulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: ManipulationConfig) -> Self {
        Self {
            config,
            state: ManipulationState::Idle,
            pointers: PointerSet::default(),
            move_logic: MoveLogic::default(),
            rotate_logic: RotateLogic::default(),
            scale_logic: ScaleLogic::default(),
            handlebar: None,
            one_hand: OneHandSession::default(),
            target_rotation: DQuat::IDENTITY,
            release: ReleasePolicy::new(config.release_behavior),
            events: Vec::new(),
        }
    }

    /// Configuration used by the manipulator.
    pub fn config(&self) -> &ManipulationConfig {
        &self.config
    }

    pub fn state(&self) -> ManipulationState {
        self.state
    }

    /// Whether the target is currently being manipulated.
    pub fn is_manipulating(&self) -> bool {
        !self.state.is_idle()
    }

    /// Number of manipulators currently grabbing the target.
    pub fn pointer_count(&self) -> usize {
        self.pointers.count()
    }

    /// The manipulators currently grabbing the target.
    pub fn pointers(&self) -> &PointerSet {
        &self.pointers
    }

    /// Takes the notifications fired since the last call, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ManipulationEvent> + '_ {
        self.events.drain(..)
    }

    /// A manipulator grabbed the target.
    ///
    /// Returns whether the grab was accepted. A rejected grab leaves the manipulator
    /// free to be claimed by something else.
    pub fn on_grab_begin(&mut self, id: ManipulatorId, ctx: &mut ManipulationContext<'_>) -> bool {
        let Some(manipulator) = ctx.manipulators.manipulator(id) else {
            debug!(?id, "grab rejected: manipulator not found");
            return false;
        };

        if !self.pointers.add(id, manipulator, &self.config) {
            return false;
        }

        debug!(?id, count = self.pointers.count(), "grab accepted");

        if self.pointers.count() == 1
            && let Some(body) = ctx.rigid_body.as_deref_mut()
        {
            self.release.hold(body);
        }

        self.evaluate(Evaluation::PointersChanged, ctx);
        true
    }

    /// A manipulator let go of the target. Unknown identifiers are ignored.
    pub fn on_grab_end(&mut self, id: ManipulatorId, ctx: &mut ManipulationContext<'_>) {
        if !self.pointers.contains(id) {
            return;
        }

        if self.pointers.count() == 1 {
            // Sampled before removal, the set is empty afterwards.
            let velocity = self
                .pointers
                .velocity_sample(ctx.manipulators)
                .unwrap_or(self.pointers.last_velocity());

            match ctx.rigid_body.as_deref_mut() {
                Some(body) => self.release.release(body, velocity),
                None => self.release.forget(),
            }
        }

        self.pointers.remove(id);
        debug!(?id, count = self.pointers.count(), "grab ended");

        if self.handlebar.is_some_and(|handlebar| handlebar.contains(id)) {
            self.handlebar = Handlebar::from_ids(&self.pointers.ids());
        }

        self.evaluate(Evaluation::PointersChanged, ctx);
    }

    /// Updates the target for a frame that took `delta_time` seconds.
    pub fn tick(&mut self, delta_time: f64, ctx: &mut ManipulationContext<'_>) {
        if !self.pointers.is_empty() {
            self.pointers.record_velocity(ctx.manipulators);
        }

        self.evaluate(Evaluation::Tick(delta_time), ctx);
    }

    fn evaluate(&mut self, evaluation: Evaluation, ctx: &mut ManipulationContext<'_>) {
        let new_state = self.state.next(self.pointers.count(), &self.config);

        if new_state != self.state {
            self.transition(new_state, ctx);
            return;
        }

        match evaluation {
            Evaluation::Tick(delta_time) => {
                if self.state.is_two_handed() {
                    self.update_two_handed(delta_time, ctx);
                } else if self.state.is_moving() {
                    self.update_one_handed(delta_time, ctx);
                }
            }
            Evaluation::PointersChanged => {
                if self.state.is_two_handed() {
                    self.rebase_two_handed(ctx);
                }
            }
        }
    }

    fn transition(&mut self, new_state: ManipulationState, ctx: &mut ManipulationContext<'_>) {
        debug_assert_ne!(self.state, new_state);
        debug!(from = ?self.state, to = ?new_state, "manipulation state changed");

        match self.state {
            ManipulationState::Idle => self.events.push(ManipulationEvent::Started {
                near_field: self.pointers.has_near(),
            }),
            ManipulationState::Moving => {}
            ManipulationState::Scaling
            | ManipulationState::Rotating
            | ManipulationState::MovingScaling
            | ManipulationState::RotatingScaling
            | ManipulationState::MovingRotatingScaling => self.end_two_handed(),
        }

        self.state = new_state;

        match new_state {
            ManipulationState::Idle => self.events.push(ManipulationEvent::Ended),
            ManipulationState::Moving => self.setup_one_handed(ctx),
            ManipulationState::Scaling
            | ManipulationState::Rotating
            | ManipulationState::MovingScaling
            | ManipulationState::RotatingScaling
            | ManipulationState::MovingRotatingScaling => self.setup_two_handed(ctx),
        }
    }

    /// The centroid is only used while every manipulator resolves, a partial
    /// centroid would make the target jump.
    fn move_reference(&self, positions: &Positions, ctx: &ManipulationContext<'_>) -> MoveReference {
        MoveReference {
            centroid: (positions.len() == self.pointers.count())
                .then(|| centroid(positions))
                .flatten(),
            grab_point: self
                .pointers
                .grip_pose(ctx.manipulators)
                .map(|pose| pose.position),
        }
    }

    fn setup_one_handed(&mut self, ctx: &ManipulationContext<'_>) {
        let positions = self.pointers.positions(ctx.manipulators);
        let near_grab = self.pointers.has_near();
        let position = ctx.position();
        let rotation = ctx.rotation();

        let reference = self.move_reference(&positions, ctx);
        self.move_logic
            .setup(reference, near_grab, position, self.config.movement_axes);

        self.one_hand = OneHandSession {
            rotation: self.config.one_hand_rotation(near_grab),
            start_rotation: rotation,
            ..Default::default()
        };

        if let Some(pose) = self.pointers.grip_pose(ctx.manipulators) {
            self.one_hand.capture(pose, position, rotation);
        }
    }

    fn update_one_handed(&mut self, delta_time: f64, ctx: &mut ManipulationContext<'_>) {
        let position = ctx.position();
        let rotation = ctx.rotation();

        let mut target_position = None;
        let mut target_rotation = rotation;

        match self.one_hand.rotation {
            OneHandRotation::KeepRotation => {}
            OneHandRotation::AboutObjectCenter | OneHandRotation::AboutGrabPoint => {
                match self.pointers.grip_pose(ctx.manipulators) {
                    Some(pose) => match (self.one_hand.grip_to_target, self.one_hand.grip_offset) {
                        (Some(grip_to_target), Some(grip_offset)) => {
                            target_rotation = constrain_rotation(
                                self.one_hand.start_rotation,
                                pose.rotation * grip_to_target,
                                self.config.rotation_constraint,
                            );

                            if self.one_hand.rotation == OneHandRotation::AboutGrabPoint {
                                // Recaptured against the rotated target if the grip is lost.
                                self.move_logic.reset_offset();
                                target_position = Some(
                                    self.move_logic
                                        .constrain(pose.position + target_rotation * grip_offset),
                                );
                            }
                        }
                        _ => self.one_hand.capture(pose, position, rotation),
                    },
                    None => trace!("grip pose unresolved, rotation unchanged"),
                }
            }
        }

        // Without a grip pose, rotating about the grab point degrades to plain movement.
        if target_position.is_none() {
            let positions = self.pointers.positions(ctx.manipulators);
            let reference = self.move_reference(&positions, ctx);
            target_position = self.move_logic.update(reference, position);
        }

        let lerp = lerp_factor(self.config.smoothing, delta_time);
        if let Some(target_position) = target_position {
            ctx.transform.translation = position.lerp(target_position, lerp).into();
        }
        if target_rotation != rotation {
            ctx.transform.rotation = rotation.slerp(target_rotation, lerp).normalize().into();
        }
    }

    fn setup_two_handed(&mut self, ctx: &ManipulationContext<'_>) {
        let positions = self.pointers.positions(ctx.manipulators);
        self.handlebar = Handlebar::from_ids(&self.pointers.ids());
        self.target_rotation = ctx.rotation();

        self.rotate_logic
            .setup(self.handlebar, &positions, self.config.rotation_constraint);
        self.scale_logic.setup(
            self.handlebar,
            &positions,
            ctx.scale(),
            self.config.scale_limits,
        );
        let reference = self.move_reference(&positions, ctx);
        self.move_logic.setup(
            reference,
            false,
            ctx.position(),
            self.config.movement_axes,
        );
    }

    fn update_two_handed(&mut self, delta_time: f64, ctx: &mut ManipulationContext<'_>) {
        // Every facet reads the same snapshot.
        let positions = self.pointers.positions(ctx.manipulators);
        let position = ctx.position();
        let rotation = ctx.rotation();
        let scale = ctx.scale();
        let lerp = lerp_factor(self.config.smoothing, delta_time);

        if self.state.is_scaling()
            && let Some(target_scale) = self.scale_logic.update(&positions)
        {
            ctx.transform.scale = scale.lerp(target_scale, lerp).into();
        }

        if self.state.is_rotating() {
            self.target_rotation = self.rotate_logic.update(&positions, self.target_rotation);
            ctx.transform.rotation = rotation
                .slerp(self.target_rotation, lerp)
                .normalize()
                .into();
        }

        if self.state.is_moving() {
            let reference = self.move_reference(&positions, ctx);
            if let Some(target_position) = self.move_logic.update(reference, position) {
                ctx.transform.translation = position.lerp(target_position, lerp).into();
            }
        }
    }

    /// Keeps two-handed manipulation continuous when manipulators join or leave
    /// without changing the state.
    fn rebase_two_handed(&mut self, ctx: &ManipulationContext<'_>) {
        trace!(handlebar = ?self.handlebar, "pointers changed during two-handed manipulation");

        let positions = self.pointers.positions(ctx.manipulators);
        self.rotate_logic.rebase(self.handlebar, &positions);
        self.scale_logic.rebase(self.handlebar, &positions);
        self.move_logic.reset_offset();
    }

    fn end_two_handed(&mut self) {
        self.handlebar = None;
        self.rotate_logic = RotateLogic::default();
        self.scale_logic = ScaleLogic::default();
    }
}
