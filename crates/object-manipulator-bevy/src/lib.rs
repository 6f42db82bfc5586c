//! A [Bevy](https://bevyengine.org/) integration for
//! [object-manipulator](https://docs.rs/object-manipulator).
//!
//! Add [`ManipulationPlugin`] to your app, put a [`ManipulationTarget`] on the entities that
//! can be grabbed and a [`ManipulatorPointer`] on every tracked hand or pointing device.
//! Grabs are reported to the plugin with [`GrabInput`] messages, and the plugin answers with
//! [`ManipulationMessage`]s when manipulation of a target starts or ends.
//!
//! Targets are assumed to be root entities: their [`Transform`] is treated as world space.

use bevy_app::{App, Plugin, Update};
use bevy_ecs::change_detection::DetectChangesMut;
use bevy_ecs::message::{Message, MessageReader, MessageWriter};
use bevy_ecs::prelude::*;
use bevy_log::{debug, warn};
use bevy_math::{DQuat, DVec3, Vec3};
use bevy_time::Time;
use bevy_transform::components::{GlobalTransform, Transform};

use object_manipulator::math::{self, Pose};
use object_manipulator::prelude::AHashMap;
pub use object_manipulator::*;

pub mod prelude;

/// Drives every [`ManipulationTarget`] from [`GrabInput`] messages and the
/// [`ManipulatorPointer`]s in the world.
pub struct ManipulationPlugin;

impl Plugin for ManipulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GrabInput>()
            .add_message::<GrabRejected>()
            .add_message::<ManipulationMessage>()
            .add_systems(Update, (handle_grab_input, tick_manipulations).chain());
    }
}

/// An entity that can be moved, rotated and scaled by manipulators.
#[derive(Component, Debug)]
pub struct ManipulationTarget {
    /// Whether the target reacts to grabs.
    /// A disabled target rejects new grabs but finishes ongoing ones.
    pub is_enabled: bool,

    manipulator: ObjectManipulator,
}

impl Default for ManipulationTarget {
    fn default() -> Self {
        Self {
            is_enabled: true,
            manipulator: ObjectManipulator::default(),
        }
    }
}

impl ManipulationTarget {
    pub fn new(config: ManipulationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            is_enabled: true,
            manipulator: ObjectManipulator::new(config)?,
        })
    }

    pub fn manipulator(&self) -> &ObjectManipulator {
        &self.manipulator
    }

    pub fn state(&self) -> ManipulationState {
        self.manipulator.state()
    }

    /// Whether the target is currently being manipulated.
    pub fn is_active(&self) -> bool {
        self.manipulator.is_manipulating()
    }
}

/// A tracked hand or pointing device.
///
/// The position comes from the entity's [`GlobalTransform`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ManipulatorPointer {
    /// Whether the pointer grabs by proximity, like a hand joint, rather than with a ray.
    pub near_field: bool,

    /// Whether the rotation of the [`GlobalTransform`] is the grip orientation
    /// used for one-handed rotation.
    pub provides_grip: bool,

    /// Whether the device is currently tracked.
    /// An untracked pointer keeps its grab, but does not move the target.
    pub is_tracked: bool,

    /// Linear velocity in world units per second.
    pub linear_velocity: Vec3,

    /// Angular velocity in radians per second.
    pub angular_velocity: Vec3,
}

impl Default for ManipulatorPointer {
    fn default() -> Self {
        Self::far()
    }
}

impl ManipulatorPointer {
    /// A ray-based pointer.
    pub fn far() -> Self {
        Self {
            near_field: false,
            provides_grip: false,
            is_tracked: true,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// A hand grabbing by proximity, with its joint orientation as the grip.
    pub fn near() -> Self {
        Self {
            near_field: true,
            provides_grip: true,
            ..Self::far()
        }
    }

    fn sample(&self, transform: &GlobalTransform) -> ManipulatorSample {
        let position = to_core_vec(transform.translation().as_dvec3());
        let rotation = math::DQuat::from_array(transform.rotation().as_dquat().to_array());

        ManipulatorSample {
            position: self.is_tracked.then_some(position),
            near_field: self.near_field,
            grip_pose: (self.is_tracked && self.provides_grip)
                .then(|| Pose::new(position, rotation)),
            linear_velocity: to_core_vec(self.linear_velocity.as_dvec3()),
            angular_velocity: to_core_vec(self.angular_velocity.as_dvec3()),
        }
    }
}

/// Physics state of a [`ManipulationTarget`], bridged to the physics engine of the app.
///
/// The target is kept kinematic while it is grabbed. On release the kinematic flag is
/// restored and, depending on [`ManipulationConfig::release_behavior`], the velocities of
/// the manipulators are handed over.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ManipulationRigidBody {
    pub kinematic: bool,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl RigidBody for ManipulationRigidBody {
    fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    fn set_linear_velocity(&mut self, velocity: math::DVec3) {
        self.linear_velocity = Vec3::from_array(velocity.as_vec3().to_array());
    }

    fn set_angular_velocity(&mut self, velocity: math::DVec3) {
        self.angular_velocity = Vec3::from_array(velocity.as_vec3().to_array());
    }
}

/// Grab input from the app, processed in the order it was written.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabInput {
    /// `pointer` grabbed `target`.
    Begin { pointer: Entity, target: Entity },
    /// `pointer` let go of `target`.
    End { pointer: Entity, target: Entity },
}

/// A [`GrabInput::Begin`] that was not accepted.
/// The pointer is free to grab something else.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrabRejected {
    pub pointer: Entity,
    pub target: Entity,
}

/// Manipulation of `target` started or ended.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManipulationMessage {
    pub target: Entity,
    pub event: ManipulationEvent,
}

type Samples = AHashMap<ManipulatorId, ManipulatorSample>;

type TargetQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut ManipulationTarget,
        &'static mut Transform,
        Option<&'static mut ManipulationRigidBody>,
    ),
>;

fn pointer_id(pointer: Entity) -> ManipulatorId {
    ManipulatorId(pointer.to_bits())
}

fn pointer_samples(
    q_pointers: &Query<(Entity, &GlobalTransform, &ManipulatorPointer)>,
) -> Samples {
    q_pointers
        .iter()
        .map(|(entity, transform, pointer)| (pointer_id(entity), pointer.sample(transform)))
        .collect()
}

fn handle_grab_input(
    mut grab_input: MessageReader<GrabInput>,
    q_pointers: Query<(Entity, &GlobalTransform, &ManipulatorPointer)>,
    mut q_targets: TargetQuery,
    mut rejected: MessageWriter<GrabRejected>,
    mut messages: MessageWriter<ManipulationMessage>,
) {
    if grab_input.is_empty() {
        return;
    }

    let samples = pointer_samples(&q_pointers);

    for input in grab_input.read() {
        let (GrabInput::Begin { pointer, target } | GrabInput::End { pointer, target }) = *input;

        let Ok((mut manipulation, mut transform, mut rigid_body)) = q_targets.get_mut(target)
        else {
            warn!("Grab input for {target} ignored, it is not a manipulation target.");
            if matches!(input, GrabInput::Begin { .. }) {
                rejected.write(GrabRejected { pointer, target });
            }
            continue;
        };

        let mut object = to_core_transform(&transform);
        let mut ctx = ManipulationContext::new(&samples, &mut object);
        if let Some(body) = rigid_body.as_deref_mut() {
            ctx = ctx.with_rigid_body(body);
        }

        match *input {
            GrabInput::Begin { .. } => {
                let accepted = manipulation.is_enabled
                    && manipulation
                        .manipulator
                        .on_grab_begin(pointer_id(pointer), &mut ctx);

                if !accepted {
                    debug!("{pointer} could not grab {target}");
                    rejected.write(GrabRejected { pointer, target });
                }
            }
            GrabInput::End { .. } => {
                manipulation
                    .manipulator
                    .on_grab_end(pointer_id(pointer), &mut ctx);
            }
        }

        transform.set_if_neq(from_core_transform(&object));
        messages.write_batch(
            manipulation
                .manipulator
                .drain_events()
                .map(|event| ManipulationMessage { target, event }),
        );
    }
}

fn tick_manipulations(
    time: Res<Time>,
    q_pointers: Query<(Entity, &GlobalTransform, &ManipulatorPointer)>,
    mut q_targets: Query<(Entity, &mut ManipulationTarget, &mut Transform)>,
    mut messages: MessageWriter<ManipulationMessage>,
) {
    let delta_time = time.delta_secs_f64();
    let mut samples = None;

    for (target, mut manipulation, mut transform) in &mut q_targets {
        if manipulation.manipulator.pointer_count() == 0 {
            continue;
        }

        let samples = samples.get_or_insert_with(|| pointer_samples(&q_pointers));

        let mut object = to_core_transform(&transform);
        let mut ctx = ManipulationContext::new(&*samples, &mut object);
        manipulation.manipulator.tick(delta_time, &mut ctx);

        transform.set_if_neq(from_core_transform(&object));
        messages.write_batch(
            manipulation
                .manipulator
                .drain_events()
                .map(|event| ManipulationMessage { target, event }),
        );
    }
}

fn to_core_vec(vec: DVec3) -> math::DVec3 {
    math::DVec3::from_array(vec.to_array())
}

fn to_core_transform(transform: &Transform) -> math::Transform {
    math::Transform::from_scale_rotation_translation(
        transform.scale.as_dvec3(),
        transform.rotation.as_dquat(),
        transform.translation.as_dvec3(),
    )
}

fn from_core_transform(transform: &math::Transform) -> Transform {
    Transform {
        translation: DVec3::from(transform.translation).as_vec3(),
        rotation: DQuat::from(transform.rotation).as_quat(),
        scale: DVec3::from(transform.scale).as_vec3(),
    }
}
