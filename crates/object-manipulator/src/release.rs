use enumset::EnumSet;
use tracing::debug;

use crate::config::ReleaseBehavior;
use crate::math::DVec3;
use crate::pointer::VelocitySample;

/// A physics body attached to the manipulated object.
pub trait RigidBody {
    /// Whether physics simulation is suspended for this body.
    fn is_kinematic(&self) -> bool;
    fn set_kinematic(&mut self, kinematic: bool);
    fn set_linear_velocity(&mut self, velocity: DVec3);
    fn set_angular_velocity(&mut self, velocity: DVec3);
}

/// Suspends physics while the object is held and hands inertia back on release.
#[derive(Debug, Copy, Clone, Default)]
pub struct ReleasePolicy {
    behavior: EnumSet<ReleaseBehavior>,
    /// Kinematic flag of the body before the first grab.
    was_kinematic: Option<bool>,
}

impl ReleasePolicy {
    pub fn new(behavior: EnumSet<ReleaseBehavior>) -> Self {
        Self {
            behavior,
            was_kinematic: None,
        }
    }

    /// Called when the first manipulator grabs the object.
    pub fn hold(&mut self, body: &mut dyn RigidBody) {
        let was_kinematic = body.is_kinematic();
        self.was_kinematic = Some(was_kinematic);
        body.set_kinematic(true);

        debug!(was_kinematic, "rigid body held");
    }

    /// Called when the last manipulator lets go of the object.
    ///
    /// `velocity` is the mean velocity of the manipulators just before the release.
    pub fn release(&mut self, body: &mut dyn RigidBody, velocity: VelocitySample) {
        if let Some(was_kinematic) = self.was_kinematic.take() {
            body.set_kinematic(was_kinematic);
        }

        if self.behavior.contains(ReleaseBehavior::KeepVelocity) {
            body.set_linear_velocity(velocity.linear);
        }

        if self.behavior.contains(ReleaseBehavior::KeepAngularVelocity) {
            body.set_angular_velocity(velocity.angular);
        }

        debug!(behavior = ?self.behavior, ?velocity, "rigid body released");
    }

    /// Forgets the kinematic flag captured by [`ReleasePolicy::hold`].
    pub fn forget(&mut self) {
        self.was_kinematic = None;
    }
}
