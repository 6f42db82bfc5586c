use std::collections::HashMap;
use std::hash::BuildHasher;

use ahash::AHashMap;
use tracing::debug;

use crate::config::ManipulationConfig;
use crate::math::{DVec3, Pose};

/// Identifier of a manipulator, stable for the duration of one grab.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ManipulatorId(pub u64);

/// World positions of the resolvable manipulators for a single tick.
pub type Positions = AHashMap<ManipulatorId, DVec3>;

/// A tracked hand or pointing device.
///
/// Queries returning [`None`] are treated as a transient tracking loss.
/// The affected value is left untouched for that tick.
pub trait Manipulator {
    /// Current world position of the pointer.
    fn position(&self) -> Option<DVec3>;
    /// Whether the grab point comes from physical proximity (a hand joint)
    /// rather than a projected ray.
    fn is_near_field(&self) -> bool;
    /// Pose of the grabbing joint, if available.
    fn grip_pose(&self) -> Option<Pose>;
    /// Linear velocity in world units per second.
    fn linear_velocity(&self) -> DVec3;
    /// Angular velocity in radians per second.
    fn angular_velocity(&self) -> DVec3;
}

/// Looks up manipulators by identifier without owning them.
///
/// A missing entry means the device is currently unavailable.
pub trait ManipulatorSource {
    fn manipulator(&self, id: ManipulatorId) -> Option<&dyn Manipulator>;
}

impl<M: Manipulator, S: BuildHasher> ManipulatorSource for HashMap<ManipulatorId, M, S> {
    fn manipulator(&self, id: ManipulatorId) -> Option<&dyn Manipulator> {
        self.get(&id).map(|manipulator| manipulator as &dyn Manipulator)
    }
}

impl<M: Manipulator> ManipulatorSource for AHashMap<ManipulatorId, M> {
    fn manipulator(&self, id: ManipulatorId) -> Option<&dyn Manipulator> {
        self.get(&id).map(|manipulator| manipulator as &dyn Manipulator)
    }
}

/// Plain snapshot of a manipulator's state.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ManipulatorSample {
    pub position: Option<DVec3>,
    pub near_field: bool,
    pub grip_pose: Option<Pose>,
    pub linear_velocity: DVec3,
    pub angular_velocity: DVec3,
}

impl ManipulatorSample {
    /// A far-field pointer at `position`.
    pub fn far(position: DVec3) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// A near-field grab with a known joint pose.
    pub fn near(grip_pose: Pose) -> Self {
        Self {
            position: Some(grip_pose.position),
            near_field: true,
            grip_pose: Some(grip_pose),
            ..Default::default()
        }
    }

    pub fn with_grip_pose(mut self, grip_pose: Pose) -> Self {
        self.grip_pose = Some(grip_pose);
        self
    }

    pub fn with_velocity(mut self, linear: DVec3, angular: DVec3) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }
}

impl Manipulator for ManipulatorSample {
    fn position(&self) -> Option<DVec3> {
        self.position
    }

    fn is_near_field(&self) -> bool {
        self.near_field
    }

    fn grip_pose(&self) -> Option<Pose> {
        self.grip_pose
    }

    fn linear_velocity(&self) -> DVec3 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }
}

/// Mean velocities of the active manipulators.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct VelocitySample {
    pub linear: DVec3,
    pub angular: DVec3,
}

#[derive(Debug, Copy, Clone)]
struct PointerEntry {
    near_field: bool,
}

/// The manipulators currently grabbing the target.
#[derive(Debug, Clone, Default)]
pub struct PointerSet {
    pointers: AHashMap<ManipulatorId, PointerEntry>,
    last_velocity: VelocitySample,
}

impl PointerSet {
    /// Adds a grabbing manipulator.
    ///
    /// Returns `false` without changing the set if the grab is not allowed by `config`
    /// or if `id` is already grabbing.
    pub fn add(
        &mut self,
        id: ManipulatorId,
        manipulator: &dyn Manipulator,
        config: &ManipulationConfig,
    ) -> bool {
        if self.pointers.contains_key(&id) {
            debug!(?id, "grab rejected: manipulator is already grabbing");
            return false;
        }

        if !self.pointers.is_empty() && !config.two_hand_allowed() {
            debug!(?id, "grab rejected: only one-handed manipulation is allowed");
            return false;
        }

        let near_field = manipulator.is_near_field();
        if !near_field && !config.allow_far_manipulation {
            debug!(?id, "grab rejected: far manipulation is not allowed");
            return false;
        }

        self.pointers.insert(id, PointerEntry { near_field });
        true
    }

    /// Removes a manipulator. Returns whether it was present.
    pub fn remove(&mut self, id: ManipulatorId) -> bool {
        self.pointers.remove(&id).is_some()
    }

    pub fn contains(&self, id: ManipulatorId) -> bool {
        self.pointers.contains_key(&id)
    }

    pub fn count(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Identifiers of the active manipulators in ascending order.
    pub fn ids(&self) -> Vec<ManipulatorId> {
        let mut ids = self.pointers.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// The manipulator with the lowest identifier.
    pub fn primary(&self) -> Option<ManipulatorId> {
        self.pointers.keys().min().copied()
    }

    /// Whether any active manipulator is near-field.
    pub fn has_near(&self) -> bool {
        self.pointers.values().any(|entry| entry.near_field)
    }

    /// Positions of the active manipulators that can currently be resolved.
    pub fn positions(&self, source: &dyn ManipulatorSource) -> Positions {
        self.pointers
            .keys()
            .filter_map(|&id| {
                let position = source.manipulator(id)?.position()?;
                Some((id, position))
            })
            .collect()
    }

    /// Mean position of the resolvable manipulators.
    ///
    /// [`None`] if the set is empty or no position can be resolved.
    pub fn centroid(&self, source: &dyn ManipulatorSource) -> Option<DVec3> {
        centroid(&self.positions(source))
    }

    /// Grip pose of the primary manipulator.
    pub fn grip_pose(&self, source: &dyn ManipulatorSource) -> Option<Pose> {
        source.manipulator(self.primary()?)?.grip_pose()
    }

    /// Mean linear velocity, if every active manipulator can be resolved.
    pub fn mean_velocity(&self, source: &dyn ManipulatorSource) -> Option<DVec3> {
        self.velocity_sample(source).map(|sample| sample.linear)
    }

    /// Mean angular velocity, if every active manipulator can be resolved.
    pub fn mean_angular_velocity(&self, source: &dyn ManipulatorSource) -> Option<DVec3> {
        self.velocity_sample(source).map(|sample| sample.angular)
    }

    /// Mean velocities, if the set is not empty and every active manipulator can be resolved.
    pub fn velocity_sample(&self, source: &dyn ManipulatorSource) -> Option<VelocitySample> {
        if self.pointers.is_empty() {
            return None;
        }

        let mut sample = VelocitySample::default();
        for &id in self.pointers.keys() {
            let manipulator = source.manipulator(id)?;
            sample.linear += manipulator.linear_velocity();
            sample.angular += manipulator.angular_velocity();
        }

        let count = self.pointers.len() as f64;
        sample.linear /= count;
        sample.angular /= count;

        Some(sample)
    }

    /// Samples the current velocities and remembers them if they could be resolved.
    pub fn record_velocity(&mut self, source: &dyn ManipulatorSource) -> VelocitySample {
        if let Some(sample) = self.velocity_sample(source) {
            self.last_velocity = sample;
        }
        self.last_velocity
    }

    /// The most recently recorded velocities.
    pub fn last_velocity(&self) -> VelocitySample {
        self.last_velocity
    }
}

/// Mean of the given positions.
pub(crate) fn centroid(positions: &Positions) -> Option<DVec3> {
    if positions.is_empty() {
        return None;
    }

    Some(positions.values().copied().sum::<DVec3>() / positions.len() as f64)
}
