use tracing::trace;

use crate::logic::Handlebar;
use crate::math::{Axis, DQuat, DVec3, EPSILON_SQUARED, project_on_plane, twist};
use crate::pointer::Positions;

/// Rotates the target by the change in direction of the handlebar between two manipulators.
///
/// The rotation is integrated tick over tick instead of being recomputed from the
/// handlebar at grab start, so that twisting the handlebar by more than half a turn
/// over many ticks does not flip the target.
#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct RotateLogic {
    handlebar: Option<Handlebar>,
    /// Handlebar direction of the previous resolvable tick.
    previous: Option<DVec3>,
    constraint: Option<Axis>,
}

impl RotateLogic {
    pub(crate) fn setup(
        &mut self,
        handlebar: Option<Handlebar>,
        positions: &Positions,
        constraint: Option<Axis>,
    ) {
        self.handlebar = handlebar;
        self.constraint = constraint;
        self.previous = self.direction(positions);
    }

    /// Switches to a new pair of manipulators, continuing from the current rotation.
    pub(crate) fn rebase(&mut self, handlebar: Option<Handlebar>, positions: &Positions) {
        self.handlebar = handlebar;
        self.previous = self.direction(positions);
    }

    /// Applies the rotation of the handlebar since the previous tick to `rotation`.
    pub(crate) fn update(&mut self, positions: &Positions, rotation: DQuat) -> DQuat {
        let Some(current) = self.direction(positions) else {
            trace!("handlebar unresolved, rotation unchanged");
            return rotation;
        };

        let Some(previous) = self.previous.replace(current) else {
            return rotation;
        };

        let mut delta = DQuat::from_rotation_arc(previous, current);
        if let Some(axis) = self.constraint {
            // Opposite directions give an arbitrary arc axis.
            delta = twist(delta, axis.unit());
        }

        (delta * rotation).normalize()
    }

    /// Normalized handlebar direction, projected onto the plane of the
    /// constraint axis if there is one.
    fn direction(&self, positions: &Positions) -> Option<DVec3> {
        let mut vector = self.handlebar?.vector(positions)?;
        if let Some(axis) = self.constraint {
            vector = project_on_plane(vector, axis.unit());
        }

        if vector.length_squared() < EPSILON_SQUARED {
            return None;
        }

        Some(vector.normalize())
    }
}
