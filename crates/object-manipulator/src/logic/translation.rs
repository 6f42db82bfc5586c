use enumset::EnumSet;

use crate::math::{Axis, DVec3, constrain_translation};

/// Candidate reference points for movement, sampled once per tick.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct MoveReference {
    /// Mean position of the grabbing manipulators.
    pub(crate) centroid: Option<DVec3>,
    /// Position of the grabbing joint of a near-field grab.
    pub(crate) grab_point: Option<DVec3>,
}

/// Keeps the target at a fixed offset from the point driving it.
#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct MoveLogic {
    /// Target position minus grab point, captured at grab start.
    grab_offset: Option<DVec3>,
    /// Target position minus centroid, captured at grab start.
    centroid_offset: Option<DVec3>,
    /// Near grabs follow the grab point instead of the coarser centroid
    /// while the grab point can be resolved.
    near_grab: bool,
    /// Target position at grab start, kept on constrained axes.
    start: DVec3,
    axes: EnumSet<Axis>,
}

impl MoveLogic {
    pub(crate) fn setup(
        &mut self,
        reference: MoveReference,
        near_grab: bool,
        anchor: DVec3,
        axes: EnumSet<Axis>,
    ) {
        self.near_grab = near_grab;
        self.start = anchor;
        self.axes = axes;
        self.grab_offset = reference
            .grab_point
            .filter(|_| near_grab)
            .map(|point| anchor - point);
        self.centroid_offset = reference.centroid.map(|point| anchor - point);
    }

    /// New target position, or [`None`] if no reference point can be resolved.
    ///
    /// A near grab without a grab point falls back to the centroid. If a reference
    /// point could not be resolved at setup, its offset is captured relative to
    /// `anchor` on the first resolvable update instead.
    pub(crate) fn update(&mut self, reference: MoveReference, anchor: DVec3) -> Option<DVec3> {
        let (point, slot) = match reference.grab_point.filter(|_| self.near_grab) {
            Some(point) => (point, &mut self.grab_offset),
            None => (reference.centroid?, &mut self.centroid_offset),
        };

        let Some(offset) = *slot else {
            *slot = Some(anchor - point);
            return None;
        };

        Some(self.constrain(point + offset))
    }

    /// Discards the offsets so that they are captured again on the next update.
    pub(crate) fn reset_offset(&mut self) {
        self.grab_offset = None;
        self.centroid_offset = None;
    }

    /// Applies the movement axis constraint to a target position.
    pub(crate) fn constrain(&self, position: DVec3) -> DVec3 {
        constrain_translation(self.start, position, self.axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far(centroid: DVec3) -> MoveReference {
        MoveReference {
            centroid: Some(centroid),
            grab_point: None,
        }
    }

    #[test]
    fn far_grab_preserves_offset_to_centroid() {
        let mut logic = MoveLogic::default();
        logic.setup(
            far(DVec3::new(1.0, 0.0, 0.0)),
            false,
            DVec3::new(1.0, 0.0, 2.0),
            EnumSet::all(),
        );

        let moved = logic.update(far(DVec3::new(3.0, 1.0, 0.0)), DVec3::ZERO);
        assert_eq!(moved, Some(DVec3::new(3.0, 1.0, 2.0)));
    }

    #[test]
    fn near_grab_follows_grab_point() {
        let mut logic = MoveLogic::default();
        let reference = MoveReference {
            centroid: Some(DVec3::new(5.0, 5.0, 5.0)),
            grab_point: Some(DVec3::new(0.0, 1.0, 0.0)),
        };
        logic.setup(reference, true, DVec3::new(0.0, 1.5, 0.0), EnumSet::all());

        let moved = logic.update(
            MoveReference {
                centroid: Some(DVec3::new(9.0, 9.0, 9.0)),
                grab_point: Some(DVec3::new(1.0, 1.0, 0.0)),
            },
            DVec3::ZERO,
        );
        assert_eq!(moved, Some(DVec3::new(1.0, 1.5, 0.0)));
    }

    #[test]
    fn lost_grab_point_falls_back_to_centroid() {
        let mut logic = MoveLogic::default();
        let reference = MoveReference {
            centroid: Some(DVec3::ZERO),
            grab_point: Some(DVec3::new(0.0, 0.5, 0.0)),
        };
        logic.setup(reference, true, DVec3::ONE, EnumSet::all());

        let lost = MoveReference {
            centroid: Some(DVec3::X),
            grab_point: None,
        };
        assert_eq!(logic.update(lost, DVec3::ONE), Some(DVec3::new(2.0, 1.0, 1.0)));
        assert_eq!(logic.update(MoveReference::default(), DVec3::ONE), None);
    }

    #[test]
    fn near_grab_without_grab_point_follows_centroid() {
        let mut logic = MoveLogic::default();
        logic.setup(far(DVec3::ZERO), true, DVec3::Y, EnumSet::all());

        let moved = logic.update(far(DVec3::new(3.0, 0.0, 0.0)), DVec3::ZERO);
        assert_eq!(moved, Some(DVec3::new(3.0, 1.0, 0.0)));
    }

    #[test]
    fn unresolved_setup_captures_offset_on_first_update() {
        let mut logic = MoveLogic::default();
        logic.setup(MoveReference::default(), false, DVec3::ONE, EnumSet::all());

        let anchor = DVec3::new(0.0, 2.0, 0.0);
        assert_eq!(logic.update(far(DVec3::ZERO), anchor), None);
        assert_eq!(logic.update(far(DVec3::X), anchor), Some(DVec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn movement_is_limited_to_allowed_axes() {
        let mut logic = MoveLogic::default();
        logic.setup(far(DVec3::ZERO), false, DVec3::new(0.0, 1.0, 0.0), Axis::X.into());

        let moved = logic.update(far(DVec3::new(2.0, 3.0, 4.0)), DVec3::ZERO);
        assert_eq!(moved, Some(DVec3::new(2.0, 1.0, 0.0)));
    }
}
