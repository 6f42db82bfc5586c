use tracing::trace;

use crate::logic::Handlebar;
use crate::math::DVec3;
use crate::pointer::Positions;

/// Handlebar lengths below this are too short to scale from.
pub(crate) const MIN_HANDLEBAR_LENGTH: f64 = 1e-4;

/// Scales the target uniformly by the change in distance between two manipulators.
#[derive(Debug, Copy, Clone)]
pub(crate) struct ScaleLogic {
    handlebar: Option<Handlebar>,
    /// Handlebar length at grab start.
    start_distance: Option<f64>,
    /// Target scale at grab start.
    start_scale: DVec3,
    /// Latest scale returned by [`ScaleLogic::update`].
    last_scale: DVec3,
    limits: Option<(f64, f64)>,
}

impl Default for ScaleLogic {
    fn default() -> Self {
        Self {
            handlebar: None,
            start_distance: None,
            start_scale: DVec3::ONE,
            last_scale: DVec3::ONE,
            limits: None,
        }
    }
}

impl ScaleLogic {
    pub(crate) fn setup(
        &mut self,
        handlebar: Option<Handlebar>,
        positions: &Positions,
        scale: DVec3,
        limits: Option<(f64, f64)>,
    ) {
        self.handlebar = handlebar;
        self.start_scale = scale;
        self.last_scale = scale;
        self.limits = limits;
        self.start_distance = self.distance(positions);
    }

    /// Switches to a new pair of manipulators, continuing from the latest scale.
    pub(crate) fn rebase(&mut self, handlebar: Option<Handlebar>, positions: &Positions) {
        self.handlebar = handlebar;
        self.start_scale = self.last_scale;
        self.start_distance = self.distance(positions);
    }

    /// Scale for the current handlebar length, or [`None`] if it cannot be determined.
    ///
    /// A degenerate handlebar at grab start is a no-op: the scale is left untouched
    /// and the start length is captured again on the next tick with a usable handlebar.
    pub(crate) fn update(&mut self, positions: &Positions) -> Option<DVec3> {
        let Some(distance) = self.distance(positions) else {
            trace!("handlebar unresolved, scale unchanged");
            return None;
        };

        let start_distance = match self.start_distance {
            Some(start) if start >= MIN_HANDLEBAR_LENGTH => start,
            _ => {
                trace!(distance, "handlebar too short at grab start, scale unchanged");
                self.start_scale = self.last_scale;
                self.start_distance = Some(distance);
                return None;
            }
        };

        let mut factor = distance / start_distance;
        if let Some((min, max)) = self.limits {
            factor = factor.clamp(min, max);
        }

        self.last_scale = self.start_scale * factor;
        Some(self.last_scale)
    }

    fn distance(&self, positions: &Positions) -> Option<f64> {
        self.handlebar?
            .vector(positions)
            .map(|vector| vector.length())
    }
}
