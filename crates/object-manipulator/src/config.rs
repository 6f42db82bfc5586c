use enumset::{EnumSet, EnumSetType};

use crate::error::ConfigError;
use crate::math::Axis;
use crate::state::ManipulationState;

/// The default smoothing coefficient.
pub const DEFAULT_SMOOTHING: f64 = 0.001;

/// Configuration of an [`ObjectManipulator`](crate::ObjectManipulator).
///
/// Defines which grabs are accepted and how the target reacts to them.
/// The configuration is fixed for the lifetime of the manipulator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ManipulationConfig {
    /// How many manipulators may grab the target at once.
    pub arity: ManipulationArity,
    /// What happens when two or more manipulators grab the target.
    pub two_handed_mode: TwoHandedMode,
    /// Whether far-field manipulators (rays) may grab the target.
    pub allow_far_manipulation: bool,
    /// One-handed rotation behavior for near-field grabs.
    pub one_hand_rotation_near: OneHandRotation,
    /// One-handed rotation behavior for far-field grabs.
    pub one_hand_rotation_far: OneHandRotation,
    /// If set, rotations are limited to this world axis.
    pub rotation_constraint: Option<Axis>,
    /// World axes the target may move along.
    pub movement_axes: EnumSet<Axis>,
    /// Smoothing coefficient in `[0, 1)`. Zero disables smoothing.
    pub smoothing: f64,
    /// Minimum and maximum uniform scale factor, relative to the scale at the
    /// start of a two-handed grab.
    pub scale_limits: Option<(f64, f64)>,
    /// Velocities handed back to the rigid body on release.
    pub release_behavior: EnumSet<ReleaseBehavior>,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        Self {
            arity: ManipulationArity::default(),
            two_handed_mode: TwoHandedMode::default(),
            allow_far_manipulation: true,
            one_hand_rotation_near: OneHandRotation::AboutGrabPoint,
            one_hand_rotation_far: OneHandRotation::AboutObjectCenter,
            rotation_constraint: None,
            movement_axes: EnumSet::all(),
            smoothing: DEFAULT_SMOOTHING,
            scale_limits: None,
            release_behavior: EnumSet::all(),
        }
    }
}

impl ManipulationConfig {
    /// Checks that the numeric settings are within their valid ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.smoothing.is_finite() || !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }

        if let Some((min, max)) = self.scale_limits {
            let valid = min.is_finite() && max.is_finite() && min > 0.0 && min <= max;
            if !valid {
                return Err(ConfigError::InvalidScaleLimits { min, max });
            }
        }

        Ok(())
    }

    pub(crate) fn one_hand_allowed(&self) -> bool {
        self.arity != ManipulationArity::TwoHanded
    }

    pub(crate) fn two_hand_allowed(&self) -> bool {
        self.arity != ManipulationArity::OneHanded
    }

    pub(crate) fn one_hand_rotation(&self, near_field: bool) -> OneHandRotation {
        if near_field {
            self.one_hand_rotation_near
        } else {
            self.one_hand_rotation_far
        }
    }
}

/// Number of manipulators that may grab the target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ManipulationArity {
    /// Only a single manipulator at a time.
    OneHanded,
    /// Manipulation starts once two manipulators grab the target.
    TwoHanded,
    /// Either one or two manipulators.
    #[default]
    OneAndTwoHanded,
}

/// Combination of behaviors active while two manipulators grab the target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TwoHandedMode {
    Scale,
    Rotate,
    MoveScale,
    RotateScale,
    #[default]
    MoveRotateScale,
}

impl TwoHandedMode {
    /// The manipulation state entered in this mode.
    pub fn state(self) -> ManipulationState {
        match self {
            Self::Scale => ManipulationState::Scaling,
            Self::Rotate => ManipulationState::Rotating,
            Self::MoveScale => ManipulationState::MovingScaling,
            Self::RotateScale => ManipulationState::RotatingScaling,
            Self::MoveRotateScale => ManipulationState::MovingRotatingScaling,
        }
    }
}

/// How a single manipulator rotates the target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum OneHandRotation {
    /// The target keeps its rotation and only moves.
    #[default]
    KeepRotation,
    /// The target follows the manipulator's rotation around its own center.
    AboutObjectCenter,
    /// The target stays rigidly attached to the grab point.
    AboutGrabPoint,
}

/// Velocity handed back to the rigid body when the last manipulator lets go.
#[derive(Debug, EnumSetType, Hash)]
pub enum ReleaseBehavior {
    KeepVelocity,
    KeepAngularVelocity,
}
