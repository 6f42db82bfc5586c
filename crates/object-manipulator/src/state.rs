use enumset::{EnumSet, EnumSetType, enum_set};

use crate::config::ManipulationConfig;

/// Independent behaviors that make up a [`ManipulationState`].
#[derive(Debug, EnumSetType, Hash)]
pub enum Facet {
    Moving,
    Rotating,
    Scaling,
}

/// State of an [`ObjectManipulator`](crate::ObjectManipulator).
///
/// Only [`ManipulationState::Moving`] is entered with a single manipulator.
/// Every state with rotation or scaling is entered through a
/// [`TwoHandedMode`](crate::TwoHandedMode) once two or more manipulators grab the target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ManipulationState {
    /// Nothing is being manipulated.
    #[default]
    Idle,
    Moving,
    Scaling,
    Rotating,
    MovingScaling,
    RotatingScaling,
    MovingRotatingScaling,
}

impl ManipulationState {
    /// Behaviors active in this state.
    pub const fn facets(self) -> EnumSet<Facet> {
        match self {
            Self::Idle => EnumSet::empty(),
            Self::Moving => enum_set!(Facet::Moving),
            Self::Scaling => enum_set!(Facet::Scaling),
            Self::Rotating => enum_set!(Facet::Rotating),
            Self::MovingScaling => enum_set!(Facet::Moving | Facet::Scaling),
            Self::RotatingScaling => enum_set!(Facet::Rotating | Facet::Scaling),
            Self::MovingRotatingScaling => {
                enum_set!(Facet::Moving | Facet::Rotating | Facet::Scaling)
            }
        }
    }

    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }

    pub fn is_moving(self) -> bool {
        self.facets().contains(Facet::Moving)
    }

    pub fn is_rotating(self) -> bool {
        self.facets().contains(Facet::Rotating)
    }

    pub fn is_scaling(self) -> bool {
        self.facets().contains(Facet::Scaling)
    }

    /// Whether this state requires two or more manipulators.
    pub fn is_two_handed(self) -> bool {
        self.is_rotating() || self.is_scaling()
    }

    /// The state to be in with `pointer_count` active manipulators.
    pub(crate) fn next(self, pointer_count: usize, config: &ManipulationConfig) -> Self {
        match self {
            Self::Idle | Self::Moving => {
                if pointer_count == 0 {
                    Self::Idle
                } else if pointer_count == 1 && config.one_hand_allowed() {
                    Self::Moving
                } else if pointer_count > 1 && config.two_hand_allowed() {
                    config.two_handed_mode.state()
                } else {
                    self
                }
            }
            Self::Scaling
            | Self::Rotating
            | Self::MovingScaling
            | Self::RotatingScaling
            | Self::MovingRotatingScaling => match pointer_count {
                0 => Self::Idle,
                1 => Self::Moving,
                _ => self,
            },
        }
    }
}
