pub use crate::config::*;
pub use crate::error::ConfigError;
pub use crate::manipulator::{ManipulationContext, ManipulationEvent, ObjectManipulator};
pub use crate::math::{Axis, DQuat, DVec3, Pose, Transform};
pub use crate::pointer::{
    Manipulator, ManipulatorId, ManipulatorSample, ManipulatorSource, PointerSet, VelocitySample,
};
pub use crate::release::{ReleasePolicy, RigidBody};
pub use crate::state::{Facet, ManipulationState};

pub use ahash::AHashMap;
pub use enumset::{EnumSet, enum_set};
