pub use crate::{
    GrabInput, GrabRejected, ManipulationMessage, ManipulationPlugin, ManipulationRigidBody,
    ManipulationTarget, ManipulatorPointer,
};

pub use object_manipulator::{
    Axis, ManipulationArity, ManipulationConfig, ManipulationEvent, ManipulationState,
    OneHandRotation, ReleaseBehavior, TwoHandedMode,
};
pub use object_manipulator::{EnumSet, enum_set};
