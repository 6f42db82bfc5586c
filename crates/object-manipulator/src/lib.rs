//! Moves, rotates and scales 3d objects with one or two tracked manipulators, such as
//! hands or pointing devices.
//!
//! Grab and release events are turned into a small state machine: a single manipulator
//! moves the target (optionally rotating it with the grip), while two manipulators
//! rotate, scale and move it according to the configured [`TwoHandedMode`]. Updates are
//! smoothed with frame-rate independent damping, and on release the inertia of the
//! manipulators can be handed back to a rigid body.
//!
//! # Usage
//!
//! If you are using the [Bevy](https://bevyengine.org/) game engine, you will most likely
//! want to use [object-manipulator-bevy](https://docs.rs/object-manipulator-bevy).
//!
//! Alternatively, this library can be used with any framework. Implement
//! [`ManipulatorSource`] for your input system (or snapshot your devices into a map of
//! [`ManipulatorSample`]s), forward grab events to [`ObjectManipulator::on_grab_begin`] and
//! [`ObjectManipulator::on_grab_end`], and call [`ObjectManipulator::tick`] once per frame.
//!
//! ```
//! use object_manipulator::prelude::*;
//!
//! let mut manipulator = ObjectManipulator::default();
//! let mut transform = Transform::default();
//!
//! let mut hands = AHashMap::new();
//! hands.insert(ManipulatorId(0), ManipulatorSample::far(DVec3::new(0.0, 1.0, 0.0)));
//!
//! let mut ctx = ManipulationContext::new(&hands, &mut transform);
//! assert!(manipulator.on_grab_begin(ManipulatorId(0), &mut ctx));
//! manipulator.tick(1.0 / 60.0, &mut ctx);
//!
//! assert_eq!(manipulator.state(), ManipulationState::Moving);
//! ```

mod logic;

pub mod config;
pub mod error;
pub mod manipulator;
pub mod math;
pub mod pointer;
pub mod release;
pub mod state;

pub mod prelude;

pub use crate::config::{
    DEFAULT_SMOOTHING, ManipulationArity, ManipulationConfig, OneHandRotation, ReleaseBehavior,
    TwoHandedMode,
};
pub use crate::error::ConfigError;
pub use crate::manipulator::{ManipulationContext, ManipulationEvent, ObjectManipulator};
pub use crate::math::{Axis, Pose};
pub use crate::pointer::{
    Manipulator, ManipulatorId, ManipulatorSample, ManipulatorSource, PointerSet, VelocitySample,
};
pub use crate::release::{ReleasePolicy, RigidBody};
pub use crate::state::{Facet, ManipulationState};

pub use enumset::{EnumSet, enum_set};

pub use mint;
