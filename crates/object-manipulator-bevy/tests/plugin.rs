use std::time::Duration;

use bevy_app::App;
use bevy_ecs::message::{Message, Messages};
use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use bevy_time::Time;
use bevy_transform::components::{GlobalTransform, Transform};
use object_manipulator_bevy::prelude::*;

fn app() -> App {
    let mut app = App::new();
    app.init_resource::<Time>().add_plugins(ManipulationPlugin);
    app
}

fn unsmoothed() -> ManipulationConfig {
    ManipulationConfig {
        smoothing: 0.0,
        one_hand_rotation_far: OneHandRotation::KeepRotation,
        ..Default::default()
    }
}

fn spawn_pointer(app: &mut App, pointer: ManipulatorPointer, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((pointer, GlobalTransform::from_translation(position)))
        .id()
}

fn spawn_target(app: &mut App, config: ManipulationConfig) -> Entity {
    app.world_mut()
        .spawn((
            ManipulationTarget::new(config).unwrap(),
            Transform::default(),
            ManipulationRigidBody::default(),
        ))
        .id()
}

fn move_pointer(app: &mut App, pointer: Entity, position: Vec3) {
    *app.world_mut().get_mut::<GlobalTransform>(pointer).unwrap() =
        GlobalTransform::from_translation(position);
}

fn step(app: &mut App) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_millis(16));
    app.update();
}

fn drain<M: Message>(app: &mut App) -> Vec<M> {
    app.world_mut().resource_mut::<Messages<M>>().drain().collect()
}

#[test]
fn grab_moves_target_and_reports_start_and_end() {
    let mut app = app();
    let pointer = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::new(-1.0, 0.0, 0.0));
    let target = spawn_target(&mut app, unsmoothed());

    app.world_mut()
        .write_message(GrabInput::Begin { pointer, target });
    step(&mut app);

    let world = app.world();
    assert_eq!(
        world.get::<ManipulationTarget>(target).unwrap().state(),
        ManipulationState::Moving
    );
    assert_eq!(
        drain::<ManipulationMessage>(&mut app),
        vec![ManipulationMessage {
            target,
            event: ManipulationEvent::Started { near_field: false },
        }]
    );

    move_pointer(&mut app, pointer, Vec3::new(1.0, 2.0, 0.0));
    step(&mut app);
    let transform = app.world().get::<Transform>(target).unwrap();
    assert_eq!(transform.translation, Vec3::new(2.0, 2.0, 0.0));

    app.world_mut()
        .write_message(GrabInput::End { pointer, target });
    step(&mut app);
    assert!(!app.world().get::<ManipulationTarget>(target).unwrap().is_active());
    assert_eq!(
        drain::<ManipulationMessage>(&mut app),
        vec![ManipulationMessage {
            target,
            event: ManipulationEvent::Ended,
        }]
    );
}

#[test]
fn second_grab_is_rejected_when_one_handed() {
    let mut app = app();
    let first = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::ZERO);
    let second = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::X);
    let target = spawn_target(
        &mut app,
        ManipulationConfig {
            arity: ManipulationArity::OneHanded,
            ..unsmoothed()
        },
    );

    app.world_mut().write_message(GrabInput::Begin {
        pointer: first,
        target,
    });
    app.world_mut().write_message(GrabInput::Begin {
        pointer: second,
        target,
    });
    step(&mut app);

    assert_eq!(
        drain::<GrabRejected>(&mut app),
        vec![GrabRejected {
            pointer: second,
            target,
        }]
    );
    let manipulation = app.world().get::<ManipulationTarget>(target).unwrap();
    assert_eq!(manipulation.manipulator().pointer_count(), 1);
}

#[test]
fn grabbing_a_non_target_is_rejected() {
    let mut app = app();
    let pointer = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::ZERO);
    let target = app.world_mut().spawn(Transform::default()).id();

    app.world_mut()
        .write_message(GrabInput::Begin { pointer, target });
    step(&mut app);

    assert_eq!(
        drain::<GrabRejected>(&mut app),
        vec![GrabRejected { pointer, target }]
    );
    assert!(drain::<ManipulationMessage>(&mut app).is_empty());
}

#[test]
fn two_pointers_scale_the_target() {
    let mut app = app();
    let first = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::new(-1.0, 0.0, 0.0));
    let second = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::new(1.0, 0.0, 0.0));
    let target = spawn_target(
        &mut app,
        ManipulationConfig {
            two_handed_mode: TwoHandedMode::Scale,
            ..unsmoothed()
        },
    );

    app.world_mut().write_message(GrabInput::Begin {
        pointer: first,
        target,
    });
    app.world_mut().write_message(GrabInput::Begin {
        pointer: second,
        target,
    });
    step(&mut app);
    assert_eq!(
        app.world().get::<ManipulationTarget>(target).unwrap().state(),
        ManipulationState::Scaling
    );

    move_pointer(&mut app, second, Vec3::new(3.0, 0.0, 0.0));
    step(&mut app);

    let transform = app.world().get::<Transform>(target).unwrap();
    assert!(transform.scale.abs_diff_eq(Vec3::splat(2.0), 1e-6));
    assert_eq!(transform.translation, Vec3::ZERO);
}

#[test]
fn release_hands_velocity_to_rigid_body() {
    let mut app = app();
    let pointer = spawn_pointer(
        &mut app,
        ManipulatorPointer {
            linear_velocity: Vec3::new(0.0, 0.0, 2.0),
            angular_velocity: Vec3::new(0.0, 1.0, 0.0),
            ..ManipulatorPointer::far()
        },
        Vec3::ZERO,
    );
    let target = spawn_target(&mut app, unsmoothed());

    app.world_mut()
        .write_message(GrabInput::Begin { pointer, target });
    step(&mut app);
    assert!(app.world().get::<ManipulationRigidBody>(target).unwrap().kinematic);

    app.world_mut()
        .write_message(GrabInput::End { pointer, target });
    step(&mut app);

    let body = app.world().get::<ManipulationRigidBody>(target).unwrap();
    assert!(!body.kinematic);
    assert_eq!(body.linear_velocity, Vec3::new(0.0, 0.0, 2.0));
    assert_eq!(body.angular_velocity, Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn untracked_pointer_leaves_target_in_place() {
    let mut app = app();
    let pointer = spawn_pointer(&mut app, ManipulatorPointer::far(), Vec3::ZERO);
    let target = spawn_target(&mut app, unsmoothed());

    app.world_mut()
        .write_message(GrabInput::Begin { pointer, target });
    step(&mut app);

    app.world_mut()
        .get_mut::<ManipulatorPointer>(pointer)
        .unwrap()
        .is_tracked = false;
    move_pointer(&mut app, pointer, Vec3::new(5.0, 0.0, 0.0));
    step(&mut app);

    let transform = app.world().get::<Transform>(target).unwrap();
    assert_eq!(transform.translation, Vec3::ZERO);
}

#[test]
fn disabled_target_rejects_grabs() {
    let mut app = app();
    let pointer = spawn_pointer(&mut app, ManipulatorPointer::near(), Vec3::ZERO);
    let mut manipulation = ManipulationTarget::default();
    manipulation.is_enabled = false;
    let target = app
        .world_mut()
        .spawn((manipulation, Transform::default()))
        .id();

    app.world_mut()
        .write_message(GrabInput::Begin { pointer, target });
    step(&mut app);

    assert_eq!(
        drain::<GrabRejected>(&mut app),
        vec![GrabRejected { pointer, target }]
    );
    assert!(!app.world().get::<ManipulationTarget>(target).unwrap().is_active());
}
