use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use newton_relay::math::{Mat4, IDENTITY};
use newton_relay::mock::{JointKind, Mock};
use newton_relay::{Body, CallbackKind, Joint};

mod common;

#[test]
fn transform_reaches_its_body_only() {
    let (world, bodies) = common::world_with_bodies(2);
    let mut relay = common::relay(world);

    let mut moved = IDENTITY;
    moved[3] = [1.0, 2.0, 3.0, 1.0];
    Mock::set_matrix(bodies[0], moved);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    relay.set_transform_callback(bodies[0], move |body: Body, matrix: &Mat4, thread: usize| {
        seen_cb.lock().unwrap().push((body, *matrix, thread));
    });

    relay.update(Duration::from_millis(16));

    let seen = seen.lock().unwrap();
    assert_eq!(1, seen.len());
    assert_eq!(bodies[0], seen[0].0);
    assert_eq!([1.0, 2.0, 3.0, 1.0], seen[0].1[3]);
    assert_eq!(0, seen[0].2);
}

#[test]
fn force_and_torque_receives_timestep() {
    let (world, bodies) = common::world_with_bodies(1);
    let mut relay = common::relay(world);

    let steps = Arc::new(Mutex::new(Vec::new()));
    let steps_cb = Arc::clone(&steps);
    relay.set_force_and_torque_callback(bodies[0], move |_: Body, step: Duration, _: usize| {
        steps_cb.lock().unwrap().push(step);
    });

    relay.update(Duration::from_millis(250));
    relay.update(Duration::from_secs(1));

    assert_eq!(Some(1.0), Mock::last_timestep(world));
    assert_eq!(
        vec![Duration::from_millis(250), Duration::from_secs(1)],
        *steps.lock().unwrap()
    );
}

#[test]
fn registration_replaces_previous_handler() {
    let (world, bodies) = common::world_with_bodies(1);
    let mut relay = common::relay(world);

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    relay.set_force_and_torque_callback(bodies[0], move |_: Body, _: Duration, _: usize| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&second);
    relay.set_force_and_torque_callback(bodies[0], move |_: Body, _: Duration, _: usize| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    relay.update(Duration::from_millis(16));
    relay.update(Duration::from_millis(16));

    assert_eq!(0, first.load(Ordering::SeqCst));
    assert_eq!(2, second.load(Ordering::SeqCst));
    assert_eq!(1, relay.len());
}

#[test]
fn destructor_fires_once_and_releases_entries() {
    let (world, bodies) = common::world_with_bodies(2);
    let mut relay = common::relay(world);

    let destroyed = Arc::new(Mutex::new(Vec::new()));
    let destroyed_cb = Arc::clone(&destroyed);
    relay.set_body_destructor(bodies[0], move |body: Body| {
        destroyed_cb.lock().unwrap().push(body);
    });
    relay.set_transform_callback(bodies[0], |_: Body, _: &Mat4, _: usize| {});
    relay.set_transform_callback(bodies[1], |_: Body, _: &Mat4, _: usize| {});
    assert_eq!(3, relay.len());

    Mock::destroy_body(bodies[0]);
    assert_eq!(1, relay.collect());

    assert_eq!(vec![bodies[0]], *destroyed.lock().unwrap());
    assert_eq!(1, relay.len());
    assert!(!relay.is_registered(bodies[0], CallbackKind::BodyDestructor));
    assert!(!relay.is_registered(bodies[0], CallbackKind::Transform));
    assert!(relay.is_registered(bodies[1], CallbackKind::Transform));
}

#[test]
fn any_body_handler_installs_cleanup() {
    let (world, bodies) = common::world_with_bodies(1);
    let mut relay = common::relay(world);

    relay.set_force_and_torque_callback(bodies[0], |_: Body, _: Duration, _: usize| {});
    assert!(relay.is_registered(bodies[0], CallbackKind::ForceAndTorque));

    // no destructor handler, the relay still hears about the destruction
    Mock::destroy_body(bodies[0]);
    relay.update(Duration::from_millis(16));

    assert!(relay.is_empty());
}

#[test]
fn destroying_a_body_destroys_its_joints() {
    let (world, bodies) = common::world_with_bodies(2);
    let mut relay = common::relay(world);
    let joint = Mock::create_joint(JointKind::Ball, bodies[0], Some(bodies[1]));

    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&destroyed);
    relay.set_joint_destructor(joint, move |_: Joint| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    Mock::destroy_body(bodies[1]);
    relay.collect();

    assert_eq!(1, destroyed.load(Ordering::SeqCst));
    assert!(!Mock::is_alive(joint));
    assert!(relay.is_empty());
}

#[test]
fn leave_world_notifies_body() {
    let (world, bodies) = common::world_with_bodies(2);
    let mut relay = common::relay(world);

    let left = Arc::new(Mutex::new(Vec::new()));
    let left_cb = Arc::clone(&left);
    relay.set_body_leave_world(move |body: Body, thread: usize| {
        left_cb.lock().unwrap().push((body, thread));
    });

    assert!(Mock::leave_world(bodies[1]));
    assert_eq!(vec![(bodies[1], 0)], *left.lock().unwrap());
    assert!(relay.is_registered(world, CallbackKind::BodyLeaveWorld));
}

#[test]
fn buoyancy_plane_is_forwarded() {
    let (world, bodies) = common::world_with_bodies(1);
    let relay = common::relay(world);

    let collision = Mock::create_collision();
    let body = Mock::create_body(world, collision, Mock::create_group(world));
    Mock::set_collision_id(collision, 42);

    let mut ids = Vec::new();
    relay.add_buoyancy_force(body, &Default::default(), |id: i32, _: &Mat4| {
        ids.push(id);
        Some([0.0, 1.0, 0.0, 2.5])
    });
    assert_eq!(vec![42], ids);
    assert_eq!(Some([0.0, 1.0, 0.0, 2.5]), Mock::buoyancy_plane(body));

    relay.add_buoyancy_force(bodies[0], &Default::default(), |_: i32, _: &Mat4| None);
    assert_eq!(None, Mock::buoyancy_plane(bodies[0]));
}

#[test]
fn dropped_relay_detaches_from_world() {
    let (world, bodies) = common::world_with_bodies(1);
    let calls = Arc::new(AtomicUsize::new(0));

    {
        let mut relay = common::relay(world);
        let counter = Arc::clone(&calls);
        relay.set_force_and_torque_callback(bodies[0], move |_: Body, _: Duration, _: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        relay.update(Duration::from_millis(16));
    }

    // the trampoline is still installed but finds no relay
    let mut relay = common::relay(world);
    relay.update(Duration::from_millis(16));
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[test]
fn body_callbacks_receive_thread_index() {
    let (world, bodies) = common::world_with_bodies(1);
    let mut relay = common::relay(world);
    Mock::set_thread_index(world, 3);

    let threads = Arc::new(Mutex::new(Vec::new()));
    let force_cb = Arc::clone(&threads);
    relay.set_force_and_torque_callback(bodies[0], move |_: Body, _: Duration, thread: usize| {
        force_cb.lock().unwrap().push(("force", thread));
    });
    let transform_cb = Arc::clone(&threads);
    relay.set_transform_callback(bodies[0], move |_: Body, _: &Mat4, thread: usize| {
        transform_cb.lock().unwrap().push(("transform", thread));
    });
    let leave_cb = Arc::clone(&threads);
    relay.set_body_leave_world(move |_: Body, thread: usize| {
        leave_cb.lock().unwrap().push(("leave", thread));
    });

    relay.update(Duration::from_millis(16));
    assert!(Mock::leave_world(bodies[0]));

    assert_eq!(
        vec![("force", 3), ("transform", 3), ("leave", 3)],
        *threads.lock().unwrap()
    );
}

#[test]
fn destroyed_body_counts_until_collected() {
    let (world, bodies) = common::world_with_bodies(1);
    let mut relay = common::relay(world);
    relay.set_transform_callback(bodies[0], |_: Body, _: &Mat4, _: usize| {});
    assert_eq!(1, relay.len());

    Mock::destroy_body(bodies[0]);
    assert!(relay.is_registered(bodies[0], CallbackKind::Transform));
    assert_eq!(1, relay.len());

    assert_eq!(1, relay.collect());
    assert!(!relay.is_registered(bodies[0], CallbackKind::Transform));
    assert!(relay.is_empty());
}
