use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use newton_relay::handle::Handle;
use newton_relay::math::{Vec3, Vertices, IDENTITY};
use newton_relay::mock::Mock;
use newton_relay::{Body, CallbackKind, Collision, Error};

mod common;

fn triangle() -> Vec<Vec3> {
    vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]
}

#[test]
fn tree_ray_cast_adjusts_hit() {
    let (world, _) = common::world_with_bodies(0);
    let mut relay = common::relay(world);
    let tree = Mock::create_tree_collision(vec![(7, triangle())]);
    let body = Mock::create_body(world, tree, Mock::create_group(world));

    relay.set_tree_ray_cast_callback(tree, |_: Body, t: Collision, param: f32, normal: &Vec3, face: i32| {
        assert_eq!([0.0, 1.0, 0.0], *normal);
        assert!(Mock::is_alive(t));
        if face == 7 {
            param * 0.5
        } else {
            param
        }
    });

    assert_eq!(Some(0.25), Mock::tree_ray_hit(body, tree, 0.5, [0.0, 1.0, 0.0], 7));
    assert_eq!(Some(0.5), Mock::tree_ray_hit(body, tree, 0.5, [0.0, 1.0, 0.0], 1));

    assert_eq!(1, relay.release(tree));
    assert!(!relay.is_registered(tree, CallbackKind::TreeRayCast));

    // the trampoline stays installed and leaves the hit untouched
    assert_eq!(Some(0.5), Mock::tree_ray_hit(body, tree, 0.5, [0.0, 1.0, 0.0], 7));
}

#[test]
fn static_debug_reports_faces() {
    let (world, bodies) = common::world_with_bodies(1);
    let mut relay = common::relay(world);
    let tree = Mock::create_tree_collision(Vec::new());
    let ground = Mock::create_body(world, tree, Mock::create_group(world));

    let faces = Arc::new(Mutex::new(Vec::new()));
    let faces_cb = Arc::clone(&faces);
    relay.set_static_debug_callback(tree, move |_: Body, body: Body, face: i32, vertices: Vertices<'_>| {
        let vertices: Vec<Vec3> = vertices.iter().collect();
        faces_cb.lock().unwrap().push((body, face, vertices));
    });

    assert!(Mock::debug_collide(ground, bodies[0], 3, &triangle()));
    assert_eq!(vec![(bodies[0], 3, triangle())], *faces.lock().unwrap());
}

#[test]
fn polygons_of_a_collision() {
    let (world, _) = common::world_with_bodies(0);
    let relay = common::relay(world);
    let square = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
    let tree = Mock::create_tree_collision(vec![(1, triangle()), (2, square.clone())]);

    let mut polygons = Vec::new();
    relay.for_each_polygon(tree, &IDENTITY, |vertices: Vertices, face: i32| {
        polygons.push((face, vertices.iter().collect::<Vec<_>>()));
    });
    assert_eq!(vec![(1, triangle()), (2, square)], polygons);
}

#[test]
fn serialization_round_trip() {
    let (world, _) = common::world_with_bodies(0);
    let relay = common::relay(world);
    let collision = Mock::create_collision();

    let mut data = Vec::new();
    relay.serialize_collision(collision, &mut data).unwrap();

    let copy = relay.deserialize_collision(&data[..]).unwrap();
    assert_ne!(collision, copy.collision());
    assert_eq!(Mock::serialized(collision), Mock::serialized(copy.collision()));

    // dropping the copy destroys the engine collision
    let handle = Handle::from_ptr(copy.as_raw());
    drop(copy);
    assert!(!Mock::is_alive(handle));
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn serialization_keeps_first_write_error() {
    let (world, _) = common::world_with_bodies(0);
    let relay = common::relay(world);

    match relay.serialize_collision(Mock::create_collision(), BrokenPipe) {
        Err(Error::Io(err)) => assert_eq!(io::ErrorKind::BrokenPipe, err.kind()),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn deserialization_errors() {
    let (world, _) = common::world_with_bodies(0);
    let relay = common::relay(world);

    // truncated stream
    let mut data = Vec::new();
    relay.serialize_collision(Mock::create_collision(), &mut data).unwrap();
    data.truncate(data.len() - 1);
    match relay.deserialize_collision(&data[..]) {
        Err(Error::Io(err)) => assert_eq!(io::ErrorKind::UnexpectedEof, err.kind()),
        other => panic!("unexpected {:?}", other.map(|c| c.collision())),
    }

    // well formed stream the engine makes nothing of
    let empty = [0u8; 4];
    match relay.deserialize_collision(&empty[..]) {
        Err(Error::Deserialize) => {}
        other => panic!("unexpected {:?}", other.map(|c| c.collision())),
    }
}

#[test]
fn tree_ray_cast_without_body() {
    let (world, _) = common::world_with_bodies(0);
    let mut relay = common::relay(world);
    let tree = Mock::create_tree_collision(vec![(7, triangle())]);

    relay.set_tree_ray_cast_callback(tree, |body: Body, _: Collision, param: f32, _: &Vec3, _: i32| {
        assert!(body.as_raw().is_null());
        param * 0.5
    });

    let no_body = unsafe { Body::from_raw(std::ptr::null()) };
    assert_eq!(Some(0.25), Mock::tree_ray_hit(no_body, tree, 0.5, [0.0, 1.0, 0.0], 7));
}

#[test]
fn dropped_relay_releases_collisions() {
    let (world, _) = common::world_with_bodies(0);
    let mut relay = common::relay(world);
    let tree = Mock::create_tree_collision(Vec::new());
    let body = Mock::create_body(world, tree, Mock::create_group(world));

    relay.set_tree_ray_cast_callback(tree, |_: Body, _: Collision, _: f32, _: &Vec3, _: i32| 0.0);
    assert_eq!(Some(0.0), Mock::tree_ray_hit(body, tree, 0.5, [0.0, 1.0, 0.0], 1));

    drop(relay);
    assert_eq!(Some(0.5), Mock::tree_ray_hit(body, tree, 0.5, [0.0, 1.0, 0.0], 1));
}
