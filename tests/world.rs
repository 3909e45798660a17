use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use newton_relay::math::IDENTITY;
use newton_relay::mock::{CastContact, JointKind, Mock};
use newton_relay::world::ray_cast::{AllHits, ClosestHit, Custom, CustomParams, NClosestHits, RayControl, RayHit};
use newton_relay::{Body, Collision, Joint, Material, MonotonicClock, NoPrefilter, PerformanceClock};

mod common;

fn hits(bodies: &[Body], params: &[f32]) {
    for (body, &param) in bodies.iter().zip(params) {
        Mock::set_ray_hit(*body, param, [0.0, 10.0 * (1.0 - param), 0.0], [0.0, 1.0, 0.0]);
    }
}

#[test]
fn closest_hit() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    hits(&bodies, &[0.7, 0.3, 0.5]);

    let hit = relay
        .ray_cast::<ClosestHit>(&[0.0, 10.0, 0.0], &[0.0; 3], ())
        .expect("no hit");

    assert_eq!(bodies[1], hit.body);
    assert_eq!(0.3, hit.intersect_param);
    assert_eq!([0.0, 1.0, 0.0], hit.normal);
    assert_eq!(bodies[1].as_raw() as i64, hit.collision_id);
}

#[test]
fn all_and_n_closest_hits() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    hits(&bodies, &[0.7, 0.3, 0.5]);

    let all = relay.ray_cast::<AllHits>(&[0.0, 10.0, 0.0], &[0.0; 3], ());
    assert_eq!(3, all.len());

    let two = relay.ray_cast::<NClosestHits>(&[0.0, 10.0, 0.0], &[0.0; 3], 2);
    let params: Vec<f32> = two.iter().map(|h| h.intersect_param).collect();
    assert_eq!(vec![0.3, 0.5], params);

    assert!(relay.ray_cast::<NClosestHits>(&[0.0, 10.0, 0.0], &[0.0; 3], 0).is_empty());
}

#[test]
fn n_closest_hits_with_unbounded_n() {
    let (world, bodies) = common::world_with_bodies(2);
    let relay = common::relay(world);
    hits(&bodies, &[0.6, 0.4]);

    let all = relay.ray_cast::<NClosestHits>(&[0.0, 10.0, 0.0], &[0.0; 3], usize::MAX);
    let params: Vec<f32> = all.iter().map(|h| h.intersect_param).collect();
    assert_eq!(vec![0.4, 0.6], params);
}

#[test]
fn prefilter_excluding_everything_skips_filter() {
    let (world, bodies) = common::world_with_bodies(4);
    let relay = common::relay(world);
    hits(&bodies, &[0.1, 0.2, 0.3, 0.4]);

    let filtered = Cell::new(0);
    let prefiltered = Cell::new(0);
    relay.ray_cast_raw(
        &[0.0, 10.0, 0.0],
        &[0.0; 3],
        |_: RayHit| {
            filtered.set(filtered.get() + 1);
            RayControl::Continue
        },
        Some(|_: Body, _: Collision| {
            prefiltered.set(prefiltered.get() + 1);
            false
        }),
        0,
    );

    assert_eq!(4, prefiltered.get());
    assert_eq!(0, filtered.get());
}

#[test]
fn filter_can_stop_the_scan() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    hits(&bodies, &[0.9, 0.8, 0.7]);

    let mut visited = Vec::new();
    relay.ray_cast_raw(
        &[0.0, 10.0, 0.0],
        &[0.0; 3],
        |hit: RayHit| {
            visited.push(hit.body);
            RayControl::Stop
        },
        None::<NoPrefilter>,
        0,
    );
    assert_eq!(vec![bodies[0]], visited);
}

#[test]
fn custom_ray_cast() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    hits(&bodies, &[0.2, 0.4, 0.6]);

    let mut seen = Vec::new();
    let skip = bodies[1];
    relay.ray_cast::<Custom<_, _>>(
        &[0.0, 10.0, 0.0],
        &[0.0; 3],
        CustomParams {
            filter: |hit: RayHit| {
                seen.push(hit.intersect_param);
                RayControl::Continue
            },
            prefilter: move |body: Body, _: Collision| body != skip,
        },
    );
    assert_eq!(vec![0.2, 0.6], seen);
}

#[test]
fn convex_cast_never_exceeds_max_contacts() {
    let (world, bodies) = common::world_with_bodies(5);
    let relay = common::relay(world);

    let contacts: Vec<CastContact> = bodies
        .iter()
        .enumerate()
        .map(|(i, &body)| CastContact {
            body,
            point: [i as f32, 0.0, 0.0, 1.0],
            normal: [0.0, 1.0, 0.0, 0.0],
            penetration: 0.01 * i as f32,
        })
        .collect();
    Mock::set_cast_contacts(world, 0.25, &contacts);

    let shape = Mock::create_collision();
    for max in 0..7 {
        let result = relay.convex_cast(&IDENTITY, &[0.0, -1.0, 0.0], shape, |_: Body, _: Collision| true, max, 0);
        assert_eq!(max.min(contacts.len()), result.len());
    }

    let result = relay.convex_cast(&IDENTITY, &[0.0, -1.0, 0.0], shape, |_: Body, _: Collision| true, 3, 0);
    assert_eq!(0.25, result.hit_param());
    let info: Vec<_> = result.iter().collect();
    assert_eq!(bodies[2], info[2].body);
    assert_eq!([2.0, 0.0, 0.0, 1.0], info[2].point);
    assert!(result.get(3).is_none());
}

#[test]
fn convex_cast_prefilter() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    let contacts: Vec<CastContact> = bodies
        .iter()
        .map(|&body| CastContact {
            body,
            point: [0.0; 4],
            normal: [0.0, 1.0, 0.0, 0.0],
            penetration: 0.0,
        })
        .collect();
    Mock::set_cast_contacts(world, 0.5, &contacts);

    let result = relay.convex_cast(
        &IDENTITY,
        &[0.0, -1.0, 0.0],
        Mock::create_collision(),
        |body: Body, _: Collision| body == bodies[1],
        8,
        0,
    );
    assert_eq!(1, result.len());
    assert_eq!(Some(bodies[1]), result.get(0).map(|info| info.body));
}

#[test]
fn iterate_bodies_in_aabb() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    Mock::set_aabb(bodies[0], [10.0; 3], [11.0; 3]);

    let mut found = Vec::new();
    relay.for_each_body_in_aabb(&[-1.0; 3], &[1.0; 3], |body: Body| found.push(body));
    assert_eq!(vec![bodies[1], bodies[2]], found);
}

#[test]
fn iterate_joints() {
    let (world, bodies) = common::world_with_bodies(3);
    let relay = common::relay(world);
    let a = Mock::create_joint(JointKind::Hinge, bodies[0], Some(bodies[1]));
    let b = Mock::create_joint(JointKind::Ball, bodies[2], None);

    let mut found = Vec::new();
    relay.for_each_joint(|joint: Joint| found.push(joint));
    assert_eq!(vec![a, b], found);
}

#[test]
fn material_pair_is_unordered() {
    common::init();
    let world = Mock::create_world();
    let wood = Mock::create_group(world);
    let metal = Mock::create_group(world);
    let plank = Mock::create_body(world, Mock::create_collision(), wood);
    let bolt = Mock::create_body(world, Mock::create_collision(), metal);
    let mut relay = common::relay(world);

    let processed = Arc::new(Mutex::new(Vec::new()));
    let processed_cb = Arc::clone(&processed);
    relay.set_material_collision(
        metal,
        wood,
        |_: Material, _: Body, _: Body, _: usize| true,
        move |contact: Joint, step: Duration, _: usize| {
            processed_cb.lock().unwrap().push((contact.body0::<Mock>(), step));
        },
    );

    assert_eq!(Some(true), Mock::collide(plank, bolt, 0.5, 0));
    assert_eq!(Some(true), Mock::collide(bolt, plank, 0.5, 0));
    assert_eq!(
        vec![(plank, Duration::from_millis(500)), (bolt, Duration::from_millis(500))],
        *processed.lock().unwrap()
    );

    // replacing the pair from the other side
    relay.set_material_collision(
        wood,
        metal,
        |_: Material, _: Body, _: Body, _: usize| false,
        |_: Joint, _: Duration, _: usize| panic!("not collidable"),
    );
    assert_eq!(Some(false), Mock::collide(plank, bolt, 0.5, 0));
    assert_eq!(2, relay.len());
}

#[test]
fn performance_clock() {
    struct Fixed;
    impl PerformanceClock for Fixed {
        fn ticks() -> u32 {
            1234
        }
    }

    let (world, _) = common::world_with_bodies(0);
    let mut relay = common::relay(world);
    assert_eq!(None, Mock::tick(world));

    relay.set_performance_clock::<Fixed>();
    assert_eq!(Some(1234), Mock::tick(world));

    relay.set_performance_clock::<MonotonicClock>();
    let t0 = Mock::tick(world).unwrap();
    std::thread::sleep(Duration::from_millis(1));
    assert!(Mock::tick(world).unwrap().wrapping_sub(t0) >= 1_000);
}

#[test]
fn config_sets_threads() {
    common::init();
    let world = Mock::create_world();
    let _relay = newton_relay::Relay::<Mock>::config().threads(3).attach::<Mock>(world);
    assert_eq!(3, Mock::threads(world));

    let other = Mock::create_world();
    let _relay = newton_relay::Relay::<Mock>::config().max_threads().attach::<Mock>(other);
    assert_eq!(num_cpus::get() as i32, Mock::threads(other));
}

#[test]
fn handlers_run_on_every_update() {
    let (world, bodies) = common::world_with_bodies(4);
    let mut relay = common::relay(world);
    let calls = Arc::new(AtomicUsize::new(0));

    for &body in &bodies {
        let counter = Arc::clone(&calls);
        relay.set_force_and_torque_callback(body, move |_: Body, _: Duration, _: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    for _ in 0..3 {
        relay.update(Duration::from_millis(16));
    }
    assert_eq!(12, calls.load(Ordering::SeqCst));
}

#[test]
fn collide_without_relay_is_collidable() {
    let (world, bodies) = common::world_with_bodies(2);
    let mut relay = common::relay(world);
    let group = Mock::create_group(world);
    let other = Mock::create_body(world, Mock::create_collision(), group);
    let wall = Mock::create_body(world, Mock::create_collision(), group);
    relay.set_material_collision(
        group,
        group,
        |_: Material, _: Body, _: Body, _: usize| false,
        |_: Joint, _: Duration, _: usize| {},
    );
    assert_eq!(Some(false), Mock::collide(other, wall, 0.1, 0));

    drop(relay);
    assert_eq!(Some(true), Mock::collide(other, wall, 0.1, 0));
    assert_eq!(None, Mock::collide(bodies[0], other, 0.1, 0));
}

#[test]
fn aabb_overlap_receives_thread_index() {
    let (world, _) = common::world_with_bodies(0);
    let mut relay = common::relay(world);
    let group = Mock::create_group(world);
    let a = Mock::create_body(world, Mock::create_collision(), group);
    let b = Mock::create_body(world, Mock::create_collision(), group);

    let threads = Arc::new(Mutex::new(Vec::new()));
    let threads_cb = Arc::clone(&threads);
    relay.set_material_collision(
        group,
        group,
        move |_: Material, _: Body, _: Body, thread: usize| {
            threads_cb.lock().unwrap().push(thread);
            true
        },
        |_: Joint, _: Duration, _: usize| {},
    );

    assert_eq!(Some(true), Mock::collide(a, b, 0.1, 2));
    assert_eq!(vec![2], *threads.lock().unwrap());
}

#[test]
fn second_relay_takes_the_world_over() {
    let (world, bodies) = common::world_with_bodies(1);
    let first = common::relay(world);
    let mut second = common::relay(world);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    second.set_force_and_torque_callback(bodies[0], move |_: Body, _: Duration, _: usize| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // dropping the first relay leaves the user data of the second alone
    drop(first);
    second.update(Duration::from_millis(16));
    assert_eq!(1, calls.load(Ordering::SeqCst));
}
