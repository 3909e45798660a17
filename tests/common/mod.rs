#![allow(dead_code)]

use newton_relay::mock::Mock;
use newton_relay::{Body, Relay, World};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// World with `n` bodies in the same material group.
pub fn world_with_bodies(n: usize) -> (World, Vec<Body>) {
    init();
    let world = Mock::create_world();
    let group = Mock::create_group(world);
    let bodies = (0..n)
        .map(|_| Mock::create_body(world, Mock::create_collision(), group))
        .collect();
    (world, bodies)
}

pub fn relay(world: World) -> Relay<Mock> {
    Relay::<Mock>::config().debug("test").capacity(8).attach(world)
}
