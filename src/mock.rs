//! In-process stand-in for the engine.
//!
//! [`Mock`] keeps every callback the relay installs and fires it when a test
//! asks for the matching event, such as `collide` or `destroy_body`.
//! Objects live in thread local storage, so every test thread sees its own
//! engine. Object addresses are fake and never dereferenced.
//!
//! ```
//! use newton_relay::mock::Mock;
//! use newton_relay::{Body, Relay};
//! use std::time::Duration;
//!
//! let world = Mock::create_world();
//! let body = Mock::create_body(world, Mock::create_collision(), Mock::create_group(world));
//!
//! let mut relay = Relay::<Mock>::attach(world);
//! relay.set_force_and_torque_callback(body, |_: Body, step: Duration, _: usize| {
//!     assert_eq!(Duration::from_millis(500), step);
//! });
//! relay.update(Duration::from_millis(500));
//! ```
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::os::raw::{c_int, c_void};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::body::Body;
use crate::collision::Collision;
use crate::engine::Engine;
use crate::ffi;
use crate::handle::AsHandle;
use crate::joint::{Joint, JointStop, UpdateDesc};
use crate::material::GroupId;
use crate::math::{Mat4, Vec3, Vec4, IDENTITY};
use crate::mesh::Mesh;
use crate::world::World;

/// Fake engine driven by the tests.
#[derive(Debug)]
pub enum Mock {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Ball,
    Hinge,
    Slider,
    Corkscrew,
    Universal,
}

/// Contact reported by [`Mock`] convex casts.
#[derive(Debug, Clone, Copy)]
pub struct CastContact {
    pub body: Body,
    pub point: Vec4,
    pub normal: Vec4,
    pub penetration: f32,
}

#[derive(Debug, Clone, Copy)]
struct RayHitState {
    param: f32,
    point: Vec3,
    normal: Vec3,
}

#[derive(Default)]
struct WorldState {
    user_data: usize,
    threads: c_int,
    // thread index reported to body callbacks
    thread: c_int,
    last_step: Option<f32>,
    next_group: c_int,
    clock: ffi::NewtonGetTicksCountCallback,
    leave_world: ffi::NewtonBodyLeaveWorld,
    materials: BTreeMap<(c_int, c_int), (ffi::NewtonOnAABBOverlap, ffi::NewtonContactsProcess)>,
    cast_param: f32,
    cast: Vec<(usize, Vec4, Vec4, f32)>,
}

struct BodyState {
    world: usize,
    collision: usize,
    group: c_int,
    matrix: Mat4,
    aabb: (Vec3, Vec3),
    ray_hit: Option<RayHitState>,
    buoyancy: Option<Vec4>,
    destructor: ffi::NewtonBodyDestructor,
    transform: ffi::NewtonSetTransform,
    force_and_torque: ffi::NewtonApplyForceAndTorque,
}

struct JointState {
    // `None` for contact joints
    kind: Option<JointKind>,
    child: usize,
    parent: usize,
    desc: [ffi::NewtonHingeSliderUpdateDesc; 2],
    destructor: ffi::NewtonConstraintDestructor,
    ball: ffi::NewtonBallCallback,
    hinge: ffi::NewtonHingeCallback,
    slider: ffi::NewtonSliderCallback,
    corkscrew: ffi::NewtonCorkscrewCallback,
    universal: ffi::NewtonUniversalCallback,
}

#[derive(Default)]
struct CollisionState {
    id: c_int,
    user_data: usize,
    faces: Vec<(c_int, Vec<Vec3>)>,
    blob: Vec<u8>,
    tree_ray_cast: ffi::NewtonCollisionTreeRayCastCallback,
    debug: ffi::NewtonTreeCollisionCallback,
}

#[derive(Default)]
struct State {
    worlds: BTreeMap<usize, WorldState>,
    bodies: BTreeMap<usize, BodyState>,
    joints: BTreeMap<usize, JointState>,
    collisions: BTreeMap<usize, CollisionState>,
    meshes: BTreeMap<usize, usize>,
}

static NEXT_ADDR: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::default());
}

fn next_addr() -> usize {
    NEXT_ADDR.fetch_add(1, Ordering::SeqCst) * 16
}

// Callbacks must never run inside `with`: they call back into the engine.
fn with<R, F: FnOnce(&mut State) -> R>(f: F) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

fn addr<T>(ptr: *const T) -> usize {
    ptr as usize
}

/// Test drivers.
impl Mock {
    pub fn create_world() -> World {
        let world = next_addr();
        with(|s| {
            s.worlds.insert(
                world,
                WorldState {
                    threads: 1,
                    cast_param: 1.0,
                    ..Default::default()
                },
            )
        });
        unsafe { World::from_raw(world as *const _) }
    }

    pub fn create_group(world: World) -> GroupId {
        with(|s| match s.worlds.get_mut(&addr(world.as_raw())) {
            Some(world) => {
                world.next_group += 1;
                GroupId(world.next_group)
            }
            None => GroupId(0),
        })
    }

    pub fn create_collision() -> Collision {
        Self::create_tree_collision(Vec::new())
    }

    /// Creates a tree collision made of the given `(face id, polygon)` faces.
    pub fn create_tree_collision(faces: Vec<(i32, Vec<Vec3>)>) -> Collision {
        let collision = next_addr();
        let blob = format!("collision#{}", collision).into_bytes();
        with(|s| {
            s.collisions.insert(
                collision,
                CollisionState {
                    faces,
                    blob,
                    ..Default::default()
                },
            )
        });
        unsafe { Collision::from_raw(collision as *const _) }
    }

    pub fn create_body(world: World, collision: Collision, group: GroupId) -> Body {
        let body = next_addr();
        with(|s| {
            s.bodies.insert(
                body,
                BodyState {
                    world: addr(world.as_raw()),
                    collision: addr(collision.as_raw()),
                    group: group.as_raw(),
                    matrix: IDENTITY,
                    aabb: ([-0.5; 3], [0.5; 3]),
                    ray_hit: None,
                    buoyancy: None,
                    destructor: None,
                    transform: None,
                    force_and_torque: None,
                },
            )
        });
        unsafe { Body::from_raw(body as *const _) }
    }

    pub fn create_joint(kind: JointKind, child: Body, parent: Option<Body>) -> Joint {
        let joint = Self::insert_joint(Some(kind), addr(child.as_raw()), parent.map_or(0, |p| addr(p.as_raw())));
        unsafe { Joint::from_raw(joint as *const _) }
    }

    fn insert_joint(kind: Option<JointKind>, child: usize, parent: usize) -> usize {
        let joint = next_addr();
        with(|s| {
            s.joints.insert(
                joint,
                JointState {
                    kind,
                    child,
                    parent,
                    desc: Default::default(),
                    destructor: None,
                    ball: None,
                    hinge: None,
                    slider: None,
                    corkscrew: None,
                    universal: None,
                },
            )
        });
        joint
    }

    pub fn create_mesh(vertices: usize) -> Mesh<Mock> {
        let mesh = next_addr();
        with(|s| s.meshes.insert(mesh, vertices));
        unsafe { Mesh::from_raw(mesh as *const _) }
    }

    pub fn mesh_vertex_count(mesh: &Mesh<Mock>) -> Option<usize> {
        with(|s| s.meshes.get(&addr(mesh.as_raw())).cloned())
    }

    /// Whether the object behind `handle` still exists in the engine.
    pub fn is_alive<H: AsHandle>(handle: H) -> bool {
        let a = handle.as_handle().as_ptr() as usize;
        with(|s| {
            s.worlds.contains_key(&a)
                || s.bodies.contains_key(&a)
                || s.joints.contains_key(&a)
                || s.collisions.contains_key(&a)
                || s.meshes.contains_key(&a)
        })
    }

    pub fn set_matrix(body: Body, matrix: Mat4) {
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body.as_raw())) {
                b.matrix = matrix;
            }
        })
    }

    pub fn set_aabb(body: Body, min: Vec3, max: Vec3) {
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body.as_raw())) {
                b.aabb = (min, max);
            }
        })
    }

    /// Makes every ray cast of the world hit `body` at parameter `param`.
    pub fn set_ray_hit(body: Body, param: f32, point: Vec3, normal: Vec3) {
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body.as_raw())) {
                b.ray_hit = Some(RayHitState { param, point, normal });
            }
        })
    }

    /// Contacts every convex cast of the world reports, in order.
    pub fn set_cast_contacts(world: World, hit_param: f32, contacts: &[CastContact]) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world.as_raw())) {
                w.cast_param = hit_param;
                w.cast = contacts
                    .iter()
                    .map(|c| (addr(c.body.as_raw()), c.point, c.normal, c.penetration))
                    .collect();
            }
        })
    }

    pub fn set_collision_id(collision: Collision, id: i32) {
        with(|s| {
            if let Some(c) = s.collisions.get_mut(&addr(collision.as_raw())) {
                c.id = id;
            }
        })
    }

    /// Thread index the world reports to force, transform and leave world
    /// callbacks.
    pub fn set_thread_index(world: World, thread: i32) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world.as_raw())) {
                w.thread = thread;
            }
        })
    }

    pub fn threads(world: World) -> i32 {
        with(|s| s.worlds.get(&addr(world.as_raw())).map_or(0, |w| w.threads))
    }

    /// Timestep of the last update of the world, in seconds.
    pub fn last_timestep(world: World) -> Option<f32> {
        with(|s| s.worlds.get(&addr(world.as_raw())).and_then(|w| w.last_step))
    }

    pub fn buoyancy_plane(body: Body) -> Option<Vec4> {
        with(|s| s.bodies.get(&addr(body.as_raw())).and_then(|b| b.buoyancy))
    }

    pub fn serialized(collision: Collision) -> Vec<u8> {
        with(|s| {
            s.collisions
                .get(&addr(collision.as_raw()))
                .map(|c| c.blob.clone())
                .unwrap_or_default()
        })
    }

    pub fn joint_descs(joint: Joint) -> [UpdateDesc; 2] {
        let desc = with(|s| s.joints.get(&addr(joint.as_raw())).map(|j| j.desc).unwrap_or_default());
        [desc[0].into(), desc[1].into()]
    }

    /// Queries the performance clock of the world.
    pub fn tick(world: World) -> Option<u32> {
        let clock = with(|s| s.worlds.get(&addr(world.as_raw())).and_then(|w| w.clock));
        clock.map(|clock| unsafe { clock() })
    }

    /// Removes `body` from the world without destroying it.
    pub fn leave_world(body: Body) -> bool {
        let callback = with(|s| {
            let world = s.worlds.get(&s.bodies.get(&addr(body.as_raw()))?.world)?;
            Some((world.leave_world?, world.thread))
        });
        match callback {
            Some((callback, thread)) => {
                unsafe { callback(body.as_raw(), thread) };
                true
            }
            None => false,
        }
    }

    /// Destroys `body` and the joints attached to it, running their destructors.
    pub fn destroy_body(body: Body) {
        let b = addr(body.as_raw());
        let joints: Vec<usize> = with(|s| {
            s.joints
                .iter()
                .filter(|(_, j)| j.child == b || j.parent == b)
                .map(|(&j, _)| j)
                .collect()
        });
        for joint in joints {
            Self::destroy_joint(unsafe { Joint::from_raw(joint as *const _) });
        }

        let destructor = with(|s| s.bodies.get(&b).and_then(|b| b.destructor));
        if let Some(destructor) = destructor {
            unsafe { destructor(body.as_raw()) };
        }
        with(|s| s.bodies.remove(&b));
    }

    pub fn destroy_joint(joint: Joint) {
        let j = addr(joint.as_raw());
        let destructor = with(|s| s.joints.get(&j).and_then(|j| j.destructor));
        if let Some(destructor) = destructor {
            unsafe { destructor(joint.as_raw()) };
        }
        with(|s| s.joints.remove(&j));
    }

    /// Destroys every body of the world, then the world itself.
    pub fn destroy_world(world: World) {
        let w = addr(world.as_raw());
        let bodies: Vec<usize> = with(|s| {
            s.bodies
                .iter()
                .filter(|(_, b)| b.world == w)
                .map(|(&b, _)| b)
                .collect()
        });
        for body in bodies {
            Self::destroy_body(unsafe { Body::from_raw(body as *const _) });
        }
        with(|s| s.worlds.remove(&w));
    }

    /// Runs the material callbacks of the pair of bodies, as the broadphase
    /// would when their AABBs overlap.
    ///
    /// Returns `None` if the material pair has no callbacks, otherwise
    /// whether the bodies were found collidable.
    pub fn collide(body0: Body, body1: Body, timestep: f32, thread: i32) -> Option<bool> {
        let (overlap, process) = with(|s| {
            let b0 = s.bodies.get(&addr(body0.as_raw()))?;
            let b1 = s.bodies.get(&addr(body1.as_raw()))?;
            let key = (b0.group.min(b1.group), b0.group.max(b1.group));
            s.worlds.get(&b0.world)?.materials.get(&key).cloned()
        })?;

        let material = next_addr() as *const ffi::NewtonMaterial;
        let collidable = match overlap {
            Some(overlap) => unsafe { overlap(material, body0.as_raw(), body1.as_raw(), thread) != 0 },
            None => true,
        };

        if collidable {
            if let Some(process) = process {
                let contact = Self::insert_joint(None, addr(body0.as_raw()), addr(body1.as_raw()));
                unsafe { process(contact as *const _, timestep, thread) };
                with(|s| s.joints.remove(&contact));
            }
        }
        Some(collidable)
    }

    /// Runs the user callback of `joint`. Returns its status bits, or `None`
    /// if no callback is installed.
    pub fn update_joint(joint: Joint, timestep: f32) -> Option<u32> {
        let j = addr(joint.as_raw());
        let (kind, mut desc, callbacks) = with(|s| {
            let state = s.joints.get(&j)?;
            Some((
                state.kind?,
                state.desc,
                (state.ball, state.hinge, state.slider, state.corkscrew, state.universal),
            ))
        })?;
        let (ball, hinge, slider, corkscrew, universal) = callbacks;

        for d in desc.iter_mut() {
            d.m_timestep = timestep;
        }

        let ptr = desc.as_mut_ptr();
        let status = unsafe {
            match kind {
                JointKind::Ball => ball.map(|cb| {
                    cb(joint.as_raw(), timestep);
                    0
                }),
                JointKind::Hinge => hinge.map(|cb| cb(joint.as_raw(), ptr)),
                JointKind::Slider => slider.map(|cb| cb(joint.as_raw(), ptr)),
                JointKind::Corkscrew => corkscrew.map(|cb| cb(joint.as_raw(), ptr)),
                JointKind::Universal => universal.map(|cb| cb(joint.as_raw(), ptr)),
            }
        };

        with(|s| {
            if let Some(state) = s.joints.get_mut(&j) {
                state.desc = desc;
            }
        });
        status
    }

    /// Hits the tree collision of `body` with a ray. Returns what the user
    /// callback made of the hit parameter.
    pub fn tree_ray_hit(body: Body, tree: Collision, interception: f32, normal: Vec3, face_id: i32) -> Option<f32> {
        let callback = with(|s| s.collisions.get(&addr(tree.as_raw())).and_then(|c| c.tree_ray_cast))?;
        let mut normal = normal;
        Some(unsafe {
            callback(
                body.as_raw(),
                tree.as_raw(),
                interception,
                normal.as_mut_ptr(),
                face_id,
                ptr::null_mut(),
            )
        })
    }

    /// Reports the face `face_id` of the static body as touched by `body`.
    pub fn debug_collide(static_body: Body, body: Body, face_id: i32, vertices: &[Vec3]) -> bool {
        let callback = with(|s| {
            let collision = s.bodies.get(&addr(static_body.as_raw()))?.collision;
            s.collisions.get(&collision)?.debug
        });
        match callback {
            Some(callback) => {
                unsafe {
                    callback(
                        static_body.as_raw(),
                        body.as_raw(),
                        face_id,
                        vertices.len() as c_int,
                        vertices.as_ptr() as *const f32,
                        std::mem::size_of::<Vec3>() as c_int,
                    )
                };
                true
            }
            None => false,
        }
    }
}

unsafe impl Engine for Mock {
    unsafe fn world_get_user_data(world: *const ffi::NewtonWorld) -> *mut c_void {
        with(|s| s.worlds.get(&addr(world)).map_or(0, |w| w.user_data)) as *mut c_void
    }

    unsafe fn world_set_user_data(world: *const ffi::NewtonWorld, data: *mut c_void) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world)) {
                w.user_data = data as usize;
            }
        })
    }

    unsafe fn set_threads_count(world: *const ffi::NewtonWorld, threads: c_int) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world)) {
                w.threads = threads.max(1);
            }
        })
    }

    unsafe fn update(world: *const ffi::NewtonWorld, timestep: f32) {
        let w = addr(world);
        let (thread, bodies): (c_int, Vec<_>) = with(|s| {
            let thread = match s.worlds.get_mut(&w) {
                Some(world) => {
                    world.last_step = Some(timestep);
                    world.thread
                }
                None => 0,
            };
            let bodies = s
                .bodies
                .iter()
                .filter(|(_, b)| b.world == w)
                .map(|(&addr, b)| (addr as *const ffi::NewtonBody, b.matrix, b.force_and_torque, b.transform))
                .collect();
            (thread, bodies)
        });

        for &(body, _, force_and_torque, _) in &bodies {
            if let Some(callback) = force_and_torque {
                callback(body, timestep, thread);
            }
        }
        for (body, matrix, _, transform) in &bodies {
            if let Some(callback) = *transform {
                callback(*body, matrix.as_ptr() as *const f32, thread);
            }
        }
    }

    unsafe fn set_performance_clock(world: *const ffi::NewtonWorld, callback: ffi::NewtonGetTicksCountCallback) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world)) {
                w.clock = callback;
            }
        })
    }

    unsafe fn set_body_leave_world_event(world: *const ffi::NewtonWorld, callback: ffi::NewtonBodyLeaveWorld) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world)) {
                w.leave_world = callback;
            }
        })
    }

    unsafe fn world_for_each_joint_do(
        world: *const ffi::NewtonWorld,
        callback: ffi::NewtonJointIterator,
        user_data: *mut c_void,
    ) {
        let w = addr(world);
        let joints: Vec<usize> = with(|s| {
            s.joints
                .iter()
                .filter(|(_, j)| j.kind.is_some() && s.bodies.get(&j.child).map_or(false, |b| b.world == w))
                .map(|(&j, _)| j)
                .collect()
        });
        if let Some(callback) = callback {
            for joint in joints {
                callback(joint as *const _, user_data);
            }
        }
    }

    unsafe fn world_for_each_body_in_aabb_do(
        world: *const ffi::NewtonWorld,
        p0: *const f32,
        p1: *const f32,
        callback: ffi::NewtonBodyIterator,
        user_data: *mut c_void,
    ) {
        let w = addr(world);
        let min = *(p0 as *const Vec3);
        let max = *(p1 as *const Vec3);
        let bodies: Vec<usize> = with(|s| {
            s.bodies
                .iter()
                .filter(|(_, b)| {
                    b.world == w && (0..3).all(|i| b.aabb.0[i] <= max[i] && b.aabb.1[i] >= min[i])
                })
                .map(|(&b, _)| b)
                .collect()
        });
        if let Some(callback) = callback {
            for body in bodies {
                if callback(body as *const _, user_data) == 0 {
                    break;
                }
            }
        }
    }

    unsafe fn world_ray_cast(
        world: *const ffi::NewtonWorld,
        _p0: *const f32,
        _p1: *const f32,
        filter: ffi::NewtonWorldRayFilterCallback,
        user_data: *mut c_void,
        prefilter: ffi::NewtonWorldRayPrefilterCallback,
        _thread_index: c_int,
    ) {
        let w = addr(world);
        let hits: Vec<(usize, usize, RayHitState)> = with(|s| {
            s.bodies
                .iter()
                .filter(|(_, b)| b.world == w)
                .filter_map(|(&addr, b)| b.ray_hit.map(|hit| (addr, b.collision, hit)))
                .collect()
        });

        let mut limit = 1.0;
        for (body, collision, hit) in hits {
            if hit.param > limit {
                continue;
            }
            let body = body as *const ffi::NewtonBody;
            let collision = collision as *const ffi::NewtonCollision;
            if let Some(prefilter) = prefilter {
                if prefilter(body, collision, user_data) == 0 {
                    continue;
                }
            }
            if let Some(filter) = filter {
                let param = filter(
                    body,
                    collision,
                    hit.point.as_ptr(),
                    hit.normal.as_ptr(),
                    body as ffi::dLong,
                    user_data,
                    hit.param,
                );
                if param <= 0.0 {
                    break;
                }
                limit = param.min(limit);
            }
        }
    }

    unsafe fn world_convex_cast(
        world: *const ffi::NewtonWorld,
        _matrix: *const f32,
        _target: *const f32,
        _shape: *const ffi::NewtonCollision,
        param: *mut f32,
        user_data: *mut c_void,
        prefilter: ffi::NewtonWorldRayPrefilterCallback,
        info: *mut ffi::NewtonWorldConvexCastReturnInfo,
        max_contacts: c_int,
        _thread_index: c_int,
    ) -> c_int {
        let w = addr(world);
        let (hit_param, contacts) = with(|s| match s.worlds.get(&w) {
            Some(world) => {
                let contacts: Vec<_> = world
                    .cast
                    .iter()
                    .map(|&(body, point, normal, penetration)| {
                        let collision = s.bodies.get(&body).map_or(0, |b| b.collision);
                        (body, collision, point, normal, penetration)
                    })
                    .collect();
                (world.cast_param, contacts)
            }
            None => (1.0, Vec::new()),
        });

        let mut count: c_int = 0;
        for (body, collision, point, normal, penetration) in contacts {
            if count >= max_contacts {
                break;
            }
            let body = body as *const ffi::NewtonBody;
            if let Some(prefilter) = prefilter {
                if prefilter(body, collision as *const _, user_data) == 0 {
                    continue;
                }
            }
            *info.add(count as usize) = ffi::NewtonWorldConvexCastReturnInfo {
                m_point: point,
                m_normal: normal,
                m_contactID: count as ffi::dLong,
                m_hitBody: body,
                m_penetration: penetration,
            };
            count += 1;
        }

        if !param.is_null() {
            *param = if count > 0 { hit_param } else { 1.0 };
        }
        count
    }

    unsafe fn material_set_collision_callback(
        world: *const ffi::NewtonWorld,
        id0: c_int,
        id1: c_int,
        _user_data: *mut c_void,
        overlap: ffi::NewtonOnAABBOverlap,
        process: ffi::NewtonContactsProcess,
    ) {
        with(|s| {
            if let Some(w) = s.worlds.get_mut(&addr(world)) {
                w.materials.insert((id0.min(id1), id0.max(id1)), (overlap, process));
            }
        })
    }

    unsafe fn body_get_world(body: *const ffi::NewtonBody) -> *const ffi::NewtonWorld {
        with(|s| s.bodies.get(&addr(body)).map_or(0, |b| b.world)) as *const _
    }

    unsafe fn body_get_collision(body: *const ffi::NewtonBody) -> *const ffi::NewtonCollision {
        with(|s| s.bodies.get(&addr(body)).map_or(0, |b| b.collision)) as *const _
    }

    unsafe fn body_get_material_group_id(body: *const ffi::NewtonBody) -> c_int {
        with(|s| s.bodies.get(&addr(body)).map_or(0, |b| b.group))
    }

    unsafe fn body_set_destructor_callback(body: *const ffi::NewtonBody, callback: ffi::NewtonBodyDestructor) {
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body)) {
                b.destructor = callback;
            }
        })
    }

    unsafe fn body_set_transform_callback(body: *const ffi::NewtonBody, callback: ffi::NewtonSetTransform) {
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body)) {
                b.transform = callback;
            }
        })
    }

    unsafe fn body_set_force_and_torque_callback(
        body: *const ffi::NewtonBody,
        callback: ffi::NewtonApplyForceAndTorque,
    ) {
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body)) {
                b.force_and_torque = callback;
            }
        })
    }

    unsafe fn body_add_buoyancy_force(
        body: *const ffi::NewtonBody,
        _fluid_density: f32,
        _fluid_linear_viscosity: f32,
        _fluid_angular_viscosity: f32,
        _gravity: *const f32,
        plane: ffi::NewtonGetBuoyancyPlane,
        context: *mut c_void,
    ) {
        let state = with(|s| {
            let b = s.bodies.get(&addr(body))?;
            let id = s.collisions.get(&b.collision).map_or(0, |c| c.id);
            Some((id, b.matrix))
        });
        let (plane, (id, matrix)) = match (plane, state) {
            (Some(plane), Some(state)) => (plane, state),
            _ => return,
        };

        let mut out: Vec4 = [0.0; 4];
        let submerged = plane(id, context, matrix.as_ptr() as *const f32, out.as_mut_ptr()) != 0;
        with(|s| {
            if let Some(b) = s.bodies.get_mut(&addr(body)) {
                b.buoyancy = if submerged { Some(out) } else { None };
            }
        })
    }

    unsafe fn joint_get_body0(joint: *const ffi::NewtonJoint) -> *const ffi::NewtonBody {
        with(|s| s.joints.get(&addr(joint)).map_or(0, |j| j.child)) as *const _
    }

    unsafe fn joint_get_body1(joint: *const ffi::NewtonJoint) -> *const ffi::NewtonBody {
        with(|s| s.joints.get(&addr(joint)).map_or(0, |j| j.parent)) as *const _
    }

    unsafe fn joint_set_destructor(joint: *const ffi::NewtonJoint, destructor: ffi::NewtonConstraintDestructor) {
        with(|s| {
            if let Some(j) = s.joints.get_mut(&addr(joint)) {
                j.destructor = destructor;
            }
        })
    }

    // Acceleration that cancels the offset to `value` within one step.
    unsafe fn joint_calculate_stop(
        joint: *const ffi::NewtonJoint,
        _stop: JointStop,
        desc: *const ffi::NewtonHingeSliderUpdateDesc,
        value: f32,
    ) -> f32 {
        if desc.is_null() || !with(|s| s.joints.contains_key(&addr(joint))) {
            return 0.0;
        }
        let timestep = (*desc).m_timestep;
        if timestep > 0.0 {
            -value / (timestep * timestep)
        } else {
            0.0
        }
    }

    unsafe fn ball_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonBallCallback) {
        with(|s| {
            if let Some(j) = s.joints.get_mut(&addr(joint)) {
                j.ball = callback;
            }
        })
    }

    unsafe fn hinge_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonHingeCallback) {
        with(|s| {
            if let Some(j) = s.joints.get_mut(&addr(joint)) {
                j.hinge = callback;
            }
        })
    }

    unsafe fn slider_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonSliderCallback) {
        with(|s| {
            if let Some(j) = s.joints.get_mut(&addr(joint)) {
                j.slider = callback;
            }
        })
    }

    unsafe fn corkscrew_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonCorkscrewCallback) {
        with(|s| {
            if let Some(j) = s.joints.get_mut(&addr(joint)) {
                j.corkscrew = callback;
            }
        })
    }

    unsafe fn universal_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonUniversalCallback) {
        with(|s| {
            if let Some(j) = s.joints.get_mut(&addr(joint)) {
                j.universal = callback;
            }
        })
    }

    unsafe fn tree_collision_set_user_ray_cast_callback(
        collision: *const ffi::NewtonCollision,
        callback: ffi::NewtonCollisionTreeRayCastCallback,
    ) {
        with(|s| {
            if let Some(c) = s.collisions.get_mut(&addr(collision)) {
                c.tree_ray_cast = callback;
            }
        })
    }

    unsafe fn static_collision_set_debug_callback(
        collision: *const ffi::NewtonCollision,
        callback: ffi::NewtonTreeCollisionCallback,
    ) {
        with(|s| {
            if let Some(c) = s.collisions.get_mut(&addr(collision)) {
                c.debug = callback;
            }
        })
    }

    unsafe fn collision_get_user_data(collision: *const ffi::NewtonCollision) -> *mut c_void {
        with(|s| s.collisions.get(&addr(collision)).map_or(0, |c| c.user_data)) as *mut c_void
    }

    unsafe fn collision_set_user_data(collision: *const ffi::NewtonCollision, data: *mut c_void) {
        with(|s| {
            if let Some(c) = s.collisions.get_mut(&addr(collision)) {
                c.user_data = data as usize;
            }
        })
    }

    unsafe fn collision_for_each_polygon_do(
        collision: *const ffi::NewtonCollision,
        _matrix: *const f32,
        callback: ffi::NewtonCollisionIterator,
        user_data: *mut c_void,
    ) {
        let faces = with(|s| {
            s.collisions
                .get(&addr(collision))
                .map(|c| c.faces.clone())
                .unwrap_or_default()
        });
        if let Some(callback) = callback {
            for (face_id, polygon) in faces {
                callback(user_data, polygon.len() as c_int, polygon.as_ptr() as *const f32, face_id);
            }
        }
    }

    unsafe fn collision_serialize(
        _world: *const ffi::NewtonWorld,
        collision: *const ffi::NewtonCollision,
        callback: ffi::NewtonSerializeCallback,
        handle: *mut c_void,
    ) {
        let blob = with(|s| s.collisions.get(&addr(collision)).map(|c| c.blob.clone()));
        if let (Some(blob), Some(callback)) = (blob, callback) {
            // length header, then the payload in two chunks
            let header = (blob.len() as u32).to_le_bytes();
            callback(handle, header.as_ptr() as *const c_void, header.len() as c_int);
            let (a, b) = blob.split_at(blob.len() / 2);
            for chunk in [a, b].iter().filter(|chunk| !chunk.is_empty()) {
                callback(handle, chunk.as_ptr() as *const c_void, chunk.len() as c_int);
            }
        }
    }

    unsafe fn create_collision_from_serialization(
        _world: *const ffi::NewtonWorld,
        callback: ffi::NewtonDeserializeCallback,
        handle: *mut c_void,
    ) -> *mut ffi::NewtonCollision {
        let callback = match callback {
            Some(callback) => callback,
            None => return ptr::null_mut(),
        };

        let mut header = [0u8; 4];
        callback(handle, header.as_mut_ptr() as *mut c_void, header.len() as c_int);
        let len = u32::from_le_bytes(header) as usize;
        if len == 0 || len > 1 << 20 {
            return ptr::null_mut();
        }

        let mut blob = vec![0u8; len];
        callback(handle, blob.as_mut_ptr() as *mut c_void, len as c_int);

        let collision = next_addr();
        with(|s| {
            s.collisions.insert(
                collision,
                CollisionState {
                    blob,
                    ..Default::default()
                },
            )
        });
        collision as *mut _
    }

    unsafe fn destroy_collision(collision: *const ffi::NewtonCollision) {
        with(|s| s.collisions.remove(&addr(collision)));
    }

    unsafe fn mesh_simplify(
        mesh: *const ffi::NewtonMesh,
        max_vertex_count: c_int,
        progress: ffi::NewtonReportProgress,
        user_data: *mut c_void,
    ) -> *mut ffi::NewtonMesh {
        match with(|s| s.meshes.get(&addr(mesh)).cloned()) {
            Some(vertices) => run_mesh_op(vertices.min(max_vertex_count.max(0) as usize), progress, user_data),
            None => ptr::null_mut(),
        }
    }

    unsafe fn mesh_approximate_convex_decomposition(
        mesh: *const ffi::NewtonMesh,
        _max_concavity: f32,
        _back_face_distance_factor: f32,
        max_count: c_int,
        max_vertex_per_hull: c_int,
        progress: ffi::NewtonReportProgress,
        user_data: *mut c_void,
    ) -> *mut ffi::NewtonMesh {
        let limit = max_count.max(0) as usize * max_vertex_per_hull.max(0) as usize;
        match with(|s| s.meshes.get(&addr(mesh)).cloned()) {
            Some(vertices) => run_mesh_op(vertices.min(limit), progress, user_data),
            None => ptr::null_mut(),
        }
    }

    unsafe fn mesh_destroy(mesh: *const ffi::NewtonMesh) {
        with(|s| s.meshes.remove(&addr(mesh)));
    }
}

// Reports progress at 0, 1/2 and 1, then creates the resulting mesh.
unsafe fn run_mesh_op(
    vertices: usize,
    progress: ffi::NewtonReportProgress,
    user_data: *mut c_void,
) -> *mut ffi::NewtonMesh {
    if let Some(progress) = progress {
        for &fraction in &[0.0, 0.5, 1.0] {
            if progress(fraction, user_data) == 0 {
                return ptr::null_mut();
            }
        }
    }
    let mesh = next_addr();
    with(|s| s.meshes.insert(mesh, vertices));
    mesh as *mut _
}
