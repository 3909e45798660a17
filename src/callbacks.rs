//! Trampolines of the persistent callback slots.
//!
//! The engine calls these with raw pointers only. Each one walks back to the
//! world user data, or the collision user data for collision callbacks, to
//! find the relay table and looks up the handler of the object it was called
//! for.
use std::os::raw::{c_int, c_uint};
use std::time::Duration;

use crate::body::Body;
use crate::collision::Collision;
use crate::engine::Engine;
use crate::ffi;
use crate::handle::Handle;
use crate::joint::{Joint, UpdateDesc};
use crate::material::{GroupId, Material};
use crate::math::{self, Vertices};
use crate::registry::{CallbackKind, Command, Owner, Slot, Table};

macro_rules! dispatch {
    ($table:expr, $owner:expr, $variant:ident($handler:ident) => $call:expr, else $default:expr) => {{
        let owner = $owner;
        match $table {
            Some(table) => match table.get(owner, CallbackKind::$variant) {
                Some(Slot::$variant($handler)) => $call,
                _ => {
                    miss(table, owner, CallbackKind::$variant);
                    $default
                }
            },
            None => $default,
        }
    }};
}

pub(crate) fn to_duration(timestep: f32) -> Duration {
    const NANO: u64 = 1_000_000_000;
    // negative and NaN timesteps saturate to zero
    let nanos = (NANO as f32 * timestep) as u64;
    Duration::new(nanos / NANO, (nanos % NANO) as u32)
}

fn miss(table: &Table, owner: Owner, kind: CallbackKind) {
    log::trace!("[{}] no {:?} handler for {:?}", table.name(), kind, owner);
}

unsafe fn world_table<'a, E: Engine>(world: *const ffi::NewtonWorld) -> Option<&'a Table> {
    if world.is_null() {
        return None;
    }
    (E::world_get_user_data(world) as *const Table).as_ref()
}

unsafe fn body_table<'a, E: Engine>(body: *const ffi::NewtonBody) -> Option<&'a Table> {
    if body.is_null() {
        return None;
    }
    world_table::<E>(E::body_get_world(body))
}

unsafe fn collision_table<'a, E: Engine>(collision: *const ffi::NewtonCollision) -> Option<&'a Table> {
    if collision.is_null() {
        return None;
    }
    (E::collision_get_user_data(collision) as *const Table).as_ref()
}

unsafe fn joint_table<'a, E: Engine>(joint: *const ffi::NewtonJoint) -> Option<&'a Table> {
    body_table::<E>(E::joint_get_body0(joint))
}

unsafe fn material_pair<E: Engine>(body0: *const ffi::NewtonBody, body1: *const ffi::NewtonBody) -> Owner {
    Owner::materials(
        GroupId(E::body_get_material_group_id(body0)),
        GroupId(E::body_get_material_group_id(body1)),
    )
}

pub(crate) unsafe extern "C" fn body_leave_world<E: Engine>(body: *const ffi::NewtonBody, thread: c_int) {
    let world = E::body_get_world(body);
    dispatch!(
        world_table::<E>(world),
        Owner::Object(Handle::from_ptr(world)),
        BodyLeaveWorld(handler) => handler.body_leave_world(Body::from_raw(body), thread as usize),
        else ()
    )
}

pub(crate) unsafe extern "C" fn aabb_overlap<E: Engine>(
    material: *const ffi::NewtonMaterial,
    body0: *const ffi::NewtonBody,
    body1: *const ffi::NewtonBody,
    thread: c_int,
) -> c_int {
    let overlap = dispatch!(
        body_table::<E>(body0),
        material_pair::<E>(body0, body1),
        AabbOverlap(handler) => handler.aabb_overlap(
            Material::from_raw(material),
            Body::from_raw(body0),
            Body::from_raw(body1),
            thread as usize,
        ),
        else true
    );
    if overlap {
        1
    } else {
        0
    }
}

pub(crate) unsafe extern "C" fn contacts_process<E: Engine>(
    contact: *const ffi::NewtonJoint,
    timestep: f32,
    thread: c_int,
) {
    let body0 = E::joint_get_body0(contact);
    let body1 = E::joint_get_body1(contact);
    dispatch!(
        body_table::<E>(body0),
        material_pair::<E>(body0, body1),
        ContactsProcess(handler) => handler.contacts_process(
            Joint::from_raw(contact),
            to_duration(timestep),
            thread as usize,
        ),
        else ()
    )
}

pub(crate) unsafe extern "C" fn body_destructor<E: Engine>(body: *const ffi::NewtonBody) {
    if let Some(table) = body_table::<E>(body) {
        let token = Body::from_raw(body);
        dispatch!(
            Some(table),
            Owner::Object(token.handle()),
            BodyDestructor(handler) => handler.body_destroyed(token),
            else ()
        );
        table.notify(Command::Release(token.handle()));
    }
}

pub(crate) unsafe extern "C" fn transform<E: Engine>(body: *const ffi::NewtonBody, matrix: *const f32, thread: c_int) {
    dispatch!(
        body_table::<E>(body),
        Owner::Object(Handle::from_ptr(body)),
        Transform(handler) => handler.transform(Body::from_raw(body), math::mat4(matrix), thread as usize),
        else ()
    )
}

pub(crate) unsafe extern "C" fn force_and_torque<E: Engine>(body: *const ffi::NewtonBody, timestep: f32, thread: c_int) {
    dispatch!(
        body_table::<E>(body),
        Owner::Object(Handle::from_ptr(body)),
        ForceAndTorque(handler) => handler.force_and_torque(Body::from_raw(body), to_duration(timestep), thread as usize),
        else ()
    )
}

pub(crate) unsafe extern "C" fn joint_destructor<E: Engine>(joint: *const ffi::NewtonJoint) {
    if let Some(table) = joint_table::<E>(joint) {
        let token = Joint::from_raw(joint);
        dispatch!(
            Some(table),
            Owner::Object(token.handle()),
            JointDestructor(handler) => handler.joint_destroyed(token),
            else ()
        );
        table.notify(Command::Release(token.handle()));
    }
}

pub(crate) unsafe extern "C" fn ball<E: Engine>(joint: *const ffi::NewtonJoint, timestep: f32) {
    dispatch!(
        joint_table::<E>(joint),
        Owner::Object(Handle::from_ptr(joint)),
        Ball(handler) => handler.ball(Joint::from_raw(joint), to_duration(timestep)),
        else ()
    )
}

pub(crate) unsafe extern "C" fn hinge<E: Engine>(
    joint: *const ffi::NewtonJoint,
    desc: *mut ffi::NewtonHingeSliderUpdateDesc,
) -> c_uint {
    let desc = &mut *(desc as *mut UpdateDesc);
    dispatch!(
        joint_table::<E>(joint),
        Owner::Object(Handle::from_ptr(joint)),
        Hinge(handler) => handler.hinge(Joint::from_raw(joint), desc).bits(),
        else 0
    )
}

pub(crate) unsafe extern "C" fn slider<E: Engine>(
    joint: *const ffi::NewtonJoint,
    desc: *mut ffi::NewtonHingeSliderUpdateDesc,
) -> c_uint {
    let desc = &mut *(desc as *mut UpdateDesc);
    dispatch!(
        joint_table::<E>(joint),
        Owner::Object(Handle::from_ptr(joint)),
        Slider(handler) => handler.slider(Joint::from_raw(joint), desc).bits(),
        else 0
    )
}

// corkscrew and universal joints hand over two descriptors
pub(crate) unsafe extern "C" fn corkscrew<E: Engine>(
    joint: *const ffi::NewtonJoint,
    desc: *mut ffi::NewtonHingeSliderUpdateDesc,
) -> c_uint {
    let desc = &mut *(desc as *mut [UpdateDesc; 2]);
    dispatch!(
        joint_table::<E>(joint),
        Owner::Object(Handle::from_ptr(joint)),
        Corkscrew(handler) => handler.corkscrew(Joint::from_raw(joint), desc).bits(),
        else 0
    )
}

pub(crate) unsafe extern "C" fn universal<E: Engine>(
    joint: *const ffi::NewtonJoint,
    desc: *mut ffi::NewtonHingeSliderUpdateDesc,
) -> c_uint {
    let desc = &mut *(desc as *mut [UpdateDesc; 2]);
    dispatch!(
        joint_table::<E>(joint),
        Owner::Object(Handle::from_ptr(joint)),
        Universal(handler) => handler.universal(Joint::from_raw(joint), desc).bits(),
        else 0
    )
}

pub(crate) unsafe extern "C" fn tree_ray_cast<E: Engine>(
    body: *const ffi::NewtonBody,
    tree: *const ffi::NewtonCollision,
    interception: f32,
    normal: *mut f32,
    face_id: c_int,
    _user_data: *mut std::os::raw::c_void,
) -> f32 {
    // `body` is null when the ray comes from a collision level cast
    dispatch!(
        collision_table::<E>(tree),
        Owner::Object(Handle::from_ptr(tree)),
        TreeRayCast(handler) => handler.tree_ray_cast(
            Body::from_raw(body),
            Collision::from_raw(tree),
            interception,
            math::vec3(normal),
            face_id,
        ),
        else interception
    )
}

pub(crate) unsafe extern "C" fn static_debug<E: Engine>(
    static_body: *const ffi::NewtonBody,
    body: *const ffi::NewtonBody,
    face_id: c_int,
    count: c_int,
    vertices: *const f32,
    stride: c_int,
) {
    let collision = E::body_get_collision(static_body);
    let vertices = Vertices::from_raw(vertices, count.max(0) as usize, stride.max(0) as usize);
    dispatch!(
        collision_table::<E>(collision),
        Owner::Object(Handle::from_ptr(collision)),
        StaticDebug(handler) => handler.static_debug(Body::from_raw(static_body), Body::from_raw(body), face_id, vertices),
        else ()
    )
}

#[cfg(test)]
mod tests {
    use super::to_duration;
    use std::time::Duration;

    #[test]
    fn timestep_to_duration() {
        assert_eq!(Duration::from_millis(500), to_duration(0.5));
        assert_eq!(Duration::from_secs(2), to_duration(2.0));
        assert_eq!(Duration::from_secs(0), to_duration(-1.0));
        assert_eq!(Duration::from_secs(0), to_duration(std::f32::NAN));
    }
}
