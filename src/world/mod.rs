use std::os::raw::{c_int, c_uint, c_void};

use crate::body::Body;
use crate::callbacks;
use crate::collision::Collision;
use crate::engine::Engine;
use crate::ffi;
use crate::handler::{AabbOverlapHandler, BodyLeaveWorldHandler, ContactsProcessHandler};
use crate::joint::Joint;
use crate::material::GroupId;
use crate::math::{self, Mat4, Vec3, Vec4};
use crate::registry::{Owner, Slot};
use crate::relay::Relay;

use self::ray_cast::{RayCastAlgorithm, RayControl, RayHit};

/// Implementation of useful ray_cast algorithms.
pub mod ray_cast;

handles! {
    /// Opaque handle to a NewtonWorld.
    pub struct World(*const ffi::NewtonWorld);
}

/// Prefilter type to name when a ray cast has no prefilter.
pub type NoPrefilter = fn(Body, Collision) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct ConvexCastInfo {
    pub body: Body,
    pub point: Vec4,
    pub normal: Vec4,
    pub contact_id: i64,
    pub penetration: f32,
}

/// Contacts found by a convex cast.
#[derive(Debug)]
pub struct ConvexCastResult {
    info: Vec<ffi::NewtonWorldConvexCastReturnInfo>,
    hit_param: f32,
}

impl ConvexCastResult {
    /// Parameter along the cast at which the first contact happened.
    pub fn hit_param(&self) -> f32 {
        self.hit_param
    }

    pub fn len(&self) -> usize {
        self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ConvexCastInfo> {
        self.info.get(index).map(|info| ConvexCastInfo {
            body: unsafe { Body::from_raw(info.m_hitBody) },
            point: info.m_point,
            normal: info.m_normal,
            contact_id: info.m_contactID as i64,
            penetration: info.m_penetration,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ConvexCastInfo> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

struct RayCast<F, P> {
    filter: F,
    prefilter: Option<P>,
}

impl<E: Engine> Relay<E> {
    /// Sets the handler notified when a body leaves the world.
    pub fn set_body_leave_world<H>(&mut self, handler: H)
    where
        H: BodyLeaveWorldHandler + 'static,
    {
        let world = self.world();
        self.register(Owner::Object(world.handle()), Slot::BodyLeaveWorld(Box::new(handler)));
        unsafe { E::set_body_leave_world_event(world.as_raw(), Some(callbacks::body_leave_world::<E>)) }
    }

    /// Sets the collision callbacks of a pair of material groups.
    ///
    /// The pair is unordered: `(a, b)` and `(b, a)` name the same slots.
    pub fn set_material_collision<O, P>(&mut self, id0: GroupId, id1: GroupId, overlap: O, process: P)
    where
        O: AabbOverlapHandler + 'static,
        P: ContactsProcessHandler + 'static,
    {
        let owner = Owner::materials(id0, id1);
        self.register(owner, Slot::AabbOverlap(Box::new(overlap)));
        self.register(owner, Slot::ContactsProcess(Box::new(process)));
        unsafe {
            E::material_set_collision_callback(
                self.world().as_raw(),
                id0.as_raw(),
                id1.as_raw(),
                std::ptr::null_mut(),
                Some(callbacks::aabb_overlap::<E>),
                Some(callbacks::contacts_process::<E>),
            );
        }
    }

    /// Calls `f` once for every joint in the world.
    pub fn for_each_joint<F>(&self, mut f: F)
    where
        F: FnMut(Joint),
    {
        unsafe {
            E::world_for_each_joint_do(
                self.world().as_raw(),
                Some(joint_iterator::<F>),
                &mut f as *mut F as *mut c_void,
            );
        }

        unsafe extern "C" fn joint_iterator<F: FnMut(Joint)>(joint: *const ffi::NewtonJoint, user_data: *mut c_void) {
            (*(user_data as *mut F))(Joint::from_raw(joint))
        }
    }

    /// Calls `f` once for every body whose AABB overlaps the box `(min, max)`.
    pub fn for_each_body_in_aabb<F>(&self, min: &Vec3, max: &Vec3, mut f: F)
    where
        F: FnMut(Body),
    {
        unsafe {
            E::world_for_each_body_in_aabb_do(
                self.world().as_raw(),
                min.as_ptr(),
                max.as_ptr(),
                Some(body_iterator::<F>),
                &mut f as *mut F as *mut c_void,
            );
        }

        unsafe extern "C" fn body_iterator<F: FnMut(Body)>(body: *const ffi::NewtonBody, user_data: *mut c_void) -> c_int {
            (*(user_data as *mut F))(Body::from_raw(body));
            1
        }
    }

    /// Shoots a ray from `p0` to `p1`.
    ///
    /// `prefilter` decides which bodies the ray is tested against. `filter` is
    /// called for every hit and tells the engine how to carry on.
    pub fn ray_cast_raw<F, P>(&self, p0: &Vec3, p1: &Vec3, filter: F, prefilter: Option<P>, thread: usize)
    where
        F: FnMut(RayHit) -> RayControl,
        P: FnMut(Body, Collision) -> bool,
    {
        let prefilter_callback: ffi::NewtonWorldRayPrefilterCallback = if prefilter.is_some() {
            Some(ray_prefilter::<F, P>)
        } else {
            None
        };
        let mut cast = RayCast { filter, prefilter };

        unsafe {
            E::world_ray_cast(
                self.world().as_raw(),
                p0.as_ptr(),
                p1.as_ptr(),
                Some(ray_filter::<F, P>),
                &mut cast as *mut RayCast<F, P> as *mut c_void,
                prefilter_callback,
                thread as c_int,
            );
        }

        unsafe extern "C" fn ray_filter<F, P>(
            body: *const ffi::NewtonBody,
            shape: *const ffi::NewtonCollision,
            contact: *const f32,
            normal: *const f32,
            collision_id: ffi::dLong,
            user_data: *mut c_void,
            intersect_param: f32,
        ) -> f32
        where
            F: FnMut(RayHit) -> RayControl,
        {
            let cast = &mut *(user_data as *mut RayCast<F, P>);
            let hit = RayHit {
                body: Body::from_raw(body),
                collision: Collision::from_raw(shape),
                position: *math::vec3(contact),
                normal: *math::vec3(normal),
                collision_id: collision_id as i64,
                intersect_param,
            };
            (cast.filter)(hit).into_param()
        }

        unsafe extern "C" fn ray_prefilter<F, P>(
            body: *const ffi::NewtonBody,
            collision: *const ffi::NewtonCollision,
            user_data: *mut c_void,
        ) -> c_uint
        where
            P: FnMut(Body, Collision) -> bool,
        {
            let cast = &mut *(user_data as *mut RayCast<F, P>);
            let keep = match cast.prefilter.as_mut() {
                Some(prefilter) => prefilter(Body::from_raw(body), Collision::from_raw(collision)),
                None => true,
            };
            if keep {
                1
            } else {
                0
            }
        }
    }

    /// Samples world with a ray, using one of the algorithms in [`ray_cast`].
    ///
    /// ```
    /// use newton_relay::mock::Mock;
    /// use newton_relay::world::ray_cast::{ClosestHit, NClosestHits, RayHit};
    /// use newton_relay::Relay;
    ///
    /// let relay = Relay::<Mock>::attach(Mock::create_world());
    ///
    /// let first: Option<RayHit> = relay.ray_cast::<ClosestHit>(&[0.0; 3], &[0.0, -10.0, 0.0], ());
    /// let first_three: Vec<RayHit> = relay.ray_cast::<NClosestHits>(&[0.0; 3], &[0.0, -10.0, 0.0], 3);
    ///
    /// assert!(first.is_none());
    /// assert!(first_three.is_empty());
    /// ```
    pub fn ray_cast<A: RayCastAlgorithm>(&self, p0: &Vec3, p1: &Vec3, params: A::Params) -> A::Result {
        A::ray_cast(self, p0, p1, params)
    }

    /// Projects the convex `shape` from `matrix` towards `target` and returns
    /// at most `max_contacts` of the contacts it generates.
    pub fn convex_cast<P>(
        &self,
        matrix: &Mat4,
        target: &Vec3,
        shape: Collision,
        mut prefilter: P,
        max_contacts: usize,
        thread: usize,
    ) -> ConvexCastResult
    where
        P: FnMut(Body, Collision) -> bool,
    {
        unsafe extern "C" fn prefilter_callback<P>(
            body: *const ffi::NewtonBody,
            collision: *const ffi::NewtonCollision,
            user_data: *mut c_void,
        ) -> c_uint
        where
            P: FnMut(Body, Collision) -> bool,
        {
            let prefilter = &mut *(user_data as *mut P);
            if prefilter(Body::from_raw(body), Collision::from_raw(collision)) {
                1
            } else {
                0
            }
        }

        let mut info = vec![ffi::NewtonWorldConvexCastReturnInfo::default(); max_contacts];
        let mut hit_param = 0.0f32;
        let contacts = unsafe {
            E::world_convex_cast(
                self.world().as_raw(),
                matrix.as_ptr() as *const f32,
                target.as_ptr(),
                shape.as_raw(),
                &mut hit_param,
                &mut prefilter as *mut P as *mut c_void,
                Some(prefilter_callback::<P>),
                info.as_mut_ptr(),
                max_contacts as c_int,
                thread as c_int,
            )
        };

        info.truncate(contacts.max(0) as usize);
        ConvexCastResult { info, hit_param }
    }
}
