//! The engine side of the relay.
//!
//! Every entry point the relay forwards to is an associated function of
//! [`Engine`]. Trampolines are generic over the engine, so the same relay code
//! drives the real library ([`Newton`], feature `native`) and the in-process
//! fake used by the tests (`mock::Mock`, feature `mock`).
use std::os::raw::{c_int, c_void};

use crate::ffi;
use crate::joint::JointStop;

#[cfg(feature = "native")]
pub use self::native::Newton;

/// Entry points of the NewtonDynamics C API used by the relay.
///
/// # Safety
///
/// Implementors must behave like the engine: installed callbacks are invoked
/// with the argument shapes declared in `newton-sys`, and user data pointers
/// are passed back unmodified.
pub unsafe trait Engine: 'static {
    // world
    unsafe fn world_get_user_data(world: *const ffi::NewtonWorld) -> *mut c_void;
    unsafe fn world_set_user_data(world: *const ffi::NewtonWorld, data: *mut c_void);
    unsafe fn set_threads_count(world: *const ffi::NewtonWorld, threads: c_int);
    unsafe fn update(world: *const ffi::NewtonWorld, timestep: f32);
    unsafe fn set_performance_clock(
        world: *const ffi::NewtonWorld,
        callback: ffi::NewtonGetTicksCountCallback,
    );
    unsafe fn set_body_leave_world_event(
        world: *const ffi::NewtonWorld,
        callback: ffi::NewtonBodyLeaveWorld,
    );
    unsafe fn world_for_each_joint_do(
        world: *const ffi::NewtonWorld,
        callback: ffi::NewtonJointIterator,
        user_data: *mut c_void,
    );
    unsafe fn world_for_each_body_in_aabb_do(
        world: *const ffi::NewtonWorld,
        p0: *const f32,
        p1: *const f32,
        callback: ffi::NewtonBodyIterator,
        user_data: *mut c_void,
    );
    unsafe fn world_ray_cast(
        world: *const ffi::NewtonWorld,
        p0: *const f32,
        p1: *const f32,
        filter: ffi::NewtonWorldRayFilterCallback,
        user_data: *mut c_void,
        prefilter: ffi::NewtonWorldRayPrefilterCallback,
        thread_index: c_int,
    );
    unsafe fn world_convex_cast(
        world: *const ffi::NewtonWorld,
        matrix: *const f32,
        target: *const f32,
        shape: *const ffi::NewtonCollision,
        param: *mut f32,
        user_data: *mut c_void,
        prefilter: ffi::NewtonWorldRayPrefilterCallback,
        info: *mut ffi::NewtonWorldConvexCastReturnInfo,
        max_contacts: c_int,
        thread_index: c_int,
    ) -> c_int;
    unsafe fn material_set_collision_callback(
        world: *const ffi::NewtonWorld,
        id0: c_int,
        id1: c_int,
        user_data: *mut c_void,
        overlap: ffi::NewtonOnAABBOverlap,
        process: ffi::NewtonContactsProcess,
    );

    // body
    unsafe fn body_get_world(body: *const ffi::NewtonBody) -> *const ffi::NewtonWorld;
    unsafe fn body_get_collision(body: *const ffi::NewtonBody) -> *const ffi::NewtonCollision;
    unsafe fn body_get_material_group_id(body: *const ffi::NewtonBody) -> c_int;
    unsafe fn body_set_destructor_callback(
        body: *const ffi::NewtonBody,
        callback: ffi::NewtonBodyDestructor,
    );
    unsafe fn body_set_transform_callback(
        body: *const ffi::NewtonBody,
        callback: ffi::NewtonSetTransform,
    );
    unsafe fn body_set_force_and_torque_callback(
        body: *const ffi::NewtonBody,
        callback: ffi::NewtonApplyForceAndTorque,
    );
    unsafe fn body_add_buoyancy_force(
        body: *const ffi::NewtonBody,
        fluid_density: f32,
        fluid_linear_viscosity: f32,
        fluid_angular_viscosity: f32,
        gravity: *const f32,
        plane: ffi::NewtonGetBuoyancyPlane,
        context: *mut c_void,
    );

    // joint
    unsafe fn joint_get_body0(joint: *const ffi::NewtonJoint) -> *const ffi::NewtonBody;
    unsafe fn joint_get_body1(joint: *const ffi::NewtonJoint) -> *const ffi::NewtonBody;
    unsafe fn joint_set_destructor(
        joint: *const ffi::NewtonJoint,
        destructor: ffi::NewtonConstraintDestructor,
    );
    unsafe fn ball_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonBallCallback);
    unsafe fn hinge_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonHingeCallback);
    unsafe fn slider_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonSliderCallback);
    unsafe fn corkscrew_set_user_callback(
        joint: *const ffi::NewtonJoint,
        callback: ffi::NewtonCorkscrewCallback,
    );
    unsafe fn universal_set_user_callback(
        joint: *const ffi::NewtonJoint,
        callback: ffi::NewtonUniversalCallback,
    );
    unsafe fn joint_calculate_stop(
        joint: *const ffi::NewtonJoint,
        stop: JointStop,
        desc: *const ffi::NewtonHingeSliderUpdateDesc,
        value: f32,
    ) -> f32;

    // collision
    unsafe fn collision_get_user_data(collision: *const ffi::NewtonCollision) -> *mut c_void;
    unsafe fn collision_set_user_data(collision: *const ffi::NewtonCollision, data: *mut c_void);
    unsafe fn tree_collision_set_user_ray_cast_callback(
        collision: *const ffi::NewtonCollision,
        callback: ffi::NewtonCollisionTreeRayCastCallback,
    );
    unsafe fn static_collision_set_debug_callback(
        collision: *const ffi::NewtonCollision,
        callback: ffi::NewtonTreeCollisionCallback,
    );
    unsafe fn collision_for_each_polygon_do(
        collision: *const ffi::NewtonCollision,
        matrix: *const f32,
        callback: ffi::NewtonCollisionIterator,
        user_data: *mut c_void,
    );
    unsafe fn collision_serialize(
        world: *const ffi::NewtonWorld,
        collision: *const ffi::NewtonCollision,
        callback: ffi::NewtonSerializeCallback,
        handle: *mut c_void,
    );
    unsafe fn create_collision_from_serialization(
        world: *const ffi::NewtonWorld,
        callback: ffi::NewtonDeserializeCallback,
        handle: *mut c_void,
    ) -> *mut ffi::NewtonCollision;
    unsafe fn destroy_collision(collision: *const ffi::NewtonCollision);

    // mesh
    unsafe fn mesh_simplify(
        mesh: *const ffi::NewtonMesh,
        max_vertex_count: c_int,
        progress: ffi::NewtonReportProgress,
        user_data: *mut c_void,
    ) -> *mut ffi::NewtonMesh;
    unsafe fn mesh_approximate_convex_decomposition(
        mesh: *const ffi::NewtonMesh,
        max_concavity: f32,
        back_face_distance_factor: f32,
        max_count: c_int,
        max_vertex_per_hull: c_int,
        progress: ffi::NewtonReportProgress,
        user_data: *mut c_void,
    ) -> *mut ffi::NewtonMesh;
    unsafe fn mesh_destroy(mesh: *const ffi::NewtonMesh);
}

#[cfg(feature = "native")]
mod native {
    use std::os::raw::{c_int, c_void};

    use super::Engine;
    use crate::ffi;
    use crate::joint::JointStop;

    /// The NewtonDynamics library.
    #[derive(Debug)]
    pub enum Newton {}

    unsafe impl Engine for Newton {
        unsafe fn world_get_user_data(world: *const ffi::NewtonWorld) -> *mut c_void {
            ffi::NewtonWorldGetUserData(world)
        }

        unsafe fn world_set_user_data(world: *const ffi::NewtonWorld, data: *mut c_void) {
            ffi::NewtonWorldSetUserData(world, data)
        }

        unsafe fn set_threads_count(world: *const ffi::NewtonWorld, threads: c_int) {
            ffi::NewtonSetThreadsCount(world, threads)
        }

        unsafe fn update(world: *const ffi::NewtonWorld, timestep: f32) {
            ffi::NewtonUpdate(world, timestep)
        }

        unsafe fn set_performance_clock(
            world: *const ffi::NewtonWorld,
            callback: ffi::NewtonGetTicksCountCallback,
        ) {
            ffi::NewtonSetPerformanceClock(world, callback)
        }

        unsafe fn set_body_leave_world_event(
            world: *const ffi::NewtonWorld,
            callback: ffi::NewtonBodyLeaveWorld,
        ) {
            ffi::NewtonSetBodyLeaveWorldEvent(world, callback)
        }

        unsafe fn world_for_each_joint_do(
            world: *const ffi::NewtonWorld,
            callback: ffi::NewtonJointIterator,
            user_data: *mut c_void,
        ) {
            ffi::NewtonWorldForEachJointDo(world, callback, user_data)
        }

        unsafe fn world_for_each_body_in_aabb_do(
            world: *const ffi::NewtonWorld,
            p0: *const f32,
            p1: *const f32,
            callback: ffi::NewtonBodyIterator,
            user_data: *mut c_void,
        ) {
            ffi::NewtonWorldForEachBodyInAABBDo(world, p0, p1, callback, user_data)
        }

        unsafe fn world_ray_cast(
            world: *const ffi::NewtonWorld,
            p0: *const f32,
            p1: *const f32,
            filter: ffi::NewtonWorldRayFilterCallback,
            user_data: *mut c_void,
            prefilter: ffi::NewtonWorldRayPrefilterCallback,
            thread_index: c_int,
        ) {
            ffi::NewtonWorldRayCast(world, p0, p1, filter, user_data, prefilter, thread_index)
        }

        unsafe fn world_convex_cast(
            world: *const ffi::NewtonWorld,
            matrix: *const f32,
            target: *const f32,
            shape: *const ffi::NewtonCollision,
            param: *mut f32,
            user_data: *mut c_void,
            prefilter: ffi::NewtonWorldRayPrefilterCallback,
            info: *mut ffi::NewtonWorldConvexCastReturnInfo,
            max_contacts: c_int,
            thread_index: c_int,
        ) -> c_int {
            ffi::NewtonWorldConvexCast(
                world,
                matrix,
                target,
                shape,
                param,
                user_data,
                prefilter,
                info,
                max_contacts,
                thread_index,
            )
        }

        unsafe fn material_set_collision_callback(
            world: *const ffi::NewtonWorld,
            id0: c_int,
            id1: c_int,
            user_data: *mut c_void,
            overlap: ffi::NewtonOnAABBOverlap,
            process: ffi::NewtonContactsProcess,
        ) {
            ffi::NewtonMaterialSetCollisionCallback(world, id0, id1, user_data, overlap, process)
        }

        unsafe fn body_get_world(body: *const ffi::NewtonBody) -> *const ffi::NewtonWorld {
            ffi::NewtonBodyGetWorld(body)
        }

        unsafe fn body_get_collision(body: *const ffi::NewtonBody) -> *const ffi::NewtonCollision {
            ffi::NewtonBodyGetCollision(body)
        }

        unsafe fn body_get_material_group_id(body: *const ffi::NewtonBody) -> c_int {
            ffi::NewtonBodyGetMaterialGroupID(body)
        }

        unsafe fn body_set_destructor_callback(
            body: *const ffi::NewtonBody,
            callback: ffi::NewtonBodyDestructor,
        ) {
            ffi::NewtonBodySetDestructorCallback(body, callback)
        }

        unsafe fn body_set_transform_callback(
            body: *const ffi::NewtonBody,
            callback: ffi::NewtonSetTransform,
        ) {
            ffi::NewtonBodySetTransformCallback(body, callback)
        }

        unsafe fn body_set_force_and_torque_callback(
            body: *const ffi::NewtonBody,
            callback: ffi::NewtonApplyForceAndTorque,
        ) {
            ffi::NewtonBodySetForceAndTorqueCallback(body, callback)
        }

        unsafe fn body_add_buoyancy_force(
            body: *const ffi::NewtonBody,
            fluid_density: f32,
            fluid_linear_viscosity: f32,
            fluid_angular_viscosity: f32,
            gravity: *const f32,
            plane: ffi::NewtonGetBuoyancyPlane,
            context: *mut c_void,
        ) {
            ffi::NewtonBodyAddBuoyancyForce(
                body,
                fluid_density,
                fluid_linear_viscosity,
                fluid_angular_viscosity,
                gravity,
                plane,
                context,
            )
        }

        unsafe fn joint_get_body0(joint: *const ffi::NewtonJoint) -> *const ffi::NewtonBody {
            ffi::NewtonJointGetBody0(joint)
        }

        unsafe fn joint_get_body1(joint: *const ffi::NewtonJoint) -> *const ffi::NewtonBody {
            ffi::NewtonJointGetBody1(joint)
        }

        unsafe fn joint_set_destructor(
            joint: *const ffi::NewtonJoint,
            destructor: ffi::NewtonConstraintDestructor,
        ) {
            ffi::NewtonJointSetDestructor(joint, destructor)
        }

        unsafe fn ball_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonBallCallback) {
            ffi::NewtonBallSetUserCallback(joint, callback)
        }

        unsafe fn hinge_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonHingeCallback) {
            ffi::NewtonHingeSetUserCallback(joint, callback)
        }

        unsafe fn slider_set_user_callback(joint: *const ffi::NewtonJoint, callback: ffi::NewtonSliderCallback) {
            ffi::NewtonSliderSetUserCallback(joint, callback)
        }

        unsafe fn corkscrew_set_user_callback(
            joint: *const ffi::NewtonJoint,
            callback: ffi::NewtonCorkscrewCallback,
        ) {
            ffi::NewtonCorkscrewSetUserCallback(joint, callback)
        }

        unsafe fn universal_set_user_callback(
            joint: *const ffi::NewtonJoint,
            callback: ffi::NewtonUniversalCallback,
        ) {
            ffi::NewtonUniversalSetUserCallback(joint, callback)
        }

        unsafe fn joint_calculate_stop(
            joint: *const ffi::NewtonJoint,
            stop: JointStop,
            desc: *const ffi::NewtonHingeSliderUpdateDesc,
            value: f32,
        ) -> f32 {
            match stop {
                JointStop::HingeAlpha => ffi::NewtonHingeCalculateStopAlpha(joint, desc, value),
                JointStop::SliderAccel => ffi::NewtonSliderCalculateStopAccel(joint, desc, value),
                JointStop::CorkscrewAlpha => ffi::NewtonCorkscrewCalculateStopAlpha(joint, desc, value),
                JointStop::CorkscrewAccel => ffi::NewtonCorkscrewCalculateStopAccel(joint, desc, value),
                JointStop::UniversalAlpha0 => ffi::NewtonUniversalCalculateStopAlpha0(joint, desc, value),
                JointStop::UniversalAlpha1 => ffi::NewtonUniversalCalculateStopAlpha1(joint, desc, value),
            }
        }

        unsafe fn collision_get_user_data(collision: *const ffi::NewtonCollision) -> *mut c_void {
            ffi::NewtonCollisionGetUserData(collision)
        }

        unsafe fn collision_set_user_data(collision: *const ffi::NewtonCollision, data: *mut c_void) {
            ffi::NewtonCollisionSetUserData(collision, data)
        }

        unsafe fn tree_collision_set_user_ray_cast_callback(
            collision: *const ffi::NewtonCollision,
            callback: ffi::NewtonCollisionTreeRayCastCallback,
        ) {
            ffi::NewtonTreeCollisionSetUserRayCastCallback(collision, callback)
        }

        unsafe fn static_collision_set_debug_callback(
            collision: *const ffi::NewtonCollision,
            callback: ffi::NewtonTreeCollisionCallback,
        ) {
            ffi::NewtonStaticCollisionSetDebugCallback(collision, callback)
        }

        unsafe fn collision_for_each_polygon_do(
            collision: *const ffi::NewtonCollision,
            matrix: *const f32,
            callback: ffi::NewtonCollisionIterator,
            user_data: *mut c_void,
        ) {
            ffi::NewtonCollisionForEachPolygonDo(collision, matrix, callback, user_data)
        }

        unsafe fn collision_serialize(
            world: *const ffi::NewtonWorld,
            collision: *const ffi::NewtonCollision,
            callback: ffi::NewtonSerializeCallback,
            handle: *mut c_void,
        ) {
            ffi::NewtonCollisionSerialize(world, collision, callback, handle)
        }

        unsafe fn create_collision_from_serialization(
            world: *const ffi::NewtonWorld,
            callback: ffi::NewtonDeserializeCallback,
            handle: *mut c_void,
        ) -> *mut ffi::NewtonCollision {
            ffi::NewtonCreateCollisionFromSerialization(world, callback, handle)
        }

        unsafe fn destroy_collision(collision: *const ffi::NewtonCollision) {
            ffi::NewtonDestroyCollision(collision)
        }

        unsafe fn mesh_simplify(
            mesh: *const ffi::NewtonMesh,
            max_vertex_count: c_int,
            progress: ffi::NewtonReportProgress,
            user_data: *mut c_void,
        ) -> *mut ffi::NewtonMesh {
            ffi::NewtonMeshSimplify(mesh, max_vertex_count, progress, user_data)
        }

        unsafe fn mesh_approximate_convex_decomposition(
            mesh: *const ffi::NewtonMesh,
            max_concavity: f32,
            back_face_distance_factor: f32,
            max_count: c_int,
            max_vertex_per_hull: c_int,
            progress: ffi::NewtonReportProgress,
            user_data: *mut c_void,
        ) -> *mut ffi::NewtonMesh {
            ffi::NewtonMeshApproximateConvexDecomposition(
                mesh,
                max_concavity,
                back_face_distance_factor,
                max_count,
                max_vertex_per_hull,
                progress,
                user_data,
            )
        }

        unsafe fn mesh_destroy(mesh: *const ffi::NewtonMesh) {
            ffi::NewtonMeshDestroy(mesh)
        }
    }
}
