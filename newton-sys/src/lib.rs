//! Raw declarations of the NewtonDynamics callback surface.
//!
//! Only the handle types, callback typedefs and entry points needed to install
//! callbacks are declared here. The entry points are only available with the
//! `link` feature, which also links `libNewton`.
#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use std::os::raw::{c_int, c_longlong, c_uint, c_void};
use std::ptr;

pub type dFloat = f32;
pub type dLong = c_longlong;

macro_rules! opaque {
    ($($name:ident),*) => {
        $(
            #[repr(C)]
            #[derive(Debug, Copy, Clone)]
            pub struct $name {
                _unused: [u8; 0],
            }
        )*
    }
}

opaque! {
    NewtonWorld,
    NewtonBody,
    NewtonJoint,
    NewtonCollision,
    NewtonMaterial,
    NewtonMesh
}

pub const NEWTON_DYNAMIC_BODY: u32 = 0;
pub const NEWTON_KINEMATIC_BODY: u32 = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct NewtonHingeSliderUpdateDesc {
    pub m_accel: dFloat,
    pub m_minFriction: dFloat,
    pub m_maxFriction: dFloat,
    pub m_timestep: dFloat,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct NewtonWorldConvexCastReturnInfo {
    pub m_point: [dFloat; 4],
    pub m_normal: [dFloat; 4],
    pub m_contactID: dLong,
    pub m_hitBody: *const NewtonBody,
    pub m_penetration: dFloat,
}

impl Default for NewtonWorldConvexCastReturnInfo {
    fn default() -> Self {
        Self {
            m_point: [0.0; 4],
            m_normal: [0.0; 4],
            m_contactID: 0,
            m_hitBody: ptr::null(),
            m_penetration: 0.0,
        }
    }
}

pub type NewtonGetTicksCountCallback = Option<unsafe extern "C" fn() -> c_uint>;
pub type NewtonBodyLeaveWorld = Option<unsafe extern "C" fn(body: *const NewtonBody, threadIndex: c_int)>;
pub type NewtonJointIterator =
    Option<unsafe extern "C" fn(joint: *const NewtonJoint, userData: *mut c_void)>;
pub type NewtonBodyIterator =
    Option<unsafe extern "C" fn(body: *const NewtonBody, userData: *mut c_void) -> c_int>;
pub type NewtonWorldRayFilterCallback = Option<
    unsafe extern "C" fn(
        body: *const NewtonBody,
        shapeHit: *const NewtonCollision,
        hitContact: *const dFloat,
        hitNormal: *const dFloat,
        collisionID: dLong,
        userData: *mut c_void,
        intersectParam: dFloat,
    ) -> dFloat,
>;
pub type NewtonWorldRayPrefilterCallback = Option<
    unsafe extern "C" fn(
        body: *const NewtonBody,
        collision: *const NewtonCollision,
        userData: *mut c_void,
    ) -> c_uint,
>;
pub type NewtonOnAABBOverlap = Option<
    unsafe extern "C" fn(
        material: *const NewtonMaterial,
        body0: *const NewtonBody,
        body1: *const NewtonBody,
        threadIndex: c_int,
    ) -> c_int,
>;
pub type NewtonContactsProcess =
    Option<unsafe extern "C" fn(contact: *const NewtonJoint, timestep: dFloat, threadIndex: c_int)>;

pub type NewtonBodyDestructor = Option<unsafe extern "C" fn(body: *const NewtonBody)>;
pub type NewtonSetTransform = Option<
    unsafe extern "C" fn(body: *const NewtonBody, matrix: *const dFloat, threadIndex: c_int),
>;
pub type NewtonApplyForceAndTorque =
    Option<unsafe extern "C" fn(body: *const NewtonBody, timestep: dFloat, threadIndex: c_int)>;
pub type NewtonGetBuoyancyPlane = Option<
    unsafe extern "C" fn(
        collisionID: c_int,
        context: *mut c_void,
        globalSpaceMatrix: *const dFloat,
        globalSpacePlane: *mut dFloat,
    ) -> c_int,
>;

pub type NewtonConstraintDestructor = Option<unsafe extern "C" fn(me: *const NewtonJoint)>;
pub type NewtonBallCallback = Option<unsafe extern "C" fn(ball: *const NewtonJoint, timestep: dFloat)>;
pub type NewtonHingeCallback = Option<
    unsafe extern "C" fn(hinge: *const NewtonJoint, desc: *mut NewtonHingeSliderUpdateDesc) -> c_uint,
>;
pub type NewtonSliderCallback = Option<
    unsafe extern "C" fn(slider: *const NewtonJoint, desc: *mut NewtonHingeSliderUpdateDesc) -> c_uint,
>;
pub type NewtonCorkscrewCallback = Option<
    unsafe extern "C" fn(corkscrew: *const NewtonJoint, desc: *mut NewtonHingeSliderUpdateDesc) -> c_uint,
>;
pub type NewtonUniversalCallback = Option<
    unsafe extern "C" fn(universal: *const NewtonJoint, desc: *mut NewtonHingeSliderUpdateDesc) -> c_uint,
>;

pub type NewtonCollisionTreeRayCastCallback = Option<
    unsafe extern "C" fn(
        body: *const NewtonBody,
        treeCollision: *const NewtonCollision,
        intersection: dFloat,
        normal: *mut dFloat,
        faceId: c_int,
        usedData: *mut c_void,
    ) -> dFloat,
>;
pub type NewtonTreeCollisionCallback = Option<
    unsafe extern "C" fn(
        bodyWithTreeCollision: *const NewtonBody,
        body: *const NewtonBody,
        faceID: c_int,
        vertexCount: c_int,
        vertex: *const dFloat,
        vertexStrideInBytes: c_int,
    ),
>;
pub type NewtonCollisionIterator = Option<
    unsafe extern "C" fn(userData: *mut c_void, vertexCount: c_int, faceArray: *const dFloat, faceId: c_int),
>;
pub type NewtonSerializeCallback =
    Option<unsafe extern "C" fn(serializeHandle: *mut c_void, buffer: *const c_void, size: c_int)>;
pub type NewtonDeserializeCallback =
    Option<unsafe extern "C" fn(serializeHandle: *mut c_void, buffer: *mut c_void, size: c_int)>;
pub type NewtonReportProgress =
    Option<unsafe extern "C" fn(normalizedProgressPercent: dFloat, userData: *mut c_void) -> c_int>;

#[cfg(feature = "link")]
extern "C" {
    // world
    pub fn NewtonWorldGetUserData(newtonWorld: *const NewtonWorld) -> *mut c_void;
    pub fn NewtonWorldSetUserData(newtonWorld: *const NewtonWorld, userData: *mut c_void);
    pub fn NewtonSetThreadsCount(newtonWorld: *const NewtonWorld, threads: c_int);
    pub fn NewtonUpdate(newtonWorld: *const NewtonWorld, timestep: dFloat);
    pub fn NewtonSetPerformanceClock(newtonWorld: *const NewtonWorld, callback: NewtonGetTicksCountCallback);
    pub fn NewtonSetBodyLeaveWorldEvent(newtonWorld: *const NewtonWorld, callback: NewtonBodyLeaveWorld);
    pub fn NewtonWorldForEachJointDo(
        newtonWorld: *const NewtonWorld,
        callback: NewtonJointIterator,
        userData: *mut c_void,
    );
    pub fn NewtonWorldForEachBodyInAABBDo(
        newtonWorld: *const NewtonWorld,
        p0: *const dFloat,
        p1: *const dFloat,
        callback: NewtonBodyIterator,
        userData: *mut c_void,
    );
    pub fn NewtonWorldRayCast(
        newtonWorld: *const NewtonWorld,
        p0: *const dFloat,
        p1: *const dFloat,
        filter: NewtonWorldRayFilterCallback,
        userData: *mut c_void,
        prefilter: NewtonWorldRayPrefilterCallback,
        threadIndex: c_int,
    );
    pub fn NewtonWorldConvexCast(
        newtonWorld: *const NewtonWorld,
        matrix: *const dFloat,
        target: *const dFloat,
        shape: *const NewtonCollision,
        param: *mut dFloat,
        userData: *mut c_void,
        prefilter: NewtonWorldRayPrefilterCallback,
        info: *mut NewtonWorldConvexCastReturnInfo,
        maxContactsCount: c_int,
        threadIndex: c_int,
    ) -> c_int;
    pub fn NewtonMaterialSetCollisionCallback(
        newtonWorld: *const NewtonWorld,
        id0: c_int,
        id1: c_int,
        userData: *mut c_void,
        aabbOverlap: NewtonOnAABBOverlap,
        process: NewtonContactsProcess,
    );

    // body
    pub fn NewtonBodyGetWorld(body: *const NewtonBody) -> *const NewtonWorld;
    pub fn NewtonBodyGetCollision(body: *const NewtonBody) -> *const NewtonCollision;
    pub fn NewtonBodyGetMaterialGroupID(body: *const NewtonBody) -> c_int;
    pub fn NewtonBodySetDestructorCallback(body: *const NewtonBody, callback: NewtonBodyDestructor);
    pub fn NewtonBodySetTransformCallback(body: *const NewtonBody, callback: NewtonSetTransform);
    pub fn NewtonBodySetForceAndTorqueCallback(body: *const NewtonBody, callback: NewtonApplyForceAndTorque);
    pub fn NewtonBodyAddBuoyancyForce(
        body: *const NewtonBody,
        fluidDensity: dFloat,
        fluidLinearViscosity: dFloat,
        fluidAngularViscosity: dFloat,
        gravityVector: *const dFloat,
        buoyancyPlane: NewtonGetBuoyancyPlane,
        context: *mut c_void,
    );

    // joint
    pub fn NewtonJointGetBody0(joint: *const NewtonJoint) -> *const NewtonBody;
    pub fn NewtonJointGetBody1(joint: *const NewtonJoint) -> *const NewtonBody;
    pub fn NewtonJointSetDestructor(joint: *const NewtonJoint, destructor: NewtonConstraintDestructor);
    pub fn NewtonBallSetUserCallback(ball: *const NewtonJoint, callback: NewtonBallCallback);
    pub fn NewtonHingeSetUserCallback(hinge: *const NewtonJoint, callback: NewtonHingeCallback);
    pub fn NewtonSliderSetUserCallback(slider: *const NewtonJoint, callback: NewtonSliderCallback);
    pub fn NewtonCorkscrewSetUserCallback(corkscrew: *const NewtonJoint, callback: NewtonCorkscrewCallback);
    pub fn NewtonUniversalSetUserCallback(universal: *const NewtonJoint, callback: NewtonUniversalCallback);
    pub fn NewtonHingeCalculateStopAlpha(
        hinge: *const NewtonJoint,
        desc: *const NewtonHingeSliderUpdateDesc,
        angle: dFloat,
    ) -> dFloat;
    pub fn NewtonSliderCalculateStopAccel(
        slider: *const NewtonJoint,
        desc: *const NewtonHingeSliderUpdateDesc,
        position: dFloat,
    ) -> dFloat;
    pub fn NewtonCorkscrewCalculateStopAlpha(
        corkscrew: *const NewtonJoint,
        desc: *const NewtonHingeSliderUpdateDesc,
        angle: dFloat,
    ) -> dFloat;
    pub fn NewtonCorkscrewCalculateStopAccel(
        corkscrew: *const NewtonJoint,
        desc: *const NewtonHingeSliderUpdateDesc,
        position: dFloat,
    ) -> dFloat;
    pub fn NewtonUniversalCalculateStopAlpha0(
        universal: *const NewtonJoint,
        desc: *const NewtonHingeSliderUpdateDesc,
        angle: dFloat,
    ) -> dFloat;
    pub fn NewtonUniversalCalculateStopAlpha1(
        universal: *const NewtonJoint,
        desc: *const NewtonHingeSliderUpdateDesc,
        angle: dFloat,
    ) -> dFloat;

    // collision
    pub fn NewtonCollisionGetUserData(collision: *const NewtonCollision) -> *mut c_void;
    pub fn NewtonCollisionSetUserData(collision: *const NewtonCollision, userData: *mut c_void);
    pub fn NewtonTreeCollisionSetUserRayCastCallback(
        treeCollision: *const NewtonCollision,
        rayHitCallback: NewtonCollisionTreeRayCastCallback,
    );
    pub fn NewtonStaticCollisionSetDebugCallback(
        staticCollision: *const NewtonCollision,
        userCallback: NewtonTreeCollisionCallback,
    );
    pub fn NewtonCollisionForEachPolygonDo(
        collision: *const NewtonCollision,
        matrix: *const dFloat,
        callback: NewtonCollisionIterator,
        userData: *mut c_void,
    );
    pub fn NewtonCollisionSerialize(
        newtonWorld: *const NewtonWorld,
        collision: *const NewtonCollision,
        serializeFunction: NewtonSerializeCallback,
        serializeHandle: *mut c_void,
    );
    pub fn NewtonCreateCollisionFromSerialization(
        newtonWorld: *const NewtonWorld,
        deserializeFunction: NewtonDeserializeCallback,
        serializeHandle: *mut c_void,
    ) -> *mut NewtonCollision;
    pub fn NewtonDestroyCollision(collision: *const NewtonCollision);

    // mesh
    pub fn NewtonMeshSimplify(
        mesh: *const NewtonMesh,
        maxVertexCount: c_int,
        reportProgressCallback: NewtonReportProgress,
        reportProgressUserData: *mut c_void,
    ) -> *mut NewtonMesh;
    pub fn NewtonMeshApproximateConvexDecomposition(
        mesh: *const NewtonMesh,
        maxConcavity: dFloat,
        backFaceDistanceFactor: dFloat,
        maxCount: c_int,
        maxVertexPerHull: c_int,
        reportProgressCallback: NewtonReportProgress,
        reportProgressUserData: *mut c_void,
    ) -> *mut NewtonMesh;
    pub fn NewtonMeshDestroy(mesh: *const NewtonMesh);
}
