//! One trait per persistent callback kind.
//!
//! Closures with the matching signature implement these traits, so most
//! applications never name them:
//!
//! ```
//! use newton_relay::handler::TransformHandler;
//! use newton_relay::{Body, math::Mat4};
//!
//! fn accepts<H: TransformHandler>(_: H) {}
//! accepts(|_body: Body, _matrix: &Mat4, _thread: usize| {});
//! ```
//!
//! The engine may invoke them from its worker threads, hence `Send + Sync`.
use std::time::Duration;

use crate::body::Body;
use crate::collision::Collision;
use crate::joint::{Joint, JointStatus, UpdateDesc};
use crate::material::Material;
use crate::math::{Mat4, Vec3, Vertices};

handlers! {
    /// Notified once when a body leaves the world.
    pub trait BodyLeaveWorldHandler {
        fn body_leave_world(&self, body: Body, thread: usize);
    }

    /// Decides whether two bodies with overlapping AABBs go on to contact generation.
    pub trait AabbOverlapHandler {
        fn aabb_overlap(&self, material: Material, body0: Body, body1: Body, thread: usize) -> bool;
    }

    /// Processes the contacts generated between two bodies.
    pub trait ContactsProcessHandler {
        fn contacts_process(&self, contact: Joint, timestep: Duration, thread: usize);
    }

    /// Invoked exactly once, when the engine destroys the body.
    pub trait BodyDestructorHandler {
        fn body_destroyed(&self, body: Body);
    }

    /// Receives the new transform of a body that moved during the step.
    pub trait TransformHandler {
        fn transform(&self, body: Body, matrix: &Mat4, thread: usize);
    }

    /// Applies external forces to a dynamic body before integration.
    pub trait ForceAndTorqueHandler {
        fn force_and_torque(&self, body: Body, timestep: Duration, thread: usize);
    }

    /// Invoked exactly once, when the engine destroys the joint.
    pub trait JointDestructorHandler {
        fn joint_destroyed(&self, joint: Joint);
    }

    pub trait BallHandler {
        fn ball(&self, joint: Joint, timestep: Duration);
    }

    pub trait HingeHandler {
        fn hinge(&self, joint: Joint, desc: &mut UpdateDesc) -> JointStatus;
    }

    pub trait SliderHandler {
        fn slider(&self, joint: Joint, desc: &mut UpdateDesc) -> JointStatus;
    }

    /// `desc[0]` is the linear degree of freedom, `desc[1]` the angular one.
    pub trait CorkscrewHandler {
        fn corkscrew(&self, joint: Joint, desc: &mut [UpdateDesc; 2]) -> JointStatus;
    }

    /// One descriptor per rotation axis.
    pub trait UniversalHandler {
        fn universal(&self, joint: Joint, desc: &mut [UpdateDesc; 2]) -> JointStatus;
    }

    /// Adjusts a ray hit against a tree collision. Returns the hit parameter.
    pub trait TreeRayCastHandler {
        fn tree_ray_cast(
            &self,
            body: Body,
            tree: Collision,
            interception: f32,
            normal: &Vec3,
            face_id: i32
        ) -> f32;
    }

    /// Receives the faces of a static collision touched by a body while debug drawing.
    pub trait StaticDebugHandler {
        fn static_debug(&self, static_body: Body, body: Body, face_id: i32, vertices: Vertices<'_>);
    }
}
