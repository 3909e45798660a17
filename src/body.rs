use std::os::raw::{c_int, c_void};

use crate::callbacks;
use crate::engine::Engine;
use crate::ffi;
use crate::handler::{BodyDestructorHandler, ForceAndTorqueHandler, TransformHandler};
use crate::math::{self, Mat4, Vec3, Vec4};
use crate::registry::{Owner, Slot};
use crate::relay::Relay;

handles! {
    /// Opaque handle to a NewtonBody.
    ///
    /// Bodies are owned by the engine. The token is only valid until the
    /// engine destroys the body.
    pub struct Body(*const ffi::NewtonBody);
}

/// Fluid parameters of a buoyancy query.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuoyancyParams {
    pub fluid_density: f32,
    pub fluid_linear_viscosity: f32,
    pub fluid_angular_viscosity: f32,
    pub gravity: Vec3,
}

impl Default for BuoyancyParams {
    fn default() -> Self {
        Self {
            fluid_density: 1.0,
            fluid_linear_viscosity: 0.1,
            fluid_angular_viscosity: 0.1,
            gravity: [0.0, -9.8, 0.0],
        }
    }
}

impl<E: Engine> Relay<E> {
    /// Sets the handler invoked once when the engine destroys `body`.
    ///
    /// The registry entries of the body are released after the handler
    /// returns.
    pub fn set_body_destructor<H>(&mut self, body: Body, handler: H)
    where
        H: BodyDestructorHandler + 'static,
    {
        self.register(Owner::Object(body.handle()), Slot::BodyDestructor(Box::new(handler)));
        self.install_body_destructor(body);
    }

    /// Sets the handler the engine calls with the new matrix of a body that moved.
    pub fn set_transform_callback<H>(&mut self, body: Body, handler: H)
    where
        H: TransformHandler + 'static,
    {
        self.register(Owner::Object(body.handle()), Slot::Transform(Box::new(handler)));
        self.install_body_destructor(body);
        unsafe {
            E::body_set_transform_callback(body.as_raw(), Some(callbacks::transform::<E>));
        }
    }

    /// Sets the handler that applies external forces to a dynamic body.
    pub fn set_force_and_torque_callback<H>(&mut self, body: Body, handler: H)
    where
        H: ForceAndTorqueHandler + 'static,
    {
        self.register(Owner::Object(body.handle()), Slot::ForceAndTorque(Box::new(handler)));
        self.install_body_destructor(body);
        unsafe {
            E::body_set_force_and_torque_callback(body.as_raw(), Some(callbacks::force_and_torque::<E>));
        }
    }

    fn install_body_destructor(&mut self, body: Body) {
        unsafe { E::body_set_destructor_callback(body.as_raw(), Some(callbacks::body_destructor::<E>)) }
    }

    /// Adds buoyancy forces to `body`.
    ///
    /// The engine asks `plane` for the fluid plane in global space, passing the
    /// id of the collision being tested and its global matrix. Returning `None`
    /// means the shape is not submerged.
    pub fn add_buoyancy_force<P>(&self, body: Body, params: &BuoyancyParams, mut plane: P)
    where
        P: FnMut(i32, &Mat4) -> Option<Vec4>,
    {
        unsafe {
            E::body_add_buoyancy_force(
                body.as_raw(),
                params.fluid_density,
                params.fluid_linear_viscosity,
                params.fluid_angular_viscosity,
                params.gravity.as_ptr(),
                Some(buoyancy_plane::<P>),
                &mut plane as *mut P as *mut c_void,
            );
        }

        unsafe extern "C" fn buoyancy_plane<P>(
            collision_id: c_int,
            context: *mut c_void,
            matrix: *const f32,
            plane: *mut f32,
        ) -> c_int
        where
            P: FnMut(i32, &Mat4) -> Option<Vec4>,
        {
            let callback = &mut *(context as *mut P);
            match callback(collision_id, math::mat4(matrix)) {
                Some(p) => {
                    std::ptr::copy_nonoverlapping(p.as_ptr(), plane, 4);
                    1
                }
                None => 0,
            }
        }
    }
}
