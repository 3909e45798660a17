use bitflags::bitflags;

use crate::body::Body;
use crate::callbacks;
use crate::engine::Engine;
use crate::ffi;
use crate::handler::{
    BallHandler, CorkscrewHandler, HingeHandler, JointDestructorHandler, SliderHandler,
    UniversalHandler,
};
use crate::registry::{Owner, Slot};
use crate::relay::Relay;

handles! {
    /// Opaque handle to a NewtonJoint.
    ///
    /// Contact joints handed to the contacts process callback are joints too.
    pub struct Joint(*const ffi::NewtonJoint);
}

bitflags! {
    /// Tells the engine which update descriptors carry a user acceleration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct JointStatus: u32 {
        const FIRST_ACCEL = 0b01;
        const SECOND_ACCEL = 0b10;
    }
}

/// Degree of freedom of a hinge, slider, corkscrew or universal joint, as
/// handed to its update callback.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateDesc(ffi::NewtonHingeSliderUpdateDesc);

impl UpdateDesc {
    pub fn accel(&self) -> f32 {
        self.0.m_accel
    }

    /// Acceleration the joint must apply along this degree of freedom.
    pub fn set_accel(&mut self, accel: f32) {
        self.0.m_accel = accel;
    }

    pub fn min_friction(&self) -> f32 {
        self.0.m_minFriction
    }

    pub fn set_min_friction(&mut self, friction: f32) {
        self.0.m_minFriction = friction;
    }

    pub fn max_friction(&self) -> f32 {
        self.0.m_maxFriction
    }

    pub fn set_max_friction(&mut self, friction: f32) {
        self.0.m_maxFriction = friction;
    }

    /// Timestep of the update, in seconds.
    pub fn timestep(&self) -> f32 {
        self.0.m_timestep
    }

    pub fn as_raw(&self) -> &ffi::NewtonHingeSliderUpdateDesc {
        &self.0
    }
}

impl From<ffi::NewtonHingeSliderUpdateDesc> for UpdateDesc {
    fn from(desc: ffi::NewtonHingeSliderUpdateDesc) -> Self {
        UpdateDesc(desc)
    }
}

/// Joint limit computations the engine offers to hinge, slider, corkscrew and
/// universal callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointStop {
    HingeAlpha,
    SliderAccel,
    CorkscrewAlpha,
    CorkscrewAccel,
    UniversalAlpha0,
    UniversalAlpha1,
}

impl Joint {
    /// Child body of the joint.
    pub fn body0<E: Engine>(&self) -> Body {
        unsafe { Body::from_raw(E::joint_get_body0(self.as_raw())) }
    }

    /// Parent body of the joint, if it has one.
    pub fn body1<E: Engine>(&self) -> Option<Body> {
        let raw = unsafe { E::joint_get_body1(self.as_raw()) };
        if raw.is_null() {
            None
        } else {
            Some(unsafe { Body::from_raw(raw) })
        }
    }

    fn calculate_stop<E: Engine>(&self, stop: JointStop, desc: &UpdateDesc, value: f32) -> f32 {
        unsafe { E::joint_calculate_stop(self.as_raw(), stop, desc.as_raw(), value) }
    }

    /// Angular acceleration that keeps a hinge at `angle`. Only meaningful
    /// inside the hinge callback.
    pub fn hinge_calculate_stop_alpha<E: Engine>(&self, desc: &UpdateDesc, angle: f32) -> f32 {
        self.calculate_stop::<E>(JointStop::HingeAlpha, desc, angle)
    }

    /// Linear acceleration that keeps a slider at `position`.
    pub fn slider_calculate_stop_accel<E: Engine>(&self, desc: &UpdateDesc, position: f32) -> f32 {
        self.calculate_stop::<E>(JointStop::SliderAccel, desc, position)
    }

    pub fn corkscrew_calculate_stop_alpha<E: Engine>(&self, desc: &UpdateDesc, angle: f32) -> f32 {
        self.calculate_stop::<E>(JointStop::CorkscrewAlpha, desc, angle)
    }

    pub fn corkscrew_calculate_stop_accel<E: Engine>(&self, desc: &UpdateDesc, position: f32) -> f32 {
        self.calculate_stop::<E>(JointStop::CorkscrewAccel, desc, position)
    }

    pub fn universal_calculate_stop_alpha0<E: Engine>(&self, desc: &UpdateDesc, angle: f32) -> f32 {
        self.calculate_stop::<E>(JointStop::UniversalAlpha0, desc, angle)
    }

    pub fn universal_calculate_stop_alpha1<E: Engine>(&self, desc: &UpdateDesc, angle: f32) -> f32 {
        self.calculate_stop::<E>(JointStop::UniversalAlpha1, desc, angle)
    }
}

impl<E: Engine> Relay<E> {
    fn register_joint(&mut self, joint: Joint, slot: Slot) {
        self.register(Owner::Object(joint.handle()), slot);
        unsafe { E::joint_set_destructor(joint.as_raw(), Some(callbacks::joint_destructor::<E>)) }
    }

    /// Sets the handler invoked once when the engine destroys `joint`.
    pub fn set_joint_destructor<H>(&mut self, joint: Joint, handler: H)
    where
        H: JointDestructorHandler + 'static,
    {
        self.register_joint(joint, Slot::JointDestructor(Box::new(handler)));
    }

    pub fn set_ball_callback<H>(&mut self, joint: Joint, handler: H)
    where
        H: BallHandler + 'static,
    {
        self.register_joint(joint, Slot::Ball(Box::new(handler)));
        unsafe { E::ball_set_user_callback(joint.as_raw(), Some(callbacks::ball::<E>)) }
    }

    pub fn set_hinge_callback<H>(&mut self, joint: Joint, handler: H)
    where
        H: HingeHandler + 'static,
    {
        self.register_joint(joint, Slot::Hinge(Box::new(handler)));
        unsafe { E::hinge_set_user_callback(joint.as_raw(), Some(callbacks::hinge::<E>)) }
    }

    pub fn set_slider_callback<H>(&mut self, joint: Joint, handler: H)
    where
        H: SliderHandler + 'static,
    {
        self.register_joint(joint, Slot::Slider(Box::new(handler)));
        unsafe { E::slider_set_user_callback(joint.as_raw(), Some(callbacks::slider::<E>)) }
    }

    pub fn set_corkscrew_callback<H>(&mut self, joint: Joint, handler: H)
    where
        H: CorkscrewHandler + 'static,
    {
        self.register_joint(joint, Slot::Corkscrew(Box::new(handler)));
        unsafe { E::corkscrew_set_user_callback(joint.as_raw(), Some(callbacks::corkscrew::<E>)) }
    }

    pub fn set_universal_callback<H>(&mut self, joint: Joint, handler: H)
    where
        H: UniversalHandler + 'static,
    {
        self.register_joint(joint, Slot::Universal(Box::new(handler)));
        unsafe { E::universal_set_user_callback(joint.as_raw(), Some(callbacks::universal::<E>)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bits() {
        assert_eq!(0, JointStatus::empty().bits());
        assert_eq!(1, JointStatus::FIRST_ACCEL.bits());
        assert_eq!(3, (JointStatus::FIRST_ACCEL | JointStatus::SECOND_ACCEL).bits());
    }

    #[test]
    fn update_desc_accessors() {
        let mut desc = UpdateDesc::default();
        desc.set_accel(2.5);
        desc.set_min_friction(-1.0);
        desc.set_max_friction(1.0);

        assert_eq!(2.5, desc.as_raw().m_accel);
        assert_eq!(-1.0, desc.min_friction());
        assert_eq!(1.0, desc.max_friction());
        assert_eq!(0.0, desc.timestep());
    }
}
