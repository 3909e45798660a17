use std::os::raw;

use crate::ffi;

/// Material group ID
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupId(pub(crate) raw::c_int);

impl GroupId {
    /// Wraps an id returned by `NewtonMaterialCreateGroupID`.
    #[inline]
    pub fn from_raw(id: raw::c_int) -> Self {
        GroupId(id)
    }

    #[inline]
    pub fn as_raw(&self) -> raw::c_int {
        self.0
    }
}

handles! {
    /// Material of a contact between two bodies, valid while the collision
    /// callbacks run.
    pub struct Material(*const ffi::NewtonMaterial);
}
