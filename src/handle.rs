//! Identity of engine-owned objects.
//!
//! ```
//! use newton_relay::handle::Handle;
//!
//! let a = 0x10 as *const ();
//! assert_eq!(Handle::from_ptr(a), Handle::from_ptr(a));
//! assert!(Handle::null().is_null());
//! ```
use std::os::raw::c_void;

/// Untyped identity of a world, body, joint or collision.
///
/// A handle is never dereferenced. It is only compared and hashed, which is
/// what the callback registry uses it for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Handle(*const ());

impl Handle {
    pub fn null() -> Self {
        Self::from_ptr(std::ptr::null::<()>())
    }

    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as *const ())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.0 as _
    }
}

unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

/// Types that wrap an engine object.
pub trait AsHandle {
    fn as_handle(&self) -> Handle;
}

impl AsHandle for Handle {
    fn as_handle(&self) -> Handle {
        *self
    }
}
