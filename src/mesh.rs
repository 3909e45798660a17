use std::marker::PhantomData;
use std::mem;
use std::os::raw::{c_int, c_void};

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::ffi;

/// Newton mesh wrapper.
///
/// The mesh is destroyed when dropped. Mesh operations leave `self` untouched
/// and return a new mesh.
#[derive(Debug)]
pub struct Mesh<E: Engine> {
    raw: *const ffi::NewtonMesh,
    _engine: PhantomData<fn() -> E>,
}

impl<E: Engine> Drop for Mesh<E> {
    fn drop(&mut self) {
        unsafe { E::mesh_destroy(self.raw) }
    }
}

impl<E: Engine> Mesh<E> {
    /// Takes ownership of a mesh created by the engine.
    pub unsafe fn from_raw(raw: *const ffi::NewtonMesh) -> Self {
        Self {
            raw,
            _engine: PhantomData,
        }
    }

    pub fn as_raw(&self) -> *const ffi::NewtonMesh {
        self.raw
    }

    pub fn into_raw(self) -> *const ffi::NewtonMesh {
        let raw = self.raw;
        mem::forget(self);
        raw
    }

    /// Reduces the mesh to at most `max_vertex_count` vertices.
    ///
    /// `progress` receives the completed fraction and returns `false` to
    /// cancel the operation.
    pub fn simplify<P>(&self, max_vertex_count: usize, mut progress: P) -> Result<Self>
    where
        P: FnMut(f32) -> bool,
    {
        let raw = unsafe {
            E::mesh_simplify(
                self.raw,
                max_vertex_count as c_int,
                Some(report_progress::<P>),
                &mut progress as *mut P as *mut c_void,
            )
        };
        Self::produced(raw, "simplify")
    }

    /// Splits the mesh into convex hulls.
    pub fn approximate_convex_decomposition<P>(
        &self,
        max_concavity: f32,
        back_face_distance_factor: f32,
        max_count: usize,
        max_vertex_per_hull: usize,
        mut progress: P,
    ) -> Result<Self>
    where
        P: FnMut(f32) -> bool,
    {
        let raw = unsafe {
            E::mesh_approximate_convex_decomposition(
                self.raw,
                max_concavity,
                back_face_distance_factor,
                max_count as c_int,
                max_vertex_per_hull as c_int,
                Some(report_progress::<P>),
                &mut progress as *mut P as *mut c_void,
            )
        };
        Self::produced(raw, "approximate_convex_decomposition")
    }

    fn produced(raw: *mut ffi::NewtonMesh, op: &'static str) -> Result<Self> {
        if raw.is_null() {
            log::debug!("mesh operation {} returned no mesh", op);
            Err(Error::Mesh(op))
        } else {
            Ok(unsafe { Self::from_raw(raw) })
        }
    }
}

unsafe extern "C" fn report_progress<P>(progress: f32, user_data: *mut c_void) -> c_int
where
    P: FnMut(f32) -> bool,
{
    if (*(user_data as *mut P))(progress) {
        1
    } else {
        0
    }
}
