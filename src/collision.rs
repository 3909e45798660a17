use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::mem;
use std::os::raw::{c_int, c_void};
use std::slice;

use crate::callbacks;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::ffi;
use crate::handler::{StaticDebugHandler, TreeRayCastHandler};
use crate::math::{Mat4, Vertices};
use crate::registry::{Owner, Slot};
use crate::relay::Relay;

handles! {
    /// Opaque handle to a NewtonCollision.
    pub struct Collision(*const ffi::NewtonCollision);
}

/// Collision created by the relay on behalf of the application.
///
/// The collision is destroyed when this value is dropped.
#[derive(Debug)]
pub struct OwnedCollision<E: Engine> {
    raw: *const ffi::NewtonCollision,
    _engine: PhantomData<fn() -> E>,
}

impl<E: Engine> OwnedCollision<E> {
    pub fn collision(&self) -> Collision {
        unsafe { Collision::from_raw(self.raw) }
    }

    pub fn as_raw(&self) -> *const ffi::NewtonCollision {
        self.raw
    }

    /// Gives up ownership of the collision without destroying it.
    pub fn into_raw(self) -> *const ffi::NewtonCollision {
        let raw = self.raw;
        mem::forget(self);
        raw
    }
}

impl<E: Engine> Drop for OwnedCollision<E> {
    fn drop(&mut self) {
        unsafe { E::destroy_collision(self.raw) }
    }
}

struct Stream<S> {
    inner: S,
    error: Option<io::Error>,
}

impl<E: Engine> Relay<E> {
    /// Sets the handler that adjusts ray hits against the tree collision `tree`.
    ///
    /// The relay takes over the user data of the collision. Remove the handler
    /// with [`release`](Relay::release) before the collision is destroyed.
    pub fn set_tree_ray_cast_callback<H>(&mut self, tree: Collision, handler: H)
    where
        H: TreeRayCastHandler + 'static,
    {
        self.claim_collision(tree);
        self.register(Owner::Object(tree.handle()), Slot::TreeRayCast(Box::new(handler)));
        unsafe {
            E::tree_collision_set_user_ray_cast_callback(tree.as_raw(), Some(callbacks::tree_ray_cast::<E>))
        }
    }

    /// Sets the handler receiving the faces of a static collision touched by other bodies.
    ///
    /// Like [`set_tree_ray_cast_callback`](Relay::set_tree_ray_cast_callback),
    /// this takes over the user data of the collision.
    pub fn set_static_debug_callback<H>(&mut self, collision: Collision, handler: H)
    where
        H: StaticDebugHandler + 'static,
    {
        self.claim_collision(collision);
        self.register(Owner::Object(collision.handle()), Slot::StaticDebug(Box::new(handler)));
        unsafe {
            E::static_collision_set_debug_callback(collision.as_raw(), Some(callbacks::static_debug::<E>))
        }
    }

    /// Calls `f` with the vertices and face id of every polygon of `collision`,
    /// transformed by `matrix`.
    pub fn for_each_polygon<F>(&self, collision: Collision, matrix: &Mat4, mut f: F)
    where
        F: FnMut(Vertices, i32),
    {
        unsafe {
            E::collision_for_each_polygon_do(
                collision.as_raw(),
                matrix.as_ptr() as *const f32,
                Some(polygon_iterator::<F>),
                &mut f as *mut F as *mut c_void,
            );
        }

        unsafe extern "C" fn polygon_iterator<F>(
            user_data: *mut c_void,
            count: c_int,
            faces: *const f32,
            face_id: c_int,
        ) where
            F: FnMut(Vertices, i32),
        {
            let vertices = Vertices::from_raw(faces, count.max(0) as usize, mem::size_of::<[f32; 3]>());
            (*(user_data as *mut F))(vertices, face_id)
        }
    }

    /// Serializes `collision` into `writer`.
    ///
    /// The engine streams the data in chunks. The first write error stops
    /// further writes and is returned once the engine is done.
    pub fn serialize_collision<W: Write>(&self, collision: Collision, writer: W) -> Result<()> {
        let mut stream = Stream {
            inner: writer,
            error: None,
        };

        unsafe {
            E::collision_serialize(
                self.world().as_raw(),
                collision.as_raw(),
                Some(serialize::<W>),
                &mut stream as *mut Stream<W> as *mut c_void,
            );
        }

        return match stream.error {
            Some(err) => Err(Error::Io(err)),
            None => Ok(stream.inner.flush()?),
        };

        unsafe extern "C" fn serialize<W: Write>(handle: *mut c_void, buffer: *const c_void, size: c_int) {
            let stream = &mut *(handle as *mut Stream<W>);
            if stream.error.is_some() || size <= 0 {
                return;
            }
            let data = slice::from_raw_parts(buffer as *const u8, size as usize);
            if let Err(err) = stream.inner.write_all(data) {
                stream.error = Some(err);
            }
        }
    }

    /// Rebuilds a collision from data previously written by
    /// [`serialize_collision`](Relay::serialize_collision).
    pub fn deserialize_collision<R: Read>(&self, reader: R) -> Result<OwnedCollision<E>> {
        let mut stream = Stream {
            inner: reader,
            error: None,
        };

        let raw = unsafe {
            E::create_collision_from_serialization(
                self.world().as_raw(),
                Some(deserialize::<R>),
                &mut stream as *mut Stream<R> as *mut c_void,
            )
        };

        let collision = if raw.is_null() {
            None
        } else {
            Some(OwnedCollision {
                raw: raw as *const _,
                _engine: PhantomData,
            })
        };

        // a collision built from a broken stream is dropped here
        return match (stream.error, collision) {
            (Some(err), _) => Err(Error::Io(err)),
            (None, None) => Err(Error::Deserialize),
            (None, Some(collision)) => Ok(collision),
        };

        unsafe extern "C" fn deserialize<R: Read>(handle: *mut c_void, buffer: *mut c_void, size: c_int) {
            let stream = &mut *(handle as *mut Stream<R>);
            if size <= 0 {
                return;
            }
            let data = slice::from_raw_parts_mut(buffer as *mut u8, size as usize);
            if stream.error.is_none() {
                match stream.inner.read_exact(data) {
                    Ok(()) => return,
                    Err(err) => stream.error = Some(err),
                }
            }
            for b in data.iter_mut() {
                *b = 0;
            }
        }
    }
}
